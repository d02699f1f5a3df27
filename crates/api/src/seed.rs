//! Database seeding with a bundled static catalog.
//!
//! Idempotent: genres and platforms are upserted, the admin account is only
//! created when its email is unknown, and media whose `(type, title)` already
//! exists is skipped. If the `admin` username already belongs to someone
//! else, the new admin gets the first free `adminN` instead.

use std::collections::HashMap;

use chrono::NaiveDate;
use mediashelf_core::media::{validate_attributes, MediaAttributes, MediaType};
use mediashelf_core::roles::ROLE_ADMIN;
use mediashelf_core::slug::slugify;
use mediashelf_core::types::DbId;
use mediashelf_core::users::normalize_email;
use mediashelf_db::models::media::CreateMedia;
use mediashelf_db::models::user::CreateUser;
use mediashelf_db::repositories::{GenreRepo, MediaRepo, PlatformRepo, UserRepo};
use mediashelf_db::DbPool;

use crate::auth::password::hash_password;

/// Preferred username for a freshly created seed admin.
pub const ADMIN_USERNAME: &str = "admin";

/// Default admin email when `SEED_ADMIN_EMAIL` is unset.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@mediashelf.local";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Invalid catalog entry '{title}': {reason}")]
    Catalog { title: &'static str, reason: String },
}

/// Credentials for the admin account created on first seed.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

/// Counts reported after a seed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub genres: usize,
    pub platforms: usize,
    pub admin_created: bool,
    pub media_inserted: usize,
    pub media_skipped: usize,
}

/// One entry of the bundled catalog.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub media_type: MediaType,
    pub title: &'static str,
    pub description: &'static str,
    pub release: (i32, u32, u32),
    pub credit: Credit,
    pub genres: &'static [&'static str],
    pub platforms: &'static [&'static str],
}

/// Type-specific people and sizes for a catalog entry.
#[derive(Debug, Clone, Copy)]
pub enum Credit {
    Movie {
        director: &'static str,
        runtime_minutes: i32,
    },
    Game {
        developer: &'static str,
        publisher: &'static str,
    },
    Manga {
        author: &'static str,
        volumes: i32,
        chapters: i32,
    },
}

impl Credit {
    fn attributes(self) -> MediaAttributes {
        match self {
            Credit::Movie {
                director,
                runtime_minutes,
            } => MediaAttributes {
                director: Some(director.into()),
                runtime_minutes: Some(runtime_minutes),
                ..Default::default()
            },
            Credit::Game {
                developer,
                publisher,
            } => MediaAttributes {
                developer: Some(developer.into()),
                publisher: Some(publisher.into()),
                ..Default::default()
            },
            Credit::Manga {
                author,
                volumes,
                chapters,
            } => MediaAttributes {
                author: Some(author.into()),
                volumes: Some(volumes),
                chapters: Some(chapters),
                ..Default::default()
            },
        }
    }
}

pub const GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Fantasy",
    "Horror",
    "Mystery",
    "Romance",
    "Science Fiction",
    "Thriller",
    "Role-Playing",
    "Strategy",
];

pub const PLATFORMS: &[&str] = &[
    "PC",
    "PlayStation 5",
    "Xbox Series X",
    "Nintendo Switch",
    "Theatrical",
    "Streaming",
    "Print",
];

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        media_type: MediaType::Movie,
        title: "The Matrix",
        description: "A hacker learns that the world he lives in is a simulation.",
        release: (1999, 3, 31),
        credit: Credit::Movie {
            director: "Lana Wachowski, Lilly Wachowski",
            runtime_minutes: 136,
        },
        genres: &["action", "science-fiction"],
        platforms: &["theatrical", "streaming"],
    },
    CatalogEntry {
        media_type: MediaType::Movie,
        title: "Spirited Away",
        description: "A girl wanders into a world of spirits and must free her parents.",
        release: (2001, 7, 20),
        credit: Credit::Movie {
            director: "Hayao Miyazaki",
            runtime_minutes: 125,
        },
        genres: &["adventure", "fantasy"],
        platforms: &["theatrical", "streaming"],
    },
    CatalogEntry {
        media_type: MediaType::Movie,
        title: "Parasite",
        description: "A poor family schemes its way into the household of a wealthy one.",
        release: (2019, 5, 30),
        credit: Credit::Movie {
            director: "Bong Joon-ho",
            runtime_minutes: 132,
        },
        genres: &["drama", "thriller"],
        platforms: &["theatrical", "streaming"],
    },
    CatalogEntry {
        media_type: MediaType::Movie,
        title: "Arrival",
        description: "A linguist is recruited to communicate with visitors from space.",
        release: (2016, 11, 11),
        credit: Credit::Movie {
            director: "Denis Villeneuve",
            runtime_minutes: 116,
        },
        genres: &["drama", "science-fiction", "mystery"],
        platforms: &["theatrical", "streaming"],
    },
    CatalogEntry {
        media_type: MediaType::Game,
        title: "The Legend of Zelda: Breath of the Wild",
        description: "An open-world adventure across a ruined kingdom.",
        release: (2017, 3, 3),
        credit: Credit::Game {
            developer: "Nintendo EPD",
            publisher: "Nintendo",
        },
        genres: &["action", "adventure"],
        platforms: &["nintendo-switch"],
    },
    CatalogEntry {
        media_type: MediaType::Game,
        title: "Elden Ring",
        description: "An action role-playing game set in the Lands Between.",
        release: (2022, 2, 25),
        credit: Credit::Game {
            developer: "FromSoftware",
            publisher: "Bandai Namco Entertainment",
        },
        genres: &["action", "role-playing", "fantasy"],
        platforms: &["pc", "playstation-5", "xbox-series-x"],
    },
    CatalogEntry {
        media_type: MediaType::Game,
        title: "Hades",
        description: "A roguelike dungeon crawler about escaping the underworld.",
        release: (2020, 9, 17),
        credit: Credit::Game {
            developer: "Supergiant Games",
            publisher: "Supergiant Games",
        },
        genres: &["action", "role-playing"],
        platforms: &["pc", "nintendo-switch", "playstation-5", "xbox-series-x"],
    },
    CatalogEntry {
        media_type: MediaType::Game,
        title: "Civilization VI",
        description: "Build an empire to stand the test of time.",
        release: (2016, 10, 21),
        credit: Credit::Game {
            developer: "Firaxis Games",
            publisher: "2K",
        },
        genres: &["strategy"],
        platforms: &["pc", "nintendo-switch"],
    },
    CatalogEntry {
        media_type: MediaType::Manga,
        title: "One Piece",
        description: "A rubber-bodied pirate searches for the legendary One Piece.",
        release: (1997, 7, 22),
        credit: Credit::Manga {
            author: "Eiichiro Oda",
            volumes: 108,
            chapters: 1120,
        },
        genres: &["action", "adventure", "comedy"],
        platforms: &["print"],
    },
    CatalogEntry {
        media_type: MediaType::Manga,
        title: "Monster",
        description: "A surgeon hunts the killer whose life he once saved.",
        release: (1994, 12, 5),
        credit: Credit::Manga {
            author: "Naoki Urasawa",
            volumes: 18,
            chapters: 162,
        },
        genres: &["mystery", "thriller", "drama"],
        platforms: &["print"],
    },
    CatalogEntry {
        media_type: MediaType::Manga,
        title: "Fullmetal Alchemist",
        description: "Two brothers seek the Philosopher's Stone to restore their bodies.",
        release: (2001, 7, 12),
        credit: Credit::Manga {
            author: "Hiromu Arakawa",
            volumes: 27,
            chapters: 116,
        },
        genres: &["action", "adventure", "fantasy"],
        platforms: &["print"],
    },
];

/// Run the full seed against `pool`. Migrations must already be applied.
pub async fn run(pool: &DbPool, admin: &SeedAdmin) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    let mut genre_ids = HashMap::new();
    for name in GENRES {
        let genre = GenreRepo::upsert(pool, name, &slugify(name)).await?;
        genre_ids.insert(genre.slug, genre.id);
    }
    summary.genres = genre_ids.len();

    let mut platform_ids = HashMap::new();
    for name in PLATFORMS {
        let platform = PlatformRepo::upsert(pool, name, &slugify(name)).await?;
        platform_ids.insert(platform.slug, platform.id);
    }
    summary.platforms = platform_ids.len();
    tracing::info!(
        genres = summary.genres,
        platforms = summary.platforms,
        "Taxonomy seeded"
    );

    let (admin_id, created) = ensure_admin(pool, admin).await?;
    summary.admin_created = created;

    for entry in CATALOG {
        let type_name = entry.media_type.as_str();
        if MediaRepo::exists_with_title(pool, type_name, entry.title).await? {
            tracing::debug!(title = entry.title, media_type = type_name, "Skipping existing media");
            summary.media_skipped += 1;
            continue;
        }

        let input = catalog_media(entry, &genre_ids, &platform_ids)?;
        let media = MediaRepo::create(pool, &input, Some(admin_id)).await?;
        tracing::debug!(media_id = media.id, title = entry.title, "Inserted media");
        summary.media_inserted += 1;
    }

    tracing::info!(
        inserted = summary.media_inserted,
        skipped = summary.media_skipped,
        admin_created = summary.admin_created,
        "Seed complete"
    );
    Ok(summary)
}

/// Find the admin by email or create it. Returns `(id, created)`.
async fn ensure_admin(pool: &DbPool, admin: &SeedAdmin) -> Result<(DbId, bool), SeedError> {
    let email = normalize_email(&admin.email);
    if let Some(existing) = UserRepo::find_by_email(pool, &email).await? {
        tracing::info!(user_id = existing.id, "Admin account already exists");
        return Ok((existing.id, false));
    }

    let username = free_admin_username(pool).await?;
    let password_hash =
        hash_password(&admin.password).map_err(|e| SeedError::Hash(e.to_string()))?;
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username,
            email,
            password_hash,
            role: ROLE_ADMIN.to_string(),
            display_name: Some("Administrator".to_string()),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, username = %user.username, "Admin account created");
    Ok((user.id, true))
}

/// [`ADMIN_USERNAME`], or `admin2`, `admin3`, ... if it is taken.
async fn free_admin_username(pool: &DbPool) -> Result<String, SeedError> {
    let mut suffix = 1u32;
    loop {
        let candidate = admin_username_candidate(suffix);
        if UserRepo::find_by_username(pool, &candidate).await?.is_none() {
            return Ok(candidate);
        }
        tracing::warn!(username = %candidate, "Username taken, trying next");
        suffix += 1;
    }
}

fn admin_username_candidate(suffix: u32) -> String {
    if suffix <= 1 {
        ADMIN_USERNAME.to_string()
    } else {
        format!("{ADMIN_USERNAME}{suffix}")
    }
}

/// Resolve a catalog entry into an insertable row.
fn catalog_media(
    entry: &CatalogEntry,
    genre_ids: &HashMap<String, DbId>,
    platform_ids: &HashMap<String, DbId>,
) -> Result<CreateMedia, SeedError> {
    let attributes = entry.credit.attributes();
    validate_attributes(entry.media_type, &attributes).map_err(|e| SeedError::Catalog {
        title: entry.title,
        reason: e.to_string(),
    })?;

    let (year, month, day) = entry.release;
    let release_date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| SeedError::Catalog {
            title: entry.title,
            reason: format!("invalid release date {year}-{month}-{day}"),
        })?;

    let lookup = |slugs: &[&str], ids: &HashMap<String, DbId>, kind: &str| {
        slugs
            .iter()
            .map(|slug| {
                ids.get(*slug).copied().ok_or_else(|| SeedError::Catalog {
                    title: entry.title,
                    reason: format!("unknown {kind} '{slug}'"),
                })
            })
            .collect::<Result<Vec<_>, _>>()
    };

    Ok(CreateMedia {
        media_type: entry.media_type.as_str().to_string(),
        title: entry.title.to_string(),
        description: Some(entry.description.to_string()),
        release_date: Some(release_date),
        cover_image_url: None,
        attributes,
        genre_ids: lookup(entry.genres, genre_ids, "genre")?,
        platform_ids: lookup(entry.platforms, platform_ids, "platform")?,
    })
}
