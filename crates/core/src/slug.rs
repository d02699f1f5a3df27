/// Convert a display name into a URL slug: lowercase ASCII alphanumerics
/// separated by single dashes.
///
/// `"Sci-Fi & Fantasy"` becomes `"sci-fi-fantasy"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("Sci-Fi & Fantasy"), "sci-fi-fantasy");
        assert_eq!(slugify("  Role Playing  "), "role-playing");
        assert_eq!(slugify("PlayStation 5"), "playstation-5");
    }

    #[test]
    fn drops_non_ascii() {
        assert_eq!(slugify("Shōnen"), "sh-nen");
        assert_eq!(slugify("!!!"), "");
    }
}
