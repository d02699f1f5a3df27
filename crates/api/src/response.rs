//! Shared response envelope types for API handlers.
//!
//! Every successful response uses the `{ "success": true, "data": ... }`
//! envelope, optionally with a `message` and pagination `meta`. Use
//! [`ApiResponse`] instead of ad-hoc `serde_json::json!` bodies.

use mediashelf_core::pagination::{PageRequest, PaginationMeta};
use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

/// `meta` block of a paginated response.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub pagination: PaginationMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            meta: None,
        }
    }

    /// A page of results plus `meta.pagination` computed from `total`.
    pub fn paginated(data: T, page: PageRequest, total: i64) -> Self {
        Self {
            meta: Some(ResponseMeta {
                pagination: PaginationMeta::new(page, total),
            }),
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// A response that only carries a message (`data` is `null`).
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(()).with_message(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_omits_optional_fields() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn paginated_includes_meta() {
        let page = PageRequest::new(Some(2), Some(10));
        let json = serde_json::to_value(ApiResponse::paginated(vec!["a"], page, 25)).unwrap();
        assert_eq!(json["meta"]["pagination"]["page"], 2);
        assert_eq!(json["meta"]["pagination"]["totalPages"], 3);
    }

    #[test]
    fn message_only_has_null_data() {
        let json = serde_json::to_value(ApiResponse::message("Logged out")).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "Logged out");
    }
}
