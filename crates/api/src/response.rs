//! Success envelope shared by every endpoint.

use axum::Json;
use serde::Serialize;

/// `{"success": true, "data": ..., "count"?: n, "pagination"?: {...}}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Handler return type for JSON endpoints.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, crate::error::AppError>;

impl<T> ApiResponse<T> {
    /// Wrap a single value.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            pagination: None,
        }
    }

    /// Wrap and convert into the `Json` response type handlers return.
    #[must_use]
    pub const fn json(data: T) -> Json<Self> {
        Json(Self::ok(data))
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wrap a list, reporting its length as `count`.
    #[must_use]
    pub fn list(items: Vec<T>) -> Json<Self> {
        let count = items.len();
        Json(Self {
            success: true,
            data: items,
            count: Some(count),
            pagination: None,
        })
    }

    /// Wrap one page of a larger result set.
    #[must_use]
    pub fn page(items: Vec<T>, pagination: Pagination) -> Json<Self> {
        let count = items.len();
        Json(Self {
            success: true,
            data: items,
            count: Some(count),
            pagination: Some(pagination),
        })
    }
}

/// Empty `data` object for deletes.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

/// Page metadata for paginated lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 12;
    /// Largest page size a client may request.
    pub const MAX_LIMIT: u32 = 100;

    /// Build page metadata; `pages` is `ceil(total / limit)`.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(u64::from(limit)),
        }
    }
}

/// Normalized `page`/`limit` request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamp raw query values: page starts at 1, limit to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Pagination::DEFAULT_LIMIT)
                .clamp(1, Pagination::MAX_LIMIT),
        }
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_round_up() {
        assert_eq!(Pagination::new(1, 12, 0).pages, 0);
        assert_eq!(Pagination::new(1, 12, 12).pages, 1);
        assert_eq!(Pagination::new(1, 12, 13).pages, 2);
        assert_eq!(Pagination::new(3, 5, 11).pages, 3);
    }

    #[test]
    fn test_page_request_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 12 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(2), Some(500)).limit, Pagination::MAX_LIMIT);
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_envelope_shape() {
        let Json(single) = ApiResponse::json("hello");
        let value = serde_json::to_value(&single).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": "hello"}));

        let Json(list) = ApiResponse::list(vec![1, 2, 3]);
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["count"], 3);
        assert!(value.get("pagination").is_none());

        let Json(page) = ApiResponse::page(vec![1], Pagination::new(2, 1, 2));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value["pagination"],
            serde_json::json!({"page": 2, "limit": 1, "total": 2, "pages": 2})
        );
    }

    #[test]
    fn test_empty_serializes_as_object() {
        assert_eq!(serde_json::to_string(&Empty {}).unwrap(), "{}");
    }
}
