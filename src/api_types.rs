use serde::Serialize;

/// Generic paginated response wrapper for API endpoints.
#[derive(Serialize, Debug, Clone)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Slice an already filtered list into one page.
    pub fn from_items(all: Vec<T>, page: i64, per_page: i64) -> Self {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let total = all.len() as i64;
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(offset).take(per_page as usize).collect();
        PaginatedResponse { items, page, per_page, total }
    }
}

/// API error response.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_slices_and_reports_total() {
        let page = PaginatedResponse::from_items((1..=7).collect::<Vec<i32>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn pagination_clamps_bounds() {
        let page = PaginatedResponse::from_items(vec![1, 2], 0, 500);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn pagination_past_the_end_is_empty() {
        let page = PaginatedResponse::from_items(vec![1, 2, 3], i64::MAX, 100);
        assert!(page.items.is_empty());
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.total, 3);
    }
}
