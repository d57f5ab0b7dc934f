//! List parameters shared by every lookup endpoint.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;
pub const MIN_PER_PAGE: i64 = 1;
/// Highest page honoured; larger requests read as this page (and come back empty).
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[param(minimum = 1, default = 1)]
    #[serde(default = "default_page")]
    pub page: i64,

    /// Number of items per page. Defaults to 20, max 100.
    #[param(minimum = 1, maximum = 100, default = 20)]
    #[serde(default = "default_per_page")]
    pub per_page: i64,

    /// Include retired (inactive) rows. Defaults to false.
    #[param(default = false)]
    #[serde(default)]
    pub include_inactive: bool,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            include_inactive: false,
        }
    }
}

impl ListParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page,
            include_inactive: false,
        }
    }

    pub fn page(&self) -> i64 {
        self.page.clamp(1, MAX_PAGE)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE)
    }

    pub fn limit_offset(&self) -> (i64, i64) {
        (self.per_page(), (self.page() - 1) * self.per_page())
    }

    /// `None` lists every row, `Some(true)` only active ones.
    pub fn active_filter(&self) -> Option<bool> {
        if self.include_inactive {
            None
        } else {
            Some(true)
        }
    }

    pub fn into_metadata(self, total_count: i64) -> PaginationMeta {
        PaginationMeta::new(self.page(), self.per_page(), total_count)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: i64, per_page: i64, total_count: i64) -> Self {
        let total_pages = if total_count == 0 {
            1
        } else {
            (total_count + per_page - 1) / per_page
        };

        Self {
            page,
            per_page,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params = ListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(params.active_filter(), Some(true));
    }

    #[test]
    fn test_list_params_clamping() {
        assert_eq!(ListParams::new(0, 20).page(), 1);
        assert_eq!(ListParams::new(-5, 20).page(), 1);
        assert_eq!(ListParams::new(1, 500).per_page(), MAX_PER_PAGE);
        assert_eq!(ListParams::new(1, 0).per_page(), MIN_PER_PAGE);
    }

    #[test]
    fn test_limit_offset() {
        assert_eq!(ListParams::new(1, 20).limit_offset(), (20, 0));
        assert_eq!(ListParams::new(2, 20).limit_offset(), (20, 20));
        assert_eq!(ListParams::new(3, 10).limit_offset(), (10, 20));
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params = ListParams::new(i64::MAX, 20);
        assert_eq!(params.page(), MAX_PAGE);
        assert_eq!(params.limit_offset(), (20, (MAX_PAGE - 1) * 20));

        let (_, offset) = ListParams::new(i64::MAX, i64::MAX).limit_offset();
        assert!(offset > 0);
    }

    #[test]
    fn test_include_inactive_lifts_filter() {
        let params = ListParams {
            include_inactive: true,
            ..ListParams::default()
        };
        assert_eq!(params.active_filter(), None);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 100);
        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let meta = PaginationMeta::new(5, 20, 100);
        assert!(!meta.has_next);
        assert!(meta.has_prev);

        let meta = PaginationMeta::new(1, 20, 0);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next);

        assert_eq!(PaginationMeta::new(1, 20, 95).total_pages, 5);
    }
}
