//! Page/limit normalization
//!
//! Pure functions shared by every paginated read. A page below 1 becomes 1,
//! a limit below 1 becomes [`DEFAULT_LIMIT`] and a limit above
//! [`MAX_LIMIT`] is clamped to it.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Page request as received from a caller, before normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

/// A normalized page: always `page >= 1` and `1 <= limit <= MAX_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

/// Pagination metadata returned next to a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    pub fn normalize(self) -> Page {
        let page = if self.page <= 0 { DEFAULT_PAGE } else { self.page };
        let limit = if self.limit <= 0 {
            DEFAULT_LIMIT
        } else {
            self.limit.min(MAX_LIMIT)
        };

        Page { page, limit }
    }
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn info(&self, total: i64) -> PageInfo {
        PageInfo {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total_pages(total, self.limit),
        }
    }
}

/// `ceil(total / limit)`, 0 when there is nothing to page through
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
