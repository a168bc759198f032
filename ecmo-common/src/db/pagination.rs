//! Pagination for user listings

use crate::{Error, Result};

/// Default page size for user listings
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a caller may request
pub const MAX_LIMIT: i64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub limit: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

impl Pagination {
    /// Validate requested page/limit, applying defaults
    ///
    /// Page must be at least 1 and limit within [1, 100]. A page past the end
    /// is not clamped; it simply returns no rows.
    ///
    /// # Examples
    /// ```
    /// use ecmo_common::db::Pagination;
    ///
    /// // 25 results at 10 per page = 3 pages
    /// let p = Pagination::new(25, Some(2), None).unwrap();
    /// assert_eq!(p.page, 2);
    /// assert_eq!(p.total_pages, 3);
    /// assert_eq!(p.offset, 10);
    /// ```
    pub fn new(total_results: i64, page: Option<i64>, limit: Option<i64>) -> Result<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(Error::InvalidInput(format!("page must be >= 1, got {}", page)));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, limit
            )));
        }

        Ok(Self {
            page,
            limit,
            total_pages: (total_results + limit - 1) / limit,
            offset: (page - 1) * limit,
        })
    }
}
