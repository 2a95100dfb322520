//! Common functionality for paging statement data.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A page selection normalized against a [PaginationConfig].
///
/// Out-of-range requests are clamped rather than rejected: a zero page or
/// limit falls back to the configured default, and limits are capped at
/// `max_page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSelection {
    /// The 1-based page number.
    pub page: u64,
    /// The number of rows per page.
    pub limit: u64,
}

impl PageSelection {
    /// Normalize raw `page`/`limit` query values against `config`.
    pub fn normalize(page: Option<u64>, limit: Option<u64>, config: &PaginationConfig) -> Self {
        let page = match page {
            Some(page) if page >= 1 => page,
            _ => config.default_page,
        };

        let limit = match limit {
            Some(limit) if limit >= 1 => limit.min(config.max_page_size),
            _ => config.default_page_size,
        };

        Self { page, limit }
    }

    /// The zero-based row offset of the first row on this page.
    ///
    /// `page` comes straight from the query string, so the arithmetic
    /// saturates instead of overflowing. The result is capped at [i64::MAX]
    /// because SQLite reads integer literals as i64.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }

    /// Whether rows remain beyond this page given `total` matching rows.
    pub fn has_more(&self, total: u64) -> bool {
        self.offset().saturating_add(self.limit) < total
    }
}
