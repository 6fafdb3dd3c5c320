/// Smallest page size ever returned.
pub const PAGINATION_MIN_SIZE: i64 = 50;
/// Hard ceiling for the page size.
pub const PAGINATION_MAX_SIZE: i64 = 500;
/// Page size used when the request does not carry a parsable one.
pub const PAGINATION_DEFAULT_SIZE: i64 = 100;

/// A bounded window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    size: i64,
    max_size: i64,
}

impl Pagination {
    /// Clamps in a fixed order: page to at least 1, then the effective max
    /// size, then size against that max, then size against the floor.
    ///
    /// A size below 1 means "unspecified" and takes the effective max.
    pub fn new(page: i64, size: i64, max_size: i64) -> Self {
        let page = page.max(1);

        let max_size = if max_size <= 0 || max_size > PAGINATION_MAX_SIZE {
            PAGINATION_MAX_SIZE
        } else {
            max_size
        };

        let size = if size < 1 || size > max_size {
            max_size
        } else {
            size
        };
        let size = size.max(PAGINATION_MIN_SIZE);

        Self {
            page,
            size,
            max_size,
        }
    }

    /// Builds from raw query-string values; anything unparsable falls back to
    /// page 1, the default size and the hard ceiling.
    pub fn from_query(page: &str, size: &str, max_size: &str) -> Self {
        let page = page.trim().parse().unwrap_or(1);
        let size = size.trim().parse().unwrap_or(PAGINATION_DEFAULT_SIZE);
        let max_size = max_size.trim().parse().unwrap_or(0);
        Self::new(page, size, max_size)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn max_size(&self) -> i64 {
        self.max_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, PAGINATION_DEFAULT_SIZE, 0)
    }
}
