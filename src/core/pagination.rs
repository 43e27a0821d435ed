use crate::models::PageMeta;

/// Page window derived from a 1-based page number and a page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of entries skipped before this page
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Apply the window to a fully ranked sequence
    pub fn slice<T: Clone>(&self, ranked: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        ranked
            .iter()
            .skip(start)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }

    /// Pagination metadata for `total` matches
    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total_pages(total, self.limit),
        }
    }
}

/// ceil(total / limit); zero when `limit` is zero
#[inline]
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}
