//! Offset pagination for staff listings.

pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: u32 = 100;

/// One page of a listing. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub per_page: u32,
    pub page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            page: 1,
        }
    }
}

impl PageRequest {
    /// Build from optional query values, filling defaults and applying bounds.
    pub fn new(per_page: Option<u32>, page: Option<u32>) -> Self {
        Self {
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
            page: page.unwrap_or(1),
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
            page: self.page.max(1),
        }
    }

    /// Rows to skip before this page starts.
    pub fn offset(self) -> u64 {
        let bounded = self.clamped();
        u64::from(bounded.page - 1) * u64::from(bounded.per_page)
    }

    pub fn limit(self) -> u64 {
        u64::from(self.clamped().per_page)
    }
}
