pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Page bookkeeping for offset-based fetching.
///
/// `advance` and `retreat` do not clamp; callers check `can_go_next` /
/// `can_go_previous` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
    total_count: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_count: 0,
        }
    }

    pub fn starting_at(page_size: usize, page: usize) -> Self {
        Self {
            current_page: page,
            ..Self::new(page_size)
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn set_total_count(&mut self, total: usize) {
        self.total_count = total;
    }

    pub fn compute_skip(&self) -> usize {
        self.current_page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page_end() < self.total_count
    }

    pub fn advance(&mut self) {
        self.current_page += 1;
    }

    pub fn retreat(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }

    /// 1-based inclusive range of the records on the current page, as shown
    /// in "Showing 31-60 of 95".
    pub fn display_range(&self) -> (usize, usize) {
        let start = self.compute_skip().saturating_add(1);
        let end = self.page_end().min(self.total_count);
        (start, end)
    }

    /// Offset one past the current page. Saturates for absurd page numbers.
    fn page_end(&self) -> usize {
        self.current_page.saturating_mul(self.page_size)
    }
}
