use crate::core::filter::{apply_distance_sort, apply_text_filter, normalize_query, visible_records};
use crate::core::pagination::Pagination;
use crate::domain::model::{BranchRecord, FetchedPage, ReferenceLocation};
use chrono::{DateTime, Utc};

/// Stamp handed out when a fetch starts. Only the most recently issued
/// ticket may write its result into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub page: usize,
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { loaded: usize, total: usize },
    /// A newer fetch was started after this one; the response was dropped.
    Stale,
}

/// Everything the locator knows during one session.
#[derive(Debug, Clone)]
pub struct PageState {
    pagination: Pagination,
    records: Vec<BranchRecord>,
    reference: Option<ReferenceLocation>,
    query: String,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl PageState {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            records: Vec::new(),
            reference: None,
            query: String::new(),
            generation: 0,
            loaded_at: None,
        }
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    pub fn records(&self) -> &[BranchRecord] {
        &self.records
    }

    pub fn visible_records(&self) -> Vec<&BranchRecord> {
        visible_records(&self.records).collect()
    }

    /// Record at `index` within the filtered view.
    pub fn visible_record(&self, index: usize) -> Option<&BranchRecord> {
        visible_records(&self.records).nth(index)
    }

    pub fn reference(&self) -> Option<&ReferenceLocation> {
        self.reference.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_active_query(&self) -> bool {
        !normalize_query(&self.query).is_empty()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Starts a fetch for the current page. Any ticket issued earlier
    /// becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            page: self.pagination.current_page(),
            skip: self.pagination.compute_skip(),
            limit: self.pagination.page_size(),
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Swaps in a fetched page, then re-derives distance order and the
    /// active text filter over it.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, page: FetchedPage) -> FetchOutcome {
        if !self.is_current(ticket) {
            tracing::warn!(
                "Dropping stale response for page {} (generation {} superseded by {})",
                ticket.page,
                ticket.generation,
                self.generation
            );
            return FetchOutcome::Stale;
        }

        self.records = page.records;
        self.pagination.set_total_count(page.total);
        self.loaded_at = Some(Utc::now());

        if let Some(reference) = self.reference {
            apply_distance_sort(&mut self.records, &reference);
        }
        apply_text_filter(&mut self.records, &self.query);

        FetchOutcome::Applied {
            loaded: self.records.len(),
            total: page.total,
        }
    }

    /// Applies to whatever page is loaded right now, even if it is not the
    /// page that was showing when the location was requested.
    pub fn set_reference_location(&mut self, location: ReferenceLocation) {
        self.reference = Some(location);
        apply_distance_sort(&mut self.records, &location);
    }

    pub fn set_query(&mut self, query: &str) -> usize {
        self.query = query.to_string();
        apply_text_filter(&mut self.records, &self.query)
    }
}
