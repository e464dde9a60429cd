//! Controller state and the request/response types flowing through it.

use crate::api::QueryParams;
use crate::catalog::{DateRangeOption, FilterOption, SearchByOption};

/// Load-more guard.
///
/// `LoadingMore` is entered synchronously before an append request is handed
/// out and left when that request completes, successfully or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    LoadingMore,
}

/// How a fetched page is merged into the current items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Replace items and total (first page after a filter change).
    Replace,
    /// Append to items (load-more).
    Append,
}

/// A request handed out by the controller, to be executed against a gateway
/// and fed back through `ListController::apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Filter generation the request was built for.
    pub generation: u64,
    /// Endpoint path below `/api/`.
    pub endpoint: String,
    pub query: QueryParams,
    pub mode: FetchMode,
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was merged.
    Applied { received: usize },
    /// The request failed; items were left as they were.
    Failed,
    /// The filters changed while the request was in flight; the response was dropped.
    Stale,
}

/// User-controlled inputs that shape the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_text: String,
    pub active_filter: Option<FilterOption>,
    pub active_search_by: Option<SearchByOption>,
    pub active_date_range: Option<DateRangeOption>,
    /// Date used when the active range is `custom` (`YYYY-MM-DD`).
    pub selected_custom_date: Option<String>,
    /// Externally supplied ID list from the navigation context.
    pub id_list: Option<String>,
}

impl FilterState {
    /// Whether any input narrows the list.
    pub fn is_filtered(&self) -> bool {
        !self.search_text.is_empty()
            || self
                .active_filter
                .as_ref()
                .is_some_and(|f| !f.is_unfiltered())
            || self.active_date_range.is_some()
            || self.id_list.is_some()
    }
}

/// Everything a list screen knows about its data.
#[derive(Debug, Clone)]
pub struct ControllerState<R> {
    pub filters: FilterState,
    /// 1-based page of the most recent request.
    pub current_page: u32,
    pub items: Vec<R>,
    pub total_records: u64,
    pub load_state: LoadState,
}

impl<R> Default for ControllerState<R> {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            current_page: 1,
            items: Vec::new(),
            total_records: 0,
            load_state: LoadState::Idle,
        }
    }
}

impl<R> ControllerState<R> {
    pub fn is_loading_more(&self) -> bool {
        self.load_state == LoadState::LoadingMore
    }

    /// Whether the server has records beyond the loaded ones.
    pub fn has_more(&self) -> bool {
        (self.items.len() as u64) < self.total_records
    }
}
