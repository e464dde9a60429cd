//! Paginated, filtered list controller.
//!
//! One [`ListController`] backs each list screen. It owns the search/filter
//! inputs and the loaded pages, turns inputs into query parameters, and merges
//! fetched pages back in.
//!
//! The controller never performs I/O on its own. Every operation that needs
//! data returns a [`PageRequest`]; the caller executes it (inline through
//! [`ListController::fetch_page`], or on a background task) and hands the
//! result to [`ListController::apply`]. This keeps the load-more guard and the
//! stale-response check independent of how requests are scheduled.

mod list_screen;
mod state;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::api::{
    ApiError, Collection, Complaint, DataGateway, Order, PageEnvelope, QueryParams, Record,
};
use crate::catalog::{DateRangeOption, FilterCatalog, FilterOption, SearchByOption};
use crate::routing::RouteParams;
use crate::screen::{Screen, ScreenBinding};

pub use list_screen::ListScreen;
pub use state::{
    ControllerState, FetchMode, FetchOutcome, FilterState, LoadState, PageRequest,
};

/// State machine for one list screen.
#[derive(Debug, Clone)]
pub struct ListController<R> {
    binding: ScreenBinding,
    catalog: FilterCatalog,
    state: ControllerState<R>,
    /// Bumped on every filter change; responses for older generations are dropped.
    generation: u64,
    /// Generation whose first page has not been applied yet.
    pending_replace: Option<u64>,
    last_error: Option<String>,
}

impl<R: Record> ListController<R> {
    /// Create a controller for a screen, using the screen's static catalog.
    pub fn new(binding: ScreenBinding) -> Self {
        let catalog = FilterCatalog::for_screen(binding.screen());
        Self {
            binding,
            catalog,
            state: ControllerState::default(),
            generation: 0,
            pending_replace: None,
            last_error: None,
        }
    }

    pub fn binding(&self) -> &ScreenBinding {
        &self.binding
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &ControllerState<R> {
        &self.state
    }

    pub fn items(&self) -> &[R] {
        &self.state.items
    }

    /// The most recent fetch error, cleared by the next successful fetch.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True between a filter change and the arrival of its first page.
    ///
    /// A failed first page keeps this set until the next refresh.
    pub fn is_refreshing(&self) -> bool {
        self.pending_replace == Some(self.generation)
    }

    /// Build the query for the current inputs and page.
    pub fn build_query(&self) -> QueryParams {
        let filters = &self.state.filters;
        let mut query = QueryParams::new();

        if filters.active_search_by.is_none() && !filters.search_text.is_empty() {
            query.push("search", &filters.search_text);
        }

        if let Some(filter) = filters.active_filter.as_ref().filter(|f| !f.is_unfiltered()) {
            query.push("status", &filter.action);
        }

        if let Some(search_by) = &filters.active_search_by {
            query.push(&search_by.action, &filters.search_text);
        }

        if let Some(range) = &filters.active_date_range {
            query.push("date_range", range.action.as_str());
            if range.action.is_custom() {
                // Single-day range: start and end are the same date.
                if let Some(date) = &filters.selected_custom_date {
                    query.push("start_date", date);
                    query.push("end_date", date);
                }
            }
        }

        query.push("page", self.state.current_page.to_string());
        self.binding
            .append_extras(&mut query, filters.id_list.as_deref());

        query
    }

    /// Start over from page 1 with the current inputs.
    ///
    /// Used when a screen mounts and for explicit refreshes.
    pub fn refresh(&mut self) -> PageRequest {
        self.restart("refresh")
    }

    /// Update the free-text search.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> Option<PageRequest> {
        let text = text.into();
        if self.state.filters.search_text == text {
            return None;
        }
        self.state.filters.search_text = text;
        Some(self.restart("search text changed"))
    }

    /// Select a status filter, or `None` to drop it.
    pub fn set_filter(&mut self, filter: Option<FilterOption>) -> Option<PageRequest> {
        if self.state.filters.active_filter == filter {
            return None;
        }
        self.state.filters.active_filter = filter;
        Some(self.restart("status filter changed"))
    }

    /// Bind the free-text search to a specific field, or `None` for generic search.
    pub fn set_search_by(&mut self, search_by: Option<SearchByOption>) -> Option<PageRequest> {
        if self.state.filters.active_search_by == search_by {
            return None;
        }
        self.state.filters.active_search_by = search_by;
        Some(self.restart("search field changed"))
    }

    /// Select a date range, or `None` to drop it.
    pub fn set_date_range(&mut self, range: Option<DateRangeOption>) -> Option<PageRequest> {
        if self.state.filters.active_date_range == range {
            return None;
        }
        self.state.filters.active_date_range = range;
        Some(self.restart("date range changed"))
    }

    /// Pick the day used by the `custom` date range.
    ///
    /// Only refetches while the custom range is active.
    pub fn set_custom_date(&mut self, date: impl Into<String>) -> Option<PageRequest> {
        let date = date.into();
        if self.state.filters.selected_custom_date.as_deref() == Some(date.as_str()) {
            return None;
        }
        self.state.filters.selected_custom_date = Some(date);

        let custom_active = self
            .state
            .filters
            .active_date_range
            .as_ref()
            .is_some_and(|r| r.action.is_custom());
        custom_active.then(|| self.restart("custom date changed"))
    }

    /// Pick up the screen's ID-list parameter from the navigation context.
    pub fn sync_route(&mut self, route: &dyn RouteParams) -> Option<PageRequest> {
        let ids = self.binding.read_id_list(route);
        if self.state.filters.id_list == ids {
            return None;
        }
        self.state.filters.id_list = ids;
        Some(self.restart("navigation parameters changed"))
    }

    /// Reset search, search field and date range, and ask the navigation
    /// context to drop the ID-list parameter.
    ///
    /// The status filter is kept.
    pub fn clear_filters(&mut self, route: &mut dyn RouteParams) -> PageRequest {
        let filters = &mut self.state.filters;
        filters.active_search_by = None;
        filters.search_text.clear();
        filters.active_date_range = None;
        filters.id_list = None;

        if let Some(binding) = self.binding.screen().id_list_binding() {
            route.set_params(HashMap::from([(binding.route_param.to_string(), None)]));
        }

        self.restart("filters cleared")
    }

    /// Request the next page.
    ///
    /// Returns `None` while a load-more is in flight, before the first page of
    /// the current filters has arrived, or once every record is loaded.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.state.is_loading_more() {
            debug!(screen = %self.binding.screen(), "Load more ignored: already loading");
            return None;
        }
        if self.is_refreshing() {
            debug!(
                screen = %self.binding.screen(),
                generation = self.generation,
                "Load more ignored: first page still pending"
            );
            return None;
        }
        if self.state.items.is_empty() || !self.state.has_more() {
            return None;
        }

        self.state.load_state = LoadState::LoadingMore;
        self.state.current_page += 1;
        debug!(
            screen = %self.binding.screen(),
            page = self.state.current_page,
            "Loading more"
        );

        Some(self.request(FetchMode::Append))
    }

    /// Merge the result of a request handed out by this controller.
    pub fn apply(
        &mut self,
        request: &PageRequest,
        result: Result<PageEnvelope<R>, ApiError>,
    ) -> FetchOutcome {
        if request.mode == FetchMode::Append {
            self.state.load_state = LoadState::Idle;
        }

        if request.generation != self.generation {
            debug!(
                screen = %self.binding.screen(),
                request_generation = request.generation,
                current_generation = self.generation,
                "Discarding stale response"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                if request.mode == FetchMode::Replace {
                    self.pending_replace = None;
                }
                let received = page.data.len();
                let total = page.total_records();
                match request.mode {
                    FetchMode::Replace => self.state.items = page.data,
                    FetchMode::Append => self.state.items.extend(page.data),
                }

                let loaded = self.state.items.len() as u64;
                if loaded > total {
                    warn!(
                        screen = %self.binding.screen(),
                        loaded,
                        total,
                        "Server reported fewer records than delivered"
                    );
                }
                self.state.total_records = total.max(loaded);
                self.last_error = None;

                debug!(
                    screen = %self.binding.screen(),
                    received,
                    loaded,
                    total = self.state.total_records,
                    "Page applied"
                );
                FetchOutcome::Applied { received }
            }
            Err(e) => {
                warn!(
                    screen = %self.binding.screen(),
                    query = %request.query,
                    error = %e,
                    "Fetch failed"
                );
                if request.mode == FetchMode::Append {
                    // Let the next load-more ask for the same page again.
                    self.state.current_page = self.state.current_page.saturating_sub(1).max(1);
                }
                self.last_error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Execute a request against a gateway and merge the result.
    pub async fn fetch_page<G: DataGateway>(
        &mut self,
        gateway: &G,
        request: PageRequest,
    ) -> FetchOutcome {
        let result = gateway
            .get_page::<R>(&request.endpoint, &request.query)
            .await;
        self.apply(&request, result)
    }

    /// `load_more` followed by `fetch_page`; `None` when there was nothing to load.
    pub async fn load_more_with<G: DataGateway>(&mut self, gateway: &G) -> Option<FetchOutcome> {
        let request = self.load_more()?;
        Some(self.fetch_page(gateway, request).await)
    }

    fn restart(&mut self, reason: &str) -> PageRequest {
        self.generation += 1;
        self.pending_replace = Some(self.generation);
        self.state.current_page = 1;
        debug!(
            screen = %self.binding.screen(),
            generation = self.generation,
            reason,
            "Refetching from first page"
        );
        self.request(FetchMode::Replace)
    }

    fn request(&self, mode: FetchMode) -> PageRequest {
        PageRequest {
            generation: self.generation,
            endpoint: self.binding.endpoint(),
            query: self.build_query(),
            mode,
        }
    }
}

/// Build the controller for a screen, typed by the records it lists.
///
/// `business_user_id` only affects the complaints screen.
pub fn for_screen(screen: Screen, business_user_id: Option<String>) -> Box<dyn ListScreen> {
    let binding = ScreenBinding::new(screen).with_business_user(business_user_id);
    match screen {
        Screen::Orders => Box::new(ListController::<Order>::new(binding)),
        Screen::Collections(_) => Box::new(ListController::<Collection>::new(binding)),
        Screen::Complaints => Box::new(ListController::<Complaint>::new(binding)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory gateway for controller tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde::de::DeserializeOwned;

    use crate::api::error::Result;
    use crate::api::{ApiError, DataGateway, PageEnvelope, QueryParams};

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    pub struct FakeGateway {
        responses: Mutex<VecDeque<Result<serde_json::Value>>>,
        requests: Mutex<Vec<(String, QueryParams)>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_page(&self, page: serde_json::Value) {
            self.responses.lock().unwrap().push_back(Ok(page));
        }

        pub fn push_error(&self, error: ApiError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        pub fn requests(&self) -> Vec<(String, QueryParams)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl DataGateway for FakeGateway {
        async fn get_page<R>(&self, endpoint: &str, query: &QueryParams) -> Result<PageEnvelope<R>>
        where
            R: DeserializeOwned + Send,
        {
            self.requests
                .lock()
                .unwrap()
                .push((endpoint.to_string(), query.clone()));

            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::ServerError("no canned response".into())))?;
            serde_json::from_value(next).map_err(|e| ApiError::InvalidResponse(e.to_string()))
        }
    }
}
