//! Type-erased access to a list controller.
//!
//! The application holds orders, collections and complaints side by side, so
//! it talks to them through [`ListScreen`] instead of the generic controller.
//! Pages arrive untyped from background tasks and are decoded here.

use serde_json::Value;

use super::{ControllerState, FetchOutcome, FilterState, ListController, PageRequest};
use crate::api::{ApiError, PageEnvelope, Record};
use crate::catalog::{DateRangeOption, FilterCatalog, FilterOption, SearchByOption};
use crate::routing::RouteParams;
use crate::screen::Screen;

pub trait ListScreen: Send {
    fn screen(&self) -> Screen;
    fn catalog(&self) -> &FilterCatalog;
    fn filters(&self) -> &FilterState;

    fn headers(&self) -> &'static [&'static str];
    /// Display cells for every loaded record.
    fn rows(&self) -> Vec<Vec<String>>;
    fn record_id(&self, index: usize) -> Option<&str>;
    /// Loaded records as JSON, in display order.
    fn items_json(&self) -> serde_json::Result<Value>;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn total_records(&self) -> u64;
    fn current_page(&self) -> u32;
    fn is_loading_more(&self) -> bool;
    fn has_more(&self) -> bool;
    fn last_error(&self) -> Option<&str>;

    fn refresh(&mut self) -> PageRequest;
    fn set_search_text(&mut self, text: String) -> Option<PageRequest>;
    fn set_filter(&mut self, filter: Option<FilterOption>) -> Option<PageRequest>;
    fn set_search_by(&mut self, search_by: Option<SearchByOption>) -> Option<PageRequest>;
    fn set_date_range(&mut self, range: Option<DateRangeOption>) -> Option<PageRequest>;
    fn set_custom_date(&mut self, date: String) -> Option<PageRequest>;
    fn sync_route(&mut self, route: &dyn RouteParams) -> Option<PageRequest>;
    fn clear_filters(&mut self, route: &mut dyn RouteParams) -> PageRequest;
    fn load_more(&mut self) -> Option<PageRequest>;

    /// Decode an untyped page and merge it.
    ///
    /// A page with a malformed record counts as a failed fetch.
    fn apply_untyped(
        &mut self,
        request: &PageRequest,
        result: Result<PageEnvelope<Value>, ApiError>,
    ) -> FetchOutcome;
}

impl<R: Record> ListScreen for ListController<R> {
    fn screen(&self) -> Screen {
        self.binding().screen()
    }

    fn catalog(&self) -> &FilterCatalog {
        ListController::catalog(self)
    }

    fn filters(&self) -> &FilterState {
        &self.state().filters
    }

    fn headers(&self) -> &'static [&'static str] {
        R::HEADERS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.items().iter().map(Record::columns).collect()
    }

    fn record_id(&self, index: usize) -> Option<&str> {
        self.items().get(index).map(Record::record_id)
    }

    fn items_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.items())
    }

    fn len(&self) -> usize {
        self.items().len()
    }

    fn total_records(&self) -> u64 {
        self.state().total_records
    }

    fn current_page(&self) -> u32 {
        self.state().current_page
    }

    fn is_loading_more(&self) -> bool {
        ControllerState::is_loading_more(self.state())
    }

    fn has_more(&self) -> bool {
        self.state().has_more()
    }

    fn last_error(&self) -> Option<&str> {
        ListController::last_error(self)
    }

    fn refresh(&mut self) -> PageRequest {
        ListController::refresh(self)
    }

    fn set_search_text(&mut self, text: String) -> Option<PageRequest> {
        ListController::set_search_text(self, text)
    }

    fn set_filter(&mut self, filter: Option<FilterOption>) -> Option<PageRequest> {
        ListController::set_filter(self, filter)
    }

    fn set_search_by(&mut self, search_by: Option<SearchByOption>) -> Option<PageRequest> {
        ListController::set_search_by(self, search_by)
    }

    fn set_date_range(&mut self, range: Option<DateRangeOption>) -> Option<PageRequest> {
        ListController::set_date_range(self, range)
    }

    fn set_custom_date(&mut self, date: String) -> Option<PageRequest> {
        ListController::set_custom_date(self, date)
    }

    fn sync_route(&mut self, route: &dyn RouteParams) -> Option<PageRequest> {
        ListController::sync_route(self, route)
    }

    fn clear_filters(&mut self, route: &mut dyn RouteParams) -> PageRequest {
        ListController::clear_filters(self, route)
    }

    fn load_more(&mut self) -> Option<PageRequest> {
        ListController::load_more(self)
    }

    fn apply_untyped(
        &mut self,
        request: &PageRequest,
        result: Result<PageEnvelope<Value>, ApiError>,
    ) -> FetchOutcome {
        let typed = result.and_then(|page| page.decode::<R>());
        self.apply(request, typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, Complaint};
    use crate::screen::{CollectionType, ScreenBinding};
    use serde_json::json;

    fn complaints() -> Box<dyn ListScreen> {
        Box::new(ListController::<Complaint>::new(ScreenBinding::new(
            Screen::Complaints,
        )))
    }

    #[test]
    fn test_apply_untyped_decodes_records() {
        let mut screen = complaints();
        let request = screen.refresh();

        let page = PageEnvelope::new(
            vec![json!({"id": 1, "subject": "Late", "status": "open"})],
            3,
        );
        let outcome = screen.apply_untyped(&request, Ok(page));

        assert_eq!(outcome, FetchOutcome::Applied { received: 1 });
        assert_eq!(screen.len(), 1);
        assert_eq!(screen.record_id(0), Some("1"));
        assert_eq!(screen.rows()[0][2], "Late");
        assert!(screen.has_more());
    }

    #[test]
    fn test_apply_untyped_rejects_malformed_page() {
        let mut screen = complaints();
        let request = screen.refresh();

        let page = PageEnvelope::new(vec![json!({"subject": "no id"})], 1);
        let outcome = screen.apply_untyped(&request, Ok(page));

        assert_eq!(outcome, FetchOutcome::Failed);
        assert!(screen.is_empty());
        assert!(screen.last_error().unwrap().contains("malformed"));
    }

    #[test]
    fn test_headers_follow_record_type() {
        let collections: Box<dyn ListScreen> = Box::new(ListController::<Collection>::new(
            ScreenBinding::new(Screen::Collections(CollectionType::Driver)),
        ));
        assert_eq!(collections.headers(), Collection::HEADERS);
        assert_eq!(
            collections.screen(),
            Screen::Collections(CollectionType::Driver)
        );
    }

    #[test]
    fn test_items_json() {
        let mut screen = complaints();
        let request = screen.refresh();
        screen.apply_untyped(
            &request,
            Ok(PageEnvelope::new(vec![json!({"id": "c1", "status": "closed"})], 1)),
        );

        let json = screen.items_json().unwrap();
        assert_eq!(json[0]["id"], "c1");
        assert_eq!(json[0]["status"], "closed");
    }
}
