//! Application state and update loop.
//!
//! Follows The Elm Architecture: [`App::update`] consumes events and API
//! results, [`App::view`] renders. The app never talks to the network itself;
//! work is queued as [`Command`]s which the main loop drains with
//! [`App::take_commands`] and hands to the task spawner.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Tabs},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::catalog::validate_custom_date;
use crate::config::{Config, Profile};
use crate::controller::{self, FetchOutcome, ListScreen, PageRequest};
use crate::error::AppError;
use crate::events::Event;
use crate::i18n::{Translate, Translations};
use crate::routing::NavigationContext;
use crate::screen::{CollectionType, Screen};
use crate::tasks::ApiMessage;
use crate::ui::components::centered_rect;
use crate::ui::{ListAction, ListView, NotificationManager, OptionPicker, PickerAction, TextInput};

/// Work for the main loop to run in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchPage { screen: Screen, request: PageRequest },
    CloseComplaint(String),
}

/// Which controller input the open picker edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerTarget {
    Filter,
    SearchBy,
    DateRange,
}

/// One tab: a controller plus its view.
struct Tab {
    screen: Box<dyn ListScreen>,
    view: ListView,
    mounted: bool,
}

pub struct App {
    should_quit: bool,
    profile: Option<Profile>,
    translations: Translations,
    tabs: Vec<Tab>,
    active_tab: usize,
    route: NavigationContext,
    picker: OptionPicker,
    picker_target: Option<PickerTarget>,
    /// Open while the custom date is being edited.
    date_input: Option<TextInput>,
    notifications: NotificationManager,
    commands: Vec<Command>,
    search_debounce: Duration,
    end_reached_debounce: Duration,
}

impl App {
    /// Build the app for the config's default profile and mount the first tab.
    pub fn new(config: &Config, route: NavigationContext) -> Self {
        Self::starting_at(config, route, Screen::Orders)
    }

    /// Like [`App::new`], but opens on `start`. Only that tab fetches.
    pub fn starting_at(config: &Config, route: NavigationContext, start: Screen) -> Self {
        let collection_type = match start {
            Screen::Collections(kind) => kind,
            _ => CollectionType::default(),
        };
        let profile = config.get_default_profile().cloned();
        let business_user = profile.as_ref().and_then(|p| p.business_user_id.clone());
        let settings = &config.settings;
        let search_debounce = Duration::from_millis(settings.search_debounce_ms);
        let end_reached_debounce = Duration::from_millis(settings.end_reached_debounce_ms);

        let tabs = [
            Screen::Orders,
            Screen::Collections(collection_type),
            Screen::Complaints,
        ]
        .into_iter()
        .map(|screen| Tab {
            screen: controller::for_screen(screen, business_user.clone()),
            view: ListView::new(search_debounce, end_reached_debounce),
            mounted: false,
        })
        .collect::<Vec<_>>();
        let active_tab = tabs
            .iter()
            .position(|t| t.screen.screen() == start)
            .unwrap_or(0);

        let mut app = Self {
            should_quit: false,
            profile,
            translations: Translations::new(&settings.language, &config.translations),
            tabs,
            active_tab,
            route,
            picker: OptionPicker::new(),
            picker_target: None,
            date_input: None,
            notifications: NotificationManager::new(),
            commands: Vec::new(),
            search_debounce,
            end_reached_debounce,
        };
        app.mount_active_tab();
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn active_screen(&self) -> &dyn ListScreen {
        self.tabs[self.active_tab].screen.as_ref()
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    /// Drain the queued background work.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn update(&mut self, event: Event) {
        self.update_at(event, Instant::now());
    }

    /// `update` with an explicit clock, so debounce windows are testable.
    pub(crate) fn update_at(&mut self, event: Event, now: Instant) {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
            }
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key_event(key, now);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => self.handle_tick(now),
        }
    }

    /// Route a background result to the tab that asked for it.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::PageFetched {
                screen,
                request,
                result,
            } => {
                // The collections tab is rebuilt when its type changes; results
                // for the old type have no tab any more.
                let Some(tab) = self.tabs.iter_mut().find(|t| t.screen.screen() == screen) else {
                    debug!(%screen, "Dropping page for a screen that is gone");
                    return;
                };

                let outcome = tab.screen.apply_untyped(&request, result);
                tab.view.sync_len(tab.screen.len());
                if outcome == FetchOutcome::Failed {
                    if let Some(error) = tab.screen.last_error() {
                        let message = format!("Loading {} failed: {}", screen, error);
                        self.notifications.error(message);
                    }
                }
            }
            ApiMessage::ComplaintClosed { id, result } => match result {
                Ok(()) => {
                    info!(complaint = %id, "Complaint closed");
                    self.notifications.success(format!("Complaint {} closed", id));
                    if let Some(index) = self.tab_index(Screen::Complaints) {
                        let request = self.tabs[index].screen.refresh();
                        self.queue_fetch(index, Some(request));
                    }
                }
                Err(e) => {
                    let error = AppError::from(e);
                    warn!(complaint = %id, error = %error, "Closing complaint failed");
                    self.notifications.error(error.user_message());
                }
            },
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }

        if self.picker.is_visible() {
            if let Some(action) = self.picker.handle_input(key) {
                self.handle_picker_action(action);
            }
            return;
        }

        if self.date_input.is_some() {
            self.handle_date_input(key);
            return;
        }

        let tab = &mut self.tabs[self.active_tab];
        let len = tab.screen.len();
        if let Some(action) = tab.view.handle_input(key, len, now) {
            self.handle_list_action(self.active_tab, action);
        }
    }

    fn handle_tick(&mut self, now: Instant) {
        self.notifications.tick(now);
        for index in 0..self.tabs.len() {
            if let Some(action) = self.tabs[index].view.tick(now) {
                self.handle_list_action(index, action);
            }
        }
    }

    fn handle_list_action(&mut self, index: usize, action: ListAction) {
        debug!(?action, tab = index, "List action");
        match action {
            ListAction::Search(text) => {
                let request = self.tabs[index].screen.set_search_text(text);
                self.queue_fetch(index, request);
            }
            ListAction::EndReached => {
                let request = self.tabs[index].screen.load_more();
                self.queue_fetch(index, request);
            }
            ListAction::OpenFilterPicker => self.open_picker(PickerTarget::Filter),
            ListAction::OpenSearchByPicker => self.open_picker(PickerTarget::SearchBy),
            ListAction::OpenDateRangePicker => self.open_picker(PickerTarget::DateRange),
            ListAction::EditCustomDate => {
                let mut input = TextInput::with_placeholder("YYYY-MM-DD");
                if let Some(date) = &self.tabs[index].screen.filters().selected_custom_date {
                    input.set_value(date.as_str());
                }
                self.date_input = Some(input);
            }
            ListAction::ClearFilters => {
                let tab = &mut self.tabs[index];
                let request = tab.screen.clear_filters(&mut self.route);
                tab.view.reset();
                self.queue_fetch(index, Some(request));
            }
            ListAction::CycleCollectionType => self.cycle_collection_type(index),
            ListAction::CloseRecord(row) => self.close_record(index, row),
            ListAction::Refresh => {
                info!(screen = %self.tabs[index].screen.screen(), "Refreshing");
                let request = self.tabs[index].screen.refresh();
                self.queue_fetch(index, Some(request));
            }
            ListAction::NextTab => {
                self.active_tab = (self.active_tab + 1) % self.tabs.len();
                self.mount_active_tab();
            }
            ListAction::Quit => self.should_quit = true,
        }
    }

    fn open_picker(&mut self, target: PickerTarget) {
        let screen = self.tabs[self.active_tab].screen.as_ref();
        let catalog = screen.catalog();
        let filters = screen.filters();
        let t = &self.translations;

        let (title, labels, active): (&str, Vec<String>, Option<usize>) = match target {
            PickerTarget::Filter => (
                "Status",
                catalog.filter_by.iter().map(|o| t.translate(&o.name)).collect(),
                filters
                    .active_filter
                    .as_ref()
                    .and_then(|active| catalog.filter_by.iter().position(|o| o == active)),
            ),
            // Index 0 is "any field" / "any date".
            PickerTarget::SearchBy => (
                "Search by",
                std::iter::once("Any field".to_string())
                    .chain(catalog.search_by.iter().map(|o| t.translate(&o.name)))
                    .collect(),
                Some(filters.active_search_by.as_ref().map_or(0, |active| {
                    catalog
                        .search_by
                        .iter()
                        .position(|o| o == active)
                        .map_or(0, |i| i + 1)
                })),
            ),
            PickerTarget::DateRange => (
                "Date range",
                std::iter::once("Any date".to_string())
                    .chain(catalog.date_ranges.iter().map(|o| t.translate(&o.name)))
                    .collect(),
                Some(filters.active_date_range.as_ref().map_or(0, |active| {
                    catalog
                        .date_ranges
                        .iter()
                        .position(|o| o == active)
                        .map_or(0, |i| i + 1)
                })),
            ),
        };

        self.picker.show(title, labels, active);
        self.picker_target = Some(target);
    }

    fn handle_picker_action(&mut self, action: PickerAction) {
        let Some(target) = self.picker_target.take() else {
            return;
        };
        let PickerAction::Select(choice) = action else {
            return;
        };

        let index = self.active_tab;
        let screen = &mut self.tabs[index].screen;
        let catalog = screen.catalog().clone();
        let request = match target {
            PickerTarget::Filter => screen.set_filter(catalog.filter_by.get(choice).cloned()),
            PickerTarget::SearchBy => screen.set_search_by(
                choice
                    .checked_sub(1)
                    .and_then(|i| catalog.search_by.get(i).cloned()),
            ),
            PickerTarget::DateRange => {
                let range = choice
                    .checked_sub(1)
                    .and_then(|i| catalog.date_ranges.get(i).cloned());
                let needs_date = range.as_ref().is_some_and(|r| r.action.is_custom())
                    && screen.filters().selected_custom_date.is_none();
                let request = screen.set_date_range(range);
                if needs_date {
                    self.notifications.info("Press D to pick the day");
                }
                request
            }
        };
        self.queue_fetch(index, request);
    }

    fn handle_date_input(&mut self, key: KeyEvent) {
        let Some(input) = self.date_input.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.date_input = None,
            KeyCode::Enter => {
                let entered = input.value().to_string();
                match validate_custom_date(&entered) {
                    Ok(date) => {
                        self.date_input = None;
                        self.apply_custom_date(date);
                    }
                    Err(message) => self.notifications.error(message),
                }
            }
            _ => {
                input.handle_input(key);
            }
        }
    }

    /// Set the custom day and switch the date range to `custom` if needed.
    fn apply_custom_date(&mut self, date: String) {
        let index = self.active_tab;
        let screen = &mut self.tabs[index].screen;

        let mut request = screen.set_custom_date(date);
        let custom_active = screen
            .filters()
            .active_date_range
            .as_ref()
            .is_some_and(|r| r.action.is_custom());
        if !custom_active {
            let custom = screen
                .catalog()
                .date_ranges
                .iter()
                .find(|o| o.action.is_custom())
                .cloned();
            request = screen.set_date_range(custom);
        }
        self.queue_fetch(index, request);
    }

    fn cycle_collection_type(&mut self, index: usize) {
        let Screen::Collections(kind) = self.tabs[index].screen.screen() else {
            self.notifications.info("Only collections have types");
            return;
        };

        let next = Screen::Collections(kind.next());
        info!(from = %kind.as_str(), to = %next, "Switching collection type");
        let business_user = self.profile.as_ref().and_then(|p| p.business_user_id.clone());
        self.tabs[index] = Tab {
            screen: controller::for_screen(next, business_user),
            view: ListView::new(self.search_debounce, self.end_reached_debounce),
            mounted: false,
        };
        self.mount(index);
    }

    fn close_record(&mut self, index: usize, row: usize) {
        let screen = self.tabs[index].screen.as_ref();
        if screen.screen() != Screen::Complaints {
            self.notifications.info("Only complaints can be closed");
            return;
        }
        if let Some(id) = screen.record_id(row) {
            debug!(complaint = %id, "Closing complaint");
            self.commands.push(Command::CloseComplaint(id.to_string()));
        }
    }

    fn mount_active_tab(&mut self) {
        self.mount(self.active_tab);
    }

    /// First fetch for a tab, picking up navigation parameters.
    fn mount(&mut self, index: usize) {
        let tab = &mut self.tabs[index];
        if tab.mounted {
            return;
        }
        tab.mounted = true;

        let request = tab
            .screen
            .sync_route(&self.route)
            .unwrap_or_else(|| tab.screen.refresh());
        self.queue_fetch(index, Some(request));
    }

    fn queue_fetch(&mut self, index: usize, request: Option<PageRequest>) {
        if let Some(request) = request {
            let screen = self.tabs[index].screen.screen();
            debug!(%screen, query = %request.query, "Queueing fetch");
            self.commands.push(Command::FetchPage { screen, request });
        }
    }

    fn tab_index(&self, screen: Screen) -> Option<usize> {
        self.tabs.iter().position(|t| t.screen.screen() == screen)
    }

    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        self.render_tabs(frame, chunks[0]);

        let tab = &mut self.tabs[self.active_tab];
        tab.view
            .render(frame, chunks[1], tab.screen.as_ref(), &self.translations);

        self.picker.render(frame, area);
        if let Some(input) = &self.date_input {
            let dialog = centered_rect(area, 30, 3);
            frame.render_widget(Clear, dialog);
            input.render(frame, dialog, "Custom date", true);
        }
        self.notifications.render(frame, area);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = self
            .tabs
            .iter()
            .map(|tab| {
                let screen = tab.screen.screen();
                let title = self.translations.translate(screen.title_key());
                match screen {
                    Screen::Collections(kind) => Line::from(format!(
                        "{} ({})",
                        title,
                        self.translations.translate(&format!("collection.{}", kind.as_str()))
                    )),
                    _ => Line::from(title),
                }
            })
            .collect();

        let profile = self
            .profile
            .as_ref()
            .map(|p| format!(" dispatchdesk [{}] ", p.name))
            .unwrap_or_else(|| " dispatchdesk ".to_string());

        let tabs = Tabs::new(titles)
            .select(self.active_tab)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(profile),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, PageEnvelope};
    use crate::routing::RouteParams;
    use serde_json::{json, Value};

    fn config() -> Config {
        let mut config = Config::default();
        config
            .profiles
            .push(Profile::new("main", "https://ops.example.com").with_business_user("42"));
        config
    }

    fn app() -> App {
        App::new(&config(), NavigationContext::new())
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn code(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn fetches(app: &mut App) -> Vec<(Screen, PageRequest)> {
        app.take_commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::FetchPage { screen, request } => Some((screen, request)),
                Command::CloseComplaint(_) => None,
            })
            .collect()
    }

    fn page(ids: &[&str], total: u64) -> PageEnvelope<Value> {
        PageEnvelope::new(
            ids.iter()
                .map(|id| json!({"id": id, "status": "open"}))
                .collect(),
            total,
        )
    }

    /// Feed a page for the single pending fetch.
    fn deliver(app: &mut App, ids: &[&str], total: u64) {
        let mut pending = fetches(app);
        assert_eq!(pending.len(), 1, "expected one pending fetch");
        let (screen, request) = pending.remove(0);
        app.handle_api_message(ApiMessage::PageFetched {
            screen,
            request,
            result: Ok(page(ids, total)),
        });
    }

    #[test]
    fn test_first_tab_fetches_on_start() {
        let mut app = app();
        let pending = fetches(&mut app);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, Screen::Orders);
        assert_eq!(pending[0].1.query.to_query_string(), "page=1");
    }

    #[test]
    fn test_starting_at_collections_type() {
        let mut app = App::starting_at(
            &config(),
            NavigationContext::with_param("collectionIds", "7"),
            Screen::Collections(CollectionType::Driver),
        );
        let pending = fetches(&mut app);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.endpoint, "collections/driver");
        assert_eq!(pending[0].1.query.get("collection_ids"), Some("7"));
    }

    #[test]
    fn test_route_ids_forwarded_on_mount() {
        let mut app = App::new(&config(), NavigationContext::with_param("orderIds", "5,6"));
        let pending = fetches(&mut app);
        assert_eq!(pending[0].1.query.get("order_ids"), Some("5,6"));
    }

    #[test]
    fn test_scrolling_to_end_loads_next_page() {
        let mut app = app();
        deliver(&mut app, &["a", "b"], 4);
        assert_eq!(app.active_screen().len(), 2);

        app.update(key('j'));
        let pending = fetches(&mut app);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.query.get("page"), Some("2"));

        // Guard: a second end-reached while loading does nothing.
        app.update_at(key('G'), Instant::now() + Duration::from_secs(1));
        assert!(fetches(&mut app).is_empty());
    }

    #[test]
    fn test_end_reached_waits_for_refetched_first_page() {
        let mut app = app();
        deliver(&mut app, &["a", "b"], 4);
        let start = Instant::now();

        app.update(key('f'));
        app.update(key('j'));
        app.update(code(KeyCode::Enter));
        let (screen, request) = fetches(&mut app).remove(0);

        app.update_at(key('G'), start + Duration::from_secs(1));
        assert!(fetches(&mut app).is_empty());

        app.handle_api_message(ApiMessage::PageFetched {
            screen,
            request,
            result: Ok(page(&["n1", "n2"], 4)),
        });
        app.update_at(key('G'), start + Duration::from_secs(2));

        let pending = fetches(&mut app);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.query.get("page"), Some("2"));
        assert_eq!(pending[0].1.query.get("status"), Some("new"));
    }

    #[test]
    fn test_failed_page_notifies_and_keeps_items() {
        let mut app = app();
        deliver(&mut app, &["a", "b"], 4);
        app.update(key('j'));
        let (screen, request) = fetches(&mut app).remove(0);

        app.handle_api_message(ApiMessage::PageFetched {
            screen,
            request,
            result: Err(ApiError::ServerError("HTTP 500".into())),
        });

        assert_eq!(app.active_screen().len(), 2);
        assert!(!app.active_screen().is_loading_more());
        assert_eq!(app.notifications().len(), 1);
    }

    #[test]
    fn test_search_sent_after_debounce() {
        let mut app = app();
        fetches(&mut app);
        let start = Instant::now();

        app.update_at(key('/'), start);
        app.update_at(key('r'), start);
        app.update_at(key('a'), start);
        app.update_at(Event::Tick, start + Duration::from_millis(100));
        assert!(fetches(&mut app).is_empty());

        app.update_at(Event::Tick, start + Duration::from_millis(350));
        let pending = fetches(&mut app);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.query.get("search"), Some("ra"));
    }

    #[test]
    fn test_filter_picker_sets_status() {
        let mut app = app();
        fetches(&mut app);

        app.update(key('f'));
        app.update(key('j'));
        app.update(code(KeyCode::Enter));

        let pending = fetches(&mut app);
        assert_eq!(pending[0].1.query.get("status"), Some("new"));
    }

    #[test]
    fn test_search_by_picker_any_field_clears_binding() {
        let mut app = app();
        fetches(&mut app);

        app.update(key('s'));
        app.update(key('j'));
        app.update(code(KeyCode::Enter));
        assert_eq!(
            app.active_screen()
                .filters()
                .active_search_by
                .as_ref()
                .map(|o| o.action.as_str()),
            Some("order_id")
        );
        fetches(&mut app);

        app.update(key('s'));
        app.update(key('k'));
        app.update(code(KeyCode::Enter));
        assert!(app.active_screen().filters().active_search_by.is_none());
        assert_eq!(fetches(&mut app).len(), 1);
    }

    #[test]
    fn test_custom_date_switches_range() {
        let mut app = app();
        fetches(&mut app);

        app.update(key('D'));
        for c in "2024-05-01".chars() {
            app.update(key(c));
        }
        app.update(code(KeyCode::Enter));

        let pending = fetches(&mut app);
        assert_eq!(pending.len(), 1);
        let query = &pending[0].1.query;
        assert_eq!(query.get("date_range"), Some("custom"));
        assert_eq!(query.get("start_date"), Some("2024-05-01"));
        assert_eq!(query.get("end_date"), Some("2024-05-01"));
    }

    #[test]
    fn test_impossible_calendar_day_is_rejected() {
        let mut app = app();
        fetches(&mut app);

        app.update(key('D'));
        for c in "2024-02-30".chars() {
            app.update(key(c));
        }
        app.update(code(KeyCode::Enter));

        assert!(fetches(&mut app).is_empty());
        assert_eq!(app.notifications().len(), 1);
        assert!(app.active_screen().filters().selected_custom_date.is_none());
    }

    #[test]
    fn test_invalid_custom_date_is_rejected() {
        let mut app = app();
        fetches(&mut app);

        app.update(key('D'));
        for c in "2024-99-01".chars() {
            app.update(key(c));
        }
        app.update(code(KeyCode::Enter));

        assert!(fetches(&mut app).is_empty());
        assert_eq!(app.notifications().len(), 1);

        app.update(code(KeyCode::Esc));
        app.update(key('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_clear_drops_route_param() {
        let mut app = App::new(&config(), NavigationContext::with_param("orderIds", "5"));
        fetches(&mut app);

        app.update(key('c'));

        let pending = fetches(&mut app);
        assert!(!pending[0].1.query.contains_key("order_ids"));
        assert!(app.route.get_param("orderIds").is_none());
    }

    #[test]
    fn test_tabs_mount_lazily_with_business_scope() {
        let mut app = app();
        fetches(&mut app);

        app.update(code(KeyCode::Tab));
        let pending = fetches(&mut app);
        assert_eq!(pending[0].1.endpoint, "collections/money");

        app.update(code(KeyCode::Tab));
        let pending = fetches(&mut app);
        assert_eq!(pending[0].1.query.get("business_user_id"), Some("42"));

        // Back to orders: already mounted, no new fetch.
        app.update(code(KeyCode::Tab));
        assert!(fetches(&mut app).is_empty());
    }

    #[test]
    fn test_cycling_collection_type_drops_old_results() {
        let mut app = app();
        fetches(&mut app);
        app.update(code(KeyCode::Tab));
        let (old_screen, old_request) = fetches(&mut app).remove(0);

        app.update(key('t'));
        let pending = fetches(&mut app);
        assert_eq!(pending[0].1.endpoint, "collections/dispatched");

        app.handle_api_message(ApiMessage::PageFetched {
            screen: old_screen,
            request: old_request,
            result: Ok(page(&["stale"], 1)),
        });
        assert!(app.active_screen().is_empty());
    }

    #[test]
    fn test_close_complaint_then_refresh() {
        let mut app = app();
        fetches(&mut app);
        app.update(code(KeyCode::Tab));
        fetches(&mut app);
        app.update(code(KeyCode::Tab));
        deliver(&mut app, &["c1", "c2"], 2);

        app.update(key('x'));
        let commands = app.take_commands();
        assert_eq!(commands, vec![Command::CloseComplaint("c1".to_string())]);

        app.handle_api_message(ApiMessage::ComplaintClosed {
            id: "c1".to_string(),
            result: Ok(()),
        });
        let pending = fetches(&mut app);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, Screen::Complaints);
    }

    #[test]
    fn test_close_only_on_complaints() {
        let mut app = app();
        deliver(&mut app, &["o1"], 1);
        app.update(key('x'));
        assert!(app.take_commands().is_empty());
        assert_eq!(app.notifications().len(), 1);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.update(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());

        let mut other = App::new(&config(), NavigationContext::new());
        other.update(Event::Quit);
        assert!(other.should_quit());
    }

    #[test]
    fn test_q_quits_from_list() {
        let mut app = app();
        app.update(key('q'));
        assert!(app.should_quit());
    }
}
