//! Paginated record list with a search box.
//!
//! The view owns only presentation state: the selected row, the search input
//! and the two debouncers. Data comes from a [`ListScreen`] at render time and
//! every data change is reported back to the app as a [`ListAction`].

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tracing::trace;

use crate::controller::ListScreen;
use crate::events::{Debouncer, TrailingDebounce};
use crate::i18n::Translate;
use crate::ui::components::{Spinner, TextInput};

/// What the list view asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    /// The search text settled on a new value.
    Search(String),
    /// The last row became visible; request the next page.
    EndReached,
    OpenFilterPicker,
    OpenSearchByPicker,
    OpenDateRangePicker,
    EditCustomDate,
    ClearFilters,
    CycleCollectionType,
    /// Close the complaint on the given row.
    CloseRecord(usize),
    Refresh,
    NextTab,
    Quit,
}

pub struct ListView {
    table_state: TableState,
    search: TextInput,
    search_focused: bool,
    search_debounce: TrailingDebounce<String>,
    end_reached: Debouncer,
    spinner: Spinner,
}

impl ListView {
    pub fn new(search_debounce: Duration, end_reached_debounce: Duration) -> Self {
        Self {
            table_state: TableState::default(),
            search: TextInput::with_placeholder("Press / to search"),
            search_focused: false,
            search_debounce: TrailingDebounce::new(search_debounce),
            end_reached: Debouncer::new(end_reached_debounce),
            spinner: Spinner::new(),
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn is_search_focused(&self) -> bool {
        self.search_focused
    }

    pub fn search_text(&self) -> &str {
        self.search.value()
    }

    /// Reset search input and selection, e.g. after clearing filters.
    pub fn reset(&mut self) {
        self.search.clear();
        self.search_debounce.cancel();
        self.search_focused = false;
        self.table_state.select(None);
        self.end_reached.reset();
    }

    /// Keep the selection inside the list after it changed length.
    pub fn sync_len(&mut self, len: usize) {
        match (self.table_state.selected(), len) {
            (_, 0) => self.table_state.select(None),
            (None, _) => self.table_state.select(Some(0)),
            (Some(i), _) if i >= len => self.table_state.select(Some(len - 1)),
            _ => {}
        }
    }

    /// Advance timers: the spinner and the trailing search debounce.
    pub fn tick(&mut self, now: Instant) -> Option<ListAction> {
        self.spinner.tick();
        self.search_debounce.poll(now).map(ListAction::Search)
    }

    pub fn handle_input(&mut self, key: KeyEvent, len: usize, now: Instant) -> Option<ListAction> {
        if self.search_focused {
            return self.handle_search_input(key, now);
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                let next = self.selected().map_or(0, |i| i + 1);
                self.select(next, len, now)
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                let prev = self.selected().map_or(0, |i| i.saturating_sub(1));
                self.select(prev, len, now)
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.select(0, len, now)
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.select(len.saturating_sub(1), len, now)
            }
            (KeyCode::Char('/'), _) => {
                self.search_focused = true;
                None
            }
            (KeyCode::Char('f'), KeyModifiers::NONE) => Some(ListAction::OpenFilterPicker),
            (KeyCode::Char('s'), KeyModifiers::NONE) => Some(ListAction::OpenSearchByPicker),
            (KeyCode::Char('d'), KeyModifiers::NONE) => Some(ListAction::OpenDateRangePicker),
            (KeyCode::Char('D'), _) => Some(ListAction::EditCustomDate),
            (KeyCode::Char('c'), KeyModifiers::NONE) => Some(ListAction::ClearFilters),
            (KeyCode::Char('t'), KeyModifiers::NONE) => Some(ListAction::CycleCollectionType),
            (KeyCode::Char('x'), KeyModifiers::NONE) => {
                self.selected().filter(|i| *i < len).map(ListAction::CloseRecord)
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => Some(ListAction::Refresh),
            (KeyCode::Tab, _) => Some(ListAction::NextTab),
            (KeyCode::Char('q'), KeyModifiers::NONE) => Some(ListAction::Quit),
            _ => None,
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent, now: Instant) -> Option<ListAction> {
        match key.code {
            KeyCode::Esc => {
                self.search_focused = false;
                None
            }
            KeyCode::Enter => {
                self.search_focused = false;
                self.search_debounce.flush().map(ListAction::Search)
            }
            _ => {
                if self.search.handle_input(key) {
                    self.search_debounce
                        .push(self.search.value().to_string(), now);
                }
                None
            }
        }
    }

    /// Move the selection; landing on the last row fires end-reached.
    fn select(&mut self, index: usize, len: usize, now: Instant) -> Option<ListAction> {
        if len == 0 {
            return None;
        }
        let index = index.min(len - 1);
        self.table_state.select(Some(index));

        if index == len - 1 && self.end_reached.should_fire(now) {
            trace!(index, "End of list reached");
            return Some(ListAction::EndReached);
        }
        None
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        screen: &dyn ListScreen,
        labels: &dyn Translate,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let search_title = match &screen.filters().active_search_by {
            Some(by) => format!("Search by {}", labels.translate(&by.name)),
            None => "Search".to_string(),
        };
        self.search
            .render(frame, chunks[0], &search_title, self.search_focused);

        self.render_table(frame, chunks[1], screen, labels);
        self.render_status(frame, chunks[2], screen, labels);
    }

    fn render_table(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        screen: &dyn ListScreen,
        labels: &dyn Translate,
    ) {
        let headers = screen.headers();
        let header = Row::new(headers.iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }));

        let rows: Vec<Row> = screen.rows().into_iter().map(Row::new).collect();
        let widths = vec![Constraint::Ratio(1, headers.len().max(1) as u32); headers.len()];

        let title = format!(
            " {} ({}/{}) ",
            labels.translate(screen.screen().title_key()),
            screen.len(),
            screen.total_records()
        );

        let empty = screen.is_empty();
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(title),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(table, area, &mut self.table_state);

        if empty {
            let inner = Rect {
                x: area.x + 2,
                y: area.y + 2,
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No records",
                    Style::default().fg(Color::DarkGray),
                )),
                inner,
            );
        }
    }

    fn render_status(
        &self,
        frame: &mut Frame,
        area: Rect,
        screen: &dyn ListScreen,
        labels: &dyn Translate,
    ) {
        let filters = screen.filters();
        let mut spans = vec![Span::styled(
            format!(" page {} ", screen.current_page()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        )];

        if let Some(filter) = filters.active_filter.as_ref().filter(|f| !f.is_unfiltered()) {
            spans.push(Span::raw(format!(" {} ", labels.translate(&filter.name))));
        }
        if let Some(range) = &filters.active_date_range {
            let mut label = labels.translate(&range.name);
            if let (true, Some(date)) = (range.action.is_custom(), &filters.selected_custom_date) {
                label = format!("{} {}", label, date);
            }
            spans.push(Span::styled(
                format!(" {} ", label),
                Style::default().fg(Color::Magenta),
            ));
        }
        if let Some(ids) = &filters.id_list {
            spans.push(Span::raw(format!(" ids:{} ", ids)));
        }
        if screen.is_loading_more() {
            spans.push(Span::styled(
                format!(" {} loading more ", self.spinner.frame()),
                Style::default().fg(Color::Yellow),
            ));
        }
        if let Some(error) = screen.last_error() {
            spans.push(Span::styled(
                format!(" {} ", error),
                Style::default().fg(Color::Red),
            ));
        } else {
            spans.push(Span::styled(
                " /:search f:status s:field d:date c:clear r:refresh q:quit",
                Style::default().fg(Color::DarkGray),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_moving_onto_last_row_fires_end_reached() {
        let mut view = ListView::default();
        let now = Instant::now();
        view.sync_len(3);

        assert_eq!(view.handle_input(key(KeyCode::Char('j')), 3, now), None);
        assert_eq!(
            view.handle_input(key(KeyCode::Char('j')), 3, now),
            Some(ListAction::EndReached)
        );
        assert_eq!(view.selected(), Some(2));
    }

    #[test]
    fn test_end_reached_is_debounced() {
        let mut view = ListView::default();
        let now = Instant::now();
        view.sync_len(2);

        assert_eq!(
            view.handle_input(key(KeyCode::Char('G')), 2, now),
            Some(ListAction::EndReached)
        );
        assert_eq!(view.handle_input(key(KeyCode::Char('j')), 2, now), None);
        assert_eq!(
            view.handle_input(
                key(KeyCode::Char('j')),
                2,
                now + Duration::from_millis(300)
            ),
            Some(ListAction::EndReached)
        );
    }

    #[test]
    fn test_empty_list_never_fires() {
        let mut view = ListView::default();
        assert_eq!(
            view.handle_input(key(KeyCode::Char('G')), 0, Instant::now()),
            None
        );
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_search_is_debounced_until_idle() {
        let mut view = ListView::default();
        let start = Instant::now();

        view.handle_input(key(KeyCode::Char('/')), 0, start);
        assert!(view.is_search_focused());
        for (i, c) in "ab".chars().enumerate() {
            view.handle_input(
                key(KeyCode::Char(c)),
                0,
                start + Duration::from_millis(100 * i as u64),
            );
        }

        assert_eq!(view.tick(start + Duration::from_millis(200)), None);
        assert_eq!(
            view.tick(start + Duration::from_millis(400)),
            Some(ListAction::Search("ab".to_string()))
        );
        assert_eq!(view.tick(start + Duration::from_millis(800)), None);
    }

    #[test]
    fn test_enter_submits_search_immediately() {
        let mut view = ListView::default();
        let now = Instant::now();

        view.handle_input(key(KeyCode::Char('/')), 0, now);
        view.handle_input(key(KeyCode::Char('z')), 0, now);
        assert_eq!(
            view.handle_input(key(KeyCode::Enter), 0, now),
            Some(ListAction::Search("z".to_string()))
        );
        assert!(!view.is_search_focused());
    }

    #[test]
    fn test_shortcuts_ignored_while_typing() {
        let mut view = ListView::default();
        let now = Instant::now();

        view.handle_input(key(KeyCode::Char('/')), 0, now);
        assert_eq!(view.handle_input(key(KeyCode::Char('q')), 0, now), None);
        assert_eq!(view.search_text(), "q");
    }

    #[test]
    fn test_close_needs_selection() {
        let mut view = ListView::default();
        let now = Instant::now();
        assert_eq!(view.handle_input(key(KeyCode::Char('x')), 2, now), None);

        view.sync_len(2);
        assert_eq!(
            view.handle_input(key(KeyCode::Char('x')), 2, now),
            Some(ListAction::CloseRecord(0))
        );
    }

    #[test]
    fn test_sync_len_clamps_selection() {
        let mut view = ListView::default();
        view.sync_len(5);
        view.handle_input(key(KeyCode::Char('G')), 5, Instant::now());
        view.sync_len(2);
        assert_eq!(view.selected(), Some(1));
        view.sync_len(0);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_reset() {
        let mut view = ListView::default();
        let now = Instant::now();
        view.handle_input(key(KeyCode::Char('/')), 0, now);
        view.handle_input(key(KeyCode::Char('a')), 0, now);
        view.reset();

        assert!(view.search_text().is_empty());
        assert!(!view.is_search_focused());
        assert_eq!(view.tick(now + Duration::from_secs(1)), None);
    }
}
