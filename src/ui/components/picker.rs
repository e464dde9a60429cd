//! Popup list for choosing one option.
//!
//! Used for the status filter, search-by field and date range pickers.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// What the user did in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    /// Index into the labels passed to `show`.
    Select(usize),
    Cancel,
}

#[derive(Debug, Default)]
pub struct OptionPicker {
    title: String,
    labels: Vec<String>,
    /// Index of the option currently in effect, marked in the list.
    active: Option<usize>,
    visible: bool,
    list_state: ListState,
}

impl OptionPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the picker with the cursor on the active option.
    pub fn show(&mut self, title: impl Into<String>, labels: Vec<String>, active: Option<usize>) {
        self.title = title.into();
        self.labels = labels;
        self.active = active;
        self.list_state
            .select(Some(active.unwrap_or(0).min(self.labels.len().saturating_sub(1))));
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<PickerAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                if let Some(i) = self.selected() {
                    if i + 1 < self.labels.len() {
                        self.list_state.select(Some(i + 1));
                    }
                }
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                if let Some(i) = self.selected() {
                    self.list_state.select(Some(i.saturating_sub(1)));
                }
                None
            }
            (KeyCode::Enter, _) => {
                self.visible = false;
                self.selected()
                    .filter(|i| *i < self.labels.len())
                    .map(PickerAction::Select)
            }
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.visible = false;
                Some(PickerAction::Cancel)
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let width = 44u16.min(area.width.saturating_sub(4));
        // Borders (2) + hint (1) + items, capped at 12 visible items.
        let height = (self.labels.len().min(12) as u16 + 3).min(area.height.saturating_sub(2));
        let dialog = centered_rect(area, width, height);

        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let list_area = Rect {
            height: inner.height.saturating_sub(1),
            ..inner
        };
        let hint_area = Rect {
            y: inner.y + list_area.height,
            height: 1,
            ..inner
        };

        let items: Vec<ListItem> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                if Some(i) == self.active {
                    ListItem::new(Span::styled(
                        format!("{} ✓", label),
                        Style::default().fg(Color::Green),
                    ))
                } else {
                    ListItem::new(label.as_str())
                }
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        let hint = Paragraph::new(Span::styled(
            "j/k:navigate  Enter:select  Esc:cancel",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(hint, hint_area);
    }
}

/// A `width` x `height` rectangle centered in `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn labels() -> Vec<String> {
        vec!["All".into(), "Pending".into(), "Paid".into()]
    }

    #[test]
    fn test_show_starts_on_active_option() {
        let mut picker = OptionPicker::new();
        picker.show("Status", labels(), Some(2));
        assert!(picker.is_visible());
        assert_eq!(picker.selected(), Some(2));
    }

    #[test]
    fn test_navigate_and_select() {
        let mut picker = OptionPicker::new();
        picker.show("Status", labels(), None);

        picker.handle_input(key(KeyCode::Char('j')));
        picker.handle_input(key(KeyCode::Char('j')));
        picker.handle_input(key(KeyCode::Char('j')));
        assert_eq!(picker.selected(), Some(2));

        picker.handle_input(key(KeyCode::Char('k')));
        assert_eq!(
            picker.handle_input(key(KeyCode::Enter)),
            Some(PickerAction::Select(1))
        );
        assert!(!picker.is_visible());
    }

    #[test]
    fn test_cancel() {
        let mut picker = OptionPicker::new();
        picker.show("Date", labels(), None);
        assert_eq!(
            picker.handle_input(key(KeyCode::Esc)),
            Some(PickerAction::Cancel)
        );
        assert!(!picker.is_visible());
    }

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(Rect::new(0, 0, 100, 50), 40, 10);
        assert_eq!(rect, Rect::new(30, 20, 40, 10));
    }
}
