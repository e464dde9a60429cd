//! Terminal events and input debouncing.

mod debounce;
mod handler;

use crossterm::event::KeyEvent;

pub use debounce::{Debouncer, TrailingDebounce};
pub use handler::EventHandler;

/// Events fed into `App::update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// No input within the tick interval; drives timers and spinners.
    Tick,
    Quit,
}
