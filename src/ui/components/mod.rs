//! Reusable widgets.

mod input;
mod loading;
mod notification;
mod picker;

pub use input::TextInput;
pub use loading::Spinner;
pub use notification::{Notification, NotificationKind, NotificationManager};
pub use picker::{centered_rect, OptionPicker, PickerAction};
