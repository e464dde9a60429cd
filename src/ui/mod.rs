//! Terminal rendering: the list view and the widgets it is built from.

pub mod components;
mod views;

pub use components::{
    NotificationManager, OptionPicker, PickerAction, TextInput,
};
pub use views::{ListAction, ListView};
