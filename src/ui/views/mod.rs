//! Screens.

mod list;

pub use list::{ListAction, ListView};
