//! dispatchdesk: a terminal client for delivery operations.
//!
//! Browse orders, collections and complaints from a delivery backend with
//! server-side search, status filters, date ranges and paged loading.

pub mod api;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod i18n;
pub mod logging;
pub mod routing;
pub mod screen;
pub mod tasks;
pub mod tui;
pub mod ui;
