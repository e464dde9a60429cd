//! Delivery backend API client and types.
//!
//! This module provides the interface for communicating with the delivery
//! operations REST API.

pub mod auth;
mod client;
pub mod error;
mod gateway;
mod query;
pub mod types;

pub use auth::Auth;
pub use client::DeliveryClient;
pub use error::ApiError;
pub use gateway::DataGateway;
pub use query::QueryParams;
pub use types::{Collection, Complaint, Order, PageEnvelope, Record};
