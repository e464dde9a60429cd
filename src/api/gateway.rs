//! The data-fetch boundary used by list controllers.

use std::future::Future;

use serde::de::DeserializeOwned;

use super::error::Result;
use super::query::QueryParams;
use super::types::PageEnvelope;

/// Fetches one page of records from a list endpoint.
///
/// `endpoint` is the path below `/api/`, for example `orders` or
/// `collections/money`. Implemented by [`super::DeliveryClient`] for real
/// traffic and by in-memory fakes in tests.
pub trait DataGateway: Sync {
    fn get_page<R>(
        &self,
        endpoint: &str,
        query: &QueryParams,
    ) -> impl Future<Output = Result<PageEnvelope<R>>> + Send
    where
        R: DeserializeOwned + Send;
}
