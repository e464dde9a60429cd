//! Delivery backend client implementation.
//!
//! This module provides the HTTP client for the delivery operations REST API.
//! It handles session credentials, request/response processing, error mapping,
//! and retry logic.

use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::gateway::DataGateway;
use super::query::QueryParams;
use super::types::{ComplaintStatus, ComplaintStatusUpdate, PageEnvelope};
use crate::config::{Profile, Settings};

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// The delivery backend client.
///
/// Cloning is cheap: clones share the connection pool and cookie store.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the backend, without trailing slash.
    base_url: String,
    /// Session credentials.
    auth: Auth,
}

impl DeliveryClient {
    /// Create a client for a profile.
    ///
    /// Picks up a stored session token from the OS keyring when one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(skip(profile, settings), fields(profile_name = %profile.name))]
    pub fn new(profile: &Profile, settings: &Settings) -> Result<Self> {
        info!("Creating delivery client for profile");

        let auth = Auth::from_keyring(&profile.name);
        Self::with_auth(
            &profile.url,
            auth,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Create a client with explicit credentials.
    pub fn with_auth(base_url: &str, auth: Auth, timeout: Duration) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(ApiError::InvalidUrl("base URL is empty".to_string()));
        }

        let client = Self::build_http_client(timeout)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            auth,
        })
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(ApiError::Network)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a list endpoint and query.
    pub fn endpoint_url(&self, endpoint: &str, query: &QueryParams) -> String {
        let endpoint = endpoint.trim_matches('/');
        if query.is_empty() {
            format!("{}/api/{}", self.base_url, endpoint)
        } else {
            format!("{}/api/{}?{}", self.base_url, endpoint, query)
        }
    }

    /// Close a complaint.
    ///
    /// Calls `PUT /api/complaints/{id}` with `{"status": "closed"}`.
    #[instrument(skip(self), fields(complaint_id = %id))]
    pub async fn close_complaint(&self, id: &str) -> Result<()> {
        let url = format!(
            "{}/api/complaints/{}",
            self.base_url,
            urlencoding::encode(id)
        );
        let body = ComplaintStatusUpdate {
            status: ComplaintStatus::Closed,
        };

        self.put(&url, &body).await.map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(format!("complaint '{}'", id)),
            other => other,
        })?;

        info!("Complaint closed");
        Ok(())
    }

    /// Perform a GET request with retries for transient failures.
    #[instrument(skip(self), fields(url = %url))]
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);

            match self.execute_get::<T>(url).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempts < MAX_RETRIES => {
                    let delay = Self::calculate_retry_delay(attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute a single GET request.
    async fn execute_get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = self.auth.header_value() {
            request = request.header(header::AUTHORIZATION, value);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Perform a PUT request. Mutations are not retried.
    async fn put<B: serde::Serialize>(&self, url: &str, body: &B) -> Result<()> {
        let mut request = self
            .client
            .put(url)
            .header(header::ACCEPT, "application/json")
            .json(body);
        if let Some(value) = self.auth.header_value() {
            request = request.header(header::AUTHORIZATION, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let url = response.url().to_string();
            let error_body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", error_body);
            Err(Self::error_from_response(status, &url, &error_body))
        }
    }

    /// Check the HTTP status and parse the JSON body.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", error_body);

            Err(Self::error_from_response(status, &url, &error_body))
        }
    }

    /// Create an error from an HTTP response, preferring the server's message.
    fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
        let context = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| server_message(&json))
            .unwrap_or_else(|| url.to_string());

        ApiError::from_status(status, &context)
    }

    /// Calculate retry delay with exponential backoff.
    fn calculate_retry_delay(attempt: u32) -> u64 {
        RETRY_DELAY_MS * 2u64.pow(attempt - 1)
    }
}

impl DataGateway for DeliveryClient {
    #[instrument(skip(self, query), fields(endpoint = %endpoint, query = %query))]
    async fn get_page<R>(&self, endpoint: &str, query: &QueryParams) -> Result<PageEnvelope<R>>
    where
        R: DeserializeOwned + Send,
    {
        let url = self.endpoint_url(endpoint, query);
        let page: PageEnvelope<R> = self.get(&url).await?;
        debug!(
            "Fetched {} records (total: {})",
            page.data.len(),
            page.total_records()
        );
        Ok(page)
    }
}

/// Pull a human readable message out of an error body.
///
/// The backend answers either `{"message": "..."}` or
/// `{"errors": {"field": ["..."]}}`.
fn server_message(json: &serde_json::Value) -> Option<String> {
    if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }

    let errors = json.get("errors")?.as_object()?;
    let parts: Vec<String> = errors
        .iter()
        .map(|(field, value)| match value {
            serde_json::Value::Array(items) => format!(
                "{}: {}",
                field,
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            serde_json::Value::String(s) => format!("{}: {}", field, s),
            other => format!("{}: {}", field, other),
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}
