//! Delivery backend request and response types.
//!
//! Every list endpoint answers with the same page envelope; the records inside
//! it are orders, collections or complaints.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use super::error::{ApiError, Result};

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Total number of records matching the current filters.
    #[serde(default)]
    pub total_records: u64,
}

/// One page of records.
///
/// Returned by `GET /api/{resource}[/{type}]`. The order of `data` is defined
/// by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope<R> {
    /// The records on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<R>,
    /// Pagination metadata.
    #[serde(default)]
    pub metadata: PageMetadata,
}

impl<R> PageEnvelope<R> {
    /// Build an envelope from records and a total count.
    pub fn new(data: Vec<R>, total_records: u64) -> Self {
        Self {
            data,
            metadata: PageMetadata { total_records },
        }
    }

    /// Total number of records reported by the server.
    pub fn total_records(&self) -> u64 {
        self.metadata.total_records
    }

    /// Whether this page carries no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PageEnvelope<serde_json::Value> {
    /// Decode untyped records into a concrete record type.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidResponse` naming the first record that does
    /// not match the expected shape.
    pub fn decode<R: DeserializeOwned>(self) -> Result<PageEnvelope<R>> {
        let data = self
            .data
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value).map_err(|e| {
                    ApiError::InvalidResponse(format!("record {} is malformed: {}", index, e))
                })
            })
            .collect::<Result<Vec<R>>>()?;

        Ok(PageEnvelope {
            data,
            metadata: self.metadata,
        })
    }
}

/// A record that can be shown in a list screen.
///
/// The list controller never looks inside records; only the view does, through
/// this trait.
pub trait Record: DeserializeOwned + Serialize + Clone + Send + 'static {
    /// Column headers for table rendering.
    const HEADERS: &'static [&'static str];

    /// The identifying field.
    fn record_id(&self) -> &str;

    /// Display cells, one per header.
    fn columns(&self) -> Vec<String>;
}

/// A delivery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Business-side reference number.
    #[serde(default)]
    pub reference_id: Option<String>,
    /// Receiving customer's name.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Receiving customer's phone.
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Order status.
    #[serde(default)]
    pub status: String,
    /// Cash to collect on delivery.
    #[serde(default)]
    pub total_amount: Option<f64>,
    /// Creation timestamp as sent by the server.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Any other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record for Order {
    const HEADERS: &'static [&'static str] = &["ID", "Reference", "Customer", "Phone", "Status", "Amount"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            or_dash(self.reference_id.as_deref()),
            or_dash(self.customer_name.as_deref()),
            or_dash(self.customer_phone.as_deref()),
            self.status.clone(),
            format_amount(self.total_amount),
        ]
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order {} [{}]", self.id, self.status)
    }
}

/// A cash or parcel collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Collection status.
    #[serde(default)]
    pub status: String,
    /// Collected amount, for money collections.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Driver handling the collection.
    #[serde(default)]
    pub driver_name: Option<String>,
    /// Number of orders bundled in the collection.
    #[serde(default)]
    pub orders_count: Option<u32>,
    /// Creation timestamp as sent by the server.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Any other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record for Collection {
    const HEADERS: &'static [&'static str] = &["ID", "Status", "Driver", "Orders", "Amount", "Created"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.clone(),
            or_dash(self.driver_name.as_deref()),
            self.orders_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format_amount(self.amount),
            or_dash(self.created_at.as_deref()),
        ]
    }
}

/// A customer or business complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Complaint ID.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// The order the complaint is about, if any.
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub order_id: Option<String>,
    /// Short subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Complaint status.
    #[serde(default)]
    pub status: String,
    /// Creation timestamp as sent by the server.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Any other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Complaint {
    /// Whether the complaint is already closed.
    pub fn is_closed(&self) -> bool {
        self.status == ComplaintStatus::Closed.as_str()
    }
}

impl Record for Complaint {
    const HEADERS: &'static [&'static str] = &["ID", "Order", "Subject", "Status", "Created"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            or_dash(self.order_id.as_deref()),
            or_dash(self.subject.as_deref()),
            self.status.clone(),
            or_dash(self.created_at.as_deref()),
        ]
    }
}

/// Complaint status values accepted by the status mutation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Closed,
}

impl ComplaintStatus {
    /// The wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Closed => "closed",
        }
    }
}

/// Body of `PUT /api/complaints/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintStatusUpdate {
    pub status: ComplaintStatus,
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

fn format_amount(amount: Option<f64>) -> String {
    amount
        .map(|a| format!("{:.2}", a))
        .unwrap_or_else(|| "-".to_string())
}

/// IDs arrive as numbers from some endpoints and strings from others.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

fn optional_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeId {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match MaybeId::deserialize(deserializer)? {
        MaybeId::Text(s) => Some(s),
        MaybeId::Number(n) => Some(n.to_string()),
        MaybeId::Null => None,
    })
}
