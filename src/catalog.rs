//! Static filter, search-by and date-range options for each list screen.
//!
//! Option names are translation keys, resolved through [`crate::i18n`] at
//! render time. Option actions are the values sent to the backend.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::screen::{CollectionType, Screen};

/// Filter action meaning "do not filter by status".
pub const ALL_ACTION: &str = "all";

/// A status filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    /// Display label key.
    pub name: String,
    /// Value bound to the `status` query parameter.
    pub action: String,
}

impl FilterOption {
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
        }
    }

    /// Whether this option is the "all" sentinel that filters nothing.
    pub fn is_unfiltered(&self) -> bool {
        self.action.is_empty() || self.action == ALL_ACTION
    }
}

/// A field the free-text search can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchByOption {
    /// Display label key.
    pub name: String,
    /// Query parameter key the search text is bound to.
    pub action: String,
}

impl SearchByOption {
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
        }
    }
}

/// Relative date ranges understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    ThisYear,
    /// A single explicit day; needs a selected date.
    Custom,
}

impl DateRange {
    pub const ALL: [DateRange; 6] = [
        DateRange::Today,
        DateRange::Yesterday,
        DateRange::ThisWeek,
        DateRange::ThisMonth,
        DateRange::ThisYear,
        DateRange::Custom,
    ];

    /// The wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::ThisWeek => "this_week",
            DateRange::ThisMonth => "this_month",
            DateRange::ThisYear => "this_year",
            DateRange::Custom => "custom",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, DateRange::Custom)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown date range '{}' (expected one of: {})",
                    s,
                    DateRange::ALL.map(|r| r.as_str()).join(", ")
                )
            })
    }
}

/// Validate a `YYYY-MM-DD` day for the custom date range.
///
/// Returns the day zero-padded, so `2024-5-1` becomes `2024-05-01`.
pub fn validate_custom_date(input: &str) -> Result<String, String> {
    let date = input.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|day| day.format("%Y-%m-%d").to_string())
        .map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {}", date, e))
}

/// A date-range choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeOption {
    /// Display label key.
    pub name: String,
    /// Value bound to the `date_range` query parameter.
    pub action: DateRange,
}

impl DateRangeOption {
    pub fn new(name: impl Into<String>, action: DateRange) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }
}

/// The options offered by one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCatalog {
    pub filter_by: Vec<FilterOption>,
    pub search_by: Vec<SearchByOption>,
    pub date_ranges: Vec<DateRangeOption>,
}

impl FilterCatalog {
    /// The catalog for a screen.
    pub fn for_screen(screen: Screen) -> Self {
        let (filters, search_by): (&[(&str, &str)], &[(&str, &str)]) = match screen {
            Screen::Orders => (ORDER_FILTERS, ORDER_SEARCH_BY),
            Screen::Collections(kind) => (collection_filters(kind), COLLECTION_SEARCH_BY),
            Screen::Complaints => (COMPLAINT_FILTERS, COMPLAINT_SEARCH_BY),
        };

        Self {
            filter_by: filters
                .iter()
                .map(|(name, action)| FilterOption::new(*name, *action))
                .collect(),
            search_by: search_by
                .iter()
                .map(|(name, action)| SearchByOption::new(*name, *action))
                .collect(),
            date_ranges: DateRange::ALL
                .into_iter()
                .map(|range| DateRangeOption::new(format!("date.{}", range), range))
                .collect(),
        }
    }

    /// Find a status filter by its action.
    pub fn filter(&self, action: &str) -> Option<&FilterOption> {
        self.filter_by.iter().find(|o| o.action == action)
    }

    /// Find a search-by option by its query key.
    pub fn search_by(&self, action: &str) -> Option<&SearchByOption> {
        self.search_by.iter().find(|o| o.action == action)
    }

    /// Find the date-range option for a range.
    pub fn date_range(&self, range: DateRange) -> Option<&DateRangeOption> {
        self.date_ranges.iter().find(|o| o.action == range)
    }
}

const ORDER_FILTERS: &[(&str, &str)] = &[
    ("status.all", ALL_ACTION),
    ("status.new", "new"),
    ("status.processing", "processing"),
    ("status.in_transit", "in_transit"),
    ("status.delivered", "delivered"),
    ("status.returned", "returned"),
    ("status.cancelled", "cancelled"),
];

const ORDER_SEARCH_BY: &[(&str, &str)] = &[
    ("search_by.order_id", "order_id"),
    ("search_by.reference_id", "reference_id"),
    ("search_by.customer_name", "customer_name"),
    ("search_by.customer_phone", "customer_phone"),
];

const RETURNED_FILTERS: &[(&str, &str)] = &[
    ("status.all", ALL_ACTION),
    ("status.in_branch", "in_branch"),
    ("status.with_driver", "with_driver"),
    ("status.returned_to_business", "returned_to_business"),
];

const MONEY_FILTERS: &[(&str, &str)] = &[
    ("status.all", ALL_ACTION),
    ("status.pending", "pending"),
    ("status.collected", "collected"),
    ("status.transferred", "transferred"),
    ("status.paid", "paid"),
];

const DISPATCHED_FILTERS: &[(&str, &str)] = &[
    ("status.all", ALL_ACTION),
    ("status.ready", "ready"),
    ("status.dispatched", "dispatched"),
    ("status.received", "received"),
];

const DRIVER_FILTERS: &[(&str, &str)] = &[
    ("status.all", ALL_ACTION),
    ("status.with_driver", "with_driver"),
    ("status.settled", "settled"),
];

const COLLECTION_SEARCH_BY: &[(&str, &str)] = &[
    ("search_by.collection_id", "collection_id"),
    ("search_by.order_id", "order_id"),
    ("search_by.driver_name", "driver_name"),
];

const COMPLAINT_FILTERS: &[(&str, &str)] = &[
    ("status.all", ALL_ACTION),
    ("status.open", "open"),
    ("status.in_progress", "in_progress"),
    ("status.closed", "closed"),
];

const COMPLAINT_SEARCH_BY: &[(&str, &str)] = &[
    ("search_by.complaint_id", "complaint_id"),
    ("search_by.order_id", "order_id"),
];

fn collection_filters(kind: CollectionType) -> &'static [(&'static str, &'static str)] {
    match kind {
        CollectionType::Returned => RETURNED_FILTERS,
        CollectionType::Money => MONEY_FILTERS,
        CollectionType::Dispatched => DISPATCHED_FILTERS,
        CollectionType::Driver => DRIVER_FILTERS,
    }
}
