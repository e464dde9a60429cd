//! Label translation.
//!
//! Catalog options and screen titles carry label keys such as
//! `status.in_transit`. Keys are looked up in the `[translations.<lang>]`
//! tables of the config file; missing keys fall back to a readable form of the
//! key itself.

use std::collections::HashMap;

/// Resolves label keys to display text.
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

/// Translation tables for the active language.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    language: String,
    labels: HashMap<String, String>,
}

impl Translations {
    /// Pick the table for `language` out of all configured tables.
    pub fn new(language: &str, tables: &HashMap<String, HashMap<String, String>>) -> Self {
        let labels = tables.get(language).cloned().unwrap_or_default();
        if labels.is_empty() {
            tracing::debug!(language, "No translations configured, using label keys");
        }
        Self {
            language: language.to_string(),
            labels,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Translate for Translations {
    fn translate(&self, key: &str) -> String {
        match self.labels.get(key) {
            Some(label) => label.clone(),
            None => humanize(key),
        }
    }
}

/// `status.in_transit` -> `In transit`.
pub fn humanize(key: &str) -> String {
    let last = key.rsplit('.').next().unwrap_or(key);
    let spaced = last.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
