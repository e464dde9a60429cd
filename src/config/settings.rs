//! Application settings configuration.

use serde::{Deserialize, Serialize};

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// Language code used to resolve display labels.
    pub language: String,
    /// Debounce window for end-of-list detection, in milliseconds.
    pub end_reached_debounce_ms: u64,
    /// Quiet period after the last keystroke before a search is sent, in milliseconds.
    pub search_debounce_ms: u64,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            language: "en".to_string(),
            end_reached_debounce_ms: 300,
            search_debounce_ms: 300,
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings = toml::from_str("language = \"ar\"").unwrap();
        assert_eq!(settings.language, "ar");
        assert_eq!(settings.end_reached_debounce_ms, 300);
        assert_eq!(settings.request_timeout_secs, 30);
        assert!(settings.default_profile.is_none());
    }
}
