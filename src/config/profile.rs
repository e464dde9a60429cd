//! Backend profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// A backend profile.
///
/// Profiles store connection details for one deployment of the delivery
/// backend. Session tokens are stored separately in the OS keychain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// The backend base URL (e.g., "https://ops.example.com").
    pub url: String,

    /// Business account that complaint lists are scoped to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_user_id: Option<String>,
}

impl Profile {
    /// Create a new profile.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            business_user_id: None,
        }
    }

    /// Scope this profile to a business account.
    pub fn with_business_user(mut self, id: impl Into<String>) -> Self {
        self.business_user_id = Some(id.into());
        self
    }

    /// Validate this profile.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL cannot be empty",
                self.name
            )));
        }

        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': URL must start with http:// or https://",
                self.name
            )));
        }

        if let Some(id) = &self.business_user_id {
            if id.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{}': business_user_id cannot be blank",
                    self.name
                )));
            }
        }

        Ok(())
    }
}
