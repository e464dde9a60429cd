//! Application-wide error type.
//!
//! Wraps configuration and API errors and maps every variant to a message
//! that can be shown in the status line or printed by the CLI.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A command-line argument that parsed but makes no sense.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// A message for the user, free of transport details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find the configuration directory.".to_string()
                }
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Could not save configuration. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read the configuration file.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "The configuration file is invalid. Check the TOML syntax.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => {
                    "Not signed in. Store a session token with 'dispatchdesk token set'.".to_string()
                }
                ApiError::Forbidden => {
                    "Access denied. Your account cannot see this resource.".to_string()
                }
                ApiError::NotFound(resource) => format!("'{}' was not found.", resource),
                ApiError::RateLimited => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                ApiError::ServerError(_) => "Server error. Please try again later.".to_string(),
                ApiError::Network(_) => {
                    "Connection failed. Check your network connection.".to_string()
                }
                ApiError::InvalidUrl(_) => "Invalid backend URL in configuration.".to_string(),
                ApiError::Keyring(_) => "Could not access secure storage.".to_string(),
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the server.".to_string()
                }
                ApiError::Conflict => {
                    "The record was changed on the server. Refresh and try again.".to_string()
                }
                ApiError::UpdateFailed(msg) => format!("Update rejected: {}", msg),
            },
            AppError::Io(_) => "A file operation failed.".to_string(),
            AppError::Terminal(msg) => format!("Terminal error: {}", msg),
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Errors the user has to fix before anything else works.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Unauthorized)
                | AppError::Api(ApiError::Forbidden)
                | AppError::Api(ApiError::InvalidUrl(_))
                | AppError::Terminal(_)
        )
    }

    /// Errors after which retrying or carrying on makes sense.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Api(e) => {
                e.is_transient()
                    || matches!(
                        e,
                        ApiError::NotFound(_)
                            | ApiError::UpdateFailed(_)
                            | ApiError::Conflict
                            | ApiError::InvalidResponse(_)
                    )
            }
            _ => false,
        }
    }

    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::NoConfigDir)
            | AppError::Config(ConfigError::ReadError(_)) => Some(
                "Create a config file with a [[profiles]] entry, see 'dispatchdesk config path'.",
            ),
            AppError::Api(ApiError::Unauthorized) => {
                Some("Run 'dispatchdesk token set' with a valid session token.")
            }
            AppError::Api(ApiError::RateLimited) | AppError::Api(ApiError::ServerError(_)) => {
                Some("Wait a few seconds and press 'r' to refresh.")
            }
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::InvalidUrl(_)) => {
                Some("Check your network connection and the profile URL.")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_error() {
        let err: AppError = ConfigError::NoConfigDir.into();
        assert!(matches!(err, AppError::Config(ConfigError::NoConfigDir)));
        assert!(err.is_critical());
        assert!(err.suggested_action().is_some());
    }

    #[test]
    fn test_unauthorized_is_critical() {
        let err: AppError = ApiError::Unauthorized.into();
        assert!(err.is_critical());
        assert!(!err.is_recoverable());
        assert!(err.user_message().contains("token set"));
    }

    #[test]
    fn test_transient_api_errors_are_recoverable() {
        for err in [
            ApiError::RateLimited,
            ApiError::ServerError("HTTP 502".to_string()),
        ] {
            let err = AppError::Api(err);
            assert!(err.is_recoverable());
            assert!(!err.is_critical());
            assert!(err.suggested_action().unwrap().contains("refresh"));
        }
    }

    #[test]
    fn test_not_found_message_names_resource() {
        let err = AppError::Api(ApiError::NotFound("complaint 12".to_string()));
        assert!(err.user_message().contains("complaint 12"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_validation_message() {
        let err = AppError::Config(ConfigError::ValidationError(
            "duplicate profile name 'main'".to_string(),
        ));
        assert!(err.user_message().contains("duplicate profile"));
    }

    #[test]
    fn test_plain_messages() {
        assert_eq!(
            AppError::terminal("raw mode").user_message(),
            "Terminal error: raw mode"
        );
        assert_eq!(AppError::other("boom").user_message(), "boom");
        assert_eq!(
            AppError::invalid_argument("--pages must be at least 1").user_message(),
            "--pages must be at least 1"
        );
    }
}
