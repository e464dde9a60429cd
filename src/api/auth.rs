//! Session authentication for the delivery backend.
//!
//! Sessions are primarily cookie based. A profile may additionally carry a
//! session token in the OS keyring, sent as a bearer token on every request.

use super::error::{ApiError, Result};

/// The keyring service name for dispatchdesk session tokens.
const KEYRING_SERVICE: &str = "dispatchdesk";

/// Session credentials attached to outgoing requests.
#[derive(Clone, Default)]
pub struct Auth {
    /// The complete `Authorization` header value, if a token is known.
    auth_header: Option<String>,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("has_token", &self.auth_header.is_some())
            .finish()
    }
}

impl Auth {
    /// Credentials that rely on session cookies only.
    pub fn anonymous() -> Self {
        Self { auth_header: None }
    }

    /// Credentials from an explicit session token.
    pub fn bearer(token: &str) -> Self {
        Self {
            auth_header: Some(format!("Bearer {}", token.trim())),
        }
    }

    /// Load credentials for a profile from the OS keyring.
    ///
    /// A missing keyring entry is not an error: the client then relies on
    /// cookies alone.
    pub fn from_keyring(profile_name: &str) -> Self {
        match get_token(profile_name) {
            Ok(token) => Self::bearer(&token),
            Err(e) => {
                tracing::debug!(profile = %profile_name, error = %e, "No stored session token");
                Self::anonymous()
            }
        }
    }

    /// Get the authorization header value, if any.
    pub fn header_value(&self) -> Option<&str> {
        self.auth_header.as_deref()
    }
}

/// Store a session token in the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))
}

/// Retrieve a session token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be retrieved from the keyring.
pub fn get_token(profile_name: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}

/// Delete a session token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be deleted from the keyring.
pub fn delete_token(profile_name: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .delete_password()
        .map_err(|e| ApiError::Keyring(format!("failed to delete token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let auth = Auth::bearer("abc123");
        assert_eq!(auth.header_value(), Some("Bearer abc123"));
    }

    #[test]
    fn test_bearer_trims_whitespace() {
        let auth = Auth::bearer("  abc123\n");
        assert_eq!(auth.header_value(), Some("Bearer abc123"));
    }

    #[test]
    fn test_anonymous_has_no_header() {
        assert!(Auth::anonymous().header_value().is_none());
        assert!(Auth::default().header_value().is_none());
    }

    #[test]
    fn test_auth_does_not_expose_token() {
        let auth = Auth::bearer("secret_token");
        let debug_output = format!("{:?}", auth);

        assert!(!debug_output.contains("secret_token"));
        assert!(debug_output.contains("has_token: true"));
    }
}
