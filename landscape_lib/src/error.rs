//! Error types for the Landscape API client.

use thiserror::Error;

/// Base error type for Landscape operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Client misconfiguration (missing or malformed endpoint).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Connection failure, timeout or TLS failure; never retried.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The login endpoint answered with anything but 200.
    #[error("Login rejected: {0}")]
    Rejected(ApiError),

    /// The server answered with a body we could not parse.
    #[error("Could not decode response: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl Error {
    /// True for errors detected before any network call because the client
    /// was not given what it needs (credentials, endpoint).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::Auth(AuthError::NoCredentials)
                | Error::Auth(AuthError::MissingCredentials)
        )
    }

    /// HTTP status attached to the error, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Rejected(e) | Error::Api(e) => e.status_code,
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Failures of the authentication strategies themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no authentication method provided")]
    NoCredentials,

    #[error("access key or secret key missing")]
    MissingCredentials,

    #[error("could not sign request: {0}")]
    SigningFailed(String),

    #[error("client is not authenticated; call login() first")]
    NotAuthenticated,
}

/// Raised when the API returns an error response.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
    pub response_data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(
        message: impl Into<String>,
        status_code: Option<u16>,
        response_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            response_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(Error::from(AuthError::NoCredentials).is_configuration());
        assert!(Error::from(AuthError::MissingCredentials).is_configuration());
        assert!(Error::Config("no endpoint".into()).is_configuration());
        assert!(!Error::from(AuthError::NotAuthenticated).is_configuration());
        let rejected = Error::Rejected(ApiError::new("403 Forbidden", Some(403), None));
        assert!(!rejected.is_configuration());
    }

    #[test]
    fn rejected_carries_status() {
        let err = Error::Rejected(ApiError::new("403 Forbidden", Some(403), None));
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.to_string(), "Login rejected: 403 Forbidden");
    }
}
