//! GitHub API error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the GitHub GraphQL API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("GitHub server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP request error: {0}")]
    Http(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("JSON deserialization error: {0}")]
    Deserialize(String),
}

impl GitHubError {
    /// Classify an HTTP status code and response body into a typed error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = body.trim().chars().take(200).collect::<String>();
        match status {
            401 | 403 => Self::Auth(format!("{status}: {message}")),
            429 => Self::RateLimited(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Api(format!("{status}: {message}")),
        }
    }
}

impl From<HttpError> for GitHubError {
    fn from(err: HttpError) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for GitHubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialize(err.to_string())
    }
}

/// Whether a pagination request is worth another attempt.
pub fn is_transient_error(err: &GitHubError) -> bool {
    matches!(
        err,
        GitHubError::Http(_) | GitHubError::RateLimited(_) | GitHubError::Server { .. }
    )
}
