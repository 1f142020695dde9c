//! GitLab API error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when interacting with the GitLab API.
#[derive(Debug, Error)]
pub enum GitLabError {
    #[error("GitLab API error: {0}")]
    Api(String),

    #[error("GitLab server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP request error: {0}")]
    Http(String),

    #[error("JSON deserialization error: {0}")]
    Deserialize(String),

    #[error("Invalid GitLab configuration: {0}")]
    Config(String),
}

impl GitLabError {
    /// Classify an HTTP status code and response body into a typed error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = short_body(body);
        match status {
            401 | 403 => Self::Auth(format!("{status}: {message}")),
            429 => Self::RateLimited(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Api(format!("{status}: {message}")),
        }
    }
}

impl From<HttpError> for GitLabError {
    fn from(err: HttpError) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for GitLabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialize(err.to_string())
    }
}

/// Whether an error is worth another attempt: transport hiccups, rate
/// limiting, and server-side 5xx responses. Auth and client errors are not.
pub fn is_transient_error(err: &GitLabError) -> bool {
    matches!(
        err,
        GitLabError::Http(_) | GitLabError::RateLimited(_) | GitLabError::Server { .. }
    )
}

/// Trim a response body down to something loggable.
fn short_body(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(GitLabError::from_status(401, "x"), GitLabError::Auth(_)));
        assert!(matches!(GitLabError::from_status(403, "x"), GitLabError::Auth(_)));
        assert!(matches!(
            GitLabError::from_status(429, "x"),
            GitLabError::RateLimited(_)
        ));
        assert!(matches!(
            GitLabError::from_status(502, "x"),
            GitLabError::Server { status: 502, .. }
        ));
        assert!(matches!(GitLabError::from_status(404, "x"), GitLabError::Api(_)));
    }

    #[test]
    fn transient_classification() {
        assert!(is_transient_error(&GitLabError::Http("reset".into())));
        assert!(is_transient_error(&GitLabError::RateLimited("slow down".into())));
        assert!(is_transient_error(&GitLabError::Server {
            status: 503,
            message: "unavailable".into()
        }));
        assert!(!is_transient_error(&GitLabError::Auth("denied".into())));
        assert!(!is_transient_error(&GitLabError::Api("400: bad".into())));
    }

    #[test]
    fn long_bodies_are_trimmed() {
        let body = "x".repeat(500);
        let err = GitLabError::from_status(400, &body);
        let text = err.to_string();
        assert!(text.len() < 300);
    }
}
