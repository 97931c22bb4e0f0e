use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether repeating the request could plausibly succeed.
    ///
    /// Connection-refused errors are not retried: the server is down and
    /// hammering it only delays the error message.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::ConnectionRefused(_)
            | ApiError::InvalidUrl(_)
            | ApiError::NotFound
            | ApiError::Unauthorized(_)
            | ApiError::Decode(_) => false,
            ApiError::Status { .. } | ApiError::Network(_) | ApiError::Timeout(_) => true,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Invalid redirect URL: {0}")]
    InvalidRedirect(String),

    #[error("Sign-in was denied: {0}")]
    Denied(String),

    #[error("Redirect URL has no authorization code")]
    MissingCode,

    #[error("OAuth state does not match the request")]
    StateMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::Timeout(100).is_retryable());
        assert!(ApiError::Status {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        // Any other status is retried, client errors included
        for status in [400, 403, 409, 422, 429] {
            assert!(ApiError::Status {
                status,
                message: "rejected".to_string()
            }
            .is_retryable());
        }
        assert!(!ApiError::Unauthorized("expired".to_string()).is_retryable());
        assert!(!ApiError::Decode("bad json".to_string()).is_retryable());
        assert!(!ApiError::NotFound.is_retryable());
        assert!(!ApiError::ConnectionRefused("localhost:3000".to_string()).is_retryable());
    }
}
