use thiserror::Error;

/// Why a single distance lookup produced no result.
///
/// Timeouts, network errors and server-side HTTP statuses (5xx, 408, 429)
/// are worth retrying; the others are answers from the service that will
/// not change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Timeout: API took too long to respond")]
    Timeout,

    #[error("Request Error: {0}")]
    Transport(String),

    #[error("HTTP Error: status {0}")]
    HttpStatus(u16),

    #[error("API Error: {status} - {}", .message.as_deref().unwrap_or("Unknown error"))]
    ApiStatus {
        status: String,
        message: Option<String>,
    },

    #[error("Route Error: {0}")]
    RouteStatus(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl LookupError {
    pub fn is_transient(&self) -> bool {
        match self {
            LookupError::Timeout | LookupError::Transport(_) => true,
            LookupError::HttpStatus(status) => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter
        let err = err.without_url();
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_decode() {
            LookupError::Malformed(err.to_string())
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}
