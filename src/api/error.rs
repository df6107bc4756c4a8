use thiserror::Error;

/// Errors surfaced by the fires API client.
///
/// Every variant is opaque to the render path: fetch failures are captured
/// at the cache-entry level and never thrown into a widget.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {body}")]
    Server {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("No data available for date range")]
    EmptyRange,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data. The cut
    /// must land on a char boundary or slicing panics on multibyte bodies.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Server {
            status,
            body: Self::truncate_body(body),
        }
    }

    /// True when the error denotes an empty dataset rather than a failure.
    pub fn is_empty_range(&self) -> bool {
        matches!(self, ApiError::EmptyRange)
    }
}
