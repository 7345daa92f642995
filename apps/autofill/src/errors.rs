use thiserror::Error;

/// Shown when the parsing API gives no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to parse CV. Please try again.";

/// Application-level error type.
/// Every variant is recoverable: the user re-selects and re-uploads.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// The text surfaced to the user for this failure.
    /// Server-provided messages are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api {
                message: Some(msg), ..
            } if !msg.is_empty() => msg.clone(),
            AppError::Http(e) => {
                tracing::warn!("Parser request failed: {e}");
                FALLBACK_ERROR_MESSAGE.to_string()
            }
            AppError::Decode(e) => {
                tracing::warn!("Parser response could not be decoded: {e}");
                FALLBACK_ERROR_MESSAGE.to_string()
            }
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}
