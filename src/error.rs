//! Error types for image generation and persistence.

/// Errors that can occur while generating, downloading, or saving an image.
#[derive(Debug, thiserror::Error)]
pub enum PromptPixError {
    /// Prompt was empty or whitespace-only.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// API responded successfully but carried no image descriptor.
    #[error("no image returned in response")]
    NoImageReturned,

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code of the failing response.
        status: u16,
        /// Response body, as returned by the provider.
        message: String,
    },

    /// Network or HTTP error at either hop.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A generation request is already in flight on this generator.
    #[error("a generation request is already in flight")]
    Busy,

    /// API key missing or empty.
    #[error("credential is empty")]
    EmptyCredential,

    /// Downloaded data could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// I/O error while persisting an image or settings.
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PromptPixError {
    /// Short human-readable status line for presentation in a UI.
    ///
    /// Every error is recovered at its point of origin and surfaced as a
    /// one-line status message; none are fatal to the process.
    pub fn status_message(&self) -> String {
        match self {
            Self::EmptyPrompt => "Please enter a prompt.".into(),
            Self::NoImageReturned => "No image URL received in response.".into(),
            Self::Api { status, .. } => format!("Error: request failed with status {status}"),
            Self::Transport(e) => format!("Error: {e}"),
            Self::Busy => "A generation is already running.".into(),
            Self::EmptyCredential => "API key cannot be empty.".into(),
            Self::Decode(msg) => format!("Error decoding image: {msg}"),
            Self::Write(e) => format!("Error saving image: {e}"),
            Self::Json(e) => format!("Error reading response: {e}"),
        }
    }
}

/// Result type alias for generation and persistence operations.
pub type Result<T> = std::result::Result<T, PromptPixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PromptPixError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        assert_eq!(PromptPixError::EmptyPrompt.to_string(), "prompt is empty");
        assert_eq!(
            PromptPixError::NoImageReturned.to_string(),
            "no image returned in response"
        );
    }

    #[test]
    fn test_status_messages_are_single_line() {
        let errors = [
            PromptPixError::EmptyPrompt,
            PromptPixError::NoImageReturned,
            PromptPixError::Busy,
            PromptPixError::EmptyCredential,
            PromptPixError::Decode("truncated".into()),
        ];
        for err in errors {
            let msg = err.status_message();
            assert!(!msg.is_empty());
            assert!(!msg.contains('\n'));
        }
    }

    #[test]
    fn test_io_error_converts_to_write() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PromptPixError = io.into();
        assert!(matches!(err, PromptPixError::Write(_)));
        assert!(err.status_message().starts_with("Error saving image"));
    }
}
