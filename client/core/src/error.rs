use thiserror::Error;

/// Top-level error type for the StudyLens client.
///
/// Logical failures reported inside a 2xx envelope are not errors at this
/// level; they surface as [`crate::ProcessingOutcome::Failure`].
#[derive(Debug, Error)]
pub enum LensError {
    /// The selected file could not be read or converted to a payload.
    #[error("image encoding failed: {0}")]
    Encoding(String),

    /// The file was rejected before upload (wrong type, too large).
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The backend answered with a failure status. `message` is already
    /// normalized: the body's `message`, then its `error`, then a
    /// synthesized `HTTP {status}: {reason}` line.
    #[error("{message}")]
    Transport { status: u16, message: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Network(String),

    /// A success response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LensError {
    /// Flatten to the string shown to the user.
    ///
    /// Errors that carry no text fall back to a generic message so the
    /// caller never renders a blank error.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Unknown error occurred".to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_is_shown_verbatim() {
        let err = LensError::Transport {
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(err.user_message(), "internal error");
    }

    #[test]
    fn empty_message_falls_back_to_generic() {
        let err = LensError::Other(anyhow::anyhow!(""));
        assert_eq!(err.user_message(), "Unknown error occurred");
    }
}
