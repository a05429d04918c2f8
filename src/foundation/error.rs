/// Convenience result type used across Underlay.
pub type UnderlayResult<T> = Result<T, UnderlayError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum UnderlayError {
    /// Invalid user-provided input (missing file, empty prompt, bad geometry).
    #[error("validation error: {0}")]
    Validation(String),

    /// An image failed to decode or fetch.
    #[error("load error: {0}")]
    Load(String),

    /// The final raster or document failed to encode.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Non-success response from an external service.
    #[error("upstream error (status {status}): {message}")]
    Upstream {
        /// HTTP-status-like code reported by the collaborator.
        status: u16,
        /// Short diagnostic description.
        message: String,
    },

    /// The credential pool was configured empty.
    #[error("no API keys available")]
    NoKeysAvailable,

    /// Every credential in the pool has failed within the current window.
    #[error("all API keys exhausted")]
    KeysExhausted,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UnderlayError {
    /// Build an [`UnderlayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`UnderlayError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build an [`UnderlayError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build an [`UnderlayError::Upstream`] value.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Return `true` when the error carries a credential-related upstream
    /// status (401 unauthorized / 402 quota exceeded).
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, Self::Upstream { status, .. } if *status == 401 || *status == 402)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
