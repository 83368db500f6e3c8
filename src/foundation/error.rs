/// Convenience result type used across stagegrid.
pub type StageResult<T> = Result<T, StageError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Zero-area trims and degenerate layouts are not errors: they are reported as values
/// ([`crate::TrimResult::is_empty`], [`crate::GridLayout::degenerate`]).
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// Invalid user-provided settings or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Input bytes could not be decoded as an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// The environment cannot produce a frame capture stream.
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Another capture is already in flight.
    #[error("capture busy: {0}")]
    CaptureBusy(String),

    /// Errors while encoding frames or still images.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing project data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Build a [`StageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StageError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StageError::CaptureUnavailable`] value.
    pub fn capture_unavailable(msg: impl Into<String>) -> Self {
        Self::CaptureUnavailable(msg.into())
    }

    /// Build a [`StageError::CaptureBusy`] value.
    pub fn capture_busy(msg: impl Into<String>) -> Self {
        Self::CaptureBusy(msg.into())
    }

    /// Build a [`StageError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`StageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
