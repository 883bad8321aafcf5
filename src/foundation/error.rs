/// Crate-wide result alias.
pub type InkResult<T> = Result<T, InkError>;

/// Errors raised by the ink engine.
///
/// Arbitration conflicts, empty updates and degenerate resize requests are not errors: they are
/// reported through return values (`false`, empty deltas, no-op outcomes).
#[derive(thiserror::Error, Debug)]
pub enum InkError {
    /// Invalid configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster surface allocation or size mismatch.
    #[error("surface error: {0}")]
    Surface(String),

    /// Geometry pipeline used out of order.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InkError {
    /// Build an [`InkError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`InkError::Surface`].
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build an [`InkError::Pipeline`].
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Build an [`InkError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for InkError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
