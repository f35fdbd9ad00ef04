/// Result alias used throughout the crate.
pub type LayerModeResult<T> = Result<T, LayerModeError>;

/// Errors surfaced by the compositing kernel.
///
/// All of these are precondition violations detected at configuration, prepare or call
/// boundaries. Nothing inside the per-pixel loops produces an error.
#[derive(thiserror::Error, Debug)]
pub enum LayerModeError {
    /// Invalid configuration (opacity out of range, immutable option, missing converter).
    #[error("configuration error: {0}")]
    Config(String),

    /// Pixel runs whose lengths do not line up.
    #[error("buffer error: {0}")]
    Buffer(String),

    /// Operation used in the wrong lifecycle state.
    #[error("state error: {0}")]
    State(String),

    /// Configuration (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerModeError {
    /// Build a [`LayerModeError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`LayerModeError::Buffer`].
    pub fn buffer(msg: impl Into<String>) -> Self {
        Self::Buffer(msg.into())
    }

    /// Build a [`LayerModeError::State`].
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`LayerModeError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
