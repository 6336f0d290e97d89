/// Result alias used across the timeline engine.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Top-level error type for keyframe, flight-path, and workspace operations.
#[derive(thiserror::Error, Debug)]
pub enum TimelineError {
    /// Percentage or clamp math attempted against an unusable phase duration.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Property key is not a recognized animatable property.
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// An explicit edit referenced an id that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Structural input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Snapshot (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, propagated transparently.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimelineError {
    /// Build [`TimelineError::InvalidDuration`].
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    /// Build [`TimelineError::UnknownProperty`].
    pub fn unknown_property(msg: impl Into<String>) -> Self {
        Self::UnknownProperty(msg.into())
    }

    /// Build [`TimelineError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build [`TimelineError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build [`TimelineError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
