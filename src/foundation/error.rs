/// Convenience result type used across the crate.
pub type FollowPointResult<T> = Result<T, FollowPointError>;

/// Recoverable errors surfaced by follow-point APIs.
///
/// Broken internal contracts (removing a target that was never registered, registering one twice,
/// releasing a stale pool handle) are programming errors and panic instead.
#[derive(thiserror::Error, Debug)]
pub enum FollowPointError {
    /// Invalid target data (non-finite values, non-positive preempt, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid renderer or pool options.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing playfield data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FollowPointError {
    /// Build a [`FollowPointError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FollowPointError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FollowPointError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
