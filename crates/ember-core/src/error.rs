//! Error types for Ember

use thiserror::Error;

use crate::id::EntityId;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Component busy: {0}")]
    ComponentBusy(String),

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("Animation error: {0}")]
    AnimationError(String),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}
