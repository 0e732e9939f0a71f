//! Error types for talus

use thiserror::Error;

/// The main error type for talus operations
#[derive(Debug, Error)]
pub enum TalusError {
    #[error("Failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("Invalid asset format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl TalusError {
    /// Build an `AssetLoad` error from a path and any displayable cause.
    pub fn asset_load(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        TalusError::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for talus operations
pub type Result<T> = std::result::Result<T, TalusError>;

impl From<toml::de::Error> for TalusError {
    fn from(err: toml::de::Error) -> Self {
        TalusError::TomlParseError(err.to_string())
    }
}
