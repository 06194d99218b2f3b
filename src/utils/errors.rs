use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SproutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no input files matched the configured patterns")]
    NoInputFiles,

    #[error("invalid asset engine: {name}")]
    InvalidEngine { name: String },

    #[error("cannot resolve asset: {}", path.display())]
    AssetNotFound { path: PathBuf },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("build error: {0}")]
    Build(String),
}

impl SproutError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    pub fn invalid_engine(name: impl Into<String>) -> Self {
        Self::InvalidEngine { name: name.into() }
    }

    pub fn asset_not_found(path: impl Into<PathBuf>) -> Self {
        Self::AssetNotFound { path: path.into() }
    }
}

pub type Result<T> = std::result::Result<T, SproutError>;

impl From<anyhow::Error> for SproutError {
    fn from(err: anyhow::Error) -> Self {
        SproutError::build(err.to_string())
    }
}

impl From<glob::PatternError> for SproutError {
    fn from(err: glob::PatternError) -> Self {
        SproutError::config(format!("invalid glob pattern: {}", err))
    }
}

impl From<serde_json::Error> for SproutError {
    fn from(err: serde_json::Error) -> Self {
        SproutError::config(format!("JSON error: {}", err))
    }
}
