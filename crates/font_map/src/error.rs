//! Error types for font indexing and resolution

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("unsupported font resource: {0}")]
    UnsupportedResource(String),

    #[error("empty font resource: {0}")]
    EmptyResource(String),

    #[error("no font directory found")]
    NoFontDirectory,

    #[error("no valid font found after scanning")]
    NoValidFont,

    #[error("cache directory unavailable: {0}")]
    CacheDirectory(String),

    #[error("invalid binary data: {0}")]
    Decode(String),

    #[error("different index format version: found {found}, expected {expected}")]
    VersionMismatch { found: u16, expected: u16 },

    #[error("fontconfig configuration: {0}")]
    Fontconfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FontError {
    pub(crate) fn decode(what: impl Into<String>) -> Self {
        FontError::Decode(what.into())
    }
}

pub type Result<T> = std::result::Result<T, FontError>;
