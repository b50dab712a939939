use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("Invalid file type: {} (expected {expected})", path.display())]
    InvalidInputExtension { path: PathBuf, expected: String },
    #[error("Cannot open container {}: {source}", path.display())]
    ContainerOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot read container {}: {source}", path.display())]
    ContainerFormat {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Cannot read entry '{entry}': {source}")]
    Entry {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Cannot decode image '{entry}': {source}")]
    Decode {
        entry: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Encoding error: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Manifest encoding error: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Duplicate logical name '{key}' ({first} and {second})")]
    DuplicateName {
        key: String,
        first: String,
        second: String,
    },
    #[error("Sprite sheet too large: {tiles} tiles of {tile_width}x{tile_height} in {columns} columns")]
    SheetTooLarge {
        tiles: usize,
        columns: u32,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SpriteError {
    /// Short, stable label for the failure kind, used as a diagnostic prefix.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInputExtension { .. } => "invalid input extension",
            Self::ContainerOpen { .. } | Self::ContainerFormat { .. } => "container open error",
            Self::Entry { .. } | Self::Decode { .. } => "decode error",
            Self::Encode(_) | Self::Manifest(_) => "encode error",
            Self::Write { .. } => "write error",
            Self::DuplicateName { .. } => "duplicate name",
            Self::SheetTooLarge { .. } | Self::InvalidConfig(_) | Self::Pattern(_) => {
                "configuration error"
            }
            Self::InvalidInput(_) => "invalid input",
        }
    }
}

pub type Result<T> = std::result::Result<T, SpriteError>;
