//! Error types for the streaming pipeline.
//!
//! None of these are fatal. Frame and bounds errors are absorbed inside the
//! pipeline; only transport failures reach the caller.

use thiserror::Error;

/// An inbound frame that could not be turned into a [`crate::ServerFrame`].
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("invalid setup frame: {0}")]
    Setup(#[source] serde_json::Error),

    #[error("invalid result frame: {0}")]
    Result(#[source] serde_json::Error),

    #[error("setup announces an unusable {row_and_column_count}x{row_and_column_count} grid of {tile_size}px tiles")]
    InvalidSetup {
        row_and_column_count: u32,
        tile_size: u32,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PictureError {
    #[error("tile ({row}, {column}) is outside the {row_and_column_count}x{row_and_column_count} grid")]
    TileOutOfBounds {
        row: i64,
        column: i64,
        row_and_column_count: u32,
    },

    #[error("cannot lay out a {row_and_column_count}x{row_and_column_count} grid of {tile_size}px tiles")]
    InvalidGrid {
        row_and_column_count: u32,
        tile_size: u32,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("failed to open connection: {0}")]
    Connect(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    #[error("width must be positive")]
    ZeroWidth,

    #[error("max iterations must be positive")]
    ZeroIterations,

    #[error("extent must be a positive finite number, got {0}")]
    InvalidExtent(f64),

    #[error("center must be finite, got ({0}, {1})")]
    InvalidCenter(f64, f64),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("color scheme name must not be empty")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse client config: {0}")]
    Parse(#[from] serde_json::Error),
}
