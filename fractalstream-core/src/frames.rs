//! Wire types exchanged with the compute backend.
//!
//! Inbound frames are text (JSON). The backend does not tag them; a frame is
//! a setup frame exactly when it carries `rowAndColumnCount`. That rule is
//! applied once, here, and everything downstream matches on [`ServerFrame`].

use crate::error::FrameError;
use serde::{Deserialize, Serialize};

/// Field whose presence marks a setup frame.
pub const SETUP_DISCRIMINATOR: &str = "rowAndColumnCount";

/// WebSocket close code for a normal closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Largest accepted picture edge in pixels. Keeps every buffer size
/// representable on 32-bit targets.
pub const MAX_PICTURE_SIZE: u32 = 16_384;

/// Grid announcement, sent once per session before any tile result.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetupInfo {
    /// The grid is `row_and_column_count` x `row_and_column_count` tiles.
    pub row_and_column_count: u32,
    /// Width and height of one tile in pixels.
    pub tile_size: u32,
    /// Pixel offset of the grid's top-left corner.
    pub x_offset: i32,
    pub y_offset: i32,
}

impl SetupInfo {
    /// Edge length of the assembled picture, if it can be laid out at all.
    ///
    /// `None` for an empty grid, zero-sized tiles or a picture wider than
    /// [`MAX_PICTURE_SIZE`].
    pub fn picture_size(&self) -> Option<u32> {
        if self.row_and_column_count == 0 || self.tile_size == 0 {
            return None;
        }
        self.row_and_column_count
            .checked_mul(self.tile_size)
            .filter(|size| *size <= MAX_PICTURE_SIZE)
    }

    pub fn is_renderable(&self) -> bool {
        self.picture_size().is_some()
    }
}

/// Iteration samples for one tile, row-major within the tile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TileResult {
    pub row: i64,
    pub column: i64,
    pub data: Vec<u32>,
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    Setup(SetupInfo),
    Result(TileResult),
}

impl ServerFrame {
    /// Decode a text frame, classifying it by the setup discriminator.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(FrameError::Json)?;

        let is_setup = match value.as_object() {
            Some(object) => object.contains_key(SETUP_DISCRIMINATOR),
            None => return Err(FrameError::NotAnObject),
        };

        if is_setup {
            let setup: SetupInfo = serde_json::from_value(value).map_err(FrameError::Setup)?;
            if !setup.is_renderable() {
                return Err(FrameError::InvalidSetup {
                    row_and_column_count: setup.row_and_column_count,
                    tile_size: setup.tile_size,
                });
            }
            Ok(ServerFrame::Setup(setup))
        } else {
            serde_json::from_value(value)
                .map(ServerFrame::Result)
                .map_err(FrameError::Result)
        }
    }
}

/// Why a connection closed, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseSignal {
    pub code: u16,
    pub was_clean: bool,
    pub reason: String,
}

impl CloseSignal {
    pub fn new(code: u16, was_clean: bool, reason: impl Into<String>) -> Self {
        Self {
            code,
            was_clean,
            reason: reason.into(),
        }
    }

    /// A clean flag or the normal-closure code alone is enough.
    pub fn is_normal(&self) -> bool {
        self.was_clean || self.code == CLOSE_NORMAL
    }
}
