//! The whole picture: a square grid of tiles plus its layout geometry.

use crate::colorizers::Colorizer;
use crate::error::PictureError;
use crate::frames::SetupInfo;
use crate::pixel_rect::PixelRect;
use crate::tile::TileModel;

/// Backing model for a tiled picture. Survives colour scheme changes, but is
/// reinitialized for every calculation.
pub struct PictureModel {
    row_and_column_count: u32,
    tile_size: u32,
    x_offset: i32,
    y_offset: i32,
    max_iterations: u32,
    colorizer: Colorizer,
    /// Row-major, `row_and_column_count²` entries.
    tiles: Vec<TileModel>,
}

impl Default for PictureModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PictureModel {
    /// An empty picture with no tiles.
    pub fn new() -> Self {
        Self {
            row_and_column_count: 0,
            tile_size: 0,
            x_offset: 0,
            y_offset: 0,
            max_iterations: 0,
            colorizer: Colorizer::blank(),
            tiles: Vec::new(),
        }
    }

    /// Discard the current grid and allocate a fresh one for `setup`.
    ///
    /// A setup that cannot be laid out leaves the picture empty.
    pub fn init(
        &mut self,
        setup: &SetupInfo,
        colorizer: Colorizer,
        max_iterations: u32,
    ) -> Result<(), PictureError> {
        self.reset();
        if !setup.is_renderable() {
            return Err(PictureError::InvalidGrid {
                row_and_column_count: setup.row_and_column_count,
                tile_size: setup.tile_size,
            });
        }

        self.row_and_column_count = setup.row_and_column_count;
        self.tile_size = setup.tile_size;
        self.x_offset = setup.x_offset;
        self.y_offset = setup.y_offset;
        self.max_iterations = max_iterations;
        self.colorizer = colorizer;

        let count = setup.row_and_column_count as usize;
        self.tiles = (0..count * count)
            .map(|_| TileModel::new(self.colorizer.clone(), max_iterations, setup.tile_size))
            .collect();

        log::debug!(
            "Initialized {}x{} picture, tile size {}, offset ({}, {})",
            self.row_and_column_count,
            self.row_and_column_count,
            self.tile_size,
            self.x_offset,
            self.y_offset
        );
        Ok(())
    }

    /// Back to the empty state. Listeners of the old tiles are detached.
    pub fn reset(&mut self) {
        for tile in &self.tiles {
            tile.detach_all();
        }
        self.tiles.clear();
        self.row_and_column_count = 0;
        self.tile_size = 0;
        self.x_offset = 0;
        self.y_offset = 0;
    }

    /// Route a tile result to its tile.
    ///
    /// Out-of-range addresses (typically a late result from a superseded
    /// session) leave every tile untouched.
    pub fn on_tile_result(
        &mut self,
        row: i64,
        column: i64,
        samples: Vec<u32>,
    ) -> Result<(), PictureError> {
        let index = self
            .index_of(row, column)
            .ok_or(PictureError::TileOutOfBounds {
                row,
                column,
                row_and_column_count: self.row_and_column_count,
            })?;
        self.tiles[index].update(samples);
        Ok(())
    }

    /// Recolour every tile with `colorizer`; samples are kept.
    pub fn set_colorizer(&mut self, colorizer: Colorizer) {
        self.colorizer = colorizer;
        for tile in &mut self.tiles {
            tile.set_colorizer(self.colorizer.clone());
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.tiles.is_empty()
    }

    pub fn row_and_column_count(&self) -> u32 {
        self.row_and_column_count
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn x_offset(&self) -> i32 {
        self.x_offset
    }

    pub fn y_offset(&self) -> i32 {
        self.y_offset
    }

    /// Pixel translation to apply to the whole grid.
    pub fn translation(&self) -> (i32, i32) {
        (self.x_offset, self.y_offset)
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn colorizer(&self) -> &Colorizer {
        &self.colorizer
    }

    /// Width and height of the assembled picture in pixels.
    pub fn actual_size(&self) -> u32 {
        self.row_and_column_count.saturating_mul(self.tile_size)
    }

    pub fn tile(&self, row: u32, column: u32) -> Option<&TileModel> {
        self.index_of(row as i64, column as i64)
            .map(|index| &self.tiles[index])
    }

    /// Footprint of a tile inside the assembled picture.
    pub fn tile_rect(&self, row: u32, column: u32) -> Option<PixelRect> {
        self.tile(row, column)
            .map(|_| PixelRect::for_tile(row, column, self.tile_size))
    }

    /// Every tile with its (row, column), row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32, &TileModel)> {
        let count = self.row_and_column_count.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (index / count, index % count, tile)
        })
    }

    fn index_of(&self, row: i64, column: i64) -> Option<usize> {
        let count = self.row_and_column_count as i64;
        if (0..count).contains(&row) && (0..count).contains(&column) {
            Some((row * count + column) as usize)
        } else {
            None
        }
    }
}
