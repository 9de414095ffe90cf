/// Rectangle in pixel space of the picture bitmap (always u32 coordinates)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Footprint of the tile at (row, column) in a grid of square tiles.
    ///
    /// Columns advance along x, rows along y.
    pub fn for_tile(row: u32, column: u32, tile_size: u32) -> Self {
        Self::new(
            column.saturating_mul(tile_size),
            row.saturating_mul(tile_size),
            tile_size,
            tile_size,
        )
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Intersection with a `width` x `height` bitmap anchored at the origin.
    /// Returns `None` when the rectangle lies completely outside.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self::new(self.x, self.y, w, h))
    }
}
