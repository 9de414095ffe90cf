//! Turns tile samples into RGBA pixels and composites them into the picture
//! bitmap.
//!
//! Every tile owns a fixed region of a shared [`Bitmap`]. Before a tile is
//! redrawn its region is restored to the blank state captured when the
//! region was created, so fewer samples than before never leave stale
//! pixels. Nothing outside the region is written.

use crate::colorizers::Colorizer;
use crate::picture::PictureModel;
use crate::pixel_rect::PixelRect;
use crate::tile::{TileListener, TileSettings};
use std::cell::RefCell;
use std::rc::Rc;

pub const BYTES_PER_PIXEL: usize = 4;

/// Colour of a pixel no sample has been written to.
pub const BLANK_PIXEL: [u8; 4] = [0, 0, 0, 0];

/// Position of sample `index` inside a tile: `(index mod size, index div size)`.
#[inline]
pub fn pixel_position(index: usize, tile_size: u32) -> (u32, u32) {
    let size = tile_size as usize;
    let x = index % size;
    (x as u32, ((index - x) / size) as u32)
}

/// Colourized pixels of one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilePixels {
    tile_size: u32,
    /// Number of leading pixels that came from a sample.
    covered: usize,
    rgba: Vec<u8>,
}

impl TilePixels {
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn covered(&self) -> usize {
        self.covered
    }

    /// `tile_size²` RGBA pixels, row-major.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.tile_size || y >= self.tile_size {
            return None;
        }
        let offset = (y as usize * self.tile_size as usize + x as usize) * BYTES_PER_PIXEL;
        self.rgba
            .get(offset..offset + BYTES_PER_PIXEL)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Colourize `samples` into a `tile_size` x `tile_size` RGBA buffer.
///
/// Sample `i` lands at [`pixel_position`]`(i)` with full opacity. Pixels
/// without a sample stay [`BLANK_PIXEL`]; samples past `tile_size²` are
/// ignored.
pub fn render(
    samples: &[u32],
    colorizer: &Colorizer,
    max_iterations: u32,
    tile_size: u32,
) -> TilePixels {
    let pixel_count = tile_size as usize * tile_size as usize;
    let covered = samples.len().min(pixel_count);
    let mut rgba = BLANK_PIXEL.repeat(pixel_count);

    for (index, &sample) in samples.iter().take(covered).enumerate() {
        let [r, g, b] = colorizer.colorize(sample, max_iterations);
        let offset = index * BYTES_PER_PIXEL;
        rgba[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&[r, g, b, 255]);
    }

    TilePixels {
        tile_size,
        covered,
        rgba,
    }
}

/// Fixed-size RGBA canvas shared by all tiles of a picture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// A fully blank bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: BLANK_PIXEL.repeat(width as usize * height as usize),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let p = &self.data[offset..offset + BYTES_PER_PIXEL];
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let offset = self.offset(x, y);
            self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
        }
    }

    /// Copy the pixels of `rect` (clipped to the bitmap) into a tight buffer.
    pub fn copy_region(&self, rect: PixelRect) -> Vec<u8> {
        let Some(rect) = rect.clip_to(self.width, self.height) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(rect.area() as usize * BYTES_PER_PIXEL);
        for y in rect.y..rect.y + rect.height {
            out.extend_from_slice(self.row_slice(rect.x, y, rect.width));
        }
        out
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    fn row_slice(&self, x: u32, y: u32, width: u32) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + width as usize * BYTES_PER_PIXEL]
    }

    fn row_slice_mut(&mut self, x: u32, y: u32, width: u32) -> &mut [u8] {
        let start = self.offset(x, y);
        &mut self.data[start..start + width as usize * BYTES_PER_PIXEL]
    }
}

/// A tile's footprint in the bitmap plus its captured blank state.
#[derive(Clone, Debug)]
pub struct TileRegion {
    rect: Option<PixelRect>,
    blank: Vec<u8>,
}

impl TileRegion {
    /// Capture the current content of `rect` as the region's blank state.
    pub fn capture(bitmap: &Bitmap, rect: PixelRect) -> Self {
        let rect = rect.clip_to(bitmap.width(), bitmap.height());
        let blank = rect.map(|r| bitmap.copy_region(r)).unwrap_or_default();
        Self { rect, blank }
    }

    /// Footprint actually covered inside the bitmap, if any.
    pub fn rect(&self) -> Option<PixelRect> {
        self.rect
    }

    /// Restore the blank state, then write the covered pixels of `pixels`.
    pub fn composite(&self, bitmap: &mut Bitmap, pixels: &TilePixels) {
        let Some(rect) = self.rect else {
            return;
        };
        let row_bytes = rect.width as usize * BYTES_PER_PIXEL;

        for (row, blank_row) in self.blank.chunks_exact(row_bytes).enumerate() {
            bitmap
                .row_slice_mut(rect.x, rect.y + row as u32, rect.width)
                .copy_from_slice(blank_row);
        }

        let rgba = pixels.rgba();
        for index in 0..pixels.covered() {
            let (x, y) = pixel_position(index, pixels.tile_size());
            if x >= rect.width || y >= rect.height {
                continue;
            }
            let src = index * BYTES_PER_PIXEL;
            let mut pixel = [0u8; 4];
            pixel.copy_from_slice(&rgba[src..src + BYTES_PER_PIXEL]);
            bitmap.set_pixel(rect.x + x, rect.y + y, pixel);
        }
    }
}

/// Receives the footprint of every redrawn tile, e.g. to blit it to screen.
pub trait TilePresenter {
    fn present(&self, rect: PixelRect, bitmap: &Bitmap);
}

/// Tile listener that redraws its region whenever the tile changes.
pub struct TileRasterizer {
    region: TileRegion,
    bitmap: Rc<RefCell<Bitmap>>,
    presenter: Option<Rc<dyn TilePresenter>>,
}

impl TileRasterizer {
    pub fn new(
        bitmap: Rc<RefCell<Bitmap>>,
        rect: PixelRect,
        presenter: Option<Rc<dyn TilePresenter>>,
    ) -> Self {
        let region = TileRegion::capture(&bitmap.borrow(), rect);
        Self {
            region,
            bitmap,
            presenter,
        }
    }

    pub fn region(&self) -> &TileRegion {
        &self.region
    }

    fn redraw(&self, samples: &[u32], settings: &TileSettings) {
        let pixels = render(
            samples,
            &settings.colorizer,
            settings.max_iterations,
            settings.tile_size,
        );
        self.region
            .composite(&mut self.bitmap.borrow_mut(), &pixels);

        if let (Some(presenter), Some(rect)) = (&self.presenter, self.region.rect()) {
            presenter.present(rect, &self.bitmap.borrow());
        }
    }
}

impl TileListener for TileRasterizer {
    fn on_data_update(&self, samples: &Rc<[u32]>, settings: &TileSettings) {
        self.redraw(samples, settings);
    }

    fn on_settings_update(&self, samples: &Rc<[u32]>, settings: &TileSettings) {
        self.redraw(samples, settings);
    }
}

/// The bitmap of one picture and the rasterizers drawing into it.
///
/// Tiles only hold weak references to their rasterizers; dropping this value
/// detaches them all.
pub struct PictureRaster {
    bitmap: Rc<RefCell<Bitmap>>,
    rasterizers: Vec<Rc<dyn TileListener>>,
}

impl PictureRaster {
    /// Allocate a bitmap for `picture` and attach a rasterizer to every tile.
    pub fn attach(picture: &PictureModel, presenter: Option<Rc<dyn TilePresenter>>) -> Self {
        let size = picture.actual_size();
        let bitmap = Rc::new(RefCell::new(Bitmap::new(size, size)));

        let rasterizers = picture
            .tiles()
            .map(|(row, column, tile)| {
                let rect = PixelRect::for_tile(row, column, picture.tile_size());
                let rasterizer: Rc<dyn TileListener> = Rc::new(TileRasterizer::new(
                    Rc::clone(&bitmap),
                    rect,
                    presenter.clone(),
                ));
                tile.register_listener(&rasterizer);
                rasterizer
            })
            .collect();

        Self {
            bitmap,
            rasterizers,
        }
    }

    pub fn bitmap(&self) -> &Rc<RefCell<Bitmap>> {
        &self.bitmap
    }

    pub fn rasterizer_count(&self) -> usize {
        self.rasterizers.len()
    }
}
