use fractalstream_core::{Bitmap, PictureModel, PixelRect, TilePresenter};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Size `canvas` to the assembled picture and shift it by the grid offset.
pub fn fit_canvas_to_picture(
    canvas: &HtmlCanvasElement,
    picture: &PictureModel,
) -> Result<(), JsValue> {
    let size = picture.actual_size();
    canvas.set_width(size);
    canvas.set_height(size);

    let (x, y) = picture.translation();
    canvas.set_attribute(
        "style",
        &format!("width: {size}px; height: {size}px; transform: translate({x}px, {y}px)"),
    )
}

/// Collapse `canvas` so no pixels of a discarded picture stay visible.
///
/// The next `fit_canvas_to_picture` restores size and offset.
pub fn clear_canvas(canvas: &HtmlCanvasElement) {
    canvas.set_width(0);
    canvas.set_height(0);
    if let Err(err) = canvas.remove_attribute("style") {
        log::warn!("Failed to reset canvas style: {:?}", err);
    }
}

/// Blits redrawn tile footprints onto a canvas.
pub struct CanvasPresenter {
    context: CanvasRenderingContext2d,
}

impl CanvasPresenter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { context })
    }

    /// Put the RGBA copy of `rect` at its own origin. `pixels` holds
    /// exactly `rect.width * rect.height` pixels, row-major.
    fn put_region(&self, rect: PixelRect, pixels: &[u8]) -> Result<(), JsValue> {
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixels),
            rect.width,
            rect.height,
        )?;
        self.context
            .put_image_data(&image, f64::from(rect.x), f64::from(rect.y))
    }
}

impl TilePresenter for CanvasPresenter {
    fn present(&self, rect: PixelRect, bitmap: &Bitmap) {
        if rect.area() == 0 {
            return;
        }
        let pixels = bitmap.copy_region(rect);
        if let Err(err) = self.put_region(rect, &pixels) {
            log::error!("Failed to draw tile at ({}, {}): {:?}", rect.x, rect.y, err);
        }
    }
}
