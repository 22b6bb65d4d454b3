// Builds the buffer the window shows: base layer, red overlay where the mask is
// painted, then a smooth resample to the current zoom.
// Inputs are only borrowed; the image and mask are never modified here.

use image::imageops::FilterType;

use crate::blend::OverlayLut;
use crate::format::{PAINTED_THRESHOLD, image_from_rgb8, image_to_rgb8};
use crate::mapper::Zoom;
use crate::types::{FrameBuffer, Image, Mask, PixelBuffer, pack_rgb};

/// Background used when the source image is hidden.
pub const BLANK_RGB: [u8; 3] = [255, 255, 255];

/// Display toggles the shell can flip at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewSettings {
    pub show_image: bool,
    pub show_mask_overlay: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self { show_image: true, show_mask_overlay: true }
    }
}

#[derive(Default)]
pub struct Compositor {
    lut: OverlayLut,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base layer plus overlay at image resolution.
    pub fn composite(&self, image: &Image, mask: Option<&Mask>, view: &ViewSettings) -> Image {
        let mut out = if view.show_image {
            image.clone()
        } else {
            Image::filled(image.width, image.height, BLANK_RGB)
        };

        let Some(mask) = mask.filter(|_| view.show_mask_overlay) else {
            return out;
        };
        if !mask.same_size(image) {
            log::warn!(
                "mask {}x{} does not match image {}x{}; overlay skipped",
                mask.width,
                mask.height,
                image.width,
                image.height
            );
            return out;
        }

        // Overlay is clipped to painted pixels; the rest of the base stays as is.
        for (px, &m) in out.pixels.iter_mut().zip(&mask.pixels) {
            if m > PAINTED_THRESHOLD {
                *px = self.lut.blend(*px);
            }
        }
        out
    }

    /// Composite and resample to `zoom`, packed for the window.
    pub fn render(
        &self,
        image: &Image,
        mask: Option<&Mask>,
        zoom: Zoom,
        view: &ViewSettings,
    ) -> FrameBuffer {
        let composited = self.composite(image, mask, view);
        to_frame(&resample(&composited, zoom))
    }
}

/// Scale an image by `zoom` with a triangle (bilinear) filter. Zoom 1.0 is a copy.
pub fn resample(src: &Image, zoom: Zoom) -> Image {
    let (w, h) = zoom.scaled_size(src.width, src.height);
    if (w, h) == src.dimensions() {
        return src.clone();
    }
    let scaled = image::imageops::resize(&image_to_rgb8(src), w as u32, h as u32, FilterType::Triangle);
    image_from_rgb8(&scaled)
}

/// Pack every pixel as 0x00RRGGBB.
pub fn to_frame(src: &Image) -> FrameBuffer {
    PixelBuffer {
        width: src.width,
        height: src.height,
        pixels: src.pixels.iter().map(|&px| pack_rgb(px)).collect(),
    }
}
