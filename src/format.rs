// Pixel formats and the conversions between them.
//
// Every buffer the engine handles is one of three formats. Conversions are total:
// any format can be turned into any other without a runtime failure path.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage, imageops::FilterType};

use crate::types::{Image, Mask, PixelBuffer};

/// Mask values strictly above this count as painted.
pub const PAINTED_THRESHOLD: u8 = 127;

/// One bit per pixel: painted or not.
pub type MonoBuffer = PixelBuffer<bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb,
    Grayscale,
    Mono,
}

/// A buffer tagged with its format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyBuffer {
    Rgb(Image),
    Grayscale(Mask),
    Mono(MonoBuffer),
}

impl AnyBuffer {
    pub fn format(&self) -> PixelFormat {
        match self {
            AnyBuffer::Rgb(_) => PixelFormat::Rgb,
            AnyBuffer::Grayscale(_) => PixelFormat::Grayscale,
            AnyBuffer::Mono(_) => PixelFormat::Mono,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            AnyBuffer::Rgb(b) => b.dimensions(),
            AnyBuffer::Grayscale(b) => b.dimensions(),
            AnyBuffer::Mono(b) => b.dimensions(),
        }
    }

    pub fn into_rgb(self) -> Image {
        match self {
            AnyBuffer::Rgb(b) => b,
            AnyBuffer::Grayscale(b) => gray_to_rgb(&b),
            AnyBuffer::Mono(b) => gray_to_rgb(&mono_to_gray(&b)),
        }
    }

    pub fn into_grayscale(self) -> Mask {
        match self {
            AnyBuffer::Rgb(b) => rgb_to_gray(&b),
            AnyBuffer::Grayscale(b) => b,
            AnyBuffer::Mono(b) => mono_to_gray(&b),
        }
    }

    pub fn into_mono(self) -> MonoBuffer {
        match self {
            AnyBuffer::Rgb(b) => gray_to_mono(&rgb_to_gray(&b)),
            AnyBuffer::Grayscale(b) => gray_to_mono(&b),
            AnyBuffer::Mono(b) => b,
        }
    }

    /// Convert into `format`.
    pub fn convert(self, format: PixelFormat) -> AnyBuffer {
        match format {
            PixelFormat::Rgb => AnyBuffer::Rgb(self.into_rgb()),
            PixelFormat::Grayscale => AnyBuffer::Grayscale(self.into_grayscale()),
            PixelFormat::Mono => AnyBuffer::Mono(self.into_mono()),
        }
    }
}

/// Luma of every pixel, using the `image` crate's colour conversion.
pub fn rgb_to_gray(src: &Image) -> Mask {
    mask_from_luma8(&DynamicImage::ImageRgb8(image_to_rgb8(src)).into_luma8())
}

pub fn gray_to_rgb(src: &Mask) -> Image {
    PixelBuffer {
        width: src.width,
        height: src.height,
        pixels: src.pixels.iter().map(|&v| [v, v, v]).collect(),
    }
}

pub fn gray_to_mono(src: &Mask) -> MonoBuffer {
    PixelBuffer {
        width: src.width,
        height: src.height,
        pixels: src.pixels.iter().map(|&v| v > PAINTED_THRESHOLD).collect(),
    }
}

pub fn mono_to_gray(src: &MonoBuffer) -> Mask {
    PixelBuffer {
        width: src.width,
        height: src.height,
        pixels: src.pixels.iter().map(|&on| if on { u8::MAX } else { 0 }).collect(),
    }
}

// ---------------------------- `image` crate bridges ----------------------------

pub fn image_from_rgb8(img: &RgbImage) -> Image {
    let (w, h) = img.dimensions();
    PixelBuffer {
        width: w as usize,
        height: h as usize,
        pixels: img.pixels().map(|p| p.0).collect(),
    }
}

pub fn mask_from_luma8(img: &GrayImage) -> Mask {
    let (w, h) = img.dimensions();
    PixelBuffer {
        width: w as usize,
        height: h as usize,
        pixels: img.pixels().map(|p| p.0[0]).collect(),
    }
}

pub fn image_to_rgb8(src: &Image) -> RgbImage {
    ImageBuffer::from_fn(src.width as u32, src.height as u32, |x, y| {
        Rgb(src.pixels[y as usize * src.width + x as usize])
    })
}

pub fn mask_to_luma8(src: &Mask) -> GrayImage {
    ImageBuffer::from_fn(src.width as u32, src.height as u32, |x, y| {
        Luma([src.pixels[y as usize * src.width + x as usize]])
    })
}

/// Smoothly rescale a mask to `width` x `height`, ignoring aspect ratio.
/// Same input always yields the same output.
pub fn resize_mask(src: &Mask, width: usize, height: usize) -> Mask {
    if src.width == width && src.height == height {
        return src.clone();
    }
    let scaled = image::imageops::resize(
        &mask_to_luma8(src),
        width as u32,
        height as u32,
        FilterType::Triangle,
    );
    mask_from_luma8(&scaled)
}
