// Reads images and masks from disk and writes masks back.
// The session only talks to the `ImageCodec` trait, so a shell (or a test) can
// swap the filesystem for something else.

use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::error::{Error, Result};
use crate::format::{image_from_rgb8, mask_from_luma8, mask_to_luma8};
use crate::types::{Image, Mask};

pub trait ImageCodec {
    /// Decode an image file into RGB pixels.
    fn decode_image(&self, path: &Path) -> Result<Image>;

    /// Decode a mask file into a single channel.
    fn decode_mask(&self, path: &Path) -> Result<Mask>;

    /// Write `mask` to `path`.
    fn encode_mask(&self, path: &Path, mask: &Mask) -> Result<()>;
}

/// Filesystem codec backed by the `image` crate.
///
/// Masks are always written as PNG, whatever the file extension says, so a mask
/// saved next to a `.jpg` image is stored losslessly. Decoding sniffs the content
/// instead of trusting the extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsCodec;

fn open_dynamic(path: &Path) -> Result<image::DynamicImage> {
    let decode_err = |source| Error::Decode { path: path.to_path_buf(), source };
    ImageReader::open(path)
        .map_err(|e| Error::io(path, e))?
        .with_guessed_format()
        .map_err(|e| Error::io(path, e))?
        .decode()
        .map_err(decode_err)
}

impl ImageCodec for FsCodec {
    fn decode_image(&self, path: &Path) -> Result<Image> {
        let img = open_dynamic(path)?;
        Ok(image_from_rgb8(&img.into_rgb8()))
    }

    fn decode_mask(&self, path: &Path) -> Result<Mask> {
        // Colour masks (e.g. hand-made in an editor) are reduced to luma.
        let img = open_dynamic(path)?;
        Ok(mask_from_luma8(&img.into_luma8()))
    }

    fn encode_mask(&self, path: &Path, mask: &Mask) -> Result<()> {
        mask_to_luma8(mask)
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| Error::Encode { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PAINTED;

    #[test]
    fn mask_round_trips_even_with_jpg_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        let mut mask = Mask::blank(7, 5);
        mask.set(2, 3, PAINTED);
        mask.set(6, 0, PAINTED);

        FsCodec.encode_mask(&path, &mask).unwrap();
        assert_eq!(FsCodec.decode_mask(&path).unwrap(), mask);
    }

    #[test]
    fn image_decodes_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        image::RgbImage::from_pixel(4, 3, image::Rgb([9, 8, 7])).save(&path).unwrap();

        let img = FsCodec.decode_image(&path).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels.iter().all(|&p| p == [9, 8, 7]));
    }

    #[test]
    fn colour_mask_is_converted_to_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255])).save(&path).unwrap();
        assert!(FsCodec.decode_mask(&path).unwrap().pixels.iter().all(|&v| v == 255));
    }

    #[test]
    fn rgba_mask_uses_luma() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.png");
        let rgba = image::RgbaImage::from_fn(3, 2, |x, _| {
            if x == 0 { image::Rgba([255, 0, 0, 255]) } else { image::Rgba([255, 255, 255, 255]) }
        });
        rgba.save(&path).unwrap();
        let expected = image::DynamicImage::ImageRgba8(rgba).into_luma8();

        let mask = FsCodec.decode_mask(&path).unwrap();
        assert_eq!(mask, mask_from_luma8(&expected));
        assert_eq!(mask.get(1, 1), Some(255));
        assert!(mask.get(0, 0) < Some(128));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really").unwrap();
        assert!(matches!(FsCodec.decode_image(&path), Err(Error::Decode { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");
        assert!(matches!(FsCodec.decode_image(&path), Err(Error::Io { .. })));
    }
}
