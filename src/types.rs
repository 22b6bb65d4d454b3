// Core pixel grids shared by the engine and the window shell.

/// A row-major 2D grid of pixels.
/// The same shape backs the source image, the mask and the display buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer<P> {
    pub width: usize,     // pixels per row
    pub height: usize,    // number of rows
    pub pixels: Vec<P>,   // length = width * height
}

/// Display buffer; each entry is 0x00RRGGBB for minifb.
pub type FrameBuffer = PixelBuffer<u32>;

/// Source image, 3 channels.
pub type Image = PixelBuffer<[u8; 3]>;

/// Single-channel annotation mask, 0 = not painted, 255 = painted.
pub type Mask = PixelBuffer<u8>;

/// Integer pixel coordinate inside an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl<P: Copy> PixelBuffer<P> {
    /// A `width` x `height` buffer with every pixel set to `fill`.
    pub fn filled(width: usize, height: usize, fill: P) -> Self {
        Self { width, height, pixels: vec![fill; width * height] }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<P> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Write one pixel; out-of-bounds writes are dropped.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: P) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = value;
    }

    /// Same size as `other`, regardless of pixel type.
    pub fn same_size<Q>(&self, other: &PixelBuffer<Q>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl Mask {
    /// All-zero mask, nothing painted.
    pub fn blank(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    /// True if any pixel holds a non-zero value.
    pub fn any_painted(&self) -> bool {
        self.pixels.iter().any(|&v| v != 0)
    }
}

/// Pack an RGB triplet as 0x00RRGGBB.
#[inline]
pub fn pack_rgb([r, g, b]: [u8; 3]) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Inverse of [`pack_rgb`].
#[inline]
pub fn unpack_rgb(px: u32) -> [u8; 3] {
    [((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8]
}
