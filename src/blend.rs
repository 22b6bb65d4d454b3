// Table-driven "source over" blending for the fixed-alpha annotation overlay.
// The overlay colour and alpha never change, so each output channel is a pure
// function of the base channel and can be looked up instead of computed per pixel.

/// Overlay colour (red).
pub const OVERLAY_RGB: [u8; 3] = [255, 0, 0];
/// Overlay opacity out of 255.
pub const OVERLAY_ALPHA: u8 = 128;

pub struct OverlayLut {
    // base channel (0..255) -> blended channel, one table per RGB channel
    tables: [[u8; 256]; 3],
}

impl Default for OverlayLut {
    fn default() -> Self {
        Self::new(OVERLAY_RGB, OVERLAY_ALPHA)
    }
}

impl OverlayLut {
    /// Build the three tables once.
    pub fn new(color: [u8; 3], alpha: u8) -> Self {
        let a = alpha as u32;
        let inv = 255 - a;
        let mut tables = [[0u8; 256]; 3];
        for (channel, table) in tables.iter_mut().enumerate() {
            let src = color[channel] as u32;
            for (base, out) in table.iter_mut().enumerate() {
                // Rounded integer division keeps both ends exact.
                *out = ((src * a + base as u32 * inv + 127) / 255) as u8;
            }
        }
        Self { tables }
    }

    #[inline]
    pub fn blend(&self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        [
            self.tables[0][r as usize],
            self.tables[1][g as usize],
            self.tables[2][b as usize],
        ]
    }
}
