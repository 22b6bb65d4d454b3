// Display <-> image coordinate mapping under zoom.
// Display space is the zoomed canvas (origin at the canvas top-left, not the window).

use crate::types::Point;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;
const ZOOM_IN_STEP: f32 = 1.1;
const ZOOM_OUT_STEP: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Positive wheel deltas zoom in, negative zoom out, zero does nothing.
    pub fn from_wheel(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(ZoomDirection::In)
        } else if delta < 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

/// Scale from image pixels to display pixels, always within [`MIN_ZOOM`, `MAX_ZOOM`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom(f32);

impl Default for Zoom {
    fn default() -> Self {
        Zoom(1.0)
    }
}

impl Zoom {
    pub fn new(factor: f32) -> Self {
        if factor.is_nan() {
            return Self::default();
        }
        Zoom(factor.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    #[inline]
    pub fn factor(self) -> f32 {
        self.0
    }

    /// Apply one wheel notch. Returns false when clamping left the factor unchanged,
    /// so callers can skip the re-render at the extremes.
    pub fn step(&mut self, direction: ZoomDirection) -> bool {
        let scale = match direction {
            ZoomDirection::In => ZOOM_IN_STEP,
            ZoomDirection::Out => ZOOM_OUT_STEP,
        };
        let next = Zoom::new(self.0 * scale);
        if next == *self {
            return false;
        }
        *self = next;
        true
    }

    /// Size of a `width` x `height` image once zoomed, never below 1x1.
    pub fn scaled_size(self, width: usize, height: usize) -> (usize, usize) {
        let w = (width as f32 * self.0) as usize;
        let h = (height as f32 * self.0) as usize;
        (w.max(1), h.max(1))
    }
}

/// Map a display position to the image pixel under it.
/// `None` when no image is loaded; otherwise each axis is clamped to the image.
pub fn map_to_image(
    display: (f32, f32),
    zoom: Zoom,
    image_size: Option<(usize, usize)>,
) -> Option<Point> {
    let (width, height) = image_size?;
    if width == 0 || height == 0 {
        return None;
    }
    let x = (display.0 / zoom.factor()).clamp(0.0, (width - 1) as f32);
    let y = (display.1 / zoom.factor()).clamp(0.0, (height - 1) as f32);
    Some(Point::new(x as u32, y as u32))
}

/// Display position of the centre of image pixel `p`.
pub fn map_from_image(p: Point, zoom: Zoom) -> (f32, f32) {
    (
        (p.x as f32 + 0.5) * zoom.factor(),
        (p.y as f32 + 0.5) * zoom.factor(),
    )
}

/// Scroll offset that keeps the content under `cursor` fixed across a zoom change.
/// `cursor` is in window space, offsets are display-space positions of the window origin.
pub fn anchor_offset(
    cursor: (f32, f32),
    old_offset: (f32, f32),
    old_zoom: Zoom,
    new_zoom: Zoom,
) -> (f32, f32) {
    let ratio = new_zoom.factor() / old_zoom.factor();
    (
        (cursor.0 + old_offset.0) * ratio - cursor.0,
        (cursor.1 + old_offset.1) * ratio - cursor.1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_across_zoom_range() {
        let size = Some((640, 480));
        let mut z = MIN_ZOOM;
        while z <= MAX_ZOOM {
            let zoom = Zoom::new(z);
            for &(x, y) in &[(0, 0), (1, 1), (17, 250), (639, 479), (320, 0)] {
                let p = Point::new(x, y);
                let back = map_to_image(map_from_image(p, zoom), zoom, size);
                assert_eq!(back, Some(p), "zoom {z}");
            }
            z += 0.37;
        }
    }

    #[test]
    fn no_image_maps_to_none() {
        assert_eq!(map_to_image((3.0, 4.0), Zoom::default(), None), None);
    }

    #[test]
    fn positions_clamp_to_image_bounds() {
        let zoom = Zoom::new(2.0);
        let size = Some((100, 50));
        assert_eq!(map_to_image((-30.0, -1.0), zoom, size), Some(Point::new(0, 0)));
        assert_eq!(map_to_image((1000.0, 1000.0), zoom, size), Some(Point::new(99, 49)));
        assert_eq!(map_to_image((21.0, 9.9), zoom, size), Some(Point::new(10, 4)));
    }

    #[test]
    fn zoom_stops_at_extremes() {
        let mut zoom = Zoom::new(MAX_ZOOM);
        assert!(!zoom.step(ZoomDirection::In));
        assert!(zoom.step(ZoomDirection::Out));
        assert!((zoom.factor() - 9.0).abs() < 1e-4);

        let mut zoom = Zoom::new(0.105);
        assert!(zoom.step(ZoomDirection::Out));
        assert_eq!(zoom.factor(), MIN_ZOOM);
        assert!(!zoom.step(ZoomDirection::Out));
    }

    #[test]
    fn new_clamps_out_of_range() {
        assert_eq!(Zoom::new(50.0).factor(), MAX_ZOOM);
        assert_eq!(Zoom::new(0.0).factor(), MIN_ZOOM);
        assert_eq!(Zoom::new(f32::NAN).factor(), 1.0);
    }

    #[test]
    fn anchor_keeps_point_under_cursor() {
        let old = Zoom::new(1.0);
        let new = Zoom::new(2.0);
        let cursor = (100.0, 50.0);
        let offset = anchor_offset(cursor, (20.0, 10.0), old, new);
        // image point under cursor before: (120, 60); after: (cursor + offset) / 2
        assert_eq!(((cursor.0 + offset.0) / 2.0, (cursor.1 + offset.1) / 2.0), (120.0, 60.0));
    }

    #[test]
    fn wheel_delta_direction() {
        assert_eq!(ZoomDirection::from_wheel(3.0), Some(ZoomDirection::In));
        assert_eq!(ZoomDirection::from_wheel(-0.5), Some(ZoomDirection::Out));
        assert_eq!(ZoomDirection::from_wheel(0.0), None);
    }
}
