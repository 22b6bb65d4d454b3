// Stroke rasterization into the mask, plus the brush/eraser tool state.
// Strokes are hard edged: a pixel is either fully written or left alone.

use crate::types::{Mask, Point};

/// Value the brush writes.
pub const PAINTED: u8 = u8::MAX;
/// Value the eraser writes.
pub const UNPAINTED: u8 = 0;

pub const MIN_TOOL_SIZE: u32 = 1;
pub const MAX_TOOL_SIZE: u32 = 50;

const DEFAULT_BRUSH_SIZE: u32 = 2;
const DEFAULT_ERASER_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
}

impl Tool {
    /// Mask value this tool writes.
    pub fn value(self) -> u8 {
        match self {
            Tool::Brush => PAINTED,
            Tool::Eraser => UNPAINTED,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Brush => "brush",
            Tool::Eraser => "eraser",
        }
    }
}

/// Active tool plus one remembered size per tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolState {
    active: Tool,
    brush_size: u32,
    eraser_size: u32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active: Tool::Brush,
            brush_size: DEFAULT_BRUSH_SIZE,
            eraser_size: DEFAULT_ERASER_SIZE,
        }
    }
}

#[inline]
fn clamp_size(size: u32) -> u32 {
    size.clamp(MIN_TOOL_SIZE, MAX_TOOL_SIZE)
}

impl ToolState {
    pub fn with_sizes(brush_size: u32, eraser_size: u32) -> Self {
        Self {
            active: Tool::Brush,
            brush_size: clamp_size(brush_size),
            eraser_size: clamp_size(eraser_size),
        }
    }

    pub fn active(&self) -> Tool {
        self.active
    }

    /// Switch tools; the new tool keeps its own last size.
    pub fn select(&mut self, tool: Tool) {
        self.active = tool;
    }

    pub fn size_of(&self, tool: Tool) -> u32 {
        match tool {
            Tool::Brush => self.brush_size,
            Tool::Eraser => self.eraser_size,
        }
    }

    /// Width of the active tool.
    pub fn size(&self) -> u32 {
        self.size_of(self.active)
    }

    /// Set the active tool's width, clamped to [`MIN_TOOL_SIZE`, `MAX_TOOL_SIZE`].
    pub fn set_size(&mut self, size: u32) {
        let size = clamp_size(size);
        match self.active {
            Tool::Brush => self.brush_size = size,
            Tool::Eraser => self.eraser_size = size,
        }
    }

    pub fn adjust_size(&mut self, delta: i32) {
        let size = (self.size() as i64 + delta as i64).max(0) as u32;
        self.set_size(size);
    }

    /// Value written by the active tool.
    pub fn value(&self) -> u8 {
        self.active.value()
    }
}

/// Squared distance from `p` to the segment `a`-`b`.
#[inline]
fn dist2_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 { ((apx * abx + apy * aby) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
    (p.0 - cx) * (p.0 - cx) + (p.1 - cy) * (p.1 - cy)
}

/// Draw a round-capped line of `width` from `from` to `to`, writing `value`.
///
/// A pixel is covered when its centre lies within `width / 2` of the segment, so
/// consecutive segments sharing an endpoint join without gaps. Odd widths centre the
/// stroke on the pixel; even widths centre it on the pixel corner, so the band is
/// exactly `width` pixels across either way. Does nothing when either endpoint is
/// missing (e.g. the first move after a press).
pub fn paint_segment(
    mask: &mut Mask,
    from: Option<Point>,
    to: Option<Point>,
    width: u32,
    value: u8,
) {
    let (Some(from), Some(to)) = (from, to) else {
        return;
    };
    if mask.width == 0 || mask.height == 0 {
        return;
    }

    // A width-1 line still needs to hit one pixel per step.
    let radius = (width as f32 / 2.0).max(0.5);
    let r2 = radius * radius;
    // Pixel centre relative to the integer stroke axis.
    let centre = if width % 2 == 0 { 0.5 } else { 0.0 };
    let reach = radius.ceil() as i64;

    let a = (from.x as f32, from.y as f32);
    let b = (to.x as f32, to.y as f32);

    // Scan just the bounding box, clipped to the mask.
    let x0 = (from.x.min(to.x) as i64 - reach).max(0);
    let y0 = (from.y.min(to.y) as i64 - reach).max(0);
    let x1 = (from.x.max(to.x) as i64 + reach).min(mask.width as i64 - 1);
    let y1 = (from.y.max(to.y) as i64 + reach).min(mask.height as i64 - 1);

    for y in y0..=y1 {
        let row = y as usize * mask.width;
        for x in x0..=x1 {
            if dist2_to_segment((x as f32 + centre, y as f32 + centre), a, b) <= r2 {
                mask.pixels[row + x as usize] = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted(mask: &Mask, x: usize, y: usize) -> bool {
        mask.get(x, y) == Some(PAINTED)
    }

    #[test]
    fn vertical_band_width_five() {
        let mut mask = Mask::blank(100, 100);
        paint_segment(&mut mask, Some(Point::new(10, 10)), Some(Point::new(10, 20)), 5, PAINTED);

        for y in 10..=20 {
            for x in 8..=12 {
                assert!(painted(&mask, x, y), "({x},{y}) should be painted");
            }
            assert!(!painted(&mask, 7, y));
            assert!(!painted(&mask, 13, y));
        }
        // Round caps reach no further than the radius past each endpoint.
        for x in 0..100 {
            for y in (0..=7).chain(23..100) {
                assert_eq!(mask.get(x, y), Some(0), "({x},{y}) outside the stroke");
            }
        }
        // Every written value is the brush value.
        assert!(mask.pixels.iter().all(|&v| v == 0 || v == PAINTED));
    }

    #[test]
    fn covered_area_matches_capsule() {
        for (width, from, to) in [
            (11u32, Point::new(20, 50), Point::new(120, 50)),
            (11, Point::new(30, 30), Point::new(110, 90)),
            (2, Point::new(20, 50), Point::new(120, 50)),
            (2, Point::new(30, 30), Point::new(110, 90)),
            (4, Point::new(20, 50), Point::new(120, 50)),
            (4, Point::new(30, 30), Point::new(110, 90)),
        ] {
            let r = width as f32 / 2.0;
            let mut mask = Mask::blank(160, 140);
            paint_segment(&mut mask, Some(from), Some(to), width, PAINTED);
            let dx = to.x as f32 - from.x as f32;
            let dy = to.y as f32 - from.y as f32;
            let d = (dx * dx + dy * dy).sqrt();
            let expected = width as f32 * d + std::f32::consts::PI * r * r;
            let count = mask.pixels.iter().filter(|&&v| v == PAINTED).count() as f32;
            assert!(
                (count - expected).abs() / expected < 0.05,
                "width {width}: count {count} expected about {expected}"
            );
        }
    }

    #[test]
    fn even_widths_paint_exactly_width_rows() {
        for width in [2u32, 4, 10, 50] {
            let mut mask = Mask::blank(400, 200);
            paint_segment(&mut mask, Some(Point::new(100, 100)), Some(Point::new(200, 100)), width, PAINTED);
            let rows: Vec<usize> = (0..mask.height).filter(|&y| painted(&mask, 150, y)).collect();
            let half = width as usize / 2;
            assert_eq!(rows.len(), width as usize, "width {width}");
            assert_eq!(rows[0], 100 - half);
            assert_eq!(rows[rows.len() - 1], 100 + half - 1);
        }
    }

    #[test]
    fn default_brush_dab_is_two_by_two() {
        let mut mask = Mask::blank(10, 10);
        let p = Some(Point::new(5, 5));
        paint_segment(&mut mask, p, p, ToolState::default().size(), PAINTED);
        let covered: Vec<(usize, usize)> = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| painted(&mask, x, y))
            .collect();
        assert_eq!(covered, [(4, 4), (5, 4), (4, 5), (5, 5)]);
    }

    #[test]
    fn missing_endpoint_is_noop() {
        let mut mask = Mask::blank(10, 10);
        paint_segment(&mut mask, None, Some(Point::new(5, 5)), 5, PAINTED);
        paint_segment(&mut mask, Some(Point::new(5, 5)), None, 5, PAINTED);
        assert!(!mask.any_painted());
    }

    #[test]
    fn single_point_paints_disc() {
        let mut mask = Mask::blank(20, 20);
        let p = Some(Point::new(10, 10));
        paint_segment(&mut mask, p, p, 7, PAINTED);
        assert!(painted(&mask, 10, 10));
        assert!(painted(&mask, 13, 10));
        assert!(!painted(&mask, 14, 10));
        assert!(!painted(&mask, 13, 13));
    }

    #[test]
    fn eraser_clears_pixels() {
        let mut mask = Mask::filled(30, 30, PAINTED);
        paint_segment(&mut mask, Some(Point::new(5, 15)), Some(Point::new(25, 15)), 3, UNPAINTED);
        assert_eq!(mask.get(15, 15), Some(UNPAINTED));
        assert_eq!(mask.get(15, 17), Some(PAINTED));
    }

    #[test]
    fn clips_at_the_border() {
        let mut mask = Mask::blank(8, 8);
        paint_segment(&mut mask, Some(Point::new(0, 0)), Some(Point::new(7, 7)), 50, PAINTED);
        assert!(mask.pixels.iter().all(|&v| v == PAINTED));
    }

    #[test]
    fn thin_segments_join_without_gaps() {
        let mut mask = Mask::blank(40, 40);
        let points = [Point::new(2, 2), Point::new(9, 5), Point::new(14, 19), Point::new(30, 21)];
        for pair in points.windows(2) {
            paint_segment(&mut mask, Some(pair[0]), Some(pair[1]), 1, PAINTED);
        }
        // Walk from the first point; every painted pixel must be 8-connected to it.
        let mut seen = vec![false; mask.pixels.len()];
        let mut stack = vec![(2usize, 2usize)];
        while let Some((x, y)) = stack.pop() {
            let idx = y * mask.width + x;
            if seen[idx] || mask.pixels[idx] != PAINTED {
                continue;
            }
            seen[idx] = true;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if mask.in_bounds(nx, ny) {
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }
        }
        assert!(seen[21 * mask.width + 30], "stroke end unreachable from its start");
    }

    #[test]
    fn tools_remember_their_own_size() {
        let mut tools = ToolState::default();
        assert_eq!(tools.active(), Tool::Brush);
        tools.set_size(9);
        tools.select(Tool::Eraser);
        assert_eq!(tools.size(), 20);
        tools.set_size(33);
        assert_eq!(tools.value(), UNPAINTED);
        tools.select(Tool::Brush);
        assert_eq!(tools.size(), 9);
        assert_eq!(tools.size_of(Tool::Eraser), 33);
        assert_eq!(tools.value(), PAINTED);
    }

    #[test]
    fn sizes_are_clamped() {
        let mut tools = ToolState::with_sizes(0, 400);
        assert_eq!(tools.size_of(Tool::Brush), MIN_TOOL_SIZE);
        assert_eq!(tools.size_of(Tool::Eraser), MAX_TOOL_SIZE);
        tools.adjust_size(-10);
        assert_eq!(tools.size(), MIN_TOOL_SIZE);
        tools.adjust_size(7);
        assert_eq!(tools.size(), 8);
    }
}
