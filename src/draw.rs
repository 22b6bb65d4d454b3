// Window + software drawing for the annotation shell.
// The window shows a viewport onto the zoomed display buffer, a circle outlining
// the brush under the pointer, and a status line in the title bar.

use mask_annotator::{Error, FrameBuffer, Result};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// Window background around the canvas.
pub const BACKGROUND: u32 = 0x00_20_20_20;
const CURSOR_COLOR: u32 = 0x00_FF_CC_33;

/// Discrete actions decoded from the keyboard this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Undo,
    Brush,
    Eraser,
    Previous,
    Next,
    Delete,
    Clear,
    Save,
    ToggleMask,
    ToggleImage,
    Grow,
    Shrink,
}

/// Pointer state sampled once per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pointer {
    pub pos: Option<(f32, f32)>,
    pub left: bool,
    pub right: bool,
    pub wheel: f32,
}

pub struct Drawer {
    window: Window,
    title: String,
}

impl Drawer {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, title: title.to_owned() })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Only touches the native title when the text actually changed.
    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.window.set_title(title);
            self.title = title.to_owned();
        }
    }

    pub fn pointer(&self) -> Pointer {
        Pointer {
            pos: self.window.get_mouse_pos(MouseMode::Clamp),
            left: self.window.get_mouse_down(MouseButton::Left),
            right: self.window.get_mouse_down(MouseButton::Right),
            wheel: self.window.get_scroll_wheel().map_or(0.0, |(_, y)| y),
        }
    }

    fn ctrl_down(&self) -> bool {
        self.window.is_key_down(Key::LeftCtrl) || self.window.is_key_down(Key::RightCtrl)
    }

    fn pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Ctrl+Z undo, Ctrl+Q brush, Ctrl+W eraser, Ctrl+S save; arrows navigate.
    pub fn commands(&self) -> Vec<Command> {
        let mut out = Vec::new();
        if self.ctrl_down() {
            let chords = [
                (Key::Z, Command::Undo),
                (Key::Q, Command::Brush),
                (Key::W, Command::Eraser),
                (Key::S, Command::Save),
            ];
            out.extend(chords.iter().filter(|(k, _)| self.pressed(*k)).map(|&(_, c)| c));
            return out;
        }
        let keys = [
            (Key::Left, Command::Previous),
            (Key::Up, Command::Previous),
            (Key::Right, Command::Next),
            (Key::Down, Command::Next),
            (Key::Delete, Command::Delete),
            (Key::C, Command::Clear),
            (Key::M, Command::ToggleMask),
            (Key::I, Command::ToggleImage),
            (Key::RightBracket, Command::Grow),
            (Key::LeftBracket, Command::Shrink),
        ];
        out.extend(keys.iter().filter(|(k, _)| self.pressed(*k)).map(|&(_, c)| c));
        out
    }
}

/// Scroll position of the window over the zoomed canvas, in display pixels.
/// Negative offsets centre a canvas smaller than the window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub offset: (f32, f32),
}

fn clamp_axis(offset: f32, content: usize, window: usize) -> f32 {
    if content <= window {
        -(((window - content) / 2) as f32)
    } else {
        offset.clamp(0.0, (content - window) as f32)
    }
}

impl Viewport {
    pub fn clamp(&mut self, content: (usize, usize), window: (usize, usize)) {
        self.offset = (
            clamp_axis(self.offset.0, content.0, window.0),
            clamp_axis(self.offset.1, content.1, window.1),
        );
    }

    /// Window position -> display position.
    pub fn to_display(&self, window_pos: (f32, f32)) -> (f32, f32) {
        (window_pos.0 + self.offset.0, window_pos.1 + self.offset.1)
    }
}

/// Fill `screen` with the part of `display` the viewport looks at.
pub fn compose(screen: &mut FrameBuffer, display: Option<&FrameBuffer>, view: &Viewport) {
    screen.pixels.fill(BACKGROUND);
    let Some(display) = display else {
        return;
    };
    let ox = view.offset.0.floor() as i64;
    let oy = view.offset.1.floor() as i64;

    for sy in 0..screen.height {
        let dy = sy as i64 + oy;
        if dy < 0 || dy >= display.height as i64 {
            continue;
        }
        // Visible span of this display row, in screen columns.
        let sx0 = (-ox).clamp(0, screen.width as i64) as usize;
        let sx1 = (display.width as i64 - ox).clamp(0, screen.width as i64) as usize;
        if sx0 >= sx1 {
            continue;
        }
        let src = dy as usize * display.width + (sx0 as i64 + ox) as usize;
        let dst = sy * screen.width + sx0;
        let len = sx1 - sx0;
        screen.pixels[dst..dst + len].copy_from_slice(&display.pixels[src..src + len]);
    }
}

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    fb.set(x as usize, y as usize, color);
}

/// Outline of the brush footprint centred at (cx,cy) (midpoint circle).
pub fn draw_brush_outline(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32) {
    if radius <= 1 {
        put_pixel(fb, cx, cy, CURSOR_COLOR);
        return;
    }
    let (mut x, mut y) = (radius, 0);
    let mut err = 1 - radius;
    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, cx + px, cy + py, CURSOR_COLOR);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}
