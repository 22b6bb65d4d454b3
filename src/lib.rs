// Mask-editing engine for binary image annotation.
//
// A `Session` walks an `images/` folder, keeps one single-channel mask per image
// in `masks/`, and turns pointer input into hard-edged brush and eraser strokes.
// The window shell only forwards events and shows `Session::render`.

pub mod blend;
pub mod codec;
pub mod compositor;
pub mod error;
pub mod format;
pub mod history;
pub mod mapper;
pub mod raster;
pub mod session;
pub mod types;

pub use codec::{FsCodec, ImageCodec};
pub use compositor::ViewSettings;
pub use error::{Error, Result};
pub use format::PixelFormat;
pub use mapper::{Zoom, ZoomDirection};
pub use raster::{Tool, ToolState};
pub use session::{NavState, Session, Settings, Status};
pub use types::{FrameBuffer, Image, Mask, PixelBuffer, Point};
