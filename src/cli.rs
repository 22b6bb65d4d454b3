use std::path::PathBuf;

use clap::Parser;
use mask_annotator::{Settings, ToolState, ViewSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Paint binary masks over a folder of images", long_about = None)]
pub struct Args {
    /// Root folder containing an `images/` subfolder. Masks go to `masks/` next to it.
    pub folder: Option<PathBuf>,

    /// Write masks here instead of `<folder>/masks`.
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Do not save the mask when moving to another image.
    #[arg(long)]
    pub no_auto_save: bool,

    /// Start with the red annotation overlay hidden.
    #[arg(long)]
    pub hide_mask: bool,

    /// Start with the source image hidden (white background).
    #[arg(long)]
    pub hide_image: bool,

    /// Brush width in pixels (1-50).
    #[arg(long, default_value_t = 2)]
    pub brush_size: u32,

    /// Eraser width in pixels (1-50).
    #[arg(long, default_value_t = 20)]
    pub eraser_size: u32,

    /// Undo steps kept per image.
    #[arg(long, default_value_t = 20)]
    pub history: usize,

    /// Window width.
    #[arg(long, default_value_t = 1024)]
    pub width: usize,

    /// Window height.
    #[arg(long, default_value_t = 768)]
    pub height: usize,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            view: ViewSettings {
                show_image: !self.hide_image,
                show_mask_overlay: !self.hide_mask,
            },
            auto_save: !self.no_auto_save,
            history_capacity: self.history,
            save_dir: self.save_dir.clone(),
        }
    }

    pub fn tools(&self) -> ToolState {
        ToolState::with_sizes(self.brush_size, self.eraser_size)
    }
}
