// The annotation session: which folder is open, which image is current, and the
// image/mask pair being edited.
//
// The shell owns exactly one `Session` and drives it with input events. All state
// lives here and is touched from the interaction thread only.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::codec::{FsCodec, ImageCodec};
use crate::compositor::{Compositor, ViewSettings};
use crate::error::{Error, Result};
use crate::format::resize_mask;
use crate::history::{DEFAULT_CAPACITY, UndoHistory};
use crate::mapper::{Zoom, ZoomDirection, map_to_image};
use crate::raster::{ToolState, paint_segment};
use crate::types::{FrameBuffer, Image, Mask, Point};

pub const IMAGES_DIR: &str = "images";
pub const MASKS_DIR: &str = "masks";
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Engine-wide toggles; all of them may change between any two calls.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub view: ViewSettings,
    /// Save the current mask before moving to another image.
    pub auto_save: bool,
    /// Undo snapshots kept per image.
    pub history_capacity: usize,
    /// Where masks are written. `None` means the `masks/` folder.
    pub save_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view: ViewSettings::default(),
            auto_save: true,
            history_capacity: DEFAULT_CAPACITY,
            save_dir: None,
        }
    }
}

/// Paths derived from the chosen root folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderLayout {
    pub root: PathBuf,
    pub images: PathBuf,
    pub masks: PathBuf,
    pub save: PathBuf,
}

impl FolderLayout {
    pub fn new(root: impl Into<PathBuf>, save_dir: Option<PathBuf>) -> Self {
        let root = root.into();
        let images = root.join(IMAGES_DIR);
        let masks = root.join(MASKS_DIR);
        let save = save_dir.unwrap_or_else(|| masks.clone());
        Self { root, images, masks, save }
    }

    pub fn image_path(&self, name: &str) -> PathBuf {
        self.images.join(name)
    }

    pub fn mask_path(&self, name: &str) -> PathBuf {
        self.masks.join(name)
    }

    pub fn save_path(&self, name: &str) -> PathBuf {
        self.save.join(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    /// No folder open, or every image was deleted.
    Empty,
    Loaded,
}

/// What the shell shows in its status line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub filename: String,
    /// 1-based position, doubles as the "annotated samples" counter.
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Annotated samples: {}/{} | Image: {}", self.position, self.total, self.filename)
    }
}

struct Loaded {
    image: Image,
    mask: Mask,
}

struct ActiveStroke {
    last: Option<Point>,
}

pub struct Session<C: ImageCodec = FsCodec> {
    codec: C,
    compositor: Compositor,
    settings: Settings,
    tools: ToolState,
    zoom: Zoom,
    folder: Option<FolderLayout>,
    entries: Vec<String>,
    index: Option<usize>,
    loaded: Option<Loaded>,
    history: UndoHistory,
    stroke: Option<ActiveStroke>,
}

impl Session<FsCodec> {
    pub fn new(settings: Settings) -> Self {
        Self::with_codec(FsCodec, settings)
    }
}

impl Default for Session<FsCodec> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Image filenames in `dir`, sorted by name.
fn list_images(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if is_image_name(&name) => names.push(name),
            Ok(_) => {}
            Err(raw) => log::debug!("skipping non UTF-8 file name {raw:?}"),
        }
    }
    names.sort();
    Ok(names)
}

/// Remove one file; a missing file is fine, other failures are logged and skipped.
fn remove_best_effort(path: &Path, what: &str) {
    match fs::remove_file(path) {
        Ok(()) => log::info!("deleted {what}: {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("could not delete {what} {}: {e}", path.display()),
    }
}

impl<C: ImageCodec> Session<C> {
    pub fn with_codec(codec: C, settings: Settings) -> Self {
        let history = UndoHistory::with_capacity(settings.history_capacity);
        Self {
            codec,
            compositor: Compositor::new(),
            settings,
            tools: ToolState::default(),
            zoom: Zoom::default(),
            folder: None,
            entries: Vec::new(),
            index: None,
            loaded: None,
            history,
            stroke: None,
        }
    }

    // ------------------------------ accessors ------------------------------

    pub fn state(&self) -> NavState {
        if self.index.is_some() { NavState::Loaded } else { NavState::Empty }
    }

    /// Current position, `None` when empty.
    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn current_name(&self) -> Option<&str> {
        self.index.map(|i| self.entries[i].as_str())
    }

    pub fn folder(&self) -> Option<&FolderLayout> {
        self.folder.as_ref()
    }

    pub fn image(&self) -> Option<&Image> {
        self.loaded.as_ref().map(|l| &l.image)
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.loaded.as_ref().map(|l| &l.mask)
    }

    pub fn image_size(&self) -> Option<(usize, usize)> {
        self.image().map(|img| img.dimensions())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolState {
        &mut self.tools
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.loaded.is_some() && self.history.can_undo()
    }

    pub fn can_next(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn can_previous(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    /// Delete and clear are available.
    pub fn can_edit(&self) -> bool {
        self.index.is_some()
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn status(&self) -> Option<Status> {
        let index = self.index?;
        Some(Status {
            filename: self.entries[index].clone(),
            position: index + 1,
            total: self.entries.len(),
        })
    }

    // ----------------------------- navigation ------------------------------

    /// Open `root`, which must contain an `images/` folder. `masks/` is created when
    /// missing. On error nothing about the current session changes.
    pub fn open_folder(&mut self, root: impl AsRef<Path>) -> Result<()> {
        let layout = FolderLayout::new(root.as_ref(), self.settings.save_dir.clone());
        if !layout.images.is_dir() {
            return Err(Error::NotFound(layout.images));
        }
        for dir in [&layout.masks, &layout.save] {
            if !dir.is_dir() {
                fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
                log::info!("created {}", dir.display());
            }
        }
        let entries = list_images(&layout.images)?;
        if entries.is_empty() {
            return Err(Error::NoImages(layout.images));
        }
        log::info!("opened {} with {} images", layout.root.display(), entries.len());

        self.auto_save();
        self.folder = Some(layout);
        self.entries = entries;
        self.index = Some(0);
        self.load_current()
    }

    /// (Re)load the image at the current index together with its mask.
    ///
    /// A decode failure is returned to the caller; the index stays where it is and no
    /// image is loaded, so the user can still move on or delete the file.
    pub fn load_current(&mut self) -> Result<()> {
        self.loaded = None;
        self.stroke = None;
        self.history.clear();

        let (Some(index), Some(folder)) = (self.index, self.folder.as_ref()) else {
            return Ok(());
        };
        let name = &self.entries[index];

        let image = self.codec.decode_image(&folder.image_path(name))?;
        let mask_path = folder.mask_path(name);
        let mask = if mask_path.is_file() {
            let mask = self.codec.decode_mask(&mask_path)?;
            if mask.same_size(&image) {
                mask
            } else {
                log::debug!(
                    "rescaling mask {} from {}x{} to {}x{}",
                    mask_path.display(),
                    mask.width,
                    mask.height,
                    image.width,
                    image.height
                );
                resize_mask(&mask, image.width, image.height)
            }
        } else {
            Mask::blank(image.width, image.height)
        };
        log::info!("loaded {name} ({}x{})", image.width, image.height);

        self.history = UndoHistory::with_capacity(self.settings.history_capacity);
        self.history.reset(&mask);
        self.loaded = Some(Loaded { image, mask });
        Ok(())
    }

    /// Move to the next image. Returns false at the end of the list.
    pub fn next(&mut self) -> Result<bool> {
        self.step(1)
    }

    /// Move to the previous image. Returns false at the start of the list.
    pub fn previous(&mut self) -> Result<bool> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Result<bool> {
        self.auto_save();
        let Some(index) = self.index else {
            return Ok(false);
        };
        let Some(target) = index.checked_add_signed(delta).filter(|&t| t < self.entries.len()) else {
            return Ok(false);
        };
        self.index = Some(target);
        self.load_current()?;
        Ok(true)
    }

    /// Delete the current image and its masks from disk, then show the neighbour.
    /// File removal is best effort; the list entry is dropped either way.
    pub fn delete(&mut self) -> Result<()> {
        let (Some(index), Some(folder)) = (self.index, self.folder.as_ref()) else {
            return Ok(());
        };
        let name = self.entries[index].clone();
        let mask_path = folder.mask_path(&name);
        let save_path = folder.save_path(&name);

        remove_best_effort(&folder.image_path(&name), "image");
        remove_best_effort(&mask_path, "mask");
        if save_path != mask_path {
            remove_best_effort(&save_path, "saved mask");
        }

        self.entries.remove(index);
        if self.entries.is_empty() {
            log::info!("no images left");
            self.reset();
            return Ok(());
        }
        self.index = Some(index.min(self.entries.len() - 1));
        self.load_current()
    }

    /// Back to `Empty`.
    fn reset(&mut self) {
        self.folder = None;
        self.entries.clear();
        self.index = None;
        self.loaded = None;
        self.stroke = None;
        self.history.clear();
    }

    // ------------------------------ persistence ----------------------------

    /// Write the current mask next to its siblings in the save folder.
    /// Returns false when there is nothing to save.
    pub fn save_mask(&self) -> Result<bool> {
        let (Some(loaded), Some(folder), Some(name)) =
            (self.loaded.as_ref(), self.folder.as_ref(), self.current_name())
        else {
            return Ok(false);
        };
        let path = folder.save_path(name);
        self.codec.encode_mask(&path, &loaded.mask)?;
        log::info!("saved mask {}", path.display());
        Ok(true)
    }

    fn auto_save(&self) {
        if !self.settings.auto_save {
            return;
        }
        if let Err(e) = self.save_mask() {
            log::warn!("auto-save failed: {e}");
        }
    }

    // -------------------------------- editing ------------------------------

    /// Replace the mask with an empty one. One undo brings the old mask back.
    pub fn clear_annotations(&mut self) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        self.history.snapshot(&loaded.mask);
        loaded.mask = Mask::blank(loaded.image.width, loaded.image.height);
        true
    }

    /// Revert the last stroke or clear. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        let Some(mask) = self.history.undo() else {
            return false;
        };
        self.stroke = None;
        loaded.mask = mask;
        true
    }

    /// Pointer pressed at `display`. Snapshots the mask so the stroke can be undone.
    pub fn begin_stroke(&mut self, display: (f32, f32)) -> bool {
        let Some(loaded) = self.loaded.as_ref() else {
            return false;
        };
        self.history.snapshot(&loaded.mask);
        let last = map_to_image(display, self.zoom, Some(loaded.image.dimensions()));
        self.stroke = Some(ActiveStroke { last });
        true
    }

    /// Pointer moved to `display` while pressed. Paints one segment.
    pub fn continue_stroke(&mut self, display: (f32, f32)) -> bool {
        let (Some(stroke), Some(loaded)) = (self.stroke.as_mut(), self.loaded.as_mut()) else {
            return false;
        };
        let current = map_to_image(display, self.zoom, Some(loaded.image.dimensions()));
        paint_segment(&mut loaded.mask, stroke.last, current, self.tools.size(), self.tools.value());
        stroke.last = current;
        true
    }

    /// Pointer released. A stroke that changed nothing leaves no undo step behind.
    pub fn end_stroke(&mut self) {
        if self.stroke.take().is_none() {
            return;
        }
        if let Some(loaded) = self.loaded.as_ref() {
            self.history.discard_if_unchanged(&loaded.mask);
        }
    }

    // -------------------------------- display ------------------------------

    /// Apply one wheel notch. Returns true when the display needs recomputing.
    pub fn zoom_by(&mut self, direction: ZoomDirection) -> bool {
        if self.loaded.is_none() {
            return false;
        }
        let changed = self.zoom.step(direction);
        if changed {
            log::debug!("zoom {:.3}", self.zoom.factor());
        }
        changed
    }

    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
    }

    /// The display buffer for the current state, `None` when no image is loaded.
    pub fn render(&self) -> Option<FrameBuffer> {
        let loaded = self.loaded.as_ref()?;
        Some(self.compositor.render(
            &loaded.image,
            Some(&loaded.mask),
            self.zoom,
            &self.settings.view,
        ))
    }
}
