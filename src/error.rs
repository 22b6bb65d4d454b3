// Every variant states *where* things went wrong.
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The chosen root has no `images/` subfolder.
    #[error("image folder does not exist: {}", .0.display())]
    NotFound(PathBuf),
    /// `images/` exists but holds no png/jpg files.
    #[error("no images found in {}", .0.display())]
    NoImages(PathBuf),
    /// An image or mask file is unreadable or corrupt.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Encoding a mask failed.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Filesystem operation (list, create, remove) failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),
    /// Updating the window buffer failed
    #[error("window update error: {0}")]
    WindowUpdate(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
