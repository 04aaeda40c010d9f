//! Error type shared by every fallible framebuffer operation.
//!
//! Only opening a device can fail. Drawing clips and flushing copies, so
//! neither reports errors.

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("framebuffer index {0} is out of range (0..{max})", max = crate::MAX_FRAMEBUFFERS)]
    InvalidIndex(i64),

    #[error("framebuffer device {} does not exist", .0.display())]
    DeviceNotFound(PathBuf),

    #[error("permission denied opening {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("framebuffer device {} is busy", .0.display())]
    DeviceBusy(PathBuf),

    #[error("open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("mmap of framebuffer memory failed: {0}")]
    MapFailed(#[source] Errno),

    #[error("{what} failed: {source}")]
    QueryFailed {
        what: &'static str,
        #[source]
        source: Errno,
    },

    #[error("unsupported pixel depth: {0} bits per pixel")]
    UnsupportedDepth(u32),

    #[error("unusable framebuffer geometry: {0}")]
    BadGeometry(String),

    #[error("device memory is {device} bytes but the offscreen buffer needs {offscreen}")]
    SizeMismatch { offscreen: usize, device: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classifies a failed `open(2)` of a device node.
    pub(crate) fn from_open(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Error::DeviceNotFound(path),
            io::ErrorKind::PermissionDenied => Error::PermissionDenied(path),
            _ if source.raw_os_error() == Some(libc::EBUSY) => Error::DeviceBusy(path),
            _ => Error::Open { path, source },
        }
    }
}
