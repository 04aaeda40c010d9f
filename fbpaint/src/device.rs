//! Device handle: the open `/dev/fb<N>` descriptor and its shared mapping.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::{self, Resolution};
use crate::MAX_FRAMEBUFFERS;

/// Directory holding the framebuffer device nodes.
pub const DEFAULT_DEVICE_DIR: &str = "/dev";

/// A validated framebuffer number, `0..MAX_FRAMEBUFFERS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferIndex(u8);

impl FramebufferIndex {
    pub fn new(index: i64) -> Result<Self> {
        if (0..MAX_FRAMEBUFFERS as i64).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(Error::InvalidIndex(index))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// `<dir>/fb<N>`
    pub fn device_path(self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(format!("fb{}", self.0))
    }
}

impl fmt::Display for FramebufferIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fb{}", self.0)
    }
}

impl TryFrom<i64> for FramebufferIndex {
    type Error = Error;

    fn try_from(index: i64) -> Result<Self> {
        Self::new(index)
    }
}

/// Memory a [`Framebuffer`](crate::Framebuffer) can flush frames into.
pub trait Device {
    /// Geometry captured when the device was opened.
    fn resolution(&self) -> Resolution;

    /// Length of the visible device memory in bytes.
    fn memory_len(&self) -> usize;

    /// The visible device memory.
    fn memory_mut(&mut self) -> &mut [u8];

    fn index(&self) -> Option<FramebufferIndex> {
        None
    }
}

/// An open Linux framebuffer device.
///
/// Owns the descriptor and a read/write `MAP_SHARED` mapping of one frame.
/// Both are released on drop, in that order: unmap, then close.
pub struct FbDevice {
    index: FramebufferIndex,
    path: PathBuf,
    resolution: Resolution,
    map: NonNull<libc::c_void>,
    map_len: usize,
    _file: File,
}

// The mapping is owned exclusively by this handle.
unsafe impl Send for FbDevice {}

impl FbDevice {
    /// Opens `/dev/fb<index>`.
    pub fn open(index: FramebufferIndex) -> Result<Self> {
        Self::open_in(DEFAULT_DEVICE_DIR, index)
    }

    /// Opens `<dir>/fb<index>`.
    pub fn open_in(dir: impl AsRef<Path>, index: FramebufferIndex) -> Result<Self> {
        let path = index.device_path(dir);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::from_open(path.clone(), e))?;

        // `file` closes on every early return below.
        let geometry = geometry::query_resolution(file.as_fd())?;
        let resolution = geometry.resolution;
        resolution.validate()?;

        let map_len = resolution.buffer_len();
        if geometry.smem_len != 0 && map_len > geometry.smem_len {
            return Err(Error::BadGeometry(format!(
                "frame of {map_len} bytes exceeds device memory of {} bytes",
                geometry.smem_len
            )));
        }
        let len = NonZeroUsize::new(map_len)
            .ok_or_else(|| Error::BadGeometry("zero-length frame".into()))?;

        let map = unsafe {
            mmap(
                None,
                len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &file,
                0,
            )
        }
        .map_err(Error::MapFailed)?;

        info!(
            device = %path.display(),
            width = resolution.width,
            height = resolution.height,
            bpp = resolution.bits_per_pixel,
            stride = resolution.line_stride,
            "opened framebuffer"
        );

        Ok(Self {
            index,
            path,
            resolution,
            map,
            map_len,
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Device for FbDevice {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn memory_len(&self) -> usize {
        self.map_len
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.map.as_ptr() as *mut u8, self.map_len) }
    }

    fn index(&self) -> Option<FramebufferIndex> {
        Some(self.index)
    }
}

impl fmt::Debug for FbDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FbDevice")
            .field("path", &self.path)
            .field("resolution", &self.resolution)
            .field("map_len", &self.map_len)
            .finish_non_exhaustive()
    }
}

impl Drop for FbDevice {
    fn drop(&mut self) {
        if let Err(e) = unsafe { munmap(self.map, self.map_len) } {
            warn!(device = %self.path.display(), "munmap failed: {e}");
        }
        debug!(device = %self.path.display(), "released framebuffer");
    }
}
