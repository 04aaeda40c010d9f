//! The open framebuffer: device, offscreen buffer and the flush between them.

use std::path::Path;

use tracing::{debug, trace};

use crate::buffer::OffscreenBuffer;
use crate::codec::{encode, Color, EncodedPixel, PixelDepth};
use crate::device::{Device, FbDevice, FramebufferIndex, DEFAULT_DEVICE_DIR};
use crate::error::{Error, Result};
use crate::geometry::Resolution;
use crate::raster;

/// A drawable framebuffer.
///
/// Drawing calls write to an offscreen buffer only; nothing becomes visible
/// until [`flush`](Framebuffer::flush) copies the whole frame to the device.
/// Coordinates outside the screen are clipped, never reported.
///
/// Once [`close`](Framebuffer::close)d (or dropped) the device is released
/// and every further drawing or flush call does nothing.
pub struct Framebuffer<D: Device = FbDevice> {
    resolution: Resolution,
    depth: PixelDepth,
    index: Option<FramebufferIndex>,
    surface: Option<Surface<D>>,
}

struct Surface<D> {
    device: D,
    offscreen: OffscreenBuffer,
}

impl Framebuffer<FbDevice> {
    /// Opens `/dev/fb<index>`.
    pub fn open(index: i64) -> Result<Self> {
        Self::open_in(DEFAULT_DEVICE_DIR, index)
    }

    /// Opens `<dir>/fb<index>`.
    pub fn open_in(dir: impl AsRef<Path>, index: i64) -> Result<Self> {
        let index = FramebufferIndex::new(index)?;
        Self::from_device(FbDevice::open_in(dir, index)?)
    }
}

impl<D: Device> Framebuffer<D> {
    /// Wraps an already open device, allocating an offscreen buffer of the
    /// same size as its memory.
    pub fn from_device(device: D) -> Result<Self> {
        let resolution = device.resolution();
        let depth = resolution.validate()?;

        let offscreen = OffscreenBuffer::allocate(&resolution);
        if offscreen.len() != device.memory_len() {
            return Err(Error::SizeMismatch {
                offscreen: offscreen.len(),
                device: device.memory_len(),
            });
        }
        debug!(bytes = offscreen.len(), ?depth, "allocated offscreen buffer");

        Ok(Self {
            resolution,
            depth,
            index: device.index(),
            surface: Some(Surface { device, offscreen }),
        })
    }

    /// Releases the device. Calling this again is a no-op.
    pub fn close(&mut self) {
        if self.surface.take().is_some() {
            debug!(index = ?self.index, "closed framebuffer");
        }
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Geometry captured at open time.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    pub fn index(&self) -> Option<FramebufferIndex> {
        self.index
    }

    /// The underlying device while open.
    pub fn device(&self) -> Option<&D> {
        self.surface.as_ref().map(|s| &s.device)
    }

    /// The color as it will be stored for this framebuffer's depth.
    pub fn encode(&self, color: Color) -> EncodedPixel {
        encode(color, self.depth)
    }

    fn paint(&mut self, color: Color, draw: impl FnOnce(&mut OffscreenBuffer, &EncodedPixel)) {
        let px = encode(color, self.depth);
        if let Some(surface) = self.surface.as_mut() {
            draw(&mut surface.offscreen, &px);
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.paint(color, |buf, px| raster::set_pixel(buf, x, y, px));
    }

    pub fn horizontal_line(&mut self, x: i32, y: i32, len: i32, color: Color) {
        self.paint(color, |buf, px| raster::horizontal_line(buf, x, y, len, px));
    }

    pub fn vertical_line(&mut self, x: i32, y: i32, len: i32, color: Color) {
        self.paint(color, |buf, px| raster::vertical_line(buf, x, y, len, px));
    }

    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.paint(color, |buf, px| raster::line(buf, x1, y1, x2, y2, px));
    }

    pub fn circle(&mut self, xm: i32, ym: i32, radius: i32, color: Color) {
        self.paint(color, |buf, px| raster::circle(buf, xm, ym, radius, px));
    }

    pub fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.paint(color, |buf, px| raster::rect(buf, x, y, w, h, px));
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.paint(color, |buf, px| raster::fill_rect(buf, x, y, w, h, px));
    }

    pub fn fill(&mut self, color: Color) {
        self.paint(color, raster::fill);
    }

    /// Copies the offscreen buffer to device memory in one pass.
    pub fn flush(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let src = surface.offscreen.as_bytes();
            surface.device.memory_mut().copy_from_slice(src);
            trace!(bytes = src.len(), "flushed frame");
        }
    }

    #[cfg(test)]
    pub(crate) fn offscreen(&self) -> Option<&OffscreenBuffer> {
        self.surface.as_ref().map(|s| &s.offscreen)
    }
}

impl<D: Device> Drop for Framebuffer<D> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens `/dev/fb<index>`, runs `f` on it and closes it again, also when
/// `f` panics.
pub fn with_framebuffer<R>(index: i64, f: impl FnOnce(&mut Framebuffer) -> R) -> Result<R> {
    with_framebuffer_in(DEFAULT_DEVICE_DIR, index, f)
}

/// [`with_framebuffer`] for device nodes under `dir`.
pub fn with_framebuffer_in<R>(
    dir: impl AsRef<Path>,
    index: i64,
    f: impl FnOnce(&mut Framebuffer) -> R,
) -> Result<R> {
    let index = FramebufferIndex::new(index)?;
    with_device(FbDevice::open_in(dir, index)?, f)
}

/// Wraps `device`, runs `f` on it and releases the device once `f` returns
/// or unwinds.
pub fn with_device<D: Device, R>(
    device: D,
    f: impl FnOnce(&mut Framebuffer<D>) -> R,
) -> Result<R> {
    let mut fb = Framebuffer::from_device(device)?;
    let out = f(&mut fb);
    fb.close();
    Ok(out)
}
