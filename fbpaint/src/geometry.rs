//! Geometry query: FBIOGET_VSCREENINFO / FBIOGET_FSCREENINFO and the
//! resolution record derived from them.

use std::os::fd::{AsRawFd, BorrowedFd};

use crate::codec::PixelDepth;
use crate::error::{Error, Result};

/// Snapshot of the device geometry, taken once when the device is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    /// Bytes per scanline. May be larger than `width * bytes_per_pixel`.
    pub line_stride: u32,
}

impl Resolution {
    /// A geometry with no scanline padding.
    pub fn new(width: u32, height: u32, bits_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel,
            line_stride: width.saturating_mul(bits_per_pixel / 8),
        }
    }

    pub fn with_stride(self, line_stride: u32) -> Self {
        Self { line_stride, ..self }
    }

    pub fn depth(&self) -> Result<PixelDepth> {
        PixelDepth::from_bits(self.bits_per_pixel)
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    /// Size of one full frame including stride padding.
    pub fn buffer_len(&self) -> usize {
        self.line_stride as usize * self.height as usize
    }

    /// Checks that the geometry can be drawn into without leaving a row.
    pub fn validate(&self) -> Result<PixelDepth> {
        let depth = self.depth()?;
        if self.width == 0 || self.height == 0 {
            return Err(Error::BadGeometry(format!(
                "empty screen {}x{}",
                self.width, self.height
            )));
        }
        let row_bytes = self.width as usize * depth.bytes_per_pixel();
        if (self.line_stride as usize) < row_bytes {
            return Err(Error::BadGeometry(format!(
                "line stride {} is shorter than a {}-pixel row of {} bytes",
                self.line_stride, self.width, row_bytes
            )));
        }
        Ok(depth)
    }
}

// Linux framebuffer ioctls
const FBIOGET_VSCREENINFO: u32 = 0x4600;
const FBIOGET_FSCREENINFO: u32 = 0x4602;

#[repr(C)]
#[derive(Debug, Default)]
pub struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

#[repr(C)]
#[derive(Debug, Default)]
pub struct FbVarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

#[repr(C)]
#[derive(Debug, Default)]
pub struct FbFixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    fb_type: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

nix::ioctl_read_bad!(fbioget_vscreeninfo, FBIOGET_VSCREENINFO, FbVarScreenInfo);
nix::ioctl_read_bad!(fbioget_fscreeninfo, FBIOGET_FSCREENINFO, FbFixScreenInfo);

/// What the driver reports about an open device.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScreenGeometry {
    pub resolution: Resolution,
    /// Length of the device memory, 0 when the driver does not say.
    pub smem_len: usize,
}

pub(crate) fn query_resolution(fd: BorrowedFd<'_>) -> Result<ScreenGeometry> {
    let mut vinfo = FbVarScreenInfo::default();
    unsafe { fbioget_vscreeninfo(fd.as_raw_fd(), &mut vinfo) }.map_err(|source| Error::QueryFailed {
        what: "FBIOGET_VSCREENINFO",
        source,
    })?;

    let mut finfo = FbFixScreenInfo::default();
    unsafe { fbioget_fscreeninfo(fd.as_raw_fd(), &mut finfo) }.map_err(|source| Error::QueryFailed {
        what: "FBIOGET_FSCREENINFO",
        source,
    })?;

    Ok(geometry_from(&vinfo, &finfo))
}

fn geometry_from(vinfo: &FbVarScreenInfo, finfo: &FbFixScreenInfo) -> ScreenGeometry {
    ScreenGeometry {
        resolution: Resolution {
            width: vinfo.xres,
            height: vinfo.yres,
            bits_per_pixel: vinfo.bits_per_pixel,
            line_stride: finfo.line_length,
        },
        smem_len: finfo.smem_len as usize,
    }
}
