//! Heap-allocated back buffer matching the device memory byte for byte.
//!
//! Coordinates arrive as `i64` so that callers can pass anything an `i32`
//! drawing call produces, including the sum of a position and a length.
//! Every write is checked against the visible area; the padding at the end
//! of each scanline is never touched, and a pixel encoded for a different
//! depth than the buffer's is dropped instead of written.

use crate::codec::EncodedPixel;
use crate::geometry::Resolution;

#[derive(Debug, Clone)]
pub struct OffscreenBuffer {
    data: Vec<u8>,
    width: i64,
    height: i64,
    stride: usize,
    bpp: usize,
}

impl OffscreenBuffer {
    /// `resolution` must already have passed [`Resolution::validate`].
    pub(crate) fn allocate(resolution: &Resolution) -> Self {
        Self {
            data: vec![0u8; resolution.buffer_len()],
            width: i64::from(resolution.width),
            height: i64::from(resolution.height),
            stride: resolution.line_stride as usize,
            bpp: resolution.bytes_per_pixel(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn width(&self) -> i64 {
        self.width
    }

    pub(crate) fn height(&self) -> i64 {
        self.height
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of `(x, y)`, or `None` when the pixel is off screen.
    pub(crate) fn pixel_offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.stride + x as usize * self.bpp)
    }

    fn fits(&self, pixel: &EncodedPixel) -> bool {
        pixel.depth().bytes_per_pixel() == self.bpp
    }

    pub(crate) fn write_pixel(&mut self, x: i64, y: i64, pixel: &EncodedPixel) {
        if !self.fits(pixel) {
            return;
        }
        if let Some(off) = self.pixel_offset(x, y) {
            let bytes = pixel.as_bytes();
            self.data[off..off + bytes.len()].copy_from_slice(bytes);
        }
    }

    /// Writes `len` pixels to the right of `(x, y)`, keeping only the part
    /// inside `[0, width)`.
    pub(crate) fn write_run(&mut self, x: i64, y: i64, len: i64, pixel: &EncodedPixel) {
        if !self.fits(pixel) || len <= 0 || y < 0 || y >= self.height {
            return;
        }
        let start = x.max(0);
        let end = x.saturating_add(len).min(self.width);
        if start >= end {
            return;
        }
        let row = y as usize * self.stride;
        let from = row + start as usize * self.bpp;
        let to = row + end as usize * self.bpp;
        fill_pattern(&mut self.data[from..to], pixel.as_bytes());
    }

    /// Writes `pixel` to every visible pixel of every row.
    pub(crate) fn fill_rows(&mut self, pixel: &EncodedPixel) {
        let row_bytes = (self.width as usize * self.bpp).min(self.stride);
        let bytes = pixel.as_bytes();
        if row_bytes == 0 || !self.fits(pixel) {
            return;
        }
        for row in self.data.chunks_exact_mut(self.stride) {
            fill_pattern(&mut row[..row_bytes], bytes);
        }
    }
}

fn fill_pattern(dst: &mut [u8], pattern: &[u8]) {
    for px in dst.chunks_exact_mut(pattern.len()) {
        px.copy_from_slice(pattern);
    }
}
