//! In-memory stand-in for a framebuffer device.

use crate::device::{Device, FramebufferIndex};
use crate::geometry::Resolution;

/// A device whose "video memory" is a plain heap buffer.
///
/// Useful for drawing without `/dev/fb*` access and for inspecting exactly
/// what a flush would have put on screen.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    resolution: Resolution,
    memory: Vec<u8>,
    index: Option<FramebufferIndex>,
    flushes: usize,
}

impl MemoryDevice {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            memory: vec![0u8; resolution.buffer_len()],
            resolution,
            index: None,
            flushes: 0,
        }
    }

    /// Tags the device with the framebuffer number it pretends to be.
    pub fn with_index(mut self, index: FramebufferIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Replaces the backing memory, e.g. to simulate a driver whose mapping
    /// does not match its reported geometry.
    pub fn with_memory(mut self, memory: Vec<u8>) -> Self {
        self.memory = memory;
        self
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Bytes of scanline `y`, padding included.
    ///
    /// # Panics
    ///
    /// If `y` is not below the height, or the memory was replaced by a
    /// shorter buffer with [`with_memory`](Self::with_memory).
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.resolution.line_stride as usize;
        let start = y as usize * stride;
        &self.memory[start..start + stride]
    }

    /// Number of times device memory was handed out for writing.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl Device for MemoryDevice {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn memory_len(&self) -> usize {
        self.memory.len()
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.flushes += 1;
        &mut self.memory
    }

    fn index(&self) -> Option<FramebufferIndex> {
        self.index
    }
}
