//! fbpaint: draw into a Linux framebuffer (`/dev/fb<N>`).
//!
//! A [`Framebuffer`] maps the device memory, keeps an offscreen copy of the
//! frame and renders pixels, runs, Bresenham lines, midpoint circles and
//! fills into it. Nothing reaches the screen until [`Framebuffer::flush`].
//!
//! ```no_run
//! use fbpaint::{Color, Framebuffer};
//!
//! let mut fb = Framebuffer::open(0)?;
//! fb.fill(Color::BLACK);
//! fb.line(0, 0, fb.width() as i32 - 1, fb.height() as i32 - 1, Color::RED);
//! fb.flush();
//! # Ok::<(), fbpaint::Error>(())
//! ```
//!
//! 16 and 32 bits per pixel are supported.

mod buffer;
mod codec;
mod device;
mod error;
mod framebuffer;
mod geometry;
mod raster;
mod sim;

pub use codec::{encode, encode_bits, Color, EncodedPixel, PixelDepth};
pub use device::{Device, FbDevice, FramebufferIndex, DEFAULT_DEVICE_DIR};
pub use error::{Error, Result};
pub use framebuffer::{with_device, with_framebuffer, with_framebuffer_in, Framebuffer};
pub use geometry::Resolution;
pub use sim::MemoryDevice;

/// Number of framebuffer device nodes (`/dev/fb0` to `/dev/fb31`).
pub const MAX_FRAMEBUFFERS: usize = 32;
