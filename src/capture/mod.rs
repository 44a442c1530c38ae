//! Network camera capture.
//!
//! - `Frame`: one decoded RGB frame.
//! - `FrameSource`: the open / decode-one / release abstraction over a
//!   sequential video decoder.
//! - `HttpSource`: IP-webcam endpoints (single-JPEG snapshot or MJPEG).
//! - `FrameReader`: background acquisition thread publishing the freshest
//!   frame into a shared slot.

mod http;
mod reader;

use anyhow::Result;

pub use http::{HttpCameraConfig, HttpSource};
pub use reader::{FrameReader, ReaderState, POLL_INTERVAL};

/// One decoded video frame. Tightly packed RGB, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// A sequential frame decoder: open once, decode one frame at a time,
/// release by dropping. Decode failures are transient; callers decide the
/// retry policy.
pub trait FrameSource: Send {
    /// Open the underlying stream. Must succeed before the first decode.
    fn connect(&mut self) -> Result<()>;

    /// Decode the next frame.
    fn next_frame(&mut self) -> Result<Frame>;
}
