//! HTTP camera frame source.
//!
//! Speaks the two stream shapes phone IP-webcam apps expose: a multipart
//! MJPEG stream, or a snapshot endpoint returning one JPEG per request.
//! The content type of the first response decides which. Frames are
//! decimated to the configured target rate; JPEG decode happens
//! in-memory.

use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::time::{Duration, Instant};
use url::Url;

use super::{Frame, FrameSource};

const MAX_JPEG_BYTES: usize = 5 * 1024 * 1024;

/// Configuration for an HTTP camera source.
#[derive(Clone, Debug)]
pub struct HttpCameraConfig {
    /// Stream URL, http(s) only.
    pub url: String,
    /// Target frame rate; the source drops frames above this rate.
    pub target_fps: u32,
}

impl Default for HttpCameraConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.1.11:4747/video".to_string(),
            target_fps: 10,
        }
    }
}

/// HTTP camera frame source.
pub struct HttpSource {
    config: HttpCameraConfig,
    stream: Option<HttpStream>,
    last_frame_at: Option<Instant>,
}

enum HttpStream {
    Mjpeg(MjpegStream),
    SingleJpeg,
}

impl HttpSource {
    pub fn new(config: HttpCameraConfig) -> Result<Self> {
        let url = Url::parse(&config.url).context("parse camera url")?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(anyhow!(
                    "unsupported camera scheme '{}'; expected http(s)",
                    other
                ))
            }
        }
        Ok(Self {
            config,
            stream: None,
            last_frame_at: None,
        })
    }
}

impl FrameSource for HttpSource {
    fn connect(&mut self) -> Result<()> {
        let response = ureq::get(&self.config.url)
            .call()
            .context("connect to camera http stream")?;
        let content_type = response.header("Content-Type").unwrap_or("");
        if content_type.to_lowercase().contains("multipart") {
            let reader = response.into_reader();
            self.stream = Some(HttpStream::Mjpeg(MjpegStream::new(reader)));
        } else {
            self.stream = Some(HttpStream::SingleJpeg);
        }
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("camera source not connected; call connect() first"))?;
        let min_interval = frame_interval(self.config.target_fps);
        loop {
            let jpeg_bytes = match stream {
                HttpStream::Mjpeg(stream) => stream.read_next_jpeg(),
                HttpStream::SingleJpeg => fetch_single_jpeg(&self.config.url),
            }?;

            let now = Instant::now();
            if let Some(last) = self.last_frame_at {
                if now.duration_since(last) < min_interval {
                    continue;
                }
            }

            let frame = decode_jpeg(&jpeg_bytes)?;
            self.last_frame_at = Some(now);
            return Ok(frame);
        }
    }
}

struct MjpegStream {
    reader: Box<dyn Read + Send>,
    buffer: Vec<u8>,
}

impl MjpegStream {
    fn new(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(64 * 1024),
        }
    }

    fn read_next_jpeg(&mut self) -> Result<Vec<u8>> {
        let mut chunk = vec![0u8; 8192];
        loop {
            if let Some((start, end)) = find_jpeg_bounds(&self.buffer) {
                let frame = self.buffer[start..end].to_vec();
                self.buffer.drain(..end);
                return Ok(frame);
            }

            let read = self.reader.read(&mut chunk).context("read mjpeg chunk")?;
            if read == 0 {
                return Err(anyhow!("mjpeg stream ended"));
            }
            self.buffer.extend_from_slice(&chunk[..read]);

            if self.buffer.len() > MAX_JPEG_BYTES * 2 {
                let keep = 2.min(self.buffer.len());
                let drain_len = self.buffer.len() - keep;
                self.buffer.drain(..drain_len);
            }
        }
    }
}

fn fetch_single_jpeg(url: &str) -> Result<Vec<u8>> {
    let response = ureq::get(url)
        .call()
        .with_context(|| format!("fetch jpeg snapshot from {}", url))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .context("read jpeg snapshot")?;
    if bytes.is_empty() {
        return Err(anyhow!("empty jpeg snapshot"));
    }
    Ok(bytes)
}

fn decode_jpeg(bytes: &[u8]) -> Result<Frame> {
    let image = image::load_from_memory(bytes).context("decode jpeg")?;
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(rgb.into_raw(), width, height))
}

/// Byte offsets of the first complete JPEG (SOI..EOI) in the buffer.
fn find_jpeg_bounds(buffer: &[u8]) -> Option<(usize, usize)> {
    let mut start = None;
    let mut i = 0;
    while i + 1 < buffer.len() {
        if buffer[i] == 0xFF && buffer[i + 1] == 0xD8 {
            start = Some(i);
            break;
        }
        i += 1;
    }
    let start = start?;
    let mut j = start + 2;
    while j + 1 < buffer.len() {
        if buffer[j] == 0xFF && buffer[j + 1] == 0xD9 {
            return Some((start, j + 2));
        }
        j += 1;
    }
    None
}

fn frame_interval(target_fps: u32) -> Duration {
    if target_fps == 0 {
        Duration::from_millis(0)
    } else {
        Duration::from_millis((1000 / target_fps).max(1) as u64)
    }
}
