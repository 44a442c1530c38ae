//! capture_probe - exercise a camera stream and report its frame rate
//!
//! Connects the threaded frame reader to the configured camera, consumes
//! frames in a foreground loop, and logs frames-per-second once per
//! second. Ctrl-C stops the reader and exits. Configuration comes from
//! `PARKLOT_CONFIG` / `PARKLOT_CAMERA_URL` / `PARKLOT_TARGET_FPS`.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parklot::capture::{FrameReader, HttpCameraConfig, HttpSource};
use parklot::config::CaptureConfig;

/// Pause when the reader has no frame yet; the stream may be warming up.
const EMPTY_READ_PAUSE: Duration = Duration::from_millis(100);

/// Consumer pacing. Polling faster than this only observes repeats.
const CONSUME_INTERVAL: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = CaptureConfig::load()?;
    log::info!(
        "connecting to camera at {} (target {} fps)",
        cfg.camera_url,
        cfg.target_fps
    );

    let source = HttpSource::new(HttpCameraConfig {
        url: cfg.camera_url,
        target_fps: cfg.target_fps,
    })?;
    let mut reader = FrameReader::new(source);
    reader.start()?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::Relaxed))
            .context("install ctrl-c handler")?;
    }

    let mut reads = 0u64;
    let mut window_start = Instant::now();
    let mut reported_dims = false;
    while running.load(Ordering::Relaxed) {
        let (ok, frame) = reader.read();
        let Some(frame) = frame.filter(|_| ok) else {
            std::thread::sleep(EMPTY_READ_PAUSE);
            continue;
        };

        if !reported_dims {
            log::info!("receiving {}x{} frames", frame.width, frame.height);
            reported_dims = true;
        }

        reads += 1;
        let elapsed = window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::info!("fps: {:.1}", reads as f64 / elapsed.as_secs_f64());
            reads = 0;
            window_start = Instant::now();
        }
        std::thread::sleep(CONSUME_INTERVAL);
    }

    reader.stop();
    log::info!("capture stopped");
    Ok(())
}
