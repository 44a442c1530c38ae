//! Threaded frame reader.
//!
//! Decouples network acquisition latency from the consumer loop. A
//! background thread decodes continuously and overwrites a single shared
//! slot with the freshest outcome; the consumer reads the slot without
//! blocking and without consuming it. Frames are dropped rather than
//! queued, which bounds end-to-end latency: a consumer polling faster
//! than frames arrive observes repeats, which is expected.

use anyhow::{anyhow, Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{Frame, FrameSource};

/// Pause between decode attempts. Bounds CPU usage while running and
/// stop latency while shutting down.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reader lifecycle: `created → running → stopped`, one way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderState {
    Created,
    Running,
    Stopped,
}

#[derive(Default)]
struct Slot {
    ok: bool,
    frame: Option<Frame>,
}

struct Shared {
    slot: Mutex<Slot>,
    stop: AtomicBool,
}

/// Owns the frame source and the acquisition thread.
pub struct FrameReader {
    shared: Arc<Shared>,
    source: Option<Box<dyn FrameSource>>,
    handle: Option<JoinHandle<()>>,
    state: ReaderState,
}

impl FrameReader {
    pub fn new(source: impl FrameSource + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot::default()),
                stop: AtomicBool::new(false),
            }),
            source: Some(Box::new(source)),
            handle: None,
            state: ReaderState::Created,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// created → running. Connects the source, then launches the
    /// acquisition loop on a background thread.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ReaderState::Created {
            return Err(anyhow!("cannot start a {:?} reader", self.state));
        }
        self.source
            .as_mut()
            .ok_or_else(|| anyhow!("frame source already consumed"))?
            .connect()?;
        // Only hand the source to the thread once it connected, so a
        // failed connect leaves the reader startable again.
        let source = self
            .source
            .take()
            .ok_or_else(|| anyhow!("frame source already consumed"))?;

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("frame-reader".to_string())
            .spawn(move || acquisition_loop(source, shared))
            .context("spawn frame reader thread")?;
        self.handle = Some(handle);
        self.state = ReaderState::Running;
        Ok(())
    }

    /// The current (success, frame) pair. Never blocks and never consumes
    /// the slot; before the first decode completes this is (false, None).
    pub fn read(&self) -> (bool, Option<Frame>) {
        let slot = lock_slot(&self.shared);
        (slot.ok, slot.frame.clone())
    }

    /// running → stopped. Halts the acquisition loop (latency is bounded
    /// by one poll interval plus one in-flight decode attempt) and drops
    /// the source, releasing the capture resource.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.source = None;
        self.state = ReaderState::Stopped;
    }
}

impl Drop for FrameReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// Slot writes are whole-value assignments under the lock, so even a
// poisoned lock holds a consistent pair.
fn lock_slot(shared: &Shared) -> MutexGuard<'_, Slot> {
    match shared.slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn acquisition_loop(mut source: Box<dyn FrameSource>, shared: Arc<Shared>) {
    while !shared.stop.load(Ordering::Relaxed) {
        // A failed decode is overwritten into the slot like any other
        // outcome and retried on the next iteration, indefinitely and
        // without backoff. TODO: decide whether a retry cap or
        // reconnect-with-backoff belongs here once real camera failure
        // modes are known.
        let outcome = source.next_frame();
        {
            let mut slot = lock_slot(&shared);
            match outcome {
                Ok(frame) => {
                    slot.ok = true;
                    slot.frame = Some(frame);
                }
                Err(err) => {
                    log::debug!("frame decode failed: {:#}", err);
                    slot.ok = false;
                    slot.frame = None;
                }
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
    // Dropping the source here releases the capture resource.
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverConnects;

    impl FrameSource for NeverConnects {
        fn connect(&mut self) -> Result<()> {
            Err(anyhow!("no route to camera"))
        }

        fn next_frame(&mut self) -> Result<Frame> {
            Err(anyhow!("unreachable"))
        }
    }

    struct OneGrayFrame;

    impl FrameSource for OneGrayFrame {
        fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Frame> {
            Ok(Frame::new(vec![128; 4 * 4 * 3], 4, 4))
        }
    }

    #[test]
    fn read_before_start_is_empty() {
        let reader = FrameReader::new(OneGrayFrame);
        assert_eq!(reader.state(), ReaderState::Created);
        let (ok, frame) = reader.read();
        assert!(!ok);
        assert!(frame.is_none());
    }

    #[test]
    fn connect_failure_leaves_reader_startable() {
        let mut reader = FrameReader::new(NeverConnects);
        assert!(reader.start().is_err());
        assert_eq!(reader.state(), ReaderState::Created);
        let (ok, frame) = reader.read();
        assert!(!ok);
        assert!(frame.is_none());
    }

    #[test]
    fn start_is_one_shot() {
        let mut reader = FrameReader::new(OneGrayFrame);
        reader.start().expect("start");
        assert_eq!(reader.state(), ReaderState::Running);
        assert!(reader.start().is_err());
        reader.stop();
        assert_eq!(reader.state(), ReaderState::Stopped);
        assert!(reader.start().is_err());
    }
}
