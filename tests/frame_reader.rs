use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};

use parklot::capture::{Frame, FrameReader, FrameSource, ReaderState, POLL_INTERVAL};

struct AlwaysFails;

impl FrameSource for AlwaysFails {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        Err(anyhow!("camera went away"))
    }
}

struct ConstantSource;

impl FrameSource for ConstantSource {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        Ok(Frame::new(vec![200; 6 * 4 * 3], 6, 4))
    }
}

struct FailsAfterFirst {
    served: bool,
}

impl FrameSource for FailsAfterFirst {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        if self.served {
            Err(anyhow!("stream ended"))
        } else {
            self.served = true;
            Ok(Frame::new(vec![10; 2 * 2 * 3], 2, 2))
        }
    }
}

fn poll_until<F: Fn(&(bool, Option<Frame>)) -> bool>(
    reader: &FrameReader,
    deadline: Duration,
    predicate: F,
) -> (bool, Option<Frame>) {
    let start = Instant::now();
    loop {
        let pair = reader.read();
        if predicate(&pair) {
            return pair;
        }
        assert!(
            start.elapsed() < deadline,
            "reader never reached expected state"
        );
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn failing_source_never_blocks_and_stops_within_a_poll_interval() {
    let mut reader = FrameReader::new(AlwaysFails);
    reader.start().expect("start");

    for _ in 0..50 {
        let started = Instant::now();
        let (ok, frame) = reader.read();
        assert!(!ok);
        assert!(frame.is_none());
        assert!(started.elapsed() < Duration::from_millis(50), "read blocked");
    }

    let stopping = Instant::now();
    reader.stop();
    // one sleep interval, plus scheduling slack
    assert!(stopping.elapsed() < POLL_INTERVAL + Duration::from_millis(200));
    assert_eq!(reader.state(), ReaderState::Stopped);

    // reads after stop still do not block
    let (ok, frame) = reader.read();
    assert!(!ok);
    assert!(frame.is_none());
}

#[test]
fn read_is_non_consuming_and_repeats_the_freshest_frame() {
    let mut reader = FrameReader::new(ConstantSource);
    reader.start().expect("start");

    let (ok, frame) = poll_until(&reader, Duration::from_secs(2), |(ok, _)| *ok);
    assert!(ok);
    let frame = frame.expect("frame");
    assert_eq!((frame.width, frame.height), (6, 4));
    assert_eq!(frame.pixels.len(), 6 * 4 * 3);

    // a second read observes the same frame again, not an empty slot
    let (ok_again, frame_again) = reader.read();
    assert!(ok_again);
    assert_eq!(frame_again.expect("frame"), frame);

    reader.stop();
}

#[test]
fn slot_is_overwritten_on_decode_failure() {
    let mut reader = FrameReader::new(FailsAfterFirst { served: false });
    reader.start().expect("start");

    // the single good frame shows up...
    poll_until(&reader, Duration::from_secs(2), |(ok, _)| *ok);
    // ...and the following failure overwrites it rather than lingering
    let (ok, frame) = poll_until(&reader, Duration::from_secs(2), |(ok, _)| !*ok);
    assert!(!ok);
    assert!(frame.is_none());

    reader.stop();
}
