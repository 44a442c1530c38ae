//! Parking-lot occupancy dataset tools.
//!
//! Utility library behind the `parklot-tools` binaries, supporting an
//! object-detection model trained to tell occupied parking spaces from
//! vacant ones:
//!
//! - `augment`: synthetic shadow/brightness/noise variants of training
//!   images, with annotation files carried along by filename convention
//! - `preprocess`: CLAHE contrast enhancement and resize to model input
//! - `subset`: shuffled train/valid/test extraction from a labeled pool
//! - `convert`: LabelMe rectangle JSON to normalized YOLO text
//! - `capture`: network camera frame sources and the threaded frame
//!   reader that keeps a consumer loop on the freshest frame
//!
//! Datasets follow the external `<root>/<split>/images` +
//! `<root>/<split>/labels` layout; this crate consumes and reproduces
//! that convention, it does not define it.

pub mod annotation;
pub mod augment;
pub mod capture;
pub mod config;
pub mod convert;
pub mod files;
pub mod preprocess;
pub mod subset;

pub use annotation::BoundingBox;
pub use augment::{augment_dataset, Recipe};
pub use capture::{Frame, FrameReader, FrameSource, HttpSource};
pub use config::CaptureConfig;
pub use convert::ClassTable;
