//! Synthetic augmentation of parking-lot training images.
//!
//! Produces photometric variants (shadow occlusion, brightness shift,
//! sensor noise) of every image in a YOLO-layout dataset. Transforms never
//! resize or move pixels, so each variant reuses its source annotation
//! file verbatim.

mod dataset;
mod photometric;
mod recipe;

pub use dataset::{augment_dataset, augment_split, SplitReport, SplitSummary, SPLITS};
pub use photometric::{add_noise, adjust_brightness, apply_shadow};
pub use recipe::{Recipe, Transform};
