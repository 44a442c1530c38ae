//! Subset extraction from a labeled image pool.
//!
//! Shuffles the pool once, then deals consecutive slices into
//! train/valid/test, copying each image together with its annotation file
//! when one exists. Used to carve a small working set out of the full
//! parking-lot captures before labeling and training runs.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;

use crate::annotation::label_path_for;
use crate::files::image_files;

/// Split names the subset layout carries, in deal order.
pub const SUBSET_SPLITS: [&str; 3] = ["train", "valid", "test"];

/// How many images each split should receive.
#[derive(Clone, Copy, Debug)]
pub struct SubsetCounts {
    pub train: usize,
    pub valid: usize,
    pub test: usize,
}

impl Default for SubsetCounts {
    fn default() -> Self {
        Self {
            train: 50,
            valid: 10,
            test: 10,
        }
    }
}

/// Copy counts for one produced split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitCopy {
    pub split: String,
    pub images: usize,
    pub labels: usize,
}

/// Build the subset. Asking for more images than the pool holds is not an
/// error; later splits simply come up short. Missing label files are
/// tolerated (the image is copied alone).
pub fn prepare_subset(
    src_images: &Path,
    src_labels: &Path,
    dst_root: &Path,
    counts: SubsetCounts,
) -> Result<Vec<SplitCopy>> {
    let mut pool = image_files(src_images)?;
    pool.shuffle(&mut rand::thread_rng());

    let wanted = [counts.train, counts.valid, counts.test];
    let mut reports = Vec::with_capacity(SUBSET_SPLITS.len());
    let mut start = 0usize;
    for (split, want) in SUBSET_SPLITS.iter().zip(wanted) {
        let dst_images = dst_root.join(split).join("images");
        let dst_labels = dst_root.join(split).join("labels");
        fs::create_dir_all(&dst_images)
            .with_context(|| format!("create {}", dst_images.display()))?;
        fs::create_dir_all(&dst_labels)
            .with_context(|| format!("create {}", dst_labels.display()))?;

        let take = want.min(pool.len().saturating_sub(start));
        let mut copied = SplitCopy {
            split: split.to_string(),
            images: 0,
            labels: 0,
        };
        for image_path in &pool[start..start + take] {
            let file_name = image_path
                .file_name()
                .with_context(|| format!("no file name in {}", image_path.display()))?;
            fs::copy(image_path, dst_images.join(file_name))
                .with_context(|| format!("copy {}", image_path.display()))?;
            copied.images += 1;

            if let Some(label_path) =
                label_path_for(image_path, src_labels).filter(|path| path.is_file())
            {
                let label_name = label_path
                    .file_name()
                    .with_context(|| format!("no file name in {}", label_path.display()))?;
                fs::copy(&label_path, dst_labels.join(label_name))
                    .with_context(|| format!("copy {}", label_path.display()))?;
                copied.labels += 1;
            }
        }
        start += take;

        log::info!(
            "subset split '{}': {} images, {} labels",
            copied.split,
            copied.images,
            copied.labels
        );
        reports.push(copied);
    }
    Ok(reports)
}
