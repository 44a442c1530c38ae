//! Dataset-level augmentation driver.
//!
//! Walks the `<root>/<split>/images` + `<root>/<split>/labels` layout,
//! copies every original image and label unchanged into the target, then
//! generates recipe variants per image. Variant labels are byte-exact
//! copies of the source label file; the transforms are photometric only,
//! so the source boxes stay valid.

use anyhow::{Context, Result};
use rand::Rng;
use std::fs;
use std::path::Path;

use super::Recipe;
use crate::annotation::label_path_for;
use crate::files::image_files;

/// Splits the augmentation layout carries.
pub const SPLITS: [&str; 2] = ["train", "val"];

/// Per-split outcome counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Source images copied through unchanged.
    pub originals: usize,
    /// Generated variant images.
    pub variants: usize,
    /// Source images that could not be decoded and produced no variants.
    pub skipped: usize,
}

/// Outcome of one split; `summary` is `None` when the source split
/// directory was missing and the split was skipped entirely.
#[derive(Clone, Debug)]
pub struct SplitReport {
    pub split: String,
    pub summary: Option<SplitSummary>,
}

/// Augment a single split. Returns `Ok(None)` (after a warning) when the
/// source split has no `images` directory.
pub fn augment_split<R: Rng>(
    source_root: &Path,
    target_root: &Path,
    split: &str,
    num_variations: usize,
    rng: &mut R,
) -> Result<Option<SplitSummary>> {
    let target_images = target_root.join(split).join("images");
    let target_labels = target_root.join(split).join("labels");
    fs::create_dir_all(&target_images)
        .with_context(|| format!("create {}", target_images.display()))?;
    fs::create_dir_all(&target_labels)
        .with_context(|| format!("create {}", target_labels.display()))?;

    let source_images = source_root.join(split).join("images");
    let source_labels = source_root.join(split).join("labels");
    if !source_images.is_dir() {
        log::warn!(
            "split '{}' has no images directory at {}; skipping",
            split,
            source_images.display()
        );
        return Ok(None);
    }

    let mut summary = SplitSummary::default();
    for image_path in image_files(&source_images)? {
        let file_name = image_path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("non-utf8 image name {}", image_path.display()))?;
        let stem = image_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("non-utf8 image stem {}", image_path.display()))?;
        let extension = image_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");

        // Originals go through unchanged, label included when present.
        fs::copy(&image_path, target_images.join(file_name))
            .with_context(|| format!("copy {}", image_path.display()))?;
        let label_path = label_path_for(&image_path, &source_labels);
        if let Some(label_path) = label_path.as_ref().filter(|path| path.is_file()) {
            let label_name = label_path
                .file_name()
                .and_then(|name| name.to_str())
                .with_context(|| format!("non-utf8 label name {}", label_path.display()))?;
            fs::copy(label_path, target_labels.join(label_name))
                .with_context(|| format!("copy {}", label_path.display()))?;
        }
        summary.originals += 1;

        let image = match image::open(&image_path) {
            Ok(image) => image.into_rgb8(),
            Err(err) => {
                log::debug!("cannot decode {}: {}", image_path.display(), err);
                summary.skipped += 1;
                continue;
            }
        };

        for index in 0..num_variations {
            let recipe = Recipe::choose(rng);
            let variant = recipe.apply(&image, rng);
            let variant_name = format!("{}_aug{}_{}.{}", stem, index, recipe.name(), extension);
            let variant_path = target_images.join(&variant_name);
            variant
                .save(&variant_path)
                .with_context(|| format!("save {}", variant_path.display()))?;

            if let Some(label_path) = label_path.as_ref().filter(|path| path.is_file()) {
                let variant_label = format!("{}_aug{}_{}.txt", stem, index, recipe.name());
                fs::copy(label_path, target_labels.join(variant_label))
                    .with_context(|| format!("copy {}", label_path.display()))?;
            }
            summary.variants += 1;
        }
    }

    log::info!(
        "split '{}': {} originals, {} variants, {} skipped",
        split,
        summary.originals,
        summary.variants,
        summary.skipped
    );
    Ok(Some(summary))
}

/// Augment every split of a dataset, `num_variations` variants per image.
pub fn augment_dataset(
    source_root: &Path,
    target_root: &Path,
    num_variations: usize,
) -> Result<Vec<SplitReport>> {
    let mut rng = rand::thread_rng();
    let mut reports = Vec::with_capacity(SPLITS.len());
    for split in SPLITS {
        let summary = augment_split(source_root, target_root, split, num_variations, &mut rng)?;
        reports.push(SplitReport {
            split: split.to_string(),
            summary,
        });
    }
    Ok(reports)
}
