//! LabelMe rectangle annotations to YOLO text.
//!
//! Reads the JSON documents the labeling tool emits (image dimensions
//! plus a list of labeled two-point rectangles) and writes one normalized
//! annotation file per document, with a `classes.txt` listing the class
//! names in id order. A document that fails to parse aborts only that
//! document's conversion.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::annotation::{write_annotations, BoundingBox};

#[derive(Debug, Deserialize)]
struct LabelMeDocument {
    #[serde(rename = "imageWidth")]
    image_width: f64,
    #[serde(rename = "imageHeight")]
    image_height: f64,
    shapes: Vec<LabelMeShape>,
}

#[derive(Debug, Deserialize)]
struct LabelMeShape {
    label: String,
    points: Vec<[f64; 2]>,
}

/// Ordered class table; a class's id is its position in the list.
#[derive(Clone, Debug)]
pub struct ClassTable {
    names: Vec<String>,
}

impl ClassTable {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(anyhow!("class table must not be empty"));
        }
        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(anyhow!("class {} has an empty name", index));
            }
            if names[..index].contains(name) {
                return Err(anyhow!("duplicate class name '{}'", name));
            }
        }
        Ok(Self { names })
    }

    /// The occupancy classes this project labels with.
    pub fn parking_default() -> Self {
        Self {
            names: vec!["occupied".to_string(), "vacant".to_string()],
        }
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.names.iter().position(|n| n == name).map(|id| id as u32)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Outcome counts for a directory conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Convert one LabelMe document into `<output_dir>/<stem>.txt`. Shapes
/// with labels missing from the class table are warned about and skipped.
/// Returns the number of boxes written.
pub fn convert_file(json_path: &Path, output_dir: &Path, classes: &ClassTable) -> Result<usize> {
    let text = fs::read_to_string(json_path)
        .with_context(|| format!("read {}", json_path.display()))?;
    let document: LabelMeDocument =
        serde_json::from_str(&text).with_context(|| format!("parse {}", json_path.display()))?;
    if document.image_width <= 0.0 || document.image_height <= 0.0 {
        return Err(anyhow!(
            "{}: non-positive image dimensions {}x{}",
            json_path.display(),
            document.image_width,
            document.image_height
        ));
    }

    let mut boxes = Vec::with_capacity(document.shapes.len());
    for shape in &document.shapes {
        let Some(class_id) = classes.id_of(&shape.label) else {
            log::warn!(
                "unknown label '{}' in {}; shape skipped",
                shape.label,
                json_path.display()
            );
            continue;
        };
        if shape.points.len() < 2 {
            return Err(anyhow!(
                "{}: rectangle '{}' has {} points, need 2",
                json_path.display(),
                shape.label,
                shape.points.len()
            ));
        }
        boxes.push(rectangle_to_bbox(
            shape.points[0],
            shape.points[1],
            document.image_width,
            document.image_height,
            class_id,
        ));
    }

    let stem = json_path
        .file_stem()
        .with_context(|| format!("no file stem in {}", json_path.display()))?;
    let output_path = output_dir.join(stem).with_extension("txt");
    write_annotations(&output_path, &boxes)?;
    Ok(boxes.len())
}

/// Convert every `*.json` document of a directory. Per-file failures are
/// warned about and counted, never fatal. An empty directory is a
/// warning, not an error.
pub fn convert_dir(
    json_dir: &Path,
    output_dir: &Path,
    classes: &ClassTable,
) -> Result<ConvertSummary> {
    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;

    let mut json_files = Vec::new();
    let entries =
        fs::read_dir(json_dir).with_context(|| format!("list {}", json_dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read directory entry in {}", json_dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            json_files.push(path);
        }
    }
    json_files.sort();

    if json_files.is_empty() {
        log::warn!("no JSON files found in {}", json_dir.display());
        return Ok(ConvertSummary::default());
    }

    let mut summary = ConvertSummary::default();
    for json_path in &json_files {
        match convert_file(json_path, output_dir, classes) {
            Ok(boxes) => {
                log::debug!("converted {} ({} boxes)", json_path.display(), boxes);
                summary.converted += 1;
            }
            Err(err) => {
                log::warn!("skipping {}: {:#}", json_path.display(), err);
                summary.failed += 1;
            }
        }
    }
    log::info!(
        "converted {}/{} files",
        summary.converted,
        json_files.len()
    );
    Ok(summary)
}

/// Write `classes.txt` with one class name per line, in id order.
pub fn write_classes_file(output_dir: &Path, classes: &ClassTable) -> Result<()> {
    let path = output_dir.join("classes.txt");
    let mut text = classes.names().join("\n");
    text.push('\n');
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))
}

/// Two rectangle corners to a normalized center/size box. Corner order
/// does not matter; coordinates are clamped into the image.
fn rectangle_to_bbox(
    p1: [f64; 2],
    p2: [f64; 2],
    image_width: f64,
    image_height: f64,
    class_id: u32,
) -> BoundingBox {
    let cx = ((p1[0] + p2[0]) / 2.0 / image_width).clamp(0.0, 1.0);
    let cy = ((p1[1] + p2[1]) / 2.0 / image_height).clamp(0.0, 1.0);
    let w = ((p1[0] - p2[0]).abs() / image_width).clamp(0.0, 1.0);
    let h = ((p1[1] - p2[1]).abs() / image_height).clamp(0.0, 1.0);
    BoundingBox {
        class_id,
        cx,
        cy,
        w,
        h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_normalizes_regardless_of_corner_order() {
        let a = rectangle_to_bbox([100.0, 50.0], [300.0, 250.0], 400.0, 500.0, 1);
        let b = rectangle_to_bbox([300.0, 250.0], [100.0, 50.0], 400.0, 500.0, 1);
        assert_eq!(a, b);
        assert_eq!(a.class_id, 1);
        assert!((a.cx - 0.5).abs() < 1e-9);
        assert!((a.cy - 0.3).abs() < 1e-9);
        assert!((a.w - 0.5).abs() < 1e-9);
        assert!((a.h - 0.4).abs() < 1e-9);
    }

    #[test]
    fn class_table_rejects_duplicates_and_orders_ids() {
        let table = ClassTable::parking_default();
        assert_eq!(table.id_of("occupied"), Some(0));
        assert_eq!(table.id_of("vacant"), Some(1));
        assert_eq!(table.id_of("car"), None);
        assert!(ClassTable::new(vec!["a".into(), "a".into()]).is_err());
        assert!(ClassTable::new(vec![]).is_err());
    }
}
