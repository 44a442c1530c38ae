//! Normalized YOLO annotations.
//!
//! One annotation file corresponds 1:1 with one image by shared base
//! filename (`images/foo.jpg` pairs with `labels/foo.txt`). Each line is
//! `class_id cx cy w h`, whitespace-separated, all coordinates normalized
//! to [0,1] relative to the image dimensions. Files are written with six
//! decimal places, the precision the training toolchain expects.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One object location in normalized center/size form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    /// Parse a single annotation line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(anyhow!(
                "expected 5 fields (class_id cx cy w h), got {}",
                fields.len()
            ));
        }
        let class_id: u32 = fields[0]
            .parse()
            .with_context(|| format!("invalid class id '{}'", fields[0]))?;
        let mut coords = [0f64; 4];
        for (slot, field) in coords.iter_mut().zip(&fields[1..]) {
            let value: f64 = field
                .parse()
                .with_context(|| format!("invalid coordinate '{}'", field))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("coordinate {} outside [0,1]", value));
            }
            *slot = value;
        }
        Ok(Self {
            class_id,
            cx: coords[0],
            cy: coords[1],
            w: coords[2],
            h: coords[3],
        })
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

/// Read every box in an annotation file. A malformed line fails the whole
/// file; callers decide whether that aborts one file or the run.
pub fn read_annotations(path: &Path) -> Result<Vec<BoundingBox>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read annotation file {}", path.display()))?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            BoundingBox::parse_line(line)
                .with_context(|| format!("{}:{}", path.display(), index + 1))
        })
        .collect()
}

/// Write boxes as annotation lines, six decimal places each.
pub fn write_annotations(path: &Path, boxes: &[BoundingBox]) -> Result<()> {
    let mut out = String::new();
    for bbox in boxes {
        out.push_str(&bbox.to_string());
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("write annotation file {}", path.display()))
}

/// Annotation path paired with an image path: same stem, `labels/` sibling
/// of `images/`, `.txt` extension.
pub fn label_path_for(image_path: &Path, label_dir: &Path) -> Option<PathBuf> {
    let stem = image_path.file_stem()?;
    Some(label_dir.join(stem).with_extension("txt"))
}
