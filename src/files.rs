//! Shared filesystem helpers for the dataset tools.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Extensions the dataset convention admits as images.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// List the image files of a directory, sorted by name so runs are
/// reproducible. Non-image entries are ignored.
pub fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("list images in {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read directory entry in {}", dir.display()))?
            .path();
        if path.is_file() && is_image_path(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_extension_case_insensitively() {
        assert!(is_image_path(Path::new("a/lot_001.jpg")));
        assert!(is_image_path(Path::new("a/lot_001.JPG")));
        assert!(is_image_path(Path::new("a/lot_001.jpeg")));
        assert!(is_image_path(Path::new("a/lot_001.png")));
        assert!(!is_image_path(Path::new("a/lot_001.txt")));
        assert!(!is_image_path(Path::new("a/lot_001")));
    }
}
