//! Contrast preprocessing for labeling and training input.
//!
//! Pipeline per image: grayscale, contrast-limited adaptive histogram
//! equalization (clip limit 2.0, 8x8 tile grid), a light denoising blur,
//! then an exact resize to the 640x640 model input size.

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use std::fs;
use std::path::Path;

use crate::files::image_files;

/// Model input edge length.
pub const OUTPUT_SIZE: u32 = 640;

const CLAHE_CLIP_LIMIT: f64 = 2.0;
const CLAHE_TILES: u32 = 8;

/// Sigma equivalent to the light 3x3 denoising kernel.
const DENOISE_SIGMA: f32 = 0.8;

/// Run the full preprocessing pipeline on one grayscale image.
pub fn preprocess_image(gray: &GrayImage) -> GrayImage {
    let enhanced = clahe(gray, CLAHE_CLIP_LIMIT, CLAHE_TILES);
    let blurred = imageops::blur(&enhanced, DENOISE_SIGMA);
    imageops::resize(&blurred, OUTPUT_SIZE, OUTPUT_SIZE, FilterType::Triangle)
}

/// Preprocess every image of a directory into `output_dir` under the same
/// filename. Unreadable images are logged and skipped. Returns the number
/// of images written.
pub fn preprocess_dir(input_dir: &Path, output_dir: &Path) -> Result<usize> {
    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;

    let mut processed = 0;
    for path in image_files(input_dir)? {
        let gray = match image::open(&path) {
            Ok(img) => img.into_luma8(),
            Err(err) => {
                log::warn!("cannot read {}: {}", path.display(), err);
                continue;
            }
        };
        let result = preprocess_image(&gray);
        let file_name = path
            .file_name()
            .with_context(|| format!("no file name in {}", path.display()))?;
        let out_path = output_dir.join(file_name);
        result
            .save(&out_path)
            .with_context(|| format!("save {}", out_path.display()))?;
        processed += 1;
    }
    Ok(processed)
}

/// Contrast-limited adaptive histogram equalization.
///
/// Each tile gets its own clipped-and-redistributed histogram mapping;
/// pixels are remapped by bilinear interpolation between the mappings of
/// the four surrounding tiles, which hides tile seams.
fn clahe(image: &GrayImage, clip_limit: f64, tiles: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let tiles_x = tiles.clamp(1, width);
    let tiles_y = tiles.clamp(1, height);
    // even integer partition; every tile is nonempty because the tile
    // count never exceeds the axis length
    let tile_w = f64::from(width) / f64::from(tiles_x);
    let tile_h = f64::from(height) / f64::from(tiles_y);

    let mut luts = vec![[0u8; 256]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * width / tiles_x;
            let y0 = ty * height / tiles_y;
            let x1 = (tx + 1) * width / tiles_x;
            let y1 = (ty + 1) * height / tiles_y;

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[image.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            let area = f64::from((x1 - x0) * (y1 - y0));
            let clip = (clip_limit * area / 256.0).max(1.0) as u32;

            // Clip each bin and hand the excess back evenly, residual
            // spread with a stride so no value range is favored.
            let mut excess = 0u32;
            for count in hist.iter_mut() {
                if *count > clip {
                    excess += *count - clip;
                    *count = clip;
                }
            }
            let bonus = excess / 256;
            let mut residual = (excess % 256) as usize;
            for count in hist.iter_mut() {
                *count += bonus;
            }
            if residual > 0 {
                let step = (256 / residual).max(1);
                let mut i = 0;
                while i < 256 && residual > 0 {
                    hist[i] += 1;
                    residual -= 1;
                    i += step;
                }
            }

            let lut = &mut luts[(ty * tiles_x + tx) as usize];
            let scale = 255.0 / area;
            let mut cdf = 0u32;
            for (value, count) in hist.iter().enumerate() {
                cdf += count;
                lut[value] = (f64::from(cdf) * scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let tiles_x = tiles_x as usize;
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = tile_axis(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx0, tx1, wx) = tile_axis(x, tile_w, tiles_x as u32);
            let value = image.get_pixel(x, y).0[0] as usize;
            let top = f64::from(luts[ty0 * tiles_x + tx0][value]) * (1.0 - wx)
                + f64::from(luts[ty0 * tiles_x + tx1][value]) * wx;
            let bottom = f64::from(luts[ty1 * tiles_x + tx0][value]) * (1.0 - wx)
                + f64::from(luts[ty1 * tiles_x + tx1][value]) * wx;
            let blended = top * (1.0 - wy) + bottom * wy;
            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// For one axis, the two neighboring tile indices and the interpolation
/// weight toward the second, measured between tile centers. Pixels before
/// the first or past the last tile center collapse to that edge tile.
fn tile_axis(coord: u32, tile_size: f64, tiles: u32) -> (usize, usize, f64) {
    let f = (f64::from(coord) + 0.5) / tile_size - 0.5;
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let base = f.floor() as usize;
    let last = tiles as usize - 1;
    if base >= last {
        return (last, last, 0.0);
    }
    (base, base + 1, f - base as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_model_input_size() {
        let gray = GrayImage::from_fn(123, 77, |x, y| Luma([((x + y) % 256) as u8]));
        let out = preprocess_image(&gray);
        assert_eq!(out.dimensions(), (OUTPUT_SIZE, OUTPUT_SIZE));
    }

    #[test]
    fn clahe_keeps_uniform_image_near_its_level() {
        let gray = GrayImage::from_pixel(320, 320, Luma([128]));
        let out = clahe(&gray, CLAHE_CLIP_LIMIT, CLAHE_TILES);
        for pixel in out.pixels() {
            let v = i32::from(pixel.0[0]);
            assert!((v - 128).abs() <= 8, "uniform level drifted to {}", v);
        }
    }

    #[test]
    fn clahe_does_not_shrink_contrast() {
        let gray = GrayImage::from_fn(320, 320, |x, _| Luma([(100 + x * 56 / 320) as u8]));
        let out = clahe(&gray, CLAHE_CLIP_LIMIT, CLAHE_TILES);
        let (mut lo, mut hi) = (255u8, 0u8);
        for pixel in out.pixels() {
            lo = lo.min(pixel.0[0]);
            hi = hi.max(pixel.0[0]);
        }
        assert!(hi - lo >= 56, "contrast shrank to {}..{}", lo, hi);
    }

    #[test]
    fn tile_axis_clamps_at_edges() {
        assert_eq!(tile_axis(0, 40.0, 8), (0, 0, 0.0));
        let (lo, hi, w) = tile_axis(60, 40.0, 8);
        assert_eq!((lo, hi), (1, 2));
        assert!(w > 0.0 && w < 1.0);
        assert_eq!(tile_axis(319, 40.0, 8), (7, 7, 0.0));
    }
}
