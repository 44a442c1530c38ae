//! Photometric transforms.
//!
//! Every transform returns a new image with the same dimensions as its
//! input and all channel values clamped to [0, 255]. Nothing here moves
//! pixels, so annotation geometry is unaffected.

use image::{imageops, ImageBuffer, Luma, RgbImage};
use rand::Rng;
use rand_distr::StandardNormal;

/// Darkening factor range shared by all shadow shapes.
const SHADOW_FACTOR_MIN: f32 = 0.3;
const SHADOW_FACTOR_MAX: f32 = 0.6;

/// Mask blur sigma, equivalent to the fixed 21x21 smoothing kernel the
/// masks were tuned against.
const SHADOW_BLUR_SIGMA: f32 = 3.5;

/// Brightness factor range when no explicit factor is given.
const BRIGHTNESS_MIN: f64 = 0.4;
const BRIGHTNESS_MAX: f64 = 1.5;

/// Noise standard deviation is drawn from this integer range per call.
const NOISE_SIGMA_MIN: u32 = 10;
const NOISE_SIGMA_MAX: u32 = 25;

type ShadowMask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Darken a random region of the image with a soft-edged shadow.
///
/// One of four shapes is chosen uniformly at random: a vertical band (a
/// pole or tree), a horizontal band (a roof line), a diagonal
/// quadrilateral (low sun), or 1-3 circular blobs (clouds, passers-by).
/// The affected region of a unit mask is set to a factor in [0.3, 0.6],
/// the mask is blurred so the shadow edge is smooth, and the image is
/// multiplied by the mask.
pub fn apply_shadow<R: Rng>(image: &RgbImage, rng: &mut R) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut mask: ShadowMask = ImageBuffer::from_pixel(width, height, Luma([1.0]));

    match rng.gen_range(0..4u8) {
        0 => vertical_band(&mut mask, rng),
        1 => horizontal_band(&mut mask, rng),
        2 => diagonal_quad(&mut mask, rng),
        _ => circular_blobs(&mut mask, rng),
    }

    let mask = imageops::blur(&mask, SHADOW_BLUR_SIGMA);

    let mut out = image.clone();
    for (pixel, shade) in out.pixels_mut().zip(mask.pixels()) {
        let shade = shade.0[0];
        for channel in pixel.0.iter_mut() {
            *channel = (f32::from(*channel) * shade).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn shadow_factor<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(SHADOW_FACTOR_MIN..SHADOW_FACTOR_MAX)
}

fn vertical_band<R: Rng>(mask: &mut ShadowMask, rng: &mut R) {
    let (width, height) = mask.dimensions();
    let factor = shadow_factor(rng);
    let band = rng.gen_range(width / 8..=width / 3);
    let start = rng.gen_range(0..=width - band);
    for y in 0..height {
        for x in start..start + band {
            mask.put_pixel(x, y, Luma([factor]));
        }
    }
}

fn horizontal_band<R: Rng>(mask: &mut ShadowMask, rng: &mut R) {
    let (width, height) = mask.dimensions();
    let factor = shadow_factor(rng);
    let band = rng.gen_range(height / 8..=height / 2);
    let start = rng.gen_range(0..=height - band);
    for y in start..start + band {
        for x in 0..width {
            mask.put_pixel(x, y, Luma([factor]));
        }
    }
}

/// Quadrilateral spanning the full image height, with both top corners in
/// the left/right halves of the top edge and both bottom corners likewise.
/// Filled row by row between the interpolated left and right edges.
fn diagonal_quad<R: Rng>(mask: &mut ShadowMask, rng: &mut R) {
    let (width, height) = mask.dimensions();
    let factor = shadow_factor(rng);
    let top_left = rng.gen_range(0..=width / 2) as f32;
    let top_right = rng.gen_range(width / 2..=width) as f32;
    let bottom_right = rng.gen_range(width / 2..=width) as f32;
    let bottom_left = rng.gen_range(0..=width / 2) as f32;

    for y in 0..height {
        let t = if height > 1 {
            y as f32 / (height - 1) as f32
        } else {
            0.0
        };
        let left = top_left + (bottom_left - top_left) * t;
        let right = top_right + (bottom_right - top_right) * t;
        let left = left.round().max(0.0) as u32;
        let right = (right.round() as u32).min(width);
        for x in left..right {
            mask.put_pixel(x, y, Luma([factor]));
        }
    }
}

fn circular_blobs<R: Rng>(mask: &mut ShadowMask, rng: &mut R) {
    let (width, height) = mask.dimensions();
    let min_dim = width.min(height);
    let blobs = rng.gen_range(1..=3);
    for _ in 0..blobs {
        let factor = shadow_factor(rng);
        let cx = rng.gen_range(0..width) as i64;
        let cy = rng.gen_range(0..height) as i64;
        let radius = rng.gen_range(min_dim / 8..=min_dim / 3).max(1) as i64;

        let y_lo = (cy - radius).max(0) as u32;
        let y_hi = ((cy + radius).min(height as i64 - 1)) as u32;
        let x_lo = (cx - radius).max(0) as u32;
        let x_hi = ((cx + radius).min(width as i64 - 1)) as u32;
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let dx = x as i64 - cx;
                let dy = y as i64 - cy;
                if dx * dx + dy * dy <= radius * radius {
                    mask.put_pixel(x, y, Luma([factor]));
                }
            }
        }
    }
}

/// Scale brightness without touching hue or saturation.
///
/// Works on the HSV value channel: scaling V multiplies every RGB channel
/// of a pixel by the same ratio, which leaves the channel ratios (hue,
/// saturation) intact even when the brightest channel clamps at 255.
/// With `factor` of `None` the factor is sampled uniformly from
/// [0.4, 1.5]. A factor of exactly 1.0 is a pixel-for-pixel identity.
pub fn adjust_brightness<R: Rng>(
    image: &RgbImage,
    factor: Option<f64>,
    rng: &mut R,
) -> RgbImage {
    let factor = factor.unwrap_or_else(|| rng.gen_range(BRIGHTNESS_MIN..BRIGHTNESS_MAX));
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = pixel.0.iter().copied().max().unwrap_or(0);
        if value == 0 {
            continue;
        }
        let scaled = (f64::from(value) * factor).round().clamp(0.0, 255.0);
        let ratio = scaled / f64::from(value);
        for channel in pixel.0.iter_mut() {
            *channel = (f64::from(*channel) * ratio).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Add zero-mean Gaussian sensor noise, independently per channel.
/// The standard deviation is drawn once per call from [10, 25].
pub fn add_noise<R: Rng>(image: &RgbImage, rng: &mut R) -> RgbImage {
    let sigma = f64::from(rng.gen_range(NOISE_SIGMA_MIN..=NOISE_SIGMA_MAX));
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let noise: f64 = rng.sample::<f64, _>(StandardNormal) * sigma;
            *channel = (f64::from(*channel) + noise).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 7 % 256) as u8,
                (y * 11 % 256) as u8,
                ((x + y) * 3 % 256) as u8,
            ])
        })
    }

    #[test]
    fn brightness_factor_one_is_identity() {
        let image = gradient_image(64, 48);
        let mut rng = StdRng::seed_from_u64(7);
        let out = adjust_brightness(&image, Some(1.0), &mut rng);
        assert_eq!(out, image);
    }

    #[test]
    fn brightness_halves_uniform_gray() {
        let image = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        let mut rng = StdRng::seed_from_u64(7);
        let out = adjust_brightness(&image, Some(0.5), &mut rng);
        assert_eq!(out.dimensions(), (100, 100));
        for pixel in out.pixels() {
            for &channel in pixel.0.iter() {
                assert!((63..=65).contains(&channel), "channel {}", channel);
            }
        }
    }

    #[test]
    fn brightness_preserves_channel_ratios() {
        let image = RgbImage::from_pixel(4, 4, Rgb([200, 100, 50]));
        let mut rng = StdRng::seed_from_u64(7);
        let out = adjust_brightness(&image, Some(0.5), &mut rng);
        let pixel = out.get_pixel(0, 0);
        assert_eq!(pixel.0, [100, 50, 25]);
    }

    #[test]
    fn transforms_preserve_dimensions() {
        let image = gradient_image(61, 37);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(apply_shadow(&image, &mut rng).dimensions(), (61, 37));
        assert_eq!(
            adjust_brightness(&image, None, &mut rng).dimensions(),
            (61, 37)
        );
        assert_eq!(add_noise(&image, &mut rng).dimensions(), (61, 37));
    }

    #[test]
    fn shadow_never_brightens() {
        let image = gradient_image(80, 60);
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let shadowed = apply_shadow(&image, &mut rng);
            for (original, out) in image.pixels().zip(shadowed.pixels()) {
                for (a, b) in original.0.iter().zip(out.0.iter()) {
                    // one count of rounding slack
                    assert!(*b <= a.saturating_add(1));
                }
            }
        }
    }

    #[test]
    fn noise_stays_in_range_at_extremes() {
        let white = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
        let black = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
        let mut rng = StdRng::seed_from_u64(3);
        // clamped u8 output cannot overflow; this asserts the noise really
        // perturbs rather than saturating everything
        let noisy_white = add_noise(&white, &mut rng);
        let noisy_black = add_noise(&black, &mut rng);
        assert!(noisy_white.pixels().any(|p| p.0.iter().any(|&c| c < 255)));
        assert!(noisy_black.pixels().any(|p| p.0.iter().any(|&c| c > 0)));
    }
}
