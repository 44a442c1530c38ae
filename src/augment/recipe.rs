//! Named augmentation recipes.
//!
//! A recipe is an ordered combination of photometric transforms applied to
//! one augmented variant. The composition order is a fixed contract:
//! shadow first, then darkening, then noise, with each recipe applying its
//! own subset. Recipe names are stable because they are encoded into
//! output filenames.

use image::RgbImage;
use rand::Rng;

use super::photometric::{add_noise, adjust_brightness, apply_shadow};

/// Brightness range used inside recipes. Recipes only ever darken (night
/// and dusk conditions); the full brightening range is reserved for
/// standalone `adjust_brightness` calls.
const RECIPE_DARKEN_MIN: f64 = 0.4;
const RECIPE_DARKEN_MAX: f64 = 0.8;

/// A single photometric transform step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transform {
    Shadow,
    Darken,
    Noise,
}

/// A named, ordered combination of transform steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Recipe {
    ShadowOnly,
    DarkOnly,
    ShadowDark,
    DarkNoise,
    ShadowDarkNoise,
}

impl Recipe {
    pub const ALL: [Recipe; 5] = [
        Recipe::ShadowOnly,
        Recipe::DarkOnly,
        Recipe::ShadowDark,
        Recipe::DarkNoise,
        Recipe::ShadowDarkNoise,
    ];

    /// Stable name, used as the filename suffix of generated variants.
    pub fn name(self) -> &'static str {
        match self {
            Recipe::ShadowOnly => "shadow_only",
            Recipe::DarkOnly => "dark_only",
            Recipe::ShadowDark => "shadow_dark",
            Recipe::DarkNoise => "dark_noise",
            Recipe::ShadowDarkNoise => "shadow_dark_noise",
        }
    }

    /// The ordered transform steps this recipe applies.
    pub fn steps(self) -> &'static [Transform] {
        use Transform::*;
        match self {
            Recipe::ShadowOnly => &[Shadow],
            Recipe::DarkOnly => &[Darken],
            Recipe::ShadowDark => &[Shadow, Darken],
            Recipe::DarkNoise => &[Darken, Noise],
            Recipe::ShadowDarkNoise => &[Shadow, Darken, Noise],
        }
    }

    /// Draw one of the five recipes uniformly at random.
    pub fn choose<R: Rng>(rng: &mut R) -> Recipe {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Apply the recipe's steps in order, producing the variant image.
    pub fn apply<R: Rng>(self, image: &RgbImage, rng: &mut R) -> RgbImage {
        let mut out = image.clone();
        for step in self.steps() {
            out = match step {
                Transform::Shadow => apply_shadow(&out, rng),
                Transform::Darken => {
                    let factor = rng.gen_range(RECIPE_DARKEN_MIN..RECIPE_DARKEN_MAX);
                    adjust_brightness(&out, Some(factor), rng)
                }
                Transform::Noise => add_noise(&out, rng),
            };
        }
        out
    }
}
