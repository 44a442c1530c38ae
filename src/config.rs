//! Capture configuration.
//!
//! Layered the usual way: compiled defaults, then an optional TOML file
//! named by `PARKLOT_CONFIG`, then individual environment overrides,
//! validated after merging. The dataset tools take their paths from
//! command-line flags instead; only the camera binaries read this.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CAMERA_URL: &str = "http://192.168.1.11:4747/video";
const DEFAULT_TARGET_FPS: u32 = 10;

#[derive(Debug, Default, Deserialize)]
struct CaptureConfigFile {
    camera: Option<CameraSection>,
}

#[derive(Debug, Default, Deserialize)]
struct CameraSection {
    url: Option<String>,
    target_fps: Option<u32>,
}

/// Resolved capture configuration.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub camera_url: String,
    pub target_fps: u32,
}

impl CaptureConfig {
    pub fn load() -> Result<Self> {
        let file_cfg = match std::env::var("PARKLOT_CONFIG").ok() {
            Some(path) => read_config_file(Path::new(&path))?,
            None => CaptureConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CaptureConfigFile) -> Self {
        let camera = file.camera.unwrap_or_default();
        Self {
            camera_url: camera
                .url
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            target_fps: camera.target_fps.unwrap_or(DEFAULT_TARGET_FPS),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("PARKLOT_CAMERA_URL") {
            self.camera_url = url;
        }
        if let Ok(fps) = std::env::var("PARKLOT_TARGET_FPS") {
            self.target_fps = fps
                .parse()
                .with_context(|| format!("PARKLOT_TARGET_FPS '{}' is not an integer", fps))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.camera_url.trim().is_empty() {
            return Err(anyhow!("camera url must not be empty"));
        }
        if self.target_fps == 0 {
            return Err(anyhow!("target fps must be nonzero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<CaptureConfigFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parse config file {}", path.display()))
}
