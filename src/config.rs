use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, EngineError, Result};

// ── AppConfig ─────────────────────────────────────────────────────────────────

/// Application settings.  Every field has a default, so a JSON file only
/// needs the keys it changes:
///
/// ```json
/// { "title": "cats", "width": 640, "height": 480, "show_fps": false }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Image (in the images directory) used as the window icon.
    pub logo: Option<String>,
    /// Render surface width in pixels.
    pub width: u32,
    /// Render surface height in pixels.
    pub height: u32,
    /// Target ticks (and presented frames) per second.
    pub framerate: u32,
    pub show_fps: bool,
    /// Directory that holds the asset directory.  Defaults to the working directory.
    pub run_dir: Option<PathBuf>,
    pub asset_subdir: String,
    pub image_subdir: String,
    pub sound_subdir: String,
    pub font_subdir: String,
    /// Open an audio device.  Off for headless runs.
    pub audio: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "game".into(),
            logo: None,
            width: 960,
            height: 720,
            framerate: 60,
            show_fps: true,
            run_dir: None,
            asset_subdir: "assets".into(),
            image_subdir: "images".into(),
            sound_subdir: "sounds".into(),
            font_subdir: "fonts".into(),
            audio: true,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|source| EngineError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.framerate == 0 {
            return Err(ConfigError::InvalidFramerate);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize { width: self.width, height: self.height });
        }
        if let Some(dir) = &self.run_dir {
            if !dir.is_dir() {
                return Err(ConfigError::RunDirNotFound(dir.clone()));
            }
        }
        Ok(())
    }

    /// `<run_dir>/<asset_subdir>`.
    pub fn asset_dir(&self) -> PathBuf {
        let base = self.run_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        base.join(&self.asset_subdir)
    }

    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.framerate.max(1) as f64)
    }
}
