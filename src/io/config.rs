// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Board configuration.
//!
//! Settings are read from YAML or JSON depending on the file extension.
//! The file is looked up through `MEDIABOARD_CONFIG`, then
//! `mediaboard.yaml` in the working directory; without either the
//! defaults apply. Missing fields fall back to their defaults.

use crate::models::store::TileLayout;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "MEDIABOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "mediaboard.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Tile width for images once their natural size is known.
    pub image_base_width: f32,
    /// Tile width for videos once their natural size is known.
    pub video_base_width: f32,
    /// Seconds between progress commits while a video plays.
    pub progress_sample_secs: f64,
    /// Seconds of pointer inactivity before video controls hide.
    pub controls_hide_secs: f64,
    pub probe_timeout_secs: u64,
    pub max_probe_bytes: u64,
    /// Frame size reported for videos when no video backend can read it.
    pub fallback_video_size: [u32; 2],
    pub window_size: [f32; 2],
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            image_base_width: 400.0,
            video_base_width: 640.0,
            progress_sample_secs: 1.0,
            controls_hide_secs: 1.5,
            probe_timeout_secs: 10,
            max_probe_bytes: 50 * 1024 * 1024,
            fallback_video_size: [1280, 720],
            window_size: [1280.0, 720.0],
        }
    }
}

impl BoardConfig {
    pub fn tile_layout(&self) -> TileLayout {
        TileLayout {
            image_base_width: self.image_base_width,
            video_base_width: self.video_base_width,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        for (name, width) in [
            ("image_base_width", self.image_base_width),
            ("video_base_width", self.video_base_width),
        ] {
            if !(width.is_finite() && width > 0.0) {
                bail!("{} must be positive, got {}", name, width);
            }
        }
        if !self.progress_sample_secs.is_finite() || self.progress_sample_secs <= 0.0 {
            bail!("progress_sample_secs must be positive");
        }
        if self.controls_hide_secs < 0.0 {
            bail!("controls_hide_secs must not be negative");
        }
        if self.fallback_video_size.contains(&0) {
            bail!("fallback_video_size must not contain zero");
        }
        if self.max_probe_bytes == 0 {
            bail!("max_probe_bytes must be positive");
        }
        Ok(())
    }
}

/// Import configuration from YAML format.
pub fn import_yaml(path: &Path) -> Result<BoardConfig> {
    let yaml = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&yaml)?;
    Ok(config)
}

/// Import configuration from JSON format.
pub fn import_json(path: &Path) -> Result<BoardConfig> {
    let json = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&json)?;
    Ok(config)
}

/// Load and validate a configuration file, picking the format from its extension.
pub fn load_file(path: &Path) -> Result<BoardConfig> {
    let extension = path.extension().and_then(|s| s.to_str());
    let config = match extension {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        _ => bail!("Unsupported config extension: {:?}", extension),
    }
    .with_context(|| format!("failed to read config {}", path.display()))?;

    config.validate()?;
    Ok(config)
}

/// Resolve the config path from the environment or the working directory.
fn resolve_path(env_value: Option<String>, cwd: &Path) -> Option<PathBuf> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(value));
    }
    let candidate = cwd.join(DEFAULT_CONFIG_FILE);
    candidate.exists().then_some(candidate)
}

/// Load the board configuration, falling back to defaults when no file is found.
pub fn load() -> Result<BoardConfig> {
    let cwd = std::env::current_dir().unwrap_or_default();
    match resolve_path(std::env::var(CONFIG_ENV).ok(), &cwd) {
        Some(path) => {
            let config = load_file(&path)?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => {
            log::debug!("No config file, using defaults");
            Ok(BoardConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.yaml");
        std::fs::write(&path, "image_base_width: 320\nfallback_video_size: [640, 360]\n").unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(config.image_base_width, 320.0);
        assert_eq!(config.fallback_video_size, [640, 360]);
        assert_eq!(config.video_base_width, 640.0);
        assert_eq!(config.tile_layout().image_base_width, 320.0);
    }

    #[test]
    fn test_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        std::fs::write(&path, r#"{ "video_base_width": 500, "probe_timeout_secs": 3 }"#).unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(config.video_base_width, 500.0);
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.yml");
        std::fs::write(&path, "image_base_width: 0\n").unwrap();
        assert!(load_file(&path).is_err());

        std::fs::write(&path, "fallback_video_size: [0, 720]\n").unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.toml");
        std::fs::write(&path, "").unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_resolve_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_path(None, dir.path()), None);
        assert_eq!(resolve_path(Some("  ".into()), dir.path()), None);
        assert_eq!(
            resolve_path(Some("/etc/board.json".into()), dir.path()),
            Some(PathBuf::from("/etc/board.json"))
        );

        let default = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&default, "{}").unwrap();
        assert_eq!(resolve_path(None, dir.path()), Some(default));
    }
}
