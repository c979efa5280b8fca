// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Asset data structures.
//!
//! This module defines the tiles placed on the board: their identity,
//! source URL, geometry and per-asset media state.

use super::store::StoreError;
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Unique identity of an asset, generated when it is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media an asset displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
}

/// Tile size in board pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of a tile, relative to the board origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A submitted URL together with the media kind the probe settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsset {
    pub url: String,
    pub kind: AssetKind,
}

impl NewAsset {
    pub fn new(url: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// A tile on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    pub url: String,
    pub kind: AssetKind,
    pub name: String,
    pub size: Size,
    pub position: Position,
    pub z_index: usize,
    pub aspect_ratio: f32,
    /// Videos only accept drags while the pointer is over their title bar.
    pub draggable: bool,
    pub playing: bool,
    /// Playback position in seconds, as last committed by the player.
    pub progress: f64,
    pub duration: Option<f64>,
    pub border_disabled: bool,
    pub frame_aspect_ratio_unlocked: bool,
}

impl Asset {
    /// Build a fresh asset at the given stacking slot.
    ///
    /// Geometry stays zeroed until the media reports its natural size.
    pub fn from_new(new: NewAsset, z_index: usize) -> Result<Self, StoreError> {
        let url = new.url.trim().to_string();
        let parsed = Url::parse(&url).map_err(|e| StoreError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id: AssetId::new(),
            name: name_from_url(&parsed),
            url,
            kind: new.kind,
            size: Size::default(),
            position: Position::default(),
            z_index,
            aspect_ratio: 1.0,
            draggable: false,
            playing: false,
            progress: 0.0,
            duration: None,
            border_disabled: false,
            frame_aspect_ratio_unlocked: false,
        })
    }

    pub fn is_video(&self) -> bool {
        self.kind == AssetKind::Video
    }

    /// Whether a drag gesture on the tile body should move it.
    pub fn can_drag(&self) -> bool {
        match self.kind {
            AssetKind::Image => true,
            AssetKind::Video => self.draggable,
        }
    }

    /// A video whose committed progress reached its known duration.
    pub fn is_finished(&self) -> bool {
        match self.duration {
            Some(duration) if self.is_video() && duration > 0.0 => self.progress >= duration,
            _ => false,
        }
    }

    /// Hit test in board coordinates.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.position.x
            && y >= self.position.y
            && x <= self.position.x + self.size.width
            && y <= self.position.y + self.size.height
    }
}

/// Display name: the last path segment, or the host when the path ends in `/`.
fn name_from_url(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or_default();
    if last.is_empty() {
        url.host_str().unwrap_or_default().to_string()
    } else {
        last.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_last_path_segment() {
        let asset = Asset::from_new(
            NewAsset::new("https://example.com/media/cats/tabby.png?w=200", AssetKind::Image),
            0,
        )
        .unwrap();
        assert_eq!(asset.name, "tabby.png");
    }

    #[test]
    fn test_name_falls_back_to_host() {
        let asset =
            Asset::from_new(NewAsset::new("https://example.com/", AssetKind::Image), 0).unwrap();
        assert_eq!(asset.name, "example.com");
    }

    #[test]
    fn test_url_is_trimmed() {
        let asset = Asset::from_new(
            NewAsset::new("  https://example.com/clip.mp4 \n", AssetKind::Video),
            3,
        )
        .unwrap();
        assert_eq!(asset.url, "https://example.com/clip.mp4");
        assert_eq!(asset.z_index, 3);
        assert_eq!(asset.size, Size::default());
        assert!(!asset.playing);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = Asset::from_new(NewAsset::new("not a url", AssetKind::Image), 0).unwrap_err();
        assert!(matches!(err, StoreError::InvalidUrl { .. }));
    }

    #[test]
    fn test_video_drag_requires_flag() {
        let mut video =
            Asset::from_new(NewAsset::new("https://example.com/a.mp4", AssetKind::Video), 0)
                .unwrap();
        assert!(!video.can_drag());
        video.draggable = true;
        assert!(video.can_drag());

        let image =
            Asset::from_new(NewAsset::new("https://example.com/a.png", AssetKind::Image), 0)
                .unwrap();
        assert!(image.can_drag());
    }

    #[test]
    fn test_is_finished() {
        let mut video =
            Asset::from_new(NewAsset::new("https://example.com/a.mp4", AssetKind::Video), 0)
                .unwrap();
        assert!(!video.is_finished());
        video.duration = Some(12.0);
        video.progress = 12.0;
        assert!(video.is_finished());
        video.progress = 3.0;
        assert!(!video.is_finished());
    }
}
