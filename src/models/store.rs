// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Board state store.
//!
//! The store owns every asset on the board and is the only place their
//! geometry, stacking order and media state are mutated. Stacking order is
//! kept dense: with `n` assets the z-indices are exactly `0..n`, whatever
//! sequence of adds, removals and reorders produced them.

use super::asset::{Asset, AssetId, AssetKind, NewAsset, Position, Size};

/// Errors returned by store mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("no asset with id {0}")]
    UnknownAsset(AssetId),
    #[error("asset already uploaded: {0}")]
    AlreadyAdded(String),
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid size {width}x{height}")]
    InvalidSize { width: f32, height: f32 },
    #[error("invalid position ({x}, {y})")]
    InvalidPosition { x: f32, y: f32 },
    #[error("invalid natural dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("asset {0} is not a video")]
    NotPlayable(AssetId),
}

/// Base tile widths applied when media reports its natural size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    pub image_base_width: f32,
    pub video_base_width: f32,
}

impl Default for TileLayout {
    fn default() -> Self {
        Self {
            image_base_width: 400.0,
            video_base_width: 640.0,
        }
    }
}

impl TileLayout {
    fn base_width(&self, kind: AssetKind) -> f32 {
        match kind {
            AssetKind::Image => self.image_base_width,
            AssetKind::Video => self.video_base_width,
        }
    }
}

/// In-memory collection of board assets, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: Vec<Asset>,
    layout: TileLayout,
}

impl AssetStore {
    pub fn new(layout: TileLayout) -> Self {
        Self {
            assets: Vec::new(),
            layout,
        }
    }

    /// Assets in insertion order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn get_by_url(&self, url: &str) -> Option<&Asset> {
        let url = url.trim();
        self.assets.iter().find(|a| a.url == url)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.get_by_url(url).is_some()
    }

    pub fn has_videos(&self) -> bool {
        self.assets.iter().any(Asset::is_video)
    }

    /// Assets from bottom to top.
    pub fn stacking_order(&self) -> Vec<&Asset> {
        let mut ordered: Vec<&Asset> = self.assets.iter().collect();
        ordered.sort_by_key(|a| a.z_index);
        ordered
    }

    /// The highest asset under a board point.
    pub fn topmost_at(&self, x: f32, y: f32) -> Option<&Asset> {
        self.assets
            .iter()
            .filter(|a| a.contains(x, y))
            .max_by_key(|a| a.z_index)
    }

    /// Add an asset on top of the stack. Duplicate URLs leave the store untouched.
    pub fn add_asset(&mut self, new: NewAsset) -> Result<AssetId, StoreError> {
        if let Some(existing) = self.get_by_url(&new.url) {
            return Err(StoreError::AlreadyAdded(existing.url.clone()));
        }

        let asset = Asset::from_new(new, self.assets.len())?;
        let id = asset.id;
        log::info!(
            "Added {:?} asset '{}' ({}), total: {}",
            asset.kind,
            asset.name,
            id,
            self.assets.len() + 1
        );
        self.assets.push(asset);
        self.debug_check_stacking();
        Ok(id)
    }

    pub fn remove(&mut self, id: AssetId) -> Result<Asset, StoreError> {
        let idx = self.index_of(id)?;
        let removed = self.assets.remove(idx);
        self.compact_after_removal(removed.z_index);
        log::info!("Removed asset '{}', total: {}", removed.name, self.assets.len());
        Ok(removed)
    }

    pub fn remove_by_url(&mut self, url: &str) -> Option<Asset> {
        let id = self.get_by_url(url)?.id;
        self.remove(id).ok()
    }

    pub fn set_size(&mut self, id: AssetId, width: f32, height: f32) -> Result<(), StoreError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(StoreError::InvalidSize { width, height });
        }
        self.get_mut(id)?.size = Size::new(width, height);
        Ok(())
    }

    pub fn set_position(&mut self, id: AssetId, x: f32, y: f32) -> Result<(), StoreError> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(StoreError::InvalidPosition { x, y });
        }
        self.get_mut(id)?.position = Position::new(x, y);
        Ok(())
    }

    pub fn set_aspect_ratio(&mut self, id: AssetId, aspect_ratio: f32) -> Result<(), StoreError> {
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(StoreError::InvalidSize {
                width: aspect_ratio,
                height: 1.0,
            });
        }
        self.get_mut(id)?.aspect_ratio = aspect_ratio;
        Ok(())
    }

    /// Size a tile from the natural dimensions its media reported.
    pub fn apply_media_ready(
        &mut self,
        id: AssetId,
        natural_width: u32,
        natural_height: u32,
        duration: Option<f64>,
    ) -> Result<(), StoreError> {
        if natural_width == 0 || natural_height == 0 {
            return Err(StoreError::InvalidDimensions {
                width: natural_width,
                height: natural_height,
            });
        }

        let aspect_ratio = natural_width as f32 / natural_height as f32;
        let kind = self.get(id).ok_or(StoreError::UnknownAsset(id))?.kind;
        let base_width = self.layout.base_width(kind);

        self.set_aspect_ratio(id, aspect_ratio)?;
        self.set_size(id, base_width, base_width / aspect_ratio)?;
        if kind == AssetKind::Video {
            if let Some(duration) = duration {
                self.set_duration(id, duration)?;
            }
        }
        log::debug!(
            "Media ready for {}: {}x{}, tile width {:.0}",
            id,
            natural_width,
            natural_height,
            base_width
        );
        Ok(())
    }

    /// Move an asset to the top of the stack and close the gap it leaves.
    pub fn bring_to_front(&mut self, id: AssetId) -> Result<(), StoreError> {
        let current = self.get(id).ok_or(StoreError::UnknownAsset(id))?.z_index;
        let top = self.assets.len() - 1;
        if current == top {
            return Ok(());
        }

        for asset in &mut self.assets {
            if asset.z_index > current {
                asset.z_index -= 1;
            } else if asset.z_index == current {
                asset.z_index = top;
            }
        }
        self.debug_check_stacking();
        Ok(())
    }

    pub fn set_duration(&mut self, id: AssetId, duration: f64) -> Result<(), StoreError> {
        let asset = self.get_mut(id)?;
        asset.duration = Some(duration).filter(|d| d.is_finite() && *d > 0.0);
        Ok(())
    }

    pub fn set_progress(&mut self, id: AssetId, progress: f64) -> Result<(), StoreError> {
        let asset = self.get_mut(id)?;
        let progress = if progress.is_finite() { progress.max(0.0) } else { 0.0 };
        asset.progress = match asset.duration {
            Some(duration) => progress.min(duration),
            None => progress,
        };
        Ok(())
    }

    /// Flip play/pause. A finished video restarts from the beginning.
    pub fn toggle_play(&mut self, id: AssetId) -> Result<(), StoreError> {
        let asset = self.video_mut(id)?;
        if asset.is_finished() {
            asset.progress = 0.0;
            asset.playing = true;
        } else {
            asset.playing = !asset.playing;
        }
        Ok(())
    }

    pub fn play(&mut self, id: AssetId) -> Result<(), StoreError> {
        self.video_mut(id)?.playing = true;
        Ok(())
    }

    pub fn pause(&mut self, id: AssetId) -> Result<(), StoreError> {
        self.video_mut(id)?.playing = false;
        Ok(())
    }

    pub fn play_all(&mut self) {
        self.set_all_playing(true);
    }

    pub fn pause_all(&mut self) {
        self.set_all_playing(false);
    }

    pub fn set_draggable(&mut self, id: AssetId, draggable: bool) -> Result<(), StoreError> {
        self.get_mut(id)?.draggable = draggable;
        Ok(())
    }

    pub fn toggle_border(&mut self, id: AssetId) -> Result<(), StoreError> {
        let asset = self.get_mut(id)?;
        asset.border_disabled = !asset.border_disabled;
        Ok(())
    }

    pub fn toggle_aspect_lock(&mut self, id: AssetId) -> Result<(), StoreError> {
        let asset = self.get_mut(id)?;
        asset.frame_aspect_ratio_unlocked = !asset.frame_aspect_ratio_unlocked;
        Ok(())
    }

    fn set_all_playing(&mut self, playing: bool) {
        for asset in self.assets.iter_mut().filter(|a| a.is_video()) {
            asset.playing = playing;
        }
    }

    fn index_of(&self, id: AssetId) -> Result<usize, StoreError> {
        self.assets
            .iter()
            .position(|a| a.id == id)
            .ok_or(StoreError::UnknownAsset(id))
    }

    fn get_mut(&mut self, id: AssetId) -> Result<&mut Asset, StoreError> {
        self.assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::UnknownAsset(id))
    }

    fn video_mut(&mut self, id: AssetId) -> Result<&mut Asset, StoreError> {
        let asset = self.get_mut(id)?;
        if !asset.is_video() {
            return Err(StoreError::NotPlayable(id));
        }
        Ok(asset)
    }

    fn compact_after_removal(&mut self, removed_z: usize) {
        for asset in &mut self.assets {
            if asset.z_index > removed_z {
                asset.z_index -= 1;
            }
        }
        self.debug_check_stacking();
    }

    fn debug_check_stacking(&self) {
        debug_assert!(
            stacking_is_dense(&self.assets),
            "z-indices must be exactly 0..{}",
            self.assets.len()
        );
    }
}

/// True when the z-indices are a permutation of `0..assets.len()`.
fn stacking_is_dense(assets: &[Asset]) -> bool {
    let mut seen = vec![false; assets.len()];
    for asset in assets {
        match seen.get_mut(asset.z_index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(urls: &[(&str, AssetKind)]) -> (AssetStore, Vec<AssetId>) {
        let mut store = AssetStore::new(TileLayout::default());
        let ids = urls
            .iter()
            .map(|(url, kind)| store.add_asset(NewAsset::new(*url, *kind)).unwrap())
            .collect();
        (store, ids)
    }

    fn z_of(store: &AssetStore, id: AssetId) -> usize {
        store.get(id).unwrap().z_index
    }

    const A: (&str, AssetKind) = ("https://example.com/a.png", AssetKind::Image);
    const B: (&str, AssetKind) = ("https://example.com/b.mp4", AssetKind::Video);
    const C: (&str, AssetKind) = ("https://example.com/c.jpg", AssetKind::Image);
    const D: (&str, AssetKind) = ("https://example.com/d.webm", AssetKind::Video);

    #[test]
    fn test_add_assigns_next_z_index() {
        let (store, ids) = store_with(&[A, B, C]);
        assert_eq!(store.len(), 3);
        assert_eq!(z_of(&store, ids[0]), 0);
        assert_eq!(z_of(&store, ids[1]), 1);
        assert_eq!(z_of(&store, ids[2]), 2);
        assert!(stacking_is_dense(store.assets()));
    }

    #[test]
    fn test_duplicate_url_is_noop() {
        let (mut store, ids) = store_with(&[A, B]);
        let before = store.assets().to_vec();

        let err = store
            .add_asset(NewAsset::new(" https://example.com/a.png ", AssetKind::Image))
            .unwrap_err();
        assert_eq!(err, StoreError::AlreadyAdded(A.0.to_string()));
        assert_eq!(store.assets(), before.as_slice());
        assert_eq!(store.get_by_url(A.0).unwrap().id, ids[0]);
    }

    #[test]
    fn test_invalid_url_does_not_add() {
        let (mut store, _) = store_with(&[A]);
        assert!(store
            .add_asset(NewAsset::new("::nope::", AssetKind::Image))
            .is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bring_to_front_compacts_others() {
        let (mut store, ids) = store_with(&[A, B, C, D]);
        store.bring_to_front(ids[1]).unwrap();

        assert_eq!(z_of(&store, ids[0]), 0);
        assert_eq!(z_of(&store, ids[2]), 1);
        assert_eq!(z_of(&store, ids[3]), 2);
        assert_eq!(z_of(&store, ids[1]), 3);
        assert!(stacking_is_dense(store.assets()));

        let order: Vec<AssetId> = store.stacking_order().iter().map(|a| a.id).collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[3], ids[1]]);
    }

    #[test]
    fn test_bring_topmost_to_front_is_stable() {
        let (mut store, ids) = store_with(&[A, B, C]);
        let before = store.assets().to_vec();
        store.bring_to_front(ids[2]).unwrap();
        assert_eq!(store.assets(), before.as_slice());
    }

    #[test]
    fn test_bring_unknown_to_front_errors() {
        let (mut store, _) = store_with(&[A]);
        let stranger = AssetId::new();
        assert_eq!(
            store.bring_to_front(stranger),
            Err(StoreError::UnknownAsset(stranger))
        );
    }

    #[test]
    fn test_remove_compacts_z_indices() {
        let (mut store, ids) = store_with(&[A, B, C, D]);
        store.bring_to_front(ids[0]).unwrap();
        // Stack is now B=0, C=1, D=2, A=3.
        let removed = store.remove(ids[2]).unwrap();
        assert_eq!(removed.url, C.0);

        assert_eq!(store.len(), 3);
        assert_eq!(z_of(&store, ids[1]), 0);
        assert_eq!(z_of(&store, ids[3]), 1);
        assert_eq!(z_of(&store, ids[0]), 2);
        assert!(stacking_is_dense(store.assets()));
    }

    #[test]
    fn test_remove_by_url_trims() {
        let (mut store, ids) = store_with(&[A, B]);
        let removed = store.remove_by_url("  https://example.com/a.png\t").unwrap();
        assert_eq!(removed.id, ids[0]);
        assert_eq!(z_of(&store, ids[1]), 0);
        assert!(store.remove_by_url(A.0).is_none());
    }

    #[test]
    fn test_readd_after_remove_goes_on_top() {
        let (mut store, ids) = store_with(&[A, B, C]);
        store.remove(ids[0]).unwrap();
        let again = store.add_asset(NewAsset::new(A.0, A.1)).unwrap();
        assert_ne!(again, ids[0]);
        assert_eq!(z_of(&store, again), 2);
        assert!(stacking_is_dense(store.assets()));
    }

    #[test]
    fn test_dense_after_mixed_operations() {
        let (mut store, mut ids) = store_with(&[A, B, C, D]);
        store.bring_to_front(ids[0]).unwrap();
        store.remove(ids[3]).unwrap();
        ids.remove(3);
        store.bring_to_front(ids[1]).unwrap();
        let e = store
            .add_asset(NewAsset::new("https://example.com/e.gif", AssetKind::Image))
            .unwrap();
        store.bring_to_front(ids[2]).unwrap();
        store.remove(ids[0]).unwrap();

        assert!(stacking_is_dense(store.assets()));
        let order: Vec<AssetId> = store.stacking_order().iter().map(|a| a.id).collect();
        assert_eq!(order, vec![ids[1], e, ids[2]]);
    }

    #[test]
    fn test_media_ready_sizes_from_base_width() {
        let layout = TileLayout {
            image_base_width: 300.0,
            video_base_width: 600.0,
        };
        let mut store = AssetStore::new(layout);
        let image = store.add_asset(NewAsset::new(A.0, A.1)).unwrap();
        let video = store.add_asset(NewAsset::new(B.0, B.1)).unwrap();

        store.apply_media_ready(image, 1200, 800, None).unwrap();
        let a = store.get(image).unwrap();
        assert!((a.aspect_ratio - 1.5).abs() < 1e-6);
        assert_eq!(a.size, Size::new(300.0, 200.0));
        assert_eq!(a.duration, None);

        store.apply_media_ready(video, 1920, 1080, Some(42.5)).unwrap();
        let v = store.get(video).unwrap();
        assert!((v.size.width - 600.0).abs() < 1e-4);
        assert!((v.size.height - 337.5).abs() < 1e-3);
        assert_eq!(v.duration, Some(42.5));
    }

    #[test]
    fn test_media_ready_rejects_zero_dimensions() {
        let (mut store, ids) = store_with(&[A]);
        assert_eq!(
            store.apply_media_ready(ids[0], 0, 100, None),
            Err(StoreError::InvalidDimensions {
                width: 0,
                height: 100
            })
        );
    }

    #[test]
    fn test_size_and_position_validation() {
        let (mut store, ids) = store_with(&[A]);
        store.set_size(ids[0], 120.0, 80.0).unwrap();
        store.set_position(ids[0], -10.0, 25.5).unwrap();
        let a = store.get(ids[0]).unwrap();
        assert_eq!(a.size, Size::new(120.0, 80.0));
        assert_eq!(a.position, Position::new(-10.0, 25.5));

        assert!(store.set_size(ids[0], 0.0, 80.0).is_err());
        assert!(store.set_size(ids[0], f32::NAN, 80.0).is_err());
        assert!(store.set_position(ids[0], f32::INFINITY, 0.0).is_err());
        assert_eq!(store.get(ids[0]).unwrap().size, Size::new(120.0, 80.0));
    }

    #[test]
    fn test_playback_rejects_images() {
        let (mut store, ids) = store_with(&[A, B]);
        assert_eq!(store.play(ids[0]), Err(StoreError::NotPlayable(ids[0])));
        store.toggle_play(ids[1]).unwrap();
        assert!(store.get(ids[1]).unwrap().playing);
        store.toggle_play(ids[1]).unwrap();
        assert!(!store.get(ids[1]).unwrap().playing);
    }

    #[test]
    fn test_toggle_finished_video_restarts() {
        let (mut store, ids) = store_with(&[B]);
        store.set_duration(ids[0], 10.0).unwrap();
        store.set_progress(ids[0], 25.0).unwrap();
        assert_eq!(store.get(ids[0]).unwrap().progress, 10.0);

        store.toggle_play(ids[0]).unwrap();
        let v = store.get(ids[0]).unwrap();
        assert!(v.playing);
        assert_eq!(v.progress, 0.0);
    }

    #[test]
    fn test_play_all_and_pause_all_touch_only_videos() {
        let (mut store, ids) = store_with(&[A, B, C, D]);
        store.play_all();
        assert!(!store.get(ids[0]).unwrap().playing);
        assert!(store.get(ids[1]).unwrap().playing);
        assert!(store.get(ids[3]).unwrap().playing);

        store.pause_all();
        assert!(store.assets().iter().all(|a| !a.playing));
    }

    #[test]
    fn test_flags_toggle() {
        let (mut store, ids) = store_with(&[B]);
        store.set_draggable(ids[0], true).unwrap();
        store.toggle_border(ids[0]).unwrap();
        store.toggle_aspect_lock(ids[0]).unwrap();
        let v = store.get(ids[0]).unwrap();
        assert!(v.draggable && v.border_disabled && v.frame_aspect_ratio_unlocked);
    }

    #[test]
    fn test_topmost_at_prefers_highest() {
        let (mut store, ids) = store_with(&[A, C]);
        for id in &ids {
            store.set_size(*id, 100.0, 100.0).unwrap();
        }
        store.set_position(ids[1], 50.0, 50.0).unwrap();

        assert_eq!(store.topmost_at(75.0, 75.0).unwrap().id, ids[1]);
        store.bring_to_front(ids[0]).unwrap();
        assert_eq!(store.topmost_at(75.0, 75.0).unwrap().id, ids[0]);
        assert_eq!(store.topmost_at(140.0, 140.0).unwrap().id, ids[1]);
        assert!(store.topmost_at(500.0, 500.0).is_none());
    }
}
