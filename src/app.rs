// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module owns the asset store and everything around it that only
//! lives for the session: textures, playback sessions, the gesture in
//! progress and background loads. UI components return actions; this
//! module applies them to the store.

use crate::io::config::BoardConfig;
use crate::io::loader::{self, LoadEvent, LoadTicket};
use crate::io::media::{self, LoadedImage, MediaProbe, VideoBackend};
use crate::models::{
    asset::{AssetId, AssetKind, NewAsset, Size},
    playback::{PlaybackSession, Tick},
    store::{AssetStore, StoreError},
};
use crate::ui::{
    canvas::{self, CanvasAction, Gesture, GestureKind},
    sidebar::{self, SidebarAction},
    url_input::{self, UrlInputAction, UrlInputState},
    video_controls::VideoControlAction,
};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Main application state.
pub struct BoardApp {
    config: BoardConfig,

    /// Every asset on the board
    store: AssetStore,

    /// URL field contents and error message
    input: UrlInputState,

    /// Image textures, keyed by asset
    textures: HashMap<AssetId, egui::TextureHandle>,

    /// Local playback state for each video
    sessions: HashMap<AssetId, PlaybackSession>,

    /// Drag or resize in progress
    gesture: Option<Gesture>,

    /// Board size as of the last frame
    bounds: Size,

    /// Video shown fullscreen, if any
    fullscreen: Option<AssetId>,

    /// Viewport fullscreen change to send on the next frame
    pending_viewport: Option<bool>,

    /// URLs submitted but not yet probed
    in_flight: HashMap<String, LoadTicket>,

    /// Submission each asset was added by
    tickets: HashMap<AssetId, LoadTicket>,

    next_ticket: u64,
    load_sender: Sender<(LoadTicket, LoadEvent)>,
    load_receiver: Receiver<(LoadTicket, LoadEvent)>,
    probe: Arc<dyn MediaProbe>,
    video_backend: Arc<dyn VideoBackend>,
}

impl BoardApp {
    /// Create a new board application with the default media backends.
    pub fn new(config: BoardConfig) -> Self {
        let probe = Arc::new(media::HttpMediaProbe::new(
            config.probe_timeout(),
            config.max_probe_bytes,
        ));
        let video_backend = default_video_backend(&config);
        Self::with_media(config, probe, video_backend)
    }

    pub fn with_media(
        config: BoardConfig,
        probe: Arc<dyn MediaProbe>,
        video_backend: Arc<dyn VideoBackend>,
    ) -> Self {
        let (load_sender, load_receiver) = channel();
        Self {
            store: AssetStore::new(config.tile_layout()),
            config,
            input: UrlInputState::default(),
            textures: HashMap::new(),
            sessions: HashMap::new(),
            gesture: None,
            bounds: Size::new(f32::MAX, f32::MAX),
            fullscreen: None,
            pending_viewport: None,
            in_flight: HashMap::new(),
            tickets: HashMap::new(),
            next_ticket: 0,
            load_sender,
            load_receiver,
            probe,
            video_backend,
        }
    }

    /// Validate the URL field and start loading it in the background.
    fn submit_url(&mut self) {
        let store = &self.store;
        let in_flight = &self.in_flight;
        let checked = url_input::check_submission(&self.input.text, |url| {
            store.contains_url(url) || in_flight.contains_key(url)
        });

        match checked {
            Ok(url) => {
                log::info!("Loading {}", url);
                self.input.error = None;
                let ticket = LoadTicket(self.next_ticket);
                self.next_ticket += 1;
                self.in_flight.insert(url.to_string(), ticket);
                loader::spawn_load(
                    ticket,
                    url,
                    self.probe.clone(),
                    self.video_backend.clone(),
                    self.load_sender.clone(),
                );
            }
            Err(message) => {
                log::warn!("Rejected submission '{}': {}", self.input.text.trim(), message);
                self.input.reject(message);
            }
        }
    }

    /// Pick a local media file and submit it as a `file://` URL.
    fn open_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter(
                "Media",
                &[
                    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif", "mp4", "webm", "mov",
                    "mkv", "m4v", "ogv",
                ],
            )
            .pick_file()
        else {
            return;
        };

        match url::Url::from_file_path(&path) {
            Ok(url) => {
                self.input.text = url.to_string();
                self.submit_url();
            }
            Err(()) => {
                log::error!("Cannot build a URL for {}", path.display());
                self.input.reject(url_input::INVALID_URL);
            }
        }
    }

    /// Drain finished background work. Returns images that still need a texture.
    fn poll_loads(&mut self) -> Vec<(AssetId, LoadedImage)> {
        let mut uploads = Vec::new();
        while let Ok((ticket, event)) = self.load_receiver.try_recv() {
            if let Some(upload) = self.apply_load_event(ticket, event) {
                uploads.push(upload);
            }
        }
        uploads
    }

    fn apply_load_event(
        &mut self,
        ticket: LoadTicket,
        event: LoadEvent,
    ) -> Option<(AssetId, LoadedImage)> {
        match event {
            LoadEvent::Rejected { url, reason } => {
                self.finish_in_flight(&url, ticket);
                log::warn!("Asset cannot be loaded: {} ({})", url, reason);
                self.input.reject(url_input::CANNOT_LOAD);
                None
            }
            LoadEvent::Probed { url, kind, image } => {
                self.finish_in_flight(&url, ticket);
                match self.store.add_asset(NewAsset::new(url.clone(), kind)) {
                    Ok(id) => {
                        self.tickets.insert(id, ticket);
                        self.input.accept(&url);
                        if kind == AssetKind::Video {
                            self.sessions.insert(
                                id,
                                PlaybackSession::new(
                                    0.0,
                                    self.config.progress_sample_secs,
                                    self.config.controls_hide_secs,
                                ),
                            );
                        }
                        image.map(|image| (id, image))
                    }
                    Err(e) => {
                        log::warn!("Failed to add {}: {}", url, e);
                        let message = match e {
                            StoreError::AlreadyAdded(_) => url_input::ALREADY_UPLOADED,
                            _ => url_input::CANNOT_LOAD,
                        };
                        self.input.reject(message);
                        None
                    }
                }
            }
            LoadEvent::Ready {
                url,
                width,
                height,
                duration,
            } => {
                let id = self.loaded_by(&url, ticket)?;
                if let Err(e) = self.store.apply_media_ready(id, width, height, duration) {
                    log::error!("Failed to load media {}: {}", url, e);
                    self.remove_asset(id);
                }
                None
            }
            LoadEvent::Failed { url, reason } => {
                if self.loaded_by(&url, ticket).is_some() {
                    log::error!("Removing {} after load failure: {}", url, reason);
                    if let Some(removed) = self.store.remove_by_url(&url) {
                        self.forget(removed.id);
                    }
                }
                None
            }
        }
    }

    fn finish_in_flight(&mut self, url: &str, ticket: LoadTicket) {
        if self.in_flight.get(url) == Some(&ticket) {
            self.in_flight.remove(url);
        }
    }

    /// The asset at `url`, if it was added by the submission `ticket`.
    fn loaded_by(&self, url: &str, ticket: LoadTicket) -> Option<AssetId> {
        let id = self.store.get_by_url(url)?.id;
        if self.tickets.get(&id) == Some(&ticket) {
            Some(id)
        } else {
            log::debug!("Ignoring stale load event for {}", url);
            None
        }
    }

    fn remove_asset(&mut self, id: AssetId) {
        match self.store.remove(id) {
            Ok(_) => self.forget(id),
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Drop session state kept for a removed asset.
    fn forget(&mut self, id: AssetId) {
        self.textures.remove(&id);
        self.sessions.remove(&id);
        self.tickets.remove(&id);
        if self.gesture.map_or(false, |g| g.id == id) {
            self.gesture = None;
        }
        if self.fullscreen == Some(id) {
            self.exit_fullscreen();
        }
    }

    fn toggle_fullscreen(&mut self, id: AssetId) {
        if self.fullscreen.is_some() {
            self.exit_fullscreen();
            return;
        }
        self.store.pause_all();
        log_store_error(self.store.play(id));
        self.fullscreen = Some(id);
        self.pending_viewport = Some(true);
    }

    fn exit_fullscreen(&mut self) {
        self.fullscreen = None;
        self.pending_viewport = Some(false);
    }

    fn handle_sidebar_action(&mut self, action: SidebarAction) {
        match action {
            SidebarAction::UrlInput(UrlInputAction::Submit) => self.submit_url(),
            SidebarAction::UrlInput(UrlInputAction::OpenFile) => self.open_file(),
            SidebarAction::UrlInput(UrlInputAction::None) => {}
            SidebarAction::PlayAll => self.store.play_all(),
            SidebarAction::PauseAll => self.store.pause_all(),
            SidebarAction::BringToFront(id) => log_store_error(self.store.bring_to_front(id)),
            SidebarAction::Remove(id) => self.remove_asset(id),
            SidebarAction::TogglePlay(id) => self.toggle_play(id),
            SidebarAction::ToggleBorder(id) => log_store_error(self.store.toggle_border(id)),
            SidebarAction::ToggleAspectLock(id) => {
                log_store_error(self.store.toggle_aspect_lock(id))
            }
        }
    }

    fn handle_canvas_action(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::BringToFront(id) => log_store_error(self.store.bring_to_front(id)),
            CanvasAction::StartGesture(id, kind) => {
                if let Some(asset) = self.store.get(id) {
                    self.gesture = Some(Gesture::begin(asset, kind));
                }
            }
            CanvasAction::UpdateGesture(delta) => {
                if let Some(ref mut gesture) = self.gesture {
                    if let Some(asset) = self.store.get(gesture.id) {
                        gesture.update(delta, asset, self.bounds);
                    }
                }
            }
            CanvasAction::StopGesture => self.finish_gesture(),
            CanvasAction::Video(id, action) => self.handle_video_action(id, action),
        }
    }

    /// Commit the gesture's local geometry to the store.
    fn finish_gesture(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        match gesture.kind {
            GestureKind::Move => {
                log_store_error(self.store.set_position(
                    gesture.id,
                    gesture.position.x,
                    gesture.position.y,
                ));
            }
            GestureKind::Resize => {
                log_store_error(self.store.set_position(
                    gesture.id,
                    gesture.start_position.x,
                    gesture.start_position.y,
                ));
                log_store_error(self.store.set_size(
                    gesture.id,
                    gesture.size.width,
                    gesture.size.height,
                ));
            }
        }
        log::debug!("Finished {:?} of {}", gesture.kind, gesture.id);
    }

    fn handle_video_action(&mut self, id: AssetId, action: VideoControlAction) {
        match action {
            VideoControlAction::SetDraggable(draggable) => {
                // Leaving the title bar mid-drag must not cancel the drag.
                let dragging = self.gesture.map_or(false, |g| g.id == id);
                if draggable || !dragging {
                    log_store_error(self.store.set_draggable(id, draggable));
                }
            }
            VideoControlAction::TogglePlay => self.toggle_play(id),
            VideoControlAction::Play => log_store_error(self.store.play(id)),
            VideoControlAction::Pause => log_store_error(self.store.pause(id)),
            VideoControlAction::CommitProgress(progress) => {
                log_store_error(self.store.set_progress(id, progress))
            }
            VideoControlAction::ToggleFullscreen => self.toggle_fullscreen(id),
            VideoControlAction::Close => self.remove_asset(id),
        }
    }

    fn toggle_play(&mut self, id: AssetId) {
        let finished = self.store.get(id).map_or(false, |a| a.is_finished());
        log_store_error(self.store.toggle_play(id));
        if finished {
            if let Some(session) = self.sessions.get_mut(&id) {
                session.progress = 0.0;
            }
        }
    }

    /// Advance every playing video and push sampled progress into the store.
    fn tick_playback(&mut self, dt: f64, now: f64) {
        let mut commits = Vec::new();
        for asset in self.store.assets().iter().filter(|a| a.is_video()) {
            let Some(session) = self.sessions.get_mut(&asset.id) else {
                continue;
            };
            match session.tick(dt, asset.playing, asset.duration) {
                Tick::Finished => commits.push((asset.id, session.progress, true)),
                Tick::Advanced | Tick::Idle => {
                    if session.should_commit(now, asset.playing) {
                        commits.push((asset.id, session.progress, false));
                    }
                }
            }
        }

        for (id, progress, finished) in commits {
            log_store_error(self.store.set_progress(id, progress));
            if finished {
                log_store_error(self.store.pause(id));
            }
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context, id: AssetId, image: LoadedImage) {
        let size = [image.width as usize, image.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
        let texture = ctx.load_texture(
            format!("asset-{}", id),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(id, texture);
    }

    fn needs_animation(&self) -> bool {
        !self.in_flight.is_empty()
            || self.gesture.is_some()
            || self.store.assets().iter().any(|a| a.playing)
    }
}

#[cfg(feature = "video-opencv")]
fn default_video_backend(_config: &BoardConfig) -> Arc<dyn VideoBackend> {
    Arc::new(media::OpenCvVideoBackend)
}

#[cfg(not(feature = "video-opencv"))]
fn default_video_backend(config: &BoardConfig) -> Arc<dyn VideoBackend> {
    let [width, height] = config.fallback_video_size;
    Arc::new(media::FallbackVideoBackend { width, height })
}

fn log_store_error(result: Result<(), StoreError>) {
    if let Err(e) = result {
        log::warn!("{}", e);
    }
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (now, dt) = ctx.input(|i| (i.time, i.stable_dt as f64));

        // Check for completed background loads
        for (id, image) in self.poll_loads() {
            self.upload_texture(ctx, id, image);
        }

        self.tick_playback(dt, now);

        if self.fullscreen.is_some() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.exit_fullscreen();
        }
        if let Some(fullscreen) = self.pending_viewport.take() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen));
        }

        if let Some(id) = self.fullscreen {
            let actions = egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| match self.store.get(id) {
                    Some(asset) => canvas::show_fullscreen(
                        ui,
                        asset,
                        &self.textures,
                        self.sessions.get_mut(&id),
                        now,
                    ),
                    None => vec![VideoControlAction::ToggleFullscreen],
                })
                .inner;
            for action in actions {
                self.handle_video_action(id, action);
            }
        } else {
            let loading = !self.in_flight.is_empty();
            let sidebar_actions = egui::SidePanel::left("sidebar")
                .default_width(400.0)
                .show(ctx, |ui| {
                    sidebar::show(ui, &self.store, &self.textures, &mut self.input, loading)
                })
                .inner;
            for action in sidebar_actions {
                self.handle_sidebar_action(action);
            }

            let output = egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| {
                    canvas::show(
                        ui,
                        &self.store,
                        &self.textures,
                        &mut self.sessions,
                        self.gesture.as_ref(),
                        now,
                    )
                })
                .inner;
            self.bounds = output.bounds;
            for action in output.actions {
                self.handle_canvas_action(action);
            }
        }

        if self.needs_animation() {
            ctx.request_repaint();
        } else if !self.sessions.is_empty() {
            // Lets idle video controls fade out.
            ctx.request_repaint_after(Duration::from_secs_f64(self.config.controls_hide_secs));
        }
    }
}
