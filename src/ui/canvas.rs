// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Board canvas.
//!
//! This module paints the asset tiles in stacking order and turns pointer
//! gestures into canvas actions: pressing a tile raises it, dragging its
//! body moves it and dragging its corner handle resizes it. While a gesture
//! runs the tile is drawn from the gesture's local geometry; the store is
//! only updated when the gesture stops.

use super::video_controls::{self, VideoControlAction};
use crate::models::asset::{Asset, AssetId, Position, Size};
use crate::models::playback::PlaybackSession;
use crate::models::store::AssetStore;
use crate::util::geometry;
use std::collections::HashMap;

const BOARD_FILL: egui::Color32 = egui::Color32::from_gray(204);
const BORDER: egui::Color32 = egui::Color32::from_gray(51);
const VIDEO_FILL: egui::Color32 = egui::Color32::from_gray(24);
const HANDLE_SIZE: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
}

/// A drag or resize in progress, in board coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Gesture {
    pub id: AssetId,
    pub kind: GestureKind,
    pub start_position: Position,
    pub start_size: Size,
    pub position: Position,
    pub size: Size,
    delta: egui::Vec2,
}

impl Gesture {
    pub fn begin(asset: &Asset, kind: GestureKind) -> Self {
        Self {
            id: asset.id,
            kind,
            start_position: asset.position,
            start_size: asset.size,
            position: asset.position,
            size: asset.size,
            delta: egui::Vec2::ZERO,
        }
    }

    /// Accumulate pointer movement and recompute the local geometry.
    pub fn update(&mut self, delta: egui::Vec2, asset: &Asset, bounds: Size) {
        self.delta += delta;
        match self.kind {
            GestureKind::Move => {
                let target = Position::new(
                    self.start_position.x + self.delta.x,
                    self.start_position.y + self.delta.y,
                );
                self.position = geometry::clamp_to_bounds(target, self.size, bounds);
            }
            GestureKind::Resize => {
                self.size = geometry::resize_from_corner(
                    self.start_size,
                    self.delta.x,
                    self.delta.y,
                    !asset.frame_aspect_ratio_unlocked,
                    asset.aspect_ratio,
                    self.start_position,
                    bounds,
                );
            }
        }
    }
}

/// Result of canvas interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    BringToFront(AssetId),
    StartGesture(AssetId, GestureKind),
    UpdateGesture(egui::Vec2),
    StopGesture,
    Video(AssetId, VideoControlAction),
}

pub struct CanvasOutput {
    pub actions: Vec<CanvasAction>,
    /// Board size this frame, used to keep tiles inside it.
    pub bounds: Size,
}

/// Display the board and handle pointer interactions.
pub fn show(
    ui: &mut egui::Ui,
    store: &AssetStore,
    textures: &HashMap<AssetId, egui::TextureHandle>,
    sessions: &mut HashMap<AssetId, PlaybackSession>,
    gesture: Option<&Gesture>,
    now: f64,
) -> CanvasOutput {
    let mut actions = Vec::new();
    let board_rect = ui.available_rect_before_wrap();
    let origin = board_rect.min;
    let bounds = Size::new(board_rect.width(), board_rect.height());

    ui.painter().rect_filled(board_rect, 0.0, BOARD_FILL);

    if store.is_empty() {
        ui.painter().text(
            board_rect.center(),
            egui::Align2::CENTER_CENTER,
            "Paste an image or video URL in the sidebar to start",
            egui::FontId::proportional(16.0),
            egui::Color32::from_gray(110),
        );
    }

    // Pressing anywhere on a tile raises it, whichever widget gets the press.
    if let Some(press) = ui.input(|i| {
        i.pointer
            .any_pressed()
            .then(|| i.pointer.interact_pos())
            .flatten()
    }) {
        if board_rect.contains(press) {
            let local = press - origin;
            if let Some(hit) = store.topmost_at(local.x, local.y) {
                if hit.z_index + 1 != store.len() {
                    actions.push(CanvasAction::BringToFront(hit.id));
                }
            }
        }
    }

    for asset in store.stacking_order() {
        let (position, size) = match gesture {
            Some(g) if g.id == asset.id => (g.position, g.size),
            _ => (asset.position, asset.size),
        };
        if size.width <= 0.0 || size.height <= 0.0 {
            // Media not ready yet.
            continue;
        }

        let rect = egui::Rect::from_min_size(
            origin + egui::vec2(position.x, position.y),
            egui::vec2(size.width, size.height),
        );
        let in_gesture = gesture.map_or(false, |g| g.id == asset.id);
        show_tile(ui, asset, rect, textures, sessions, in_gesture, now, &mut actions);
    }

    ui.allocate_rect(board_rect, egui::Sense::hover());

    CanvasOutput { actions, bounds }
}

#[allow(clippy::too_many_arguments)]
fn show_tile(
    ui: &mut egui::Ui,
    asset: &Asset,
    rect: egui::Rect,
    textures: &HashMap<AssetId, egui::TextureHandle>,
    sessions: &mut HashMap<AssetId, PlaybackSession>,
    in_gesture: bool,
    now: f64,
    actions: &mut Vec<CanvasAction>,
) {
    let tile_id = egui::Id::new(("tile", asset.id));
    let sense = if asset.can_drag() || in_gesture {
        egui::Sense::click_and_drag()
    } else {
        egui::Sense::click()
    };
    let body = ui.interact(rect, tile_id, sense);
    push_gesture(&body, asset.id, GestureKind::Move, actions);

    paint_media(ui.painter(), asset, rect, textures);

    if asset.is_video() {
        if let Some(session) = sessions.get_mut(&asset.id) {
            for action in video_controls::show(ui, rect, asset, session, now) {
                actions.push(CanvasAction::Video(asset.id, action));
            }
        }
    }

    if !asset.border_disabled {
        ui.painter()
            .rect_stroke(rect, 0.0, egui::Stroke::new(1.0, BORDER));
    }

    let handle_rect =
        egui::Rect::from_min_max(rect.max - egui::vec2(HANDLE_SIZE, HANDLE_SIZE), rect.max);
    let handle = ui
        .interact(handle_rect, tile_id.with("resize"), egui::Sense::drag())
        .on_hover_cursor(egui::CursorIcon::ResizeNwSe);
    push_gesture(&handle, asset.id, GestureKind::Resize, actions);
    if handle.hovered() || handle.dragged() {
        ui.painter().add(egui::Shape::convex_polygon(
            vec![
                handle_rect.right_top(),
                handle_rect.right_bottom(),
                handle_rect.left_bottom(),
            ],
            BORDER,
            egui::Stroke::NONE,
        ));
    }
}

fn push_gesture(
    response: &egui::Response,
    id: AssetId,
    kind: GestureKind,
    actions: &mut Vec<CanvasAction>,
) {
    if response.drag_started() {
        actions.push(CanvasAction::StartGesture(id, kind));
    }
    if response.dragged() {
        let delta = response.drag_delta();
        if delta != egui::Vec2::ZERO {
            actions.push(CanvasAction::UpdateGesture(delta));
        }
    }
    if response.drag_stopped() {
        actions.push(CanvasAction::StopGesture);
    }
}

fn paint_media(
    painter: &egui::Painter,
    asset: &Asset,
    rect: egui::Rect,
    textures: &HashMap<AssetId, egui::TextureHandle>,
) {
    match textures.get(&asset.id) {
        Some(texture) => {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        None => {
            painter.rect_filled(rect, 0.0, VIDEO_FILL);
            if let Some(duration) = asset.duration {
                let played = (asset.progress / duration).clamp(0.0, 1.0) as f32;
                let bar = egui::Rect::from_min_size(
                    egui::pos2(rect.min.x, rect.max.y - 3.0),
                    egui::vec2(rect.width() * played, 3.0),
                );
                painter.rect_filled(bar, 0.0, egui::Color32::from_rgb(90, 140, 230));
            }
        }
    }
}

/// Display a single asset filling the canvas, preserving its aspect ratio.
pub fn show_fullscreen(
    ui: &mut egui::Ui,
    asset: &Asset,
    textures: &HashMap<AssetId, egui::TextureHandle>,
    session: Option<&mut PlaybackSession>,
    now: f64,
) -> Vec<VideoControlAction> {
    let available = ui.available_rect_before_wrap();
    ui.painter().rect_filled(available, 0.0, egui::Color32::BLACK);

    let ratio = geometry::aspect_ratio(asset.size.width, asset.size.height);
    let fitted = geometry::thumbnail_size(ratio, 1.0);
    let scale = (available.width() / fitted.width).min(available.height() / fitted.height);
    let rect = egui::Rect::from_center_size(
        available.center(),
        egui::vec2(fitted.width * scale, fitted.height * scale),
    );

    paint_media(ui.painter(), asset, rect, textures);
    let actions = match session {
        Some(session) => video_controls::show(ui, rect, asset, session, now)
            .into_iter()
            .filter(|a| !matches!(a, VideoControlAction::SetDraggable(_)))
            .collect(),
        None => Vec::new(),
    };
    ui.allocate_rect(available, egui::Sense::hover());
    actions
}
