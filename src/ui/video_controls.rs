// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video tile controls overlay.
//!
//! Title bar (drag handle, fullscreen, close), a central play button and a
//! bottom bar with the progress slider and volume. Volume, mute and
//! scrubbing stay in the tile's `PlaybackSession`; anything the store owns
//! is returned as an action.

use crate::models::asset::Asset;
use crate::models::playback::{format_timestamp, PlaybackSession};

const TITLE_BAR_HEIGHT: f32 = 24.0;
const BOTTOM_BAR_HEIGHT: f32 = 30.0;
const VOLUME_WIDTH: f32 = 120.0;
const BAR_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(204, 204, 204, 204);

/// Result of interacting with a video tile's controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoControlAction {
    SetDraggable(bool),
    TogglePlay,
    Play,
    Pause,
    CommitProgress(f64),
    ToggleFullscreen,
    Close,
}

/// Draw the controls over `rect` and collect the resulting actions.
pub fn show(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    asset: &Asset,
    session: &mut PlaybackSession,
    now: f64,
) -> Vec<VideoControlAction> {
    let mut actions = Vec::new();
    let id = egui::Id::new(("video_controls", asset.id));
    let hover_pos = ui.input(|i| i.pointer.hover_pos());

    // Any pointer movement over the tile wakes the controls up.
    let pointer_moved = ui.input(|i| i.pointer.delta() != egui::Vec2::ZERO);
    if pointer_moved && hover_pos.map_or(false, |p| rect.contains(p)) {
        session.touch(now);
    }
    let visible = session.controls_visible(now);

    let title_rect =
        egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), TITLE_BAR_HEIGHT));
    let bottom_rect = egui::Rect::from_min_max(
        egui::pos2(rect.min.x, rect.max.y - BOTTOM_BAR_HEIGHT),
        rect.max,
    );
    let content_rect = egui::Rect::from_min_max(
        egui::pos2(rect.min.x, title_rect.max.y),
        egui::pos2(rect.max.x, bottom_rect.min.y),
    );

    // Dragging a video is only possible through its title bar.
    let over_title = hover_pos.map_or(false, |p| title_rect.contains(p));
    if over_title != asset.draggable {
        actions.push(VideoControlAction::SetDraggable(over_title));
    }

    let content = ui.interact(content_rect, id.with("content"), egui::Sense::click());
    if content.clicked() {
        actions.push(VideoControlAction::TogglePlay);
    }

    if !visible {
        return actions;
    }

    let painter = ui.painter();
    let finished = asset.is_finished()
        || asset.duration.map_or(false, |d| d > 0.0 && session.progress >= d);

    // Title bar
    painter.rect_filled(title_rect, 0.0, BAR_FILL);
    painter.text(
        title_rect.center(),
        egui::Align2::CENTER_CENTER,
        &asset.name,
        egui::FontId::proportional(13.0),
        egui::Color32::from_gray(30),
    );
    let close_rect = egui::Rect::from_min_size(
        egui::pos2(title_rect.max.x - TITLE_BAR_HEIGHT, title_rect.min.y),
        egui::vec2(TITLE_BAR_HEIGHT, TITLE_BAR_HEIGHT),
    );
    let fullscreen_rect = close_rect.translate(egui::vec2(-TITLE_BAR_HEIGHT, 0.0));
    if ui
        .put(fullscreen_rect, egui::Button::new("🗖").frame(false))
        .on_hover_text("Fullscreen")
        .clicked()
    {
        actions.push(VideoControlAction::ToggleFullscreen);
    }
    if ui
        .put(close_rect, egui::Button::new("✖").frame(false))
        .on_hover_text("Remove")
        .clicked()
    {
        actions.push(VideoControlAction::Close);
    }

    // Play button
    let icon = if finished {
        "🔁"
    } else if asset.playing {
        "⏸"
    } else {
        "▶"
    };
    let radius = (content_rect.height().min(content_rect.width()) * 0.25).clamp(8.0, 32.0);
    let painter = ui.painter();
    painter.circle_filled(content_rect.center(), radius, BAR_FILL);
    painter.text(
        content_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(radius * 1.2),
        ui.visuals().selection.bg_fill,
    );

    // Bottom bar
    ui.painter().rect_filled(bottom_rect, 0.0, BAR_FILL);
    ui.allocate_ui_at_rect(bottom_rect.shrink2(egui::vec2(8.0, 4.0)), |ui| {
        ui.horizontal_centered(|ui| {
            ui.label(format_timestamp(Some(session.progress)));

            let reserved = VOLUME_WIDTH + 90.0;
            match asset.duration {
                Some(duration) => {
                    ui.spacing_mut().slider_width = (ui.available_width() - reserved).max(24.0);
                    let mut position = session.progress;
                    let response = ui.add(
                        egui::Slider::new(&mut position, 0.0..=duration)
                            .show_value(false)
                            .step_by(0.01),
                    );
                    if response.changed() {
                        if session.begin_scrub(asset.playing) {
                            actions.push(VideoControlAction::Pause);
                        }
                        session.scrub_to(position, Some(duration));
                    }
                    if session.is_scrubbing() && (response.drag_stopped() || !response.dragged()) {
                        actions.push(VideoControlAction::CommitProgress(session.progress));
                        if session.end_scrub() {
                            actions.push(VideoControlAction::Play);
                        }
                    }
                }
                None => {
                    ui.add_space((ui.available_width() - reserved).max(0.0));
                }
            }
            ui.label(format_timestamp(asset.duration));

            let volume_icon = if session.muted { "🔇" } else { "🔊" };
            if ui.add(egui::Button::new(volume_icon).frame(false)).clicked() {
                session.toggle_mute();
            }
            ui.spacing_mut().slider_width = (VOLUME_WIDTH - 32.0).max(24.0);
            let mut volume = session.effective_volume();
            if ui
                .add(egui::Slider::new(&mut volume, 0.0..=100.0).show_value(false))
                .changed()
            {
                session.set_volume(volume);
            }
        });
    });

    actions
}
