// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Asset list sidebar.
//!
//! This module provides the left panel: the URL field, play/pause for
//! every video, and one entry per asset with its preview, geometry
//! readout and per-asset buttons.

use super::url_input::{self, UrlInputAction, UrlInputState};
use crate::models::asset::{Asset, AssetId};
use crate::models::store::AssetStore;
use crate::util::geometry;
use std::collections::HashMap;

const THUMBNAIL_EDGE: f32 = 100.0;

/// Result of sidebar interaction.
pub enum SidebarAction {
    UrlInput(UrlInputAction),
    PlayAll,
    PauseAll,
    BringToFront(AssetId),
    Remove(AssetId),
    TogglePlay(AssetId),
    ToggleBorder(AssetId),
    ToggleAspectLock(AssetId),
}

/// Display the sidebar and collect the actions triggered this frame.
pub fn show(
    ui: &mut egui::Ui,
    store: &AssetStore,
    textures: &HashMap<AssetId, egui::TextureHandle>,
    input: &mut UrlInputState,
    loading: bool,
) -> Vec<SidebarAction> {
    let mut actions = Vec::new();

    match url_input::show(ui, input, loading) {
        UrlInputAction::None => {}
        other => actions.push(SidebarAction::UrlInput(other)),
    }

    if store.has_videos() {
        ui.horizontal(|ui| {
            ui.columns(2, |columns| {
                columns[0].vertical_centered(|ui| {
                    if ui.button("⏸").on_hover_text("Pause all").clicked() {
                        actions.push(SidebarAction::PauseAll);
                    }
                });
                columns[1].vertical_centered(|ui| {
                    if ui.button("▶").on_hover_text("Play all").clicked() {
                        actions.push(SidebarAction::PlayAll);
                    }
                });
            });
        });
    }

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for asset in store.assets() {
                show_item(ui, asset, textures.get(&asset.id), &mut actions);
                ui.separator();
            }
        });

    actions
}

fn show_item(
    ui: &mut egui::Ui,
    asset: &Asset,
    texture: Option<&egui::TextureHandle>,
    actions: &mut Vec<SidebarAction>,
) {
    ui.horizontal(|ui| {
        let name = ui.add(
            egui::Label::new(egui::RichText::new(&asset.name).strong())
                .truncate()
                .sense(egui::Sense::click()),
        );
        if name.on_hover_text(&asset.url).clicked() {
            actions.push(SidebarAction::BringToFront(asset.id));
        }
        ui.hyperlink_to("↗", &asset.url);
    });

    ui.horizontal(|ui| {
        let (slot, _) = ui.allocate_exact_size(
            egui::vec2(THUMBNAIL_EDGE, THUMBNAIL_EDGE),
            egui::Sense::hover(),
        );
        match texture {
            Some(texture) => {
                let size = geometry::thumbnail_size(asset.aspect_ratio, THUMBNAIL_EDGE);
                let rect = egui::Rect::from_center_size(
                    slot.center(),
                    egui::vec2(size.width, size.height),
                );
                ui.put(rect, egui::Image::new((texture.id(), rect.size())));
            }
            None if asset.is_video() => {
                let icon = if asset.playing { "⏸" } else { "▶" };
                let button = egui::Button::new(egui::RichText::new(icon).size(36.0))
                    .fill(ui.visuals().selection.bg_fill)
                    .rounding(8.0);
                if ui.put(slot.shrink(4.0), button).clicked() {
                    actions.push(SidebarAction::TogglePlay(asset.id));
                }
            }
            None => {
                ui.put(slot, egui::Spinner::new());
            }
        }

        ui.vertical(|ui| {
            ui.label(format!("Width: {}", asset.size.width.trunc() as i64));
            ui.label(format!("Height: {}", asset.size.height.trunc() as i64));
            ui.label(format!("X: {}", asset.position.x));
            ui.label(format!("Y: {}", asset.position.y));
        });

        ui.with_layout(egui::Layout::top_down(egui::Align::RIGHT), |ui| {
            if ui.button("⬆").on_hover_text("Bring to front").clicked() {
                actions.push(SidebarAction::BringToFront(asset.id));
            }
            if ui.button("🗑").on_hover_text("Delete").clicked() {
                actions.push(SidebarAction::Remove(asset.id));
            }
            let border = if asset.border_disabled { "☐" } else { "▣" };
            if ui.button(border).on_hover_text("Toggle border").clicked() {
                actions.push(SidebarAction::ToggleBorder(asset.id));
            }
            let lock = if asset.frame_aspect_ratio_unlocked { "🔓" } else { "🔒" };
            if ui.button(lock).on_hover_text("Lock aspect ratio").clicked() {
                actions.push(SidebarAction::ToggleAspectLock(asset.id));
            }
        });
    });
}
