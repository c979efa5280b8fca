// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! URL entry field.
//!
//! Validates what the user typed before a load is started. Probing (and
//! the "cannot be loaded" outcome) happens in the background loader.

use crate::io::media;
use url::Url;

pub const INVALID_URL: &str = "Invalid URL";
pub const ALREADY_UPLOADED: &str = "Asset already uploaded";
pub const CANNOT_LOAD: &str = "Asset cannot be loaded";

/// Text field contents and the error shown under it.
#[derive(Debug, Default)]
pub struct UrlInputState {
    pub text: String,
    pub error: Option<String>,
}

impl UrlInputState {
    /// Clear the field after `url` was added, unless the user typed something else since.
    pub fn accept(&mut self, url: &str) {
        let submitted = media::validate_url(&self.text).map(|u| u.to_string());
        if submitted.map_or(false, |s| s == url) {
            self.text.clear();
            self.error = None;
        }
    }

    pub fn reject(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}

/// Result of interacting with the URL field.
pub enum UrlInputAction {
    None,
    Submit,
    OpenFile,
}

/// Check typed input against the board before probing it.
pub fn check_submission(input: &str, is_known: impl Fn(&str) -> bool) -> Result<Url, &'static str> {
    let url = media::validate_url(input).map_err(|_| INVALID_URL)?;
    if is_known(url.as_str()) {
        return Err(ALREADY_UPLOADED);
    }
    Ok(url)
}

/// Display the URL field with its submit and open-file buttons.
pub fn show(ui: &mut egui::Ui, state: &mut UrlInputState, loading: bool) -> UrlInputAction {
    let mut action = UrlInputAction::None;

    ui.horizontal(|ui| {
        let field_width = (ui.available_width() - 70.0).max(80.0);
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.text)
                .hint_text("Image or video URL")
                .desired_width(field_width),
        );
        if response.changed() {
            state.error = None;
        }
        let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if ui.button("🔗").on_hover_text("Add URL").clicked() || entered {
            action = UrlInputAction::Submit;
        }
        if ui.button("📂").on_hover_text("Open file...").clicked() {
            action = UrlInputAction::OpenFile;
        }
    });

    if let Some(ref error) = state.error {
        ui.colored_label(ui.visuals().error_fg_color, error);
    }
    if loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(egui::RichText::new("Loading...").weak());
        });
    }

    action
}
