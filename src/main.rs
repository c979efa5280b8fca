// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MEDIABOARD - freeform board for image and video assets
//!
//! A cross-platform desktop application for collecting images and videos
//! by URL and arranging them as draggable, resizable tiles.

mod app;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::BoardApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = io::config::load()?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 600.0])
            .with_title("MEDIABOARD"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "MEDIABOARD",
        options,
        Box::new(move |_cc| Ok(Box::new(BoardApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
