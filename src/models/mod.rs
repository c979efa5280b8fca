// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Board data model: assets, the store that owns them, and playback sessions.

pub mod asset;
pub mod playback;
pub mod store;
