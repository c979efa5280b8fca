// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: configuration, media probing and background loading.

pub mod config;
pub mod loader;
pub mod media;
