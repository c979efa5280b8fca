// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Tile geometry helpers shared by the canvas and the sidebar: aspect
//! ratios, keeping tiles inside the board, and corner resizing.

use crate::models::asset::{Position, Size};

/// Smallest edge a tile can be resized to.
pub const MIN_TILE_EDGE: f32 = 32.0;

/// Width over height, or 1.0 for degenerate sizes.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
        width / height
    } else {
        1.0
    }
}

/// Keep a tile of `size` inside a board of `bounds`.
///
/// A tile larger than the board is pinned to the top-left corner.
pub fn clamp_to_bounds(position: Position, size: Size, bounds: Size) -> Position {
    let max_x = (bounds.width - size.width).max(0.0);
    let max_y = (bounds.height - size.height).max(0.0);
    Position {
        x: position.x.clamp(0.0, max_x),
        y: position.y.clamp(0.0, max_y),
    }
}

/// New size after dragging the bottom-right handle by `(dx, dy)`.
///
/// With the aspect ratio locked the horizontal drag drives both edges.
/// The result never exceeds the space left between `position` and the
/// board edge.
pub fn resize_from_corner(
    start: Size,
    dx: f32,
    dy: f32,
    aspect_locked: bool,
    aspect_ratio: f32,
    position: Position,
    bounds: Size,
) -> Size {
    let max_width = (bounds.width - position.x).max(MIN_TILE_EDGE);
    let max_height = (bounds.height - position.y).max(MIN_TILE_EDGE);

    if aspect_locked {
        let ratio = if aspect_ratio > 0.0 { aspect_ratio } else { 1.0 };
        let min_width = MIN_TILE_EDGE.max(MIN_TILE_EDGE * ratio);
        let width = (start.width + dx)
            .max(min_width)
            .min(max_width)
            .min(max_height * ratio);
        Size {
            width,
            height: width / ratio,
        }
    } else {
        Size {
            width: (start.width + dx).clamp(MIN_TILE_EDGE, max_width),
            height: (start.height + dy).clamp(MIN_TILE_EDGE, max_height),
        }
    }
}

/// Largest size with the given aspect ratio that fits a square box.
pub fn thumbnail_size(aspect_ratio: f32, edge: f32) -> Size {
    if aspect_ratio >= 1.0 {
        Size::new(edge, edge / aspect_ratio)
    } else {
        Size::new(edge * aspect_ratio, edge)
    }
}
