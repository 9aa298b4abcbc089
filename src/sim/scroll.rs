//! Viewport scrolling
//!
//! The camera keeps the player inside the middle third of the viewport. When
//! the player enters the top or bottom third, the view slides toward them,
//! faster the deeper they are into the band. The scroll offset never leaves
//! `[0, world_height - viewport_height]`; a slide that would cross either end
//! is dropped, so the camera stops just short of the level edges.

use crate::consts::{SCROLL_EPSILON, SLIDE_SPEED};

use super::state::PlatformerState;

/// Slide amount for a player `cur` pixels from the band edge at `max`
pub fn slide(cur: f64, max: f64) -> f64 {
    let ret = SLIDE_SPEED * (max - cur) / max;
    if ret < 0.0 { SLIDE_SPEED } else { ret }
}

/// Signed scroll change wanted for a player at `player_y` (viewport space)
pub fn scroll_delta(player_y: f64, viewport_height: f64) -> f64 {
    let band = viewport_height / 3.0;
    if player_y <= band {
        -slide(player_y, band)
    } else if player_y >= viewport_height * 2.0 / 3.0 {
        slide(viewport_height - player_y, band)
    } else {
        0.0
    }
}

/// Whether moving the offset by `delta` keeps it inside the level
pub fn accepts_delta(offset: f64, delta: f64, max_scroll: f64) -> bool {
    let next = offset + delta;
    delta.abs() > SCROLL_EPSILON && 0.0 <= next && next <= max_scroll
}

/// Shift the view by `delta`, repositioning the scene and the player
pub fn shift_view(state: &mut PlatformerState, delta: f64) {
    let viewport_height = state.viewport_height();
    state.scroll_offset += delta;
    state.scene.shift(delta, viewport_height);
    state.player.pos.y -= delta;
}

/// Follow the player; returns the applied delta (0 if none)
pub fn update_scroll(state: &mut PlatformerState) -> f64 {
    let delta = scroll_delta(state.player.pos.y, state.viewport_height());
    if !accepts_delta(state.scroll_offset, delta, state.max_scroll()) {
        return 0.0;
    }
    shift_view(state, delta);
    delta
}
