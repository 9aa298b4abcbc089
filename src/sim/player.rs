//! Player movement
//!
//! Held keys and gravity turn into one committed move per step. All bounds
//! come from the level in world space and are converted to viewport space
//! before the player is clamped against them.

use crate::level::LevelGeometry;
use crate::platform::{HeldKeys, MoveKey};
use crate::{to_screen_y, to_world_y};

use super::collision::{Aabb, clamp_to_bounds};
use super::state::PlatformerState;

/// Bounds around the player for one step, in viewport space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepBounds {
    /// Player top when standing on the surface below
    pub ground: f64,
    /// Lowest the player top may go when rising
    pub ceiling: f64,
    /// Leftmost player x
    pub left: f64,
    /// Rightmost player x
    pub right: f64,
}

/// Query the level for the bounds around the player's current box
pub fn step_bounds<L: LevelGeometry + ?Sized>(state: &PlatformerState, level: &L) -> StepBounds {
    let player = &state.player;
    let world_box = Aabb::new(
        player.pos.x,
        to_world_y(player.pos.y, state.scroll_offset),
        player.width,
        player.height,
    );

    let ceiling = to_screen_y(level.upper_bound(&world_box), state.scroll_offset);
    let ground = to_screen_y(
        level.lower_bound(&world_box) - player.height,
        state.scroll_offset,
    );
    let left = level.left_bound(&world_box);
    let right = level.right_bound(&world_box) - player.width;

    StepBounds {
        // Crossed bounds mean broken geometry; keep the range non-empty
        ground: ground.max(ceiling),
        ceiling,
        left,
        right: right.max(left),
    }
}

/// Advance the player one step; returns true if the finish condition holds
pub fn update_player<L: LevelGeometry + ?Sized>(
    state: &mut PlatformerState,
    level: &L,
    keys: &HeldKeys,
) -> bool {
    let bounds = step_bounds(state, level);
    let start_world_y = to_world_y(state.player.pos.y, state.scroll_offset);
    let s = &state.settings;
    let player = &mut state.player;

    if keys.contains(MoveKey::Up) && player.on_ground(bounds.ground, s.ground_tolerance) {
        player.jump(s.jump_speed);
    }
    if keys.contains(MoveKey::Left) {
        player.move_left(bounds.left, s.move_speed);
    }
    if keys.contains(MoveKey::Right) {
        player.move_right(bounds.right, s.move_speed);
    }
    player.fall(bounds.ground, bounds.ceiling, s.gravity, s.max_fall_speed);
    player.commit();

    player.pos.x = clamp_to_bounds(player.pos.x, bounds.left, bounds.right);
    player.pos.y = clamp_to_bounds(player.pos.y, bounds.ceiling, bounds.ground);

    player.on_ground(bounds.ground, s.ground_tolerance)
        && bounds.ceiling < s.finish_ceiling_epsilon
        && start_world_y < player.height * s.finish_height_factor
}
