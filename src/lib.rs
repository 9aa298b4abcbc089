//! Sky Climb - simulation core for a vertically scrolling quiz platformer
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (player, scrolling, triggers, progress)
//! - `level`: Level geometry provider trait and the grid-backed implementation
//! - `platform`: Input boundary (held movement keys, escape)
//! - `persistence`: Session saves and per-level save slots
//! - `session`: Level runner tying clock, state, input and hooks together
//! - `settings`: Data-driven tuning

pub mod level;
pub mod persistence;
pub mod platform;
pub mod scores;
pub mod session;
pub mod settings;
pub mod sim;

pub use scores::ScoreCard;
pub use session::{LevelHooks, LevelSession};
pub use settings::{RemainderPolicy, Settings};

/// Game configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Fixed simulation quantum: 5 ms expressed in nanoseconds (200 Hz)
    pub const STEP_NANOS: u64 = 5_000_000;

    /// Viewport dimensions
    pub const SCREEN_WIDTH: f64 = 600.0;
    pub const SCREEN_HEIGHT: f64 = 600.0;

    /// Height of a platform tile
    pub const PLATFORM_BLOCK_HEIGHT: f64 = 20.0;
    /// Width of a platform tile
    pub const PLATFORM_BLOCK_WIDTH: f64 = 30.0;

    /// Player box
    pub const PLAYER_WIDTH: f64 = 20.0;
    pub const PLAYER_HEIGHT: f64 = 29.0;
    /// Spawn position in screen space
    pub const PLAYER_SPAWN_X: f64 = 30.0;
    pub const PLAYER_SPAWN_Y: f64 = SCREEN_HEIGHT - PLATFORM_BLOCK_HEIGHT - 30.0;

    /// Horizontal speed (pixels per step)
    pub const MOVE_SPEED: f64 = 1.5;
    /// Upward velocity applied by a jump (pixels per step)
    pub const JUMP_SPEED: f64 = 4.0;
    /// Downward acceleration (pixels per step²)
    pub const GRAVITY: f64 = 0.08;
    /// Terminal fall speed (pixels per step)
    pub const MAX_FALL_SPEED: f64 = 6.0;
    /// Distance from the ground that still counts as standing on it
    pub const GROUND_TOLERANCE: f64 = 0.5;

    /// Ceiling below which the level top is considered open
    pub const FINISH_CEILING_EPSILON: f64 = 1e-10;
    /// Player must be within this many heights of the level top to finish
    pub const FINISH_HEIGHT_FACTOR: f64 = 2.0;

    /// Terms in the progress estimate
    pub const PROGRESS_ITERATIONS: u32 = 3;

    /// Scroll speed cap per step when the player sits on the band edge
    pub const SLIDE_SPEED: f64 = 10.0;
    /// Scroll deltas at or below this are ignored
    pub const SCROLL_EPSILON: f64 = 1e-7;
}

/// Convert a viewport y coordinate to world space
#[inline]
pub fn to_world_y(screen_y: f64, scroll_offset: f64) -> f64 {
    screen_y + scroll_offset
}

/// Convert a world y coordinate to viewport space
#[inline]
pub fn to_screen_y(world_y: f64, scroll_offset: f64) -> f64 {
    world_y - scroll_offset
}

/// Whether a box spanning `[y, y + height)` in viewport space is on screen
#[inline]
pub fn is_on_screen(screen_y: f64, height: f64, viewport_height: f64) -> bool {
    0.0 <= screen_y + height && screen_y < viewport_height
}
