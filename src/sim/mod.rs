//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - Level geometry is read-only; the state owns everything that changes
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod player;
pub mod progress;
pub mod scroll;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod trigger;

pub use clock::LoopClock;
pub use collision::{Aabb, clamp_to_bounds};
pub use player::{StepBounds, step_bounds, update_player};
pub use progress::estimate_progress;
pub use scroll::{shift_view, update_scroll};
pub use state::{
    ConsumedTrigger, Entity, OverlayError, PauseReason, PlatformerState, Scene, SceneEntity,
    SetupError, SimEvent, SimPhase,
};
pub use tick::tick;
pub use trigger::resolve_triggers;
