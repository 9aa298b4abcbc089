//! Trigger consumption
//!
//! A trigger touched by the player leaves the scene exactly once. At most
//! one trigger is consumed per step; others still touching the player are
//! picked up on later steps.

use crate::level::LevelGeometry;
use crate::to_world_y;

use super::state::{ConsumedTrigger, PlatformerState, SimEvent};

/// Consume the first live trigger overlapping the player
pub fn resolve_triggers<L: LevelGeometry + ?Sized>(
    state: &mut PlatformerState,
    level: &L,
) -> Option<SimEvent> {
    let player_box = state.player.bounds();
    let hits: Vec<_> = state
        .scene
        .live_triggers()
        .filter(|t| t.entity.bounds().intersects(&player_box))
        .map(|t| (t.id, t.entity.bounds().center(), t.world.origin()))
        .collect();

    for (id, screen_center, world_pos) in hits {
        // Already gone: nothing to hand out
        if !state.scene.remove(id) {
            continue;
        }
        if !state.is_consumed(id) {
            state.consumed.push(ConsumedTrigger { id, world_pos });
        }

        let world_center_y = to_world_y(screen_center.y, state.scroll_offset);
        let payload = -level.position_index(screen_center.x, world_center_y);
        log::debug!("Trigger {:?} consumed, payload {}", id, payload);
        return Some(SimEvent::Special { id, payload });
    }
    None
}
