//! Fixed timestep simulation tick
//!
//! One tick runs scroll, player, triggers and progress in that order.

use crate::level::LevelGeometry;
use crate::platform::HeldKeys;

use super::player::update_player;
use super::scroll::update_scroll;
use super::state::{PlatformerState, SimEvent};
use super::trigger::resolve_triggers;

/// Advance the simulation by one step
///
/// Does nothing while an overlay is shown. Returns the events raised during
/// the step, in the order they happened.
pub fn tick<L: LevelGeometry + ?Sized>(
    state: &mut PlatformerState,
    level: &L,
    keys: &HeldKeys,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    if !state.is_running() {
        return events;
    }

    state.time_steps += 1;

    update_scroll(state);

    if update_player(state, level, keys) && !state.finished {
        state.finished = true;
        log::info!("Level finished after {} steps", state.time_steps);
        events.push(SimEvent::Finished);
    }

    if let Some(event) = resolve_triggers(state, level) {
        events.push(event);
    }

    state.progress = state.compute_progress();

    events
}
