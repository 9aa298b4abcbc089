//! Save and restore of a level attempt
//!
//! A save holds world-space positions only; scene identities are recovered
//! from the level on load, so a save stays valid across runs as long as the
//! level layout is the same.

use glam::DVec2;

use crate::level::LevelGeometry;
use crate::persistence::{SavePoint, SessionSave};
use crate::to_screen_y;

use super::state::{ConsumedTrigger, PlatformerState};

impl PlatformerState {
    /// Snapshot the scroll offset, player, scores and consumed triggers
    pub fn save(&self) -> SessionSave {
        SessionSave {
            scroll_offset: self.scroll_offset,
            player: self.player_world_pos().into(),
            scores: self.scores.clone(),
            removed_nodes: self.consumed.iter().map(|c| c.world_pos.into()).collect(),
        }
    }

    /// Rebuild the live state from a save
    ///
    /// Loading the same save again leaves the state unchanged. Entries that no
    /// longer resolve to a trigger are skipped with a warning.
    pub fn load<L: LevelGeometry + ?Sized>(&mut self, level: &L, save: &SessionSave) {
        let max_scroll = self.max_scroll();
        let offset = if (0.0..=max_scroll).contains(&save.scroll_offset) {
            save.scroll_offset
        } else {
            log::warn!(
                "Saved scroll offset {} outside [0, {}], clamping",
                save.scroll_offset,
                max_scroll
            );
            save.scroll_offset.clamp(0.0, max_scroll)
        };

        let delta = offset - self.scroll_offset;
        self.scroll_offset = offset;
        self.scene.shift(delta, self.viewport_height());

        let player = DVec2::from(save.player);
        self.player.pos = DVec2::new(player.x, to_screen_y(player.y, offset));
        self.player.halt();

        self.scene.restore_all();
        self.consumed.clear();
        for point in &save.removed_nodes {
            self.restore_consumed(level, *point);
        }

        self.scores = save.scores.clone();
        self.finished = false;
        self.progress = self.compute_progress();

        log::info!(
            "Session restored: offset={} consumed={} scores={}",
            self.scroll_offset,
            self.consumed.len(),
            self.scores.len()
        );
    }

    fn restore_consumed<L: LevelGeometry + ?Sized>(&mut self, level: &L, point: SavePoint) {
        let Some(id) = level.entity_at(point.x, point.y) else {
            log::warn!("Saved trigger at ({}, {}) not found in level", point.x, point.y);
            return;
        };
        let Some(entry) = self.scene.get(id) else {
            log::warn!("Saved trigger {:?} not in scene", id);
            return;
        };
        if !entry.trigger {
            log::warn!("Saved position ({}, {}) is not a trigger", point.x, point.y);
            return;
        }
        let world_pos = entry.world.origin();

        // Duplicate entries in the save are already gone
        self.scene.remove(id);
        if !self.is_consumed(id) {
            self.consumed.push(ConsumedTrigger { id, world_pos });
        }
    }
}
