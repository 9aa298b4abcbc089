//! Simulation state and core entity types
//!
//! Everything a save/restore round trip must reproduce lives here.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::Aabb;
use crate::level::{EntityId, LevelError, LevelGeometry, validate_for_viewport};
use crate::scores::ScoreCard;
use crate::settings::{Settings, SettingsError};
use crate::{is_on_screen, to_screen_y};

/// Why the simulation is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    /// Escape/pause menu
    EscapeMenu,
    /// A trigger handler is asking a question
    Question { payload: i32 },
    /// Level finished, waiting on the shell
    LevelComplete,
}

/// Current phase of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SimPhase {
    #[default]
    Running,
    /// An overlay is shown; steps are skipped
    Paused(PauseReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("an overlay is already shown ({current:?})")]
    AlreadyShown { current: PauseReason },
    #[error("no overlay is shown")]
    NotShown,
}

/// Why a level attempt could not be set up
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Things that happened during a step, handed to the level hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// Player reached the top of the level
    Finished,
    /// Player touched a trigger
    Special { id: EntityId, payload: i32 },
}

/// A movable box in viewport space with deferred movement
///
/// Movement requests accumulate in a pending displacement that is applied
/// in one go by [`Entity::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Top-left corner
    pub pos: DVec2,
    pub width: f64,
    pub height: f64,
    /// Vertical speed (pixels per step, positive is down)
    #[serde(default)]
    pub vel_y: f64,
    #[serde(skip)]
    pending: DVec2,
}

impl Entity {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            width,
            height,
            vel_y: 0.0,
            pending: DVec2::ZERO,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::at(self.pos, self.width, self.height)
    }

    /// Accumulate a displacement for the next commit
    pub fn move_by(&mut self, delta: DVec2) {
        self.pending += delta;
    }

    pub fn pending(&self) -> DVec2 {
        self.pending
    }

    /// Position after the pending displacement is applied
    pub fn next_pos(&self) -> DVec2 {
        self.pos + self.pending
    }

    /// Apply and clear the pending displacement
    pub fn commit(&mut self) {
        self.pos += self.pending;
        self.pending = DVec2::ZERO;
    }

    /// Drop any pending displacement and vertical speed
    pub fn halt(&mut self) {
        self.pending = DVec2::ZERO;
        self.vel_y = 0.0;
    }

    /// Whether the entity rests on `ground` (the y its top has when standing)
    pub fn on_ground(&self, ground: f64, tolerance: f64) -> bool {
        (self.next_pos().y - ground).abs() <= tolerance
    }

    pub fn jump(&mut self, speed: f64) {
        self.vel_y = -speed;
    }

    /// Move left by up to `speed`, never past `bound`
    pub fn move_left(&mut self, bound: f64, speed: f64) {
        let x = self.next_pos().x;
        let target = (x - speed).max(bound);
        self.move_by(DVec2::new(target - x, 0.0));
    }

    /// Move right by up to `speed`, never past `bound` (the rightmost left edge)
    pub fn move_right(&mut self, bound: f64, speed: f64) {
        let x = self.next_pos().x;
        let target = (x + speed).min(bound);
        self.move_by(DVec2::new(target - x, 0.0));
    }

    /// Apply gravity and fall, stopping at `ground` and `ceiling`
    pub fn fall(&mut self, ground: f64, ceiling: f64, gravity: f64, max_fall_speed: f64) {
        self.vel_y = (self.vel_y + gravity).min(max_fall_speed);

        let y = self.next_pos().y;
        let mut target = y + self.vel_y;
        if target >= ground {
            target = ground;
            self.vel_y = self.vel_y.min(0.0);
        }
        if target <= ceiling {
            target = ceiling;
            self.vel_y = self.vel_y.max(0.0);
        }
        self.move_by(DVec2::new(0.0, target - y));
    }
}

/// A level block placed in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneEntity {
    pub id: EntityId,
    /// Viewport-space box
    pub entity: Entity,
    /// Where the block sits in the level
    pub world: Aabb,
    pub trigger: bool,
    pub visible: bool,
    /// False once removed from the scene
    pub live: bool,
}

/// Arena of level blocks addressed by [`EntityId`]
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entries: Vec<SceneEntity>,
}

impl Scene {
    /// Place every level block for the given scroll offset
    pub fn from_level<L: LevelGeometry + ?Sized>(
        level: &L,
        scroll_offset: f64,
        viewport_height: f64,
    ) -> Self {
        let entries = level
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, block)| {
                let screen_y = to_screen_y(block.rect.y, scroll_offset);
                SceneEntity {
                    id: EntityId(i as u32),
                    entity: Entity::new(block.rect.x, screen_y, block.rect.width, block.rect.height),
                    world: block.rect,
                    trigger: block.trigger,
                    visible: is_on_screen(screen_y, block.rect.height, viewport_height),
                    live: true,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entries.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entries.iter()
    }

    /// Live trigger blocks, in level order
    pub fn live_triggers(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entries.iter().filter(|e| e.trigger && e.live)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|e| e.live)
    }

    /// Remove a block from the scene; false if it was already gone
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.entries.get_mut(id.index()) {
            Some(entry) if entry.live => {
                entry.live = false;
                true
            }
            _ => false,
        }
    }

    /// Put every removed block back
    pub fn restore_all(&mut self) {
        for entry in &mut self.entries {
            entry.live = true;
        }
    }

    /// Move every block up by `delta` and refresh visibility
    pub fn shift(&mut self, delta: f64, viewport_height: f64) {
        for entry in &mut self.entries {
            entry.entity.pos.y -= delta;
            entry.visible =
                is_on_screen(entry.entity.pos.y, entry.entity.height, viewport_height);
        }
    }
}

/// A trigger that has been consumed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumedTrigger {
    pub id: EntityId,
    /// World-space top-left corner of the trigger
    pub world_pos: DVec2,
}

/// Complete simulation state for one level attempt
#[derive(Debug, Clone)]
pub struct PlatformerState {
    pub settings: Settings,
    /// World y shown at the top of the viewport
    pub scroll_offset: f64,
    /// Cached level height
    pub world_height: f64,
    pub player: Entity,
    pub scene: Scene,
    /// Consumed triggers in consumption order
    pub consumed: Vec<ConsumedTrigger>,
    pub scores: ScoreCard,
    pub phase: SimPhase,
    /// Level completion in [0, 1]
    pub progress: f64,
    /// Set once the finish event has been raised
    pub finished: bool,
    /// Steps simulated while running
    pub time_steps: u64,
}

impl PlatformerState {
    /// Fresh state with the viewport at the bottom of the level
    pub fn new<L: LevelGeometry + ?Sized>(level: &L, settings: Settings) -> Result<Self, SetupError> {
        settings.validate()?;
        validate_for_viewport(level, settings.viewport_height)?;

        let world_height = level.world_height();
        let scroll_offset = world_height - settings.viewport_height;
        let scene = Scene::from_level(level, scroll_offset, settings.viewport_height);
        let player = Entity::new(
            settings.spawn_x,
            settings.spawn_y,
            settings.player_width,
            settings.player_height,
        );

        log::info!(
            "Level ready: height={} blocks={} triggers={}",
            world_height,
            scene.len(),
            scene.live_triggers().count()
        );

        let mut state = Self {
            settings,
            scroll_offset,
            world_height,
            player,
            scene,
            consumed: Vec::new(),
            scores: ScoreCard::new(),
            phase: SimPhase::Running,
            progress: 0.0,
            finished: false,
            time_steps: 0,
        };
        state.progress = state.compute_progress();
        Ok(state)
    }

    pub fn viewport_height(&self) -> f64 {
        self.settings.viewport_height
    }

    /// Largest valid scroll offset
    pub fn max_scroll(&self) -> f64 {
        (self.world_height - self.viewport_height()).max(0.0)
    }

    /// Player's top-left corner in world space
    pub fn player_world_pos(&self) -> DVec2 {
        DVec2::new(
            self.player.pos.x,
            crate::to_world_y(self.player.pos.y, self.scroll_offset),
        )
    }

    pub fn is_running(&self) -> bool {
        self.phase == SimPhase::Running
    }

    /// The overlay currently pausing the simulation
    pub fn overlay(&self) -> Option<PauseReason> {
        match self.phase {
            SimPhase::Running => None,
            SimPhase::Paused(reason) => Some(reason),
        }
    }

    /// Show an overlay; only one may be shown at a time
    pub fn set_overlay(&mut self, reason: PauseReason) -> Result<(), OverlayError> {
        if let SimPhase::Paused(current) = self.phase {
            log::warn!("Overlay {:?} requested while {:?} is shown", reason, current);
            return Err(OverlayError::AlreadyShown { current });
        }
        self.phase = SimPhase::Paused(reason);
        Ok(())
    }

    /// Hide the current overlay and resume
    pub fn remove_overlay(&mut self) -> Result<PauseReason, OverlayError> {
        match self.phase {
            SimPhase::Paused(reason) => {
                self.phase = SimPhase::Running;
                Ok(reason)
            }
            SimPhase::Running => {
                log::warn!("Overlay removal requested but none is shown");
                Err(OverlayError::NotShown)
            }
        }
    }

    /// Escape opens the pause menu, or closes it when it is the one shown
    pub fn toggle_escape(&mut self) {
        match self.phase {
            SimPhase::Running => {
                let _ = self.set_overlay(PauseReason::EscapeMenu);
            }
            SimPhase::Paused(PauseReason::EscapeMenu) => {
                let _ = self.remove_overlay();
            }
            SimPhase::Paused(_) => {}
        }
    }

    /// Whether a trigger has already been consumed
    pub fn is_consumed(&self, id: EntityId) -> bool {
        self.consumed.iter().any(|c| c.id == id)
    }

    pub(crate) fn compute_progress(&self) -> f64 {
        super::progress::estimate_progress(
            self.scroll_offset,
            self.viewport_height(),
            self.world_height,
            self.settings.progress_iterations,
        )
    }
}
