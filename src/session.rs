//! Level session runner
//!
//! Owns one level attempt: the level geometry, the simulation state, the loop
//! clock, the held keys and the level-specific hooks. The host calls
//! [`LevelSession::frame`] from its timer and forwards key events.

use crate::level::LevelGeometry;
use crate::persistence::{PersistenceError, SaveSlots, SessionSave};
use crate::platform::{HeldKeys, Key};
use crate::settings::Settings;
use crate::sim::{LoopClock, PlatformerState, SetupError, SimEvent, tick};

/// Level-specific reactions to simulation events
pub trait LevelHooks {
    /// A trigger was consumed; `payload` identifies what it was
    fn on_special(&mut self, state: &mut PlatformerState, payload: i32) {
        let _ = state;
        log::info!("Unhandled special {}", payload);
    }

    /// The player reached the top of the level
    fn on_finish(&mut self, state: &mut PlatformerState) {
        log::info!("Level finished at step {}", state.time_steps);
    }
}

/// Hooks that only log
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl LevelHooks for NoHooks {}

pub struct LevelSession<L: LevelGeometry, H: LevelHooks> {
    level_number: usize,
    level: L,
    state: PlatformerState,
    clock: LoopClock,
    keys: HeldKeys,
    hooks: H,
}

impl<L: LevelGeometry, H: LevelHooks> LevelSession<L, H> {
    /// Build a stopped session; fails on invalid settings or a level that cannot be shown
    pub fn new(level_number: usize, level: L, settings: Settings, hooks: H) -> Result<Self, SetupError> {
        let clock = LoopClock::from_settings(&settings);
        let state = PlatformerState::new(&level, settings)?;
        Ok(Self {
            level_number,
            level,
            state,
            clock,
            keys: HeldKeys::new(),
            hooks,
        })
    }

    pub fn level_number(&self) -> usize {
        self.level_number
    }

    pub fn level(&self) -> &L {
        &self.level
    }

    pub fn state(&self) -> &PlatformerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PlatformerState {
        &mut self.state
    }

    pub fn clock(&self) -> &LoopClock {
        &self.clock
    }

    pub fn keys(&self) -> &HeldKeys {
        &self.keys
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Run the steps owed for a frame at `now` (nanoseconds); returns the count
    pub fn frame(&mut self, now: u64) -> u64 {
        let steps = self.clock.advance(now);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Run exactly one step and dispatch its events
    pub fn step(&mut self) {
        let events = tick(&mut self.state, &self.level, &self.keys);
        for event in events {
            match event {
                SimEvent::Finished => self.hooks.on_finish(&mut self.state),
                SimEvent::Special { payload, .. } => {
                    self.hooks.on_special(&mut self.state, payload)
                }
            }
        }
    }

    pub fn key_pressed(&mut self, key: Key) {
        match key.as_move() {
            Some(held) => self.keys.press(held),
            None => self.state.toggle_escape(),
        }
    }

    pub fn key_released(&mut self, key: Key) {
        if let Some(held) = key.as_move() {
            self.keys.release(held);
        }
    }

    pub fn save(&self) -> SessionSave {
        self.state.save()
    }

    pub fn load(&mut self, save: &SessionSave) {
        self.state.load(&self.level, save);
    }

    /// Leave the level: stop the loop and store the attempt in its slot
    pub fn on_exit(&mut self, slots: &mut SaveSlots) -> Result<(), PersistenceError> {
        self.stop();
        self.keys.clear();
        slots.store(self.level_number, self.save())?;
        log::info!("Level {} saved on exit", self.level_number);
        Ok(())
    }

    /// Enter the level: restore its slot if there is one and start the loop
    ///
    /// Returns whether a save was restored.
    pub fn on_enter(&mut self, slots: &SaveSlots) -> Result<bool, PersistenceError> {
        let restored = match slots.get(self.level_number)? {
            Some(save) => {
                self.load(save);
                true
            }
            None => false,
        };
        self.start();
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Tile, TileLevel};
    use crate::sim::PauseReason;

    const Q: u64 = 5_000_000;

    #[derive(Default)]
    struct Recorder {
        specials: Vec<i32>,
        finishes: usize,
    }

    impl LevelHooks for Recorder {
        fn on_special(&mut self, state: &mut PlatformerState, payload: i32) {
            self.specials.push(payload);
            state.scores.record(payload * 10);
            state.set_overlay(PauseReason::Question { payload }).unwrap();
        }

        fn on_finish(&mut self, _state: &mut PlatformerState) {
            self.finishes += 1;
        }
    }

    /// Trigger right next to the spawn point
    fn level() -> TileLevel {
        let mut builder = TileLevel::builder(10, 30, 30.0, 30.0).unwrap();
        builder.fill_row(29, 0..10, Tile::Solid).unwrap();
        builder.fill_row(2, 0..5, Tile::Solid).unwrap();
        builder.set(2, 28, Tile::Trigger(6)).unwrap();
        builder.build()
    }

    fn session() -> LevelSession<TileLevel, Recorder> {
        LevelSession::new(1, level(), Settings::with_viewport(300.0, 300.0), Recorder::default())
            .unwrap()
    }

    #[test]
    fn test_frames_before_start_do_nothing() {
        let mut session = session();
        assert_eq!(session.frame(0), 0);
        assert_eq!(session.frame(10 * Q), 0);
        assert_eq!(session.state().time_steps, 0);
    }

    #[test]
    fn test_frame_runs_clock_steps() {
        let mut session = session();
        session.start();
        session.start();
        assert_eq!(session.frame(1_000), 1);
        assert_eq!(session.frame(1_000 + 3 * Q), 3);
        assert_eq!(session.state().time_steps, 4);
    }

    #[test]
    fn test_escape_pauses_and_resumes() {
        let mut session = session();
        session.start();
        session.frame(0);

        session.key_pressed(Key::Escape);
        session.key_released(Key::Escape);
        assert_eq!(session.state().overlay(), Some(PauseReason::EscapeMenu));
        session.frame(10 * Q);
        assert_eq!(session.state().time_steps, 1);

        session.key_pressed(Key::Escape);
        assert!(session.state().is_running());
        session.frame(12 * Q);
        assert_eq!(session.state().time_steps, 3);
    }

    #[test]
    fn test_held_keys_follow_events() {
        let mut session = session();
        session.key_pressed(Key::Right);
        session.key_pressed(Key::Up);
        session.key_released(Key::Up);
        assert_eq!(*session.keys(), HeldKeys { up: false, left: false, right: true });
    }

    #[test]
    fn test_special_reaches_hooks_and_pauses() {
        let mut session = session();
        session.start();
        session.key_pressed(Key::Right);
        session.frame(0);
        session.frame(100 * Q);

        assert_eq!(session.hooks().specials, vec![6]);
        assert_eq!(session.state().scores.as_slice(), &[60]);
        assert_eq!(
            session.state().overlay(),
            Some(PauseReason::Question { payload: 6 })
        );

        // Frozen until the question is answered
        let steps = session.state().time_steps;
        session.frame(200 * Q);
        assert_eq!(session.state().time_steps, steps);

        session.state_mut().remove_overlay().unwrap();
        session.frame(201 * Q);
        assert_eq!(session.state().time_steps, steps + 1);
    }

    #[test]
    fn test_exit_and_enter_restore_attempt() {
        let mut session = session();
        let mut slots = SaveSlots::new(3);
        assert!(!session.on_enter(&slots).unwrap());
        assert!(session.is_running());

        session.key_pressed(Key::Right);
        session.frame(0);
        session.frame(100 * Q);
        session.state_mut().remove_overlay().unwrap();
        session.on_exit(&mut slots).unwrap();
        assert!(!session.is_running());
        assert!(session.keys().is_empty());

        let mut again = LevelSession::new(
            1,
            level(),
            Settings::with_viewport(300.0, 300.0),
            Recorder::default(),
        )
        .unwrap();
        assert!(again.on_enter(&slots).unwrap());
        assert_eq!(again.state().consumed, session.state().consumed);
        assert_eq!(again.state().scores.as_slice(), &[60]);
        assert_eq!(again.state().player_world_pos(), session.state().player_world_pos());
        assert_eq!(again.state().scene.live_triggers().count(), 0);
    }

    #[test]
    fn test_new_rejects_zero_step_quantum() {
        let mut settings = Settings::with_viewport(300.0, 300.0);
        settings.step_nanos = 0;
        assert!(matches!(
            LevelSession::new(1, level(), settings, NoHooks),
            Err(SetupError::Settings(_))
        ));
    }

    #[test]
    fn test_exit_into_missing_slot() {
        let mut session =
            LevelSession::new(5, level(), Settings::with_viewport(300.0, 300.0), NoHooks).unwrap();
        let mut slots = SaveSlots::new(2);
        assert!(matches!(
            session.on_exit(&mut slots),
            Err(PersistenceError::InvalidSlot { level: 5, .. })
        ));
    }
}
