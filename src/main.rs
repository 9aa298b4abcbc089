//! Sky Climb headless demo
//!
//! Generates a seeded tower and lets a scripted climber play it with
//! synthetic 60 Hz frame timestamps. Halfway through, the attempt is saved
//! to disk, reloaded into a fresh session and finished from there.
//!
//! Usage: `sky-climb [settings.json] [seed]`

use std::path::{Path, PathBuf};

use sky_climb::level::{Ledge, Tower, TileLevel, generate_tower};
use sky_climb::persistence::SaveSlots;
use sky_climb::platform::{HeldKeys, Key, MoveKey};
use sky_climb::sim::{PauseReason, PlatformerState, step_bounds};
use sky_climb::{LevelHooks, LevelSession, Settings};

/// Synthetic frame interval (60 Hz)
const FRAME_NANOS: u64 = 16_666_667;
/// Give up after this many frames
const MAX_FRAMES: u64 = 60 * 60 * 5;
/// Frame at which the attempt is saved and reloaded
const SAVE_FRAME: u64 = 60 * 20;
/// Frame at which the climber opens and closes the pause menu
const PAUSE_FRAME: u64 = 60 * 5;
const PAUSE_FRAMES: u64 = 30;

const DEFAULT_SEED: u64 = 0x5EED;
const FLOORS: usize = 12;

/// Scores trigger questions and pauses the level while they are "asked"
#[derive(Debug, Default)]
struct QuizHooks {
    asked: Vec<i32>,
}

impl LevelHooks for QuizHooks {
    fn on_special(&mut self, state: &mut PlatformerState, payload: i32) {
        log::info!("Question {} asked", payload);
        self.asked.push(payload);
        state.scores.record(payload * 10);
        let _ = state.set_overlay(PauseReason::Question { payload });
    }

    fn on_finish(&mut self, state: &mut PlatformerState) {
        log::info!("Summit reached after {} steps", state.time_steps);
        let _ = state.set_overlay(PauseReason::LevelComplete);
    }
}

/// Scripted player: stand beside the next ledge up, jump straight up and
/// drift onto it once the feet have cleared its top
struct Climber {
    ledges: Vec<Ledge>,
    cell_width: f64,
    cell_height: f64,
    level_width: f64,
    target: Option<usize>,
}

impl Climber {
    fn new(tower: &Tower) -> Self {
        let (cell_width, cell_height) = tower.level.cell_size();
        Self {
            ledges: tower.ledges.clone(),
            cell_width,
            cell_height,
            level_width: tower.level.cols() as f64 * cell_width,
            target: None,
        }
    }

    fn decide(&mut self, session: &LevelSession<TileLevel, QuizHooks>) -> HeldKeys {
        let state = session.state();
        let bounds = step_bounds(state, session.level());
        let grounded = state
            .player
            .on_ground(bounds.ground, state.settings.ground_tolerance);
        let pos = state.player_world_pos();
        let feet = pos.y + state.player.height;

        if grounded {
            self.target = self
                .ledges
                .iter()
                .position(|l| l.row as f64 * self.cell_height < feet - 1.0);
        }
        let Some(ledge) = self.target.map(|i| &self.ledges[i]) else {
            return HeldKeys::new();
        };

        let top = ledge.row as f64 * self.cell_height;
        let left = ledge.cols.start as f64 * self.cell_width;
        let right = ledge.cols.end as f64 * self.cell_width;
        // Free space beside the ledge, and the way onto it
        let (zone, toward) = if (left + right) / 2.0 < self.level_width / 2.0 {
            ((right + 1.0)..=(right + 9.0), MoveKey::Left)
        } else {
            let w = state.player.width;
            ((left - w - 9.0)..=(left - w - 1.0), MoveKey::Right)
        };

        if !grounded {
            // Moving sideways any earlier hits the ledge from below
            return if feet < top {
                HeldKeys::of(&[toward])
            } else {
                HeldKeys::new()
            };
        }
        if pos.x < *zone.start() {
            HeldKeys::of(&[MoveKey::Right])
        } else if pos.x > *zone.end() {
            HeldKeys::of(&[MoveKey::Left])
        } else {
            HeldKeys::of(&[MoveKey::Up])
        }
    }
}

/// Forward the difference between held and wanted keys as key events
fn send_keys(session: &mut LevelSession<TileLevel, QuizHooks>, want: HeldKeys) {
    let held = *session.keys();
    for (key, mv) in [
        (Key::Up, MoveKey::Up),
        (Key::Left, MoveKey::Left),
        (Key::Right, MoveKey::Right),
    ] {
        match (held.contains(mv), want.contains(mv)) {
            (false, true) => session.key_pressed(key),
            (true, false) => session.key_released(key),
            _ => {}
        }
    }
}

fn new_session(
    tower: &Tower,
    settings: &Settings,
) -> Result<LevelSession<TileLevel, QuizHooks>, Box<dyn std::error::Error>> {
    Ok(LevelSession::new(
        1,
        tower.level.clone(),
        settings.clone(),
        QuizHooks::default(),
    )?)
}

/// Play a tower to the summit or until `MAX_FRAMES`, saving to and reloading
/// from `save_path` on the way
fn climb(
    tower: &Tower,
    settings: &Settings,
    save_path: &Path,
) -> Result<LevelSession<TileLevel, QuizHooks>, Box<dyn std::error::Error>> {
    let mut climber = Climber::new(tower);
    let mut slots = SaveSlots::new(1);

    let mut session = new_session(tower, settings)?;
    session.on_enter(&slots)?;

    let mut now = 0u64;
    for frame in 0..MAX_FRAMES {
        if frame == PAUSE_FRAME || frame == PAUSE_FRAME + PAUSE_FRAMES {
            session.key_pressed(Key::Escape);
            session.key_released(Key::Escape);
            log::info!("Pause menu: {:?}", session.state().overlay());
        }

        if frame == SAVE_FRAME {
            session.on_exit(&mut slots)?;
            slots.write_to(save_path)?;
            let restored = SaveSlots::read_from(save_path)?;

            let asked = std::mem::take(&mut session.hooks_mut().asked);
            session = new_session(tower, settings)?;
            session.hooks_mut().asked = asked;
            let loaded = session.on_enter(&restored)?;
            log::info!(
                "Reloaded from {} (restored: {}, progress {:.3})",
                save_path.display(),
                loaded,
                session.state().progress
            );
        }

        let want = climber.decide(&session);
        send_keys(&mut session, want);
        session.frame(now);
        now += FRAME_NANOS;

        match session.state().overlay() {
            Some(PauseReason::Question { payload }) => {
                log::info!("Answering question {}", payload);
                let _ = session.state_mut().remove_overlay();
            }
            Some(PauseReason::LevelComplete) => break,
            _ => {}
        }

        if frame % 300 == 0 {
            log::debug!(
                "frame {} offset {:.1} progress {:.3}",
                frame,
                session.state().scroll_offset,
                session.state().progress
            );
        }
    }

    session.stop();
    Ok(session)
}

fn remove_saves(save_path: &Path) {
    let _ = std::fs::remove_file(save_path);
    let mut backup = save_path.as_os_str().to_os_string();
    backup.push(".bak");
    let _ = std::fs::remove_file(backup);
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map(PathBuf::from);
    let seed = match args.next() {
        Some(s) => s.parse()?,
        None => DEFAULT_SEED,
    };

    let settings = Settings::load_or_default(settings_path.as_deref());
    let tower = generate_tower(seed, FLOORS, &settings)?;
    let save_path = std::env::temp_dir().join("sky-climb-saves.json");

    let result = climb(&tower, &settings, &save_path);
    remove_saves(&save_path);
    let session = result?;

    let state = session.state();
    log::info!(
        "Done: finished={} progress={:.3} steps={} questions={:?} score={}",
        state.finished,
        state.progress,
        state.time_steps,
        session.hooks().asked,
        state.scores.total()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Sky Climb (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climber_reaches_the_summit() {
        let settings = Settings::default();
        let tower = generate_tower(DEFAULT_SEED, FLOORS, &settings).unwrap();
        let save_path =
            std::env::temp_dir().join(format!("sky-climb-demo-{}.json", std::process::id()));

        let result = climb(&tower, &settings, &save_path);
        remove_saves(&save_path);
        let session = result.unwrap();

        let state = session.state();
        assert!(state.finished);
        assert_eq!(state.overlay(), Some(PauseReason::LevelComplete));
        assert_eq!(state.scores.len(), session.hooks().asked.len());
    }
}
