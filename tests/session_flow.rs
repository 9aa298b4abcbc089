//! End-to-end level sessions driven through the public API

use sky_climb::level::{Tile, TileLevel, generate_tower};
use sky_climb::persistence::{SavePoint, SaveSlots, SessionSave};
use sky_climb::platform::Key;
use sky_climb::sim::{PauseReason, PlatformerState};
use sky_climb::{LevelHooks, LevelSession, ScoreCard, Settings};

const Q: u64 = 5_000_000;

#[derive(Default)]
struct Tally {
    specials: Vec<i32>,
    finishes: usize,
}

impl LevelHooks for Tally {
    fn on_special(&mut self, state: &mut PlatformerState, payload: i32) {
        self.specials.push(payload);
        state.scores.record(payload);
    }

    fn on_finish(&mut self, _state: &mut PlatformerState) {
        self.finishes += 1;
    }
}

/// 10 x 30 cells of 30px: floor, three floor triggers, summit ledge on row 2
fn level() -> TileLevel {
    let mut builder = TileLevel::builder(10, 30, 30.0, 30.0).unwrap();
    builder.fill_row(29, 0..10, Tile::Solid).unwrap();
    builder.fill_row(2, 0..5, Tile::Solid).unwrap();
    builder.set(3, 28, Tile::Trigger(1)).unwrap();
    builder.set(5, 28, Tile::Trigger(2)).unwrap();
    builder.set(7, 28, Tile::Trigger(3)).unwrap();
    builder.build()
}

fn session() -> LevelSession<TileLevel, Tally> {
    LevelSession::new(1, level(), Settings::with_viewport(300.0, 300.0), Tally::default()).unwrap()
}

#[test]
fn walk_save_to_disk_and_resume() {
    let mut slots = SaveSlots::new(2);
    let mut first = session();
    first.on_enter(&slots).unwrap();
    first.key_pressed(Key::Right);
    first.frame(0);
    // 91 steps at 1.5px: right edge at 186.5, short of the trigger at x 210
    first.frame(90 * Q);
    assert_eq!(first.hooks().specials, vec![1, 2]);
    first.on_exit(&mut slots).unwrap();

    let dir = std::env::temp_dir().join(format!("sky-climb-flow-{}", std::process::id()));
    let path = dir.join("saves.json");
    slots.write_to(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"scrollOffset\""));
    assert!(text.contains("\"removedNodes\""));
    let restored = SaveSlots::read_from(&path).unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    let mut second = session();
    assert!(second.on_enter(&restored).unwrap());
    assert_eq!(second.state().consumed, first.state().consumed);
    assert_eq!(second.state().scores.as_slice(), &[1, 2]);

    // Keep walking: only the remaining trigger fires
    second.key_pressed(Key::Right);
    second.frame(0);
    second.frame(200 * Q);
    assert_eq!(second.hooks().specials, vec![3]);
    assert_eq!(second.state().scores.as_slice(), &[1, 2, 3]);
    assert_eq!(second.state().scene.live_triggers().count(), 0);
}

#[test]
fn summit_finishes_once() {
    let mut session = session();
    let start = SessionSave {
        scroll_offset: 0.0,
        player: SavePoint { x: 30.0, y: 60.0 - 29.0 },
        scores: ScoreCard::new(),
        removed_nodes: Vec::new(),
    };
    session.load(&start);
    session.start();
    session.frame(0);
    session.frame(50 * Q);

    assert_eq!(session.hooks().finishes, 1);
    assert!(session.state().finished);
    assert_eq!(session.state().progress, 1.0);
}

#[test]
fn pause_menu_freezes_the_level() {
    let mut session = session();
    session.start();
    session.key_pressed(Key::Right);
    session.frame(0);
    let x = session.state().player.pos.x;

    session.key_pressed(Key::Escape);
    assert_eq!(session.state().overlay(), Some(PauseReason::EscapeMenu));
    session.frame(40 * Q);
    assert_eq!(session.state().player.pos.x, x);

    session.key_pressed(Key::Escape);
    session.frame(41 * Q);
    assert!(session.state().player.pos.x > x);
}

#[test]
fn generated_towers_replay_identically() {
    let settings = Settings::default();
    let run = || {
        let tower = generate_tower(42, 10, &settings).unwrap();
        let mut session =
            LevelSession::new(1, tower.level, settings.clone(), Tally::default()).unwrap();
        session.start();
        let script = [
            (Key::Right, true),
            (Key::Up, true),
            (Key::Up, false),
            (Key::Right, false),
            (Key::Left, true),
            (Key::Up, true),
        ];
        let mut now = 0;
        for (key, down) in script.iter().cycle().take(60) {
            if *down {
                session.key_pressed(*key);
            } else {
                session.key_released(*key);
            }
            session.frame(now);
            now += 7 * Q + Q / 3;
        }
        session.save()
    };
    assert_eq!(run(), run());
}
