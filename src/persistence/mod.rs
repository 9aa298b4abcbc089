//! Session saves
//!
//! Features:
//! - Mid-level snapshot (`SessionSave`) with a stable JSON layout
//! - One save slot per level (`SaveSlots`)
//! - Atomic file writes (temp file, then rename)

mod save_file;

use std::fs;
use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scores::ScoreCard;
use save_file::SaveFile;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save data is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level {level} has no save slot (slots 1..={slots})")]
    InvalidSlot { level: usize, slots: usize },
}

/// A point as stored in save files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavePoint {
    pub x: f64,
    pub y: f64,
}

impl From<DVec2> for SavePoint {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<SavePoint> for DVec2 {
    fn from(p: SavePoint) -> Self {
        DVec2::new(p.x, p.y)
    }
}

/// Snapshot of a level attempt
///
/// All positions are world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSave {
    pub scroll_offset: f64,
    pub player: SavePoint,
    pub scores: ScoreCard,
    /// Consumed triggers, in consumption order
    pub removed_nodes: Vec<SavePoint>,
}

impl SessionSave {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One optional save per level, numbered from 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SaveSlots {
    slots: Vec<Option<SessionSave>>,
}

impl SaveSlots {
    /// Empty slots for `levels` levels
    pub fn new(levels: usize) -> Self {
        Self {
            slots: vec![None; levels],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn index(&self, level: usize) -> Result<usize, PersistenceError> {
        if level == 0 || level > self.slots.len() {
            return Err(PersistenceError::InvalidSlot {
                level,
                slots: self.slots.len(),
            });
        }
        Ok(level - 1)
    }

    pub fn get(&self, level: usize) -> Result<Option<&SessionSave>, PersistenceError> {
        let i = self.index(level)?;
        Ok(self.slots[i].as_ref())
    }

    /// Store a save, replacing whatever the slot held
    pub fn store(&mut self, level: usize, save: SessionSave) -> Result<(), PersistenceError> {
        let i = self.index(level)?;
        self.slots[i] = Some(save);
        Ok(())
    }

    pub fn clear(&mut self, level: usize) -> Result<Option<SessionSave>, PersistenceError> {
        let i = self.index(level)?;
        Ok(self.slots[i].take())
    }

    /// Write all slots to a JSON file
    ///
    /// The file is replaced in one rename; what it held before is kept in
    /// `<name>.bak`.
    pub fn write_to(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self)?;
        SaveFile::new(path).replace(&json)?;
        log::info!("Saved {} slots to {}", self.slots.len(), path.display());
        Ok(())
    }

    /// Read slots from a JSON file, falling back to its backup
    pub fn read_from(path: &Path) -> Result<Self, PersistenceError> {
        match Self::parse_file(path) {
            Ok(slots) => Ok(slots),
            Err(e) => {
                let backup = SaveFile::new(path).backup_path();
                if !backup.is_file() {
                    return Err(e);
                }
                log::warn!(
                    "Save file {} unreadable ({}), using {}",
                    path.display(),
                    e,
                    backup.display()
                );
                Self::parse_file(&backup)
            }
        }
    }

    fn parse_file(path: &Path) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path)?;
        let slots: SaveSlots = serde_json::from_str(&json)?;
        log::info!("Loaded {} slots from {}", slots.slots.len(), path.display());
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionSave {
        SessionSave {
            scroll_offset: 123.456,
            player: SavePoint { x: 30.0, y: 150.25 },
            scores: ScoreCard::from(vec![10, -5]),
            removed_nodes: vec![
                SavePoint { x: 60.0, y: 840.0 },
                SavePoint { x: 0.1, y: 0.3 },
            ],
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["scrollOffset"], 123.456);
        assert_eq!(value["player"]["x"], 30.0);
        assert_eq!(value["scores"], serde_json::json!([10, -5]));
        assert_eq!(value["removedNodes"][0]["y"], 840.0);
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let save = sample();
        let back = SessionSave::from_json(&save.to_json().unwrap()).unwrap();
        assert_eq!(back, save);
    }

    #[test]
    fn test_field_order_is_irrelevant() {
        let json = r#"{
            "removedNodes": [],
            "scores": [3],
            "player": { "y": 2.0, "x": 1.0 },
            "scrollOffset": 0.0
        }"#;
        let save = SessionSave::from_json(json).unwrap();
        assert_eq!(save.player, SavePoint { x: 1.0, y: 2.0 });
        assert_eq!(save.scores.as_slice(), &[3]);
    }

    #[test]
    fn test_malformed_save() {
        assert!(matches!(
            SessionSave::from_json(r#"{ "scrollOffset": "high" }"#),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn test_slots() {
        let mut slots = SaveSlots::new(3);
        assert_eq!(slots.get(2).unwrap(), None);
        slots.store(2, sample()).unwrap();
        assert_eq!(slots.get(2).unwrap(), Some(&sample()));
        assert!(matches!(
            slots.get(0),
            Err(PersistenceError::InvalidSlot { level: 0, slots: 3 })
        ));
        assert!(slots.store(4, sample()).is_err());
        assert_eq!(slots.clear(2).unwrap(), Some(sample()));
        assert_eq!(slots.get(2).unwrap(), None);
    }

    #[test]
    fn test_slots_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("sky-climb-slots-{}", std::process::id()));
        let path = dir.join("saves.json");

        let mut slots = SaveSlots::new(2);
        slots.store(1, sample()).unwrap();
        slots.write_to(&path).unwrap();
        // Overwrite in place
        slots.write_to(&path).unwrap();

        let back = SaveSlots::read_from(&path).unwrap();
        assert_eq!(back, slots);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_backup() {
        let dir = std::env::temp_dir().join(format!("sky-climb-backup-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("saves.json");

        let mut older = SaveSlots::new(2);
        older.store(1, sample()).unwrap();
        older.write_to(&path).unwrap();
        let mut newer = older.clone();
        newer.clear(1).unwrap();
        newer.write_to(&path).unwrap();
        assert_eq!(SaveSlots::read_from(&path).unwrap(), newer);

        // Torn main file: the previous write is still readable
        fs::write(&path, "{\"slots\": [").unwrap();
        assert_eq!(SaveSlots::read_from(&path).unwrap(), older);

        // Without a backup the parse error surfaces
        fs::remove_file(SaveFile::new(&path).backup_path()).unwrap();
        assert!(matches!(SaveSlots::read_from(&path), Err(PersistenceError::Json(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
