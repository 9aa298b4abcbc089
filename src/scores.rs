//! Per-level score list
//!
//! The simulation core never interprets scores; level hooks record them and
//! they travel inside the session save.

use serde::{Deserialize, Serialize};

/// Ordered list of score deltas recorded during a level attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ScoreCard {
    pub entries: Vec<i32>,
}

impl ScoreCard {
    /// Create an empty score card
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a score
    pub fn record(&mut self, score: i32) {
        self.entries.push(score);
    }

    /// Sum of all recorded scores
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|&s| i64::from(s)).sum()
    }

    /// Best single score (if any)
    pub fn best(&self) -> Option<i32> {
        self.entries.iter().copied().max()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Vec<i32>> for ScoreCard {
    fn from(entries: Vec<i32>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_total() {
        let mut card = ScoreCard::new();
        assert!(card.is_empty());
        assert_eq!(card.best(), None);

        card.record(10);
        card.record(-3);
        card.record(7);
        assert_eq!(card.len(), 3);
        assert_eq!(card.total(), 14);
        assert_eq!(card.best(), Some(10));
        assert_eq!(card.as_slice(), &[10, -3, 7]);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let card = ScoreCard::from(vec![1, 2, 3]);
        assert_eq!(serde_json::to_string(&card).unwrap(), "[1,2,3]");
        let back: ScoreCard = serde_json::from_str("[4,5]").unwrap();
        assert_eq!(back.as_slice(), &[4, 5]);
    }
}
