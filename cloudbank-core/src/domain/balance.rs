//! Balance snapshot domain model

use serde::{Deserialize, Serialize};

/// Note counts per denomination, as reported by the bank's show-coins call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    #[serde(default)]
    pub ones: u64,
    #[serde(default)]
    pub fives: u64,
    #[serde(default)]
    pub twentyfives: u64,
    #[serde(default)]
    pub hundreds: u64,
    #[serde(default)]
    pub twohundredfifties: u64,
    /// Status tag the bank answered with
    pub status: String,
}

impl BalanceSnapshot {
    /// Create a snapshot from note counts
    pub fn new(
        ones: u64,
        fives: u64,
        twentyfives: u64,
        hundreds: u64,
        twohundredfifties: u64,
    ) -> Self {
        Self {
            ones,
            fives,
            twentyfives,
            hundreds,
            twohundredfifties,
            status: String::new(),
        }
    }

    /// Total face value held, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        [
            (self.ones, 1),
            (self.fives, 5),
            (self.twentyfives, 25),
            (self.hundreds, 100),
            (self.twohundredfifties, 250),
        ]
        .iter()
        .fold(0u64, |total, &(count, value)| {
            total.saturating_add(count.saturating_mul(value))
        })
    }

    /// Total number of notes held, saturating at `u64::MAX`
    pub fn note_count(&self) -> u64 {
        [
            self.ones,
            self.fives,
            self.twentyfives,
            self.hundreds,
            self.twohundredfifties,
        ]
        .iter()
        .fold(0u64, |total, &count| total.saturating_add(count))
    }
}
