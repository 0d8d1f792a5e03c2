use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Court position of a roster member.
///
/// `Staff` and `Coach` sit on the bench sheet but never count toward the
/// on-court cap; everyone else is a court player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Goalkeeper,
    LeftWing,
    LeftBack,
    CentreBack,
    RightBack,
    RightWing,
    Pivot,
    Staff,
    Coach,
}

impl Position {
    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::Goalkeeper)
    }

    /// Bench officials: team staff and the coach.
    pub fn is_staff(&self) -> bool {
        matches!(self, Position::Staff | Position::Coach)
    }

    /// Anyone who can physically stand on the court, goalkeeper included.
    pub fn is_court_player(&self) -> bool {
        !self.is_staff()
    }
}

/// Which of the two independently tracked rosters a player belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RosterSide {
    Ours,
    Opponent,
}

/// A roster entry for either team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: Uuid,
    pub number: u8,
    pub name: String,
    pub position: Position,

    /// On-court flag. Gate every mutation of this through the roster
    /// checks in `engine::roster`; the engine itself writes it directly
    /// only for forced removals and undo restoration.
    #[serde(default)]
    pub active: bool,

    /// Accumulated seconds on court across the whole match.
    #[serde(default)]
    pub playing_time_secs: u32,

    /// Accumulated seconds on court keyed by period number.
    #[serde(default)]
    pub playing_time_by_period: BTreeMap<u8, u32>,
}

impl Player {
    pub fn new(number: u8, name: impl Into<String>, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            name: name.into(),
            position,
            active: false,
            playing_time_secs: 0,
            playing_time_by_period: BTreeMap::new(),
        }
    }

    /// Credit on-court time to the running totals.
    pub fn add_playing_time(&mut self, period: u8, secs: u32) {
        self.playing_time_secs += secs;
        *self.playing_time_by_period.entry(period).or_insert(0) += secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_staff_positions_are_not_court_players() {
        for position in Position::iter() {
            assert_ne!(position.is_staff(), position.is_court_player());
        }
        assert!(Position::Staff.is_staff());
        assert!(Position::Coach.is_staff());
        assert!(Position::Goalkeeper.is_court_player());
        assert!(Position::Pivot.is_court_player());
    }

    #[test]
    fn test_playing_time_accumulates_per_period() {
        let mut player = Player::new(7, "Iva", Position::LeftWing);

        player.add_playing_time(1, 120);
        player.add_playing_time(1, 30);
        player.add_playing_time(2, 60);

        assert_eq!(player.playing_time_secs, 210);
        assert_eq!(player.playing_time_by_period[&1], 150);
        assert_eq!(player.playing_time_by_period[&2], 60);
    }

    #[test]
    fn test_legacy_player_deserializes_without_time_fields() {
        let json = r#"{
            "id": "7b1e9d0c-3c0a-4d6e-9f6b-0a4c8c1d2e3f",
            "number": 4,
            "name": "Lea",
            "position": "pivot"
        }"#;

        let player: Player = serde_json::from_str(json).unwrap();
        assert!(!player.active);
        assert_eq!(player.playing_time_secs, 0);
        assert!(player.playing_time_by_period.is_empty());
    }
}
