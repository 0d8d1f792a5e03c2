//! Match state aggregate and the process-wide current-match slot.
//!
//! `MatchState` is plain serializable data; every derivation and rule check
//! lives in [`crate::engine`] as pure functions over it. The global slot
//! only exists so the JSON API has one well-known place to read and write
//! the match the UI is operating on.

use std::collections::BTreeSet;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MatchConfig, MatchEvent, MatchMetadata, Player, Position, RosterSide};

/// The one match the UI is currently operating on.
pub static CURRENT_MATCH: Lazy<RwLock<Option<MatchState>>> = Lazy::new(|| RwLock::new(None));

/// Aggregate root for a single match.
///
/// Scores and snapshots are derived from `events`; they are stored here only
/// so a loaded snapshot renders without recomputation, and they are
/// overwritten by `engine::score::recalculate` whenever the log changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchState {
    pub id: Uuid,

    #[serde(default)]
    pub metadata: MatchMetadata,

    #[serde(default)]
    pub config: MatchConfig,

    #[serde(default = "default_period")]
    pub current_period: u8,

    #[serde(default = "default_paused")]
    pub paused: bool,

    /// Current game-clock value in seconds.
    #[serde(default)]
    pub game_time: i64,

    #[serde(default)]
    pub home_score: u16,

    #[serde(default)]
    pub away_score: u16,

    /// Display-ordered log: newest chronological event first.
    #[serde(default)]
    pub events: Vec<MatchEvent>,

    /// Sanction ids whose expiry has already been handled, so a served
    /// sanction is never re-prompted.
    #[serde(default)]
    pub resolved_sanctions: BTreeSet<Uuid>,

    #[serde(default)]
    pub players: Vec<Player>,

    #[serde(default)]
    pub opponent_players: Vec<Player>,
}

fn default_period() -> u8 {
    1
}

fn default_paused() -> bool {
    true
}

impl MatchState {
    pub fn new(metadata: MatchMetadata, config: MatchConfig) -> Self {
        let game_time = config.period_start_clock(1);
        Self {
            id: Uuid::new_v4(),
            metadata,
            config,
            current_period: 1,
            paused: true,
            game_time,
            home_score: 0,
            away_score: 0,
            events: Vec::new(),
            resolved_sanctions: BTreeSet::new(),
            players: Vec::new(),
            opponent_players: Vec::new(),
        }
    }

    pub fn roster(&self, side: RosterSide) -> &[Player] {
        match side {
            RosterSide::Ours => &self.players,
            RosterSide::Opponent => &self.opponent_players,
        }
    }

    pub fn roster_mut(&mut self, side: RosterSide) -> &mut Vec<Player> {
        match side {
            RosterSide::Ours => &mut self.players,
            RosterSide::Opponent => &mut self.opponent_players,
        }
    }

    pub fn player(&self, side: RosterSide, id: Uuid) -> Option<&Player> {
        self.roster(side).iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, side: RosterSide, id: Uuid) -> Option<&mut Player> {
        self.roster_mut(side).iter_mut().find(|p| p.id == id)
    }

    /// Look a member up on either roster.
    pub fn member(&self, id: Uuid) -> Option<(RosterSide, &Player)> {
        if let Some(p) = self.player(RosterSide::Ours, id) {
            return Some((RosterSide::Ours, p));
        }
        self.player(RosterSide::Opponent, id).map(|p| (RosterSide::Opponent, p))
    }

    pub fn member_mut(&mut self, id: Uuid) -> Option<&mut Player> {
        if self.players.iter().any(|p| p.id == id) {
            return self.players.iter_mut().find(|p| p.id == id);
        }
        self.opponent_players.iter_mut().find(|p| p.id == id)
    }

    /// Count of active court players (staff excluded) on one roster.
    pub fn active_court_count(&self, side: RosterSide) -> usize {
        self.roster(side).iter().filter(|p| p.active && p.position.is_court_player()).count()
    }

    /// Inactive court players on one roster, in roster order.
    pub fn bench(&self, side: RosterSide) -> Vec<&Player> {
        self.roster(side).iter().filter(|p| !p.active && p.position.is_court_player()).collect()
    }

    pub fn find_event(&self, id: Uuid) -> Option<&MatchEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Insert a freshly recorded event at the front of the display log.
    /// Callers re-derive scores afterwards; use `engine::record_event` for
    /// the full recording flow.
    pub fn push_event(&mut self, event: MatchEvent) {
        self.events.insert(0, event);
    }

    /// Remove an event by id. Returns the removed event.
    pub fn remove_event(&mut self, id: Uuid) -> Option<MatchEvent> {
        let idx = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(idx))
    }

    /// Back to a pristine pre-throw-off state, keeping rosters and fixture
    /// data but wiping the log, clock and accumulated playing time.
    pub fn reset(&mut self) {
        self.events.clear();
        self.resolved_sanctions.clear();
        self.home_score = 0;
        self.away_score = 0;
        self.current_period = 1;
        self.paused = true;
        self.game_time = self.config.period_start_clock(1);
        for player in self.players.iter_mut().chain(self.opponent_players.iter_mut()) {
            player.active = false;
            player.playing_time_secs = 0;
            player.playing_time_by_period.clear();
        }
    }

    /// Position of a member on either roster, if known.
    pub fn member_position(&self, id: Uuid) -> Option<Position> {
        self.member(id).map(|(_, p)| p.position)
    }
}

// ========================
// Global current-match access
// ========================

/// Read the current match, if one is loaded.
pub fn get_match() -> Option<MatchState> {
    CURRENT_MATCH.read().expect("CURRENT_MATCH lock poisoned").clone()
}

/// Replace the current match wholesale (new match, load, import).
pub fn set_match(state: MatchState) {
    *CURRENT_MATCH.write().expect("CURRENT_MATCH lock poisoned") = Some(state);
}

/// Drop the current match (leaving the match view).
pub fn clear_match() {
    *CURRENT_MATCH.write().expect("CURRENT_MATCH lock poisoned") = None;
}

/// Run a closure against the current match in place.
pub fn with_match<R>(f: impl FnOnce(&mut MatchState) -> R) -> Option<R> {
    let mut guard = CURRENT_MATCH.write().expect("CURRENT_MATCH lock poisoned");
    guard.as_mut().map(f)
}
