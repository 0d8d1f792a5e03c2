//! Aggregated match statistics, derived on demand from the event log.
//!
//! Nothing here is stored; callers recompute whenever they need fresh
//! numbers, which keeps the figures consistent with edits and undos for
//! free.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::sanctions;
use crate::models::{EventKind, Player, RosterSide, SanctionKind, ShotOutcome, ShotZone};
use crate::state::MatchState;

/// One player's line in the match report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub player_id: Uuid,
    pub number: u8,
    pub name: String,
    pub goals: u32,
    pub shots: u32,
    pub turnovers: u32,
    pub positive_actions: u32,
    pub warnings: u32,
    pub two_minutes: u32,
    pub disqualified: bool,
    pub playing_time_secs: u32,
}

/// Aggregates for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTotals {
    pub goals: u32,
    pub shots: u32,
    /// Opposing shots recorded with a `Saved` outcome. The outcome already
    /// names the keeper as the stopper, so the count does not depend on who
    /// is flagged active when the report is built.
    pub saves: u32,
    pub turnovers: u32,
    pub two_minutes: u32,
    pub timeouts: u32,
}

/// Shot production from one throwing zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneLine {
    pub zone: ShotZone,
    pub shots: u32,
    pub goals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub our_totals: TeamTotals,
    pub opponent_totals: TeamTotals,
    pub player_lines: Vec<PlayerLine>,
    pub opponent_player_lines: Vec<PlayerLine>,
    /// Our shots broken down by throwing zone, in zone order.
    pub shot_zones: Vec<ZoneLine>,
}

/// Build the full report for the current log.
pub fn compute(state: &MatchState) -> MatchStatistics {
    MatchStatistics {
        our_totals: team_totals(state, RosterSide::Ours),
        opponent_totals: team_totals(state, RosterSide::Opponent),
        player_lines: roster_lines(state, RosterSide::Ours),
        opponent_player_lines: roster_lines(state, RosterSide::Opponent),
        shot_zones: zone_lines(state),
    }
}

fn team_totals(state: &MatchState, side: RosterSide) -> TeamTotals {
    let mut totals = TeamTotals::default();
    for event in &state.events {
        let event_side =
            if event.is_opponent { RosterSide::Opponent } else { RosterSide::Ours };
        if event_side != side {
            // The other side's shot; a stop there is this side's save.
            if event.shot.is_some_and(|s| s.outcome == ShotOutcome::Saved) {
                totals.saves += 1;
            }
            continue;
        }
        match event.kind {
            EventKind::Shot | EventKind::OpponentShot => {
                totals.shots += 1;
                if event.shot.is_some_and(|s| s.is_goal()) {
                    totals.goals += 1;
                }
            }
            EventKind::OpponentGoal => {
                totals.shots += 1;
                totals.goals += 1;
            }
            EventKind::Turnover => totals.turnovers += 1,
            EventKind::Sanction => {
                if event.sanction.is_some_and(|s| s.kind == SanctionKind::TwoMinutes) {
                    totals.two_minutes += 1;
                }
            }
            EventKind::Timeout => totals.timeouts += 1,
            _ => {}
        }
    }
    totals
}

fn roster_lines(state: &MatchState, side: RosterSide) -> Vec<PlayerLine> {
    state.roster(side).iter().map(|player| player_line(state, player)).collect()
}

fn player_line(state: &MatchState, player: &Player) -> PlayerLine {
    let mut line = PlayerLine {
        player_id: player.id,
        number: player.number,
        name: player.name.clone(),
        goals: 0,
        shots: 0,
        turnovers: 0,
        positive_actions: 0,
        warnings: 0,
        two_minutes: 0,
        disqualified: sanctions::is_player_disqualified(&state.events, player.id),
        playing_time_secs: player.playing_time_secs,
    };
    for event in state.events.iter().filter(|e| e.actor_id() == Some(player.id)) {
        match event.kind {
            EventKind::Shot | EventKind::OpponentShot => {
                line.shots += 1;
                if event.shot.is_some_and(|s| s.is_goal()) {
                    line.goals += 1;
                }
            }
            EventKind::OpponentGoal => {
                line.shots += 1;
                line.goals += 1;
            }
            EventKind::Turnover => line.turnovers += 1,
            EventKind::PositiveAction => line.positive_actions += 1,
            EventKind::Sanction => match event.sanction.map(|s| s.kind) {
                Some(SanctionKind::Warning) => line.warnings += 1,
                Some(SanctionKind::TwoMinutes) => line.two_minutes += 1,
                _ => {}
            },
            _ => {}
        }
    }
    line
}

fn zone_lines(state: &MatchState) -> Vec<ZoneLine> {
    let mut zones: BTreeMap<ShotZone, ZoneLine> = BTreeMap::new();
    for event in &state.events {
        if event.kind != EventKind::Shot {
            continue;
        }
        let Some(shot) = event.shot else { continue };
        let line =
            zones.entry(shot.zone).or_insert(ZoneLine { zone: shot.zone, shots: 0, goals: 0 });
        line.shots += 1;
        if shot.is_goal() {
            line.goals += 1;
        }
    }
    zones.into_values().collect()
}
