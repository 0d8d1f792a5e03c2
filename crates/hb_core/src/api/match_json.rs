//! JSON entry points for operating on the current match.
//!
//! Requests and responses are plain JSON strings so embedders only need a
//! string bridge. Every mutating call answers with the full state plus any
//! served sanctions now waiting on the operator, and rule rejections come
//! back as `Err` strings with the state untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{clock, roster, sanctions, score, stats, undo, ExpiryPrompt};
use crate::error::RuleError;
use crate::models::{MatchConfig, MatchEvent, MatchMetadata, Player, Position, RosterSide};
use crate::state::{self, MatchState};

/// Standard response envelope for mutating calls.
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub state: MatchState,
    /// Served sanctions waiting for an entrant choice.
    pub prompts: Vec<ExpiryPrompt>,
    /// Set when the operation ran the clock into the period horn.
    pub period_finished: bool,
}

fn no_match() -> String {
    "No match in progress".to_string()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to serialize response: {}", e))
}

fn respond(
    state: MatchState,
    prompts: Vec<ExpiryPrompt>,
    period_finished: bool,
) -> Result<String, String> {
    to_json(&MatchResponse { state, prompts, period_finished })
}

#[derive(Debug, Deserialize)]
pub struct NewMatchRequest {
    #[serde(default)]
    pub metadata: MatchMetadata,
    #[serde(default)]
    pub config: MatchConfig,
    #[serde(default)]
    pub players: Vec<PlayerSpec>,
    #[serde(default)]
    pub opponent_players: Vec<PlayerSpec>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSpec {
    pub number: u8,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub active: bool,
}

impl PlayerSpec {
    fn into_player(self) -> Player {
        let mut player = Player::new(self.number, self.name, self.position);
        player.active = self.active;
        player
    }
}

/// Start a fresh match and make it the current one.
pub fn new_match_json(request_json: &str) -> Result<String, String> {
    let request: NewMatchRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let mut state = MatchState::new(request.metadata, request.config);
    state.players = request.players.into_iter().map(PlayerSpec::into_player).collect();
    state.opponent_players =
        request.opponent_players.into_iter().map(PlayerSpec::into_player).collect();

    for side in [RosterSide::Ours, RosterSide::Opponent] {
        if state.active_court_count(side) > roster::MAX_ON_COURT {
            return Err(RuleError::RosterFull { limit: roster::MAX_ON_COURT }.to_string());
        }
    }

    log::info!(
        "New match {} ({} vs {})",
        state.id,
        state.metadata.our_team,
        state.metadata.opponent_team
    );
    state::set_match(state.clone());
    respond(state, Vec::new(), false)
}

/// Snapshot of the current match state.
pub fn current_match_json() -> Result<String, String> {
    let state = state::get_match().ok_or_else(no_match)?;
    to_json(&state)
}

/// Drop the current match without saving.
pub fn close_match_json() -> Result<String, String> {
    state::clear_match();
    Ok("{}".to_string())
}

/// Record one event. The event JSON uses the same shape the state
/// serializes with, so older recordings paste straight in.
pub fn record_event_json(event_json: &str) -> Result<String, String> {
    let event: MatchEvent =
        serde_json::from_str(event_json).map_err(|e| format!("Invalid event JSON: {}", e))?;

    let (state, prompts) = state::with_match(|state| {
        score::record_event(state, event);
        let prompts = sanctions::process_expirations(state);
        (state.clone(), prompts)
    })
    .ok_or_else(no_match)?;

    respond(state, prompts, false)
}

/// Replace an event in place (manual correction).
pub fn update_event_json(event_json: &str) -> Result<String, String> {
    let event: MatchEvent =
        serde_json::from_str(event_json).map_err(|e| format!("Invalid event JSON: {}", e))?;
    let id = event.id;

    let result = state::with_match(
        |state| -> Result<(MatchState, Vec<ExpiryPrompt>), RuleError> {
            if !score::update_event(state, event) {
                return Err(RuleError::UnknownEvent { id });
            }
            let prompts = sanctions::process_expirations(state);
            Ok((state.clone(), prompts))
        },
    )
    .ok_or_else(no_match)?;

    let (state, prompts) = result.map_err(|e| e.to_string())?;
    respond(state, prompts, false)
}

#[derive(Debug, Deserialize)]
pub struct EventIdRequest {
    pub id: Uuid,
}

/// Remove an event from the log entirely.
pub fn delete_event_json(request_json: &str) -> Result<String, String> {
    let request: EventIdRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let result = state::with_match(
        |state| -> Result<(MatchState, Vec<ExpiryPrompt>), RuleError> {
            if score::delete_event(state, request.id).is_none() {
                return Err(RuleError::UnknownEvent { id: request.id });
            }
            let prompts = sanctions::process_expirations(state);
            Ok((state.clone(), prompts))
        },
    )
    .ok_or_else(no_match)?;

    let (state, prompts) = result.map_err(|e| e.to_string())?;
    respond(state, prompts, false)
}

/// Undo the most recent event, reversing its side effects.
pub fn undo_json() -> Result<String, String> {
    let (undone, state, prompts) = state::with_match(|state| {
        let undone = undo::undo_last(state).is_some();
        let prompts = sanctions::process_expirations(state);
        (undone, state.clone(), prompts)
    })
    .ok_or_else(no_match)?;

    if !undone {
        return Err("Nothing to undo".to_string());
    }
    respond(state, prompts, false)
}

#[derive(Debug, Deserialize)]
pub struct ToggleActiveRequest {
    pub side: RosterSide,
    pub player_id: Uuid,
    pub active: bool,
}

/// Bench or field a player, subject to the court-entry rules.
pub fn set_player_active_json(request_json: &str) -> Result<String, String> {
    let request: ToggleActiveRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let result = state::with_match(
        |state| -> Result<(MatchState, Vec<ExpiryPrompt>), RuleError> {
            roster::set_player_active(state, request.side, request.player_id, request.active)?;
            let prompts = sanctions::process_expirations(state);
            Ok((state.clone(), prompts))
        },
    )
    .ok_or_else(no_match)?;

    let (state, prompts) = result.map_err(|e| e.to_string())?;
    respond(state, prompts, false)
}

#[derive(Debug, Deserialize)]
pub struct SubstituteRequest {
    pub side: RosterSide,
    pub player_in: Uuid,
    pub player_out: Uuid,
}

/// Swap two players as one atomic move and log a substitution event.
pub fn substitute_json(request_json: &str) -> Result<String, String> {
    let request: SubstituteRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let result = state::with_match(
        |state| -> Result<(MatchState, Vec<ExpiryPrompt>), RuleError> {
            roster::substitute(state, request.side, request.player_in, request.player_out)?;
            let prompts = sanctions::process_expirations(state);
            Ok((state.clone(), prompts))
        },
    )
    .ok_or_else(no_match)?;

    let (state, prompts) = result.map_err(|e| e.to_string())?;
    respond(state, prompts, false)
}

#[derive(Debug, Deserialize)]
pub struct TickRequest {
    pub elapsed_secs: u32,
}

/// Advance the game clock by elapsed real play.
pub fn tick_json(request_json: &str) -> Result<String, String> {
    let request: TickRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let (state, prompts, outcome) = state::with_match(|state| {
        let outcome = clock::tick(state, request.elapsed_secs);
        let prompts = sanctions::process_expirations(state);
        (state.clone(), prompts, outcome)
    })
    .ok_or_else(no_match)?;

    respond(state, prompts, outcome.period_finished)
}

/// Move to the next period with the clock parked at its start.
pub fn advance_period_json() -> Result<String, String> {
    let (state, prompts) = state::with_match(|state| {
        clock::advance_period(state);
        let prompts = sanctions::process_expirations(state);
        (state.clone(), prompts)
    })
    .ok_or_else(no_match)?;

    respond(state, prompts, false)
}

#[derive(Debug, Deserialize)]
pub struct PausedRequest {
    pub paused: bool,
}

pub fn set_paused_json(request_json: &str) -> Result<String, String> {
    let request: PausedRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let (state, prompts) = state::with_match(|state| {
        clock::set_paused(state, request.paused);
        let prompts = sanctions::process_expirations(state);
        (state.clone(), prompts)
    })
    .ok_or_else(no_match)?;

    respond(state, prompts, false)
}

#[derive(Debug, Deserialize)]
pub struct ResolveExpiryRequest {
    pub sanction_id: Uuid,
    pub entrant_id: Uuid,
}

/// Answer an expiry prompt with the player who enters.
pub fn resolve_expiry_json(request_json: &str) -> Result<String, String> {
    let request: ResolveExpiryRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let result = state::with_match(
        |state| -> Result<(MatchState, Vec<ExpiryPrompt>), RuleError> {
            sanctions::resolve_expiry(state, request.sanction_id, request.entrant_id)?;
            let prompts = sanctions::process_expirations(state);
            Ok((state.clone(), prompts))
        },
    )
    .ok_or_else(no_match)?;

    let (state, prompts) = result.map_err(|e| e.to_string())?;
    respond(state, prompts, false)
}

#[derive(Debug, Deserialize)]
pub struct SideRequest {
    pub side: RosterSide,
}

#[derive(Debug, Serialize)]
pub struct SacrificeSuggestion {
    pub player_id: Option<Uuid>,
}

/// Random pick of who could serve a staff sanction.
pub fn suggest_sacrifice_json(request_json: &str) -> Result<String, String> {
    let request: SideRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let state = state::get_match().ok_or_else(no_match)?;
    let suggestion = SacrificeSuggestion {
        player_id: sanctions::suggest_sacrifice(&state, request.side),
    };
    to_json(&suggestion)
}

/// Full statistics report for the current match.
pub fn statistics_json() -> Result<String, String> {
    let state = state::get_match().ok_or_else(no_match)?;
    to_json(&stats::compute(&state))
}

/// One running sanction countdown, for the UI's penalty chips.
#[derive(Debug, Serialize)]
pub struct ActiveSanction {
    pub sanction_id: Uuid,
    pub player_id: Option<Uuid>,
    pub side: RosterSide,
    pub remaining: u32,
    pub duration: u32,
}

/// Timed sanctions that are still running at the current clock.
pub fn active_sanctions_json() -> Result<String, String> {
    let state = state::get_match().ok_or_else(no_match)?;

    let mut active = Vec::new();
    for event in &state.events {
        if event.timed_sanction().is_none() || state.resolved_sanctions.contains(&event.id) {
            continue;
        }
        let clock =
            sanctions::sanction_remaining(event, state.game_time, state.current_period, &state.config);
        if clock.remaining == 0 {
            continue;
        }
        active.push(ActiveSanction {
            sanction_id: event.id,
            player_id: event.actor_id(),
            side: if event.is_opponent { RosterSide::Opponent } else { RosterSide::Ours },
            remaining: clock.remaining,
            duration: clock.duration,
        });
    }
    to_json(&active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    // The api operates on the process-wide slot; hold this across each
    // test so parallel tests do not fight over it.
    static SLOT: Mutex<()> = Mutex::new(());

    fn slot_guard() -> MutexGuard<'static, ()> {
        SLOT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_match() -> MatchState {
        let request = r#"{
            "metadata": {"our_team": "HC Ours", "opponent_team": "HC Theirs"},
            "players": [
                {"number": 1, "name": "Keeper", "position": "goalkeeper", "active": true},
                {"number": 9, "name": "Back", "position": "left_back", "active": true},
                {"number": 14, "name": "Sub", "position": "centre_back"}
            ]
        }"#;
        new_match_json(request).unwrap();
        state::get_match().unwrap()
    }

    #[test]
    fn test_new_match_and_record_goal() {
        let _guard = slot_guard();
        let state = start_match();
        let back = state.players[1].id;

        let event = format!(
            r#"{{"id": "{}", "timestamp": 95, "period": 1, "type": "shot",
                "player_id": "{}", "shot": {{"zone": "left_back", "outcome": "goal"}}}}"#,
            Uuid::new_v4(),
            back
        );
        let response = record_event_json(&event).unwrap();

        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["state"]["home_score"], 1);
        assert_eq!(value["state"]["away_score"], 0);
        assert_eq!(value["prompts"].as_array().unwrap().len(), 0);
        assert_eq!(value["state"]["events"][0]["home_score_snapshot"], 1);
    }

    #[test]
    fn test_rule_rejections_come_back_as_errors() {
        let _guard = slot_guard();
        let state = start_match();
        let keeper = state.players[0].id;

        let toggle = format!(
            r#"{{"side": "ours", "player_id": "{}", "active": true}}"#,
            Uuid::new_v4()
        );
        assert!(set_player_active_json(&toggle).is_err());

        // A valid toggle still works afterwards.
        let bench_keeper =
            format!(r#"{{"side": "ours", "player_id": "{}", "active": false}}"#, keeper);
        set_player_active_json(&bench_keeper).unwrap();
    }

    #[test]
    fn test_tick_reports_the_period_horn_and_expiries() {
        let _guard = slot_guard();
        let state = start_match();
        let back = state.players[1].id;

        set_paused_json(r#"{"paused": false}"#).unwrap();
        tick_json(r#"{"elapsed_secs": 100}"#).unwrap();

        let sanction = format!(
            r#"{{"id": "{}", "timestamp": 100, "period": 1, "type": "sanction",
                "player_id": "{}", "sanction": {{"kind": "two_minutes", "duration_min": 2}}}}"#,
            Uuid::new_v4(),
            back
        );
        record_event_json(&sanction).unwrap();

        set_paused_json(r#"{"paused": false}"#).unwrap();
        let response = tick_json(r#"{"elapsed_secs": 120}"#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["prompts"].as_array().unwrap().len(), 1);
        assert_eq!(value["period_finished"], false);

        // Resolve by sending the sub in for the sanctioned back.
        let sub = state.players[2].id;
        let sanction_id = value["prompts"][0]["sanction_id"].as_str().unwrap().to_string();
        let resolve = format!(
            r#"{{"sanction_id": "{}", "entrant_id": "{}"}}"#,
            sanction_id, sub
        );
        let resolved = resolve_expiry_json(&resolve).unwrap();
        let value: serde_json::Value = serde_json::from_str(&resolved).unwrap();
        assert_eq!(value["prompts"].as_array().unwrap().len(), 0);

        set_paused_json(r#"{"paused": false}"#).unwrap();
        let response = tick_json(r#"{"elapsed_secs": 1580}"#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["period_finished"], true);
        assert_eq!(value["state"]["game_time"], 1800);
    }

    #[test]
    fn test_undo_over_json() {
        let _guard = slot_guard();
        let state = start_match();
        let back = state.players[1].id;

        let event = format!(
            r#"{{"id": "{}", "timestamp": 40, "type": "shot",
                "player_id": "{}", "shot": {{"zone": "seven_metre", "outcome": "goal"}}}}"#,
            Uuid::new_v4(),
            back
        );
        record_event_json(&event).unwrap();

        let response = undo_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["state"]["home_score"], 0);

        assert!(undo_json().is_err(), "nothing left to undo");
    }

    #[test]
    fn test_active_sanctions_listing() {
        let _guard = slot_guard();
        let state = start_match();
        let back = state.players[1].id;

        let sanction = format!(
            r#"{{"id": "{}", "timestamp": 0, "type": "sanction",
                "player_id": "{}", "sanction": {{"kind": "two_minutes"}}}}"#,
            Uuid::new_v4(),
            back
        );
        record_event_json(&sanction).unwrap();

        let listing = active_sanctions_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&listing).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["remaining"], 120);
        assert_eq!(value[0]["side"], "ours");
    }
}
