//! JSON entry points for stored matches and plain-JSON interchange.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{sanctions, score};
use crate::save::{migration, SaveManager};
use crate::state::{self, MatchState};

use super::match_json::MatchResponse;

fn no_match() -> String {
    "No match in progress".to_string()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to serialize response: {}", e))
}

#[derive(Debug, Serialize)]
struct SaveConfirmation {
    id: Uuid,
}

/// Write the current match to the store. Answers with the saved match id.
pub fn save_current_match_json() -> Result<String, String> {
    let state = state::get_match().ok_or_else(no_match)?;
    let manager = SaveManager::default_dir();
    manager.save(&state).map_err(|e| e.to_string())?;
    to_json(&SaveConfirmation { id: state.id })
}

#[derive(Debug, Deserialize)]
pub struct MatchIdRequest {
    pub id: Uuid,
}

/// Load a stored match and make it the current one.
pub fn load_match_json(request_json: &str) -> Result<String, String> {
    let request: MatchIdRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let manager = SaveManager::default_dir();
    let mut state = manager.load(request.id).map_err(|e| e.to_string())?;
    // Catch up on sanctions that ran out while the match sat on disk.
    let prompts = sanctions::process_expirations(&mut state);
    state::set_match(state.clone());

    to_json(&MatchResponse { state, prompts, period_finished: false })
}

/// Remove a stored match. Deleting an absent file is not an error.
pub fn delete_saved_match_json(request_json: &str) -> Result<String, String> {
    let request: MatchIdRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let manager = SaveManager::default_dir();
    manager.delete(request.id).map_err(|e| e.to_string())?;
    Ok("{}".to_string())
}

#[derive(Debug, Deserialize)]
pub struct ListMatchesRequest {
    /// Restrict the listing to one account's matches.
    #[serde(default)]
    pub owner: Option<String>,
}

/// Summaries of stored matches, most recently saved first.
pub fn list_matches_json(request_json: &str) -> Result<String, String> {
    let request: ListMatchesRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    let manager = SaveManager::default_dir();
    let summaries = match request.owner {
        Some(ref owner) => manager.list_by_owner(owner),
        None => manager.list(),
    };
    to_json(&summaries)
}

/// Render a match as shareable JSON.
///
/// Unlike the store this carries no version or checksum; the importer
/// normalizes whatever it gets.
pub fn export_match_json(state: &MatchState) -> String {
    match serde_json::to_string_pretty(state) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to export match {}: {}", state.id, e);
            String::new()
        }
    }
}

/// Parse a shared match back into a full state.
///
/// Returns `None` on any parse failure; there is never a partially-imported
/// state. Legacy exports are backfilled the same way stored saves are, and
/// scores are re-derived rather than trusted.
pub fn import_match_json(json: &str) -> Option<MatchState> {
    let mut state: MatchState = match serde_json::from_str(json) {
        Ok(state) => state,
        Err(e) => {
            log::warn!("Rejected match import: {}", e);
            return None;
        }
    };
    migration::backfill_legacy_state(&mut state);
    score::recalculate(&mut state);
    Some(state)
}

/// Import a shared match and make it the current one.
pub fn import_current_match_json(json: &str) -> Result<String, String> {
    let mut state =
        import_match_json(json).ok_or_else(|| "Not a valid match export".to_string())?;
    let prompts = sanctions::process_expirations(&mut state);
    state::set_match(state.clone());
    to_json(&MatchResponse { state, prompts, period_finished: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        MatchConfig, MatchEvent, MatchMetadata, Player, Position, ShotDetails, ShotOutcome,
        ShotZone,
    };

    fn sample_state() -> MatchState {
        let metadata = MatchMetadata {
            our_team: "HC Ours".to_string(),
            opponent_team: "HC Theirs".to_string(),
            ..Default::default()
        };
        let mut state = MatchState::new(metadata, MatchConfig::default());
        let shooter = Player::new(9, "Back", Position::LeftBack);
        let shooter_id = shooter.id;
        state.players.push(shooter);
        score::record_event(
            &mut state,
            MatchEvent::shot(75, 1, shooter_id, ShotDetails::new(ShotZone::LeftBack, ShotOutcome::Goal)),
        );
        score::record_event(&mut state, MatchEvent::opponent_goal(90, 1, None));
        state
    }

    #[test]
    fn test_export_import_keeps_the_match() {
        let state = sample_state();
        let exported = export_match_json(&state);

        let imported = import_match_json(&exported).unwrap();
        assert_eq!(imported.id, state.id);
        assert_eq!(imported.home_score, 1);
        assert_eq!(imported.away_score, 1);
        assert_eq!(imported.events.len(), 2);
        assert_eq!(imported.players[0].name, "Back");
    }

    #[test]
    fn test_import_rejects_garbage_without_partial_state() {
        assert!(import_match_json("not json").is_none());
        assert!(import_match_json(r#"{"events": "wrong shape"}"#).is_none());
    }

    #[test]
    fn test_import_normalizes_legacy_exports() {
        // Hand-written export from before periods existed: no period on the
        // event, no config, stale resolved id, snapshots missing.
        let json = r#"{
            "id": "7f3a2b1c-9d8e-4f5a-b6c7-d8e9f0a1b2c3",
            "current_period": 0,
            "events": [
                {
                    "id": "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d",
                    "timestamp": 30,
                    "type": "opponent_goal",
                    "is_opponent": true
                }
            ],
            "resolved_sanctions": ["11111111-2222-3333-4444-555555555555"]
        }"#;

        let imported = import_match_json(json).unwrap();
        assert_eq!(imported.current_period, 1);
        assert_eq!(imported.events[0].period, 1);
        assert!(imported.resolved_sanctions.is_empty());
        assert_eq!(imported.away_score, 1, "scores come from the log, not the export");
        assert_eq!(imported.events[0].away_score_snapshot, Some(1));
    }
}
