//! # hb_core - Handball Match Scorekeeping Core
//!
//! This library keeps the score, clock, rosters and disciplinary state of a
//! handball match from courtside input, with a JSON API for easy integration
//! with UI toolkits.
//!
//! ## Features
//! - Event-sourced scoring: totals and per-event snapshots are re-derived
//!   from the log after every change, including backdated corrections
//! - Sanction countdowns across period boundaries, with expiry prompts and
//!   automatic disqualification tracking
//! - Seven-player court limit enforced on every roster move
//! - Compressed, checksummed match files with version migration

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod save;
pub mod state;

// Re-export main API functions
pub use api::{
    current_match_json, export_match_json, import_match_json, new_match_json, record_event_json,
    resolve_expiry_json, substitute_json, tick_json, undo_json, MatchResponse,
};
pub use error::{Result, RuleError};

// Re-export core model types
pub use models::{
    EventKind, MatchConfig, MatchEvent, MatchMetadata, Player, Position, RosterSide, SanctionKind,
    ShotOutcome, ShotZone, TimerDirection,
};

// Re-export save system
pub use save::{MatchSummary, SaveError, SaveManager, SavedMatch, SAVE_VERSION};

// Re-export state management
pub use state::{clear_match, get_match, set_match, with_match, MatchState, CURRENT_MATCH};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShotDetails;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn recorded_match() -> MatchState {
        let metadata = MatchMetadata {
            our_team: "HC Ours".to_string(),
            opponent_team: "HC Theirs".to_string(),
            ..Default::default()
        };
        let mut state = MatchState::new(metadata, MatchConfig::default());

        let shooter = Player::new(11, "Wing", Position::LeftWing);
        let shooter_id = shooter.id;
        state.players.push(shooter);

        engine::score::record_event(
            &mut state,
            MatchEvent::shot(
                240,
                1,
                shooter_id,
                ShotDetails::new(ShotZone::LeftWing, ShotOutcome::Goal),
            ),
        );
        engine::score::record_event(&mut state, MatchEvent::opponent_goal(300, 1, None));
        engine::score::record_event(
            &mut state,
            MatchEvent::shot(
                410,
                1,
                shooter_id,
                ShotDetails::new(ShotZone::SevenMetre, ShotOutcome::Saved),
            ),
        );
        state
    }

    #[test]
    fn test_store_roundtrip_through_public_surface() {
        let dir = TempDir::new().unwrap();
        let manager = SaveManager::new(dir.path());
        let state = recorded_match();

        manager.save(&state).unwrap();
        let loaded = manager.load(state.id).unwrap();

        assert_eq!(loaded.home_score, 1);
        assert_eq!(loaded.away_score, 1);
        assert_eq!(loaded.events.len(), 3);
        assert_eq!(manager.list().len(), 1);
        assert_eq!(manager.list()[0].get_display_text(), "HC Ours vs HC Theirs (1:1)");
    }

    #[test]
    fn test_share_roundtrip_through_public_surface() {
        let state = recorded_match();
        let exported = export_match_json(&state);

        let imported = import_match_json(&exported).expect("own export must import");
        assert_eq!(imported.home_score, state.home_score);
        assert_eq!(imported.events.len(), state.events.len());
        assert!(import_match_json("{").is_none());
    }

    #[test]
    fn test_scorekeeping_scenario_without_the_slot() {
        let mut state = recorded_match();
        let shooter_id = state.players[0].id;

        // A two-minute sanction runs out 120 s later and asks who enters.
        engine::score::record_event(
            &mut state,
            MatchEvent::sanction(500, 1, shooter_id, SanctionKind::TwoMinutes),
        );
        state.game_time = 620;
        let prompts = engine::sanctions::process_expirations(&mut state);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].candidates, vec![shooter_id]);

        engine::sanctions::resolve_expiry(&mut state, prompts[0].sanction_id, shooter_id).unwrap();
        assert!(engine::sanctions::process_expirations(&mut state).is_empty());

        // Undo unwinds the sanction and its resolved mark.
        assert!(engine::undo::undo_last(&mut state).is_some());
        assert!(state.resolved_sanctions.is_empty());
    }

    #[test]
    fn test_unknown_event_ids_are_reported_not_panicked() {
        let mut state = recorded_match();
        let missing = Uuid::new_v4();
        assert!(engine::score::delete_event(&mut state, missing).is_none());
        let err = engine::sanctions::resolve_expiry(&mut state, missing, missing).unwrap_err();
        assert!(matches!(err, RuleError::UnknownEvent { .. }));
    }
}
