//! String-bridge API for embedding UIs.
//!
//! Every entry point takes and returns JSON strings so a host toolkit only
//! needs to marshal text. Mutating calls go through the process-wide
//! current-match slot in [`crate::state`].

pub mod match_json;
pub mod store_json;

pub use match_json::{
    active_sanctions_json, advance_period_json, close_match_json, current_match_json,
    delete_event_json, new_match_json, record_event_json, resolve_expiry_json,
    set_paused_json, set_player_active_json, statistics_json, substitute_json,
    suggest_sacrifice_json, tick_json, undo_json, update_event_json, MatchResponse,
};
pub use store_json::{
    delete_saved_match_json, export_match_json, import_current_match_json, import_match_json,
    list_matches_json, load_match_json, save_current_match_json,
};
