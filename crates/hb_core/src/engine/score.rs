//! Score derivation over the event log.
//!
//! The log is the single source of truth: home/away totals and per-event
//! snapshots are recomputed from scratch after every mutation, never
//! incrementally patched.

use std::cmp::Reverse;

use uuid::Uuid;

use crate::models::{MatchEvent, TimerDirection};
use crate::state::MatchState;

/// The event log in chronological order, oldest first.
///
/// Period ascending; within a period, timestamp ascending when the clock
/// counts up and descending when it counts down (a later real-world moment
/// has a smaller countdown timestamp). Ties keep their relative insertion
/// order.
pub fn chronological(state: &MatchState) -> Vec<MatchEvent> {
    // Display order is newest-first, so reverse before the stable sort to
    // keep equal-keyed events in insertion order.
    let mut ordered: Vec<MatchEvent> = state.events.iter().rev().cloned().collect();
    match state.config.timer_direction {
        TimerDirection::CountUp => ordered.sort_by_key(|e| (e.period, e.timestamp)),
        TimerDirection::CountDown => ordered.sort_by_key(|e| (e.period, Reverse(e.timestamp))),
    }
    ordered
}

/// Re-derive the authoritative scores and per-event snapshots.
///
/// Walks the log chronologically, counting goals into the home or away
/// column according to which side is ours, stamps the running totals onto
/// every event (overwriting whatever snapshot was there) and stores the log
/// back in display order, newest first. Idempotent and independent of
/// wall-clock time.
pub fn recalculate(state: &mut MatchState) {
    let mut ordered = chronological(state);
    let our_side_is_home = state.metadata.is_our_team_home;

    let mut home: u16 = 0;
    let mut away: u16 = 0;
    for event in ordered.iter_mut() {
        if let Some(for_opponent) = event.goal_for_opponent() {
            let goal_is_home = for_opponent != our_side_is_home;
            if goal_is_home {
                home += 1;
            } else {
                away += 1;
            }
        }
        event.home_score_snapshot = Some(home);
        event.away_score_snapshot = Some(away);
    }

    ordered.reverse();
    state.events = ordered;
    state.home_score = home;
    state.away_score = away;
}

/// Append a freshly recorded event and re-derive.
///
/// Recording a disqualifying card (red or blue) also forces the sanctioned
/// player off the court immediately; the timed part of the sanction still
/// runs its countdown for the team.
pub fn record_event(state: &mut MatchState, event: MatchEvent) {
    if let Some(sanction) = event.sanction {
        if sanction.kind.is_disqualifying() {
            if let Some(actor) = event.actor_id() {
                if let Some(player) = state.member_mut(actor) {
                    if player.position.is_court_player() {
                        player.active = false;
                        log::info!("{} sent off ({:?})", player.name, sanction.kind);
                    }
                }
            }
        }
    }
    state.push_event(event);
    recalculate(state);
}

/// Remove an event by id and re-derive. Returns the removed event.
pub fn delete_event(state: &mut MatchState, id: Uuid) -> Option<MatchEvent> {
    let removed = state.remove_event(id)?;
    state.resolved_sanctions.remove(&id);
    recalculate(state);
    Some(removed)
}

/// Replace an event in place (manual correction) and re-derive.
pub fn update_event(state: &mut MatchState, event: MatchEvent) -> bool {
    let Some(slot) = state.events.iter_mut().find(|e| e.id == event.id) else {
        return false;
    };
    *slot = event;
    recalculate(state);
    true
}
