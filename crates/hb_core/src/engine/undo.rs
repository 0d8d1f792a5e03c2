//! Reversal of the most recently recorded event.
//!
//! Undo is log surgery, not an inverse event: the entry is removed, its
//! roster side effects are written back directly without going through the
//! entry gatekeeper, and the scores are recomputed from what remains.

use crate::engine::score;
use crate::models::{EventKind, MatchEvent};
use crate::state::MatchState;

/// Remove the newest event and reverse its side effects.
///
/// "Newest" is the head of the display-ordered log, i.e. the latest event
/// in chronological order after the last recomputation, which is not
/// necessarily the last one entered when events were backdated.
pub fn undo_last(state: &mut MatchState) -> Option<MatchEvent> {
    if state.events.is_empty() {
        return None;
    }
    let event = state.events.remove(0);
    state.resolved_sanctions.remove(&event.id);

    match event.kind {
        EventKind::Substitution => {
            if let Some(details) = event.substitution {
                if let Some(entered) = state.member_mut(details.player_in) {
                    entered.active = false;
                }
                if let Some(out_id) = details.player_out {
                    if let Some(left) = state.member_mut(out_id) {
                        left.active = true;
                    }
                }
            }
        }
        EventKind::Sanction => {
            if let Some(sanction) = event.sanction {
                if sanction.kind.is_disqualifying() {
                    if let Some(actor) = event.actor_id() {
                        if let Some(player) = state.member_mut(actor) {
                            player.active = true;
                        }
                    }
                }
                if let Some(victim) = sanction.sacrificed_player_id {
                    if let Some(player) = state.member_mut(victim) {
                        player.active = true;
                    }
                }
            }
        }
        _ => {}
    }

    score::recalculate(state);
    log::debug!("undid event {}", event.id);
    Some(event)
}
