//! Sanction countdowns, disqualification and expiry resolution.
//!
//! Everything here is re-derived from the event log and the current clock.
//! The only persistent bookkeeping is `MatchState::resolved_sanctions`, which
//! records the sanctions whose expiry has already been dealt with so a served
//! penalty is never prompted twice.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{roster, score};
use crate::error::{Result, RuleError};
use crate::models::{MatchConfig, MatchEvent, RosterSide, SanctionKind, TimerDirection};
use crate::state::MatchState;

/// Remaining and total length of one timed sanction, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionClock {
    pub remaining: u32,
    pub duration: u32,
}

/// How a sanction resolves once its countdown hits zero.
///
/// Field sanctions suspend the sanctioned player themself; staff and coach
/// sanctions are served by a separately chosen "sacrificed" field player.
/// Deriving the category from the member's position keeps the two
/// resolution paths in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SanctionCategory {
    Field { player_id: Uuid },
    Staff { staff_id: Uuid, sacrificed_player_id: Option<Uuid> },
}

/// A served sanction waiting for the operator to pick who enters.
///
/// Re-derived on every evaluation until [`resolve_expiry`] marks the
/// sanction handled, so the prompt persists across ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPrompt {
    pub sanction_id: Uuid,
    pub side: RosterSide,
    pub category: SanctionCategory,
    /// Players the operator may send in: the eligible bench, plus the
    /// sanctioned player themself when they are still eligible and still
    /// flagged active.
    pub candidates: Vec<Uuid>,
}

fn elapsed_between(start: i64, now: i64, direction: TimerDirection) -> i64 {
    match direction {
        TimerDirection::CountUp => now - start,
        TimerDirection::CountDown => start - now,
    }
}

/// Seconds left on a sanction's exclusion at the given clock position.
///
/// Handles sanctions issued in an earlier period: whatever part of the
/// duration was not served before that period ended carries over, and the
/// time already played in the current period counts against the balance.
/// A sanction dated in a future period reads as fully served.
pub fn sanction_remaining(
    event: &MatchEvent,
    game_time: i64,
    current_period: u8,
    config: &MatchConfig,
) -> SanctionClock {
    let Some(sanction) = event.sanction else {
        return SanctionClock { remaining: 0, duration: 0 };
    };
    let duration = sanction.duration_secs();
    if duration == 0 || event.period > current_period {
        return SanctionClock { remaining: 0, duration };
    }

    let direction = config.timer_direction;
    let served = if event.period == current_period {
        elapsed_between(event.timestamp, game_time, direction).max(0)
    } else {
        let served_in_issue_period = match direction {
            TimerDirection::CountUp => {
                (config.period_length_secs(event.period) - event.timestamp).max(0)
            }
            TimerDirection::CountDown => event.timestamp.max(0),
        };
        let served_in_current_period = match direction {
            TimerDirection::CountUp => game_time.max(0),
            TimerDirection::CountDown => {
                (config.period_length_secs(current_period) - game_time).max(0)
            }
        };
        served_in_issue_period + served_in_current_period
    };

    SanctionClock { remaining: duration.saturating_sub(served as u32), duration }
}

/// Whether the player has run out of chances for the rest of the match:
/// one red card, one blue card, two warnings, or a third two-minute
/// suspension. Counted over the whole log, overtime included.
pub fn is_player_disqualified(events: &[MatchEvent], player_id: Uuid) -> bool {
    let mut warnings = 0u32;
    let mut two_minutes = 0u32;
    for event in events.iter().filter(|e| e.is_sanction()) {
        if event.actor_id() != Some(player_id) {
            continue;
        }
        let Some(sanction) = event.sanction else { continue };
        if sanction.kind.is_disqualifying() {
            return true;
        }
        match sanction.kind {
            SanctionKind::Warning => warnings += 1,
            SanctionKind::TwoMinutes => two_minutes += 1,
            _ => {}
        }
    }
    warnings >= 2 || two_minutes >= 3
}

/// Players currently off the court serving someone else's sanction.
///
/// The single source of truth for "is this player sacrificed": every call
/// site queries this instead of rescanning the log itself.
pub fn sacrificed_player_ids(state: &MatchState) -> BTreeSet<Uuid> {
    state
        .events
        .iter()
        .filter_map(|event| {
            let victim = event.sanction?.sacrificed_player_id?;
            let clock =
                sanction_remaining(event, state.game_time, state.current_period, &state.config);
            (clock.remaining > 0).then_some(victim)
        })
        .collect()
}

/// Seconds the player still owes on their own timed sanctions.
///
/// Zero when nothing is live; overlapping suspensions report the longest
/// balance. While this is positive the player may be benched but not
/// brought back on.
pub fn suspension_remaining(state: &MatchState, player_id: Uuid) -> u32 {
    state
        .events
        .iter()
        .filter(|e| e.timed_sanction().is_some())
        .filter(|e| e.actor_id() == Some(player_id))
        .map(|e| {
            sanction_remaining(e, state.game_time, state.current_period, &state.config).remaining
        })
        .max()
        .unwrap_or(0)
}

/// Category of a sanction event, derived from the sanctioned member's
/// position. `None` when the event names no member we know.
pub fn category_of(state: &MatchState, event: &MatchEvent) -> Option<SanctionCategory> {
    let actor = event.actor_id()?;
    let sacrificed = event.sanction.and_then(|s| s.sacrificed_player_id);
    match state.member_position(actor) {
        Some(position) if position.is_staff() => {
            Some(SanctionCategory::Staff { staff_id: actor, sacrificed_player_id: sacrificed })
        }
        Some(_) => Some(SanctionCategory::Field { player_id: actor }),
        // Unknown member (legacy import): treat as a field sanction.
        None => Some(SanctionCategory::Field { player_id: actor }),
    }
}

/// Bench players allowed to enter for one roster: inactive court players
/// who are not disqualified, not sacrificed and not serving a penalty of
/// their own.
pub fn eligible_bench(state: &MatchState, side: RosterSide) -> Vec<Uuid> {
    let sacrificed = sacrificed_player_ids(state);
    state
        .bench(side)
        .into_iter()
        .filter(|p| !is_player_disqualified(&state.events, p.id))
        .filter(|p| !sacrificed.contains(&p.id))
        .filter(|p| suspension_remaining(state, p.id) == 0)
        .map(|p| p.id)
        .collect()
}

/// Active court players who could be sacrificed for a staff sanction.
pub fn sacrifice_candidates(state: &MatchState, side: RosterSide) -> Vec<Uuid> {
    state
        .roster(side)
        .iter()
        .filter(|p| p.active && p.position.is_court_player())
        .map(|p| p.id)
        .collect()
}

/// Propose a random victim for a staff sanction; the operator confirms or
/// overrides the pick.
pub fn suggest_sacrifice(state: &MatchState, side: RosterSide) -> Option<Uuid> {
    let candidates = sacrifice_candidates(state, side);
    candidates.choose(&mut rand::thread_rng()).copied()
}

/// Sweep the log for served sanctions that still need handling.
///
/// Run after every tick, event mutation or period change. Disqualified
/// field players are forced off the court immediately and their sanction
/// retired; everything else yields an [`ExpiryPrompt`] that keeps
/// re-appearing until the operator resolves it.
pub fn process_expirations(state: &mut MatchState) -> Vec<ExpiryPrompt> {
    let expired: Vec<MatchEvent> = state
        .events
        .iter()
        .filter(|e| e.timed_sanction().is_some())
        .filter(|e| !state.resolved_sanctions.contains(&e.id))
        .filter(|e| {
            sanction_remaining(e, state.game_time, state.current_period, &state.config).remaining
                == 0
        })
        .cloned()
        .collect();

    let mut prompts = Vec::new();
    for event in expired {
        let side = if event.is_opponent { RosterSide::Opponent } else { RosterSide::Ours };
        let Some(category) = category_of(state, &event) else {
            // Nobody to act on; retire the id so it is not rescanned.
            state.resolved_sanctions.insert(event.id);
            continue;
        };
        match category {
            SanctionCategory::Field { player_id } => {
                if is_player_disqualified(&state.events, player_id) {
                    if let Some(player) = state.member_mut(player_id) {
                        if player.active {
                            player.active = false;
                            log::info!("{} is disqualified and leaves the court", player.name);
                        }
                    }
                    state.resolved_sanctions.insert(event.id);
                } else {
                    let mut candidates = eligible_bench(state, side);
                    let still_on_court =
                        state.player(side, player_id).is_some_and(|p| p.active);
                    if still_on_court {
                        candidates.push(player_id);
                    }
                    prompts.push(ExpiryPrompt {
                        sanction_id: event.id,
                        side,
                        category,
                        candidates,
                    });
                }
            }
            SanctionCategory::Staff { .. } => {
                prompts.push(ExpiryPrompt {
                    sanction_id: event.id,
                    side,
                    category,
                    candidates: eligible_bench(state, side),
                });
            }
        }
    }
    prompts
}

/// Apply the operator's entrant choice for a served sanction.
///
/// Validates before touching anything: a rejection (for example the swap
/// would put an eighth player on court) leaves the state unchanged.
pub fn resolve_expiry(state: &mut MatchState, sanction_id: Uuid, entrant: Uuid) -> Result<()> {
    let event = state
        .find_event(sanction_id)
        .cloned()
        .ok_or(RuleError::UnknownEvent { id: sanction_id })?;
    if !event.is_sanction() {
        return Err(RuleError::NotASanction { id: sanction_id });
    }
    let side = if event.is_opponent { RosterSide::Opponent } else { RosterSide::Ours };

    match category_of(state, &event) {
        Some(SanctionCategory::Field { player_id }) => {
            if entrant == player_id {
                // The suspended player returns themself; only re-activate
                // if they were benched in the meantime.
                let needs_activation = !state.player(side, player_id).is_some_and(|p| p.active);
                if needs_activation {
                    roster::ensure_can_enter(state, side, player_id, 0)?;
                    if let Some(player) = state.player_mut(side, player_id) {
                        player.active = true;
                    }
                }
            } else {
                let freed = state
                    .player(side, player_id)
                    .is_some_and(|p| p.active && p.position.is_court_player())
                    as usize;
                roster::ensure_can_enter(state, side, entrant, freed)?;
                if let Some(sanctioned) = state.player_mut(side, player_id) {
                    if sanctioned.position.is_court_player() {
                        sanctioned.active = false;
                    }
                }
                if let Some(player) = state.player_mut(side, entrant) {
                    player.active = true;
                }
            }
            state.resolved_sanctions.insert(sanction_id);
            Ok(())
        }
        Some(SanctionCategory::Staff { sacrificed_player_id, .. }) => {
            let distinct_sacrifice = sacrificed_player_id.is_some_and(|p| p != entrant);
            let sacrifice_leaves = distinct_sacrifice
                && sacrificed_player_id
                    .and_then(|p| state.player(side, p))
                    .is_some_and(|p| p.active);
            roster::ensure_can_enter(state, side, entrant, sacrifice_leaves as usize)?;

            if sacrifice_leaves {
                if let Some(victim) =
                    sacrificed_player_id.and_then(|p| state.player_mut(side, p))
                {
                    victim.active = false;
                }
            }
            if let Some(player) = state.player_mut(side, entrant) {
                player.active = true;
            }

            let substitution = MatchEvent::substitution(
                state.game_time,
                state.current_period,
                side == RosterSide::Opponent,
                entrant,
                sacrificed_player_id.filter(|_| distinct_sacrifice),
            );
            score::record_event(state, substitution);
            state.resolved_sanctions.insert(sanction_id);
            Ok(())
        }
        None => {
            // No member to swap; just retire the sanction.
            state.resolved_sanctions.insert(sanction_id);
            Ok(())
        }
    }
}
