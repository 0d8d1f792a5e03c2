//! Court-entry rules.
//!
//! Handball fields at most seven players per team, goalkeeper included.
//! Staff and coaches sit outside the cap. Every path that makes someone
//! active funnels through [`ensure_can_enter`] so the cap and the
//! eligibility bars hold no matter which surface asked.

use uuid::Uuid;

use crate::engine::{sanctions, score};
use crate::error::{Result, RuleError};
use crate::models::{MatchEvent, Player, RosterSide};
use crate::state::MatchState;

/// Court players a team may have active at once.
pub const MAX_ON_COURT: usize = 7;

fn ensure_not_barred(state: &MatchState, player: &Player) -> Result<()> {
    if sanctions::is_player_disqualified(&state.events, player.id) {
        return Err(RuleError::Disqualified { name: player.name.clone() });
    }
    if sanctions::sacrificed_player_ids(state).contains(&player.id) {
        return Err(RuleError::Sacrificed { name: player.name.clone() });
    }
    Ok(())
}

/// Check that a player may step onto the court, without mutating anything.
///
/// `freed_slots` is the number of court places vacated by the same atomic
/// operation (a substitution frees one), so a like-for-like swap at the
/// cap still passes.
pub fn ensure_can_enter(
    state: &MatchState,
    side: RosterSide,
    player_id: Uuid,
    freed_slots: usize,
) -> Result<()> {
    let player =
        state.player(side, player_id).ok_or(RuleError::UnknownPlayer { id: player_id })?;
    ensure_not_barred(state, player)?;
    if player.active || !player.position.is_court_player() {
        return Ok(());
    }
    let remaining = sanctions::suspension_remaining(state, player.id);
    if remaining > 0 {
        return Err(RuleError::Suspended { name: player.name.clone(), remaining });
    }
    if state.active_court_count(side).saturating_sub(freed_slots) >= MAX_ON_COURT {
        return Err(RuleError::RosterFull { limit: MAX_ON_COURT });
    }
    Ok(())
}

/// Manual bench/court toggle, the gatekeeper behind the roster panel.
///
/// Disqualified and sacrificed players cannot be toggled in either
/// direction; an eighth court player is rejected. A player serving their
/// own penalty may be benched but not brought back until the countdown
/// ends.
pub fn set_player_active(
    state: &mut MatchState,
    side: RosterSide,
    player_id: Uuid,
    active: bool,
) -> Result<()> {
    if active {
        ensure_can_enter(state, side, player_id, 0)?;
    } else {
        let player =
            state.player(side, player_id).ok_or(RuleError::UnknownPlayer { id: player_id })?;
        ensure_not_barred(state, player)?;
    }
    if let Some(player) = state.player_mut(side, player_id) {
        player.active = active;
    }
    Ok(())
}

/// Swap `player_out` for `player_in` and record a substitution event.
///
/// Validated as one atomic move and rejected without side effects on any
/// failure. The outgoing slot only counts as freed if the outgoing player
/// is actually on the court, so substituting for a benched player cannot
/// smuggle an eighth player on.
pub fn substitute(
    state: &mut MatchState,
    side: RosterSide,
    player_in: Uuid,
    player_out: Uuid,
) -> Result<()> {
    if player_in == player_out {
        return Err(RuleError::InvalidSubstitution);
    }
    let freed = {
        let outgoing =
            state.player(side, player_out).ok_or(RuleError::UnknownPlayer { id: player_out })?;
        ensure_not_barred(state, outgoing)?;
        (outgoing.active && outgoing.position.is_court_player()) as usize
    };
    ensure_can_enter(state, side, player_in, freed)?;

    if let Some(outgoing) = state.player_mut(side, player_out) {
        outgoing.active = false;
    }
    if let Some(incoming) = state.player_mut(side, player_in) {
        incoming.active = true;
    }
    let event = MatchEvent::substitution(
        state.game_time,
        state.current_period,
        side == RosterSide::Opponent,
        player_in,
        Some(player_out),
    );
    score::record_event(state, event);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchConfig, MatchMetadata, Position};

    fn roster_of(positions: &[(Position, bool)]) -> Vec<Player> {
        positions
            .iter()
            .enumerate()
            .map(|(i, (position, active))| {
                let mut player = Player::new(i as u8 + 1, format!("Player {}", i + 1), *position);
                player.active = *active;
                player
            })
            .collect()
    }

    fn full_court_state() -> MatchState {
        let mut state = MatchState::new(MatchMetadata::default(), MatchConfig::default());
        state.players = roster_of(&[
            (Position::Goalkeeper, true),
            (Position::LeftWing, true),
            (Position::LeftBack, true),
            (Position::CentreBack, true),
            (Position::RightBack, true),
            (Position::RightWing, true),
            (Position::Pivot, true),
            (Position::LeftWing, false),
            (Position::Staff, false),
        ]);
        state
    }

    #[test]
    fn test_eighth_court_player_is_rejected() {
        let mut state = full_court_state();
        let bench = state.players[7].id;
        let err = set_player_active(&mut state, RosterSide::Ours, bench, true).unwrap_err();
        assert!(matches!(err, RuleError::RosterFull { limit: MAX_ON_COURT }));
        assert!(!state.players[7].active);
    }

    #[test]
    fn test_staff_do_not_count_against_the_cap() {
        let mut state = full_court_state();
        let staff = state.players[8].id;
        set_player_active(&mut state, RosterSide::Ours, staff, true).unwrap();
        assert!(state.players[8].active);
        assert_eq!(state.active_court_count(RosterSide::Ours), MAX_ON_COURT);
    }

    #[test]
    fn test_substitution_at_the_cap_swaps_and_records() {
        let mut state = full_court_state();
        let outgoing = state.players[6].id;
        let incoming = state.players[7].id;
        substitute(&mut state, RosterSide::Ours, incoming, outgoing).unwrap();
        assert!(!state.players[6].active);
        assert!(state.players[7].active);
        assert_eq!(state.active_court_count(RosterSide::Ours), MAX_ON_COURT);
        assert_eq!(state.events.len(), 1);
        let details = state.events[0].substitution.unwrap();
        assert_eq!(details.player_in, incoming);
        assert_eq!(details.player_out, Some(outgoing));
    }

    #[test]
    fn test_substituting_for_a_benched_player_still_hits_the_cap() {
        let mut state = full_court_state();
        state.players[6].active = false;
        let second_bench = state.players[7].id;
        state.players.push({
            let mut p = Player::new(20, "Player 20", Position::Pivot);
            p.active = true;
            p
        });
        // Court is full again; the "outgoing" player is already benched.
        let benched_out = state.players[6].id;
        let err =
            substitute(&mut state, RosterSide::Ours, second_bench, benched_out).unwrap_err();
        assert!(matches!(err, RuleError::RosterFull { .. }));
        assert!(!state.players[7].active);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_disqualified_player_cannot_be_toggled() {
        let mut state = full_court_state();
        let player = state.players[7].id;
        score::record_event(
            &mut state,
            MatchEvent::sanction(
                10,
                1,
                player,
                crate::models::SanctionKind::Disqualification,
            ),
        );
        let err = set_player_active(&mut state, RosterSide::Ours, player, true).unwrap_err();
        assert!(matches!(err, RuleError::Disqualified { .. }));
    }

    #[test]
    fn test_sacrificed_player_cannot_be_toggled_while_serving() {
        let mut state = full_court_state();
        state.game_time = 100;
        let staff = state.players[8].id;
        let victim = state.players[2].id;
        let event = MatchEvent::sanction(100, 1, staff, crate::models::SanctionKind::TwoMinutes)
            .with_sacrificed_player(victim);
        score::record_event(&mut state, event);

        let err = set_player_active(&mut state, RosterSide::Ours, victim, false).unwrap_err();
        assert!(matches!(err, RuleError::Sacrificed { .. }));

        // Once the penalty is served the bar lifts.
        state.game_time = 230;
        set_player_active(&mut state, RosterSide::Ours, victim, false).unwrap();
        assert!(!state.players[2].active);
    }

    #[test]
    fn test_player_serving_a_penalty_cannot_return_early() {
        let mut state = full_court_state();
        let offender = state.players[4].id;
        score::record_event(
            &mut state,
            MatchEvent::sanction(0, 1, offender, crate::models::SanctionKind::TwoMinutes),
        );
        // Benching the offender to serve the penalty is a normal toggle.
        set_player_active(&mut state, RosterSide::Ours, offender, false).unwrap();

        state.game_time = 60;
        let err = set_player_active(&mut state, RosterSide::Ours, offender, true).unwrap_err();
        assert!(matches!(err, RuleError::Suspended { remaining: 60, .. }));
        assert!(!state.players[4].active);

        // Substitution is the same door.
        let on_court = state.players[0].id;
        let err = substitute(&mut state, RosterSide::Ours, offender, on_court).unwrap_err();
        assert!(matches!(err, RuleError::Suspended { .. }));
        assert!(state.players[0].active);

        // Penalty served; re-entry is a plain toggle again.
        state.game_time = 120;
        set_player_active(&mut state, RosterSide::Ours, offender, true).unwrap();
        assert!(state.players[4].active);
    }

    #[test]
    fn test_substituting_a_player_for_themself_is_rejected() {
        let mut state = full_court_state();
        let id = state.players[1].id;
        let err = substitute(&mut state, RosterSide::Ours, id, id).unwrap_err();
        assert!(matches!(err, RuleError::InvalidSubstitution));
    }

    #[test]
    fn test_unknown_player_is_reported() {
        let mut state = full_court_state();
        let ghost = Uuid::new_v4();
        let err = set_player_active(&mut state, RosterSide::Ours, ghost, true).unwrap_err();
        assert!(matches!(err, RuleError::UnknownPlayer { id } if id == ghost));
    }
}
