//! Game clock advancement and period transitions.
//!
//! The clock never runs past a period boundary on its own: a tick that
//! would cross the horn clamps to it, pauses the match and reports the
//! period as finished. Moving into the next period is always an explicit
//! operator action.

use crate::models::TimerDirection;
use crate::state::MatchState;

/// What a clock tick did besides moving the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// The tick reached the end of the current period.
    pub period_finished: bool,
}

/// Advance the game clock by `elapsed_secs` of real play.
///
/// Does nothing while paused. Court time is credited to every active
/// court player on both rosters, using the clamped delta so nobody is
/// credited for time past the horn.
pub fn tick(state: &mut MatchState, elapsed_secs: u32) -> TickOutcome {
    if state.paused || elapsed_secs == 0 {
        return TickOutcome { period_finished: false };
    }

    let end = state.config.period_end_clock(state.current_period);
    let distance = match state.config.timer_direction {
        TimerDirection::CountUp => (end - state.game_time).max(0),
        TimerDirection::CountDown => (state.game_time - end).max(0),
    };
    let delta = i64::from(elapsed_secs).min(distance);
    match state.config.timer_direction {
        TimerDirection::CountUp => state.game_time += delta,
        TimerDirection::CountDown => state.game_time -= delta,
    }

    if delta > 0 {
        let period = state.current_period;
        let secs = delta as u32;
        for player in state.players.iter_mut().chain(state.opponent_players.iter_mut()) {
            if player.active && player.position.is_court_player() {
                player.add_playing_time(period, secs);
            }
        }
    }

    let period_finished = distance <= i64::from(elapsed_secs);
    if period_finished {
        state.paused = true;
        log::info!("period {} finished at {}", state.current_period, state.game_time);
    }
    TickOutcome { period_finished }
}

/// Move to the next period and park the clock at its starting value.
/// The match comes back paused; throw-off restarts it.
pub fn advance_period(state: &mut MatchState) {
    state.current_period += 1;
    state.game_time = state.config.period_start_clock(state.current_period);
    state.paused = true;
    log::info!("advanced to period {}", state.current_period);
}

pub fn set_paused(state: &mut MatchState, paused: bool) {
    if state.paused != paused {
        log::debug!("clock {}", if paused { "paused" } else { "running" });
    }
    state.paused = paused;
}
