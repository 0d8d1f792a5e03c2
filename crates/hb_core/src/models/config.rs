use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction the game clock runs in.
///
/// Under a countdown clock a later real-world moment has a *smaller*
/// timestamp, which inverts the chronological ordering of events within a
/// period. Everything that sorts or measures elapsed time goes through
/// [`MatchConfig`] so the two conventions never leak apart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerDirection {
    #[default]
    CountUp,
    CountDown,
}

/// Timing configuration for a match.
///
/// Older saves may lack any of these fields; each one deserializes to the
/// regulation default (2 × 30 minute periods, 5 minute overtime, clock
/// counting up).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    /// Number of regular periods. Periods beyond this are overtime.
    #[serde(default = "default_period_count")]
    pub period_count: u8,

    /// Length of a regular period in minutes.
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u32,

    /// Length of an overtime period in minutes.
    #[serde(default = "default_overtime_minutes")]
    pub overtime_minutes: u32,

    #[serde(default)]
    pub timer_direction: TimerDirection,
}

fn default_period_count() -> u8 {
    2
}

fn default_period_minutes() -> u32 {
    30
}

fn default_overtime_minutes() -> u32 {
    5
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            period_count: default_period_count(),
            period_minutes: default_period_minutes(),
            overtime_minutes: default_overtime_minutes(),
            timer_direction: TimerDirection::default(),
        }
    }
}

impl MatchConfig {
    /// Whether the given 1-based period number is overtime.
    pub fn is_overtime(&self, period: u8) -> bool {
        period > self.period_count
    }

    /// Length of the given period in seconds (regular vs overtime).
    pub fn period_length_secs(&self, period: u8) -> i64 {
        let minutes =
            if self.is_overtime(period) { self.overtime_minutes } else { self.period_minutes };
        i64::from(minutes) * 60
    }

    /// Clock value at which the given period starts.
    pub fn period_start_clock(&self, period: u8) -> i64 {
        match self.timer_direction {
            TimerDirection::CountUp => 0,
            TimerDirection::CountDown => self.period_length_secs(period),
        }
    }

    /// Clock value at which the given period ends.
    pub fn period_end_clock(&self, period: u8) -> i64 {
        match self.timer_direction {
            TimerDirection::CountUp => self.period_length_secs(period),
            TimerDirection::CountDown => 0,
        }
    }
}

/// Descriptive data about the fixture itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchMetadata {
    #[serde(default)]
    pub our_team: String,

    #[serde(default)]
    pub opponent_team: String,

    /// Scheduled date of the fixture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub venue: String,

    /// Competition round or matchday label.
    #[serde(default)]
    pub round: String,

    /// Whether our team is listed as the home side. Decides which score
    /// column our goals count toward.
    #[serde(default = "default_is_our_team_home")]
    pub is_our_team_home: bool,

    /// Account the match belongs to, used when listing stored matches.
    #[serde(default)]
    pub owner: String,
}

fn default_is_our_team_home() -> bool {
    true
}

impl Default for MatchMetadata {
    fn default() -> Self {
        Self {
            our_team: String::new(),
            opponent_team: String::new(),
            date: None,
            venue: String::new(),
            round: String::new(),
            is_our_team_home: default_is_our_team_home(),
            owner: String::new(),
        }
    }
}
