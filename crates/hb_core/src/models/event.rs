use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default exclusion length for timed sanctions, in minutes.
pub const DEFAULT_SANCTION_MINUTES: u32 = 2;

/// One discrete occurrence on the match timeline.
///
/// Events are immutable once created except for their score snapshot, which
/// is (re)written wholesale by `engine::score::recalculate`. `timestamp` is
/// the game-clock value in seconds; its ordering semantics depend on
/// [`TimerDirection`](crate::models::TimerDirection).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    pub id: Uuid,

    /// Game-clock seconds when the event was recorded.
    pub timestamp: i64,

    /// 1-based period number; values beyond the configured regular periods
    /// denote overtime.
    #[serde(default = "default_period")]
    pub period: u8,

    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Whether the acting side is the opponent roster.
    #[serde(default)]
    pub is_opponent: bool,

    /// Actor on our roster, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<Uuid>,

    /// Actor on the opponent roster, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_player_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shot: Option<ShotDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnover: Option<TurnoverKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive: Option<PositiveActionKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanction: Option<SanctionDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<SubstitutionDetails>,

    /// Cumulative home score up to and including this event, attached at
    /// derivation time. Never trusted as input to a recomputation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_score_snapshot: Option<u16>,

    /// Cumulative away score up to and including this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_score_snapshot: Option<u16>,
}

fn default_period() -> u8 {
    1
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A shot by our roster; outcome decides whether it scores.
    Shot,
    /// A shot by the opponent roster.
    OpponentShot,
    /// Quick-entry opponent goal without shot metadata.
    OpponentGoal,
    Turnover,
    PositiveAction,
    Sanction,
    Substitution,
    Timeout,
}

/// Where a shot was taken from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum ShotZone {
    LeftWing,
    LeftBack,
    CentreBack,
    RightBack,
    RightWing,
    /// Six-metre line, usually the pivot.
    Line,
    SevenMetre,
    FastBreak,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum ShotOutcome {
    Goal,
    Saved,
    Missed,
    Post,
    Blocked,
}

/// Goal-mouth placement on a 3×3 grid, keeper's perspective.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShotPlacement {
    TopLeft,
    TopCentre,
    TopRight,
    MiddleLeft,
    MiddleCentre,
    MiddleRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ShotDetails {
    pub zone: ShotZone,
    pub outcome: ShotOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<ShotPlacement>,
}

impl ShotDetails {
    pub fn new(zone: ShotZone, outcome: ShotOutcome) -> Self {
        Self { zone, outcome, placement: None }
    }

    pub fn with_placement(mut self, placement: ShotPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn is_goal(&self) -> bool {
        self.outcome == ShotOutcome::Goal
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    BadPass,
    Steps,
    OffensiveFoul,
    DoubleDribble,
    AreaViolation,
    LostBall,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum PositiveActionKind {
    Steal,
    Block,
    Assist,
    SevenMetreDrawn,
    TwoMinutesDrawn,
}

/// Disciplinary card kinds in escalation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum SanctionKind {
    /// Yellow card.
    Warning,
    TwoMinutes,
    /// Red card.
    Disqualification,
    /// Blue card: disqualification with written report.
    DisqualificationReport,
}

impl SanctionKind {
    /// Minutes the team plays short for this sanction. Red and blue cards
    /// remove the player for good but still cost the team two minutes.
    pub fn default_duration_min(&self) -> u32 {
        match self {
            SanctionKind::Warning => 0,
            _ => DEFAULT_SANCTION_MINUTES,
        }
    }

    /// Whether this card alone ends the player's match.
    pub fn is_disqualifying(&self) -> bool {
        matches!(self, SanctionKind::Disqualification | SanctionKind::DisqualificationReport)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanctionDetails {
    pub kind: SanctionKind,

    /// Exclusion length in minutes. Absent in data recorded by older
    /// versions; readers treat absence as the two-minute default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<u32>,

    /// Field player removed to serve a staff/coach sanction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sacrificed_player_id: Option<Uuid>,
}

impl SanctionDetails {
    pub fn new(kind: SanctionKind) -> Self {
        Self { kind, duration_min: Some(kind.default_duration_min()), sacrificed_player_id: None }
    }

    /// Exclusion length in seconds, defaulting absent durations to two
    /// minutes as recorded data from older versions did.
    pub fn duration_secs(&self) -> u32 {
        self.duration_min.unwrap_or(DEFAULT_SANCTION_MINUTES) * 60
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubstitutionDetails {
    pub player_in: Uuid,

    /// Absent for entries without a leaving player, e.g. refilling the
    /// court once a staff sanction has been served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_out: Option<Uuid>,
}

impl MatchEvent {
    fn base(timestamp: i64, period: u8, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            period,
            kind,
            is_opponent: false,
            player_id: None,
            opponent_player_id: None,
            shot: None,
            turnover: None,
            positive: None,
            sanction: None,
            substitution: None,
            home_score_snapshot: None,
            away_score_snapshot: None,
        }
    }

    pub fn shot(timestamp: i64, period: u8, player_id: Uuid, shot: ShotDetails) -> Self {
        Self {
            player_id: Some(player_id),
            shot: Some(shot),
            ..Self::base(timestamp, period, EventKind::Shot)
        }
    }

    pub fn opponent_shot(
        timestamp: i64,
        period: u8,
        opponent_player_id: Option<Uuid>,
        shot: ShotDetails,
    ) -> Self {
        Self {
            is_opponent: true,
            opponent_player_id,
            shot: Some(shot),
            ..Self::base(timestamp, period, EventKind::OpponentShot)
        }
    }

    pub fn opponent_goal(timestamp: i64, period: u8, opponent_player_id: Option<Uuid>) -> Self {
        Self {
            is_opponent: true,
            opponent_player_id,
            ..Self::base(timestamp, period, EventKind::OpponentGoal)
        }
    }

    pub fn turnover(timestamp: i64, period: u8, player_id: Uuid, kind: TurnoverKind) -> Self {
        Self {
            player_id: Some(player_id),
            turnover: Some(kind),
            ..Self::base(timestamp, period, EventKind::Turnover)
        }
    }

    pub fn positive_action(
        timestamp: i64,
        period: u8,
        player_id: Uuid,
        kind: PositiveActionKind,
    ) -> Self {
        Self {
            player_id: Some(player_id),
            positive: Some(kind),
            ..Self::base(timestamp, period, EventKind::PositiveAction)
        }
    }

    pub fn sanction(timestamp: i64, period: u8, player_id: Uuid, kind: SanctionKind) -> Self {
        Self {
            player_id: Some(player_id),
            sanction: Some(SanctionDetails::new(kind)),
            ..Self::base(timestamp, period, EventKind::Sanction)
        }
    }

    pub fn opponent_sanction(
        timestamp: i64,
        period: u8,
        opponent_player_id: Uuid,
        kind: SanctionKind,
    ) -> Self {
        Self {
            is_opponent: true,
            opponent_player_id: Some(opponent_player_id),
            sanction: Some(SanctionDetails::new(kind)),
            ..Self::base(timestamp, period, EventKind::Sanction)
        }
    }

    /// Attach the field player sacrificed to serve a staff/coach sanction.
    pub fn with_sacrificed_player(mut self, sacrificed: Uuid) -> Self {
        if let Some(ref mut sanction) = self.sanction {
            sanction.sacrificed_player_id = Some(sacrificed);
        }
        self
    }

    pub fn substitution(
        timestamp: i64,
        period: u8,
        is_opponent: bool,
        player_in: Uuid,
        player_out: Option<Uuid>,
    ) -> Self {
        Self {
            is_opponent,
            substitution: Some(SubstitutionDetails { player_in, player_out }),
            ..Self::base(timestamp, period, EventKind::Substitution)
        }
    }

    pub fn timeout(timestamp: i64, period: u8, is_opponent: bool) -> Self {
        Self { is_opponent, ..Self::base(timestamp, period, EventKind::Timeout) }
    }

    /// Identity of the acting player on whichever roster acted.
    pub fn actor_id(&self) -> Option<Uuid> {
        if self.is_opponent {
            self.opponent_player_id
        } else {
            self.player_id
        }
    }

    /// `Some(true)` for an opponent goal, `Some(false)` for ours, `None`
    /// when the event does not score.
    pub fn goal_for_opponent(&self) -> Option<bool> {
        match self.kind {
            EventKind::Shot if self.shot.is_some_and(|s| s.is_goal()) => Some(false),
            EventKind::OpponentShot if self.shot.is_some_and(|s| s.is_goal()) => Some(true),
            EventKind::OpponentGoal => Some(true),
            _ => None,
        }
    }

    pub fn is_sanction(&self) -> bool {
        self.kind == EventKind::Sanction
    }

    /// Sanction payload of a timed sanction; `None` for non-sanctions and
    /// for warnings, which carry no countdown.
    pub fn timed_sanction(&self) -> Option<&SanctionDetails> {
        self.sanction.as_ref().filter(|s| s.duration_secs() > 0)
    }
}
