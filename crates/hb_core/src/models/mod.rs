pub mod config;
pub mod event;
pub mod player;

pub use config::{MatchConfig, MatchMetadata, TimerDirection};
pub use event::{
    EventKind, MatchEvent, PositiveActionKind, SanctionDetails, SanctionKind, ShotDetails,
    ShotOutcome, ShotPlacement, ShotZone, SubstitutionDetails, TurnoverKind,
    DEFAULT_SANCTION_MINUTES,
};
pub use player::{Player, Position, RosterSide};
