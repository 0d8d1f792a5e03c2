use thiserror::Error;
use uuid::Uuid;

/// Rule violations raised by the engine.
///
/// Every variant is synchronous and recoverable: the offending intent is
/// rejected, state is left untouched and the message is meant for the
/// operator verbatim.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Only {limit} players may be on court; bench someone first")]
    RosterFull { limit: usize },

    #[error("{name} is disqualified for the rest of the match")]
    Disqualified { name: String },

    #[error("{name} is serving a staff sanction and cannot be selected yet")]
    Sacrificed { name: String },

    #[error("{name} is suspended for another {remaining} seconds")]
    Suspended { name: String, remaining: u32 },

    #[error("No player with id {id} on this roster")]
    UnknownPlayer { id: Uuid },

    #[error("No event with id {id} in the match log")]
    UnknownEvent { id: Uuid },

    #[error("Event {id} is not a sanction")]
    NotASanction { id: Uuid },

    #[error("Substitution needs an active outgoing player and a benched incoming player")]
    InvalidSubstitution,
}

pub type Result<T> = std::result::Result<T, RuleError>;
