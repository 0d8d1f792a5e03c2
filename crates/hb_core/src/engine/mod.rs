//! Rule evaluation over [`MatchState`](crate::state::MatchState).
//!
//! Everything in here is a pure function of the state it is handed. The
//! modules never touch storage or the process-wide slot; callers decide
//! where states come from and where results go.

pub mod clock;
pub mod roster;
pub mod sanctions;
pub mod score;
pub mod stats;
pub mod undo;


pub use clock::TickOutcome;
pub use sanctions::{ExpiryPrompt, SanctionCategory, SanctionClock};
pub use stats::{MatchStatistics, PlayerLine, TeamTotals, ZoneLine};
