// Save/Load for match records
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;
pub mod manager;
pub mod migration;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, serialize_and_compress, SavedMatch};
pub use manager::{MatchSummary, SaveManager};
pub use migration::migrate_save;

pub const SAVE_VERSION: u32 = 1;
