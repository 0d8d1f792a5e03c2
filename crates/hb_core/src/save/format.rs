use super::error::SaveError;
use super::SAVE_VERSION;
use crate::state::MatchState;
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// One stored match: the full state plus the envelope needed to read it
/// back years later.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedMatch {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub saved_at: u64,

    /// The match itself, event log included.
    pub state: MatchState,
}

impl SavedMatch {
    pub fn new(state: MatchState) -> Self {
        Self { version: SAVE_VERSION, saved_at: current_timestamp(), state }
    }

    pub fn update_timestamp(&mut self) {
        self.saved_at = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        // Basic sanity bounds
        if self.state.players.len() + self.state.opponent_players.len() > 100 {
            return Err(SaveError::DataTooLarge {
                size: self.state.players.len() + self.state.opponent_players.len(),
            });
        }

        // Check for duplicate roster ids across both teams
        let mut member_ids = std::collections::HashSet::new();
        for player in self.state.players.iter().chain(self.state.opponent_players.iter()) {
            if !member_ids.insert(player.id) {
                return Err(SaveError::Corrupted);
            }
        }

        // And for duplicate event ids
        let mut event_ids = std::collections::HashSet::new();
        for event in &self.state.events {
            if !event_ids.insert(event.id) {
                return Err(SaveError::Corrupted);
            }
        }

        Ok(())
    }
}

/// Serialize and compress a stored match
pub fn serialize_and_compress(save: &SavedMatch) -> Result<Vec<u8>, SaveError> {
    // Validate before serialization
    save.validate()?;

    // 1. Serialize to MessagePack with field names
    let msgpack = to_vec_named(save).map_err(SaveError::Serialization)?;

    // 2. Compress with LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. Add SHA256 checksum at the end
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Decompress and deserialize a stored match
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<SavedMatch, SaveError> {
    // Check minimum size (header + checksum)
    if bytes.len() < 4 + 32 {
        return Err(SaveError::Corrupted);
    }

    // Split payload and checksum
    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    // Verify checksum
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    // Decompress
    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;

    // Deserialize
    let save: SavedMatch = from_slice(&msgpack).map_err(SaveError::Deserialization)?;

    // Validate version
    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }

    Ok(save)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchConfig, MatchEvent, MatchMetadata, Player, Position};

    fn sample_save() -> SavedMatch {
        let mut state = MatchState::new(MatchMetadata::default(), MatchConfig::default());
        state.players.push(Player::new(1, "Keeper", Position::Goalkeeper));
        state.events.push(MatchEvent::opponent_goal(30, 1, None));
        SavedMatch::new(state)
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let save = sample_save();

        let serialized = serialize_and_compress(&save).unwrap();
        let deserialized = decompress_and_deserialize(&serialized).unwrap();

        assert_eq!(save, deserialized);
    }

    #[test]
    fn test_checksum_validation() {
        let save = sample_save();
        let mut serialized = serialize_and_compress(&save).unwrap();

        // Corrupt the checksum
        if let Some(last) = serialized.last_mut() {
            *last = last.wrapping_add(1);
        }

        let result = decompress_and_deserialize(&serialized);
        assert!(matches!(result, Err(SaveError::ChecksumMismatch)));
    }

    #[test]
    fn test_duplicate_roster_ids_are_rejected() {
        let mut save = sample_save();
        let clone = save.state.players[0].clone();
        save.state.opponent_players.push(clone);

        assert!(matches!(serialize_and_compress(&save), Err(SaveError::Corrupted)));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let mut save = sample_save();
        save.version = SAVE_VERSION + 1;

        let serialized = {
            // Bypass validate-and-version path to craft the payload.
            let msgpack = to_vec_named(&save).unwrap();
            let mut compressed = compress_prepend_size(&msgpack);
            let mut hasher = Sha256::new();
            hasher.update(&compressed);
            let checksum = hasher.finalize();
            compressed.extend_from_slice(&checksum);
            compressed
        };

        let result = decompress_and_deserialize(&serialized);
        assert!(matches!(result, Err(SaveError::VersionMismatch { .. })));
    }

    #[test]
    fn test_compression_shrinks_a_long_log() {
        let mut save = sample_save();
        for i in 0..300 {
            save.state.events.push(MatchEvent::opponent_goal(i, 1, None));
        }

        let uncompressed = to_vec_named(&save).unwrap();
        let compressed = serialize_and_compress(&save).unwrap();

        assert!(compressed.len() < uncompressed.len());
    }
}
