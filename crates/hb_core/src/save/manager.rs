use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, SavedMatch};
use super::migration::migrate_save;
use crate::engine::score;
use crate::state::MatchState;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{read_dir, remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MATCH_FILE_EXT: &str = "hbm";

/// File-backed store of match records, one file per match.
pub struct SaveManager {
    save_dir: PathBuf,
}

impl SaveManager {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self { save_dir: save_dir.into() }
    }

    /// Manager over the `matches/` directory under the working directory.
    pub fn default_dir() -> Self {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("matches");
        Self::new(dir)
    }

    pub fn match_path(&self, id: Uuid) -> PathBuf {
        self.save_dir.join(format!("match_{}.{}", id, MATCH_FILE_EXT))
    }

    pub fn exists(&self, id: Uuid) -> bool {
        self.match_path(id).exists()
    }

    /// Persist one match under its id.
    pub fn save(&self, state: &MatchState) -> Result<(), SaveError> {
        let save = SavedMatch::new(state.clone());
        let path = self.match_path(state.id);
        Self::save_to_path(&path, &save)?;

        log::info!("Match {} saved", state.id);
        Ok(())
    }

    /// Load one match, migrating older formats as needed.
    pub fn load(&self, id: Uuid) -> Result<MatchState, SaveError> {
        let path = self.match_path(id);
        if !path.exists() {
            return Err(SaveError::MatchNotFound { id });
        }
        let save = Self::load_from_path(&path)?;

        let mut state = save.state;
        // Derived values are never trusted from disk.
        score::recalculate(&mut state);

        log::info!("Match {} loaded", id);
        Ok(state)
    }

    /// Delete a stored match, succeeding if it was already gone.
    pub fn delete(&self, id: Uuid) -> Result<(), SaveError> {
        let path = self.match_path(id);
        if path.exists() {
            remove_file(&path)?;
            log::info!("Deleted match {}", id);
        }
        Ok(())
    }

    /// Summaries of every stored match, most recently saved first.
    /// Unreadable files are skipped, not fatal.
    pub fn list(&self) -> Vec<MatchSummary> {
        let Ok(entries) = read_dir(&self.save_dir) else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MATCH_FILE_EXT) {
                continue;
            }
            match Self::load_from_path(&path) {
                Ok(save) => matches.push(MatchSummary::from_save(&save)),
                Err(err) => log::warn!("Skipping unreadable save {:?}: {}", path, err),
            }
        }

        matches.sort_by(|a, b| b.saved_at.cmp(&a.saved_at)); // Most recent first
        matches
    }

    /// Summaries of one owner's matches only.
    pub fn list_by_owner(&self, owner: &str) -> Vec<MatchSummary> {
        let mut matches = self.list();
        matches.retain(|m| m.owner == owner);
        matches
    }

    // Private helper methods

    fn save_to_path(path: &Path, save: &SavedMatch) -> Result<(), SaveError> {
        // Ensure save directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Serialize and compress
        let data = serialize_and_compress(save)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;

            // sync_all ensures data is written to disk (portable fsync)
            file.sync_all()?;
        }

        // Atomic rename
        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<SavedMatch, SaveError> {
        if !path.exists() {
            return Err(SaveError::FileNotFound { path: path.display().to_string() });
        }

        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let mut save = decompress_and_deserialize(&data)?;

        // Apply migrations if needed
        save = migrate_save(save)?;

        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(save)
    }
}

/// Listing line for a stored match, enough for a picker UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub id: Uuid,
    pub our_team: String,
    pub opponent_team: String,
    pub date: Option<NaiveDate>,
    pub owner: String,
    pub home_score: u16,
    pub away_score: u16,
    pub saved_at: u64,
    pub version: u32,
}

impl MatchSummary {
    fn from_save(save: &SavedMatch) -> Self {
        Self {
            id: save.state.id,
            our_team: save.state.metadata.our_team.clone(),
            opponent_team: save.state.metadata.opponent_team.clone(),
            date: save.state.metadata.date,
            owner: save.state.metadata.owner.clone(),
            home_score: save.state.home_score,
            away_score: save.state.away_score,
            saved_at: save.saved_at,
            version: save.version,
        }
    }

    pub fn format_timestamp(&self) -> String {
        use time::{format_description::well_known::Rfc3339, OffsetDateTime};

        let timestamp =
            OffsetDateTime::from_unix_timestamp_nanos((self.saved_at * 1_000_000) as i128)
                .unwrap_or_else(|_| OffsetDateTime::now_utc());

        timestamp.format(&Rfc3339).unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn get_display_text(&self) -> String {
        format!(
            "{} vs {} ({}:{})",
            self.our_team, self.opponent_team, self.home_score, self.away_score
        )
    }
}
