use super::error::SaveError;
use super::format::SavedMatch;
use super::SAVE_VERSION;
use crate::models::SanctionKind;

/// Migrate stored match data from older versions to the current format
pub fn migrate_save(mut save: SavedMatch) -> Result<SavedMatch, SaveError> {
    let original_version = save.version;

    // Apply migrations step by step
    save = match save.version {
        0 => migrate_v0_to_v1(save)?,
        1 => save, // Current version, no migration needed
        v if v > SAVE_VERSION => {
            // Future version - might be compatible
            log::warn!("Loading save from future version {} (current: {})", v, SAVE_VERSION);
            save
        }
        _ => {
            return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
        }
    };

    // Update to current version
    save.version = SAVE_VERSION;
    save.update_timestamp();

    if original_version != SAVE_VERSION {
        log::info!("Migrated match save from version {} to {}", original_version, SAVE_VERSION);
    }

    Ok(save)
}

/// Migrate from version 0 to version 1
fn migrate_v0_to_v1(mut save: SavedMatch) -> Result<SavedMatch, SaveError> {
    log::info!("Migrating match save from version 0 to 1");
    backfill_legacy_state(&mut save.state);
    Ok(save)
}

/// Normalize fields that older recordings stored differently. Also used on
/// unversioned JSON imports, so every fix must be idempotent and harmless
/// on current data.
pub(crate) fn backfill_legacy_state(state: &mut crate::state::MatchState) {
    // 1. Records from before periods existed all belong to the first period
    if state.current_period == 0 {
        state.current_period = 1;
    }
    for event in &mut state.events {
        if event.period == 0 {
            event.period = 1;
        }
    }

    // 2. Old recordings stored warnings without a duration. Left absent,
    //    the two-minute fallback would turn every yellow card into a
    //    timed suspension, so pin them to zero.
    for event in &mut state.events {
        if let Some(ref mut sanction) = event.sanction {
            if sanction.kind == SanctionKind::Warning && sanction.duration_min.is_none() {
                sanction.duration_min = Some(0);
            }
        }
    }

    // 3. Drop resolved-sanction ids that no longer match any event
    let event_ids: std::collections::HashSet<_> = state.events.iter().map(|e| e.id).collect();
    state.resolved_sanctions.retain(|id| event_ids.contains(id));
}

/// Check if stored data needs migration
pub fn needs_migration(save: &SavedMatch) -> bool {
    save.version < SAVE_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchConfig, MatchEvent, MatchMetadata};
    use crate::state::MatchState;
    use uuid::Uuid;

    fn v0_save() -> SavedMatch {
        let mut state = MatchState::new(MatchMetadata::default(), MatchConfig::default());
        state.current_period = 0;

        let mut goal = MatchEvent::opponent_goal(30, 1, None);
        goal.period = 0;
        state.events.push(goal);

        let mut warning =
            MatchEvent::sanction(50, 1, Uuid::new_v4(), SanctionKind::Warning);
        if let Some(ref mut sanction) = warning.sanction {
            sanction.duration_min = None;
        }
        state.events.push(warning);

        state.resolved_sanctions.insert(Uuid::new_v4());

        let mut save = SavedMatch::new(state);
        save.version = 0;
        save
    }

    #[test]
    fn test_migrate_v0_to_v1() {
        let migrated = migrate_save(v0_save()).unwrap();

        assert_eq!(migrated.version, 1);
        assert_eq!(migrated.state.current_period, 1);
        assert!(migrated.state.events.iter().all(|e| e.period == 1));
        let sanction = migrated.state.events[1].sanction.unwrap();
        assert_eq!(sanction.duration_min, Some(0), "legacy warnings carry no countdown");
        assert!(migrated.state.resolved_sanctions.is_empty(), "stale ids are dropped");
    }

    #[test]
    fn test_no_migration_needed() {
        let state = MatchState::new(MatchMetadata::default(), MatchConfig::default());
        let save = SavedMatch::new(state);
        assert!(!needs_migration(&save));

        let result = migrate_save(save.clone()).unwrap();
        assert_eq!(result.version, save.version);
        assert_eq!(result.state, save.state);
    }

    #[test]
    fn test_future_version_passes_through() {
        let state = MatchState::new(MatchMetadata::default(), MatchConfig::default());
        let mut save = SavedMatch::new(state);
        save.version = 999;

        let result = migrate_save(save);
        assert!(result.is_ok());
    }
}
