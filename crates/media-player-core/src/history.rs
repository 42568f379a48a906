use crate::store::KeyValueStore;
use anyhow::Result;
use chrono::Utc;
use media_player_config::HistoryConfig;
use media_player_models::HistoryEntry;
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[cfg(test)]
mod tests;

pub const DEFAULT_STORAGE_KEY: &str = "watch_history";
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Fields refreshed by a progress write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPatch {
    pub progress: f64,
    /// Left untouched when `None` (metadata not loaded yet)
    pub duration: Option<f64>,
}

/// Watch history persisted as one JSON array under a single store key.
///
/// Newest first, one row per id, at most `max_entries` rows.
#[derive(Clone)]
pub struct HistoryRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_entries: usize,
}

impl HistoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: DEFAULT_STORAGE_KEY.to_string(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_config(store: Arc<dyn KeyValueStore>, config: &HistoryConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            max_entries: config.max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// All rows, newest first. A value that does not parse is treated as empty.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                Ok(entries)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Watch history is unreadable, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(&self.key, &json)
    }

    pub fn get(&self, id: &str) -> Result<Option<HistoryEntry>> {
        Ok(self.list()?.into_iter().find(|entry| entry.id == id))
    }

    /// Put `entry` at the front as the most recently started item.
    ///
    /// Replaces any row with the same id and returns that row's progress so
    /// the caller can resume from it.
    pub fn record_start(&self, mut entry: HistoryEntry) -> Result<Option<f64>> {
        let mut entries = self.list()?;
        let previous = entries
            .iter()
            .position(|existing| existing.id == entry.id)
            .map(|index| entries.remove(index).progress);

        entry.timestamp = Utc::now();
        debug!(id = %entry.id, previous_progress = ?previous, "Recording playback start");
        entries.insert(0, entry);
        entries.truncate(self.max_entries);
        self.save(&entries)?;
        Ok(previous)
    }

    /// Update an existing row; ids without a row are left alone.
    pub fn upsert(&self, id: &str, patch: HistoryPatch) -> Result<bool> {
        let mut entries = self.list()?;
        let Some(index) = entries.iter().position(|entry| entry.id == id) else {
            trace!(id, "No history row to update");
            return Ok(false);
        };

        let mut entry = entries.remove(index);
        if patch.progress.is_finite() {
            entry.progress = patch.progress.max(0.0);
        }
        if let Some(duration) = patch.duration.filter(|d| d.is_finite() && *d > 0.0) {
            entry.duration = duration;
        }
        entry.timestamp = Utc::now();
        entries.insert(0, entry);
        self.save(&entries)?;
        Ok(true)
    }

    /// Drop the oldest rows beyond the cap. Returns how many were removed.
    pub fn evict_overflow(&self) -> Result<usize> {
        let mut entries = self.list()?;
        if entries.len() <= self.max_entries {
            return Ok(0);
        }
        let evicted = entries.len() - self.max_entries;
        entries.truncate(self.max_entries);
        self.save(&entries)?;
        debug!(evicted, "Evicted old history rows");
        Ok(evicted)
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut entries = self.list()?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}
