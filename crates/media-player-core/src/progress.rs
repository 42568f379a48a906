use crate::history::{HistoryPatch, HistoryRepository};
use tracing::{debug, trace, warn};

/// Position of the active content at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub content_id: String,
    pub position: f64,
    pub duration: Option<f64>,
}

/// Writes playback progress into existing history rows.
///
/// Rows are created by whoever starts playback; this only updates them.
#[derive(Clone)]
pub struct ProgressPersistence {
    history: HistoryRepository,
}

impl ProgressPersistence {
    pub fn new(history: HistoryRepository) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &HistoryRepository {
        &self.history
    }

    /// Periodic save. Returns whether a row was updated.
    pub fn tick(&self, snapshot: Option<&ProgressSnapshot>) -> bool {
        self.save(snapshot, "tick")
    }

    /// Immediate save on unmount or before a source swap.
    pub fn flush(&self, snapshot: Option<&ProgressSnapshot>) -> bool {
        self.save(snapshot, "flush")
    }

    fn save(&self, snapshot: Option<&ProgressSnapshot>, operation: &'static str) -> bool {
        let Some(snapshot) = snapshot else {
            trace!(operation, "No active content, skipping progress save");
            return false;
        };

        let position = if snapshot.position.is_finite() {
            snapshot.position.max(0.0)
        } else {
            0.0
        };
        let patch = HistoryPatch {
            progress: position,
            duration: snapshot.duration.filter(|d| d.is_finite() && *d > 0.0),
        };

        match self.history.upsert(&snapshot.content_id, patch) {
            Ok(updated) => {
                debug!(operation, content_id = %snapshot.content_id, position, updated, "Saved progress");
                updated
            }
            Err(e) => {
                warn!(operation, content_id = %snapshot.content_id, error = %e, "Failed to save progress");
                false
            }
        }
    }
}
