use crate::controller::PlaybackController;
use crate::error::NavigationError;
use crate::progress::{ProgressPersistence, ProgressSnapshot};
use chrono::Utc;
use media_player_catalog::Catalog;
use media_player_models::{episode_code, ContentKind, Episode, HistoryEntry, SeriesInfo};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{error, info, warn};


pub const DEFAULT_PLACEHOLDER_PROGRESS: f64 = 1.0;
pub const DEFAULT_EPISODE_DURATION: f64 = 2400.0;

/// Ordered episode list of one series plus the episode being played.
pub struct EpisodeNavigator {
    series_id: String,
    series: Option<SeriesInfo>,
    episodes: Vec<Episode>,
    current: Option<usize>,
    switching_to: Option<String>,
    placeholder_progress: f64,
    default_duration: f64,
}

impl EpisodeNavigator {
    pub fn new(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            series: None,
            episodes: Vec::new(),
            current: None,
            switching_to: None,
            placeholder_progress: DEFAULT_PLACEHOLDER_PROGRESS,
            default_duration: DEFAULT_EPISODE_DURATION,
        }
    }

    /// Override the "just started" progress and the duration used when an
    /// episode does not declare one.
    pub fn with_defaults(mut self, placeholder_progress: f64, default_duration: f64) -> Self {
        self.placeholder_progress = placeholder_progress;
        self.default_duration = default_duration;
        self
    }

    pub fn series_id(&self) -> &str {
        &self.series_id
    }

    /// Fetch the full episode list. Failures are logged and yield nothing.
    pub async fn fetch_episodes(catalog: &dyn Catalog, series_id: &str) -> Vec<Episode> {
        match catalog.episodes(series_id).await {
            Ok(episodes) => episodes,
            Err(e) => {
                error!(series_id, error = %e, "Failed to load episodes");
                Vec::new()
            }
        }
    }

    pub async fn fetch_series(catalog: &dyn Catalog, series_id: &str) -> Option<SeriesInfo> {
        match catalog.series(series_id).await {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(series_id, error = %e, "Failed to load series metadata");
                None
            }
        }
    }

    /// Fetch and install the list, selecting `(season, episode)` as current.
    pub async fn load_episodes(
        &mut self,
        catalog: &dyn Catalog,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> usize {
        let episodes = Self::fetch_episodes(catalog, &self.series_id).await;
        self.set_episodes(episodes, season, episode);
        self.episodes.len()
    }

    pub fn set_episodes(&mut self, mut episodes: Vec<Episode>, season: Option<u32>, episode: Option<u32>) {
        episodes.sort_by_key(Episode::sort_key);
        let keep = self.current_episode().map(|e| e.id.clone());
        self.episodes = episodes;

        self.current = match (season, episode) {
            (Some(season), Some(number)) => self
                .episodes
                .iter()
                .position(|e| e.season_number == season && e.episode_number == number),
            _ => None,
        }
        .or_else(|| keep.and_then(|id| self.find(&id)));

        info!(
            series_id = %self.series_id,
            count = self.episodes.len(),
            current = ?self.current_episode().map(Episode::code),
            "Episodes loaded"
        );
    }

    /// Mark `id` as current without switching media.
    pub fn select(&mut self, id: &str) -> bool {
        match self.find(id) {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn set_series(&mut self, series: SeriesInfo) {
        self.series = Some(series);
    }

    pub fn series(&self) -> Option<&SeriesInfo> {
        self.series.as_ref()
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.current.and_then(|index| self.episodes.get(index))
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.current.and_then(|index| index.checked_sub(1))
    }

    pub fn next_index(&self) -> Option<usize> {
        self.current
            .map(|index| index + 1)
            .filter(|index| *index < self.episodes.len())
    }

    pub fn previous(&self) -> Option<&Episode> {
        self.previous_index().and_then(|index| self.episodes.get(index))
    }

    pub fn next(&self) -> Option<&Episode> {
        self.next_index().and_then(|index| self.episodes.get(index))
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.episodes.iter().position(|e| e.id == id)
    }

    /// Distinct season numbers, ascending.
    pub fn seasons(&self) -> Vec<u32> {
        let mut seasons: Vec<u32> = self.episodes.iter().map(|e| e.season_number).collect();
        seasons.dedup();
        seasons
    }

    pub fn episodes_in_season(&self, season: u32) -> Vec<&Episode> {
        self.episodes
            .iter()
            .filter(|e| e.season_number == season)
            .collect()
    }

    /// e.g. "S01E02 - Episode 2 of 10"
    pub fn position_label(&self) -> Option<String> {
        let index = self.current?;
        let episode = self.episodes.get(index)?;
        Some(format!(
            "{} - Episode {} of {}",
            episode.code(),
            index + 1,
            self.episodes.len()
        ))
    }

    pub fn is_switching(&self) -> bool {
        self.switching_to.is_some()
    }

    /// Episode whose source is still loading.
    pub fn pending_switch(&self) -> Option<&str> {
        self.switching_to.as_deref()
    }

    /// The new source became ready, failed, or stalled; accept navigation again.
    pub fn finish_switch(&mut self) -> Option<String> {
        self.switching_to.take()
    }

    /// History row written when playback of `episode` starts.
    pub fn history_entry_for(&self, episode: &Episode, progress: f64) -> HistoryEntry {
        let series_title = self
            .series
            .as_ref()
            .map(|s| s.title.as_str())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Series");

        let mut extra = BTreeMap::new();
        extra.insert("seriesTitle".to_string(), Value::String(series_title.to_string()));
        extra.insert("episodeTitle".to_string(), Value::String(episode.title.clone()));

        HistoryEntry {
            id: episode.id.clone(),
            title: format!("{} - {}: {}", series_title, episode.code(), episode.title),
            kind: ContentKind::Series,
            video_url: episode.video_url.clone(),
            progress,
            duration: episode.duration_seconds().unwrap_or(self.default_duration),
            timestamp: Utc::now(),
            series_id: Some(self.series_id.clone()),
            season_number: Some(episode.season_number),
            episode_number: Some(episode.episode_number),
            poster_url: self.series.as_ref().and_then(|s| s.poster_url.clone()),
            backdrop_url: self.series.as_ref().and_then(|s| s.backdrop_url.clone()),
            extra,
        }
    }

    /// Switch playback to the episode at `index`.
    ///
    /// The outgoing episode's progress is flushed before the source changes.
    pub fn go_to(
        &mut self,
        index: usize,
        controller: &mut PlaybackController,
        progress: &ProgressPersistence,
        outgoing: Option<&ProgressSnapshot>,
    ) -> Result<(), NavigationError> {
        if let Some(pending) = &self.switching_to {
            warn!(pending = %pending, "Episode switch already in progress, ignoring request");
            return Err(NavigationError::InFlight(pending.clone()));
        }

        let episode = self
            .episodes
            .get(index)
            .cloned()
            .ok_or(NavigationError::NoEpisode)?;
        if !episode.has_media() {
            error!(episode_id = %episode.id, "Episode has no video URL");
            return Err(NavigationError::MissingVideoUrl(episode.id));
        }

        info!(
            from = ?self.current_episode().map(Episode::code),
            to = %episode_code(episode.season_number, episode.episode_number),
            "Switching episode"
        );

        controller.pause();
        progress.flush(outgoing);

        let stored = match progress.history().get(&episode.id) {
            Ok(entry) => entry.map(|e| e.progress).unwrap_or(0.0),
            Err(e) => {
                warn!(episode_id = %episode.id, error = %e, "Could not read stored progress");
                0.0
            }
        };

        controller.load(episode.video_url.trim(), stored);
        self.current = Some(index);
        self.switching_to = Some(episode.id.clone());

        // Placeholder until the first tick replaces it; playback still resumes from `stored`.
        if let Err(e) = progress
            .history()
            .record_start(self.history_entry_for(&episode, self.placeholder_progress))
        {
            warn!(episode_id = %episode.id, error = %e, "Failed to record episode start");
        }

        Ok(())
    }
}
