use crate::history::{ContentKind, HistoryEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LaunchContentType {
    Movie,
    Series,
    Episode,
}

impl From<ContentKind> for LaunchContentType {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Movie => LaunchContentType::Movie,
            ContentKind::Series => LaunchContentType::Series,
        }
    }
}

/// Parameters handed to the player view when navigating to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub content_id: Option<String>,
    pub content_type: LaunchContentType,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

impl LaunchRequest {
    pub fn movie(video_url: impl Into<String>, content_id: impl Into<String>, start_time: f64) -> Self {
        Self {
            video_url: Some(video_url.into()),
            content_id: Some(content_id.into()),
            content_type: LaunchContentType::Movie,
            start_time,
            series_id: None,
            season_number: None,
            episode_number: None,
        }
    }

    pub fn episode(
        video_url: impl Into<String>,
        episode_id: impl Into<String>,
        series_id: impl Into<String>,
        season_number: u32,
        episode_number: u32,
        start_time: f64,
    ) -> Self {
        Self {
            video_url: Some(video_url.into()),
            content_id: Some(episode_id.into()),
            content_type: LaunchContentType::Episode,
            start_time,
            series_id: Some(series_id.into()),
            season_number: Some(season_number),
            episode_number: Some(episode_number),
        }
    }

    /// Resume a history row where it left off.
    pub fn resume(entry: &HistoryEntry) -> Self {
        let series = entry.is_series();
        Self {
            video_url: Some(entry.video_url.clone()),
            content_id: Some(entry.id.clone()),
            content_type: entry.kind.into(),
            start_time: entry.progress,
            series_id: if series { entry.series_id.clone() } else { None },
            season_number: if series { entry.season_number } else { None },
            episode_number: if series { entry.episode_number } else { None },
        }
    }

    /// The URL to play, if one was supplied and is not blank.
    pub fn playable_url(&self) -> Option<&str> {
        self.video_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Series id when this launch plays part of a series.
    pub fn series_context(&self) -> Option<&str> {
        match self.content_type {
            LaunchContentType::Series | LaunchContentType::Episode => self.series_id.as_deref(),
            LaunchContentType::Movie => None,
        }
    }
}
