use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
        }
    }
}

/// One row of the persisted watch history.
///
/// Field names match the JSON written by the web client so the same list can
/// be read and written by both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub video_url: String,
    /// Seconds watched
    #[serde(default, deserialize_with = "crate::lenient_seconds")]
    pub progress: f64,
    /// Seconds, zero when unknown
    #[serde(default, deserialize_with = "crate::lenient_seconds")]
    pub duration: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "seriesId", default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(rename = "seasonNumber", default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(rename = "episodeNumber", default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    /// Fields this crate does not model (copied catalog metadata, `seriesTitle`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl HistoryEntry {
    pub fn movie(id: impl Into<String>, title: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: ContentKind::Movie,
            video_url: video_url.into(),
            progress: 0.0,
            duration: 0.0,
            timestamp: Utc::now(),
            series_id: None,
            season_number: None,
            episode_number: None,
            poster_url: None,
            backdrop_url: None,
            extra: BTreeMap::new(),
        }
    }

    /// Watched share in percent, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.progress / self.duration * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_series(&self) -> bool {
        self.kind == ContentKind::Series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_web_client_row() {
        let json = r#"{
            "id": "ep-7",
            "title": "Show - S01E02: Pilot",
            "type": "series",
            "timestamp": "2025-03-01T10:00:00.000Z",
            "progress": 1,
            "duration": null,
            "video_url": "https://cdn.example/ep7.mp4",
            "seriesId": "show-1",
            "seasonNumber": 1,
            "episodeNumber": 2,
            "seriesTitle": "Show"
        }"#;

        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, ContentKind::Series);
        assert_eq!(entry.progress, 1.0);
        assert_eq!(entry.duration, 0.0);
        assert_eq!(entry.series_id.as_deref(), Some("show-1"));
        assert_eq!(entry.extra.get("seriesTitle"), Some(&Value::from("Show")));

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["type"], "series");
        assert_eq!(back["seasonNumber"], 1);
        assert_eq!(back["seriesTitle"], "Show");
        assert!(back.get("poster_url").is_none());
    }

    #[test]
    fn test_progress_percent() {
        let mut entry = HistoryEntry::movie("m1", "Movie", "u");
        assert_eq!(entry.progress_percent(), 0.0);
        entry.duration = 200.0;
        entry.progress = 50.0;
        assert_eq!(entry.progress_percent(), 25.0);
        entry.progress = 500.0;
        assert_eq!(entry.progress_percent(), 100.0);
    }
}
