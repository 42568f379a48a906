use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub id: String,
    pub series_id: String,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: String,
    /// Minutes
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Episode {
    pub fn sort_key(&self) -> (u32, u32) {
        (self.season_number, self.episode_number)
    }

    pub fn code(&self) -> String {
        crate::episode_code(self.season_number, self.episode_number)
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration.filter(|m| *m > 0.0).map(|m| m * 60.0)
    }

    pub fn has_media(&self) -> bool {
        !self.video_url.trim().is_empty()
    }
}

/// The episodes endpoint answers either `{"episodes": [...]}` or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EpisodeListResponse {
    Wrapped { episodes: Vec<Episode> },
    Bare(Vec<Episode>),
}

impl EpisodeListResponse {
    pub fn into_episodes(self) -> Vec<Episode> {
        match self {
            EpisodeListResponse::Wrapped { episodes } => episodes,
            EpisodeListResponse::Bare(episodes) => episodes,
        }
    }
}
