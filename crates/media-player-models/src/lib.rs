pub mod episode;
pub mod history;
pub mod launch;
pub mod series;
pub mod session;

pub use episode::{Episode, EpisodeListResponse};
pub use history::{ContentKind, HistoryEntry};
pub use launch::{LaunchContentType, LaunchRequest};
pub use series::SeriesInfo;
pub use session::{PlaybackSession, PlaybackState};

use serde::{Deserialize, Deserializer};

/// Accept `null` (and missing) numbers written by older clients as zero.
pub(crate) fn lenient_seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Format an `(season, episode)` pair as `S01E02`.
pub fn episode_code(season: u32, episode: u32) -> String {
    format!("S{:02}E{:02}", season, episode)
}
