use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no video URL was supplied")]
    MissingVideoUrl,
    #[error("media element rejected {operation}: {reason}")]
    Media {
        operation: &'static str,
        reason: String,
    },
    #[error("fullscreen unavailable: {0}")]
    Fullscreen(String),
    #[error("cast failed: {0}")]
    Cast(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Reasons an episode switch was refused. None of them change playback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("not playing a series")]
    NotSeries,
    #[error("no episode in that direction")]
    NoEpisode,
    #[error("episode {0} is not part of this series")]
    UnknownEpisode(String),
    #[error("episode {0} has no video URL")]
    MissingVideoUrl(String),
    #[error("switch to episode {0} is still in progress")]
    InFlight(String),
}
