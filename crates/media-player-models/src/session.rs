use serde::{Deserialize, Serialize};

/// Lifecycle of the media element as seen by the controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
}

/// In-memory mirror of the media element, destroyed with the view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackSession {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub is_muted: bool,
    pub volume: f64,
    pub is_fullscreen: bool,
    pub is_buffering: bool,
    pub is_casting: bool,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            is_muted: false,
            volume: 1.0,
            is_fullscreen: false,
            is_buffering: false,
            is_casting: false,
        }
    }
}
