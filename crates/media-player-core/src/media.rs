use crate::error::PlayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preload {
    None,
    Metadata,
    Auto,
}

/// Native media element notifications the player reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata,
    CanPlay,
    TimeUpdate,
    Play,
    Pause,
    Waiting,
    Error(String),
}

/// The playback surface: a browser `<video>`, a native decoder, or a test double.
///
/// Calls are fire-and-forget like their DOM counterparts; the element reports
/// what actually happened through [`MediaEvent`]s.
pub trait MediaSource: Send {
    fn set_source(&mut self, url: &str);
    fn set_preload(&mut self, preload: Preload);
    /// Start fetching the current source.
    fn load(&mut self);
    /// Fails when the platform refuses programmatic playback.
    fn play(&mut self) -> Result<(), PlayerError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// `None` until metadata is known.
    fn duration(&self) -> Option<f64>;
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
}
