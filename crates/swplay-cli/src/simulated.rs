use media_player_core::{FullscreenCall, MediaEvent, MediaSource, PlayerError, PlayerInput, Preload};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Media element without a decoder: position advances with the wall clock
/// while playing, and the usual events are posted back to the player.
pub struct SimulatedMedia {
    sender: UnboundedSender<PlayerInput>,
    length: f64,
    src: Option<String>,
    duration: Option<f64>,
    position: f64,
    playing_since: Option<Instant>,
    volume: f64,
    muted: bool,
}

impl SimulatedMedia {
    pub fn new(sender: UnboundedSender<PlayerInput>, length: f64) -> Self {
        Self {
            sender,
            length: if length.is_finite() && length > 0.0 { length } else { 2400.0 },
            src: None,
            duration: None,
            position: 0.0,
            playing_since: None,
            volume: 1.0,
            muted: false,
        }
    }

    fn emit(&self, event: MediaEvent) {
        let _ = self.sender.send(PlayerInput::Media(event));
    }

    fn settle(&mut self) {
        self.position = self.current_time();
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }
}

impl MediaSource for SimulatedMedia {
    fn set_source(&mut self, url: &str) {
        self.src = Some(url.to_string());
        self.duration = None;
        self.position = 0.0;
        self.playing_since = None;
    }

    fn set_preload(&mut self, preload: Preload) {
        debug!(?preload, "Preload set");
    }

    fn load(&mut self) {
        match self.src.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("file://") => {
                self.duration = Some(self.length);
                self.emit(MediaEvent::LoadedMetadata);
                self.emit(MediaEvent::CanPlay);
            }
            _ => self.emit(MediaEvent::Error("MEDIA_ERR_SRC_NOT_SUPPORTED".to_string())),
        }
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        if self.duration.is_none() {
            return Err(PlayerError::Media {
                operation: "play",
                reason: "no playable source".to_string(),
            });
        }
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
            self.emit(MediaEvent::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if self.playing_since.is_some() {
            self.position = self.current_time();
            self.playing_since = None;
            self.emit(MediaEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.playing_since.is_none()
    }

    fn current_time(&self) -> f64 {
        let elapsed = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let position = self.position + elapsed;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.settle();
        self.position = seconds.max(0.0);
        self.emit(MediaEvent::TimeUpdate);
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        debug!(volume, "Volume set");
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

/// Terminal stand-in for the platform fullscreen API.
pub struct TerminalFullscreen {
    name: &'static str,
}

impl TerminalFullscreen {
    pub fn enter() -> Self {
        Self { name: "terminal enter" }
    }

    pub fn exit() -> Self {
        Self { name: "terminal exit" }
    }
}

impl FullscreenCall for TerminalFullscreen {
    fn name(&self) -> &str {
        self.name
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn invoke(&mut self) -> Result<(), String> {
        info!(entry_point = self.name, "Fullscreen");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn drain(receiver: &mut tokio::sync::mpsc::UnboundedReceiver<PlayerInput>) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        while let Ok(input) = receiver.try_recv() {
            if let PlayerInput::Media(event) = input {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn test_load_reports_readiness() {
        let (tx, mut rx) = unbounded_channel();
        let mut media = SimulatedMedia::new(tx, 600.0);

        media.set_source("https://cdn.example/a.mp4");
        media.load();
        assert_eq!(drain(&mut rx), vec![MediaEvent::LoadedMetadata, MediaEvent::CanPlay]);
        assert_eq!(media.duration(), Some(600.0));

        media.set_source("");
        media.load();
        assert!(matches!(drain(&mut rx).as_slice(), [MediaEvent::Error(_)]));
        assert!(media.play().is_err());
    }

    #[test]
    fn test_seek_and_pause_keep_position() {
        let (tx, mut rx) = unbounded_channel();
        let mut media = SimulatedMedia::new(tx, 600.0);
        media.set_source("https://cdn.example/a.mp4");
        media.load();

        media.set_current_time(120.0);
        assert_eq!(media.current_time(), 120.0);
        media.play().unwrap();
        assert!(!media.is_paused());
        media.pause();
        assert!(media.current_time() >= 120.0);
        assert!(media.is_paused());

        let events = drain(&mut rx);
        assert!(events.contains(&MediaEvent::Play));
        assert!(events.contains(&MediaEvent::Pause));
    }
}
