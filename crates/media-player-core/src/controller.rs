use crate::cast::RemoteStatus;
use crate::error::PlayerError;
use crate::fullscreen::FullscreenAdapter;
use crate::media::{MediaEvent, MediaSource, Preload};
use media_player_models::{PlaybackSession, PlaybackState};
use tracing::{debug, info, warn};

/// What a media event meant for a pending load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    None,
    /// The pending start position was applied and playback was requested.
    Started { at: f64 },
    /// The source failed before it became ready.
    Failed,
}

/// Owns the media element and the ephemeral session mirrored from it.
pub struct PlaybackController {
    media: Box<dyn MediaSource>,
    fullscreen: Box<dyn FullscreenAdapter>,
    session: PlaybackSession,
    state: PlaybackState,
    source: Option<String>,
    pending_start: Option<f64>,
}

impl PlaybackController {
    pub fn new(media: Box<dyn MediaSource>, fullscreen: Box<dyn FullscreenAdapter>) -> Self {
        let session = PlaybackSession {
            is_muted: media.is_muted(),
            is_fullscreen: fullscreen.is_active(),
            ..PlaybackSession::default()
        };
        Self {
            media,
            fullscreen,
            session,
            state: PlaybackState::Idle,
            source: None,
            pending_start: None,
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// True between `load` and the first ready signal.
    pub fn is_loading(&self) -> bool {
        self.pending_start.is_some()
    }

    /// Swap in a new source. Seeking to `start_time` and playing are deferred
    /// until the element reports metadata or playability.
    pub fn load(&mut self, url: &str, start_time: f64) {
        let start = if start_time.is_finite() {
            start_time.max(0.0)
        } else {
            0.0
        };
        info!(url, start, "Loading media source");

        self.media.set_preload(Preload::Auto);
        self.media.set_source(url);
        self.media.load();

        self.source = Some(url.to_string());
        // Consumed by the first ready signal or by a load error.
        self.pending_start = Some(start);
        self.state = PlaybackState::Loading;
        self.session.current_time = 0.0;
        self.session.duration = 0.0;
        self.session.is_playing = false;
        self.session.is_buffering = false;
    }

    pub fn handle_event(&mut self, event: &MediaEvent) -> EventOutcome {
        match event {
            MediaEvent::LoadedMetadata => {
                self.refresh_duration();
                self.become_ready()
            }
            MediaEvent::CanPlay => {
                self.session.is_buffering = false;
                self.refresh_duration();
                self.become_ready()
            }
            MediaEvent::TimeUpdate => {
                // The remote receiver owns position while casting.
                if !self.session.is_casting {
                    self.session.current_time = self.media.current_time();
                    self.refresh_duration();
                }
                EventOutcome::None
            }
            MediaEvent::Play => {
                self.session.is_playing = true;
                if self.state != PlaybackState::Idle {
                    self.state = PlaybackState::Playing;
                }
                EventOutcome::None
            }
            MediaEvent::Pause => {
                self.session.is_playing = false;
                if matches!(self.state, PlaybackState::Playing | PlaybackState::Ready) {
                    self.state = PlaybackState::Paused;
                }
                EventOutcome::None
            }
            MediaEvent::Waiting => {
                if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
                    self.session.is_buffering = true;
                }
                EventOutcome::None
            }
            MediaEvent::Error(reason) => {
                warn!(source = ?self.source, reason = %reason, "Media element reported an error");
                self.session.is_buffering = false;
                self.session.is_playing = false;
                // Only a source that never became ready counts as a failed load.
                if self.pending_start.take().is_some() {
                    self.state = PlaybackState::Idle;
                    EventOutcome::Failed
                } else {
                    EventOutcome::None
                }
            }
        }
    }

    fn become_ready(&mut self) -> EventOutcome {
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Loading) && self.source.is_some() {
            self.state = PlaybackState::Ready;
        }

        let Some(start) = self.pending_start.take() else {
            return EventOutcome::None;
        };

        // Duration is known by now, so the stored position is clamped to it.
        let at = if start > 0.0 { self.seek(start) } else { 0.0 };
        debug!(at, "Media ready, starting playback");
        self.play();
        EventOutcome::Started { at }
    }

    fn refresh_duration(&mut self) {
        if let Some(duration) = self.media.duration().filter(|d| d.is_finite() && *d > 0.0) {
            self.session.duration = duration;
        }
    }

    fn known_duration(&self) -> Option<f64> {
        self.media
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
            .or((self.session.duration > 0.0).then_some(self.session.duration))
    }

    pub fn duration(&self) -> Option<f64> {
        self.known_duration()
    }

    /// Position of the local element.
    pub fn current_time(&self) -> f64 {
        self.media.current_time()
    }

    /// Position to persist or hand over: the remote mirror while casting.
    pub fn position(&self) -> f64 {
        if self.session.is_casting {
            self.session.current_time
        } else {
            self.media.current_time()
        }
    }

    pub fn clamp_position(&self, seconds: f64) -> f64 {
        let seconds = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };
        match self.known_duration() {
            Some(duration) => seconds.min(duration),
            None => seconds,
        }
    }

    /// Request playback. Autoplay rejection leaves the session paused.
    pub fn play(&mut self) {
        if self.source.is_none() {
            debug!("Ignoring play without a source");
            return;
        }
        match self.media.play() {
            Ok(()) => {
                self.session.is_playing = true;
                if matches!(self.state, PlaybackState::Ready | PlaybackState::Paused) {
                    self.state = PlaybackState::Playing;
                }
            }
            // Autoplay policy: the user has to press play.
            Err(e) => {
                warn!(error = %e, "Playback was not started");
                self.session.is_playing = false;
            }
        }
    }

    pub fn pause(&mut self) {
        self.media.pause();
        self.session.is_playing = false;
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Ready) {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn toggle_play(&mut self) {
        if self.media.is_paused() {
            self.play();
        } else {
            self.pause();
        }
    }

    /// Seek the local element, returning the clamped target.
    pub fn seek(&mut self, seconds: f64) -> f64 {
        let target = self.clamp_position(seconds);
        self.media.set_current_time(target);
        self.session.current_time = target;
        target
    }

    pub fn skip(&mut self, delta: f64) -> f64 {
        let from = self.position();
        self.seek(from + delta)
    }

    pub fn set_volume(&mut self, volume: f64) -> f64 {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        let muted = volume == 0.0;
        self.media.set_volume(volume);
        self.media.set_muted(muted);
        self.session.volume = volume;
        self.session.is_muted = muted;
        volume
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.session.is_muted;
        // Unmuting at zero volume would stay silent.
        if !muted && self.session.volume == 0.0 {
            self.media.set_volume(1.0);
            self.session.volume = 1.0;
        }
        self.media.set_muted(muted);
        self.session.is_muted = muted;
        muted
    }

    /// The flag only changes when the platform accepted the request.
    pub fn toggle_fullscreen(&mut self) -> Result<bool, PlayerError> {
        if self.fullscreen.is_active() {
            self.fullscreen.exit()?;
        } else {
            self.fullscreen.enter()?;
        }
        self.session.is_fullscreen = self.fullscreen.is_active();
        Ok(self.session.is_fullscreen)
    }

    pub fn fullscreen_changed(&mut self, active: bool) {
        self.fullscreen.set_active(active);
        self.session.is_fullscreen = active;
    }

    pub fn set_casting(&mut self, casting: bool) {
        self.session.is_casting = casting;
    }

    pub fn mirror_remote(&mut self, status: &RemoteStatus) {
        if !self.session.is_casting {
            return;
        }
        self.session.current_time = self.clamp_position(status.current_time);
        self.session.is_playing = status.is_playing;
        if matches!(
            self.state,
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused
        ) {
            self.state = if status.is_playing {
                PlaybackState::Playing
            } else {
                PlaybackState::Paused
            };
        }
    }
}

#[cfg(test)]
mod tests;
