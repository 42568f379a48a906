use crate::controller::PlaybackController;
use crate::error::PlayerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastLoadRequest {
    pub content_url: String,
    pub content_type: String,
    pub title: String,
    pub start_time: f64,
    pub autoplay: bool,
}

/// Status pushed by the receiver while a session is live.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteStatus {
    pub current_time: f64,
    pub is_playing: bool,
}

/// An active connection to a remote receiver.
pub trait CastSession: Send + Sync + fmt::Debug {
    fn load_media(&self, request: &CastLoadRequest) -> Result<(), PlayerError>;
    fn play(&self) -> Result<(), PlayerError>;
    fn pause(&self) -> Result<(), PlayerError>;
    fn seek(&self, seconds: f64) -> Result<(), PlayerError>;
    fn set_volume(&self, volume: f64) -> Result<(), PlayerError>;
}

/// The cast framework, when the platform ships one.
///
/// Session changes are reported asynchronously through
/// `PlayerInput::CastSessionChanged`.
pub trait CastProvider: Send + Sync {
    fn is_available(&self) -> bool;
    fn request_session(&self) -> Result<(), PlayerError>;
    fn end_session(&self, stop_casting: bool) -> Result<(), PlayerError>;
}

pub struct CastBridge {
    provider: Option<Arc<dyn CastProvider>>,
    session: Option<Arc<dyn CastSession>>,
    last_remote: RemoteStatus,
}

impl CastBridge {
    pub fn new(provider: Option<Arc<dyn CastProvider>>) -> Self {
        Self {
            provider,
            session: None,
            last_remote: RemoteStatus::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.is_available())
    }

    pub fn is_casting(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Arc<dyn CastSession>> {
        self.session.as_ref()
    }

    /// Ask the framework to start or stop casting.
    pub fn toggle(&self) -> Result<(), PlayerError> {
        let provider = self
            .provider
            .as_ref()
            .filter(|p| p.is_available())
            .ok_or_else(|| PlayerError::Cast("casting is not available".to_string()))?;

        if self.is_casting() {
            provider.end_session(true)
        } else {
            provider.request_session()
        }
    }

    /// React to the framework acquiring or dropping a session.
    pub fn session_changed(
        &mut self,
        session: Option<Arc<dyn CastSession>>,
        controller: &mut PlaybackController,
        title: &str,
    ) {
        match session {
            Some(session) => self.attach(session, controller, title),
            None => self.detach(controller),
        }
    }

    fn attach(&mut self, session: Arc<dyn CastSession>, controller: &mut PlaybackController, title: &str) {
        let Some(url) = controller.source().map(str::to_string) else {
            warn!("Cast session started without a media source");
            self.session = Some(session);
            controller.set_casting(true);
            return;
        };

        // Local element pauses; the receiver picks up from the same position.
        let start_time = controller.current_time();
        controller.pause();

        let request = CastLoadRequest {
            content_url: url,
            content_type: "video/mp4".to_string(),
            title: title.to_string(),
            start_time,
            autoplay: true,
        };
        info!(start_time, title, "Handing playback to cast receiver");
        // The session stays attached even if the receiver rejects the load.
        if let Err(e) = session.load_media(&request) {
            warn!(error = %e, "Cast receiver rejected media");
        }

        self.last_remote = RemoteStatus {
            current_time: start_time,
            is_playing: true,
        };
        self.session = Some(session);
        controller.set_casting(true);
        controller.mirror_remote(&self.last_remote);
    }

    fn detach(&mut self, controller: &mut PlaybackController) {
        if self.session.take().is_none() {
            return;
        }
        info!(position = self.last_remote.current_time, "Cast session ended, resuming local control");
        controller.set_casting(false);
        // Resume locally where the receiver last reported, paused.
        controller.seek(self.last_remote.current_time);
    }

    pub fn remote_status(&mut self, status: RemoteStatus, controller: &mut PlaybackController) {
        // Late status after the session ended.
        if !self.is_casting() {
            return;
        }
        self.last_remote = status;
        controller.mirror_remote(&status);
    }

    pub fn toggle_play(&self, currently_playing: bool) -> Result<(), PlayerError> {
        let session = self.require_session()?;
        if currently_playing {
            session.pause()
        } else {
            session.play()
        }
    }

    pub fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.require_session()?.seek(seconds)
    }

    pub fn set_volume(&self, volume: f64) -> Result<(), PlayerError> {
        self.require_session()?.set_volume(volume)
    }

    fn require_session(&self) -> Result<&Arc<dyn CastSession>, PlayerError> {
        self.session
            .as_ref()
            .ok_or_else(|| PlayerError::Cast("no active cast session".to_string()))
    }
}
