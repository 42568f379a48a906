use crate::cast::{CastBridge, CastProvider, CastSession, RemoteStatus};
use crate::controller::{EventOutcome, PlaybackController};
use crate::error::{NavigationError, PlayerError};
use crate::fullscreen::FullscreenAdapter;
use crate::history::HistoryRepository;
use crate::media::{MediaEvent, MediaSource};
use crate::navigator::EpisodeNavigator;
use crate::progress::{ProgressPersistence, ProgressSnapshot};
use crate::runtime::PlaybackSummary;
use crate::scheduler::{TaskHandle, TimerEvent, Timers};
use crate::shell::{map_key, ControlsVisibility, KeyEvent, ShellCommand};
use media_player_config::PlaybackConfig;
use media_player_models::{Episode, LaunchRequest, PlaybackSession, PlaybackState, SeriesInfo};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};


#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub progress_interval: Duration,
    pub controls_hide_delay: Duration,
    pub skip_seconds: f64,
    pub placeholder_progress: f64,
    pub default_episode_duration: f64,
    /// Longest an episode switch may block further navigation.
    pub switch_timeout: Duration,
    /// Receiver title for movies; episodes are labelled from the series.
    pub cast_title: Option<String>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for PlayerSettings {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            progress_interval: config.progress_interval(),
            controls_hide_delay: config.controls_hide_delay(),
            skip_seconds: config.skip_seconds,
            placeholder_progress: config.placeholder_progress_secs,
            default_episode_duration: config.default_episode_duration_secs,
            switch_timeout: config.switch_timeout(),
            cast_title: None,
        }
    }
}

/// Everything that can happen to a mounted player.
#[derive(Debug)]
pub enum PlayerInput {
    Media(MediaEvent),
    Key(KeyEvent),
    PointerMoved,
    PointerLeft,
    Timer(TimerEvent),
    TogglePlay,
    Seek(f64),
    Skip(f64),
    SetVolume(f64),
    ToggleMute,
    ToggleFullscreen,
    FullscreenChanged(bool),
    NextEpisode,
    PreviousEpisode,
    GoToEpisode(String),
    EpisodesLoaded(Vec<Episode>),
    SeriesLoaded(SeriesInfo),
    ToggleCast,
    CastSessionChanged(Option<Arc<dyn CastSession>>),
    CastStatus(RemoteStatus),
    Unmount,
}

pub struct PlayerDeps {
    pub media: Box<dyn MediaSource>,
    pub fullscreen: Box<dyn FullscreenAdapter>,
    pub history: HistoryRepository,
    pub cast: Option<Arc<dyn CastProvider>>,
    pub timers: Box<dyn Timers>,
}

/// The mounted player view: one controller, its helpers and its timers.
///
/// All mutation goes through `&mut self`; callers serialize access by
/// feeding [`PlayerInput`]s from a single task.
pub struct Player {
    launch: LaunchRequest,
    settings: PlayerSettings,
    controller: PlaybackController,
    progress: ProgressPersistence,
    navigator: Option<EpisodeNavigator>,
    cast: CastBridge,
    controls: ControlsVisibility,
    timers: Box<dyn Timers>,
    progress_timer: Option<TaskHandle>,
    switch_timer: Option<TaskHandle>,
    switch_generation: u64,
    mounted: bool,
}

impl Player {
    pub fn mount(launch: LaunchRequest, deps: PlayerDeps, settings: PlayerSettings) -> Result<Self, PlayerError> {
        let Some(url) = launch.playable_url().map(str::to_string) else {
            error!(content_id = ?launch.content_id, "Launch request has no video URL");
            return Err(PlayerError::MissingVideoUrl);
        };

        let PlayerDeps {
            media,
            fullscreen,
            history,
            cast,
            timers,
        } = deps;

        let mut controller = PlaybackController::new(media, fullscreen);
        // The launch position is applied once the source reports ready.
        controller.load(&url, launch.start_time);

        let navigator = launch.series_context().map(|series_id| {
            EpisodeNavigator::new(series_id)
                .with_defaults(settings.placeholder_progress, settings.default_episode_duration)
        });

        // Controls start visible with a hide countdown already running.
        let mut controls = ControlsVisibility::new(settings.controls_hide_delay);
        controls.on_activity(timers.as_ref());
        let progress_timer = timers.repeating(settings.progress_interval, TimerEvent::ProgressTick);

        info!(
            content_id = ?launch.content_id,
            content_type = ?launch.content_type,
            start_time = launch.start_time,
            "Player mounted"
        );

        Ok(Self {
            launch,
            settings,
            controller,
            progress: ProgressPersistence::new(history),
            navigator,
            cast: CastBridge::new(cast),
            controls,
            timers,
            progress_timer: Some(progress_timer),
            switch_timer: None,
            switch_generation: 0,
            mounted: true,
        })
    }

    /// Apply one input. Returns `false` once the player has unmounted.
    pub fn dispatch(&mut self, input: PlayerInput) -> bool {
        if !self.mounted {
            debug!(?input, "Input after unmount ignored");
            return false;
        }

        match input {
            PlayerInput::Media(event) => self.on_media_event(event),
            PlayerInput::Key(event) => {
                if let Some(command) = map_key(&event, self.settings.skip_seconds) {
                    self.apply_shell(command);
                }
            }
            PlayerInput::PointerMoved => self.controls.on_activity(self.timers.as_ref()),
            PlayerInput::PointerLeft => {
                let session = self.controller.session();
                let (playing, fullscreen) = (session.is_playing, session.is_fullscreen);
                self.controls.on_pointer_left(playing, fullscreen);
            }
            PlayerInput::Timer(TimerEvent::ProgressTick) => {
                self.tick();
            }
            PlayerInput::Timer(TimerEvent::HideControls(generation)) => {
                let playing = self.controller.session().is_playing;
                self.controls.on_hide_timer(generation, playing);
            }
            PlayerInput::Timer(TimerEvent::SwitchStalled(generation)) => self.switch_stalled(generation),
            PlayerInput::TogglePlay => self.toggle_play(),
            PlayerInput::Seek(seconds) => {
                self.seek(seconds);
            }
            PlayerInput::Skip(delta) => {
                self.skip(delta);
            }
            PlayerInput::SetVolume(volume) => {
                self.set_volume(volume);
            }
            PlayerInput::ToggleMute => {
                self.controller.toggle_mute();
            }
            PlayerInput::ToggleFullscreen => self.toggle_fullscreen(),
            PlayerInput::FullscreenChanged(active) => self.controller.fullscreen_changed(active),
            // Rejections are already logged by the navigation methods.
            PlayerInput::NextEpisode => {
                let _ = self.next_episode();
            }
            PlayerInput::PreviousEpisode => {
                let _ = self.previous_episode();
            }
            PlayerInput::GoToEpisode(id) => {
                let _ = self.go_to_episode(&id);
            }
            PlayerInput::EpisodesLoaded(episodes) => self.episodes_loaded(episodes),
            PlayerInput::SeriesLoaded(series) => {
                if let Some(navigator) = self.navigator.as_mut() {
                    navigator.set_series(series);
                }
            }
            PlayerInput::ToggleCast => {
                if let Err(e) = self.cast.toggle() {
                    warn!(error = %e, "Cast toggle failed");
                }
            }
            PlayerInput::CastSessionChanged(session) => {
                let title = self.cast_title();
                self.cast.session_changed(session, &mut self.controller, &title);
            }
            PlayerInput::CastStatus(status) => self.cast.remote_status(status, &mut self.controller),
            PlayerInput::Unmount => {
                self.unmount();
                return false;
            }
        }
        true
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        if event == MediaEvent::Pause {
            self.controls.on_paused();
        }

        match self.controller.handle_event(&event) {
            EventOutcome::None => {}
            EventOutcome::Started { at } => {
                self.release_switch_timer();
                if let Some(episode_id) = self.navigator.as_mut().and_then(EpisodeNavigator::finish_switch) {
                    info!(episode_id = %episode_id, at, "Episode switch complete");
                }
            }
            EventOutcome::Failed => {
                self.release_switch_timer();
                if let Some(episode_id) = self.navigator.as_mut().and_then(EpisodeNavigator::finish_switch) {
                    warn!(episode_id = %episode_id, "Episode switch failed to load");
                }
            }
        }
    }

    fn apply_shell(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::TogglePlay => self.toggle_play(),
            ShellCommand::Skip(delta) => {
                self.skip(delta);
            }
            ShellCommand::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    pub fn toggle_play(&mut self) {
        // While casting, the receiver owns playback and reports state back.
        if self.cast.is_casting() {
            if let Err(e) = self.cast.toggle_play(self.controller.session().is_playing) {
                warn!(error = %e, "Remote play/pause failed");
            }
            return;
        }
        self.controller.toggle_play();
        if !self.controller.session().is_playing {
            self.controls.on_paused();
        }
    }

    /// Seek to `seconds`, clamped to the media. Returns the target.
    pub fn seek(&mut self, seconds: f64) -> f64 {
        if self.cast.is_casting() {
            // Local duration still bounds the remote seek.
            let target = self.controller.clamp_position(seconds);
            if let Err(e) = self.cast.seek(target) {
                warn!(error = %e, "Remote seek failed");
            }
            return target;
        }
        self.controller.seek(seconds)
    }

    pub fn skip(&mut self, delta: f64) -> f64 {
        let from = self.controller.position();
        self.seek(from + delta)
    }

    pub fn set_volume(&mut self, volume: f64) -> f64 {
        if self.cast.is_casting() {
            let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
            if let Err(e) = self.cast.set_volume(volume) {
                warn!(error = %e, "Remote volume change failed");
            }
            return volume;
        }
        self.controller.set_volume(volume)
    }

    fn toggle_fullscreen(&mut self) {
        match self.controller.toggle_fullscreen() {
            Ok(active) => debug!(active, "Fullscreen toggled"),
            Err(e) => warn!(error = %e, "Fullscreen toggle failed"),
        }
    }

    fn episodes_loaded(&mut self, episodes: Vec<Episode>) {
        let Some(navigator) = self.navigator.as_mut() else {
            debug!("Episode list ignored outside series playback");
            return;
        };
        navigator.set_episodes(episodes, self.launch.season_number, self.launch.episode_number);
        // Fall back to the launched id when season/episode numbers did not match.
        if navigator.current_index().is_none() {
            if let Some(id) = self.launch.content_id.as_deref() {
                navigator.select(id);
            }
        }
    }

    pub fn next_episode(&mut self) -> Result<(), NavigationError> {
        let index = self
            .idle_navigator()
            .and_then(|navigator| navigator.next_index().ok_or(NavigationError::NoEpisode));
        self.switch_to(index)
    }

    pub fn previous_episode(&mut self) -> Result<(), NavigationError> {
        let index = self
            .idle_navigator()
            .and_then(|navigator| navigator.previous_index().ok_or(NavigationError::NoEpisode));
        self.switch_to(index)
    }

    pub fn go_to_episode(&mut self, episode_id: &str) -> Result<(), NavigationError> {
        let index = self.idle_navigator().and_then(|navigator| {
            navigator
                .find(episode_id)
                .ok_or_else(|| NavigationError::UnknownEpisode(episode_id.to_string()))
        });
        self.switch_to(index)
    }

    /// The navigator, provided no switch is still loading. A pending switch
    /// wins over boundary and lookup errors.
    fn idle_navigator(&self) -> Result<&EpisodeNavigator, NavigationError> {
        let navigator = self.navigator.as_ref().ok_or(NavigationError::NotSeries)?;
        match navigator.pending_switch() {
            Some(episode_id) => Err(NavigationError::InFlight(episode_id.to_string())),
            None => Ok(navigator),
        }
    }

    fn switch_to(&mut self, index: Result<usize, NavigationError>) -> Result<(), NavigationError> {
        let result = match index {
            Ok(index) => self.go_to_index(index),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            info!(error = %e, "Episode navigation ignored");
        }
        result
    }

    fn go_to_index(&mut self, index: usize) -> Result<(), NavigationError> {
        // Taken before the switch so the outgoing episode keeps its position.
        let outgoing = self.snapshot();
        let navigator = self.navigator.as_mut().ok_or(NavigationError::NotSeries)?;
        navigator.go_to(index, &mut self.controller, &self.progress, outgoing.as_ref())?;

        self.switch_generation += 1;
        self.switch_timer = Some(
            self.timers
                .once(self.settings.switch_timeout, TimerEvent::SwitchStalled(self.switch_generation)),
        );
        Ok(())
    }

    fn release_switch_timer(&mut self) {
        if let Some(timer) = self.switch_timer.take() {
            timer.cancel();
        }
    }

    /// The new source never reported ready or an error; unblock navigation.
    fn switch_stalled(&mut self, generation: u64) {
        // A newer switch re-armed the timer.
        if generation != self.switch_generation {
            return;
        }
        self.switch_timer = None;
        if let Some(episode_id) = self.navigator.as_mut().and_then(EpisodeNavigator::finish_switch) {
            warn!(
                episode_id = %episode_id,
                timeout_secs = self.settings.switch_timeout.as_secs(),
                "Episode switch stalled; navigation unblocked"
            );
        }
    }

    /// Id whose history row receives progress: the current episode in series
    /// mode, otherwise the launched content.
    pub fn active_content_id(&self) -> Option<&str> {
        self.navigator
            .as_ref()
            .and_then(EpisodeNavigator::current_episode)
            .map(|episode| episode.id.as_str())
            .or(self.launch.content_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// `None` while nothing is resolvable or the source is still loading.
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        if self.controller.is_loading() {
            return None;
        }
        let content_id = self.active_content_id()?;
        Some(ProgressSnapshot {
            content_id: content_id.to_string(),
            position: self.controller.position(),
            duration: self.controller.duration(),
        })
    }

    pub fn tick(&mut self) -> bool {
        self.progress.tick(self.snapshot().as_ref())
    }

    pub fn flush(&mut self) -> bool {
        self.progress.flush(self.snapshot().as_ref())
    }

    fn cast_title(&self) -> String {
        if let Some(navigator) = &self.navigator {
            if let Some(episode) = navigator.current_episode() {
                return navigator.history_entry_for(episode, 0.0).title;
            }
        }
        self.settings
            .cast_title
            .clone()
            .or_else(|| self.launch.content_id.clone())
            .unwrap_or_else(|| "Video".to_string())
    }

    pub fn launch(&self) -> &LaunchRequest {
        &self.launch
    }

    pub fn session(&self) -> &PlaybackSession {
        self.controller.session()
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn navigator(&self) -> Option<&EpisodeNavigator> {
        self.navigator.as_ref()
    }

    pub fn history(&self) -> &HistoryRepository {
        self.progress.history()
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }

    pub fn is_cast_available(&self) -> bool {
        self.cast.is_available()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn summary(&self) -> PlaybackSummary {
        PlaybackSummary {
            session: self.controller.session().clone(),
            state: self.controller.state(),
            content_id: self.active_content_id().map(str::to_string),
        }
    }

    /// Flush progress and release every timer. Safe to call twice.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.flush();
        if let Some(timer) = self.progress_timer.take() {
            timer.cancel();
        }
        self.release_switch_timer();
        self.controls.cancel();
        self.mounted = false;
        info!(content_id = ?self.active_content_id(), "Player unmounted");
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.unmount();
    }
}
