use crate::cast::CastProvider;
use crate::error::PlayerError;
use crate::fullscreen::FullscreenAdapter;
use crate::history::HistoryRepository;
use crate::media::MediaSource;
use crate::navigator::EpisodeNavigator;
use crate::player::{Player, PlayerDeps, PlayerInput, PlayerSettings};
use crate::scheduler::TokioTimers;
use anyhow::{Context, Result};
use media_player_catalog::Catalog;
use media_player_models::{LaunchRequest, PlaybackSession, PlaybackState};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Final state reported when a player task stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSummary {
    pub session: PlaybackSession,
    pub state: PlaybackState,
    pub content_id: Option<String>,
}

/// The player's input queue.
///
/// Created before the player so that media elements and cast frameworks can
/// be wired to the sender first.
pub struct PlayerChannel {
    sender: UnboundedSender<PlayerInput>,
    receiver: UnboundedReceiver<PlayerInput>,
}

impl PlayerChannel {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> UnboundedSender<PlayerInput> {
        self.sender.clone()
    }
}

impl Default for PlayerChannel {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RuntimeParts {
    pub media: Box<dyn MediaSource>,
    pub fullscreen: Box<dyn FullscreenAdapter>,
    pub history: HistoryRepository,
    pub cast: Option<Arc<dyn CastProvider>>,
    pub catalog: Option<Arc<dyn Catalog>>,
}

pub struct PlayerRuntime;

impl PlayerRuntime {
    /// Mount a player on its own task and start the catalog fetches.
    pub fn start(
        launch: LaunchRequest,
        parts: RuntimeParts,
        settings: PlayerSettings,
        channel: PlayerChannel,
    ) -> Result<PlayerHandle, PlayerError> {
        let PlayerChannel { sender, receiver } = channel;
        let RuntimeParts {
            media,
            fullscreen,
            history,
            cast,
            catalog,
        } = parts;

        let series_id = launch.series_context().map(str::to_string);
        let deps = PlayerDeps {
            media,
            fullscreen,
            history,
            cast,
            timers: Box::new(TokioTimers::new(sender.clone())),
        };
        let player = Player::mount(launch, deps, settings)?;

        if let (Some(series_id), Some(catalog)) = (series_id, catalog) {
            tokio::spawn(fetch_series_data(catalog, series_id, sender.clone()));
        }

        let task = tokio::spawn(run_loop(player, receiver));
        Ok(PlayerHandle { sender, task })
    }
}

async fn fetch_series_data(catalog: Arc<dyn Catalog>, series_id: String, sender: UnboundedSender<PlayerInput>) {
    let (series, episodes) = futures::join!(
        EpisodeNavigator::fetch_series(catalog.as_ref(), &series_id),
        EpisodeNavigator::fetch_episodes(catalog.as_ref(), &series_id),
    );

    // A closed queue means the player unmounted; the results are dropped.
    if let Some(series) = series {
        if sender.send(PlayerInput::SeriesLoaded(series)).is_err() {
            debug!(series_id = %series_id, "Player gone, dropping series metadata");
            return;
        }
    }
    if sender.send(PlayerInput::EpisodesLoaded(episodes)).is_err() {
        debug!(series_id = %series_id, "Player gone, dropping episode list");
    }
}

async fn run_loop(mut player: Player, mut receiver: UnboundedReceiver<PlayerInput>) -> PlaybackSummary {
    while let Some(input) = receiver.recv().await {
        if !player.dispatch(input) {
            break;
        }
    }
    receiver.close();
    player.unmount();
    let summary = player.summary();
    info!(content_id = ?summary.content_id, position = summary.session.current_time, "Player task finished");
    summary
}

/// Control side of a running player.
pub struct PlayerHandle {
    sender: UnboundedSender<PlayerInput>,
    task: JoinHandle<PlaybackSummary>,
}

impl PlayerHandle {
    /// Returns `false` when the player has already stopped.
    pub fn send(&self, input: PlayerInput) -> bool {
        self.sender.send(input).is_ok()
    }

    pub fn sender(&self) -> UnboundedSender<PlayerInput> {
        self.sender.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Unmount the player and wait for its final state.
    pub async fn shutdown(self) -> Result<PlaybackSummary> {
        let _ = self.sender.send(PlayerInput::Unmount);
        self.task.await.context("player task panicked")
    }
}
