pub mod cast;
pub mod controller;
pub mod error;
pub mod format;
pub mod fullscreen;
pub mod history;
pub mod media;
pub mod navigator;
pub mod player;
pub mod progress;
pub mod runtime;
pub mod scheduler;
pub mod shell;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use cast::{CastBridge, CastLoadRequest, CastProvider, CastSession, RemoteStatus};
pub use controller::{EventOutcome, PlaybackController};
pub use error::{NavigationError, PlayerError};
pub use fullscreen::{FullscreenAdapter, FullscreenCall, FullscreenChain};
pub use history::{HistoryPatch, HistoryRepository};
pub use media::{MediaEvent, MediaSource, Preload};
pub use navigator::EpisodeNavigator;
pub use player::{Player, PlayerDeps, PlayerInput, PlayerSettings};
pub use progress::{ProgressPersistence, ProgressSnapshot};
pub use runtime::{PlaybackSummary, PlayerChannel, PlayerHandle, PlayerRuntime, RuntimeParts};
pub use scheduler::{TaskHandle, TimerEvent, Timers, TokioTimers};
pub use shell::{map_key, ControlsVisibility, Key, KeyEvent, KeyTarget, ShellCommand};
pub use store::{FileStore, KeyValueStore, MemoryStore};
