use super::{load_config, open_history};
use crate::output::Output;
use crate::simulated::{SimulatedMedia, TerminalFullscreen};
use crate::PlayArgs;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use media_player_catalog::{Catalog, CatalogClient};
use media_player_config::{Config, PathManager};
use media_player_core::format::format_time;
use media_player_core::{
    FullscreenChain, HistoryRepository, Key, KeyEvent, MediaEvent, PlaybackSummary, PlayerChannel, PlayerError,
    PlayerHandle, PlayerInput, PlayerRuntime, PlayerSettings, RuntimeParts,
};
use media_player_models::{episode_code, ContentKind, HistoryEntry, LaunchRequest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// One parsed stdin line.
#[derive(Debug)]
enum Command {
    Input(PlayerInput),
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(Command::Input(PlayerInput::Key(KeyEvent::new(Key::Space))));
    };
    let argument = parts.next();

    let number = |name: &str| -> Result<f64, String> {
        argument
            .ok_or_else(|| format!("{} needs a value", name))?
            .parse::<f64>()
            .map_err(|_| format!("{} needs a number", name))
    };

    let input = match word.to_lowercase().as_str() {
        "q" | "quit" | "exit" => return Ok(Command::Quit),
        "space" | "play" | "pause" => PlayerInput::Key(KeyEvent::new(Key::Space)),
        "left" => PlayerInput::Key(KeyEvent::new(Key::ArrowLeft)),
        "right" => PlayerInput::Key(KeyEvent::new(Key::ArrowRight)),
        "f" => PlayerInput::Key(KeyEvent::new(Key::Char('f'))),
        "m" | "mute" => PlayerInput::ToggleMute,
        "n" | "next" => PlayerInput::NextEpisode,
        "p" | "prev" | "previous" => PlayerInput::PreviousEpisode,
        "move" => PlayerInput::PointerMoved,
        "cast" => PlayerInput::ToggleCast,
        "vol" | "volume" => PlayerInput::SetVolume(number("vol")?),
        "seek" => PlayerInput::Seek(number("seek")?),
        "goto" => PlayerInput::GoToEpisode(
            argument
                .ok_or_else(|| "goto needs an episode id".to_string())?
                .to_string(),
        ),
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(Command::Input(input))
}

/// Build the launch parameters and record the start in the history,
/// the way the detail pages do before opening the player.
fn prepare_launch(args: &PlayArgs, history: &HistoryRepository, config: &Config) -> Result<LaunchRequest> {
    if let Some(id) = &args.resume {
        let entry = history
            .get(id)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read watch history: {}", e))?
            .ok_or_else(|| color_eyre::eyre::eyre!("No history item with id {}", id))?;
        let mut launch = LaunchRequest::resume(&entry);
        if let Some(start) = args.start {
            launch.start_time = start;
        }
        history
            .record_start(entry)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to update watch history: {}", e))?;
        return Ok(launch);
    }

    let url = args.url.clone().unwrap_or_default();
    let id = args.id.clone().unwrap_or_default();
    let stored = history
        .get(&id)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read watch history: {}", e))?
        .map(|entry| entry.progress)
        .unwrap_or(0.0);
    let start = args.start.unwrap_or(stored);

    let (launch, mut entry) = match (&args.series_id, args.season, args.episode) {
        (Some(series_id), Some(season), Some(episode)) => {
            let launch = LaunchRequest::episode(&url, &id, series_id, season, episode, start);
            let code = episode_code(season, episode);
            let mut entry = HistoryEntry::movie(&id, args.title.clone().unwrap_or(code), &url);
            entry.kind = ContentKind::Series;
            entry.series_id = Some(series_id.clone());
            entry.season_number = Some(season);
            entry.episode_number = Some(episode);
            entry.duration = config.playback.default_episode_duration_secs;
            entry.progress = if start > 0.0 { start } else { config.playback.placeholder_progress_secs };
            (launch, entry)
        }
        _ => {
            let launch = LaunchRequest::movie(&url, &id, start);
            let mut entry = HistoryEntry::movie(&id, args.title.clone().unwrap_or_else(|| id.clone()), &url);
            entry.progress = start;
            (launch, entry)
        }
    };

    if launch.playable_url().is_none() {
        return Err(PlayerError::MissingVideoUrl).wrap_err("Video not found");
    }
    entry.duration = entry.duration.max(args.duration);
    history
        .record_start(entry)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to update watch history: {}", e))?;
    Ok(launch)
}

pub async fn run_play(args: PlayArgs, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;
    let history = open_history(&path_manager, &config)?;

    let launch = prepare_launch(&args, &history, &config)?;
    info!(launch = ?launch, "Starting playback session");

    let catalog: Option<Arc<dyn Catalog>> = match launch.series_context() {
        Some(_) => match CatalogClient::from_config(&config.backend) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn Catalog>),
            Err(e) => {
                warn!(error = %e, "Catalog unavailable, episode navigation disabled");
                None
            }
        },
        None => None,
    };

    let channel = PlayerChannel::new();
    let parts = RuntimeParts {
        media: Box::new(SimulatedMedia::new(channel.sender(), args.duration)),
        fullscreen: Box::new(FullscreenChain::new(
            vec![Box::new(TerminalFullscreen::enter())],
            vec![Box::new(TerminalFullscreen::exit())],
        )),
        history: history.clone(),
        cast: None,
        catalog,
    };
    let mut settings = PlayerSettings::from(&config.playback);
    settings.cast_title = args.title.clone();

    let handle = match PlayerRuntime::start(launch.clone(), parts, settings, channel) {
        Ok(handle) => handle,
        Err(PlayerError::MissingVideoUrl) => {
            output.error("Video not found");
            return Err(PlayerError::MissingVideoUrl.into());
        }
        Err(e) => return Err(e.into()),
    };

    // Native elements fire timeupdate several times a second; once is enough here.
    let clock = handle.sender();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            if clock.send(PlayerInput::Media(MediaEvent::TimeUpdate)).is_err() {
                break;
            }
        }
    });

    output.info(format!(
        "Playing {} from {}. Commands: space, left, right, f, m, n, p, vol <0..1>, seek <s>, goto <id>, q",
        launch.content_id.as_deref().unwrap_or("video"),
        format_time(launch.start_time)
    ));

    let watch = async {
        match args.watch {
            Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(watch);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match parse_command(&line) {
                        Ok(Command::Quit) => break,
                        Ok(Command::Input(input)) => {
                            debug!(?input, "Command");
                            if !handle.send(input) {
                                break;
                            }
                        }
                        Err(message) => output.warn(message),
                    },
                    Ok(None) => {
                        stdin_open = false;
                        if args.watch.is_none() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        stdin_open = false;
                    }
                }
            }
            _ = &mut watch => break,
            _ = tokio::signal::ctrl_c() => {
                output.info("Interrupted");
                break;
            }
        }
    }

    ticker.abort();
    let summary = stop_player(handle).await?;
    report(&summary, &history, output);
    Ok(())
}

/// Unmount the player and wait for its final state.
async fn stop_player(handle: PlayerHandle) -> Result<PlaybackSummary> {
    handle
        .shutdown()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Player did not stop cleanly: {:#}", e))
}

fn report(summary: &PlaybackSummary, history: &HistoryRepository, output: &Output) {
    let entry = summary
        .content_id
        .as_deref()
        .and_then(|id| history.get(id).ok().flatten());

    if !output.is_human() {
        output.json(&json!({ "summary": summary, "history": entry }));
        return;
    }

    output.success(format!(
        "Stopped {} at {} / {}",
        summary.content_id.as_deref().unwrap_or("playback"),
        format_time(summary.session.current_time),
        format_time(summary.session.duration)
    ));
    if let Some(entry) = entry {
        output.info(format!(
            "Saved progress: {} ({:.0}%)",
            format_time(entry.progress),
            entry.progress_percent()
        ));
    }
}
