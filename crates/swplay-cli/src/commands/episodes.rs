use super::load_config;
use crate::output::Output;
use color_eyre::Result;
use media_player_catalog::CatalogClient;
use media_player_config::PathManager;
use media_player_core::EpisodeNavigator;
use media_player_models::Episode;
use owo_colors::OwoColorize;
use serde_json::json;
use tracing::debug;

pub async fn run_episodes(series_id: &str, season: Option<u32>, episode: Option<u32>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;

    let client = CatalogClient::from_config(&config.backend)?;
    debug!(api = client.api_base(), series_id, "Fetching series");

    let mut navigator = EpisodeNavigator::new(series_id);
    let (series, count) = tokio::join!(
        EpisodeNavigator::fetch_series(&client, series_id),
        navigator.load_episodes(&client, season, episode),
    );
    if let Some(series) = series {
        navigator.set_series(series);
    }

    if count == 0 {
        output.warn(format!("No episodes found for series {}", series_id));
        return Ok(());
    }

    if !output.is_human() {
        output.json(&json!({
            "series": navigator.series(),
            "episodes": navigator.episodes(),
            "current": navigator.current_episode().map(|e| &e.id),
            "previous": navigator.previous().map(|e| &e.id),
            "next": navigator.next().map(|e| &e.id),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    let title = navigator
        .series()
        .map(|s| s.title.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| series_id.to_string());
    println!("\n{}", title.bright_cyan().bold());

    let current_id = navigator.current_episode().map(|e| e.id.clone());
    for season_number in navigator.seasons() {
        println!("\n{}", format!("Season {}", season_number).bold());
        for episode in navigator.episodes_in_season(season_number) {
            println!("{}", episode_line(episode, current_id.as_deref() == Some(episode.id.as_str())));
        }
    }
    println!();

    if let Some(label) = navigator.position_label() {
        output.info(label);
        let neighbour = |e: Option<&Episode>| {
            e.map(|e| format!("{} {}", e.code(), e.title))
                .unwrap_or_else(|| "none".to_string())
        };
        output.info(format!("Previous: {}", neighbour(navigator.previous())));
        output.info(format!("Next:     {}", neighbour(navigator.next())));
    } else if season.is_some() || episode.is_some() {
        output.warn("Requested episode is not part of this series");
    }

    Ok(())
}

fn episode_line(episode: &Episode, current: bool) -> String {
    let marker = if current { "▶".green().to_string() } else { " ".to_string() };
    let length = episode
        .duration
        .filter(|m| *m > 0.0)
        .map(|m| format!(" ({:.0} min)", m))
        .unwrap_or_default();
    let mut line = format!("{} {} {}{}", marker, episode.code(), episode.title, length.bright_black());
    if !episode.has_media() {
        line.push_str(&format!(" {}", "[no video]".red()));
    } else if !episode.available {
        line.push_str(&format!(" {}", "[unavailable]".yellow()));
    }
    line
}
