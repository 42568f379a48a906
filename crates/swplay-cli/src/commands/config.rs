use super::load_config;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_player_config::{Config, PathManager};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(output),
        ConfigCommands::Init { force } => init_config(force, output),
        ConfigCommands::Path => show_paths(output),
    }
}

fn show_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = load_config(&path_manager)?;

    if !output.is_human() {
        output.json(&json!({
            "file": config_file.display().to_string(),
            "exists": config_file.exists(),
            "config": config,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!(
            "No configuration file at {}, showing defaults. Run 'swplay config init' to create one.",
            config_file.display()
        ));
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Value").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    let token = match &config.backend.api_token {
        Some(token) => mask_string(token),
        None => "not set".bright_black().to_string(),
    };
    let rows = [
        ("backend.base_url", config.backend.base_url.clone()),
        ("backend.episodes_per_page", config.backend.episodes_per_page.to_string()),
        ("backend.timeout_secs", config.backend.timeout_secs.to_string()),
        ("backend.api_token", token),
        ("playback.progress_interval_secs", config.playback.progress_interval_secs.to_string()),
        ("playback.controls_hide_secs", config.playback.controls_hide_secs.to_string()),
        ("playback.skip_seconds", config.playback.skip_seconds.to_string()),
        ("playback.placeholder_progress_secs", config.playback.placeholder_progress_secs.to_string()),
        ("playback.default_episode_duration_secs", config.playback.default_episode_duration_secs.to_string()),
        ("playback.switch_timeout_secs", config.playback.switch_timeout_secs.to_string()),
        ("history.max_entries", config.history.max_entries.to_string()),
        ("history.storage_key", config.history.storage_key.clone()),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    output.table(table);
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write {}: {}", config_file.display(), e))?;
    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn show_paths(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let paths = [
        ("config", path_manager.config_file()),
        ("storage", path_manager.store_file()),
        ("log", path_manager.log_file()),
    ];

    if !output.is_human() {
        let map: serde_json::Map<String, serde_json::Value> = paths
            .iter()
            .map(|(name, path)| (name.to_string(), json!(path.display().to_string())))
            .collect();
        output.json(&serde_json::Value::Object(map));
        return Ok(());
    }
    for (name, path) in paths {
        output.info(format!("{:<8} {}", name, path.display()));
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
