use super::{load_config, open_history};
use crate::output::Output;
use crate::{HistoryCommands, KindArg};
use chrono::Utc;
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use dialoguer::Confirm;
use media_player_config::PathManager;
use media_player_core::format::{format_age, format_time};
use media_player_core::HistoryRepository;
use media_player_models::{ContentKind, HistoryEntry, LaunchRequest};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_history(cmd: HistoryCommands, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;
    let history = open_history(&path_manager, &config)?;

    match cmd {
        HistoryCommands::List { kind, limit } => list(&history, kind, limit, output),
        HistoryCommands::Remove { id } => remove(&history, &id, output),
        HistoryCommands::Clear { yes } => clear(&history, yes, output),
        HistoryCommands::Resume { id } => resume(&history, &id, output),
    }
}

fn read_entries(history: &HistoryRepository) -> Result<Vec<HistoryEntry>> {
    history
        .list()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read watch history: {}", e))
}

fn list(history: &HistoryRepository, kind: Option<KindArg>, limit: Option<usize>, output: &Output) -> Result<()> {
    let wanted = kind.map(|k| match k {
        KindArg::Movie => ContentKind::Movie,
        KindArg::Series => ContentKind::Series,
    });
    let entries: Vec<HistoryEntry> = read_entries(history)?
        .into_iter()
        .filter(|entry| wanted.map_or(true, |kind| entry.kind == kind))
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    if !output.is_human() {
        output.json(&json!({ "count": entries.len(), "items": entries }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }
    if entries.is_empty() {
        output.info("Watch history is empty");
        return Ok(());
    }

    let now = Utc::now();
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Progress").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Position").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Watched").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Id").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for entry in &entries {
        let percent = entry.progress_percent();
        let bar_color = if percent >= 90.0 { Color::Green } else { Color::Cyan };
        table.add_row(vec![
            Cell::new(&entry.title),
            Cell::new(entry.kind.as_str()),
            Cell::new(format!("{} {:>3.0}%", progress_bar(percent, 10), percent)).fg(bar_color),
            Cell::new(format!("{} / {}", format_time(entry.progress), format_time(entry.duration))),
            Cell::new(format_age(entry.timestamp, now)),
            Cell::new(&entry.id).fg(Color::DarkGrey),
        ]);
    }
    output.table(table);
    println!("{}", format!("{} item(s)", entries.len()).bright_black());
    Ok(())
}

fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn remove(history: &HistoryRepository, id: &str, output: &Output) -> Result<()> {
    let removed = history
        .remove(id)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to update watch history: {}", e))?;
    if removed {
        output.success(format!("Removed {} from watch history", id));
    } else {
        output.warn(format!("No history item with id {}", id));
    }
    Ok(())
}

fn clear(history: &HistoryRepository, yes: bool, output: &Output) -> Result<()> {
    let count = read_entries(history)?.len();
    if count == 0 {
        output.info("Watch history is already empty");
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove all {} item(s) from the watch history?", count))
            .default(false)
            .interact()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))?;
        if !confirmed {
            output.info("Nothing removed");
            return Ok(());
        }
    }

    history
        .clear()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to clear watch history: {}", e))?;
    output.success(format!("Cleared {} item(s)", count));
    Ok(())
}

fn resume(history: &HistoryRepository, id: &str, output: &Output) -> Result<()> {
    let entry = history
        .get(id)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read watch history: {}", e))?
        .ok_or_else(|| color_eyre::eyre::eyre!("No history item with id {}", id))?;
    let launch = LaunchRequest::resume(&entry);

    if output.is_human() {
        output.info(format!(
            "{} at {}",
            entry.title.bold(),
            format_time(launch.start_time)
        ));
        println!("{}", serde_json::to_string_pretty(&launch)?);
    } else {
        output.json(&serde_json::to_value(&launch)?);
    }
    Ok(())
}
