use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{config, episodes, history, play};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;
mod simulated;

#[derive(Parser)]
#[command(name = "swplay")]
#[command(about = "swplay - headless player and watch history for the streaming catalog")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the local watch history
    History {
        #[command(subcommand)]
        cmd: HistoryCommands,
    },
    /// List the episodes of a series
    #[command(long_about = "Fetch the full episode list of a series from the backend, grouped by season. With --season and --episode the matching episode is marked and its neighbours are shown.")]
    Episodes {
        /// Series id
        series_id: String,

        #[arg(long)]
        season: Option<u32>,

        #[arg(long)]
        episode: Option<u32>,
    },
    /// Run a headless playback session
    #[command(long_about = "Play a movie or an episode on a simulated media element. Progress is saved to the watch history every few seconds and on exit. Commands are read from stdin: space, left, right, f, m, n, p, move, cast, vol <0..1>, seek <seconds>, goto <episode id>, q.")]
    Play(PlayArgs),
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List watched items, most recent first
    List {
        /// Only show one kind of content
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Remove one item
    Remove { id: String },
    /// Remove every item
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Print the launch parameters that resume an item
    Resume { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Movie,
    Series,
}

#[derive(clap::Args)]
struct PlayArgs {
    /// Video URL (not needed with --resume)
    #[arg(long, required_unless_present = "resume")]
    url: Option<String>,

    /// Content id (movie id or episode id)
    #[arg(long, required_unless_present = "resume")]
    id: Option<String>,

    /// Title stored in the history
    #[arg(long)]
    title: Option<String>,

    /// Series id; plays an episode when set
    #[arg(long, requires_all = ["season", "episode"])]
    series_id: Option<String>,

    #[arg(long)]
    season: Option<u32>,

    #[arg(long)]
    episode: Option<u32>,

    /// Start position in seconds (defaults to the stored progress)
    #[arg(long)]
    start: Option<f64>,

    /// Resume a history item by id
    #[arg(long, conflicts_with_all = ["url", "id", "series_id"])]
    resume: Option<String>,

    /// Length of the simulated media in seconds
    #[arg(long, default_value_t = 2400.0)]
    duration: f64,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    watch: Option<u64>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Print where configuration, storage and logs live
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging_with_file(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::History { cmd } => history::run_history(cmd, &output).await,
        Commands::Episodes {
            series_id,
            season,
            episode,
        } => episodes::run_episodes(&series_id, season, episode, &output).await,
        Commands::Play(args) => play::run_play(args, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show);
            config::run_config(cmd, &output).await
        }
    }
}
