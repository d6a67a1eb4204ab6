//! Sounddeck CLI - command-line remote control for a soundboard backend.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deck")]
#[command(author, version, about = "Remote control for a soundboard backend", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the backend connection
    Status,

    /// List tabs
    Tabs,

    /// List the sounds of a tab (the remembered tab by default)
    Sounds(commands::SoundsArgs),

    /// Play a sound by id
    Play(commands::PlayArgs),

    /// Stop all playback
    Stop,

    /// Search sounds across all tabs
    Search(commands::SearchArgs),

    /// Follow playback progress until it goes quiet
    Watch,

    /// Export, import, or reset the persisted settings
    Settings(commands::SettingsArgs),
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("sounddeck-remote").join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("sounddeck-settings.json"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);

    match cli.command {
        Commands::Status => commands::status(&cli.server, &settings_path).await,
        Commands::Tabs => commands::tabs(&cli.server, &settings_path).await,
        Commands::Sounds(args) => commands::sounds(&cli.server, &settings_path, args).await,
        Commands::Play(args) => commands::play(&cli.server, &settings_path, args).await,
        Commands::Stop => commands::stop(&cli.server, &settings_path).await,
        Commands::Search(args) => commands::search(&cli.server, &settings_path, args).await,
        Commands::Watch => commands::watch(&cli.server, &settings_path).await,
        Commands::Settings(args) => commands::settings(&settings_path, args),
    }
}
