//! CLI command implementations.

use anyhow::Context;
use clap::Args;
use deck_client::DeckClient;
use deck_core::{SoundId, TabId};
use deck_session::{Session, SessionEvent};
use deck_settings::SettingsStore;
use std::path::Path;

#[derive(Args)]
pub struct SoundsArgs {
    /// Tab id ("favorites" or a backend tab id)
    #[arg(long)]
    pub tab: Option<String>,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Sound id
    pub sound_id: i64,

    /// Keep following progress until the sound finishes
    #[arg(long)]
    pub watch: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search term
    pub term: String,
}

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(clap::Subcommand)]
pub enum SettingsAction {
    /// Print the settings document as an export envelope
    Export,
    /// Replace the settings document from an exported file
    Import {
        /// Exported settings file
        file: std::path::PathBuf,
    },
    /// Discard all customizations
    Reset,
}

fn open_session(server: &str, settings_path: &Path) -> anyhow::Result<Session> {
    let client = DeckClient::new(server).context("invalid backend URL")?;
    let settings = SettingsStore::open(settings_path);
    Ok(Session::new(client, settings))
}

pub async fn status(server: &str, settings_path: &Path) -> anyhow::Result<()> {
    let session = open_session(server, settings_path)?;
    match session.check_connection().await {
        Ok(()) => {
            println!("connected to {}", session.client().base_url());
            Ok(())
        }
        Err(e) => {
            let indicator = session.connection_status();
            anyhow::bail!("{}: {e}", indicator.borrow().as_str())
        }
    }
}

pub async fn tabs(server: &str, settings_path: &Path) -> anyhow::Result<()> {
    let mut session = open_session(server, settings_path)?;
    session.load_tabs().await?;

    let active = session.active_tab().cloned();
    for tab in session.tabs() {
        let marker = if Some(&tab.id) == active.as_ref() { "*" } else { " " };
        println!("{marker} {:<12} {}", tab.id, tab.name);
    }
    Ok(())
}

pub async fn sounds(server: &str, settings_path: &Path, args: SoundsArgs) -> anyhow::Result<()> {
    let mut session = open_session(server, settings_path)?;
    session.load_tabs().await?;
    if let Some(tab) = args.tab {
        session.switch_tab(&TabId::new(tab)).await?;
    }

    for sound in session.sounds() {
        let favorite = if session.settings().is_favorite(&sound.path) {
            "*"
        } else {
            " "
        };
        println!("{favorite} {:>6}  {}", sound.id, sound.name);
    }
    Ok(())
}

pub async fn play(server: &str, settings_path: &Path, args: PlayArgs) -> anyhow::Result<()> {
    let mut session = open_session(server, settings_path)?;
    let instance = session.play_sound(SoundId::new(args.sound_id)).await?;
    println!("playing sound {} as instance {instance}", args.sound_id);

    if args.watch {
        follow(&session).await;
    }
    Ok(())
}

pub async fn stop(server: &str, settings_path: &Path) -> anyhow::Result<()> {
    let mut session = open_session(server, settings_path)?;
    session.stop_all_sounds().await?;
    println!("stopped");
    Ok(())
}

pub async fn search(server: &str, settings_path: &Path, args: SearchArgs) -> anyhow::Result<()> {
    let mut session = open_session(server, settings_path)?;
    let indexed = session.build_search_index().await?;

    match session.search(&args.term) {
        None => println!("empty search term ({indexed} sounds indexed)"),
        Some(results) if results.is_empty() => println!("no matches"),
        Some(results) => {
            for sound in results {
                println!("{:>6}  {:<30} (tab {})", sound.id, sound.name, sound.tab_id);
            }
        }
    }
    Ok(())
}

pub async fn watch(server: &str, settings_path: &Path) -> anyhow::Result<()> {
    let mut session = open_session(server, settings_path)?;
    session.resync().await?;

    if session.playback_view().await.instances.is_empty() {
        println!("nothing playing");
        return Ok(());
    }
    follow(&session).await;
    Ok(())
}

pub fn settings(settings_path: &Path, args: SettingsArgs) -> anyhow::Result<()> {
    let mut store = SettingsStore::open(settings_path);
    match args.action {
        SettingsAction::Export => println!("{}", store.export_settings()),
        SettingsAction::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            store.import_settings(&content)?;
            println!("imported settings from {}", file.display());
        }
        SettingsAction::Reset => {
            store.reset();
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

/// Print session events until playback goes quiescent.
async fn follow(session: &Session) {
    let mut events = session.subscribe_events();
    loop {
        let event = tokio::time::timeout(deck_session::POLL_INTERVAL * 8, events.recv()).await;
        match event {
            Ok(Ok(SessionEvent::ProgressChanged { percent })) => {
                println!("progress {percent:5.1}%");
            }
            Ok(Ok(SessionEvent::SoundFinished { sound })) => {
                println!("sound {sound} finished");
            }
            Ok(Ok(SessionEvent::PlayingChanged { any_playing })) => {
                println!("playing: {any_playing}");
            }
            Ok(Ok(SessionEvent::SyncError)) => {
                println!("sync lost, playback state reset");
                return;
            }
            Ok(Ok(_)) => {}
            // Lagged receivers just pick the stream back up
            Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(_))) => {}
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) => return,
            Err(_) => {
                // No events for a while: done when tracking emptied
                if session.playback_view().await.instances.is_empty() {
                    return;
                }
            }
        }
        if !session.is_polling() && session.playback_view().await.instances.is_empty() {
            return;
        }
    }
}
