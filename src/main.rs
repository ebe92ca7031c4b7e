//! artist-panel - A terminal artist information panel backed by Last.fm.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

mod action;
mod app;
mod config;
mod i18n;
mod lastfm;
mod library;
mod playback;
mod presenter;
mod tui;
mod ui;

use action::Action;
use app::App;
use config::{Config, SharedSettings};
use i18n::I18nService;
use lastfm::{ArtworkSource, LastfmClient};
use library::JsonLibrary;
use playback::PlaybackService;
use presenter::{ArtistInfoPresenter, LastfmViewFactory, PresenterDeps};
use ui::QueueState;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "artist-panel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the JSON track library (overrides config)
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// Last.fm API key (overrides config)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Language code, e.g. EN or DE (overrides config)
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hooks
    tui::install_hooks()?;

    // Initialize logging
    let log_file = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artist-panel")
        .join("artist-panel.log");

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_subscriber::fmt::layer()
        .with_writer(std::fs::File::create(&log_file)?)
        .with_ansi(false);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::sink) // Don't write to stdout in TUI mode
        .finish()
        .with(file_appender)
        .try_init()
        .ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load {}: {}", config_path.display(), e);
        Config::default()
    });

    // Apply command-line overrides
    if let Some(library) = args.library {
        config.library.path = Some(library);
    }
    if let Some(api_key) = args.api_key {
        config.lastfm.api_key = api_key;
    }
    if let Some(language) = args.language {
        config.ui.language = language.to_uppercase();
    }

    if !config.has_api_key() {
        tracing::warn!("No Last.fm API key configured, artist lookups will fail");
    }

    let library = match &config.library.path {
        Some(path) => JsonLibrary::load(path)?,
        None => JsonLibrary::default(),
    };
    if library.is_empty() {
        tracing::warn!("Library is empty, nothing to play");
    } else {
        tracing::info!("Loaded {} tracks", library.len());
    }

    let client = LastfmClient::new(
        config.lastfm.base_url.clone(),
        config.lastfm.api_key.clone(),
        Duration::from_secs(config.lastfm.timeout_secs),
    )?;
    let client = Arc::new(client);

    let artwork: Option<Arc<dyn ArtworkSource>> = if config.ui.show_artist_image {
        Some(client.clone() as Arc<dyn ArtworkSource>)
    } else {
        None
    };

    let queue = QueueState::new(library.tracks());
    let playback = Arc::new(PlaybackService::new(queue.track_refs()));
    let i18n = Arc::new(I18nService::new(&config.ui.language));
    let settings = SharedSettings::new(config, Some(config_path));

    let deps = PresenterDeps {
        now_playing: playback.clone(),
        localization: i18n.clone(),
        track_store: Arc::new(library),
        views: Arc::new(LastfmViewFactory::new(artwork)),
        metadata: client,
        settings: Arc::new(settings.clone()),
    };

    let presenter = ArtistInfoPresenter::new(deps);
    let handle = presenter.spawn(playback.subscribe(), i18n.subscribe());
    {
        let presenter = Arc::clone(&presenter);
        tokio::spawn(async move {
            presenter.initialize().await;
        });
    }

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Initialize terminal
    let mut terminal = tui::init()?;

    // Create application (queries terminal graphics support)
    let mut app = App::new(
        settings,
        playback,
        i18n,
        presenter,
        queue,
        action_tx.clone(),
    );

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        // Render UI
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        // Handle events with timeout
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        let action = handle_key_event(key.code, key.modifiers, &app);
                        if action != Action::None {
                            action_tx.send(action)?;
                        }
                    }
                }
                Event::Resize(width, height) => {
                    action_tx.send(Action::Resize(width, height))?;
                }
                _ => {}
            }
        }

        // Send tick action
        action_tx.send(Action::Tick)?;

        // Process all pending actions
        while let Ok(action) = action_rx.try_recv() {
            app.handle_action(action).await?;
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    tui::restore()?;

    handle.shutdown().await;

    Ok(())
}

/// Map key events to actions.
fn handle_key_event(code: KeyCode, modifiers: KeyModifiers, app: &App) -> Action {
    // Handle help overlay
    if app.show_help {
        return match code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Action::HideHelp,
            _ => Action::None,
        };
    }

    // Global keys
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
        _ => {}
    }

    match code {
        // Navigation
        KeyCode::Up | KeyCode::Char('k') => Action::NavigateUp,
        KeyCode::Down | KeyCode::Char('j') => Action::NavigateDown,
        KeyCode::Char('g') => Action::JumpToTop,
        KeyCode::Char('G') => Action::JumpToBottom,
        KeyCode::Char('o') => Action::JumpToCurrentTrack,
        KeyCode::Char('K') | KeyCode::PageUp => Action::ScrollArtistUp,
        KeyCode::Char('J') | KeyCode::PageDown => Action::ScrollArtistDown,

        // Playback
        KeyCode::Enter => Action::PlaySelected,
        KeyCode::Char('n') => Action::NextTrack,
        KeyCode::Char('p') => Action::PreviousTrack,
        KeyCode::Char('s') => Action::Stop,

        // Artist information
        KeyCode::Char('L') => Action::CycleLanguage,
        KeyCode::Char('D') => Action::ToggleArtistDownloads,

        // Help
        KeyCode::Char('?') => Action::ShowHelp,

        // Clear error
        KeyCode::Char('x') | KeyCode::Esc => Action::ClearError,

        _ => Action::None,
    }
}

use tracing_subscriber::prelude::*;
