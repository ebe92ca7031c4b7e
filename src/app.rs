//! Main application state and logic.

use std::sync::Arc;

use color_eyre::Result;
use tokio::sync::{mpsc, watch};

use crate::action::Action;
use crate::config::SharedSettings;
use crate::i18n::I18nService;
use crate::playback::PlaybackService;
use crate::presenter::{ArtistInfoPresenter, ArtistPanel};
use crate::ui::{ArtistPanelState, QueueState};

/// Main application state.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,

    /// Persisted settings
    pub settings: SharedSettings,

    /// Playback state
    pub playback: Arc<PlaybackService>,

    /// Current display language
    pub i18n: Arc<I18nService>,

    /// Artist information presenter
    pub presenter: Arc<ArtistInfoPresenter>,

    /// Queue state
    pub queue: QueueState,

    /// Artist panel state
    pub artist: ArtistPanelState,

    /// Published panel updates
    panel_rx: watch::Receiver<ArtistPanel>,

    /// Help overlay visible
    pub show_help: bool,

    /// Error message to display
    pub error_message: Option<String>,

    /// Action sender for async operations
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        settings: SharedSettings,
        playback: Arc<PlaybackService>,
        i18n: Arc<I18nService>,
        presenter: Arc<ArtistInfoPresenter>,
        queue: QueueState,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let panel_rx = presenter.subscribe();
        let show_images = settings.snapshot().ui.show_artist_image;
        let artist = ArtistPanelState::new(panel_rx.borrow().clone(), show_images);

        Self {
            should_quit: false,
            settings,
            playback,
            i18n,
            presenter,
            queue,
            artist,
            panel_rx,
            show_help: false,
            error_message: None,
            action_tx,
        }
    }

    /// Handle an action and update state.
    pub async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }

            Action::Tick => {
                if self.panel_rx.has_changed().unwrap_or(false) {
                    let panel = self.panel_rx.borrow_and_update().clone();
                    self.artist.set_panel(panel);
                }
                self.artist.tick();
            }

            Action::Resize(_, _) => {}

            Action::NavigateUp => self.queue.select_previous(),
            Action::NavigateDown => self.queue.select_next(),
            Action::JumpToTop => self.queue.jump_to_top(),
            Action::JumpToBottom => self.queue.jump_to_bottom(),
            Action::JumpToCurrentTrack => self.queue.jump_to(self.playback.current_index()),
            Action::ScrollArtistUp => self.artist.scroll_up(),
            Action::ScrollArtistDown => self.artist.scroll_down(),

            Action::PlaySelected => {
                if let Some(index) = self.queue.selected() {
                    self.playback.play(index);
                }
            }

            Action::NextTrack => {
                if self.playback.play_next() {
                    self.queue.jump_to(self.playback.current_index());
                }
            }

            Action::PreviousTrack => {
                if self.playback.play_previous() {
                    self.queue.jump_to(self.playback.current_index());
                }
            }

            Action::Stop => self.playback.stop(),

            Action::CycleLanguage => {
                let code = self.i18n.cycle_language();
                if let Err(e) = self.settings.set_language(code) {
                    self.action_tx
                        .send(Action::Error(format!("Failed to save settings: {}", e)))?;
                }
            }

            Action::ToggleArtistDownloads => {
                let enabled = !self.settings.snapshot().lastfm.download_artist_information;
                if let Err(e) = self.settings.set_download_artist_information(enabled) {
                    self.action_tx
                        .send(Action::Error(format!("Failed to save settings: {}", e)))?;
                }
                tracing::info!("Artist information downloads: {}", enabled);

                let presenter = Arc::clone(&self.presenter);
                tokio::spawn(async move {
                    presenter.initialize().await;
                });
            }

            Action::ShowHelp => self.show_help = true,
            Action::HideHelp => self.show_help = false,

            Action::Error(message) => {
                tracing::error!("{}", message);
                self.error_message = Some(message);
            }
            Action::ClearError => self.error_message = None,

            Action::None => {}
        }

        Ok(())
    }
}
