//! Presenter driving the artist panel.
//!
//! Each track or language change runs a resolution cycle: look up the playing
//! track, decide whether the artist changed, fetch Last.fm info when needed and
//! publish a fresh [`ArtistInfoView`]. Cycles may overlap; every cycle carries a
//! generation number and a cancellation token, and only the newest cycle is
//! allowed to touch presenter state.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::artist_info::{ArtistInfoView, ArtistViewFactory};
use crate::config::SettingsStore;
use crate::i18n::Localization;
use crate::lastfm::{ArtistMetadataSource, LastfmArtist, LastfmError};
use crate::library::{TrackStore, UNKNOWN_ARTIST};
use crate::playback::{NowPlaying, PlaybackEvent};

/// Language requested when the localized biography is empty.
pub const FALLBACK_LANGUAGE: &str = "EN";

/// Transition hint for the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl SlideDirection {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LeftToRight => "→",
            Self::RightToLeft => "←",
        }
    }
}

/// Artist identity used to detect artist changes. Compared by name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistIdentity {
    pub name: String,
}

impl ArtistIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// State published to the UI.
#[derive(Debug, Clone)]
pub struct ArtistPanel {
    pub view: Arc<ArtistInfoView>,
    pub busy: bool,
    pub slide_direction: SlideDirection,
}

/// Collaborators of the presenter.
#[derive(Clone)]
pub struct PresenterDeps {
    pub now_playing: Arc<dyn NowPlaying>,
    pub localization: Arc<dyn Localization>,
    pub track_store: Arc<dyn TrackStore>,
    pub views: Arc<dyn ArtistViewFactory>,
    pub metadata: Arc<dyn ArtistMetadataSource>,
    pub settings: Arc<dyn SettingsStore>,
}

/// Result of the remote fetch step.
#[derive(Debug)]
enum FetchOutcome {
    Found(LastfmArtist),
    Failed(String),
}

#[derive(Debug, Default)]
struct CycleState {
    current: Option<ArtistIdentity>,
    previous: Option<ArtistIdentity>,
    generation: u64,
    in_flight: CancellationToken,
    closed: bool,
}

/// Ticket of a running cycle.
#[derive(Clone)]
struct Cycle {
    generation: u64,
    token: CancellationToken,
}

/// Presenter for the artist information panel.
pub struct ArtistInfoPresenter {
    deps: PresenterDeps,
    state: Mutex<CycleState>,
    panel_tx: watch::Sender<ArtistPanel>,
}

impl ArtistInfoPresenter {
    /// Create the presenter showing a placeholder. Call [`Self::initialize`]
    /// to load whatever is playing.
    pub fn new(deps: PresenterDeps) -> Arc<Self> {
        let (panel_tx, _) = watch::channel(ArtistPanel {
            view: Arc::new(deps.views.create()),
            busy: false,
            slide_direction: SlideDirection::default(),
        });

        Arc::new(Self {
            deps,
            state: Mutex::new(CycleState::default()),
            panel_tx,
        })
    }

    /// Create the presenter and resolve the track playing right now.
    pub async fn start(deps: PresenterDeps) -> Arc<Self> {
        let presenter = Self::new(deps);
        presenter.initialize().await;
        presenter
    }

    /// Resolve the playing track, bypassing the artist cache.
    pub async fn initialize(&self) {
        let track = self.deps.now_playing.playing_track();
        self.resolve(track.as_deref(), true).await;
    }

    /// Watch the published panel state.
    pub fn subscribe(&self) -> watch::Receiver<ArtistPanel> {
        self.panel_tx.subscribe()
    }

    /// Current panel state.
    pub fn panel(&self) -> ArtistPanel {
        self.panel_tx.borrow().clone()
    }

    /// Artist of the last successful resolution.
    pub fn current_artist(&self) -> Option<ArtistIdentity> {
        self.lock_state().current.clone()
    }

    /// Handle a playback change.
    pub async fn on_track_changed(&self, track: Option<String>, is_backward: bool) {
        let cycle = self.begin_cycle();
        self.finish_track_change(cycle, track, is_backward).await;
    }

    /// Handle a language change: reload the playing track's artist in the new language.
    pub async fn on_language_changed(&self) {
        if let Some(track) = self.deps.now_playing.playing_track() {
            self.resolve(Some(&track), true).await;
        }
    }

    /// Listen for playback and language notifications until the handle is dropped.
    ///
    /// Cycles are started in notification order before being handed to their
    /// own task, so a late task can never supersede a newer notification.
    pub fn spawn(
        self: &Arc<Self>,
        mut playback: broadcast::Receiver<PlaybackEvent>,
        mut language: broadcast::Receiver<()>,
    ) -> PresenterHandle {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let presenter = Arc::clone(self);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = playback.recv() => match event {
                        Ok(PlaybackEvent::Success { track, is_playing_previous }) => {
                            presenter.dispatch_track_change(track, is_playing_previous);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Missed {} playback events, resyncing", skipped);
                            let track = presenter.deps.now_playing.playing_track();
                            presenter.dispatch_track_change(track, false);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    changed = language.recv() => match changed {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            presenter.dispatch_language_change();
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }

            presenter.close();
            tracing::debug!("Artist presenter stopped listening");
        });

        PresenterHandle {
            shutdown,
            task: Some(task),
        }
    }

    fn dispatch_track_change(self: &Arc<Self>, track: Option<String>, is_backward: bool) {
        let cycle = self.begin_cycle();
        let presenter = Arc::clone(self);
        tokio::spawn(async move {
            presenter
                .finish_track_change(cycle, track, is_backward)
                .await;
        });
    }

    fn dispatch_language_change(self: &Arc<Self>) {
        let Some(track) = self.deps.now_playing.playing_track() else {
            return;
        };
        let Some(cycle) = self.begin_cycle() else {
            return;
        };
        let presenter = Arc::clone(self);
        tokio::spawn(async move {
            presenter.run_cycle(cycle, Some(&track), true).await;
        });
    }

    async fn finish_track_change(
        &self,
        cycle: Option<Cycle>,
        track: Option<String>,
        is_backward: bool,
    ) {
        let direction = if is_backward {
            SlideDirection::RightToLeft
        } else {
            SlideDirection::LeftToRight
        };
        let Some(cycle) = cycle else {
            return;
        };

        self.commit(&cycle, |_, panel| panel.slide_direction = direction);
        self.run_cycle(cycle.clone(), track.as_deref(), false).await;
        self.commit(&cycle, |_, panel| {
            panel.slide_direction = SlideDirection::LeftToRight
        });
    }

    async fn resolve(&self, track_ref: Option<&str>, force_reload: bool) {
        if let Some(cycle) = self.begin_cycle() {
            self.run_cycle(cycle, track_ref, force_reload).await;
        }
    }

    /// One resolution cycle.
    async fn run_cycle(&self, cycle: Cycle, track_ref: Option<&str>, force_reload: bool) {
        let track_ref = match track_ref {
            Some(t) if !t.is_empty() && self.deps.settings.download_artist_information() => t,
            _ => {
                self.show_placeholder(&cycle);
                return;
            }
        };

        let lookup = tokio::select! {
            _ = cycle.token.cancelled() => return,
            result = self.deps.track_store.track_info(track_ref) => result,
        };

        let track = match lookup {
            Ok(Some(track)) => track,
            Ok(None) => {
                if self.is_current(&cycle) {
                    tracing::error!("Track not found in the database: {}", track_ref);
                    self.show_placeholder(&cycle);
                }
                return;
            }
            Err(e) => {
                if self.is_current(&cycle) {
                    tracing::error!("Could not look up track {}: {}", track_ref, e);
                    self.show_placeholder(&cycle);
                }
                return;
            }
        };

        if track.artist_name == UNKNOWN_ARTIST {
            let mut view = self.deps.views.create();
            tokio::select! {
                _ = cycle.token.cancelled() => return,
                _ = self.deps.views.populate(&mut view, LastfmArtist::named(UNKNOWN_ARTIST)) => {}
            }
            self.commit(&cycle, |state, panel| {
                state.current = None;
                panel.view = Arc::new(view);
            });
            return;
        }

        let artist = ArtistIdentity::new(&track.artist_name);
        let mut unchanged = false;
        let still_current = self.commit(&cycle, |state, panel| {
            unchanged = state.previous.as_ref() == Some(&artist);
            state.current = Some(artist);
            if !(unchanged && !force_reload) {
                panel.busy = true;
            }
        });
        if !still_current || (unchanged && !force_reload) {
            return;
        }

        let Some(outcome) = self.fetch_artist(&track.artist_name, &cycle).await else {
            return;
        };

        let artist = match outcome {
            FetchOutcome::Found(artist) => artist,
            FetchOutcome::Failed(reason) => {
                self.fail(&cycle, track_ref, &reason);
                return;
            }
        };

        let mut view = self.deps.views.create();
        tokio::select! {
            _ = cycle.token.cancelled() => return,
            _ = self.deps.views.populate(&mut view, artist) => {}
        }

        self.commit(&cycle, |_, panel| {
            panel.view = Arc::new(view);
            panel.busy = false;
        });
    }

    /// Fetch artist info in the active language, falling back to English when
    /// there is no localized biography. `None` when the cycle was cancelled.
    async fn fetch_artist(&self, artist: &str, cycle: &Cycle) -> Option<FetchOutcome> {
        let language = self.deps.localization.language_code();

        let attempt = async {
            let found = match self.deps.metadata.artist_info(artist, true, &language).await? {
                Some(found) if !found.has_biography() => {
                    self.deps
                        .metadata
                        .artist_info(artist, true, FALLBACK_LANGUAGE)
                        .await?
                }
                other => other,
            };
            Ok::<_, LastfmError>(found)
        };

        let result = tokio::select! {
            _ = cycle.token.cancelled() => return None,
            result = attempt => result,
        };

        Some(match result {
            Ok(Some(artist)) => FetchOutcome::Found(artist),
            Ok(None) => FetchOutcome::Failed(String::from("no artist information returned")),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        })
    }

    fn fail(&self, cycle: &Cycle, track_ref: &str, reason: &str) {
        if !self.is_current(cycle) {
            return;
        }
        tracing::error!(
            "Could not show artist information for track {}: {}",
            track_ref,
            reason
        );
        let view = Arc::new(self.deps.views.create());
        self.commit(cycle, |state, panel| {
            state.current = None;
            panel.view = view;
            panel.busy = false;
        });
    }

    fn show_placeholder(&self, cycle: &Cycle) {
        let view = Arc::new(self.deps.views.create());
        self.commit(cycle, |state, panel| {
            state.current = None;
            panel.view = view;
        });
    }

    /// Start a cycle: supersede the running one and remember the shown artist.
    fn begin_cycle(&self) -> Option<Cycle> {
        let mut state = self.lock_state();
        if state.closed {
            return None;
        }

        state.in_flight.cancel();
        state.in_flight = CancellationToken::new();
        state.generation += 1;

        // A superseded fetch is no longer in flight, and its artist was never shown
        let abandoned_fetch = self.panel_tx.send_if_modified(|panel| {
            let was_busy = panel.busy;
            panel.busy = false;
            was_busy
        });
        if abandoned_fetch {
            state.current = None;
        }
        state.previous = state.current.clone();

        Some(Cycle {
            generation: state.generation,
            token: state.in_flight.clone(),
        })
    }

    /// Apply `f` if `cycle` is still the newest one. Returns whether it was applied.
    fn commit(&self, cycle: &Cycle, f: impl FnOnce(&mut CycleState, &mut ArtistPanel)) -> bool {
        let mut state = self.lock_state();
        if state.generation != cycle.generation || state.closed {
            return false;
        }
        self.panel_tx.send_modify(|panel| f(&mut *state, panel));
        true
    }

    fn is_current(&self, cycle: &Cycle) -> bool {
        let state = self.lock_state();
        state.generation == cycle.generation && !state.closed
    }

    /// Stop accepting cycles and abandon the running one.
    fn close(&self) {
        let mut state = self.lock_state();
        state.closed = true;
        state.in_flight.cancel();
        drop(state);

        self.panel_tx.send_if_modified(|panel| {
            let was_busy = panel.busy;
            panel.busy = false;
            was_busy
        });
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CycleState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Owns the presenter's notification listener. Dropping it releases the
/// subscriptions and abandons any running cycle.
pub struct PresenterHandle {
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PresenterHandle {
    /// Stop listening and wait for the listener to finish.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Artist presenter listener ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PresenterHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
