//! Application actions that drive state changes.

/// Actions that can be dispatched to update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Application lifecycle
    Quit,
    Tick,
    Resize(u16, u16),

    // Navigation
    NavigateUp,
    NavigateDown,
    JumpToTop,
    JumpToBottom,
    JumpToCurrentTrack,
    ScrollArtistUp,
    ScrollArtistDown,

    // Playback
    PlaySelected,
    NextTrack,
    PreviousTrack,
    Stop,

    // Settings
    CycleLanguage,
    ToggleArtistDownloads,

    // Overlays
    ShowHelp,
    HideHelp,

    // Errors
    Error(String),
    ClearError,

    // No-op
    None,
}
