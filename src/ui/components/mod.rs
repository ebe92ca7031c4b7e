//! UI components module.

pub mod artist_info;
pub mod queue;

pub use artist_info::{render_artist_info, ArtistPanelState};
pub use queue::{render_queue, QueueState};
