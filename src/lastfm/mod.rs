//! Last.fm web service module.

pub mod api;
pub mod models;

pub use api::{ArtistMetadataSource, ArtworkSource, LastfmClient, LastfmError};
pub use models::LastfmArtist;
