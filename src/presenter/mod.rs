//! Presentation logic for the artist information panel.

pub mod artist_info;
pub mod control;


pub use artist_info::{ArtistInfoView, ArtistViewFactory, LastfmViewFactory};
pub use control::{ArtistInfoPresenter, ArtistPanel, PresenterDeps, PresenterHandle, SlideDirection};
