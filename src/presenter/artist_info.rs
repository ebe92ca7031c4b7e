//! Artist information shown in the artist panel, and the factory that builds it.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Node, Selector};

use crate::lastfm::{ArtworkSource, LastfmArtist};

/// Similar artist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarArtistView {
    pub name: String,
    pub url: String,
}

/// Everything the artist panel renders. The default value is the placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistInfoView {
    /// Artist as returned by Last.fm
    pub artist: Option<LastfmArtist>,

    /// Biography as plain text
    pub biography: Option<String>,

    /// Tag names
    pub tags: Vec<String>,

    /// Similar artists
    pub similar: Vec<SimilarArtistView>,

    /// Largest artwork URL
    pub image_url: Option<String>,

    /// Downloaded artwork
    pub image: Option<Vec<u8>>,
}

impl ArtistInfoView {
    /// Whether nothing is known about the artist.
    pub fn is_placeholder(&self) -> bool {
        self.artist.is_none()
    }

    /// Artist name, if any.
    pub fn name(&self) -> Option<&str> {
        self.artist.as_ref().map(|a| a.name.as_str())
    }

    /// Derive the display fields from a Last.fm artist.
    pub fn set_artist(&mut self, artist: LastfmArtist) {
        self.biography = clean_biography(&artist.bio.content);
        self.tags = artist
            .tags
            .tag
            .iter()
            .map(|t| t.name.clone())
            .filter(|n| !n.is_empty())
            .collect();
        self.similar = artist
            .similar
            .artist
            .iter()
            .filter(|a| !a.name.is_empty())
            .map(|a| SimilarArtistView {
                name: a.name.clone(),
                url: a.url.clone(),
            })
            .collect();
        self.image_url = artist.largest_image_url().map(String::from);
        self.image = None;
        self.artist = Some(artist);
    }
}

/// Creates fresh artist views for the presenter.
#[async_trait]
pub trait ArtistViewFactory: Send + Sync {
    /// A fresh, empty view.
    fn create(&self) -> ArtistInfoView;

    /// Fill `view` from `artist`, loading anything it needs.
    async fn populate(&self, view: &mut ArtistInfoView, artist: LastfmArtist);
}

/// Builds views from Last.fm data and downloads their artwork.
pub struct LastfmViewFactory {
    artwork: Option<Arc<dyn ArtworkSource>>,
}

impl LastfmViewFactory {
    /// `artwork` is `None` when images should not be downloaded.
    pub fn new(artwork: Option<Arc<dyn ArtworkSource>>) -> Self {
        Self { artwork }
    }
}

#[async_trait]
impl ArtistViewFactory for LastfmViewFactory {
    fn create(&self) -> ArtistInfoView {
        ArtistInfoView::default()
    }

    async fn populate(&self, view: &mut ArtistInfoView, artist: LastfmArtist) {
        view.set_artist(artist);

        let (Some(artwork), Some(url)) = (&self.artwork, view.image_url.clone()) else {
            return;
        };

        match artwork.fetch_image(&url).await {
            Ok(bytes) => view.image = Some(bytes),
            Err(e) => tracing::warn!("Failed to load artist image {}: {}", url, e),
        }
    }
}

/// Turn Last.fm wiki HTML into plain text without the "Read more" trailer.
pub fn clean_biography(content: &str) -> Option<String> {
    let fragment = Html::parse_fragment(content);

    // The trailer starts with the last link back to the wiki page
    let trailer = Selector::parse(r#"a[href^="https://www.last.fm"]"#)
        .ok()
        .and_then(|selector| fragment.select(&selector).last())
        .map(|link| link.id());

    let mut text = String::with_capacity(content.len());
    for node in fragment.tree.root().descendants() {
        if Some(node.id()) == trailer {
            break;
        }
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }

    // Collapse runs of blank lines
    let mut paragraphs: Vec<&str> = Vec::new();
    let mut blank = false;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            blank = true;
            continue;
        }
        if blank && !paragraphs.is_empty() {
            paragraphs.push("");
        }
        blank = false;
        paragraphs.push(line);
    }

    let cleaned = paragraphs.join("\n");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::lastfm::models::{Biography, Image, Tag, Tags};
    use crate::lastfm::LastfmError;

    #[test]
    fn test_clean_biography_strips_trailer() {
        let content = "Radiohead are an <b>English</b> rock band.\n\n\n\
                       Formed in Abingdon &amp; Oxford.\n \
                       <a href=\"https://www.last.fm/music/Radiohead\">Read more on Last.fm</a>. \
                       User-contributed text is available under the Creative Commons By-SA License.";

        assert_eq!(
            clean_biography(content).unwrap(),
            "Radiohead are an English rock band.\n\nFormed in Abingdon & Oxford."
        );
    }

    #[test]
    fn test_clean_biography_decodes_entities() {
        assert_eq!(
            clean_biography("Sigur&nbsp;R&oacute;s &#8220;Takk&#8221; it&#x27;s").unwrap(),
            "Sigur\u{a0}Rós \u{201c}Takk\u{201d} it's"
        );
    }

    #[test]
    fn test_clean_biography_keeps_other_links() {
        let content = "Formed by <a href=\"https://example.com/thom\">Thom</a> in 1985.\
                       <br><br>Signed to EMI. \
                       <a href=\"https://www.last.fm/music/Radiohead\">Read more on Last.fm</a>";

        assert_eq!(
            clean_biography(content).unwrap(),
            "Formed by Thom in 1985.\n\nSigned to EMI."
        );
    }

    #[test]
    fn test_clean_biography_empty() {
        assert!(clean_biography("").is_none());
        assert!(clean_biography(" <a href=\"https://www.last.fm/x\">Read more</a>").is_none());
    }

    #[test]
    fn test_named_artist_has_only_name() {
        let mut view = ArtistInfoView::default();
        view.set_artist(LastfmArtist::named("Unknown Artist"));

        assert_eq!(view.name(), Some("Unknown Artist"));
        assert!(view.biography.is_none());
        assert!(view.tags.is_empty());
        assert!(view.similar.is_empty());
        assert!(view.image_url.is_none());
    }

    struct RecordingArtwork {
        urls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ArtworkSource for RecordingArtwork {
        async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, LastfmError> {
            self.urls.lock().unwrap().push(url.to_string());
            if self.fail {
                Err(LastfmError::InvalidResponse(String::from("boom")))
            } else {
                Ok(vec![1, 2, 3])
            }
        }
    }

    fn artist_with_image() -> LastfmArtist {
        LastfmArtist {
            name: String::from("Radiohead"),
            image: vec![Image {
                url: String::from("https://img/large.png"),
                size: String::from("large"),
            }],
            tags: Tags {
                tag: vec![Tag {
                    name: String::from("rock"),
                    url: String::new(),
                }],
            },
            bio: Biography {
                content: String::from("Band."),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_populate_downloads_artwork() {
        let artwork = Arc::new(RecordingArtwork {
            urls: Mutex::new(Vec::new()),
            fail: false,
        });
        let factory = LastfmViewFactory::new(Some(artwork.clone()));

        let mut view = factory.create();
        factory.populate(&mut view, artist_with_image()).await;

        assert_eq!(view.image.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(view.tags, vec![String::from("rock")]);
        assert_eq!(view.biography.as_deref(), Some("Band."));
        assert_eq!(*artwork.urls.lock().unwrap(), vec!["https://img/large.png"]);
    }

    #[tokio::test]
    async fn test_populate_survives_artwork_failure() {
        let artwork = Arc::new(RecordingArtwork {
            urls: Mutex::new(Vec::new()),
            fail: true,
        });
        let factory = LastfmViewFactory::new(Some(artwork));

        let mut view = factory.create();
        factory.populate(&mut view, artist_with_image()).await;

        assert!(view.image.is_none());
        assert_eq!(view.name(), Some("Radiohead"));
    }
}
