//! Last.fm web service response models.

use serde::{Deserialize, Deserializer, Serialize};

/// Error payload returned instead of data.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

/// Response for artist.getInfo.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistInfoResponse {
    pub artist: LastfmArtist,
}

/// Artist as described by artist.getInfo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastfmArtist {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Vec<Image>,
    #[serde(default, deserialize_with = "lenient")]
    pub stats: Stats,
    #[serde(default, deserialize_with = "lenient")]
    pub similar: SimilarArtists,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Tags,
    #[serde(default, deserialize_with = "lenient")]
    pub bio: Biography,
}

/// Image link in one of the Last.fm sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "#text", default)]
    pub url: String,
    #[serde(default)]
    pub size: String,
}

/// Listener statistics. Last.fm encodes the numbers as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub listeners: String,
    #[serde(default)]
    pub playcount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarArtists {
    #[serde(default, deserialize_with = "one_or_many")]
    pub artist: Vec<SimilarArtist>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarArtist {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default, deserialize_with = "one_or_many")]
    pub tag: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Artist biography (wiki).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Biography {
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
}

/// Image sizes from smallest to largest.
const IMAGE_SIZES: &[&str] = &["small", "medium", "large", "extralarge", "mega"];

impl LastfmArtist {
    /// Artist carrying only a name, with nothing else known.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether the biography has any content.
    pub fn has_biography(&self) -> bool {
        !self.bio.content.is_empty()
    }

    /// URL of the largest non-empty image.
    pub fn largest_image_url(&self) -> Option<&str> {
        self.image
            .iter()
            .filter(|i| !i.url.is_empty())
            .max_by_key(|i| IMAGE_SIZES.iter().position(|s| *s == i.size))
            .map(|i| i.url.as_str())
    }

    pub fn listeners(&self) -> Option<u64> {
        self.stats.listeners.parse().ok()
    }

    pub fn playcount(&self) -> Option<u64> {
        self.stats.playcount.parse().ok()
    }
}

/// Accept a single object where a list is expected.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// Last.fm sends `""` for empty sections; treat anything unexpected as empty.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(T),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Value(value) => value,
        Lenient::Other(_) => T::default(),
    })
}
