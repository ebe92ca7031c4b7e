//! Last.fm web service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::models::*;

/// Error code Last.fm returns for unknown artists.
pub const ARTIST_NOT_FOUND: i32 = 6;

/// API client errors.
#[derive(Debug, Error)]
pub enum LastfmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Last.fm error {code}: {message}")]
    Api { code: i32, message: String },
}

/// Remote lookup of artist metadata.
#[async_trait]
pub trait ArtistMetadataSource: Send + Sync {
    /// Fetch artist info in `language`. `Ok(None)` when the artist is unknown.
    async fn artist_info(
        &self,
        artist: &str,
        autocorrect: bool,
        language: &str,
    ) -> Result<Option<LastfmArtist>, LastfmError>;
}

/// Download of artist artwork.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, LastfmError>;
}

/// Last.fm API client.
#[derive(Debug, Clone)]
pub struct LastfmClient {
    /// HTTP client
    client: Client,

    /// Web service root, e.g. "https://ws.audioscrobbler.com/2.0/"
    base_url: String,

    /// API key
    api_key: String,
}

impl LastfmClient {
    /// Create a new API client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LastfmError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("artist-panel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Build the URL for a method call with query parameters.
    fn build_url(&self, method: &str, params: &[(&str, &str)]) -> String {
        let mut url = self.base_url.clone();
        if !url.ends_with('/') {
            url.push('/');
        }

        let mut query_parts: Vec<String> = vec![
            format!("method={}", method),
            format!("api_key={}", urlencoding::encode(&self.api_key)),
            String::from("format=json"),
        ];

        for (key, value) in params {
            query_parts.push(format!("{}={}", key, urlencoding::encode(value)));
        }

        url.push('?');
        url.push_str(&query_parts.join("&"));
        url
    }

    /// Call a method and return the raw response body.
    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<String, LastfmError> {
        let url = self.build_url(method, params);

        // Error payloads come with 4xx statuses, so the body is read either way
        let response = self.client.get(&url).send().await?;
        Ok(response.text().await?)
    }

    /// artist.getInfo
    pub async fn artist_get_info(
        &self,
        artist: &str,
        autocorrect: bool,
        language: &str,
    ) -> Result<Option<LastfmArtist>, LastfmError> {
        let autocorrect = if autocorrect { "1" } else { "0" };
        let lang = language.to_lowercase();

        let body = self
            .call(
                "artist.getInfo",
                &[
                    ("artist", artist),
                    ("autocorrect", autocorrect),
                    ("lang", &lang),
                ],
            )
            .await?;

        parse_artist_info(&body)
    }
}

/// Decode a response body, turning Last.fm error payloads into [`LastfmError::Api`].
fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, LastfmError> {
    if let Ok(error) = serde_json::from_str::<ErrorBody>(body) {
        return Err(LastfmError::Api {
            code: error.error,
            message: error.message,
        });
    }

    serde_json::from_str(body).map_err(|e| {
        LastfmError::InvalidResponse(format!(
            "Failed to parse response: {}. Body: {}",
            e,
            truncate(body, 500)
        ))
    })
}

/// Decode an artist.getInfo body. Unknown artists are `Ok(None)`.
fn parse_artist_info(body: &str) -> Result<Option<LastfmArtist>, LastfmError> {
    match decode::<ArtistInfoResponse>(body) {
        Ok(response) => Ok(Some(response.artist)),
        Err(LastfmError::Api { code, .. }) if code == ARTIST_NOT_FOUND => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ArtistMetadataSource for LastfmClient {
    async fn artist_info(
        &self,
        artist: &str,
        autocorrect: bool,
        language: &str,
    ) -> Result<Option<LastfmArtist>, LastfmError> {
        self.artist_get_info(artist, autocorrect, language).await
    }
}

#[async_trait]
impl ArtworkSource for LastfmClient {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, LastfmError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Cut `text` to at most `max` bytes on a char boundary.
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
