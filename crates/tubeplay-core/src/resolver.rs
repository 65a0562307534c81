//! Video metadata lookup.
//!
//! Resolves a user-supplied link into a [`TrackDraft`] by extracting the
//! video identifier and querying the `YouTube` Data API v3 `videos` endpoint
//! for the title, channel, duration and thumbnails.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tubeplay_core::config::YouTubeApiConfig;
//! use tubeplay_core::resolver::{YouTubeDataClient, resolve_video_metadata};
//!
//! # async fn run() -> tubeplay_core::Result<()> {
//! let client = YouTubeDataClient::new(&YouTubeApiConfig::default())?;
//! let draft = resolve_video_metadata("https://youtu.be/dQw4w9WgXcQ", &client).await?;
//! println!("{} - {} ({})", draft.artist, draft.title, draft.duration);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::YouTubeApiConfig;
use crate::error::{Error, ResolveError, Result};
use crate::track::TrackDraft;
use crate::youtube::{extract_video_id, format_duration, youtube_thumbnail_url};

/// Response of `GET /videos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoListResponse {
    /// Matching videos; absent when nothing matched.
    #[serde(default)]
    pub items: Option<Vec<VideoResource>>,
}

/// A single video resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    /// Title, channel and artwork.
    pub snippet: Option<Snippet>,
    /// Duration and format details.
    pub content_details: Option<ContentDetails>,
}

/// The `snippet` part of a video resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Video title.
    pub title: Option<String>,
    /// Uploading channel name.
    pub channel_title: Option<String>,
    /// Available thumbnails.
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// The `contentDetails` part of a video resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentDetails {
    /// ISO-8601 duration such as `PT3M33S`.
    pub duration: Option<String>,
}

/// Thumbnails keyed by resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    /// 120x90.
    #[serde(default)]
    pub default: Option<Thumbnail>,
    /// 320x180.
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    /// 480x360.
    #[serde(default)]
    pub high: Option<Thumbnail>,
    /// 640x480.
    #[serde(default)]
    pub standard: Option<Thumbnail>,
    /// 1280x720, not generated for every video.
    #[serde(default)]
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Best available URL: maxres, then high, then default.
    #[must_use]
    pub fn best_url(&self) -> Option<&str> {
        self.maxres
            .as_ref()
            .or(self.high.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

/// A thumbnail image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Image URL.
    pub url: String,
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

/// Source of video metadata, abstracted for testability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    /// Fetch the resource for a single video identifier.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no credential is available, an
    /// upstream error for non-success responses or transport failures, and
    /// a not-found error when the service reports no matching video.
    async fn fetch_video(&self, video_id: &str) -> Result<VideoResource>;
}

/// `YouTube` Data API v3 client.
pub struct YouTubeDataClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeDataClient {
    /// Create a client from configuration.
    ///
    /// A missing API key is accepted here and reported on first lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &YouTubeApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("Tubeplay/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::network_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.effective_api_key().map(String::from),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl VideoMetadataSource for YouTubeDataClient {
    async fn fetch_video(&self, video_id: &str) -> Result<VideoResource> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::configuration("YouTube API key is not configured"));
        };

        let url = format!("{}/videos", self.base_url);
        debug!("Fetching video details for {} from {}", video_id, url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", video_id),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| Error::network_error(format!("Failed to fetch video details: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Video lookup for {} failed with status {}", video_id, status);
            return Err(ResolveError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
            .into());
        }

        let list: VideoListResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                Error::from(ResolveError::InvalidResponse {
                    video_id: video_id.to_string(),
                    reason: format!("Malformed JSON: {e}"),
                })
            } else {
                Error::network_error(format!("Failed to read video details: {e}"))
            }
        })?;

        list.items
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| {
                ResolveError::NotFound {
                    video_id: video_id.to_string(),
                }
                .into()
            })
    }
}

/// Resolve a link into a draft track.
///
/// Steps, in order: reject an empty URL, extract the identifier, look the
/// video up, then assemble title, channel (as artist), identifier, formatted
/// duration and the best thumbnail.
///
/// # Errors
///
/// - Invalid input when the URL is empty or has no recognizable identifier
/// - Whatever the metadata source reports (configuration, upstream, not found)
/// - Invalid response when title or duration is missing
pub async fn resolve_video_metadata(
    url: &str,
    source: &dyn VideoMetadataSource,
) -> Result<TrackDraft> {
    if url.trim().is_empty() {
        return Err(ResolveError::EmptyUrl.into());
    }

    let video_id = extract_video_id(url).ok_or_else(|| Error::invalid_url(url))?;
    let resource = source.fetch_video(&video_id).await?;
    let draft = draft_from_resource(&video_id, resource)?;

    info!(
        "Resolved {} to '{}' by {} ({})",
        video_id, draft.title, draft.artist, draft.duration
    );
    Ok(draft)
}

fn draft_from_resource(video_id: &str, resource: VideoResource) -> Result<TrackDraft> {
    let invalid = |reason: &str| ResolveError::InvalidResponse {
        video_id: video_id.to_string(),
        reason: reason.to_string(),
    };

    let snippet = resource.snippet.ok_or_else(|| invalid("missing snippet"))?;
    let details = resource
        .content_details
        .ok_or_else(|| invalid("missing contentDetails"))?;
    let title = snippet.title.ok_or_else(|| invalid("missing title"))?;
    let duration = details
        .duration
        .ok_or_else(|| invalid("missing duration"))?;

    let album_cover = snippet.thumbnails.best_url().map_or_else(
        || {
            debug!("No thumbnails for {}, using static cover", video_id);
            youtube_thumbnail_url(video_id)
        },
        String::from,
    );

    Ok(TrackDraft {
        title,
        artist: snippet.channel_title.unwrap_or_default(),
        youtube_id: video_id.to_string(),
        duration: format_duration(&duration),
        album_cover,
    })
}
