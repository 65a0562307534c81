//! `YouTube` URL and duration helpers.
//!
//! Turns user-supplied links into canonical video identifiers and converts
//! the ISO-8601 durations reported by the Data API into display strings.
//!
//! # Supported URL Formats
//!
//! - `https://youtu.be/VIDEO_ID` - Short link, identifier is the first path segment
//! - `https://www.youtube.com/watch?v=VIDEO_ID` - Watch link, any parameter order
//! - Anything the structured parser rejects (such as a missing scheme) or
//!   whose host is not a `YouTube` domain goes through a permissive pattern
//!   fallback covering embed, `/v/`, short, and watch shapes

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

/// Length of a `YouTube` video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Short-link host.
const SHORT_HOST: &str = "youtu.be";

/// Canonical host fragment.
const CANONICAL_HOST: &str = "youtube.com";

/// Fallback for embed, `/v/`, short, and watch links that do not parse as URLs.
#[allow(clippy::expect_used)]
static FALLBACK_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .expect("fallback video id pattern is valid")
});

/// `PT[nH][nM][nS]`, every component optional.
#[allow(clippy::expect_used)]
static ISO_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid")
});

/// Extract the video identifier from a `YouTube` link.
///
/// Structured parsing is attempted first. A short link yields its first path
/// segment and a canonical link yields its `v` query parameter; either is
/// accepted only when exactly [`VIDEO_ID_LEN`] characters long. When the input
/// is not a parseable URL, or its host is neither `YouTube` domain, a pattern
/// match over known link shapes is used instead.
///
/// Malformed input yields `None`, never a panic.
///
/// # Examples
///
/// ```rust
/// use tubeplay_core::youtube::extract_video_id;
///
/// assert_eq!(
///     extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
///     Some("dQw4w9WgXcQ")
/// );
/// assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
/// ```
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(SHORT_HOST) => {
                let id = parsed.path_segments()?.next()?;
                has_id_length(id).then(|| id.to_string())
            }
            Some(host) if host.contains(CANONICAL_HOST) => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .filter(|id| has_id_length(id)),
            _ => {
                debug!("Host not recognized, trying pattern fallback: {}", url);
                extract_video_id_fallback(url)
            }
        },
        Err(e) => {
            debug!("URL parse failed ({}), trying pattern fallback: {}", e, url);
            extract_video_id_fallback(url)
        }
    }
}

fn extract_video_id_fallback(url: &str) -> Option<String> {
    FALLBACK_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn has_id_length(id: &str) -> bool {
    id.chars().count() == VIDEO_ID_LEN
}

/// Format an ISO-8601 duration (`PT1H2M3S`) for display.
///
/// Produces `H:MM:SS` when there is at least one hour, otherwise `M:SS`.
/// Missing components count as zero; input without a `PT` duration gives
/// `"0:00"`.
///
/// # Examples
///
/// ```rust
/// use tubeplay_core::youtube::format_duration;
///
/// assert_eq!(format_duration("PT3M45S"), "3:45");
/// assert_eq!(format_duration("PT1H2M3S"), "1:02:03");
/// assert_eq!(format_duration("garbage"), "0:00");
/// ```
#[must_use]
pub fn format_duration(iso_duration: &str) -> String {
    let Some(caps) = ISO_DURATION_RE.captures(iso_duration) else {
        return "0:00".to_string();
    };

    let component = |index: usize| -> u64 {
        caps.get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (component(1), component(2), component(3));

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Static high-quality thumbnail URL for a video.
///
/// Always available, unlike `maxresdefault`.
#[must_use]
pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")
}

/// Canonical watch URL for a video.
#[must_use]
pub fn youtube_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_short_link() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some(ID));
    }

    #[test]
    fn test_short_link_with_timestamp() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_short_link_wrong_length() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXc"), None);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQQ"), None);
        assert_eq!(extract_video_id("https://youtu.be/"), None);
    }

    #[test]
    fn test_short_link_uses_first_segment() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ/extra").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_watch_link() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_watch_link_parameter_order() {
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?feature=share&list=PL123&v=dQw4w9WgXcQ")
                .as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_watch_link_wrong_length() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=abc"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?list=PL123"), None);
    }

    #[test]
    fn test_fallback_without_scheme() {
        assert_eq!(
            extract_video_id("youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(extract_video_id("youtu.be/dQw4w9WgXcQ").as_deref(), Some(ID));
    }

    #[test]
    fn test_fallback_embed_link() {
        assert_eq!(
            extract_video_id("www.youtube.com/embed/dQw4w9WgXcQ?rel=0").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extract_video_id("www.youtube.com/v/dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_unrelated_host() {
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("   "), None);
        assert_eq!(extract_video_id("not a url at all"), None);
        assert_eq!(extract_video_id("http://"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("PT3M45S"), "3:45");
        assert_eq!(format_duration("PT1H2M3S"), "1:02:03");
        assert_eq!(format_duration("PT45S"), "0:45");
        assert_eq!(format_duration("garbage"), "0:00");
    }

    #[test]
    fn test_format_duration_partial_components() {
        assert_eq!(format_duration("PT2H"), "2:00:00");
        assert_eq!(format_duration("PT10M"), "10:00");
        assert_eq!(format_duration("PT1H5S"), "1:00:05");
        assert_eq!(format_duration("PT"), "0:00");
        assert_eq!(format_duration(""), "0:00");
    }

    #[test]
    fn test_format_duration_no_minute_rollover() {
        assert_eq!(format_duration("PT75M"), "75:00");
    }

    #[test]
    fn test_thumbnail_url() {
        assert_eq!(
            youtube_thumbnail_url(ID),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );
    }

    #[test]
    fn test_watch_url_roundtrips_through_extract() {
        assert_eq!(extract_video_id(&youtube_watch_url(ID)).as_deref(), Some(ID));
    }
}
