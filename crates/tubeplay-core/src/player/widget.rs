//! Seam to the embedded playback widget.
//!
//! The widget is a black box with its own buffering and network logic. It
//! takes commands through [`PlayerWidget`] and reports back through
//! [`WidgetEvent`]s, which arrive asynchronously and out of band.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::PlaybackError;

/// Playback engine commands.
///
/// Implementations must tolerate redundant commands: playing an already
/// playing video or pushing the same volume twice is a no-op.
#[cfg_attr(test, mockall::automock)]
pub trait PlayerWidget: Send {
    /// Load (cue) a video by identifier.
    fn load_video(&mut self, video_id: &str) -> Result<(), PlaybackError>;

    /// Start or resume playback.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback.
    fn pause(&mut self) -> Result<(), PlaybackError>;

    /// Set the output volume.
    fn set_volume(&mut self, volume: i32) -> Result<(), PlaybackError>;
}

/// Player states reported by the widget, with the provider's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetState {
    /// No video started yet (-1).
    Unstarted,
    /// Playback reached the end (0).
    Ended,
    /// Playing (1).
    Playing,
    /// Paused (2).
    Paused,
    /// Buffering (3).
    Buffering,
    /// A video was cued and is ready to start (5).
    Cued,
}

impl WidgetState {
    /// Map a provider state code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    /// Provider state code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstarted => write!(f, "unstarted"),
            Self::Ended => write!(f, "ended"),
            Self::Playing => write!(f, "playing"),
            Self::Paused => write!(f, "paused"),
            Self::Buffering => write!(f, "buffering"),
            Self::Cued => write!(f, "cued"),
        }
    }
}

/// Error codes reported by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetErrorCode {
    /// The request contained an invalid parameter value (2).
    InvalidParameter,
    /// The content cannot be played in an HTML5 player (5).
    Html5,
    /// The video was removed or marked private (100).
    NotFound,
    /// The owner does not allow embedded playback (101, 150).
    EmbedNotAllowed,
    /// Any other code.
    Other(i32),
}

impl WidgetErrorCode {
    /// Map a provider error code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            2 => Self::InvalidParameter,
            5 => Self::Html5,
            100 => Self::NotFound,
            101 | 150 => Self::EmbedNotAllowed,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for WidgetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid player parameter"),
            Self::Html5 => write!(f, "video cannot be played in this player"),
            Self::NotFound => write!(f, "video not found or private"),
            Self::EmbedNotAllowed => write!(f, "embedded playback not allowed"),
            Self::Other(code) => write!(f, "player error {code}"),
        }
    }
}

/// Signals emitted by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WidgetEvent {
    /// The widget finished initializing and accepts commands.
    Ready,
    /// The player state changed.
    StateChange(WidgetState),
    /// Loading or playback failed.
    Error(WidgetErrorCode),
}

/// Presentation options for the embedded widget.
///
/// Defaults: autoplay on, no native controls, no keyboard capture, no
/// fullscreen button, related videos suppressed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerOptions {
    /// Start playing as soon as a video loads.
    pub autoplay: bool,
    /// Show the provider's controls.
    pub controls: bool,
    /// Let the widget capture keyboard shortcuts.
    pub keyboard: bool,
    /// Show the fullscreen button.
    pub fullscreen_button: bool,
    /// Suggest related videos from other channels.
    pub related_videos: bool,
    /// Show video annotations.
    pub annotations: bool,
    /// Reduce provider branding.
    pub modest_branding: bool,
    /// Enable the scripting API (required for commands).
    pub enable_js_api: bool,
    /// Embedding page origin, if known.
    pub origin: Option<String>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            controls: false,
            keyboard: false,
            fullscreen_button: false,
            related_videos: false,
            annotations: false,
            modest_branding: true,
            enable_js_api: true,
            origin: None,
        }
    }
}

impl PlayerOptions {
    /// Options as provider player parameters (`autoplay=1`, `controls=0`, ...).
    #[must_use]
    pub fn player_params(&self) -> Vec<(&'static str, String)> {
        let flag = |on: bool| if on { "1" } else { "0" }.to_string();

        let mut params = vec![
            ("autoplay", flag(self.autoplay)),
            ("controls", flag(self.controls)),
            ("disablekb", flag(!self.keyboard)),
            ("fs", flag(self.fullscreen_button)),
            (
                "iv_load_policy",
                if self.annotations { "1" } else { "3" }.to_string(),
            ),
            ("modestbranding", flag(self.modest_branding)),
            ("enablejsapi", flag(self.enable_js_api)),
            ("rel", flag(self.related_videos)),
            ("showinfo", "0".to_string()),
        ];
        if let Some(origin) = &self.origin {
            params.push(("origin", origin.clone()));
        }
        params
    }

    /// Options as a `playerVars` JSON object.
    #[must_use]
    pub fn player_vars(&self) -> serde_json::Value {
        let vars = self
            .player_params()
            .into_iter()
            .map(|(key, value)| {
                let value = value
                    .parse::<i64>()
                    .map_or_else(|_| serde_json::Value::String(value), Into::into);
                (key.to_string(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(vars)
    }

    /// Embed URL for a video with these options applied.
    #[must_use]
    pub fn embed_url(&self, video_id: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.player_params())
            .finish();
        format!("https://www.youtube.com/embed/{video_id}?{query}")
    }
}
