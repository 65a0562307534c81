//! A widget with no video surface.
//!
//! Accepts every command, records it, and logs it. Used to drive the
//! playback service from the terminal where no embedded player exists.

use std::fmt;

use tracing::info;
use tubeplay_core::{PlaybackError, PlayerOptions, PlayerWidget};

/// A command received by the headless widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCommand {
    /// `load_video`.
    Load(String),
    /// `play`.
    Play,
    /// `pause`.
    Pause,
    /// `set_volume`.
    Volume(i32),
}

impl fmt::Display for WidgetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(id) => write!(f, "load {id}"),
            Self::Play => write!(f, "play"),
            Self::Pause => write!(f, "pause"),
            Self::Volume(v) => write!(f, "volume {v}"),
        }
    }
}

/// Log-only widget.
#[derive(Debug, Default)]
pub struct HeadlessWidget {
    options: PlayerOptions,
    history: Vec<WidgetCommand>,
}

impl HeadlessWidget {
    /// Create a widget configured with the given options.
    #[must_use]
    pub const fn new(options: PlayerOptions) -> Self {
        Self {
            options,
            history: Vec::new(),
        }
    }

    /// Commands received so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[WidgetCommand] {
        &self.history
    }

    fn record(&mut self, command: WidgetCommand) {
        info!(target: "tubeplay::widget", "{}", command);
        self.history.push(command);
    }
}

impl PlayerWidget for HeadlessWidget {
    fn load_video(&mut self, video_id: &str) -> Result<(), PlaybackError> {
        info!(
            target: "tubeplay::widget",
            "embed {}",
            self.options.embed_url(video_id)
        );
        self.record(WidgetCommand::Load(video_id.to_string()));
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.record(WidgetCommand::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.record(WidgetCommand::Pause);
        Ok(())
    }

    fn set_volume(&mut self, volume: i32) -> Result<(), PlaybackError> {
        self.record(WidgetCommand::Volume(volume));
        Ok(())
    }
}
