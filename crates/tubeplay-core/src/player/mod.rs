//! Playback control.
//!
//! [`PlaybackState`] holds what the user wants, [`PlaybackController`]
//! drives a [`PlayerWidget`] toward it, and [`PlaybackService`] runs the
//! controller on its own task.

mod controller;
mod service;
mod state;
mod widget;

pub use controller::{PlaybackController, PlayerCommand};
pub use service::{PlaybackService, PlayerHandle, PlayerMessage};
pub use state::{DEFAULT_VOLUME, PlaybackState};
pub use widget::{PlayerOptions, PlayerWidget, WidgetErrorCode, WidgetEvent, WidgetState};
