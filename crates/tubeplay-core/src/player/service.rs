//! Single-task playback service.
//!
//! Runs a [`PlaybackController`] on its own task and feeds it user commands
//! and widget signals through one channel, so both are applied strictly in
//! arrival order. The latest state is published on a `watch` channel.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::controller::{PlaybackController, PlayerCommand};
use super::state::PlaybackState;
use super::widget::{PlayerWidget, WidgetEvent};
use crate::error::{PlaybackError, Result};
use crate::track::Track;

/// Messages processed by the playback task.
#[derive(Debug, Clone)]
pub enum PlayerMessage {
    /// A user command.
    Command(PlayerCommand),
    /// A signal from the widget.
    Widget(WidgetEvent),
    /// Stop the task and hand back the controller.
    Shutdown,
}

/// Cloneable handle to a running playback service.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<PlayerMessage>,
    state_rx: watch::Receiver<PlaybackState>,
}

impl PlayerHandle {
    fn send(&self, message: PlayerMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| PlaybackError::ServiceStopped.into())
    }

    /// Replace the current track and start playing.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn set_track(&self, track: Track) -> Result<()> {
        self.send(PlayerMessage::Command(PlayerCommand::SetTrack(track)))
    }

    /// Flip between playing and paused.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn toggle_play(&self) -> Result<()> {
        self.send(PlayerMessage::Command(PlayerCommand::TogglePlay))
    }

    /// Play.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn play(&self) -> Result<()> {
        self.send(PlayerMessage::Command(PlayerCommand::Play))
    }

    /// Pause.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn pause(&self) -> Result<()> {
        self.send(PlayerMessage::Command(PlayerCommand::Pause))
    }

    /// Set the volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn set_volume(&self, volume: i32) -> Result<()> {
        self.send(PlayerMessage::Command(PlayerCommand::SetVolume(volume)))
    }

    /// Clear the current track and stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn reset(&self) -> Result<()> {
        self.send(PlayerMessage::Command(PlayerCommand::Reset))
    }

    /// Forward a widget signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has stopped.
    pub fn widget_event(&self, event: WidgetEvent) -> Result<()> {
        self.send(PlayerMessage::Widget(event))
    }

    /// Subscribe to state updates.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<PlaybackState> {
        self.state_rx.clone()
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackState {
        self.state_rx.borrow().clone()
    }

    /// Ask the service to stop after the messages already queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has already stopped.
    pub fn shutdown(&self) -> Result<()> {
        self.send(PlayerMessage::Shutdown)
    }
}

/// Spawns playback controllers onto the runtime.
pub struct PlaybackService;

impl PlaybackService {
    /// Start the controller on its own task.
    ///
    /// The task ends on [`PlayerHandle::shutdown`] or when every handle has
    /// been dropped, and returns the controller.
    pub fn spawn<W>(
        mut controller: PlaybackController<W>,
    ) -> (PlayerHandle, JoinHandle<PlaybackController<W>>)
    where
        W: PlayerWidget + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<PlayerMessage>();
        let (state_tx, state_rx) = watch::channel(controller.state().clone());

        let task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    PlayerMessage::Command(command) => controller.handle_command(command),
                    PlayerMessage::Widget(event) => controller.handle_widget_event(event),
                    PlayerMessage::Shutdown => {
                        debug!("Playback service shutting down");
                        break;
                    }
                }

                state_tx.send_if_modified(|published| {
                    if published == controller.state() {
                        false
                    } else {
                        published.clone_from(controller.state());
                        true
                    }
                });
            }
            controller
        });

        (PlayerHandle { tx, state_rx }, task)
    }
}
