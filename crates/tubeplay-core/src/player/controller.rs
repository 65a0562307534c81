//! Playback controller.
//!
//! Owns the [`PlaybackState`] and the widget handle, and reconciles the
//! widget toward the desired state after every command or widget signal.
//!
//! # Reconciliation
//!
//! Nothing is sent to the widget until it is attached and has reported
//! [`WidgetEvent::Ready`]; state changes made before that are simply picked
//! up by the pass that runs on readiness. Once ready, every pass:
//!
//! 1. loads the current track's video if the widget holds a different one,
//! 2. plays or pauses according to the playing flag,
//! 3. pushes the current volume.
//!
//! Widget failures never reach callers. They pause playback and raise a
//! single error notification; the user decides whether to retry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::state::PlaybackState;
use super::widget::{PlayerWidget, WidgetErrorCode, WidgetEvent, WidgetState};
use crate::error::PlaybackError;
use crate::notify::{Notification, Notifier};
use crate::track::Track;

/// Notice shown when a command to the widget fails.
const PLAYBACK_ERROR_NOTICE: &str = "Playback error occurred";

/// Notice shown when the widget reports a load or playback failure.
const LOAD_ERROR_NOTICE: &str = "Failed to load video. Please try again.";

/// User-driven playback commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PlayerCommand {
    /// Replace the current track and start playing.
    SetTrack(Track),
    /// Flip between playing and paused.
    TogglePlay,
    /// Play.
    Play,
    /// Pause.
    Pause,
    /// Set the volume (not clamped).
    SetVolume(i32),
    /// Clear the current track and stop.
    Reset,
}

/// Single-owner playback controller.
pub struct PlaybackController<W: PlayerWidget> {
    state: PlaybackState,
    widget: Option<W>,
    ready: bool,
    loaded_video: Option<String>,
    notifier: Arc<dyn Notifier>,
}

impl<W: PlayerWidget> PlaybackController<W> {
    /// Create a controller with the default state and no widget.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_state(PlaybackState::default(), notifier)
    }

    /// Create a controller starting from a given state.
    pub fn with_state(state: PlaybackState, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state,
            widget: None,
            ready: false,
            loaded_video: None,
            notifier,
        }
    }

    /// Take ownership of a widget handle.
    ///
    /// The widget is not commanded until it reports readiness.
    pub fn attach_widget(&mut self, widget: W) {
        debug!("Widget attached, waiting for readiness");
        self.widget = Some(widget);
        self.ready = false;
        self.loaded_video = None;
    }

    /// Give up the widget handle.
    pub fn detach_widget(&mut self) -> Option<W> {
        self.ready = false;
        self.loaded_video = None;
        self.widget.take()
    }

    /// Current desired state.
    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Whether a widget is attached and ready for commands.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready && self.widget.is_some()
    }

    /// Borrow the widget, if attached.
    #[must_use]
    pub const fn widget(&self) -> Option<&W> {
        self.widget.as_ref()
    }

    /// Replace the current track and start playing.
    pub fn set_track(&mut self, track: Track) {
        info!("Now playing '{}' ({})", track.title, track.youtube_id);
        self.state.set_track(track);
        self.reconcile();
    }

    /// Flip the playing flag.
    pub fn toggle_play(&mut self) {
        self.state.toggle_play();
        debug!("Toggled playback, playing={}", self.state.is_playing);
        self.reconcile();
    }

    /// Set the playing flag.
    pub fn play(&mut self) {
        self.state.play();
        self.reconcile();
    }

    /// Clear the playing flag.
    pub fn pause(&mut self) {
        self.state.pause();
        self.reconcile();
    }

    /// Set the volume; values pass through unclamped.
    pub fn set_volume(&mut self, volume: i32) {
        self.state.set_volume(volume);
        self.reconcile();
    }

    /// Clear the current track and stop.
    pub fn reset(&mut self) {
        info!("Player reset");
        self.state.reset();
        self.loaded_video = None;
        self.reconcile();
    }

    /// Apply a user command.
    pub fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::SetTrack(track) => self.set_track(track),
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::Play => self.play(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::SetVolume(volume) => self.set_volume(volume),
            PlayerCommand::Reset => self.reset(),
        }
    }

    /// Apply a widget signal.
    pub fn handle_widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Ready => {
                if self.widget.is_none() {
                    warn!("Widget reported ready but no widget is attached");
                    return;
                }
                info!("Widget ready");
                self.ready = true;
                self.reconcile();
            }
            WidgetEvent::Error(code) => self.on_widget_error(code),
            WidgetEvent::StateChange(state) => self.on_widget_state(state),
        }
    }

    fn on_widget_state(&mut self, state: WidgetState) {
        match state {
            WidgetState::Ended => {
                debug!("Video ended");
                self.state.pause();
                self.reconcile();
            }
            WidgetState::Cued => {
                // A play issued while cueing can be dropped; assert it again.
                if self.state.is_playing && self.is_ready() {
                    debug!("Video cued, re-issuing play");
                    if let Err(e) = self.with_widget(|w| w.play()) {
                        self.fail(e, PLAYBACK_ERROR_NOTICE);
                    }
                }
            }
            WidgetState::Playing | WidgetState::Paused | WidgetState::Buffering => {
                debug!("Video {}", state);
            }
            WidgetState::Unstarted => {}
        }
    }

    fn on_widget_error(&mut self, code: WidgetErrorCode) {
        warn!("Widget error: {}", code);
        self.fail(PlaybackError::Widget(code.to_string()), LOAD_ERROR_NOTICE);
    }

    /// Push the desired state to the widget; failures pause and notify once.
    fn reconcile(&mut self) {
        if !self.is_ready() {
            debug!("Widget not ready, deferring reconciliation");
            return;
        }
        if let Err(e) = self.try_reconcile() {
            self.fail(e, PLAYBACK_ERROR_NOTICE);
        }
    }

    fn try_reconcile(&mut self) -> Result<(), PlaybackError> {
        let wanted = self.state.current_video_id().map(String::from);
        if let Some(video_id) = wanted
            && self.loaded_video.as_deref() != Some(video_id.as_str())
        {
            self.with_widget(|w| w.load_video(&video_id))?;
            self.loaded_video = Some(video_id);
        }

        let (playing, volume) = (self.state.is_playing, self.state.volume);
        self.with_widget(|w| if playing { w.play() } else { w.pause() })?;
        self.with_widget(|w| w.set_volume(volume))
    }

    fn with_widget(
        &mut self,
        f: impl FnOnce(&mut W) -> Result<(), PlaybackError>,
    ) -> Result<(), PlaybackError> {
        self.widget.as_mut().map_or(Ok(()), f)
    }

    /// Terminal failure for the current track: stop, notify, no retry.
    fn fail(&mut self, error: PlaybackError, notice: &str) {
        warn!("Playback failed: {}", error);
        self.state.pause();
        self.loaded_video = None;
        self.notifier.notify(Notification::error(notice));

        if self.is_ready()
            && let Err(e) = self.with_widget(W::pause)
        {
            debug!("Pause after failure also failed: {}", e);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::{MockNotifier, NotificationLevel};
    use crate::player::widget::MockPlayerWidget;
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn track(id: &str, video: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {id}"),
            artist: "Artist".to_string(),
            youtube_id: video.to_string(),
            duration: "3:00".to_string(),
            album_cover: String::new(),
        }
    }

    fn quiet_notifier() -> Arc<dyn Notifier> {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        Arc::new(notifier)
    }

    fn ready_controller(widget: MockPlayerWidget) -> PlaybackController<MockPlayerWidget> {
        let mut controller = PlaybackController::new(quiet_notifier());
        controller.attach_widget(widget);
        controller.handle_widget_event(WidgetEvent::Ready);
        controller
    }

    #[test]
    fn test_commands_without_widget_only_mutate_state() {
        let mut controller: PlaybackController<MockPlayerWidget> =
            PlaybackController::new(quiet_notifier());

        controller.set_track(track("a", "aaaaaaaaaaa"));
        assert!(controller.state().is_playing);
        controller.toggle_play();
        assert!(!controller.state().is_playing);
        controller.set_volume(20);
        assert_eq!(controller.state().volume, 20);
        controller.reset();
        assert!(controller.state().current_track.is_none());
        assert!(!controller.is_ready());
    }

    #[test]
    fn test_attached_but_not_ready_issues_nothing() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().never();
        widget.expect_play().never();
        widget.expect_pause().never();
        widget.expect_set_volume().never();

        let mut controller = PlaybackController::new(quiet_notifier());
        controller.attach_widget(widget);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.set_volume(10);
        controller.handle_widget_event(WidgetEvent::StateChange(WidgetState::Cued));
        assert!(!controller.is_ready());
    }

    #[test]
    fn test_ready_reconciles_in_order() {
        let mut seq = Sequence::new();
        let mut widget = MockPlayerWidget::new();
        widget
            .expect_pause()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        widget
            .expect_set_volume()
            .with(eq(70))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let controller = ready_controller(widget);
        assert!(controller.is_ready());
        assert!(controller.state().current_track.is_none());
    }

    #[test]
    fn test_only_latest_track_loaded_on_ready() {
        let mut widget = MockPlayerWidget::new();
        widget
            .expect_load_video()
            .withf(|id| id == "bbbbbbbbbbb")
            .times(1)
            .returning(|_| Ok(()));
        widget
            .expect_load_video()
            .withf(|id| id == "aaaaaaaaaaa")
            .never();
        widget.expect_play().times(1).returning(|| Ok(()));
        widget.expect_pause().never();
        widget.expect_set_volume().times(1).returning(|_| Ok(()));

        let mut controller = PlaybackController::new(quiet_notifier());
        controller.attach_widget(widget);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.set_track(track("b", "bbbbbbbbbbb"));
        controller.handle_widget_event(WidgetEvent::Ready);

        assert_eq!(controller.state().current_video_id(), Some("bbbbbbbbbbb"));
    }

    #[test]
    fn test_same_video_is_not_reloaded() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().times(1).returning(|_| Ok(()));
        widget.expect_play().returning(|| Ok(()));
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));

        let mut controller = ready_controller(widget);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.pause();
        controller.set_track(track("a2", "aaaaaaaaaaa"));
        assert!(controller.state().is_playing);
    }

    #[test]
    fn test_set_volume_twice_pushes_once_per_pass() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_pause().times(3).returning(|| Ok(()));
        // One push on readiness, one per set_volume call.
        widget
            .expect_set_volume()
            .with(eq(70))
            .times(3)
            .returning(|_| Ok(()));

        let mut controller = ready_controller(widget);
        controller.set_volume(70);
        controller.set_volume(70);
        assert_eq!(controller.state().volume, 70);
    }

    #[test]
    fn test_out_of_range_volume_passes_through() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().with(eq(70)).returning(|_| Ok(()));
        widget
            .expect_set_volume()
            .with(eq(150))
            .times(1)
            .returning(|_| Ok(()));

        let mut controller = ready_controller(widget);
        controller.set_volume(150);
        assert_eq!(controller.state().volume, 150);
    }

    #[test]
    fn test_ended_pauses_without_track_change() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().returning(|_| Ok(()));
        widget.expect_play().returning(|| Ok(()));
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));

        let mut controller = ready_controller(widget);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.handle_widget_event(WidgetEvent::StateChange(WidgetState::Ended));

        assert!(!controller.state().is_playing);
        assert_eq!(controller.state().current_video_id(), Some("aaaaaaaaaaa"));
    }

    #[test]
    fn test_cued_while_playing_issues_single_play() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().returning(|_| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));
        widget.expect_pause().returning(|| Ok(()));
        // One from set_track's pass, one for the cue.
        widget.expect_play().times(2).returning(|| Ok(()));

        let mut controller = ready_controller(widget);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.handle_widget_event(WidgetEvent::StateChange(WidgetState::Cued));
        assert!(controller.state().is_playing);
    }

    #[test]
    fn test_cued_while_paused_issues_nothing() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));
        widget.expect_play().never();

        let mut controller = ready_controller(widget);
        controller.handle_widget_event(WidgetEvent::StateChange(WidgetState::Cued));
    }

    #[test]
    fn test_observability_states_do_not_mutate() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().returning(|_| Ok(()));
        widget.expect_play().times(1).returning(|| Ok(()));
        widget.expect_pause().times(1).returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));

        let mut controller = ready_controller(widget);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        let before = controller.state().clone();

        for state in [WidgetState::Buffering, WidgetState::Paused, WidgetState::Playing] {
            controller.handle_widget_event(WidgetEvent::StateChange(state));
        }
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_widget_error_pauses_and_notifies_once() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Error)
            .times(1)
            .return_const(());

        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().returning(|_| Ok(()));
        widget.expect_play().returning(|| Ok(()));
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));

        let mut controller = PlaybackController::new(Arc::new(notifier));
        controller.attach_widget(widget);
        controller.handle_widget_event(WidgetEvent::Ready);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.handle_widget_event(WidgetEvent::Error(WidgetErrorCode::NotFound));

        assert!(!controller.state().is_playing);
        assert!(controller.state().current_track.is_some());
    }

    #[test]
    fn test_failed_command_pauses_and_notifies_once() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).return_const(());

        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().returning(|_| Ok(()));
        widget.expect_play().times(1).returning(|| {
            Err(PlaybackError::CommandFailed {
                command: "play",
                reason: "player destroyed".to_string(),
            })
        });
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));

        let mut controller = PlaybackController::new(Arc::new(notifier));
        controller.attach_widget(widget);
        controller.handle_widget_event(WidgetEvent::Ready);
        controller.set_track(track("a", "aaaaaaaaaaa"));

        assert!(!controller.state().is_playing);
    }

    #[test]
    fn test_retry_after_error_reloads_video() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).return_const(());

        let mut widget = MockPlayerWidget::new();
        widget.expect_load_video().times(2).returning(|_| Ok(()));
        widget.expect_play().returning(|| Ok(()));
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));

        let mut controller = PlaybackController::new(Arc::new(notifier));
        controller.attach_widget(widget);
        controller.handle_widget_event(WidgetEvent::Ready);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.handle_widget_event(WidgetEvent::Error(WidgetErrorCode::Html5));
        controller.set_track(track("a", "aaaaaaaaaaa"));

        assert!(controller.state().is_playing);
    }

    #[test]
    fn test_reset_then_same_track_reloads_video() {
        let mut widget = MockPlayerWidget::new();
        widget
            .expect_load_video()
            .with(eq("aaaaaaaaaaa"))
            .times(2)
            .returning(|_| Ok(()));
        widget.expect_play().returning(|| Ok(()));
        widget.expect_pause().returning(|| Ok(()));
        widget.expect_set_volume().returning(|_| Ok(()));

        let mut controller = ready_controller(widget);
        controller.set_track(track("a", "aaaaaaaaaaa"));
        controller.reset();
        assert!(controller.state().current_track.is_none());

        controller.set_track(track("a", "aaaaaaaaaaa"));
        assert!(controller.state().is_playing);
    }

    #[test]
    fn test_ready_without_widget_is_ignored() {
        let mut controller: PlaybackController<MockPlayerWidget> =
            PlaybackController::new(quiet_notifier());
        controller.handle_widget_event(WidgetEvent::Ready);
        assert!(!controller.is_ready());
    }

    #[test]
    fn test_detach_widget_stops_commands() {
        let mut widget = MockPlayerWidget::new();
        widget.expect_pause().times(1).returning(|| Ok(()));
        widget.expect_set_volume().times(1).returning(|_| Ok(()));

        let mut controller = ready_controller(widget);
        assert!(controller.detach_widget().is_some());
        controller.set_track(track("a", "aaaaaaaaaaa"));
        assert!(!controller.is_ready());
    }

    #[test]
    fn test_handle_command_dispatch() {
        let mut controller: PlaybackController<MockPlayerWidget> =
            PlaybackController::new(quiet_notifier());
        controller.handle_command(PlayerCommand::SetTrack(track("a", "aaaaaaaaaaa")));
        controller.handle_command(PlayerCommand::Pause);
        assert!(!controller.state().is_playing);
        controller.handle_command(PlayerCommand::Play);
        assert!(controller.state().is_playing);
        controller.handle_command(PlayerCommand::SetVolume(5));
        assert_eq!(controller.state().volume, 5);
        controller.handle_command(PlayerCommand::Reset);
        assert_eq!(controller.state(), &PlaybackState::with_volume(5));
    }
}
