//! Subcommand implementations.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use tubeplay_core::{
    AppConfig, Error, PlaybackController, PlaybackService, PlaybackState, PlayerOptions,
    TracingNotifier, Track, WidgetEvent, WidgetState, YouTubeDataClient, extract_video_id,
    format_duration, resolve_video_metadata, youtube_thumbnail_url, youtube_watch_url,
};

use crate::error::CliError;
use crate::widget::HeadlessWidget;

/// Print the video identifier embedded in a link.
///
/// # Errors
///
/// Returns an invalid-input error when no identifier can be found.
pub fn video_id(out: &mut impl Write, url: &str) -> Result<(), CliError> {
    let id = extract_video_id(url).ok_or_else(|| Error::invalid_url(url))?;
    writeln!(out, "{id}").map_err(Error::from)?;
    Ok(())
}

/// Print an ISO-8601 duration as `M:SS` or `H:MM:SS`.
///
/// # Errors
///
/// Returns an error only if stdout cannot be written.
pub fn duration(out: &mut impl Write, iso: &str) -> Result<(), CliError> {
    writeln!(out, "{}", format_duration(iso)).map_err(Error::from)?;
    Ok(())
}

/// Look a link up and print the draft track as JSON.
///
/// # Errors
///
/// Returns whatever the lookup reports: invalid input, configuration,
/// upstream, not found, or invalid response.
pub async fn resolve(out: &mut impl Write, config: &AppConfig, url: &str) -> Result<(), CliError> {
    let client = YouTubeDataClient::new(&config.youtube)?;
    let draft = resolve_video_metadata(url, &client).await?;
    serde_json::to_writer_pretty(&mut *out, &draft)?;
    writeln!(out).map_err(Error::from)?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedInfo {
    embed_url: String,
    player_vars: serde_json::Value,
}

/// Print the embed URL and player variables for a video.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn embed(out: &mut impl Write, options: &PlayerOptions, video_id: &str) -> Result<(), CliError> {
    let info = EmbedInfo {
        embed_url: options.embed_url(video_id),
        player_vars: options.player_vars(),
    };
    serde_json::to_writer_pretty(&mut *out, &info)?;
    writeln!(out).map_err(Error::from)?;
    Ok(())
}

/// Build a placeholder track for a link without looking it up.
fn offline_track(index: usize, url: &str) -> Result<Track, Error> {
    let video_id = extract_video_id(url).ok_or_else(|| Error::invalid_url(url))?;
    Ok(Track {
        id: (index + 1).to_string(),
        title: youtube_watch_url(&video_id),
        artist: String::new(),
        duration: format_duration(""),
        album_cover: youtube_thumbnail_url(&video_id),
        youtube_id: video_id,
    })
}

fn describe(state: &PlaybackState) -> String {
    let track = state
        .current_track
        .as_ref()
        .map_or("-", |t| t.youtube_id.as_str());
    let status = if state.is_playing { "playing" } else { "paused" };
    format!("{status} {track} (volume {})", state.volume)
}

/// Play links one after another against a headless widget.
///
/// Every link is validated before playback starts. Each track is cued,
/// played, and ended in turn; state transitions are printed as they are
/// published.
///
/// # Errors
///
/// Returns an invalid-input error for an unrecognized link, or an error if
/// the playback task fails.
pub async fn play(
    out: &mut impl Write,
    config: &AppConfig,
    urls: &[String],
) -> Result<Vec<String>, CliError> {
    let tracks = urls
        .iter()
        .enumerate()
        .map(|(i, url)| offline_track(i, url))
        .collect::<Result<Vec<_>, _>>()?;

    let mut controller = PlaybackController::with_state(
        PlaybackState::with_volume(config.player.initial_volume),
        Arc::new(TracingNotifier),
    );
    controller.attach_widget(HeadlessWidget::new(config.player.options.clone()));

    let (handle, task) = PlaybackService::spawn(controller);
    let mut states = handle.state();

    let mut transitions = Vec::new();
    let mut record = |state: &PlaybackState| -> Result<(), CliError> {
        let line = describe(state);
        writeln!(out, "{line}").map_err(Error::from)?;
        transitions.push(line);
        Ok(())
    };

    handle.widget_event(WidgetEvent::Ready)?;
    for track in tracks {
        info!("Queueing {}", track.youtube_id);
        handle.set_track(track)?;
        handle.widget_event(WidgetEvent::StateChange(WidgetState::Cued))?;
        handle.widget_event(WidgetEvent::StateChange(WidgetState::Playing))?;
        handle.widget_event(WidgetEvent::StateChange(WidgetState::Ended))?;

        // Wait for this track's end before queueing the next one.
        loop {
            if states.changed().await.is_err() {
                break;
            }
            let state = states.borrow_and_update().clone();
            record(&state)?;
            if !state.is_playing {
                break;
            }
        }
    }

    handle.shutdown()?;
    let controller = task.await?;
    if let Some(widget) = controller.widget() {
        debug!("Widget received {} command(s)", widget.history().len());
    }
    Ok(transitions)
}
