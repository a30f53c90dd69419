//! Transport operations
//!
//! Each operation mutates the player state synchronously and then hands
//! the resulting instruction to the audio output. Failures surface as a
//! dismissible error message; nothing here retries on its own.

use crate::model::Track;

use super::AppController;

const SEEK_STEP_SECS: f64 = 5.0;
const VOLUME_STEP: f32 = 0.05;

impl AppController {
    /// Play the library selection with the whole visible list as context.
    pub async fn play_selected(&self) {
        let Some((track, context)) = self.model.selected_library_track().await else {
            return;
        };
        self.play_track(track, context).await;
    }

    pub async fn play_track(&self, track: Track, context: Vec<Track>) {
        tracing::debug!(track_id = %track.id, context_len = context.len(), "Play requested");
        match self.model.begin(track, context).await {
            Ok(change) => self.apply_change(change),
            Err(e) => {
                tracing::warn!(error = %e, "Play rejected");
                self.model.set_error(e.to_string()).await;
            }
        }
    }

    /// Jump to a specific entry of the queue panel.
    pub async fn play_queue_entry(&self, index: usize) {
        match self.model.play_from_queue(index).await {
            Ok(change) => self.apply_change(change),
            Err(e) => self.halt_with_error(e).await,
        }
    }

    pub async fn toggle_playback(&self) {
        let change = self.model.toggle_play().await;
        tracing::debug!(?change, "Toggling playback");
        self.apply_change(change);
    }

    pub async fn stop_playback(&self) {
        let change = self.model.stop_playback().await;
        self.apply_change(change);
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        match self.model.next_track().await {
            Ok(change) => self.apply_change(change),
            Err(e) => self.halt_with_error(e).await,
        }
    }

    pub async fn previous_track(&self) {
        tracing::debug!("Skipping backwards");
        match self.model.previous_track().await {
            Ok(change) => self.apply_change(change),
            Err(e) => self.halt_with_error(e).await,
        }
    }

    pub async fn seek_forward(&self) {
        let change = self.model.seek_relative(SEEK_STEP_SECS).await;
        self.apply_change(change);
    }

    pub async fn seek_backward(&self) {
        let change = self.model.seek_relative(-SEEK_STEP_SECS).await;
        self.apply_change(change);
    }

    pub async fn volume_up(&self) {
        let effective = self.model.adjust_volume(VOLUME_STEP).await;
        self.output.set_volume(effective);
    }

    pub async fn volume_down(&self) {
        let effective = self.model.adjust_volume(-VOLUME_STEP).await;
        self.output.set_volume(effective);
    }

    pub async fn toggle_mute(&self) {
        let effective = self.model.toggle_mute().await;
        self.output.set_volume(effective);
    }

    pub async fn cycle_repeat(&self) {
        self.model.cycle_repeat().await;
    }

    pub async fn toggle_shuffle(&self) {
        self.model.toggle_shuffle().await;
    }
}
