//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::error::PlaybackError;

use super::playback::{PlayerState, PlaybackSnapshot, StateChange};
use super::track::Track;
use super::types::{ActiveSection, UiState};

/// Main application model containing all state.
///
/// The player state is the single source of truth for everything the UI
/// surfaces render; views only ever see cloned snapshots of it.
pub struct AppModel {
    player: Arc<Mutex<PlayerState>>,
    library: Arc<Mutex<Vec<Track>>>,
    ui_state: Arc<Mutex<UiState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            player: Arc::new(Mutex::new(PlayerState::new())),
            library: Arc::new(Mutex::new(Vec::new())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Playback state
    // ========================================================================

    pub async fn playback_snapshot(&self) -> PlaybackSnapshot {
        self.player.lock().await.snapshot()
    }

    pub async fn begin(
        &self,
        track: Track,
        context: Vec<Track>,
    ) -> Result<StateChange, PlaybackError> {
        self.player.lock().await.begin(track, context)
    }

    pub async fn play_from_queue(&self, index: usize) -> Result<StateChange, PlaybackError> {
        self.player.lock().await.play_from_queue(index)
    }

    pub async fn toggle_play(&self) -> StateChange {
        self.player.lock().await.toggle()
    }

    pub async fn stop_playback(&self) -> StateChange {
        self.player.lock().await.stop()
    }

    /// Seek relative to the current position (arrow-key scrubbing).
    pub async fn seek_relative(&self, delta: f64) -> StateChange {
        let mut player = self.player.lock().await;
        let target = (player.snapshot().elapsed + delta).max(0.0);
        player.seek(target)
    }

    /// Returns the new effective output volume.
    pub async fn adjust_volume(&self, delta: f32) -> f32 {
        let mut player = self.player.lock().await;
        let target = player.volume() + delta;
        player.set_volume(target);
        player.effective_volume()
    }

    pub async fn toggle_mute(&self) -> f32 {
        let mut player = self.player.lock().await;
        player.toggle_mute();
        player.effective_volume()
    }

    pub async fn cycle_repeat(&self) {
        self.player.lock().await.cycle_repeat();
    }

    pub async fn toggle_shuffle(&self) {
        self.player.lock().await.toggle_shuffle();
    }

    pub async fn next_track(&self) -> Result<StateChange, PlaybackError> {
        let mut player = self.player.lock().await;
        let mut rng = rand::thread_rng();
        player.next(&mut rng)
    }

    pub async fn previous_track(&self) -> Result<StateChange, PlaybackError> {
        let mut player = self.player.lock().await;
        let mut rng = rand::thread_rng();
        player.previous(&mut rng)
    }

    // Output callbacks, tagged with the generation they belong to

    pub async fn apply_duration(&self, generation: u64, seconds: f64) {
        self.player.lock().await.apply_duration(generation, seconds);
    }

    pub async fn apply_position(&self, generation: u64, seconds: f64) {
        self.player.lock().await.apply_position(generation, seconds);
    }

    pub async fn apply_ended(&self, generation: u64) -> Result<StateChange, PlaybackError> {
        let mut player = self.player.lock().await;
        let mut rng = rand::thread_rng();
        player.apply_ended(generation, &mut rng)
    }

    pub async fn apply_failed(&self, generation: u64) -> bool {
        self.player.lock().await.apply_failed(generation)
    }

    // ========================================================================
    // Library
    // ========================================================================

    pub async fn set_library(&self, tracks: Vec<Track>) {
        let mut state = self.ui_state.lock().await;
        state.library_selected = 0;
        drop(state);
        *self.library.lock().await = tracks;
    }

    pub async fn library_tracks(&self) -> Vec<Track> {
        self.library.lock().await.clone()
    }

    pub async fn selected_library_track(&self) -> Option<(Track, Vec<Track>)> {
        let library = self.library.lock().await;
        let state = self.ui_state.lock().await;
        library
            .get(state.library_selected)
            .cloned()
            .map(|track| (track, library.clone()))
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                if state.library_selected > 0 {
                    state.library_selected -= 1;
                }
            }
            ActiveSection::Queue => {
                if state.queue_selected > 0 {
                    state.queue_selected -= 1;
                }
            }
        }
    }

    pub async fn move_selection_down(&self) {
        let library_len = self.library.lock().await.len();
        let queue_len = self.player.lock().await.snapshot().queue.len();
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                if state.library_selected < library_len.saturating_sub(1) {
                    state.library_selected += 1;
                }
            }
            ActiveSection::Queue => {
                if state.queue_selected < queue_len.saturating_sub(1) {
                    state.queue_selected += 1;
                }
            }
        }
    }

    pub async fn selected_queue_index(&self) -> Option<usize> {
        let state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Queue => Some(state.queue_selected),
            ActiveSection::Library => None,
        }
    }

    pub async fn set_signed_in(&self, name: Option<String>) {
        let mut state = self.ui_state.lock().await;
        state.signed_in_as = name;
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
