//! View module - UI rendering
//!
//! All UI surfaces are reactive projections of cloned state snapshots and
//! never mutate state. Organized into submodules by component:
//!
//! - `utils`: Shared formatting helpers
//! - `layout`: Top bar and library sidebar
//! - `content`: Now-playing detail and queue panel
//! - `player_bar`: Compact transport/progress bar
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod player_bar;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlaybackSnapshot, Track, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackSnapshot,
        ui_state: &UiState,
        library: &[Track],
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Top bar (title + account)
                Constraint::Min(0),    // Library + now playing
                Constraint::Length(3), // Player bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40), // Library
                Constraint::Percentage(60), // Now playing + queue
            ])
            .split(chunks[1]);

        let current_track_id = playback.track.as_ref().map(|t| t.id.as_str());
        layout::render_library(frame, main_chunks[0], library, ui_state, current_track_id);
        content::render_now_playing(frame, main_chunks[1], playback, ui_state);

        player_bar::render_player_bar(frame, chunks[2], playback);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
