//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::model::ActiveSection;

use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // A visible error blocks everything else: Esc dismisses it,
        // Enter dismisses and retries the library selection
        if self.model.has_error().await {
            match key.code {
                KeyCode::Esc => self.model.clear_error().await,
                KeyCode::Enter => {
                    self.model.clear_error().await;
                    self.play_selected().await;
                }
                _ => {}
            }
            return Ok(());
        }

        if self.model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?')) {
                self.model.hide_help_popup().await;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => self.model.set_should_quit(true).await,
            KeyCode::Char('h') | KeyCode::Char('?') => self.model.show_help_popup().await,

            KeyCode::Tab => self.model.cycle_section().await,
            KeyCode::Up => self.model.move_selection_up().await,
            KeyCode::Down => self.model.move_selection_down().await,
            KeyCode::Enter => match self.model.get_ui_state().await.active_section {
                ActiveSection::Library => self.play_selected().await,
                ActiveSection::Queue => {
                    if let Some(index) = self.model.selected_queue_index().await {
                        self.play_queue_entry(index).await;
                    }
                }
            },

            KeyCode::Char(' ') => self.toggle_playback().await,
            KeyCode::Char('x') => self.stop_playback().await,
            KeyCode::Char('n') => self.next_track().await,
            KeyCode::Char('p') => self.previous_track().await,
            KeyCode::Left => self.seek_backward().await,
            KeyCode::Right => self.seek_forward().await,
            KeyCode::Char('+') | KeyCode::Char('=') => self.volume_up().await,
            KeyCode::Char('-') => self.volume_down().await,
            KeyCode::Char('m') => self.toggle_mute().await,
            KeyCode::Char('r') => self.cycle_repeat().await,
            KeyCode::Char('s') => self.toggle_shuffle().await,
            KeyCode::Char('o') => self.sign_out().await,
            _ => {}
        }

        Ok(())
    }
}
