//! Compact player bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackSnapshot, RepeatMode};

use super::utils::format_seconds;

pub fn render_player_bar(frame: &mut Frame, area: Rect, playback: &PlaybackSnapshot) {
    let status_text = match &playback.track {
        None => " No track playing".to_string(),
        Some(track) if playback.is_playing => {
            format!(" ▶ {} | {}", track.name, track.artist_line())
        }
        Some(track) => format!(" ⏸ {} | {}", track.name, track.artist_line()),
    };

    let shuffle_text = if playback.shuffle { "Shuffle: On" } else { "Shuffle: Off" };
    let repeat_text = match playback.repeat {
        RepeatMode::Off => "Repeat: Off",
        RepeatMode::All => "Repeat: All",
        RepeatMode::One => "Repeat: One",
    };
    let volume_text = if playback.is_muted {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {}%", (playback.volume * 100.0).round() as u32)
    };

    let duration = playback.duration.unwrap_or(0.0);
    let time_str = format!(
        "{} / {}",
        format_seconds(playback.elapsed),
        format_seconds(duration)
    );

    let progress_ratio = if duration > 0.0 {
        (playback.elapsed / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let controls_info = format!(" {} | {} | {} ", shuffle_text, repeat_text, volume_text);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
