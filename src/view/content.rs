//! Now-playing and queue panel rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, PlaybackSnapshot, UiState};

use super::utils::{format_seconds, truncate_string};

pub fn render_now_playing(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackSnapshot,
    ui_state: &UiState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Current track detail
            Constraint::Min(0),    // Queue listing
        ])
        .split(area);

    render_track_detail(frame, chunks[0], playback);
    render_queue(frame, chunks[1], playback, ui_state);
}

fn render_track_detail(frame: &mut Frame, area: Rect, playback: &PlaybackSnapshot) {
    let lines = match &playback.track {
        Some(track) => {
            let duration = playback
                .duration
                .map(format_seconds)
                .unwrap_or_else(|| "-:--".to_string());
            let artwork = track
                .artwork_url()
                .map(|url| format!("Art: {}", url))
                .unwrap_or_default();
            vec![
                Line::from(track.name.clone()),
                Line::from(format!(
                    "{}   {} / {}",
                    track.artist_line(),
                    format_seconds(playback.elapsed),
                    duration
                )),
                Line::from(artwork).style(Style::default().fg(Color::DarkGray)),
            ]
        }
        None => vec![Line::from("Nothing playing"), Line::from("Pick a track from the library")],
    };

    let detail = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title(" Now Playing "));
    frame.render_widget(detail, area);
}

fn render_queue(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackSnapshot,
    ui_state: &UiState,
) {
    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = playback
        .queue
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if i == playback.queue_position { "▶" } else { " " };
            let line = truncate_string(
                &format!("{} {} — {}", marker, track.name, track.artist_line()),
                width,
            );
            let style = if i == playback.queue_position {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let focused = ui_state.active_section == ActiveSection::Queue;
    let title = format!(" Queue ({} of {}) ", playback.queue_position + 1, playback.queue.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(if playback.queue.is_empty() { " Queue ".to_string() } else { title })
        .border_style(if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        });

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default();
    if focused && !playback.queue.is_empty() {
        list_state.select(Some(ui_state.queue_selected.min(playback.queue.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}
