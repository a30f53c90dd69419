//! Layout rendering (top bar, library sidebar)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, Track, UiState};

use super::utils::truncate_string;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let account = match &ui_state.signed_in_as {
        Some(name) => format!("Serenity — signed in as {}", name),
        None => "Serenity — not signed in".to_string(),
    };
    let bar = Paragraph::new(account)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Serenity "));
    frame.render_widget(bar, area);
}

pub fn render_library(
    frame: &mut Frame,
    area: Rect,
    library: &[Track],
    ui_state: &UiState,
    current_track_id: Option<&str>,
) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = library
        .iter()
        .map(|track| {
            let line = truncate_string(
                &format!("{} — {}", track.name, track.artist_line()),
                width,
            );
            let style = if Some(track.id.as_str()) == current_track_id {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let focused = ui_state.active_section == ActiveSection::Library;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Library ")
        .border_style(if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        });

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default();
    if !library.is_empty() {
        list_state.select(Some(ui_state.library_selected.min(library.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}
