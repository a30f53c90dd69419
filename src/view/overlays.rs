//! Modal overlays (error notification, help popup)

use ratatui::{
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::UiState;

use super::utils::centered_rect;

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    let Some(message) = &ui_state.error_message else {
        return;
    };

    let area = centered_rect(50, 20, frame.area());
    let popup = Paragraph::new(vec![
        Line::from(message.clone()),
        Line::from(""),
        Line::from("Press Enter to retry from the library, Esc to dismiss"),
    ])
    .wrap(Wrap { trim: true })
    .style(Style::default().fg(Color::White))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Error ")
            .border_style(Style::default().fg(Color::Red)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());
    let lines = vec![
        Line::from("Space      play / pause"),
        Line::from("x          stop"),
        Line::from("n / p      next / previous"),
        Line::from("← / →      seek 5s"),
        Line::from("+ / -      volume"),
        Line::from("m          mute"),
        Line::from("r          repeat off/all/one"),
        Line::from("s          shuffle"),
        Line::from("o          sign out"),
        Line::from("Tab        switch panel"),
        Line::from("Enter      play selection"),
        Line::from("q          quit"),
    ];

    let popup = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keys (Esc to close) "),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}
