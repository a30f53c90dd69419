//! Utility functions for rendering UI components

use ratatui::layout::Rect;

pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Centered sub-rectangle for popup overlays
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_seconds(0.0), "0:00");
        assert_eq!(format_seconds(59.9), "0:59");
        assert_eq!(format_seconds(241.0), "4:01");
        assert_eq!(format_seconds(-3.0), "0:00");
    }

    #[test]
    fn truncates_long_names() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a very long track name", 10), "a very ...");
    }
}
