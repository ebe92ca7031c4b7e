//! Main UI layout and rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

pub mod components;

pub use components::*;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Main layout: [queue | artist] [status]
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(area);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[0]);

    let playing = app.playback.current_index();
    render_queue(frame, content_chunks[0], &mut app.queue, playing);

    let downloads = app.settings.snapshot().lastfm.download_artist_information;
    render_artist_info(frame, content_chunks[1], &mut app.artist, downloads);

    render_status(frame, main_chunks[1], app, downloads);

    if app.show_help {
        render_help(frame, area);
    }

    if let Some(ref error) = app.error_message {
        render_error(frame, area, error);
    }
}

fn render_status(frame: &mut Frame, area: Rect, app: &App, downloads: bool) {
    let key = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let playing = app
        .playback
        .current_index()
        .and_then(|i| app.queue.tracks.get(i))
        .map(|t| format!("{} - {}", t.artist_name, t.display_title()))
        .unwrap_or_else(|| String::from("Stopped"));

    let status = Line::from(vec![
        Span::styled(" ♪ ", key),
        Span::styled(playing, value),
        Span::styled("  │ Language: ", key),
        Span::styled(app.i18n.language_name(), value),
        Span::styled("  │ Artist info: ", key),
        Span::styled(
            if downloads { "on" } else { "off" },
            if downloads {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            },
        ),
        Span::styled("  │ ? help", key),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

/// Render help overlay.
fn render_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let section = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Navigation", section)),
        Line::from("  j/k or ↑/↓    Move up/down"),
        Line::from("  g/G           Jump to top/bottom"),
        Line::from("  o             Jump to playing track"),
        Line::from("  J/K           Scroll artist biography"),
        Line::from(""),
        Line::from(Span::styled("Playback", section)),
        Line::from("  Enter         Play selected track"),
        Line::from("  n/p           Next/previous track"),
        Line::from("  s             Stop"),
        Line::from(""),
        Line::from(Span::styled("Artist information", section)),
        Line::from("  L             Cycle language"),
        Line::from("  D             Toggle downloads"),
        Line::from(""),
        Line::from(Span::styled("Other", section)),
        Line::from("  x             Dismiss error"),
        Line::from("  ?             Toggle this help"),
        Line::from("  q             Quit"),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Render error popup.
fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(60, 20, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error")
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
