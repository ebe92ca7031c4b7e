//! Artist information panel component.

use std::sync::Arc;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, StatefulImage};
use unicode_width::UnicodeWidthChar;

use crate::presenter::{ArtistInfoView, ArtistPanel};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Artist panel display state.
pub struct ArtistPanelState {
    /// Latest published panel
    pub panel: ArtistPanel,

    /// Artwork image protocol (for Sixel/Kitty/etc.)
    pub image: Option<StatefulProtocol>,

    /// Image picker for terminal graphics
    pub picker: Option<Picker>,

    /// Vertical scroll of the biography
    pub scroll: u16,

    /// Spinner frame while busy
    spinner: usize,
}

impl ArtistPanelState {
    pub fn new(panel: ArtistPanel, show_images: bool) -> Self {
        let picker = if show_images {
            Picker::from_query_stdio().ok()
        } else {
            None
        };

        let mut state = Self {
            panel: panel.clone(),
            image: None,
            picker,
            scroll: 0,
            spinner: 0,
        };
        state.load_image(&panel.view);
        state
    }

    /// Take a newly published panel. Artwork is rebuilt only when the view changed.
    pub fn set_panel(&mut self, panel: ArtistPanel) {
        if !Arc::ptr_eq(&self.panel.view, &panel.view) {
            self.scroll = 0;
            self.load_image(&panel.view);
        }
        self.panel = panel;
    }

    /// Advance the busy spinner.
    pub fn tick(&mut self) {
        if self.panel.busy {
            self.spinner = (self.spinner + 1) % SPINNER.len();
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn load_image(&mut self, view: &ArtistInfoView) {
        self.image = None;
        let (Some(picker), Some(bytes)) = (&self.picker, &view.image) else {
            return;
        };

        match image::load_from_memory(bytes) {
            Ok(dyn_image) => self.image = Some(picker.new_resize_protocol(dyn_image)),
            Err(e) => tracing::warn!("Failed to decode artist image: {}", e),
        }
    }
}

/// Render the artist panel.
pub fn render_artist_info(
    frame: &mut Frame,
    area: Rect,
    state: &mut ArtistPanelState,
    downloads_enabled: bool,
) {
    let mut title = vec![Span::raw(format!(
        "Artist {} ",
        state.panel.slide_direction.symbol()
    ))];
    if state.panel.busy {
        title.push(Span::styled(
            format!("{} ", SPINNER[state.spinner]),
            Style::default().fg(Color::Yellow),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(title))
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let view = Arc::clone(&state.panel.view);
    if view.is_placeholder() {
        let message = if downloads_enabled {
            "No artist information"
        } else {
            "Artist information downloads are off (D to enable)"
        };
        let placeholder = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(placeholder, inner);
        return;
    }

    // Layout: [artwork] [text]
    let art_width = if state.image.is_some() {
        (inner.height * 2).min(inner.width / 3)
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(art_width), Constraint::Min(10)])
        .split(inner);

    if let Some(ref mut protocol) = state.image {
        frame.render_stateful_widget(StatefulImage::default(), chunks[0], protocol);
    }

    let text_area = chunks[1];
    let width = text_area.width.saturating_sub(1) as usize;
    let lines = artist_lines(&view, width);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    frame.render_widget(paragraph, text_area);
}

fn artist_lines(view: &ArtistInfoView, width: usize) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Cyan);
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        view.name().unwrap_or_default().to_string(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));

    if let Some(artist) = &view.artist {
        if let (Some(listeners), Some(playcount)) = (artist.listeners(), artist.playcount()) {
            lines.push(Line::from(Span::styled(
                format!("{} listeners · {} plays", listeners, playcount),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    if !view.tags.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Tags: ", label),
            Span::raw(fit_width(&view.tags.join(" · "), width.saturating_sub(6))),
        ]));
    }

    if !view.similar.is_empty() {
        let names: Vec<&str> = view.similar.iter().map(|s| s.name.as_str()).collect();
        lines.push(Line::from(vec![
            Span::styled("Similar: ", label),
            Span::raw(fit_width(&names.join(", "), width.saturating_sub(9))),
        ]));
    }

    if let Some(biography) = &view.biography {
        lines.push(Line::from(""));
        lines.extend(biography.lines().map(|l| Line::from(l.to_string())));
    }

    lines
}

/// Cut `text` to `max` display columns, ending with an ellipsis when cut.
fn fit_width(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max.saturating_sub(1) {
            out.push('…');
            return out;
        }
        used += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width_keeps_short_text() {
        assert_eq!(fit_width("rock · pop", 20), "rock · pop");
    }

    #[test]
    fn test_fit_width_counts_wide_chars() {
        assert_eq!(fit_width("日本語のバンド", 7), "日本語…");
    }

    #[test]
    fn test_lines_for_named_artist() {
        let mut view = ArtistInfoView::default();
        view.set_artist(crate::lastfm::LastfmArtist::named("Unknown Artist"));

        let lines = artist_lines(&view, 40);
        assert_eq!(lines.len(), 1);
    }
}
