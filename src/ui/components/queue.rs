//! Play queue component.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::library::TrackRecord;

/// Queue state.
#[derive(Debug, Default)]
pub struct QueueState {
    /// Tracks in the queue
    pub tracks: Vec<TrackRecord>,

    /// Selection state for UI
    pub list_state: ListState,
}

impl QueueState {
    pub fn new(tracks: Vec<TrackRecord>) -> Self {
        let mut list_state = ListState::default();
        if !tracks.is_empty() {
            list_state.select(Some(0));
        }
        Self { tracks, list_state }
    }

    /// Track references in queue order.
    pub fn track_refs(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.track_ref.clone()).collect()
    }

    /// Move selection up.
    pub fn select_previous(&mut self) {
        if self.tracks.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => self.tracks.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.tracks.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Get selected index.
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn jump_to_top(&mut self) {
        if !self.tracks.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn jump_to_bottom(&mut self) {
        if !self.tracks.is_empty() {
            self.list_state.select(Some(self.tracks.len() - 1));
        }
    }

    /// Select the playing track.
    pub fn jump_to(&mut self, index: Option<usize>) {
        if let Some(i) = index.filter(|i| *i < self.tracks.len()) {
            self.list_state.select(Some(i));
        }
    }
}

/// Render the queue panel.
pub fn render_queue(frame: &mut Frame, area: Rect, state: &mut QueueState, playing: Option<usize>) {
    let title = format!("Queue ({})", state.tracks.len());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = state
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_current = playing == Some(i);

            let prefix = if is_current { "▶ " } else { "  " };
            let style = if is_current {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(track.display_title().to_string(), style),
                Span::styled(
                    format!(" - {}", track.artist_name),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut state.list_state);
}
