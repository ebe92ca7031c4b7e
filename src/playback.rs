//! Playback notifier: tracks the playing position in the queue and
//! broadcasts track changes.

use std::sync::Mutex;

use tokio::sync::broadcast;

/// Notifications sent after the playing track changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A track started playing, or playback stopped when `track` is `None`.
    Success {
        track: Option<String>,
        is_playing_previous: bool,
    },
}

/// Read access to the currently playing track.
pub trait NowPlaying: Send + Sync {
    fn playing_track(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct QueueCursor {
    tracks: Vec<String>,
    current: Option<usize>,
}

impl QueueCursor {
    fn current_track(&self) -> Option<String> {
        self.current.and_then(|i| self.tracks.get(i).cloned())
    }
}

/// Queue-driven playback service.
pub struct PlaybackService {
    cursor: Mutex<QueueCursor>,
    events_tx: broadcast::Sender<PlaybackEvent>,
}

impl PlaybackService {
    pub fn new(tracks: Vec<String>) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            cursor: Mutex::new(QueueCursor {
                tracks,
                current: None,
            }),
            events_tx,
        }
    }

    /// Subscribe to playback events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events_tx.subscribe()
    }

    /// Index of the playing track in the queue.
    pub fn current_index(&self) -> Option<usize> {
        self.with_cursor(|cursor| cursor.current)
    }

    /// Play the track at `index`. Returns false when out of range.
    pub fn play(&self, index: usize) -> bool {
        let change = self.with_cursor(|cursor| {
            if index >= cursor.tracks.len() {
                return None;
            }
            let backward = cursor.current.is_some_and(|c| index < c);
            cursor.current = Some(index);
            Some((cursor.current_track(), backward))
        });

        match change {
            Some((track, backward)) => {
                self.notify(track, backward);
                true
            }
            None => false,
        }
    }

    /// Advance to the next track. Starts from the top when stopped.
    pub fn play_next(&self) -> bool {
        let next = self.with_cursor(|cursor| match cursor.current {
            Some(i) if i + 1 < cursor.tracks.len() => Some(i + 1),
            None if !cursor.tracks.is_empty() => Some(0),
            _ => None,
        });
        next.is_some_and(|i| self.play(i))
    }

    /// Go back to the previous track.
    pub fn play_previous(&self) -> bool {
        let previous = self.with_cursor(|cursor| match cursor.current {
            Some(i) if i > 0 => Some(i - 1),
            _ => None,
        });
        previous.is_some_and(|i| self.play(i))
    }

    /// Stop playback.
    pub fn stop(&self) {
        let was_playing = self.with_cursor(|cursor| cursor.current.take().is_some());
        if was_playing {
            self.notify(None, false);
        }
    }

    fn notify(&self, track: Option<String>, is_playing_previous: bool) {
        tracing::debug!("Playback changed: {:?} (previous: {})", track, is_playing_previous);
        // No subscribers is fine
        let _ = self.events_tx.send(PlaybackEvent::Success {
            track,
            is_playing_previous,
        });
    }

    fn with_cursor<T>(&self, f: impl FnOnce(&mut QueueCursor) -> T) -> T {
        let mut cursor = match self.cursor.lock() {
            Ok(cursor) => cursor,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut cursor)
    }
}

impl NowPlaying for PlaybackService {
    fn playing_track(&self) -> Option<String> {
        self.with_cursor(|cursor| cursor.current_track())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PlaybackService {
        PlaybackService::new(vec!["a".into(), "b".into(), "c".into()])
    }

    #[test]
    fn test_next_starts_from_top() {
        let playback = service();
        let mut rx = playback.subscribe();

        assert!(playback.play_next());
        assert_eq!(playback.playing_track().as_deref(), Some("a"));
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackEvent::Success {
                track: Some("a".into()),
                is_playing_previous: false
            }
        );
    }

    #[test]
    fn test_previous_flags_backward() {
        let playback = service();
        playback.play(2);
        let mut rx = playback.subscribe();

        assert!(playback.play_previous());
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackEvent::Success {
                track: Some("b".into()),
                is_playing_previous: true
            }
        );
    }

    #[test]
    fn test_bounds() {
        let playback = service();
        assert!(!playback.play_previous());
        assert!(!playback.play(3));

        playback.play(2);
        assert!(!playback.play_next());
        assert_eq!(playback.current_index(), Some(2));
    }

    #[test]
    fn test_stop_clears_track() {
        let playback = service();
        playback.play(0);
        let mut rx = playback.subscribe();

        playback.stop();
        assert!(playback.playing_track().is_none());
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackEvent::Success {
                track: None,
                is_playing_previous: false
            }
        );

        playback.stop();
        assert!(rx.try_recv().is_err());
    }
}
