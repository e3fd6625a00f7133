use crate::{QueueEntry, Timestamp};

use super::RoomData;

/// The song currently playing in a room
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub entry: QueueEntry,
    pub started_at: Timestamp,
}

/// The state a member's player reported.
/// This is relayed to other members and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerIntent {
    Play,
    Pause,
}

/// A transient playback control, relayed to every other connection in a room
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransientControl {
    TogglePlay,
    Restart,
    PlayerState {
        state: PlayerIntent,
        current_time: Option<f64>,
    },
}

impl RoomData {
    /// Starts playing the head of the queue, or stops playback if the queue is empty.
    pub(super) fn advance(&mut self, now: Timestamp) -> Option<&NowPlaying> {
        let Some(entry) = self.queue.pop_front() else {
            self.current_song = None;
            return None;
        };

        self.current_song = Some(NowPlaying {
            entry,
            started_at: now,
        });

        self.stats.total_songs_played += 1;
        self.last_active_at = now;

        self.current_song.as_ref()
    }

    /// Returns true if nothing is playing while songs are waiting
    pub fn needs_advance(&self) -> bool {
        self.current_song.is_none() && !self.queue.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::{Config, Priority, QueueEntry, RoomData, Visibility};

    fn room() -> RoomData {
        RoomData::new(
            "ABC123".to_string(),
            None,
            Visibility::Public,
            &Config::default(),
            0,
        )
    }

    #[test]
    fn advance_takes_the_head() {
        let mut room = room();
        room.queue.push(QueueEntry::mock("strawberries", Priority::Normal));
        room.queue.push(QueueEntry::mock("bananas", Priority::Normal));

        let playing = room.advance(10).cloned().expect("song is playing");

        assert_eq!(playing.entry.title, "strawberries");
        assert_eq!(playing.started_at, 10);
        assert_eq!(room.queue.len(), 1);
        assert_eq!(room.stats.total_songs_played, 1);
    }

    #[test]
    fn advance_on_empty_queue_stops() {
        let mut room = room();
        room.queue.push(QueueEntry::mock("strawberries", Priority::Normal));
        room.advance(10);

        assert!(room.advance(20).is_none());
        assert!(room.current_song.is_none());
        assert_eq!(room.stats.total_songs_played, 1);
        assert_eq!(room.last_active_at, 10);
    }

    #[test]
    fn needs_advance_only_when_idle() {
        let mut room = room();
        assert!(!room.needs_advance());

        room.queue.push(QueueEntry::mock("strawberries", Priority::Normal));
        assert!(room.needs_advance());

        room.advance(10);
        room.queue.push(QueueEntry::mock("bananas", Priority::Normal));
        assert!(!room.needs_advance());
    }
}
