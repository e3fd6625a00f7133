use std::collections::VecDeque;

use crate::{Timestamp, UserId};

/// Determines where a song is inserted into a queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Priority {
    /// Appended to the end
    #[default]
    Normal,
    /// Inserted at the head, ahead of everything else
    High,
}

/// A song as requested by a member, before it is queued.
/// These fields are not validated against the video index.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRequest {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
}

/// A song waiting in a room's queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub added_by: UserId,
    pub added_by_name: String,
    pub added_at: Timestamp,
    pub priority: Priority,
}

/// The ordered list of songs to be played in a room.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    entries: VecDeque<QueueEntry>,
}

impl QueueEntry {
    pub fn new(
        request: SongRequest,
        added_by: UserId,
        added_by_name: String,
        added_at: Timestamp,
        priority: Priority,
    ) -> Self {
        Self {
            video_id: request.video_id,
            title: request.title,
            thumbnail: request.thumbnail,
            added_by,
            added_by_name,
            added_at,
            priority,
        }
    }
}

impl Queue {
    /// Adds an entry according to its priority.
    /// A high priority entry always becomes the new head, even ahead of earlier high priority entries.
    pub fn push(&mut self, entry: QueueEntry) {
        match entry.priority {
            Priority::Normal => self.entries.push_back(entry),
            Priority::High => self.entries.push_front(entry),
        }
    }

    /// Removes the entry at the given index, returning [None] if it is out of range.
    pub fn remove(&mut self, index: usize) -> Option<QueueEntry> {
        self.entries.remove(index)
    }

    /// Moves the entry at the given index to the head and marks it as high priority.
    /// Returns [None] if the index is out of range or already the head.
    pub fn promote(&mut self, index: usize) -> Option<&QueueEntry> {
        if index == 0 {
            return None;
        }

        let mut entry = self.entries.remove(index)?;
        entry.priority = Priority::High;
        self.entries.push_front(entry);

        self.entries.front()
    }

    /// Takes the entry at the head of the queue
    pub fn pop_front(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn entries(&self) -> Vec<QueueEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
impl QueueEntry {
    pub fn mock(title: &str, priority: Priority) -> Self {
        Self::new(
            SongRequest::mock(title),
            "mock".to_string(),
            "Mock".to_string(),
            0,
            priority,
        )
    }
}

#[cfg(test)]
impl SongRequest {
    pub fn mock(title: &str) -> Self {
        Self {
            video_id: format!("{title}-id"),
            title: title.to_string(),
            thumbnail: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Priority, Queue, QueueEntry};

    fn titles(queue: &Queue) -> Vec<String> {
        queue.entries().into_iter().map(|e| e.title).collect()
    }

    fn queue_of(titles: &[&str]) -> Queue {
        let mut queue = Queue::default();

        for title in titles {
            queue.push(QueueEntry::mock(title, Priority::Normal));
        }

        queue
    }

    #[test]
    fn normal_priority_keeps_order() {
        let queue = queue_of(&["strawberries", "bananas", "apples"]);

        assert_eq!(titles(&queue), vec!["strawberries", "bananas", "apples"]);
    }

    #[test]
    fn high_priority_takes_the_head() {
        let mut queue = queue_of(&["strawberries", "bananas"]);

        queue.push(QueueEntry::mock("windows", Priority::High));
        assert_eq!(titles(&queue), vec!["windows", "strawberries", "bananas"]);

        // The latest high priority entry wins
        queue.push(QueueEntry::mock("linux", Priority::High));
        assert_eq!(
            titles(&queue),
            vec!["linux", "windows", "strawberries", "bananas"]
        );
    }

    #[test]
    fn high_priority_into_empty_queue() {
        let mut queue = Queue::default();
        queue.push(QueueEntry::mock("linux", Priority::High));

        assert_eq!(titles(&queue), vec!["linux"]);
    }

    #[test]
    fn promote_moves_to_head() {
        let mut queue = queue_of(&["strawberries", "bananas", "apples"]);

        let promoted = queue.promote(2).cloned().expect("entry is promoted");
        assert_eq!(promoted.title, "apples");
        assert_eq!(promoted.priority, Priority::High);
        assert_eq!(titles(&queue), vec!["apples", "strawberries", "bananas"]);

        // Promoting the head does nothing
        assert!(queue.promote(0).is_none());
        assert_eq!(titles(&queue), vec!["apples", "strawberries", "bananas"]);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut queue = queue_of(&["strawberries"]);

        assert!(queue.promote(5).is_none());
        assert!(queue.remove(1).is_none());
        assert_eq!(titles(&queue), vec!["strawberries"]);
    }

    #[test]
    fn remove_any_entry() {
        let mut queue = queue_of(&["strawberries", "bananas", "apples"]);

        let removed = queue.remove(1).expect("entry is removed");
        assert_eq!(removed.title, "bananas");
        assert_eq!(titles(&queue), vec!["strawberries", "apples"]);
    }
}
