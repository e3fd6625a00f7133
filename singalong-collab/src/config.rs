use std::time::Duration;

/// The configuration of the room coordination engine
#[derive(Debug, Clone)]
pub struct Config {
    /// How many members a new room accepts
    pub max_members: usize,
    /// Whether new rooms are deleted once they are vacated
    pub auto_delete: bool,
    /// The length of generated room ids
    pub room_id_length: usize,
    /// How long to wait before an idle room with a non-empty queue starts playing.
    /// Bursts of queue changes within this window result in a single advance.
    pub auto_advance_delay: Duration,
    /// How long an empty room may stay inactive before the idle sweep deletes it
    pub idle_threshold: Duration,
    /// How often the idle sweep runs
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_members: 50,
            auto_delete: true,
            room_id_length: 6,
            // Long enough to coalesce a handful of quick additions
            auto_advance_delay: Duration::from_millis(500),
            idle_threshold: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(30 * 60),
        }
    }
}
