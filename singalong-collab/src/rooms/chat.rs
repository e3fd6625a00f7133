use crate::{Timestamp, UserId};

/// The longest chat message accepted, in characters
pub const MAX_CHAT_MESSAGE_LENGTH: usize = 500;

const SYSTEM_USER_ID: &str = "system";
const SYSTEM_USER_NAME: &str = "System";

/// A message shown in a room's chat
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub user_id: UserId,
    pub user_name: String,
    pub message: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Creates a notice authored by the server
    pub fn system(message: String, timestamp: Timestamp) -> Self {
        Self {
            user_id: SYSTEM_USER_ID.to_string(),
            user_name: SYSTEM_USER_NAME.to_string(),
            message,
            timestamp,
        }
    }

    #[cfg(test)]
    pub fn is_system(&self) -> bool {
        self.user_id == SYSTEM_USER_ID
    }
}

/// Trims a message, returning [None] if nothing is left.
/// Messages longer than [MAX_CHAT_MESSAGE_LENGTH] are cut off.
pub fn sanitize_message(message: &str) -> Option<String> {
    let trimmed = message.trim();

    if trimmed.is_empty() {
        return None;
    }

    Some(trimmed.chars().take(MAX_CHAT_MESSAGE_LENGTH).collect())
}
