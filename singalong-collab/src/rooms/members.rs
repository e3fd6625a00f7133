use crate::{ConnectionId, Timestamp};

use super::{RoomData, RoomError};

/// The caller-supplied identity of a user
pub type UserId = String;

/// A participant of a room. All members have the same privileges.
#[derive(Debug, Clone)]
pub struct Member {
    pub user_id: UserId,
    pub user_name: String,
    /// The connection currently used by this member. Replaced when rejoining.
    pub connection: ConnectionId,
    pub joined_at: Timestamp,
    pub last_active_at: Timestamp,
}

/// Describes how a join was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new member was added
    Joined,
    /// An existing member reconnected with a new connection
    Rejoined,
}

impl RoomData {
    /// Adds a member, or replaces the connection of an existing one.
    pub(super) fn add_member(
        &mut self,
        user_id: &str,
        user_name: &str,
        connection: ConnectionId,
        now: Timestamp,
    ) -> Result<JoinOutcome, RoomError> {
        if let Some(existing) = self.members.iter_mut().find(|m| m.user_id == user_id) {
            existing.connection = connection;
            existing.last_active_at = now;
            self.last_active_at = now;

            return Ok(JoinOutcome::Rejoined);
        }

        if self.members.len() >= self.settings.max_members {
            return Err(RoomError::RoomFull);
        }

        self.members.push(Member {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            connection,
            joined_at: now,
            last_active_at: now,
        });

        self.stats.total_members_ever += 1;
        self.stats.peak_member_count = self.stats.peak_member_count.max(self.members.len());
        self.last_active_at = now;

        Ok(JoinOutcome::Joined)
    }

    /// Removes a member, returning it if it was present
    pub(super) fn remove_member(&mut self, user_id: &str, now: Timestamp) -> Option<Member> {
        let index = self.members.iter().position(|m| m.user_id == user_id)?;
        self.last_active_at = now;

        Some(self.members.remove(index))
    }

    /// Returns the member if it exists in the room
    pub fn member(&self, user_id: &str) -> Result<&Member, RoomError> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .ok_or(RoomError::NotAMember)
    }

    /// Returns the ids of the members using the given connection
    pub(super) fn members_on(&self, connection: ConnectionId) -> Vec<UserId> {
        self.members
            .iter()
            .filter(|m| m.connection == connection)
            .map(|m| m.user_id.clone())
            .collect()
    }

    /// Marks the member and the room as active
    pub(super) fn touch(&mut self, user_id: &str, now: Timestamp) {
        if let Some(member) = self.members.iter_mut().find(|m| m.user_id == user_id) {
            member.last_active_at = now;
        }

        self.last_active_at = now;
    }
}

#[cfg(test)]
mod test {
    use crate::{rooms::RoomError, Config, ConnectionId, RoomData, Visibility};

    use super::JoinOutcome;

    fn room_with_capacity(max_members: usize) -> RoomData {
        let config = Config {
            max_members,
            ..Default::default()
        };

        RoomData::new("482913".to_string(), None, Visibility::Public, &config, 0)
    }

    #[test]
    fn rejoin_replaces_connection() {
        let mut room = room_with_capacity(10);
        let first = ConnectionId::new();
        let second = ConnectionId::new();

        assert_eq!(
            room.add_member("john", "John", first, 1),
            Ok(JoinOutcome::Joined)
        );
        assert_eq!(
            room.add_member("john", "John", second, 2),
            Ok(JoinOutcome::Rejoined)
        );

        assert_eq!(room.members.len(), 1);
        assert_eq!(room.members[0].connection, second);
        assert_eq!(room.stats.total_members_ever, 1);
    }

    #[test]
    fn full_room_rejects() {
        let mut room = room_with_capacity(1);

        room.add_member("mary", "Mary", ConnectionId::new(), 1)
            .expect("first member joins");

        assert_eq!(
            room.add_member("john", "John", ConnectionId::new(), 2),
            Err(RoomError::RoomFull)
        );
        assert_eq!(room.members.len(), 1);
        assert_eq!(room.members[0].user_id, "mary");
    }

    #[test]
    fn rejoin_is_allowed_when_full() {
        let mut room = room_with_capacity(1);
        let connection = ConnectionId::new();

        room.add_member("mary", "Mary", ConnectionId::new(), 1)
            .expect("first member joins");

        assert_eq!(
            room.add_member("mary", "Mary", connection, 2),
            Ok(JoinOutcome::Rejoined)
        );
    }

    #[test]
    fn stats_track_peak() {
        let mut room = room_with_capacity(10);

        room.add_member("john", "John", ConnectionId::new(), 1).ok();
        room.add_member("mary", "Mary", ConnectionId::new(), 1).ok();
        room.remove_member("john", 2);
        room.add_member("john", "John", ConnectionId::new(), 3).ok();

        assert_eq!(room.stats.total_members_ever, 3);
        assert_eq!(room.stats.peak_member_count, 2);
    }
}
