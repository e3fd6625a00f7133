use crate::{CollabEvent, ConnectionId, Transport};

use super::RoomData;

/// Describes who receives an event sent to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    /// Every connection of the current members
    Everyone,
    /// Every connection of the current members, except this one
    Except(ConnectionId),
    /// Only this connection, whether it belongs to a member or not
    Only(ConnectionId),
}

impl RoomData {
    /// Resolves the connections an event should be delivered to.
    /// Members sharing a connection only result in one delivery.
    pub fn connections(&self, recipients: Recipients) -> Vec<ConnectionId> {
        if let Recipients::Only(connection) = recipients {
            return vec![connection];
        }

        let mut connections: Vec<ConnectionId> = Vec::with_capacity(self.members.len());

        for member in &self.members {
            let excluded = recipients == Recipients::Except(member.connection);

            if !excluded && !connections.contains(&member.connection) {
                connections.push(member.connection);
            }
        }

        connections
    }
}

/// Sends an event to the connections of a room
pub(super) fn fan_out(
    transport: &dyn Transport,
    room: &RoomData,
    event: CollabEvent,
    recipients: Recipients,
) {
    let connections = room.connections(recipients);

    if let Some((last, rest)) = connections.split_last() {
        for connection in rest {
            transport.send(*connection, event.clone());
        }

        transport.send(*last, event);
    }
}

#[cfg(test)]
mod test {
    use crate::{Config, ConnectionId, RoomData, Visibility};

    use super::Recipients;

    #[test]
    fn resolves_recipients_from_members() {
        let mut room = RoomData::new(
            "ABC123".to_string(),
            None,
            Visibility::Public,
            &Config::default(),
            0,
        );

        let john = ConnectionId::new();
        let mary = ConnectionId::new();
        let outsider = ConnectionId::new();

        room.add_member("john", "John", john, 0).ok();
        room.add_member("mary", "Mary", mary, 0).ok();
        // A second identity on the same connection
        room.add_member("mary-phone", "Mary", mary, 0).ok();

        assert_eq!(room.connections(Recipients::Everyone), vec![john, mary]);
        assert_eq!(room.connections(Recipients::Except(john)), vec![mary]);
        assert_eq!(room.connections(Recipients::Only(outsider)), vec![outsider]);
    }
}
