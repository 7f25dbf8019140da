use callroom_core::{ConnectionId, RoomId, UserId};
use std::collections::{HashMap, HashSet};

/// Result of a join, reported so the caller can log room lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The room did not exist and was created with this connection as its first member.
    Created,
    Joined,
    AlreadyMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    NotMember,
    Left,
    /// The connection was the last member; the room is gone.
    Closed,
}

#[derive(Debug, Default)]
struct ConnectionEntry {
    user_id: Option<UserId>,
    rooms: HashSet<RoomId>,
}

/// Room membership state.
///
/// Kept as two indexes (room -> members, connection -> rooms) that are
/// always updated together. A room with no members is never stored.
#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live connection. Returns `false` if it was already known.
    pub fn connect(&mut self, connection_id: ConnectionId, user_id: Option<UserId>) -> bool {
        if let Some(entry) = self.connections.get_mut(&connection_id) {
            if user_id.is_some() {
                entry.user_id = user_id;
            }
            return false;
        }

        self.connections.insert(
            connection_id,
            ConnectionEntry {
                user_id,
                rooms: HashSet::new(),
            },
        );
        true
    }

    /// Forget a connection entirely. Returns the rooms that closed as a result.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let closed = self.leave_all(connection_id);
        self.connections.remove(connection_id);
        closed
    }

    pub fn join(&mut self, connection_id: &ConnectionId, room: &RoomId) -> JoinOutcome {
        let entry = self.connections.entry(connection_id.clone()).or_default();
        if !entry.rooms.insert(room.clone()) {
            return JoinOutcome::AlreadyMember;
        }

        match self.rooms.get_mut(room) {
            Some(members) => {
                members.insert(connection_id.clone());
                JoinOutcome::Joined
            }
            None => {
                self.rooms
                    .insert(room.clone(), HashSet::from([connection_id.clone()]));
                JoinOutcome::Created
            }
        }
    }

    pub fn leave(&mut self, connection_id: &ConnectionId, room: &RoomId) -> LeaveOutcome {
        let Some(entry) = self.connections.get_mut(connection_id) else {
            return LeaveOutcome::NotMember;
        };
        if !entry.rooms.remove(room) {
            return LeaveOutcome::NotMember;
        }

        self.remove_member(room, connection_id)
    }

    /// Remove the connection from every room it joined.
    /// Returns the rooms that closed because it was their last member.
    pub fn leave_all(&mut self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let Some(entry) = self.connections.get_mut(connection_id) else {
            return Vec::new();
        };
        let rooms: Vec<RoomId> = entry.rooms.drain().collect();

        rooms
            .into_iter()
            .filter(|room| self.remove_member(room, connection_id) == LeaveOutcome::Closed)
            .collect()
    }

    fn remove_member(&mut self, room: &RoomId, connection_id: &ConnectionId) -> LeaveOutcome {
        let Some(members) = self.rooms.get_mut(room) else {
            return LeaveOutcome::NotMember;
        };
        members.remove(connection_id);

        if members.is_empty() {
            self.rooms.remove(room);
            LeaveOutcome::Closed
        } else {
            LeaveOutcome::Left
        }
    }

    /// Members of `room` other than `sender`. Empty when the room does not exist.
    pub fn peers_of(&self, room: &RoomId, sender: &ConnectionId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().filter(|id| *id != sender).cloned().collect())
            .unwrap_or_default()
    }

    /// Every known connection except `sender`, regardless of room membership.
    pub fn everyone_except(&self, sender: &ConnectionId) -> Vec<ConnectionId> {
        self.connections
            .keys()
            .filter(|id| *id != sender)
            .cloned()
            .collect()
    }

    pub fn members(&self, room: &RoomId) -> Option<Vec<ConnectionId>> {
        self.rooms
            .get(room)
            .map(|members| members.iter().cloned().collect())
    }

    pub fn is_member(&self, connection_id: &ConnectionId, room: &RoomId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(connection_id))
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.connections
            .get(connection_id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn user_of(&self, connection_id: &ConnectionId) -> Option<&UserId> {
        self.connections
            .get(connection_id)
            .and_then(|entry| entry.user_id.as_ref())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
