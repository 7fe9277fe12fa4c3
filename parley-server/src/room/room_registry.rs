use parley_core::{ConnectionId, RoomId};
use std::collections::{HashMap, HashSet};

/// Which notification a joining connection receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The room had no members; the joiner created it.
    Created,
    /// The room already had members.
    Joined,
}

/// Room name -> member connections, plus the reverse index used on disconnect.
///
/// A connection is in at most one room. Rooms exist only while they have members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
    membership: HashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides created/joined and records the membership in one step.
    pub fn join(&mut self, connection_id: ConnectionId, room_id: RoomId) -> JoinOutcome {
        if self
            .membership
            .get(&connection_id)
            .is_some_and(|current| current != &room_id)
        {
            self.leave(&connection_id);
        }

        let members = self.rooms.entry(room_id.clone()).or_default();
        let outcome = if members.is_empty() {
            JoinOutcome::Created
        } else {
            JoinOutcome::Joined
        };

        members.insert(connection_id.clone());
        self.membership.insert(connection_id, room_id);
        outcome
    }

    /// Removes the connection from its room and returns that room, if any.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<RoomId> {
        let room_id = self.membership.remove(connection_id)?;

        if let Some(members) = self.rooms.get_mut(&room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                self.rooms.remove(&room_id);
            }
        }

        Some(room_id)
    }

    pub fn size(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, HashSet::len)
    }

    pub fn members(&self, room_id: &RoomId) -> impl Iterator<Item = &ConnectionId> {
        self.rooms.get(room_id).into_iter().flatten()
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.membership.get(connection_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
