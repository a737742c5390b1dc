use std::collections::HashMap;

use crate::net::connection::ConnectionId;

use super::data::ConnectionData;

/// Mapping from connection identity to its session-data ownership record.
/// Invariant: at most one record per connection. Attach over an existing
/// record is a protocol violation; it is reported and the old record is
/// destroyed so the invariant holds.
#[derive(Default)]
pub struct ConnectionRegistry {
    records: HashMap<ConnectionId, ConnectionData>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, id: ConnectionId, data: ConnectionData) {
        if let Some(previous) = self.records.insert(id, data) {
            log::error!(
                "connection {id} already had {} session data attached; replaced",
                previous.kind()
            );
        }
    }

    pub fn detach(&mut self, id: ConnectionId) -> Option<ConnectionData> {
        self.records.remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&ConnectionData> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut ConnectionData> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &ConnectionData)> {
        self.records.iter().map(|(id, data)| (*id, data))
    }
}
