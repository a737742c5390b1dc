use crate::entity::NetEntityHandle;
use crate::replication::{ReplicationManager, ReplicationWindow};

/// Server-side session data for one connected client: its replication
/// manager (which exclusively owns the peer's replication window) and,
/// through the window, the controlled player entity.
#[derive(Debug, Default)]
pub struct ServerToClientData {
    replication: ReplicationManager,
}

impl ServerToClientData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replication(&self) -> &ReplicationManager {
        &self.replication
    }

    pub fn replication_mut(&mut self) -> &mut ReplicationManager {
        &mut self.replication
    }

    pub fn controlled_entity(&self) -> NetEntityHandle {
        self.replication
            .window()
            .map(ReplicationWindow::controlled_entity)
            .unwrap_or_default()
    }

    pub fn grant_control(&mut self, entity: NetEntityHandle) {
        match self.replication.window_mut() {
            Some(window) => window.grant_control(entity),
            None => log::error!("cannot grant control: no replication window attached"),
        }
    }

    /// Tears down the replication window and returns whatever control grant
    /// it held. Called exactly once, on disconnect.
    pub fn release(&mut self) -> NetEntityHandle {
        match self.replication.clear_window() {
            Some(mut window) => window.release_control(),
            None => {
                log::error!("releasing session data that never had a replication window");
                NetEntityHandle::invalid()
            }
        }
    }
}

/// Client-side session data describing our connection to the server; holds
/// the local controlled entity once the server grants it.
#[derive(Debug, Default)]
pub struct ClientToServerData {
    controlled: NetEntityHandle,
}

impl ClientToServerData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controlled_entity(&self) -> NetEntityHandle {
        self.controlled
    }

    pub fn set_controlled_entity(&mut self, entity: NetEntityHandle) {
        self.controlled = entity;
    }
}

/// Per-connection session data, tagged by which side of the session owns the
/// connection. The variant set is closed; access points match explicitly.
#[derive(Debug)]
pub enum ConnectionData {
    ServerToClient(ServerToClientData),
    ClientToServer(ClientToServerData),
}

impl ConnectionData {
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectionData::ServerToClient(_) => "server->client",
            ConnectionData::ClientToServer(_) => "client->server",
        }
    }

    pub fn as_server_to_client(&self) -> Option<&ServerToClientData> {
        match self {
            ConnectionData::ServerToClient(data) => Some(data),
            ConnectionData::ClientToServer(_) => None,
        }
    }
}
