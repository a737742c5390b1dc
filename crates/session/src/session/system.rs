use crate::config::SessionConfig;
use crate::entity::NetEntityHandle;
use crate::event::SessionEventBus;
use crate::net::connection::{Connection, DisconnectReason, TerminationEndpoint};
use crate::net::protocol::{ConnectPacket, PacketHeader};
use crate::replication::ReplicationWindow;
use crate::spawn::{PlayerSpawner, SpawnOrchestrator};

use super::agent::{AgentDatum, AgentType, NetworkInterfaceId};
use super::data::{ClientToServerData, ConnectionData, ServerToClientData};
use super::registry::ConnectionRegistry;

/// Connection-and-replication lifecycle manager for one multiplayer session.
///
/// All transitions run synchronously on the thread delivering transport or
/// level-load notifications; nothing here blocks, and a misbehaving peer is
/// reported and cleaned up without destabilizing the rest of the session.
pub struct MultiplayerSystem {
    config: SessionConfig,
    agent_type: AgentType,
    network_interface: Option<NetworkInterfaceId>,
    next_interface: u32,
    events: SessionEventBus,
    registry: ConnectionRegistry,
    orchestrator: SpawnOrchestrator,
    local_player: NetEntityHandle,
    live_connections: u32,
    session_armed: bool,
}

impl Default for MultiplayerSystem {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl MultiplayerSystem {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            agent_type: AgentType::Uninitialized,
            network_interface: None,
            next_interface: 1,
            events: SessionEventBus::new(),
            registry: ConnectionRegistry::new(),
            orchestrator: SpawnOrchestrator::new(),
            local_player: NetEntityHandle::invalid(),
            live_connections: 0,
            session_armed: false,
        }
    }

    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    pub fn network_interface(&self) -> Option<NetworkInterfaceId> {
        self.network_interface
    }

    pub fn local_player(&self) -> NetEntityHandle {
        self.local_player
    }

    pub fn live_connections(&self) -> u32 {
        self.live_connections
    }

    pub fn events(&mut self) -> &mut SessionEventBus {
        &mut self.events
    }

    pub fn register_spawner(&mut self, spawner: Box<dyn PlayerSpawner>) {
        self.orchestrator.register_spawner(spawner);
    }

    pub fn unregister_spawner(&mut self) -> Option<Box<dyn PlayerSpawner>> {
        self.orchestrator.unregister_spawner()
    }

    /// Attaches session data for a connection (normally done by the connect
    /// handshake handler; exposed for transport glue and tests).
    pub fn attach_connection_data(&mut self, connection: &Connection, data: ConnectionData) {
        self.registry.attach(connection.id(), data);
    }

    pub fn connection_data(&self, connection: &Connection) -> Option<&ConnectionData> {
        self.registry.get(connection.id())
    }

    pub fn has_connection_data(&self, connection: &Connection) -> bool {
        self.registry.contains(connection.id())
    }

    /// Sets the active agent role. The first call per session opens the
    /// network interface and fires session-init exactly once; later calls
    /// switch the role without re-firing, even with live connections from the
    /// previous role. Server-authoritative roles run the host spawn path.
    pub fn initialize(&mut self, agent_type: AgentType) {
        self.agent_type = agent_type;

        if self.network_interface.is_none() {
            let interface = NetworkInterfaceId(self.next_interface);
            self.next_interface += 1;
            self.network_interface = Some(interface);
            log::info!("session initialized as {}", agent_type.as_str());
            self.events.fire_session_init(interface);
        }
        self.session_armed = true;

        if agent_type.is_server_authority() {
            let handle = self.orchestrator.on_host_init();
            if handle.exists() {
                self.local_player = handle;
            }
        }
    }

    /// Transport callback: a connection reached the acquired state. Fires
    /// connection-acquired with a by-value datum. Session data is NOT
    /// attached here; that is the connect handshake handler's job, so a
    /// connection can be acquired before it carries any session state.
    pub fn on_connect(&mut self, connection: &Connection) {
        self.live_connections += 1;
        log::debug!(
            "connection {} acquired from {}",
            connection.id(),
            connection.remote_addr()
        );
        self.events.fire_connection_acquired(AgentDatum {
            id: connection.id(),
            role: connection.role(),
            agent_type: self.agent_type,
        });
    }

    /// Transport callback: a connection went away. Resilient to half-open
    /// connections with no session data: the missing state is reported, and
    /// disconnect bookkeeping still completes. Fires endpoint-disconnected
    /// every time, and session-shutdown once when the last live connection of
    /// the armed session disconnects.
    pub fn on_disconnect(
        &mut self,
        connection: &Connection,
        reason: DisconnectReason,
        endpoint: TerminationEndpoint,
    ) {
        log::debug!(
            "connection {} closed: {} ({:?} endpoint)",
            connection.id(),
            reason.as_str(),
            endpoint
        );

        match self.registry.detach(connection.id()) {
            Some(ConnectionData::ServerToClient(mut data)) => {
                let granted = data.release();
                if !granted.exists() {
                    log::error!(
                        "connection {} disconnected without an existing controlled entity",
                        connection.id()
                    );
                }
                self.orchestrator.on_peer_left(connection.id(), granted);
            }
            Some(ConnectionData::ClientToServer(data)) => {
                if data.controlled_entity().exists() {
                    log::debug!("dropped local control grant with server connection");
                }
                self.local_player = NetEntityHandle::invalid();
            }
            None => {
                log::warn!(
                    "connection {} disconnected with no session data attached",
                    connection.id()
                );
            }
        }

        self.events.fire_endpoint_disconnected(self.agent_type);

        self.live_connections = self.live_connections.saturating_sub(1);
        if self.session_armed && self.live_connections == 0 {
            self.session_armed = false;
            if let Some(interface) = self.network_interface.take() {
                log::info!("last connection closed; session shut down");
                self.events.fire_session_shutdown(interface);
            }
        }
    }

    /// Asset-pipeline callback: a new world finished loading. Peers still
    /// waiting for an entity get their spawn request; peers already requested
    /// or spawned are untouched.
    pub fn on_world_ready(&mut self) {
        if !self.agent_type.is_server_authority() {
            log::debug!("world ready ignored: agent is {}", self.agent_type.as_str());
            return;
        }
        let report = self.orchestrator.on_world_ready();
        if report.local_player.exists() {
            self.local_player = report.local_player;
        }
        if report.issued > 0 {
            log::info!("world ready: issued {} player spawn request(s)", report.issued);
        }
    }

    /// Replication callback on the client: the server granted us control of
    /// an entity over this connection. Recorded on the connection's session
    /// data and surfaced as the local player.
    pub fn grant_local_control(&mut self, connection: &Connection, entity: NetEntityHandle) {
        match self.registry.get_mut(connection.id()) {
            Some(ConnectionData::ClientToServer(data)) => {
                data.set_controlled_entity(entity);
                self.local_player = entity;
            }
            Some(ConnectionData::ServerToClient(_)) => log::error!(
                "control grant on {} targets a server-side connection",
                connection.id()
            ),
            None => log::error!(
                "control grant on {} with no session data attached",
                connection.id()
            ),
        }
    }

    /// Handshake handler for an inbound `Connect` packet. Validates the
    /// request against the connection's current session-data state, attaches
    /// server-side data with a fresh replication window when absent, forwards
    /// the opaque ticket, and triggers the spawn transition. Returns whether
    /// the request was accepted; rejection never tears the session down.
    pub fn handle_request(
        &mut self,
        connection: &Connection,
        header: &PacketHeader,
        request: &ConnectPacket,
    ) -> bool {
        if !header.is_valid() {
            log::error!("rejecting connect from {}: malformed header", connection.id());
            return false;
        }
        if request.version != self.config.protocol_version {
            log::error!(
                "rejecting connect from {}: protocol version {} (want {})",
                connection.id(),
                request.version,
                self.config.protocol_version
            );
            return false;
        }
        if self.config.require_ticket && request.ticket.is_empty() {
            log::error!("rejecting connect from {}: missing ticket", connection.id());
            return false;
        }
        if !self.agent_type.is_server_authority() {
            log::error!(
                "connect request on {} while agent is {}",
                connection.id(),
                self.agent_type.as_str()
            );
            return false;
        }

        match self.registry.get(connection.id()) {
            Some(ConnectionData::ClientToServer(_)) => {
                log::error!(
                    "rejecting connect from {}: connection carries client-side session data",
                    connection.id()
                );
                return false;
            }
            // Repeated connect on an already attached peer; the spawn stage
            // absorbs it below.
            Some(ConnectionData::ServerToClient(_)) => {}
            None => {
                if self.registry.len() >= self.config.max_connections {
                    log::warn!("rejecting connect from {}: session full", connection.id());
                    return false;
                }
                let mut data = ServerToClientData::new();
                data.replication_mut().set_window(ReplicationWindow::new(
                    NetEntityHandle::invalid(),
                    connection.id(),
                ));
                self.registry
                    .attach(connection.id(), ConnectionData::ServerToClient(data));
            }
        }

        let handle = self
            .orchestrator
            .on_peer_connected(connection.id(), &request.ticket);
        if handle.exists() {
            if let Some(ConnectionData::ServerToClient(data)) =
                self.registry.get_mut(connection.id())
            {
                data.grant_control(handle);
            }
        }
        true
    }

    /// Client side of the handshake: the host accepted us.
    pub fn handle_accept(
        &mut self,
        connection: &Connection,
        header: &PacketHeader,
        host_id: u32,
    ) -> bool {
        if !header.is_valid() {
            log::error!("rejecting accept from {}: malformed header", connection.id());
            return false;
        }
        if self.agent_type != AgentType::Client {
            log::error!(
                "accept on {} while agent is {}",
                connection.id(),
                self.agent_type.as_str()
            );
            return false;
        }
        if self.registry.contains(connection.id()) {
            // Repeated accept is absorbed, not an error.
            return true;
        }
        self.registry.attach(
            connection.id(),
            ConnectionData::ClientToServer(ClientToServerData::new()),
        );
        log::info!("handshake accepted by host {host_id}");
        true
    }
}
