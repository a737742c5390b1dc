use std::cell::RefCell;
use std::rc::Rc;

use tether::{
    AgentType, ConnectPacket, Connection, ConnectionData, ConnectionId, ConnectionRole,
    DisconnectReason, MultiplayerSystem, NetEntityHandle, NetEntityId, PROTOCOL_VERSION,
    PacketHeader, PeerKey, PlayerSpawner, ReplicationWindow, ServerToClientData, SessionConfig,
    TerminationEndpoint,
};

#[derive(Default)]
struct EventCounters {
    init: u32,
    shutdown: u32,
    acquired_id_sum: u32,
    disconnected: u32,
}

fn observe(system: &mut MultiplayerSystem) -> Rc<RefCell<EventCounters>> {
    let counters = Rc::new(RefCell::new(EventCounters::default()));

    let c = Rc::clone(&counters);
    system
        .events()
        .add_session_init_handler(move |_| c.borrow_mut().init += 1);
    let c = Rc::clone(&counters);
    system
        .events()
        .add_session_shutdown_handler(move |_| c.borrow_mut().shutdown += 1);
    let c = Rc::clone(&counters);
    system
        .events()
        .add_connection_acquired_handler(move |datum| {
            c.borrow_mut().acquired_id_sum += datum.id.0
        });
    let c = Rc::clone(&counters);
    system
        .events()
        .add_endpoint_disconnected_handler(move |_| c.borrow_mut().disconnected += 1);

    counters
}

#[derive(Default)]
struct SpawnerState {
    requested: u32,
    players_left: u32,
    handle: NetEntityHandle,
}

struct TestSpawner {
    state: Rc<RefCell<SpawnerState>>,
}

impl PlayerSpawner for TestSpawner {
    fn request_player(&mut self, _peer: PeerKey, _ticket: &str) -> NetEntityHandle {
        let mut state = self.state.borrow_mut();
        state.requested += 1;
        state.handle
    }

    fn on_player_left(&mut self, _entity: NetEntityHandle) {
        self.state.borrow_mut().players_left += 1;
    }
}

fn register_spawner(
    system: &mut MultiplayerSystem,
    handle: NetEntityHandle,
) -> Rc<RefCell<SpawnerState>> {
    let state = Rc::new(RefCell::new(SpawnerState {
        handle,
        ..Default::default()
    }));
    system.register_spawner(Box::new(TestSpawner {
        state: Rc::clone(&state),
    }));
    state
}

fn connect_packet(ticket: &str) -> ConnectPacket {
    ConnectPacket::new(0, PROTOCOL_VERSION, ticket)
}

fn disconnect(system: &mut MultiplayerSystem, connection: &Connection) {
    system.on_disconnect(
        connection,
        DisconnectReason::None,
        TerminationEndpoint::Local,
    );
}

#[test]
fn init_event_fires_once_across_role_switches() {
    let mut system = MultiplayerSystem::default();
    let counters = observe(&mut system);

    system.initialize(AgentType::DedicatedServer);
    assert_eq!(system.agent_type(), AgentType::DedicatedServer);

    system.initialize(AgentType::ClientServer);
    assert_eq!(system.agent_type(), AgentType::ClientServer);

    system.initialize(AgentType::Client);
    assert_eq!(system.agent_type(), AgentType::Client);

    assert_eq!(counters.borrow().init, 1);
}

#[test]
fn shutdown_fires_once_after_disconnects() {
    let mut system = MultiplayerSystem::default();
    let counters = observe(&mut system);

    system.initialize(AgentType::DedicatedServer);

    let conn1 = Connection::local(ConnectionId(0), ConnectionRole::Acceptor);
    let conn2 = Connection::local(ConnectionId(0), ConnectionRole::Connector);
    disconnect(&mut system, &conn1);
    disconnect(&mut system, &conn2);

    assert_eq!(counters.borrow().disconnected, 2);
    assert_eq!(counters.borrow().shutdown, 1);
}

#[test]
fn connection_datum_is_delivered_by_value() {
    let mut system = MultiplayerSystem::default();
    let counters = observe(&mut system);

    // A second handler mutates its copy of the datum; the sum observed by the
    // first handler must be unaffected.
    system.events().add_connection_acquired_handler(|mut datum| {
        datum.id = ConnectionId(999);
    });

    let conn1 = Connection::local(ConnectionId(10), ConnectionRole::Acceptor);
    let conn2 = Connection::local(ConnectionId(15), ConnectionRole::Acceptor);
    system.on_connect(&conn1);
    system.on_connect(&conn2);

    assert_eq!(counters.borrow().acquired_id_sum, 25);

    disconnect(&mut system, &conn1);
    disconnect(&mut system, &conn2);
    assert_eq!(counters.borrow().disconnected, 2);
}

#[test]
fn disconnect_releases_window_without_entity_grant() {
    let mut system = MultiplayerSystem::default();
    let counters = observe(&mut system);
    let spawner = register_spawner(&mut system, NetEntityHandle::invalid());

    system.initialize(AgentType::ClientServer);

    // Dummy session data with a window that never received a controlled
    // entity; disconnect must report the missing grant and still clean up.
    let connection = Connection::local(ConnectionId(0), ConnectionRole::Acceptor);
    let mut data = ServerToClientData::new();
    data.replication_mut().set_window(ReplicationWindow::new(
        NetEntityHandle::invalid(),
        connection.id(),
    ));
    system.attach_connection_data(&connection, ConnectionData::ServerToClient(data));

    disconnect(&mut system, &connection);

    assert_eq!(counters.borrow().disconnected, 1);
    assert_eq!(spawner.borrow().players_left, 0);
    assert!(!system.has_connection_data(&connection));
}

#[test]
fn client_server_without_player_entity_requests_again_on_world_ready() {
    let mut system = MultiplayerSystem::default();
    let spawner = register_spawner(&mut system, NetEntityHandle::invalid());

    system.initialize(AgentType::ClientServer);
    assert_eq!(spawner.borrow().requested, 1);

    // No player entity yet, so a freshly loaded world re-requests one for the
    // still-missing host peer.
    system.on_world_ready();
    assert_eq!(spawner.borrow().requested, 2);

    // The retry latched the request; further world-ready broadcasts are no-ops.
    system.on_world_ready();
    assert_eq!(spawner.borrow().requested, 2);
}

#[test]
fn world_ready_retry_records_host_player_entity() {
    let mut system = MultiplayerSystem::default();
    let spawner = register_spawner(&mut system, NetEntityHandle::invalid());

    system.initialize(AgentType::ClientServer);
    assert!(!system.local_player().exists());

    // By the time the world finishes loading the spawner can produce the
    // entity, so the retry both latches and records the host player.
    spawner.borrow_mut().handle = NetEntityHandle::new(NetEntityId(6));
    system.on_world_ready();

    assert_eq!(spawner.borrow().requested, 2);
    assert_eq!(system.local_player().id(), Some(NetEntityId(6)));
}

#[test]
fn client_server_with_player_entity_spawns_remote_peer_once() {
    let mut system = MultiplayerSystem::default();
    let spawner = register_spawner(&mut system, NetEntityHandle::new(NetEntityId(1)));

    // Initializing the host also spawns the host's own player.
    system.initialize(AgentType::ClientServer);
    assert_eq!(spawner.borrow().requested, 1);
    assert!(system.local_player().exists());

    // An accepted connect request spawns a player for the remote peer.
    let connection = Connection::local(ConnectionId(1), ConnectionRole::Connector);
    let mut data = ServerToClientData::new();
    data.replication_mut().set_window(ReplicationWindow::new(
        NetEntityHandle::invalid(),
        connection.id(),
    ));
    system.attach_connection_data(&connection, ConnectionData::ServerToClient(data));

    let accepted = system.handle_request(
        &connection,
        &PacketHeader::default(),
        &connect_packet("connect_ticket"),
    );
    assert!(accepted);
    assert_eq!(spawner.borrow().requested, 2);

    // Players exist for every peer, so a newly loaded world requests nothing.
    system.on_world_ready();
    assert_eq!(spawner.borrow().requested, 2);

    // The grant flowed into the peer's replication window.
    let data = system.connection_data(&connection).unwrap();
    let window = data
        .as_server_to_client()
        .unwrap()
        .replication()
        .window()
        .unwrap();
    assert_eq!(window.controlled_entity().id(), Some(NetEntityId(1)));
    assert!(window.is_visible(NetEntityId(1)));
}

#[test]
fn connect_request_attaches_session_data_when_absent() {
    let mut system = MultiplayerSystem::default();
    let spawner = register_spawner(&mut system, NetEntityHandle::new(NetEntityId(5)));

    system.initialize(AgentType::DedicatedServer);
    assert_eq!(spawner.borrow().requested, 1);

    let connection = Connection::local(ConnectionId(2), ConnectionRole::Acceptor);
    system.on_connect(&connection);
    assert!(!system.has_connection_data(&connection));

    assert!(system.handle_request(
        &connection,
        &PacketHeader::default(),
        &connect_packet("ticket"),
    ));
    assert!(system.has_connection_data(&connection));
    assert_eq!(spawner.borrow().requested, 2);

    // A repeated connect request from the same peer is absorbed.
    assert!(system.handle_request(
        &connection,
        &PacketHeader::default(),
        &connect_packet("ticket"),
    ));
    assert_eq!(spawner.borrow().requested, 2);
}

#[test]
fn connect_rejected_on_client_side_connection() {
    let mut system = MultiplayerSystem::default();
    let spawner = register_spawner(&mut system, NetEntityHandle::new(NetEntityId(1)));

    // A client whose handshake was accepted keeps its client-side session
    // data when the process is later promoted to a listen server.
    system.initialize(AgentType::Client);
    let server = Connection::local(ConnectionId(1), ConnectionRole::Connector);
    system.on_connect(&server);
    assert!(system.handle_accept(&server, &PacketHeader::default(), 7));

    system.initialize(AgentType::ClientServer);
    let requested = spawner.borrow().requested;

    // A connect request on that connection is out of context: rejected, no
    // spawn request issued, and the client-side data left intact.
    assert!(!system.handle_request(
        &server,
        &PacketHeader::default(),
        &connect_packet("ticket"),
    ));
    assert_eq!(spawner.borrow().requested, requested);
    assert_eq!(
        system.connection_data(&server).unwrap().kind(),
        "client->server"
    );
}

#[test]
fn client_control_grant_sets_and_clears_local_player() {
    let mut system = MultiplayerSystem::default();
    system.initialize(AgentType::Client);

    let server = Connection::local(ConnectionId(1), ConnectionRole::Connector);
    system.on_connect(&server);
    assert!(system.handle_accept(&server, &PacketHeader::default(), 3));

    system.grant_local_control(&server, NetEntityHandle::new(NetEntityId(11)));
    assert_eq!(system.local_player().id(), Some(NetEntityId(11)));

    // Losing the server connection drops the grant with it.
    disconnect(&mut system, &server);
    assert!(!system.local_player().exists());
}

#[test]
fn half_open_disconnect_completes_bookkeeping() {
    let mut system = MultiplayerSystem::default();
    let counters = observe(&mut system);

    system.initialize(AgentType::DedicatedServer);

    let connection = Connection::local(ConnectionId(4), ConnectionRole::Acceptor);
    system.on_connect(&connection);
    system.on_disconnect(
        &connection,
        DisconnectReason::Timeout,
        TerminationEndpoint::Remote,
    );

    assert_eq!(counters.borrow().disconnected, 1);
    assert_eq!(counters.borrow().shutdown, 1);
    assert_eq!(system.live_connections(), 0);
}

#[test]
fn full_lifecycle_returns_entities_and_shuts_down_once() {
    let mut system = MultiplayerSystem::default();
    let counters = observe(&mut system);
    let spawner = register_spawner(&mut system, NetEntityHandle::new(NetEntityId(9)));

    system.initialize(AgentType::DedicatedServer);

    let peers = [
        Connection::local(ConnectionId(1), ConnectionRole::Acceptor),
        Connection::local(ConnectionId(2), ConnectionRole::Acceptor),
    ];
    for peer in &peers {
        system.on_connect(peer);
        assert!(system.handle_request(
            peer,
            &PacketHeader::default(),
            &connect_packet("ticket"),
        ));
    }
    assert_eq!(system.live_connections(), 2);

    for peer in &peers {
        disconnect(&mut system, peer);
        assert!(!system.has_connection_data(peer));
    }

    // Each granted entity went back to the spawner exactly once.
    assert_eq!(spawner.borrow().players_left, 2);
    assert_eq!(counters.borrow().disconnected, 2);
    assert_eq!(counters.borrow().shutdown, 1);
}

#[test]
fn reinitialize_after_full_shutdown_fires_init_again() {
    let mut system = MultiplayerSystem::default();
    let counters = observe(&mut system);

    system.initialize(AgentType::DedicatedServer);
    assert_eq!(counters.borrow().init, 1);

    let connection = Connection::local(ConnectionId(1), ConnectionRole::Acceptor);
    system.on_connect(&connection);
    disconnect(&mut system, &connection);
    assert_eq!(counters.borrow().shutdown, 1);

    // The session fully shut down, so the next initialization opens a fresh
    // network interface and announces itself again.
    system.initialize(AgentType::Client);
    assert_eq!(counters.borrow().init, 2);
    assert_eq!(counters.borrow().shutdown, 1);
}

#[test]
fn connect_rejected_when_session_full() {
    let config = SessionConfig {
        max_connections: 1,
        ..Default::default()
    };
    let mut system = MultiplayerSystem::new(config);
    register_spawner(&mut system, NetEntityHandle::new(NetEntityId(1)));
    system.initialize(AgentType::DedicatedServer);

    let first = Connection::local(ConnectionId(1), ConnectionRole::Acceptor);
    let second = Connection::local(ConnectionId(2), ConnectionRole::Acceptor);

    assert!(system.handle_request(&first, &PacketHeader::default(), &connect_packet("t")));
    assert!(!system.handle_request(&second, &PacketHeader::default(), &connect_packet("t")));
    assert!(!system.has_connection_data(&second));
}

#[test]
fn connect_rejected_on_version_mismatch_and_missing_ticket() {
    let config = SessionConfig {
        require_ticket: true,
        ..Default::default()
    };
    let mut system = MultiplayerSystem::new(config);
    system.initialize(AgentType::DedicatedServer);

    let connection = Connection::local(ConnectionId(1), ConnectionRole::Acceptor);

    let stale = ConnectPacket::new(0, PROTOCOL_VERSION + 1, "ticket");
    assert!(!system.handle_request(&connection, &PacketHeader::default(), &stale));

    let unticketed = ConnectPacket::new(0, PROTOCOL_VERSION, "");
    assert!(!system.handle_request(&connection, &PacketHeader::default(), &unticketed));

    assert!(!system.has_connection_data(&connection));
}
