pub mod config;
pub mod entity;
pub mod event;
pub mod net;
pub mod replication;
pub mod session;
pub mod spawn;

pub use config::SessionConfig;
pub use entity::{NetEntityHandle, NetEntityId};
pub use event::{SessionEventBus, Subscription};
pub use net::{
    Connection, ConnectionId, ConnectionRole, ConnectPacket, DEFAULT_PORT, DisconnectReason,
    MAX_PACKET_SIZE, PROTOCOL_VERSION, Packet, PacketError, PacketHeader, PacketKind,
    TerminationEndpoint,
};
pub use replication::{ReplicationManager, ReplicationWindow};
pub use session::{
    AgentDatum, AgentType, ClientToServerData, ConnectionData, ConnectionRegistry,
    MultiplayerSystem, NetworkInterfaceId, ServerToClientData, dispatch_packet,
};
pub use spawn::{PeerKey, PlayerSpawner, SpawnOrchestrator, SpawnStage, WorldReadyReport};
