pub mod connection;
pub mod protocol;

pub use connection::{
    Connection, ConnectionId, ConnectionRole, DisconnectReason, TerminationEndpoint,
};
pub use protocol::{
    ConnectPacket, DEFAULT_PORT, MAX_PACKET_SIZE, PROTOCOL_MAGIC, PROTOCOL_VERSION, Packet,
    PacketError, PacketHeader, PacketKind,
};
