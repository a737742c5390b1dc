use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use super::protocol::DEFAULT_PORT;

/// Transport-assigned connection identifier. All per-peer state in this crate
/// is keyed by id; the transport keeps ownership of the connection itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side initiated the connection: `Acceptor` for inbound peers on a
/// host, `Connector` for our own outbound connection to a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    Acceptor,
    Connector,
}

/// Identity snapshot of a live transport connection. The core never stores
/// these; callbacks borrow them and keep only the id.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    remote_addr: SocketAddr,
    role: ConnectionRole,
}

impl Connection {
    pub fn new(id: ConnectionId, remote_addr: SocketAddr, role: ConnectionRole) -> Self {
        Self {
            id,
            remote_addr,
            role,
        }
    }

    /// Loopback identity, used by drivers and tests that never touch a socket.
    pub fn local(id: ConnectionId, role: ConnectionRole) -> Self {
        Self::new(
            id,
            SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            role,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn role(&self) -> ConnectionRole {
        self.role
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    None,
    Graceful,
    Timeout,
    VersionMismatch,
    ServerShutdown,
    Kicked,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::None => "none",
            DisconnectReason::Graceful => "disconnected",
            DisconnectReason::Timeout => "timed out",
            DisconnectReason::VersionMismatch => "protocol version mismatch",
            DisconnectReason::ServerShutdown => "server shutting down",
            DisconnectReason::Kicked => "kicked",
        }
    }
}

/// Which end of the wire tore the connection down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationEndpoint {
    Local,
    Remote,
}
