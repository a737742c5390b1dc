use crate::net::connection::{ConnectionId, ConnectionRole};

/// The networked role the local process plays in the session. Exactly one is
/// active at a time; `initialize` may switch it mid-session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgentType {
    #[default]
    Uninitialized,
    DedicatedServer,
    ClientServer,
    Client,
}

impl AgentType {
    /// Server-authoritative roles host player entities for connected peers.
    pub fn is_server_authority(&self) -> bool {
        matches!(self, AgentType::DedicatedServer | AgentType::ClientServer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Uninitialized => "uninitialized",
            AgentType::DedicatedServer => "dedicated server",
            AgentType::ClientServer => "client server",
            AgentType::Client => "client",
        }
    }
}

/// Handle for the single network interface opened per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInterfaceId(pub u32);

/// Connection-acquired payload. Handlers receive this by value; mutating a
/// local copy has no effect on the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDatum {
    pub id: ConnectionId,
    pub role: ConnectionRole,
    pub agent_type: AgentType,
}
