use serde::{Deserialize, Serialize};

use crate::net::protocol::PROTOCOL_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum peers with attached session data; further connects are denied.
    pub max_connections: usize,
    /// Protocol version connect requests must carry.
    pub protocol_version: u32,
    /// When set, connect requests with an empty ticket are rejected instead
    /// of forwarded to the authorization layer.
    pub require_ticket: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_connections: 32,
            protocol_version: PROTOCOL_VERSION,
            require_ticket: false,
        }
    }
}
