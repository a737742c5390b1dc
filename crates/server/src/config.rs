use tether::AgentType;

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub agent_type: AgentType,
    pub peers: u32,
    pub max_connections: usize,
    pub require_ticket: bool,
}
