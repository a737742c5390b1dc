pub mod agent;
pub mod data;
pub mod dispatch;
pub mod registry;
pub mod system;

pub use agent::{AgentDatum, AgentType, NetworkInterfaceId};
pub use data::{ClientToServerData, ConnectionData, ServerToClientData};
pub use dispatch::dispatch_packet;
pub use registry::ConnectionRegistry;
pub use system::MultiplayerSystem;
