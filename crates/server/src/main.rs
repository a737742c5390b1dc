mod config;
mod spawner;

use anyhow::{Result, bail};
use clap::Parser;

use tether::{
    AgentType, ConnectPacket, Connection, ConnectionId, ConnectionRole, DisconnectReason,
    MultiplayerSystem, PROTOCOL_VERSION, Packet, PacketHeader, PacketKind, SessionConfig,
    TerminationEndpoint, dispatch_packet,
};

use config::HostConfig;
use spawner::DemoSpawner;

#[derive(Parser)]
#[command(name = "tether-server")]
#[command(about = "Tether session host (scripted peer driver)")]
struct Args {
    #[arg(short, long, default_value = "dedicated", help = "dedicated | listen")]
    role: String,

    #[arg(short, long, default_value_t = 4)]
    peers: u32,

    #[arg(short, long, default_value_t = 32)]
    max_connections: usize,

    #[arg(long, help = "Reject connect requests without a ticket")]
    require_ticket: bool,
}

fn parse_role(role: &str) -> Result<AgentType> {
    match role {
        "dedicated" => Ok(AgentType::DedicatedServer),
        "listen" => Ok(AgentType::ClientServer),
        other => bail!("unknown role {other:?} (expected dedicated or listen)"),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let host = HostConfig {
        agent_type: parse_role(&args.role)?,
        peers: args.peers,
        max_connections: args.max_connections,
        require_ticket: args.require_ticket,
    };

    let mut system = MultiplayerSystem::new(SessionConfig {
        max_connections: host.max_connections,
        require_ticket: host.require_ticket,
        ..Default::default()
    });

    system
        .events()
        .add_session_init_handler(|interface| log::info!("session init on interface {interface:?}"));
    system
        .events()
        .add_session_shutdown_handler(|interface| {
            log::info!("session shutdown on interface {interface:?}")
        });
    system.events().add_connection_acquired_handler(|datum| {
        log::info!("connection {} acquired ({:?})", datum.id, datum.role)
    });
    system.events().add_endpoint_disconnected_handler(|agent| {
        log::info!("endpoint disconnected while agent is {}", agent.as_str())
    });

    system.register_spawner(Box::new(DemoSpawner::new()));
    system.initialize(host.agent_type);
    system.on_world_ready();

    // Scripted peers: each one connects, then handshakes with a Connect
    // packet framed through the wire codec, exactly as transport glue would.
    let peers: Vec<Connection> = (1..=host.peers)
        .map(|i| Connection::local(ConnectionId(i), ConnectionRole::Acceptor))
        .collect();

    for (i, peer) in peers.iter().enumerate() {
        system.on_connect(peer);

        let packet = Packet::new(
            PacketHeader::new(i as u32, 0),
            PacketKind::Connect(ConnectPacket::new(0, PROTOCOL_VERSION, "demo-ticket")),
        );
        let framed = packet.serialize()?;
        let decoded = Packet::deserialize(&framed)?;
        if !dispatch_packet(&mut system, peer, &decoded) {
            log::warn!("handshake rejected for connection {}", peer.id());
        }
    }

    // A level reload mid-session must not duplicate any player spawn.
    system.on_world_ready();

    for peer in &peers {
        system.on_disconnect(peer, DisconnectReason::Graceful, TerminationEndpoint::Remote);
    }

    if system.network_interface().is_some() {
        bail!("session did not shut down after the last peer left");
    }
    log::info!("session drained cleanly");
    Ok(())
}
