use crate::net::connection::{Connection, DisconnectReason, TerminationEndpoint};
use crate::net::protocol::{Packet, PacketKind};

use super::system::MultiplayerSystem;

/// Routes an inbound control packet to the lifecycle handler matching its
/// type and the connection's role. Returns whether the packet was handled;
/// out-of-context packets are reported by the handlers and dropped.
pub fn dispatch_packet(
    system: &mut MultiplayerSystem,
    connection: &Connection,
    packet: &Packet,
) -> bool {
    match &packet.kind {
        PacketKind::Connect(request) => system.handle_request(connection, &packet.header, request),
        PacketKind::Accept { host_id } => {
            system.handle_accept(connection, &packet.header, *host_id)
        }
        PacketKind::Disconnect => {
            system.on_disconnect(
                connection,
                DisconnectReason::Graceful,
                TerminationEndpoint::Remote,
            );
            true
        }
    }
}
