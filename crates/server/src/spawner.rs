use tether::{NetEntityHandle, NetEntityId, PeerKey, PlayerSpawner};

/// Spawner for demo runs: hands out sequential entity ids immediately, so
/// every request resolves to an existing entity.
pub struct DemoSpawner {
    next_entity: u64,
}

impl DemoSpawner {
    pub fn new() -> Self {
        Self { next_entity: 1 }
    }
}

impl PlayerSpawner for DemoSpawner {
    fn request_player(&mut self, peer: PeerKey, ticket: &str) -> NetEntityHandle {
        let id = NetEntityId(self.next_entity);
        self.next_entity += 1;
        match peer {
            PeerKey::Local => log::info!("spawned host player entity {:?}", id),
            PeerKey::Remote(conn) => {
                log::info!("spawned player entity {id:?} for connection {conn} (ticket {ticket:?})")
            }
        }
        NetEntityHandle::new(id)
    }

    fn on_player_left(&mut self, entity: NetEntityHandle) {
        log::info!("player entity {:?} returned to spawner", entity.id());
    }
}
