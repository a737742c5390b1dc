use std::collections::HashMap;

use crate::entity::NetEntityHandle;
use crate::net::connection::ConnectionId;

/// Peer identity for spawn bookkeeping: the local host player on a
/// listen-server, or a remote peer keyed by its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerKey {
    Local,
    Remote(ConnectionId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpawnStage {
    #[default]
    NoEntity,
    EntityRequested,
    EntitySpawned,
}

/// External spawner collaborator. Exactly one may be registered per process;
/// without one, spawn requests degrade to no-ops (the designed mode for pure
/// clients and headless configurations).
///
/// `request_player` is an async effect: the returned handle is whatever the
/// spawner currently holds for the peer, and a non-existent handle means the
/// entity has not materialized yet.
pub trait PlayerSpawner {
    fn request_player(&mut self, peer: PeerKey, ticket: &str) -> NetEntityHandle;
    fn on_player_left(&mut self, entity: NetEntityHandle);
}

/// Outcome of one world-ready pass over the stage table.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldReadyReport {
    /// Spawn requests issued during this pass.
    pub issued: u32,
    /// Handle for the host player, when this pass produced an existing one.
    pub local_player: NetEntityHandle,
}

/// Reconciles "peer connected" and "world ready" into exactly one confirmed
/// spawn request per peer, regardless of the order or multiplicity of those
/// events.
#[derive(Default)]
pub struct SpawnOrchestrator {
    spawner: Option<Box<dyn PlayerSpawner>>,
    stages: HashMap<PeerKey, SpawnStage>,
}

impl SpawnOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_spawner(&mut self, spawner: Box<dyn PlayerSpawner>) {
        if self.spawner.is_some() {
            log::warn!("replacing an already registered player spawner");
        }
        self.spawner = Some(spawner);
    }

    pub fn unregister_spawner(&mut self) -> Option<Box<dyn PlayerSpawner>> {
        self.spawner.take()
    }

    pub fn has_spawner(&self) -> bool {
        self.spawner.is_some()
    }

    pub fn stage(&self, peer: PeerKey) -> SpawnStage {
        self.stages.get(&peer).copied().unwrap_or_default()
    }

    /// Host path, run when a server-authoritative role initializes. Always
    /// issues one request for the local player. If the spawner cannot yet
    /// produce an existing entity the host stays at `NoEntity`, so the next
    /// world-ready retries the request.
    pub fn on_host_init(&mut self) -> NetEntityHandle {
        match self.stage(PeerKey::Local) {
            SpawnStage::EntityRequested | SpawnStage::EntitySpawned => {
                // Repeated initialization is absorbed, not an error.
                return NetEntityHandle::invalid();
            }
            SpawnStage::NoEntity => {}
        }

        let handle = self.request(PeerKey::Local, "");
        let stage = if handle.exists() {
            SpawnStage::EntitySpawned
        } else {
            SpawnStage::NoEntity
        };
        self.stages.insert(PeerKey::Local, stage);
        handle
    }

    /// Remote handshake path: issue one request for a newly accepted peer.
    pub fn on_peer_connected(&mut self, id: ConnectionId, ticket: &str) -> NetEntityHandle {
        let key = PeerKey::Remote(id);
        match self.stage(key) {
            SpawnStage::EntityRequested | SpawnStage::EntitySpawned => {
                return NetEntityHandle::invalid();
            }
            SpawnStage::NoEntity => {}
        }

        let handle = self.request(key, ticket);
        self.latch(key, handle);
        handle
    }

    /// World-ready path: every peer still at `NoEntity` gets one request and
    /// latches forward, so repeated world-ready broadcasts never duplicate a
    /// spawn. The report carries the host handle when the local peer's
    /// request resolved during this pass.
    pub fn on_world_ready(&mut self) -> WorldReadyReport {
        let waiting: Vec<PeerKey> = self
            .stages
            .iter()
            .filter(|(_, stage)| **stage == SpawnStage::NoEntity)
            .map(|(peer, _)| *peer)
            .collect();

        let mut report = WorldReadyReport::default();
        for peer in waiting {
            let handle = self.request(peer, "");
            self.latch(peer, handle);
            report.issued += 1;
            if peer == PeerKey::Local && handle.exists() {
                report.local_player = handle;
            }
        }
        report
    }

    /// Disconnect path. Any pending request for the peer is dropped; a stale
    /// entity must never be granted to a connection that no longer exists.
    pub fn on_peer_left(&mut self, id: ConnectionId, granted: NetEntityHandle) {
        self.stages.remove(&PeerKey::Remote(id));

        if granted.exists() {
            if let Some(spawner) = self.spawner.as_mut() {
                spawner.on_player_left(granted);
            }
        } else {
            log::error!("connection {id} left without a controlled entity to return");
        }
    }

    fn request(&mut self, peer: PeerKey, ticket: &str) -> NetEntityHandle {
        match self.spawner.as_mut() {
            Some(spawner) => spawner.request_player(peer, ticket),
            None => {
                log::debug!("no player spawner registered; dropping spawn request");
                NetEntityHandle::invalid()
            }
        }
    }

    fn latch(&mut self, peer: PeerKey, handle: NetEntityHandle) {
        let stage = if handle.exists() {
            SpawnStage::EntitySpawned
        } else {
            SpawnStage::EntityRequested
        };
        self.stages.insert(peer, stage);
    }
}
