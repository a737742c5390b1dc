use std::collections::HashSet;

use crate::entity::{NetEntityHandle, NetEntityId};
use crate::net::connection::ConnectionId;

/// Per-peer authorization set: which entities this peer may see, and the
/// single entity (if any) it may issue control input for.
///
/// Invariant: a present controlled entity is always a member of the visible
/// set. Every accessor is callable while the controlled handle does not
/// exist; that is the normal state for a peer that connected before an
/// entity was ready to be granted.
#[derive(Debug)]
pub struct ReplicationWindow {
    owner: ConnectionId,
    controlled: NetEntityHandle,
    visible: HashSet<NetEntityId>,
}

impl ReplicationWindow {
    pub fn new(controlled: NetEntityHandle, owner: ConnectionId) -> Self {
        let mut visible = HashSet::new();
        if let Some(id) = controlled.id() {
            visible.insert(id);
        }
        Self {
            owner,
            controlled,
            visible,
        }
    }

    pub fn owner(&self) -> ConnectionId {
        self.owner
    }

    pub fn controlled_entity(&self) -> NetEntityHandle {
        self.controlled
    }

    /// Grants control of `entity` to the owning peer, replacing any previous
    /// grant. The entity becomes visible as part of the grant.
    pub fn grant_control(&mut self, entity: NetEntityHandle) {
        self.controlled = entity;
        if let Some(id) = entity.id() {
            self.visible.insert(id);
        }
    }

    /// Clears the control grant and returns the handle that held it. The
    /// entity stays visible; losing control does not hide it.
    pub fn release_control(&mut self) -> NetEntityHandle {
        std::mem::take(&mut self.controlled)
    }

    pub fn add_visible(&mut self, id: NetEntityId) -> bool {
        self.visible.insert(id)
    }

    /// Removing the controlled entity from the visible set also drops the
    /// control grant; a peer cannot control what it cannot see.
    pub fn remove_visible(&mut self, id: NetEntityId) -> bool {
        if self.controlled.id() == Some(id) {
            self.controlled = NetEntityHandle::invalid();
        }
        self.visible.remove(&id)
    }

    pub fn is_visible(&self, id: NetEntityId) -> bool {
        self.visible.contains(&id)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

/// Exclusive owner of at most one replication window per peer.
/// `set_window` is an explicit ownership transfer: replacing the window
/// destroys the previous one.
#[derive(Debug, Default)]
pub struct ReplicationManager {
    window: Option<ReplicationWindow>,
}

impl ReplicationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_window(&mut self, window: ReplicationWindow) {
        self.window = Some(window);
    }

    pub fn clear_window(&mut self) -> Option<ReplicationWindow> {
        self.window.take()
    }

    pub fn window(&self) -> Option<&ReplicationWindow> {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> Option<&mut ReplicationWindow> {
        self.window.as_mut()
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }
}
