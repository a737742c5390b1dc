/// Identifier for a networked entity. The entity-component framework that
/// actually owns entity storage is outside this crate; everything here works
/// in terms of ids and possibly-empty handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetEntityId(pub u64);

/// Reference to a networked entity that may not (yet) exist.
///
/// An empty handle is a designed state, not an error: a peer can be connected
/// before any entity is ready to be granted to it, and a spawn request is an
/// async effect whose entity materializes later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetEntityHandle {
    id: Option<NetEntityId>,
}

impl NetEntityHandle {
    pub fn new(id: NetEntityId) -> Self {
        Self { id: Some(id) }
    }

    pub fn invalid() -> Self {
        Self { id: None }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<NetEntityId> {
        self.id
    }
}
