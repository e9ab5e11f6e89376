use crate::error::RegistryError;
use crate::link::{PeerLink, Role};
use huddle_core::PeerId;
use std::collections::HashMap;

/// One registered peer connection: identifier, fixed role, and the link
/// state machine.
pub struct PeerEntry {
    pub peer_id: PeerId,
    pub role: Role,
    pub link: PeerLink,
}

impl PeerEntry {
    pub fn new(link: PeerLink) -> Self {
        Self {
            peer_id: link.peer_id().clone(),
            role: link.role(),
            link,
        }
    }
}

/// The session's registry of peer links, one entry per participant
/// identifier. Owned exclusively by its RoomSession and mutated only inside
/// the session's event loop, so it needs no locking. Iteration follows
/// insertion order.
#[derive(Default)]
pub struct PeerRegistry {
    entries: HashMap<PeerId, PeerEntry>,
    order: Vec<PeerId>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails closed on a duplicate identifier: overwriting would orphan a
    /// live link without closing it.
    pub fn insert(&mut self, entry: PeerEntry) -> Result<(), RegistryError> {
        if self.entries.contains_key(&entry.peer_id) {
            return Err(RegistryError::AlreadyExists(entry.peer_id.clone()));
        }

        self.order.push(entry.peer_id.clone());
        self.entries.insert(entry.peer_id.clone(), entry);
        Ok(())
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.entries.contains_key(peer_id)
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&PeerEntry> {
        self.entries.get(peer_id)
    }

    pub fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut PeerEntry> {
        self.entries.get_mut(peer_id)
    }

    pub fn remove(&mut self, peer_id: &PeerId) -> Option<PeerEntry> {
        let entry = self.entries.remove(peer_id)?;
        self.order.retain(|id| id != peer_id);
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Empty the registry, yielding entries in insertion order. Teardown
    /// path; the caller closes each link.
    pub fn drain(&mut self) -> Vec<PeerEntry> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }
}
