// Layer 1: Standard library imports
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use super::error::RingError;
use crate::util::ids::SiloId;

/// Default virtual nodes contributed per silo (`V` in §4.2).
pub const DEFAULT_VIRTUAL_NODES_PER_SILO: u32 = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
struct VirtualNode {
    hash: u64,
    silo_id: SiloId,
}

/// An immutable consistent-hash-ring snapshot.
///
/// Built with `V` virtual nodes per silo, deterministically hashed from
/// `"{silo_id}#{index}"`. Lookups map a 64-bit key to the first virtual
/// node with hash ≥ key, wrapping around to the lowest-hash node.
/// Ties between virtual-node hashes break on lexicographic `silo_id`.
///
/// The ring itself never mutates once built; membership changes produce
/// a new snapshot (see [`RingHandle`]) rather than mutating this one in
/// place, so concurrent readers always see a fully-formed ring.
#[derive(Debug, Clone)]
pub struct HashRing {
    virtual_nodes_per_silo: u32,
    nodes: Vec<VirtualNode>,
}

impl HashRing {
    /// An empty ring with no silos.
    pub fn empty(virtual_nodes_per_silo: u32) -> Self {
        Self {
            virtual_nodes_per_silo,
            nodes: Vec::new(),
        }
    }

    /// Returns a new ring with `silo_id`'s virtual nodes inserted.
    pub fn add_silo(&self, silo_id: &SiloId) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.retain(|n| &n.silo_id != silo_id);
        for i in 0..self.virtual_nodes_per_silo {
            nodes.push(VirtualNode {
                hash: virtual_node_hash(silo_id, i),
                silo_id: silo_id.clone(),
            });
        }
        nodes.sort_by(|a, b| a.hash.cmp(&b.hash).then_with(|| a.silo_id.cmp(&b.silo_id)));
        Self {
            virtual_nodes_per_silo: self.virtual_nodes_per_silo,
            nodes,
        }
    }

    /// Returns a new ring with all of `silo_id`'s virtual nodes removed.
    pub fn remove_silo(&self, silo_id: &SiloId) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.retain(|n| &n.silo_id != silo_id);
        Self {
            virtual_nodes_per_silo: self.virtual_nodes_per_silo,
            nodes,
        }
    }

    /// Returns the silo owning `key`, or `RingError::NoSilos` if the
    /// ring is empty.
    pub fn owner_of(&self, key: u64) -> Result<SiloId, RingError> {
        if self.nodes.is_empty() {
            return Err(RingError::NoSilos);
        }
        let idx = self
            .nodes
            .partition_point(|n| n.hash < key)
            .min(self.nodes.len() - 1);
        // partition_point gives the first node with hash >= key, except
        // when every node's hash is below key — then wrap to node 0.
        let idx = if idx == self.nodes.len() - 1 && self.nodes[idx].hash < key {
            0
        } else {
            idx
        };
        Ok(self.nodes[idx].silo_id.clone())
    }

    /// Distinct silo count currently contributing virtual nodes.
    pub fn silo_count(&self) -> usize {
        let mut ids: Vec<&SiloId> = self.nodes.iter().map(|n| &n.silo_id).collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn virtual_node_hash(silo_id: &SiloId, index: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    silo_id.as_str().hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}

/// Copy-on-write publication point for a [`HashRing`] snapshot.
///
/// Reads take a `parking_lot::RwLock` read guard just long enough to
/// clone the `Arc` out — effectively lock-free under read contention —
/// and never observe a partially-updated ring. Writes (membership
/// changes) replace the whole snapshot under a write lock.
#[derive(Debug, Clone)]
pub struct RingHandle {
    inner: Arc<RwLock<Arc<HashRing>>>,
}

impl RingHandle {
    pub fn new(ring: HashRing) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(ring))),
        }
    }

    /// Returns the currently published snapshot.
    pub fn load(&self) -> Arc<HashRing> {
        Arc::clone(&self.inner.read())
    }

    /// Atomically swaps in a new snapshot.
    pub fn publish(&self, ring: HashRing) {
        *self.inner.write() = Arc::new(ring);
    }

    pub fn owner_of(&self, key: u64) -> Result<SiloId, RingError> {
        self.load().owner_of(key)
    }
}
