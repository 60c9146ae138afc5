use {
    crate::{HashFunction, HashRing, Node, RapidHash, RingResult},
    parking_lot::{RwLock, RwLockReadGuard},
};

/// Hash ring guarded by a reader/writer lock.
///
/// Lookups take the shared lock and return owned nodes, so the lock is never
/// held past the call. Use [`read()`](Self::read) when several lookups must
/// observe the same ring.
pub struct LockedRing<N: Node, H: HashFunction = RapidHash> {
    ring: RwLock<HashRing<N, H>>,
}

impl<N: Node, H: HashFunction> LockedRing<N, H> {
    pub fn new(ring: HashRing<N, H>) -> Self {
        Self {
            ring: RwLock::new(ring),
        }
    }

    /// Adds a node to the ring, see [`HashRing::add`].
    pub fn add(&self, node: N) -> RingResult<()> {
        self.ring.write().add(node)
    }

    /// Removes a node from the ring, see [`HashRing::remove`].
    pub fn remove(&self, node: &N) -> RingResult<bool> {
        self.ring.write().remove(node)
    }

    /// Returns the node responsible for the given key.
    pub fn get<K>(&self, key: &K) -> RingResult<N>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.ring.read().get(key).cloned()
    }

    /// Returns up to `k` distinct nodes for the given key.
    pub fn owners<K>(&self, key: &K, k: usize) -> RingResult<Vec<N>>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let ring = self.ring.read();
        let owners = ring.owners(key, k)?;
        Ok(owners.into_iter().cloned().collect())
    }

    /// Locks the ring for reading.
    ///
    /// Writers wait until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, HashRing<N, H>> {
        self.ring.read()
    }

    pub fn into_inner(self) -> HashRing<N, H> {
        self.ring.into_inner()
    }
}
