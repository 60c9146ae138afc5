use {
    crate::{HashFunction, HashRing, Node, RapidHash, RingResult},
    arc_swap::{ArcSwap, Guard},
    std::{collections::BTreeMap, convert::Infallible, ops::Deref, sync::Arc},
    tracing::trace,
};

/// Immutable value published by a [`SnapshotCell`].
#[derive(Debug)]
pub struct Snapshot<T> {
    version: u64,
    value: T,
}

impl<T> Snapshot<T> {
    /// Number of successful publishes that led to this snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Copy-on-write cell.
///
/// Holds an immutable, versioned snapshot behind an atomic pointer. Readers
/// load the current snapshot without locking and keep it alive for as long as
/// they need; writers derive a new value from the current one and publish it
/// with compare-and-swap. A writer that loses the race derives again from the
/// snapshot that won, so no update is ever lost.
pub struct SnapshotCell<T> {
    current: ArcSwap<Snapshot<T>>,
}

impl<T> SnapshotCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot { version: 0, value }),
        }
    }

    /// Returns the current snapshot.
    pub fn load(&self) -> Arc<Snapshot<T>> {
        self.current.load_full()
    }

    /// Version of the current snapshot.
    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// Publishes `f(current)` as the new snapshot.
    ///
    /// `f` may be called more than once when writers race, each time with the
    /// latest snapshot, so it must not have side effects beyond its result.
    pub fn update<F>(&self, mut f: F) -> Arc<Snapshot<T>>
    where
        F: FnMut(&T) -> T,
    {
        match self.try_update(|value| Ok::<_, Infallible>(f(value))) {
            Ok(snapshot) => snapshot,
            Err(never) => match never {},
        }
    }

    /// Publishes `f(current)` as the new snapshot, unless `f` fails.
    ///
    /// On failure the current snapshot stays in place and the error is
    /// returned as is.
    pub fn try_update<F, E>(&self, mut f: F) -> Result<Arc<Snapshot<T>>, E>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        let mut current = self.current.load_full();
        loop {
            let next = Arc::new(Snapshot {
                version: current.version + 1,
                value: f(&current.value)?,
            });

            let prev = self.current.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&prev, &current) {
                return Ok(next);
            }

            trace!(
                expected = current.version,
                found = prev.version,
                "snapshot publish lost the race, retrying"
            );
            current = Guard::into_inner(prev);
        }
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Ordered map updated by copy-on-write.
///
/// Every update copies the whole map, so this fits read-mostly data that
/// changes rarely.
pub struct SnapshotMap<K, V> {
    cell: SnapshotCell<BTreeMap<K, V>>,
}

impl<K: Ord + Clone, V: Clone> Default for SnapshotMap<K, V> {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl<K: Ord + Clone, V: Clone> SnapshotMap<K, V> {
    pub fn new(map: BTreeMap<K, V>) -> Self {
        Self {
            cell: SnapshotCell::new(map),
        }
    }

    pub fn lookup(&self, key: &K) -> Option<V> {
        self.cell.load().get(key).cloned()
    }

    /// Inserts a key-value pair, returning the previous value of the key.
    pub fn update(&self, key: K, value: V) -> Option<V> {
        let mut prev = None;
        self.cell.update(|map| {
            let mut next = map.clone();
            prev = next.insert(key.clone(), value.clone());
            next
        });
        prev
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove(&self, key: &K) -> Option<V> {
        if !self.cell.load().contains_key(key) {
            return None;
        }

        let mut removed = None;
        self.cell.update(|map| {
            let mut next = map.clone();
            removed = next.remove(key);
            next
        });
        removed
    }

    /// Returns the current map; it never changes under the caller.
    pub fn snapshot(&self) -> Arc<Snapshot<BTreeMap<K, V>>> {
        self.cell.load()
    }

    pub fn len(&self) -> usize {
        self.cell.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.load().is_empty()
    }
}

/// Hash ring published as atomically swapped snapshots.
///
/// Lookups never lock. Each mutation copies the ring, so adding or removing a
/// node costs a full copy of the ring index.
pub struct SnapshotRing<N: Node, H: HashFunction + Clone = RapidHash> {
    cell: SnapshotCell<HashRing<N, H>>,
}

impl<N: Node, H: HashFunction + Clone> SnapshotRing<N, H> {
    pub fn new(ring: HashRing<N, H>) -> Self {
        Self {
            cell: SnapshotCell::new(ring),
        }
    }

    /// Adds a node to the ring, see [`HashRing::add`].
    pub fn add(&self, node: N) -> RingResult<()> {
        if self.cell.load().contains(&node) {
            return Ok(());
        }

        self.cell.try_update(|ring| -> RingResult<HashRing<N, H>> {
            let mut next = ring.clone();
            next.add(node.clone())?;
            Ok(next)
        })?;
        Ok(())
    }

    /// Removes a node from the ring, see [`HashRing::remove`].
    pub fn remove(&self, node: &N) -> RingResult<bool> {
        if !self.cell.load().contains(node) {
            return Ok(false);
        }

        let mut removed = false;
        self.cell.try_update(|ring| -> RingResult<HashRing<N, H>> {
            let mut next = ring.clone();
            removed = next.remove(node)?;
            Ok(next)
        })?;
        Ok(removed)
    }

    /// Returns the node responsible for the given key.
    pub fn get<K>(&self, key: &K) -> RingResult<N>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.cell.load().get(key).cloned()
    }

    /// Returns up to `k` distinct nodes for the given key.
    pub fn owners<K>(&self, key: &K, k: usize) -> RingResult<Vec<N>>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let ring = self.cell.load();
        let owners = ring.owners(key, k)?;
        Ok(owners.into_iter().cloned().collect())
    }

    /// Returns the current ring; it never changes under the caller.
    pub fn snapshot(&self) -> Arc<Snapshot<HashRing<N, H>>> {
        self.cell.load()
    }

    /// Number of ring versions published so far.
    pub fn version(&self) -> u64 {
        self.cell.version()
    }
}
