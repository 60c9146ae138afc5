
use {
    crate::{
        HashFunction,
        Interval,
        KeyRange,
        Node,
        RapidHash,
        RingError,
        RingResult,
        node::Nodes,
    },
    std::{
        collections::BTreeMap,
        fmt,
    },
    tracing::{debug, warn},
};

/// Position on the ring, as produced by the ring's hash function.
pub type Position<H> = <H as HashFunction>::Position;

/// Consistent hash ring.
///
/// Every physical node occupies `replicas` positions (virtual nodes) on a
/// circular coordinate space. A key is owned by the first position at or after
/// its hash, wrapping around to the smallest position when the hash is above
/// all of them.
///
/// Adding or removing a node only touches that node's positions, so only the
/// keys falling into the arcs right before those positions change owner.
pub struct HashRing<N: Node, H: HashFunction = RapidHash> {
    /// Digest used for both virtual nodes and keys.
    hash_fn: H,

    /// Number of positions each physical node occupies.
    replicas: usize,

    /// Sorted ring index: position -> owning node.
    positions: BTreeMap<H::Position, N>,

    /// Nodes that lost a position to a later insertion, oldest first.
    ///
    /// When the current owner of such position leaves, the most recent of
    /// these takes the position back.
    shadowed: BTreeMap<H::Position, Vec<N>>,

    /// Registered physical nodes.
    nodes: Nodes<N>,
}

impl<N: Node, H: HashFunction + Clone> Clone for HashRing<N, H> {
    fn clone(&self) -> Self {
        Self {
            hash_fn: self.hash_fn.clone(),
            replicas: self.replicas,
            positions: self.positions.clone(),
            shadowed: self.shadowed.clone(),
            nodes: self.nodes.clone(),
        }
    }
}

impl<N: Node, H: HashFunction> fmt::Debug for HashRing<N, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("nodes", &self.nodes.len())
            .field("positions", &self.positions.len())
            .field("version", &self.nodes.version())
            .finish_non_exhaustive()
    }
}

impl<N: Node, H: HashFunction> HashRing<N, H> {
    /// Creates a ring with every node of `nodes` placed on it.
    ///
    /// An empty `nodes` sequence yields an empty ring, on which lookups fail
    /// with [`RingError::EmptyRing`] until a node is added.
    pub fn new<I>(hash_fn: H, replicas: usize, nodes: I) -> RingResult<Self>
    where
        I: IntoIterator<Item = N>,
    {
        if replicas == 0 {
            return Err(RingError::InvalidReplicas(replicas));
        }

        let mut ring = Self {
            hash_fn,
            replicas,
            positions: BTreeMap::new(),
            shadowed: BTreeMap::new(),
            nodes: Nodes::new(),
        };
        for node in nodes {
            ring.add(node)?;
        }

        Ok(ring)
    }

    /// Adds a node to the ring.
    ///
    /// The node claims `replicas` positions. If one of them is already taken by
    /// another node, the new node wins it. Adding a node that is already on
    /// the ring changes nothing.
    ///
    /// All positions are computed before the ring is touched, so on hash
    /// failure the ring is left as it was.
    pub fn add(&mut self, node: N) -> RingResult<()> {
        if self.nodes.contains(&node) {
            return Ok(());
        }

        let positions = self.vnode_positions(&node)?;
        for pos in positions {
            match self.positions.insert(pos, node.clone()) {
                Some(prev) if prev != node => {
                    warn!(position = ?pos, %node, shadowed = %prev, "ring position collision");
                    self.shadowed.entry(pos).or_default().push(prev);
                }
                _ => {}
            }
        }

        debug!(%node, replicas = self.replicas, "added node to ring");
        self.nodes.insert(node);
        Ok(())
    }

    /// Removes a node from the ring.
    ///
    /// Keys owned by the node move to the next position clockwise; no other
    /// key changes owner. Returns `false` (and does nothing) if the node is not
    /// on the ring.
    pub fn remove(&mut self, node: &N) -> RingResult<bool> {
        if !self.nodes.contains(node) {
            return Ok(false);
        }

        let positions = self.vnode_positions(node)?;
        for pos in positions {
            if self.positions.get(&pos) == Some(node) {
                self.positions.remove(&pos);
                if let Some(heir) = self.pop_shadowed(pos) {
                    self.positions.insert(pos, heir);
                }
            } else if let Some(stack) = self.shadowed.get_mut(&pos) {
                stack.retain(|n| n != node);
                if stack.is_empty() {
                    self.shadowed.remove(&pos);
                }
            }
        }

        self.nodes.remove(node);
        debug!(%node, "removed node from ring");
        Ok(true)
    }

    /// Returns the node responsible for the given key.
    ///
    /// This is the owner of the first position at or after the key's hash,
    /// or of the smallest position if the hash is past the last one.
    pub fn get<K>(&self, key: &K) -> RingResult<&N>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        if self.positions.is_empty() {
            return Err(RingError::EmptyRing);
        }

        let pos = self.position(key)?;
        self.successor(pos)
            .map(|(_, node)| node)
            .ok_or(RingError::EmptyRing)
    }

    /// Returns up to `k` distinct nodes for the given key.
    ///
    /// Nodes are collected walking clockwise from the key's position, so the
    /// first one is always the node returned by [`get()`](Self::get). Fewer
    /// than `k` nodes are returned when the ring holds fewer.
    pub fn owners<K>(&self, key: &K, k: usize) -> RingResult<Vec<&N>>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        if self.positions.is_empty() {
            return Err(RingError::EmptyRing);
        }

        let pos = self.position(key)?;
        let max_distinct = k.min(self.nodes.len());
        let mut owners = Vec::with_capacity(max_distinct);
        if max_distinct == 0 {
            return Ok(owners);
        }

        let after = self.positions.range(pos..);
        let before = self.positions.range(..pos);
        for (_, node) in after.chain(before) {
            if !owners.contains(&node) {
                owners.push(node);
                if owners.len() == max_distinct {
                    break;
                }
            }
        }

        Ok(owners)
    }

    /// Returns ring position to which a given key will be assigned.
    pub fn position<K>(&self, key: &K) -> RingResult<H::Position>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        Ok(self.hash_fn.hash(key.as_ref())?)
    }

    /// Returns the arcs of the ring owned by the given node, in ring order.
    ///
    /// Callers use these to find which keys have to move after a membership
    /// change. Whenever the node is not on the ring, `None` is returned.
    pub fn intervals(&self, node: &N) -> Option<Vec<Interval<'_, H::Position, N>>> {
        if !self.nodes.contains(node) {
            return None;
        }

        let mut prev = *self.positions.keys().next_back()?;
        let mut intervals = Vec::with_capacity(self.replicas);
        for (&pos, owner) in &self.positions {
            if owner == node {
                intervals.push(Interval::new(KeyRange::new(prev, pos), owner));
            }
            prev = pos;
        }

        Some(intervals)
    }

    /// Number of positions each node occupies.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of physical nodes on the ring.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of positions currently stored in the ring index.
    ///
    /// At most `len() * replicas()`, less when positions collided.
    pub fn vnode_count(&self) -> usize {
        self.positions.len()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    /// Iterator over the physical nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter()
    }

    /// Iterator over the ring index, in ascending position order.
    pub fn positions(&self) -> impl Iterator<Item = (&H::Position, &N)> {
        self.positions.iter()
    }

    /// Version of the ring, bumped on every membership change.
    pub fn version(&self) -> u64 {
        self.nodes.version()
    }

    pub fn hash_function(&self) -> &H {
        &self.hash_fn
    }

    /// First stored position at or after `pos`, wrapping around to the
    /// smallest one.
    fn successor(&self, pos: H::Position) -> Option<(&H::Position, &N)> {
        self.positions
            .range(pos..)
            .next()
            .or_else(|| self.positions.iter().next())
    }

    /// Positions of all virtual nodes of `node`, in replica index order.
    fn vnode_positions(&self, node: &N) -> RingResult<Vec<H::Position>> {
        (0..self.replicas)
            .map(|i| -> RingResult<H::Position> {
                let vnode = format!("{node}{i}");
                Ok(self.hash_fn.hash(vnode.as_bytes())?)
            })
            .collect()
    }

    fn pop_shadowed(&mut self, pos: H::Position) -> Option<N> {
        let stack = self.shadowed.get_mut(&pos)?;
        let heir = stack.pop();
        if stack.is_empty() {
            self.shadowed.remove(&pos);
        }
        heir
    }
}
