use super::{
    HashFunction,
    HashRing,
    LockedRing,
    Node,
    RapidHash,
    RingResult,
    SnapshotRing,
};

/// Number of positions each node occupies unless configured otherwise.
pub const DEFAULT_REPLICAS: usize = 100;

/// Hash ring builder.
///
/// Defaults to [`RapidHash`] and [`DEFAULT_REPLICAS`] positions per node.
pub struct HashRingBuilder<N: Node, H: HashFunction = RapidHash> {
    nodes: Vec<N>,
    hash_fn: H,
    replicas: usize,
}

impl<N: Node> HashRingBuilder<N> {
    /// Create new hash ring builder.
    pub fn new<I: IntoIterator<Item = N>>(init_nodes: I) -> Self {
        Self {
            nodes: init_nodes.into_iter().collect(),
            hash_fn: RapidHash,
            replicas: DEFAULT_REPLICAS,
        }
    }
}

impl<N: Node, H: HashFunction> HashRingBuilder<N, H> {
    /// Set the number of positions each node occupies on the ring.
    ///
    /// More positions smooth out the load across nodes, at the cost of a
    /// larger ring index.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Transform the builder into one with a different hash function.
    pub fn with_hash_function<CustomH: HashFunction>(
        self,
        hash_fn: CustomH,
    ) -> HashRingBuilder<N, CustomH> {
        HashRingBuilder {
            nodes: self.nodes,
            hash_fn,
            replicas: self.replicas,
        }
    }

    /// Build the ring.
    pub fn build(self) -> RingResult<HashRing<N, H>> {
        HashRing::new(self.hash_fn, self.replicas, self.nodes)
    }

    /// Build the ring behind a reader/writer lock.
    pub fn build_locked(self) -> RingResult<LockedRing<N, H>> {
        self.build().map(LockedRing::new)
    }

    /// Build the ring as an atomically swapped snapshot.
    pub fn build_snapshot(self) -> RingResult<SnapshotRing<N, H>>
    where
        H: Clone,
    {
        self.build().map(SnapshotRing::new)
    }
}
