use std::{
    collections::HashSet,
    fmt::{Debug, Display},
    hash::Hash,
};

/// Physical node that keys are routed to.
///
/// A node is an opaque, comparable and printable token, e.g. a host name or
/// an address. Its `Display` output is what gets hashed to place its virtual
/// nodes on the ring, so two nodes printing the same text land on the same
/// positions.
pub trait Node: Clone + Eq + Hash + Display + Debug + Send + Sync + 'static {}

impl<T> Node for T where T: Clone + Eq + Hash + Display + Debug + Send + Sync + 'static {}

/// Nodes collection.
///
/// Tracks the physical nodes currently registered on the ring. The ring index
/// only stores positions, so this is the authority on membership: it decides
/// whether a removal has anything to delete and reports how many nodes are
/// serving keys.
#[derive(Debug, Clone)]
pub(crate) struct Nodes<N: Node> {
    nodes: HashSet<N>,

    /// Bumped on every effective membership change.
    version: u64,
}

impl<N: Node> Default for Nodes<N> {
    fn default() -> Self {
        Self {
            nodes: HashSet::new(),
            version: 0,
        }
    }
}

impl<N: Node> Nodes<N> {
    /// Creates a new empty nodes collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the collection.
    ///
    /// Returns `true` if the node was not registered before.
    pub fn insert(&mut self, node: N) -> bool {
        let inserted = self.nodes.insert(node);
        if inserted {
            self.version += 1;
        }
        inserted
    }

    /// Removes and returns (if existed) a node from the collection.
    pub fn remove(&mut self, node: &N) -> Option<N> {
        self.nodes.take(node).inspect(|_| {
            self.version += 1;
        })
    }

    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    /// Returns the version of the collection.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of nodes in the collection.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over the nodes in the collection, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter()
    }
}
