//! Concurrent access to the ring.
//!
//! [`HashRing`](crate::HashRing) itself is a plain data structure. Two
//! wrappers make it shareable between threads:
//!
//! - [`LockedRing`] guards the ring with a reader/writer lock. Lookups run in
//!   parallel, mutations are exclusive and block lookups while they run.
//! - [`SnapshotRing`] publishes immutable ring snapshots through an atomic
//!   pointer. Lookups never lock; mutations copy the ring, apply the change and
//!   publish it with compare-and-swap, retrying when another writer got there
//!   first.
//!
//! Under both, a reader sees either all or none of a node's positions.

mod locked;
mod snapshot;

pub use {
    locked::LockedRing,
    snapshot::{Snapshot, SnapshotCell, SnapshotMap, SnapshotRing},
};
