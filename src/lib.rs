//! Consistent hashing ring.
//!
//! Maps arbitrary keys onto a dynamic set of nodes so that adding or removing
//! a node only moves the keys adjacent to that node's positions on the ring.
//! Each physical node occupies several positions (virtual nodes) to even out
//! the load.
//!
//! ```
//! use hashring::{HashRingBuilder, Md5Hash};
//!
//! let mut ring = HashRingBuilder::new(["redis1", "redis2", "redis3", "redis4"])
//!     .with_hash_function(Md5Hash)
//!     .with_replicas(100)
//!     .build()
//!     .unwrap();
//! assert_eq!(ring.get("12342134134"), Ok(&"redis3"));
//!
//! ring.remove(&"redis3").unwrap();
//! assert_ne!(ring.get("12342134134"), Ok(&"redis3"));
//! ```
//!
//! The ring is a plain data structure; see [`LockedRing`] and
//! [`SnapshotRing`] for sharing it between threads.

mod builder;
mod error;
mod hash;
mod interval;
mod node;
mod ring;
pub mod sync;

pub use {
    builder::{DEFAULT_REPLICAS, HashRingBuilder},
    error::{HashFunctionError, RingError, RingResult},
    hash::{HashFunction, Md5Hash, RapidHash},
    interval::{Interval, KeyRange},
    node::Node,
    ring::{HashRing, Position},
    sync::{LockedRing, SnapshotCell, SnapshotMap, SnapshotRing},
};
