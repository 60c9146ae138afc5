use {
    hashring::{
        DEFAULT_REPLICAS,
        HashRing,
        HashRingBuilder,
        Md5Hash,
        Position,
        RapidHash,
        RingError,
    },
    std::collections::HashMap,
};

const REFERENCE_KEYS: [&str; 5] = [
    "-84942321036308",
    "-76029520310209",
    "-68343931116147",
    "-54921760962352",
    "12342134134",
];

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key{}", i)).collect()
}

fn nodes(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("node{}", i)).collect()
}

fn assignments<H: hashring::HashFunction>(
    ring: &HashRing<String, H>,
    keys: &[String],
) -> Vec<String> {
    keys.iter().map(|key| ring.get(key).unwrap().clone()).collect()
}

#[test]
fn hash_ring_builder() {
    let init_nodes = nodes(3);

    {
        // Default ring (RapidHash + DEFAULT_REPLICAS)
        let ring = HashRingBuilder::new(init_nodes.clone()).build().unwrap();
        assert_eq!(ring.replicas(), DEFAULT_REPLICAS);
        assert_eq!(ring.len(), 3);
        assert!(ring.vnode_count() <= 3 * DEFAULT_REPLICAS);

        let ring = HashRingBuilder::new(init_nodes.clone())
            .with_replicas(0)
            .build();
        assert_eq!(ring.err(), Some(RingError::InvalidReplicas(0)));
    }

    {
        // Custom hash function and replica count, in either order
        let first = HashRingBuilder::new(init_nodes.clone())
            .with_hash_function(Md5Hash)
            .with_replicas(16)
            .build()
            .unwrap();
        let second = HashRingBuilder::new(init_nodes.clone())
            .with_replicas(16)
            .with_hash_function(Md5Hash)
            .build()
            .unwrap();
        assert_eq!(first.replicas(), 16);
        assert!(first.positions().eq(second.positions()));
    }

    {
        // Empty node set is fine until the first lookup
        let ring = HashRingBuilder::<String>::new([]).build().unwrap();
        assert!(ring.is_empty());
        assert_eq!(ring.get("key"), Err(RingError::EmptyRing));
    }
}

#[test]
fn reference_assignments() {
    let ring = HashRing::new(Md5Hash, 100, ["redis1", "redis2", "redis3", "redis4"]).unwrap();
    let expected = ["redis1", "redis4", "redis1", "redis2", "redis3"];
    for (key, node) in REFERENCE_KEYS.iter().zip(expected) {
        assert_eq!(ring.get(key), Ok(&node), "key {key}");
    }

    let ring = HashRing::new(Md5Hash, 100, ["A", "B", "C", "D"]).unwrap();
    let expected = ["B", "A", "A", "B", "A"];
    for (key, node) in REFERENCE_KEYS.iter().zip(expected) {
        assert_eq!(ring.get(key), Ok(&node), "key {key}");
    }
}

#[test]
fn deterministic_lookups() {
    let keys = keys(5_000);

    let first = HashRing::new(RapidHash, 64, nodes(8)).unwrap();
    let second = HashRing::new(RapidHash, 64, nodes(8)).unwrap();
    let assigned = assignments(&first, &keys);
    assert_eq!(assigned, assignments(&first, &keys));
    assert_eq!(assigned, assignments(&second, &keys));

    // Insertion order does not matter without collisions.
    let mut reversed = nodes(8);
    reversed.reverse();
    let third = HashRing::new(RapidHash, 64, reversed).unwrap();
    assert_eq!(assigned, assignments(&third, &keys));
}

#[test]
fn lookups_hit_registered_nodes() {
    let mut ring = HashRing::new(RapidHash, 32, nodes(5)).unwrap();
    ring.add("node7".to_string()).unwrap();
    ring.remove(&"node2".to_string()).unwrap();
    ring.remove(&"node4".to_string()).unwrap();

    for key in keys(2_000) {
        let node = ring.get(&key).unwrap();
        assert!(ring.contains(node));
        assert!(["node0", "node1", "node3", "node7"].contains(&node.as_str()));
    }
}

#[test]
fn bounded_remapping_on_join() {
    let keys = keys(20_000);
    let mut ring = HashRing::new(Md5Hash, 100, nodes(10)).unwrap();
    let before = assignments(&ring, &keys);

    ring.add("node10".to_string()).unwrap();
    let after = assignments(&ring, &keys);

    let mut moved = 0;
    for (old, new) in before.iter().zip(&after) {
        if old != new {
            assert_eq!(new, "node10", "key moved to a node other than the new one");
            moved += 1;
        }
    }

    // Roughly 1/11 of the keys move.
    let fraction = moved as f64 / keys.len() as f64;
    assert!(fraction > 0.04 && fraction < 0.16, "moved fraction: {fraction}");
}

#[test]
fn bounded_remapping_on_leave() {
    let keys = keys(20_000);
    let mut ring = HashRing::new(Md5Hash, 100, nodes(10)).unwrap();
    let before = assignments(&ring, &keys);

    assert_eq!(ring.remove(&"node3".to_string()), Ok(true));
    let after = assignments(&ring, &keys);

    for (old, new) in before.iter().zip(&after) {
        if old == "node3" {
            assert_ne!(new, "node3");
        } else {
            assert_eq!(old, new, "key of a remaining node moved");
        }
    }

    // Joining again restores the previous layout.
    ring.add("node3".to_string()).unwrap();
    assert_eq!(assignments(&ring, &keys), before);
}

#[test]
fn bounded_remapping_property_rapidhash() {
    let keys = keys(10_000);
    let mut ring = HashRing::new(RapidHash, 50, nodes(6)).unwrap();
    let before = assignments(&ring, &keys);

    ring.add("node6".to_string()).unwrap();
    let joined = assignments(&ring, &keys);
    for (old, new) in before.iter().zip(&joined) {
        assert!(old == new || new == "node6");
    }

    ring.remove(&"node6".to_string()).unwrap();
    assert_eq!(assignments(&ring, &keys), before);
}

#[test]
fn wraps_to_smallest_position() {
    let ring = HashRing::new(Md5Hash, 100, ["A", "B", "C", "D"]).unwrap();
    let (&smallest, first_owner) = ring.positions().next().unwrap();
    let largest: Position<Md5Hash> = *ring.positions().last().unwrap().0;
    assert_eq!((smallest, *first_owner), (-2140637753, "B"));
    assert_eq!(largest, 2133232920);

    // "key497" hashes above every stored position.
    assert_eq!(ring.position("key497"), Ok(2143445788));
    assert_eq!(ring.get("key497"), Ok(&"B"));
}

#[test]
fn load_balance() {
    let keys = keys(20_000);
    let ring = HashRing::new(Md5Hash, 100, nodes(10)).unwrap();

    let mut counts = HashMap::<String, usize>::new();
    for node in assignments(&ring, &keys) {
        *counts.entry(node).or_default() += 1;
    }
    assert_eq!(counts.len(), 10);

    // Every node is within 20% of the mean.
    let mean = keys.len() / 10;
    for (node, count) in counts {
        assert!(
            count > mean * 8 / 10 && count < mean * 12 / 10,
            "{node} owns {count} keys"
        );
    }
}

#[test]
fn intervals_cover_the_ring() {
    let ring = HashRing::new(RapidHash, 20, nodes(4)).unwrap();

    let total = nodes(4)
        .iter()
        .map(|node| ring.intervals(node).unwrap().len())
        .sum::<usize>();
    assert_eq!(total, ring.vnode_count());

    for key in keys(1_000) {
        let owner = ring.get(&key).unwrap();
        let pos = ring.position(&key).unwrap();
        let intervals = ring.intervals(owner).unwrap();
        assert!(intervals.iter().any(|i| i.key_range().contains(pos)));
    }
}

#[test]
fn owners_are_distinct() {
    let ring = HashRing::new(RapidHash, 50, nodes(5)).unwrap();
    for key in keys(500) {
        let owners = ring.owners(&key, 3).unwrap();
        assert_eq!(owners.len(), 3);
        assert_eq!(owners[0], ring.get(&key).unwrap());
        assert!(owners[0] != owners[1] && owners[1] != owners[2] && owners[0] != owners[2]);
    }
}
