/// An arc of the ring, bounded exclusively below and inclusively above.
///
/// A key belongs to the first position at or after its hash, so every stored
/// position owns the keys strictly after its predecessor, up to and including
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRange<P> {
    /// `(start, end]` with `start < end`.
    Bounded(P, P),

    /// `(start, MAX] ∪ [MIN, end]`, the arc crossing the top of the ring.
    Wrapping(P, P),

    /// The whole ring, owned by a single position.
    Full,
}

impl<P: Copy + Ord> KeyRange<P> {
    /// Creates the range owned by `end`, whose predecessor on the ring is
    /// `start`.
    pub(crate) fn new(start: P, end: P) -> Self {
        match start.cmp(&end) {
            std::cmp::Ordering::Less => KeyRange::Bounded(start, end),
            std::cmp::Ordering::Greater => KeyRange::Wrapping(start, end),
            std::cmp::Ordering::Equal => KeyRange::Full,
        }
    }

    /// Check if the given position is in the range.
    ///
    /// Note not the key itself, but the hash of the key provides the position
    /// on the ring.
    pub fn contains(&self, position: P) -> bool {
        match *self {
            KeyRange::Bounded(start, end) => position > start && position <= end,
            KeyRange::Wrapping(start, end) => position > start || position <= end,
            KeyRange::Full => true,
        }
    }
}

/// A ring arc together with the node that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<'a, P, N> {
    key_range: KeyRange<P>,
    node: &'a N,
}

impl<'a, P, N> Interval<'a, P, N> {
    pub(crate) fn new(key_range: KeyRange<P>, node: &'a N) -> Self {
        Self { key_range, node }
    }

    /// Returns the key range of the interval.
    pub fn key_range(&self) -> &KeyRange<P> {
        &self.key_range
    }

    /// Returns the node responsible for the interval.
    pub fn node(&self) -> &'a N {
        self.node
    }
}
