#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RingError {
    /// No nodes are registered, so no key can be routed.
    #[error("Empty ring")]
    EmptyRing,

    /// Every node must occupy at least one position on the ring.
    #[error("Invalid replica count: {0}")]
    InvalidReplicas(usize),

    /// Hash function failed to digest its input.
    #[error(transparent)]
    HashFunction(#[from] HashFunctionError),
}

/// Failure reported by a [`HashFunction`](crate::HashFunction).
///
/// Hashing is expected to be pure and infallible in normal operation, so this
/// signals a configuration or environment fault rather than a ring-logic one.
/// The ring never retries on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Hash function failed: {0}")]
pub struct HashFunctionError(String);

impl HashFunctionError {
    /// Creates a new error with the given description.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// Returns the description of the failure.
    pub fn reason(&self) -> &str {
        &self.0
    }
}

pub type RingResult<T> = Result<T, RingError>;
