use {
    crate::HashFunctionError,
    auto_impl::auto_impl,
    std::fmt::Debug,
};

/// Digest used to place both virtual nodes and lookup keys on the ring.
///
/// The function must be deterministic: the ring hashes node positions at
/// insertion time and keys at lookup time, and both must agree on the same
/// coordinate space. A uniform distribution over `Position` is not required
/// for correctness, but the fewer collisions it produces, the better the load
/// balance across nodes.
#[auto_impl(&, Box, Arc)]
pub trait HashFunction: Send + Sync {
    /// Fixed-width integer the digest is reduced to.
    type Position: Copy + Ord + Debug + Send + Sync + 'static;

    /// Digests `input` into a ring position.
    fn hash(&self, input: &[u8]) -> Result<Self::Position, HashFunctionError>;
}

/// MD5 digest reduced to a signed 32-bit position.
///
/// The 128-bit digest is read as a big-endian two's-complement integer and
/// truncated to its low-order 32 bits, so the position is taken from the last
/// four bytes of the digest.
#[derive(Debug, Default, Clone, Copy)]
pub struct Md5Hash;

impl HashFunction for Md5Hash {
    type Position = i32;

    fn hash(&self, input: &[u8]) -> Result<i32, HashFunctionError> {
        let digest = md5::compute(input);
        let mut low = [0u8; 4];
        low.copy_from_slice(&digest[12..16]);
        Ok(i32::from_be_bytes(low))
    }
}

/// Default hash function of the ring.
///
/// Uses rapidhash with its default seed and secrets, so the output is
/// portable across platforms and releases.
#[derive(Debug, Default, Clone, Copy)]
pub struct RapidHash;

impl HashFunction for RapidHash {
    type Position = u64;

    fn hash(&self, input: &[u8]) -> Result<u64, HashFunctionError> {
        Ok(rapidhash::rapidhash(input))
    }
}
