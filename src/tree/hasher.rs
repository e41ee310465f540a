//! Hash computation for staged entries using BLAKE3

use crate::tree::path::TreePath;
use crate::types::Hash;
use blake3::Hasher;
use rs_merkle::MerkleTree;

/// State root of a tree with no files
pub const EMPTY_STATE_ROOT: Hash = [0u8; 32];

/// BLAKE3 adapter for `rs_merkle`
#[derive(Clone)]
pub struct Blake3Algorithm;

impl rs_merkle::Hasher for Blake3Algorithm {
    type Hash = Hash;

    fn hash(data: &[u8]) -> Hash {
        *blake3::hash(data).as_bytes()
    }
}

/// Compute content hash from raw bytes
pub fn compute_content_hash(content: &[u8]) -> Hash {
    *blake3::hash(content).as_bytes()
}

/// Compute the leaf hash for a single file
///
/// leaf = hash("file" || path_len || path || content_hash)
pub fn compute_entry_hash(path: &TreePath, content_hash: &Hash) -> Hash {
    let path_bytes = path.as_str().as_bytes();

    let mut hasher = Hasher::new();
    hasher.update(b"file");
    // Path length, big-endian for determinism
    hasher.update(&(path_bytes.len() as u64).to_be_bytes());
    hasher.update(path_bytes);
    hasher.update(content_hash);

    *hasher.finalize().as_bytes()
}

/// Compute the Merkle root over `(path, content_hash)` leaves
///
/// Leaves must already be in ascending path order; callers pass the output of
/// an ordered traversal.
pub fn compute_state_root<'a, I>(entries: I) -> Hash
where
    I: IntoIterator<Item = (&'a TreePath, Hash)>,
{
    let leaves: Vec<Hash> = entries
        .into_iter()
        .map(|(path, content_hash)| compute_entry_hash(path, &content_hash))
        .collect();

    if leaves.is_empty() {
        return EMPTY_STATE_ROOT;
    }

    MerkleTree::<Blake3Algorithm>::from_leaves(&leaves)
        .root()
        .unwrap_or(EMPTY_STATE_ROOT)
}
