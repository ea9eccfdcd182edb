//! # genchain-types
//!
//! Chain primitives shared between the Genchain consensus engine and the
//! surrounding node:
//!
//! - Fixed-width [`Hash32`] digests and 20-byte [`Address`]es
//! - The block [`Header`] with the chain's custom difficulty carrier fields
//!   (`n`, `p`, `nn`, `pp`, `alpha`, `np`) and its canonical digests
//! - [`Block`] assembly from a header plus body
//! - The minimal world-state surface ([`StateAccess`]) consumed by block
//!   finalization, with [`MemoryState`] as the in-memory implementation

mod block;
mod hash;
mod header;
mod state;

pub use block::{
    receipts_digest, transactions_digest, uncles_digest, Block, Receipt, Transaction,
};
pub use hash::{Address, Hash32, HexParseError};
pub use header::{empty_uncle_hash, Header};
pub use state::{MemoryState, StateAccess};

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

/// Blake2b with a 256-bit output, the digest used for every chain commitment.
pub type Blake2b256 = Blake2b<U32>;

/// Convenience one-shot Blake2b-256.
pub fn blake2b256(data: &[u8]) -> Hash32 {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    Hash32(hasher.finalize().into())
}
