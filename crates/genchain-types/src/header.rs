//! The block header and its canonical digests.

use crate::{blake2b256, uncles_digest, Address, Hash32};
use num_bigint::BigUint;

/// Magic prefix of the canonical header encoding.
const HEADER_MAGIC: &[u8; 4] = b"GENH";

/// Version of the canonical header encoding.
const HEADER_ENCODING_VERSION: u32 = 1;

/// A block header.
///
/// Beyond the usual chain fields, headers carry the custom difficulty
/// tuple: `n` and `p` are this block's parameters, `nn` and `pp` the
/// parent's, `alpha` the timespan the adjustment was derived from, and `np`
/// the cumulative chain difficulty. `rewards` accumulates every coin issued
/// up to and including this block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Hash of the parent block.
    pub parent_hash: Hash32,
    /// Digest over the uncle list.
    pub uncle_hash: Hash32,
    /// Beneficiary of the block reward.
    pub coinbase: Address,
    /// Post-state root, set at finalization.
    pub root: Hash32,
    /// Block height.
    pub number: u64,
    /// Seconds since epoch. Kept as a big integer so the relaxed uncle
    /// timestamp bound stays meaningful.
    pub time: BigUint,
    /// Scalar difficulty.
    pub difficulty: BigUint,
    /// Gas ceiling of the block.
    pub gas_limit: u64,
    /// Gas consumed by the block.
    pub gas_used: u64,
    /// Arbitrary extra data, bounded by consensus.
    pub extra: Vec<u8>,
    /// Proof-of-work seed.
    pub nonce: u64,
    /// Commitment to the matrix proof-of-work intermediate.
    pub fuzzy_hash: Hash32,
    /// Matrix dimension parameter of this block.
    pub n: u64,
    /// Zero-digit parameter of this block.
    pub p: u64,
    /// Parent's `n`.
    pub nn: u64,
    /// Parent's `p`.
    pub pp: u64,
    /// Timespan the difficulty adjustment observed, stored for stateless
    /// re-verification.
    pub alpha: u64,
    /// Cumulative chain difficulty up to and including this block.
    pub np: BigUint,
    /// Cumulative coin issued up to and including this block.
    pub rewards: BigUint,
}

impl Header {
    /// Full canonical digest, sealing fields included.
    pub fn hash(&self) -> Hash32 {
        blake2b256(&self.encode(true))
    }

    /// Digest over everything except the sealing fields (`nonce`,
    /// `fuzzy_hash`). This is the preimage the proof of work commits to.
    pub fn seal_hash(&self) -> Hash32 {
        blake2b256(&self.encode(false))
    }

    /// Stable binary encoding. Fixed-width fields are big-endian;
    /// variable-width fields carry a 4-byte length prefix.
    fn encode(&self, include_seal: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.extra.len());

        out.extend_from_slice(HEADER_MAGIC);
        out.extend_from_slice(&HEADER_ENCODING_VERSION.to_be_bytes());

        out.extend_from_slice(self.parent_hash.as_bytes());
        out.extend_from_slice(self.uncle_hash.as_bytes());
        out.extend_from_slice(self.coinbase.as_bytes());
        out.extend_from_slice(self.root.as_bytes());
        out.extend_from_slice(&self.number.to_be_bytes());
        put_biguint(&mut out, &self.time);
        put_biguint(&mut out, &self.difficulty);
        out.extend_from_slice(&self.gas_limit.to_be_bytes());
        out.extend_from_slice(&self.gas_used.to_be_bytes());
        put_bytes(&mut out, &self.extra);
        out.extend_from_slice(&self.n.to_be_bytes());
        out.extend_from_slice(&self.p.to_be_bytes());
        out.extend_from_slice(&self.nn.to_be_bytes());
        out.extend_from_slice(&self.pp.to_be_bytes());
        out.extend_from_slice(&self.alpha.to_be_bytes());
        put_biguint(&mut out, &self.np);
        put_biguint(&mut out, &self.rewards);

        if include_seal {
            out.extend_from_slice(&self.nonce.to_be_bytes());
            out.extend_from_slice(self.fuzzy_hash.as_bytes());
        }
        out
    }
}

/// Digest of the empty uncle list.
pub fn empty_uncle_hash() -> Hash32 {
    uncles_digest(&[])
}

fn put_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
}

fn put_biguint(out: &mut Vec<u8>, value: &BigUint) {
    put_bytes(out, &value.to_bytes_be());
}
