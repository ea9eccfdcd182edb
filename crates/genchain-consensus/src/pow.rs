//! The proof-of-work hash construction and its difficulty target check.
//!
//! `gen_hash` is the fixed function every node must agree on: it expands
//! the header's seal hash and nonce into a pair of fuzzy matrices, takes
//! their fuzzy product, and digests the rendered result twice — once for
//! the fuzzy-hash commitment stored in the header, once for the value
//! measured against the difficulty target.

use crate::fmatrix::{get_element, int_to_frac, u64_to_bytes, Matrix};
use genchain_types::{blake2b256, Hash32};

/// Run the fuzzy-matrix hash construction.
///
/// Returns `(fhash, rendering, hash256)`: the fuzzy-hash commitment, the
/// rendered matrix string it was derived from, and the target-checked
/// digest.
pub fn gen_hash(seal_hash: &Hash32, nonce: u64, p: u64, n: u64) -> (Hash32, String, Hash32) {
    let dim = n as usize;
    let hash_bytes = seal_hash.as_bytes();

    let mut generated = Matrix::zeros(dim, dim);
    let mut committed = Matrix::zeros(dim, dim);
    for row in 1..=dim {
        for col in 1..=dim {
            generated.set(
                row,
                col,
                get_element(n as i64, p as i64, nonce, row as i64, col as i64),
            );
            let byte = hash_bytes[((row - 1) * dim + (col - 1)) % hash_bytes.len()];
            committed.set(row, col, int_to_frac(byte as i64, 1));
        }
    }

    let product = Matrix::fuzzy_multiply(&generated, &committed);
    let rendering = product.digest_string();
    let fhash = blake2b256(rendering.as_bytes());

    let mut seed = Vec::with_capacity(32 + 8 + 32);
    seed.extend_from_slice(fhash.as_bytes());
    seed.extend_from_slice(&u64_to_bytes(nonce));
    seed.extend_from_slice(hash_bytes);
    let hash256 = blake2b256(&seed);

    (fhash, rendering, hash256)
}

/// Whether `hash256` meets the target: its big-endian hex rendering must
/// open with at least `p` zero digits.
pub fn compare_diff(hash256: &Hash32, p: u64) -> bool {
    let digits = hex::encode(hash256.as_bytes());
    if p as usize > digits.len() {
        return false;
    }
    digits.bytes().take(p as usize).all(|d| d == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_hash_is_deterministic() {
        let seal = Hash32([0x5a; 32]);
        let a = gen_hash(&seal, 42, 2, 2);
        let b = gen_hash(&seal, 42, 2, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn gen_hash_depends_on_every_input() {
        let seal = Hash32([0x5a; 32]);
        let base = gen_hash(&seal, 42, 2, 2);

        assert_ne!(gen_hash(&seal, 43, 2, 2).2, base.2);
        assert_ne!(gen_hash(&seal, 42, 3, 2).2, base.2);
        assert_ne!(gen_hash(&seal, 42, 2, 3).2, base.2);
        assert_ne!(gen_hash(&Hash32([0x5b; 32]), 42, 2, 2).2, base.2);
    }

    #[test]
    fn commitment_and_target_digests_differ() {
        let (fhash, rendering, hash256) = gen_hash(&Hash32([7; 32]), 1, 2, 2);
        assert_ne!(fhash, hash256);
        assert!(!rendering.is_empty());
        assert_eq!(fhash, genchain_types::blake2b256(rendering.as_bytes()));
    }

    #[test]
    fn compare_diff_counts_leading_zero_digits() {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0x00;
        bytes[1] = 0x0f;
        let hash = Hash32(bytes);

        // hex opens with "000f..."
        assert!(compare_diff(&hash, 0));
        assert!(compare_diff(&hash, 1));
        assert!(compare_diff(&hash, 2));
        assert!(compare_diff(&hash, 3));
        assert!(!compare_diff(&hash, 4));
    }

    #[test]
    fn compare_diff_beyond_digest_width_fails() {
        assert!(compare_diff(&Hash32([0; 32]), 64));
        assert!(!compare_diff(&Hash32([0; 32]), 65));
    }
}
