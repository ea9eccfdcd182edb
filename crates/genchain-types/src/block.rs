//! Block assembly: header plus body.

use crate::{blake2b256, Blake2b256, Hash32, Header};
use blake2::Digest;

/// An opaque transaction as seen by the consensus layer. The engine never
/// looks inside; it only commits to the payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    /// Serialized transaction payload.
    pub payload: Vec<u8>,
}

impl Transaction {
    /// Digest of the payload.
    pub fn hash(&self) -> Hash32 {
        blake2b256(&self.payload)
    }
}

/// An execution receipt. Opaque to the engine apart from its digest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Receipt {
    /// Execution status code.
    pub status: u64,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
}

impl Receipt {
    /// Digest of the receipt.
    pub fn hash(&self) -> Hash32 {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.status.to_be_bytes());
        out[8..].copy_from_slice(&self.gas_used.to_be_bytes());
        blake2b256(&out)
    }
}

/// Digest over an ordered uncle list.
pub fn uncles_digest(uncles: &[Header]) -> Hash32 {
    let mut hasher = Blake2b256::new();
    hasher.update(b"uncles");
    hasher.update((uncles.len() as u32).to_be_bytes());
    for uncle in uncles {
        hasher.update(uncle.hash().as_bytes());
    }
    Hash32(hasher.finalize().into())
}

/// Digest over an ordered transaction list.
pub fn transactions_digest(transactions: &[Transaction]) -> Hash32 {
    let mut hasher = Blake2b256::new();
    hasher.update(b"txns");
    hasher.update((transactions.len() as u32).to_be_bytes());
    for tx in transactions {
        hasher.update(tx.hash().as_bytes());
    }
    Hash32(hasher.finalize().into())
}

/// Digest over an ordered receipt list.
pub fn receipts_digest(receipts: &[Receipt]) -> Hash32 {
    let mut hasher = Blake2b256::new();
    hasher.update(b"receipts");
    hasher.update((receipts.len() as u32).to_be_bytes());
    for receipt in receipts {
        hasher.update(receipt.hash().as_bytes());
    }
    Hash32(hasher.finalize().into())
}

/// A complete block: header, transactions, and referenced uncles, plus the
/// body commitments derived at assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    header: Header,
    transactions: Vec<Transaction>,
    uncles: Vec<Header>,
    transactions_digest: Hash32,
    receipts_digest: Hash32,
}

impl Block {
    /// Assemble a block. The uncle digest is recomputed into the header
    /// and the transaction and receipt digests are derived from the body,
    /// so a block can never disagree with its own commitments.
    pub fn new(
        mut header: Header,
        transactions: Vec<Transaction>,
        uncles: Vec<Header>,
        receipts: &[Receipt],
    ) -> Self {
        header.uncle_hash = uncles_digest(&uncles);
        let transactions_digest = transactions_digest(&transactions);
        let receipts_digest = receipts_digest(receipts);
        Self {
            header,
            transactions,
            uncles,
            transactions_digest,
            receipts_digest,
        }
    }

    /// The block's full digest.
    pub fn hash(&self) -> Hash32 {
        self.header.hash()
    }

    /// Block height.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Hash of the parent block.
    pub fn parent_hash(&self) -> Hash32 {
        self.header.parent_hash
    }

    /// Borrow the header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Borrow the transactions.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Borrow the uncle headers.
    pub fn uncles(&self) -> &[Header] {
        &self.uncles
    }

    /// Commitment over the transaction list.
    pub fn transactions_digest(&self) -> Hash32 {
        self.transactions_digest
    }

    /// Commitment over the receipt list.
    pub fn receipts_digest(&self) -> Hash32 {
        self.receipts_digest
    }
}
