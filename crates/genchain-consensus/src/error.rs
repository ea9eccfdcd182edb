//! Error types for consensus validation.

use thiserror::Error;

/// Consensus validation errors.
///
/// Each invariant a header can break maps to its own kind so callers can
/// react to specific failures (buffer on a missing ancestor, drop a future
/// block, punish an invalid seal).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// Parent unknown, or the timestamp does not strictly increase over it.
    #[error("unknown ancestor")]
    UnknownAncestor,

    /// Header timestamp is beyond the allowed clock slack.
    #[error("block in the future: time {time} beyond limit {limit}")]
    FutureBlock { time: String, limit: u64 },

    /// Uncle timestamp exceeds the 256-bit bound.
    #[error("timestamp too big")]
    LargeBlockTime,

    /// Height is not parent height + 1.
    #[error("invalid block number: have {have}, want {want}")]
    InvalidNumber { have: u64, want: u64 },

    /// Scalar or cumulative difficulty mismatch, or non-positive difficulty.
    #[error("invalid difficulty: have {have}, want {want}")]
    InvalidDifficulty { have: String, want: String },

    /// Gas limit outside the allowed bounds.
    #[error("invalid gas limit: have {have}, parent {parent}")]
    InvalidGasLimit { have: u64, parent: u64 },

    /// Gas used exceeds the gas limit.
    #[error("invalid gas used: have {have}, limit {limit}")]
    InvalidGasUsed { have: u64, limit: u64 },

    /// Extra data exceeds the consensus bound.
    #[error("extra-data too long: {have} > {max}")]
    ExtraDataTooLong { have: usize, max: usize },

    /// More uncles than a block may reference.
    #[error("too many uncles")]
    TooManyUncles,

    /// The same uncle was already rewarded.
    #[error("duplicate uncle")]
    DuplicateUncle,

    /// A proposed uncle is an ancestor of the including block.
    #[error("uncle is ancestor")]
    UncleIsAncestor,

    /// A proposed uncle's parent is not a recent ancestor.
    #[error("uncle's parent is not ancestor")]
    DanglingUncle,

    /// The fuzzy-hash commitment or the difficulty target check failed.
    #[error("invalid mix digest")]
    InvalidMixDigest,

    /// The difficulty parameters do not match the regime recomputation, or
    /// the fake-fail trigger fired.
    #[error("invalid proof-of-work")]
    InvalidPoW,

    /// Extra data contradicts the configured DAO fork side.
    #[error("dao extra-data mismatch at block {number}")]
    DaoExtraMismatch { number: u64 },

    /// Header hash contradicts a pinned canonical fork hash.
    #[error("fork hash mismatch at block {number}: have {have}, want {want}")]
    ForkHashMismatch {
        number: u64,
        have: String,
        want: String,
    },
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
