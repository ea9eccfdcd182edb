//! Consensus constants and the per-chain fork configuration.

use genchain_types::Hash32;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Initial and floor value of the matrix dimension parameter `n`.
pub const INITIAL_N: u64 = 2;

/// Initial and floor value of the zero-digit parameter `p`.
pub const INITIAL_P: u64 = 2;

/// Hard ceiling on `p`. Above it the adjustment tables switch to their
/// mirrored form and `p` freezes.
pub const P_CEILING: u64 = 256;

/// Divisor bounding how fast the scalar difficulty may move per block.
pub const DIFFICULTY_BOUND_DIVISOR: u64 = 2048;

/// Floor of the scalar difficulty.
pub const MINIMUM_DIFFICULTY: u64 = 131_072;

/// Divisor bounding how fast the gas limit may move per block.
pub const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Minimum gas limit of any block.
pub const MIN_GAS_LIMIT: u64 = 5_000;

/// Maximum byte length of a header's extra data.
pub const MAXIMUM_EXTRA_DATA_SIZE: usize = 32;

/// Timespan threshold of the Frontier difficulty rule, in seconds.
pub const DURATION_LIMIT: u64 = 13;

/// Period of the exponential difficulty term, in blocks.
pub const EXP_DIFF_PERIOD: u64 = 100_000;

/// Maximum number of uncles a single block may reference.
pub const MAX_UNCLES: usize = 5;

/// How many generations back an uncle's parent may sit.
pub const UNCLE_GENERATION_WINDOW: u64 = 7;

/// Clock slack granted to incoming headers, in seconds.
pub const ALLOWED_FUTURE_BLOCK_TIME_SECS: u64 = 12;

/// Base miner reward per block, in wei.
pub const GEN_BLOCK_REWARD: u64 = 450_000_000_000_000_000;

/// Base reward per referenced uncle, in wei.
pub const GEN_BLOCK_UNCLE_REWARD: u64 = 50_000_000_000_000_000;

/// Base reward per ecosystem address per block, in wei.
pub const GEN_BLOCK_ECO_REWARD: u64 = 1_000_000_000_000_000;

/// Total issuance cap, in whole coins.
pub const TOTAL_COIN: u64 = 13_300_000;

/// Wei per whole coin.
pub const COIN: u64 = 1_000_000_000_000_000_000;

/// Block heights at which every base reward halves. Past the last entry the
/// shift saturates at seven.
pub const HALVING_BOUNDARIES: [u64; 7] = [
    3_153_600,
    9_460_800,
    22_075_200,
    47_304_000,
    97_761_600,
    198_676_800,
    400_507_200,
];

/// Marker extra data carried by blocks on the pro-fork side of the DAO
/// window.
pub const DAO_FORK_EXTRA: &[u8] = b"dao-hard-fork";

/// Number of blocks from the DAO fork height over which the extra-data
/// marker is enforced.
pub const DAO_FORK_EXTRA_RANGE: u64 = 10;

/// Which fork rules apply at which block height.
///
/// Heights are deployment configuration loaded from the node's chain spec;
/// the library ships no built-in schedule. `None` means the fork never
/// activates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Homestead difficulty rules from this height.
    #[serde(default)]
    pub homestead_block: Option<u64>,

    /// DAO fork height, if the chain observes it.
    #[serde(default)]
    pub dao_fork_block: Option<u64>,

    /// Whether this chain follows the pro-fork side of the DAO window.
    #[serde(default)]
    pub dao_fork_support: bool,

    /// EIP-158 empty-account rules from this height.
    #[serde(default)]
    pub eip158_block: Option<u64>,

    /// Byzantium difficulty rules from this height.
    #[serde(default)]
    pub byzantium_block: Option<u64>,

    /// Sea difficulty regime from this height; before it the Lake regime
    /// applies.
    #[serde(default)]
    pub sea_fork_block: Option<u64>,

    /// Canonical header hashes pinned at specific heights.
    #[serde(default)]
    pub fork_hashes: BTreeMap<u64, Hash32>,
}

impl ChainConfig {
    /// Whether Homestead rules are active at `number`.
    pub fn is_homestead(&self, number: u64) -> bool {
        active(self.homestead_block, number)
    }

    /// Whether Byzantium rules are active at `number`.
    pub fn is_byzantium(&self, number: u64) -> bool {
        active(self.byzantium_block, number)
    }

    /// Whether EIP-158 is active at `number`.
    pub fn is_eip158(&self, number: u64) -> bool {
        active(self.eip158_block, number)
    }

    /// Whether the Sea difficulty regime is active at `number`.
    pub fn is_seafork(&self, number: u64) -> bool {
        active(self.sea_fork_block, number)
    }
}

fn active(fork: Option<u64>, number: u64) -> bool {
    fork.map_or(false, |height| number >= height)
}
