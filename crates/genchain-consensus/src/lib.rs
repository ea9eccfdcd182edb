//! # genchain-consensus
//!
//! The Genchain proof-of-work consensus engine.
//!
//! This crate decides whether a proposed header is legal relative to its
//! parent and the active fork rules, and it mutates world state with block
//! rewards at finalization. It provides:
//!
//! - The two-regime custom difficulty adjustment over the `(n, p)` pair
//!   (Lake twelve-block window before the Sea fork, single-block after)
//!   plus the classical scalar difficulty rules
//! - Header, uncle, and seal verification, single or batched across a
//!   worker pool with strictly ordered results
//! - The fuzzy-matrix proof-of-work construction and its zero-digit target
//!   check
//! - Reward accumulation to the miner, uncles, and the ecosystem fund,
//!   with epoch halving and a hard supply cap
//!
//! Everything in here is consensus-critical: two nodes disagreeing on any
//! output of this crate will fork the network.

mod batch;
mod chain;
mod chain_params;
mod difficulty;
mod engine;
mod error;
pub mod fmatrix;
mod forks;
mod pow;
mod rewards;
mod scalar_difficulty;
mod validation;

pub use batch::AbortHandle;
pub use chain::{ChainReader, MemoryChain};
pub use chain_params::{
    ChainConfig, ALLOWED_FUTURE_BLOCK_TIME_SECS, COIN, DAO_FORK_EXTRA, DAO_FORK_EXTRA_RANGE,
    DIFFICULTY_BOUND_DIVISOR, DURATION_LIMIT, EXP_DIFF_PERIOD, GAS_LIMIT_BOUND_DIVISOR,
    GEN_BLOCK_ECO_REWARD, GEN_BLOCK_REWARD, GEN_BLOCK_UNCLE_REWARD, HALVING_BOUNDARIES,
    INITIAL_N, INITIAL_P, MAXIMUM_EXTRA_DATA_SIZE, MAX_UNCLES, MINIMUM_DIFFICULTY,
    MIN_GAS_LIMIT, P_CEILING, TOTAL_COIN, UNCLE_GENERATION_WINDOW,
};
pub use difficulty::{
    block_contribution, calc_np, calc_np_sea, lake_tuple, sea_tuple, verify_tuple,
    DifficultyTuple, LAKE_DEFAULT_TIMESPAN, LAKE_WINDOW, SEA_DEFAULT_TIMESPAN,
};
pub use engine::{Engine, GenPow, PowMode};
pub use error::{ConsensusError, ConsensusResult};
pub use forks::{verify_dao_extra, verify_fork_hashes};
pub use pow::{compare_diff, gen_hash};
pub use rewards::{
    accumulate_rewards, reward_base, supply_cap, RewardBase, ECOSYSTEM_ADDRESSES,
};
pub use scalar_difficulty::calc_difficulty;
pub use validation::check_header_rules;
