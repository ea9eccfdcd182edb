//! Header validation against a parent: the stateless consensus invariants
//! every imported header must satisfy, in their canonical order.

use crate::chain_params::{
    ChainConfig, ALLOWED_FUTURE_BLOCK_TIME_SECS, GAS_LIMIT_BOUND_DIVISOR,
    MAXIMUM_EXTRA_DATA_SIZE, MIN_GAS_LIMIT,
};
use crate::difficulty::{verify_contribution, verify_tuple};
use crate::scalar_difficulty::calc_difficulty;
use crate::{ConsensusError, ConsensusResult};
use genchain_types::Header;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

/// Gas limit ceiling (`2^63 - 1`).
const GAS_LIMIT_CAP: u64 = 0x7fff_ffff_ffff_ffff;

/// Largest timestamp an uncle may carry.
fn max_big256() -> BigUint {
    (BigUint::from(1u8) << 256usize) - 1u8
}

/// Seconds since epoch by the local clock.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Check every stateless invariant of `header` against its `parent`.
///
/// Uncles relax only the future-time bound; everything else, the difficulty
/// equality included, applies to them unchanged. Seal and fork-consistency
/// checks are layered on top by the engine.
#[instrument(skip(config, header, parent), fields(number = header.number))]
pub fn check_header_rules(
    config: &ChainConfig,
    header: &Header,
    parent: &Header,
    uncle: bool,
) -> ConsensusResult<()> {
    // height continuity
    let want_number = parent.number.wrapping_add(1);
    if header.number != want_number {
        return Err(ConsensusError::InvalidNumber {
            have: header.number,
            want: want_number,
        });
    }

    // strictly increasing timestamps
    if header.time <= parent.time {
        return Err(ConsensusError::UnknownAncestor);
    }

    // clock bound
    if uncle {
        if header.time > max_big256() {
            return Err(ConsensusError::LargeBlockTime);
        }
    } else {
        let limit = unix_now() + ALLOWED_FUTURE_BLOCK_TIME_SECS;
        if header.time > BigUint::from(limit) {
            return Err(ConsensusError::FutureBlock {
                time: header.time.to_string(),
                limit,
            });
        }
    }

    // gas limit within the ceiling and the per-block movement bound
    if header.gas_limit > GAS_LIMIT_CAP {
        return Err(ConsensusError::InvalidGasLimit {
            have: header.gas_limit,
            parent: parent.gas_limit,
        });
    }
    let movement = parent.gas_limit / GAS_LIMIT_BOUND_DIVISOR;
    if parent.gas_limit.abs_diff(header.gas_limit) >= movement
        || header.gas_limit < MIN_GAS_LIMIT
    {
        return Err(ConsensusError::InvalidGasLimit {
            have: header.gas_limit,
            parent: parent.gas_limit,
        });
    }

    // gas used within the limit
    if header.gas_used > header.gas_limit {
        return Err(ConsensusError::InvalidGasUsed {
            have: header.gas_used,
            limit: header.gas_limit,
        });
    }

    // extra data bounded
    if header.extra.len() > MAXIMUM_EXTRA_DATA_SIZE {
        return Err(ConsensusError::ExtraDataTooLong {
            have: header.extra.len(),
            max: MAXIMUM_EXTRA_DATA_SIZE,
        });
    }

    // scalar difficulty matches the configured rule set
    if header.difficulty.is_zero() {
        return Err(ConsensusError::InvalidDifficulty {
            have: "0".to_string(),
            want: "positive".to_string(),
        });
    }
    let time = header.time.to_u64().unwrap_or(u64::MAX);
    let expected = calc_difficulty(config, time, parent);
    if header.difficulty != expected {
        return Err(ConsensusError::InvalidDifficulty {
            have: header.difficulty.to_string(),
            want: expected.to_string(),
        });
    }

    // the custom difficulty pair chains from the parent and re-derives
    // from the stored timespan
    let seafork = config.is_seafork(header.number);
    if header.nn != parent.n || header.pp != parent.p {
        return Err(ConsensusError::InvalidPoW);
    }
    let (n, p) = verify_tuple(seafork, header);
    if (header.n, header.p) != (n, p) {
        return Err(ConsensusError::InvalidPoW);
    }

    // cumulative difficulty chains from the parent
    let expected_np = &parent.np + verify_contribution(seafork, header);
    if header.np != expected_np {
        return Err(ConsensusError::InvalidDifficulty {
            have: header.np.to_string(),
            want: expected_np.to_string(),
        });
    }

    debug!("header invariants hold");
    Ok(())
}
