//! Scalar difficulty adjustment: the Frontier, Homestead, and Byzantium
//! rules, selected by chain configuration.
//!
//! All intermediate math runs over signed big integers so the `-99`
//! bucketing floor behaves exactly; the result is always positive.

use crate::chain_params::{
    ChainConfig, DIFFICULTY_BOUND_DIVISOR, DURATION_LIMIT, EXP_DIFF_PERIOD, MINIMUM_DIFFICULTY,
};
use genchain_types::{empty_uncle_hash, Header};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;

/// The scalar difficulty a block created at `time` on top of `parent` must
/// carry. Total: every input yields a value.
pub fn calc_difficulty(config: &ChainConfig, time: u64, parent: &Header) -> BigUint {
    let next = parent.number + 1;
    if config.is_byzantium(next) {
        calc_difficulty_byzantium(time, parent)
    } else if config.is_homestead(next) {
        calc_difficulty_homestead(time, parent)
    } else {
        calc_difficulty_frontier(time, parent)
    }
}

/// Byzantium rules: nine-second buckets, uncle bonus, and the exponential
/// term delayed by a fake block number three million blocks back.
fn calc_difficulty_byzantium(time: u64, parent: &Header) -> BigUint {
    let parent_time = BigInt::from_biguint(Sign::Plus, parent.time.clone());
    let parent_diff = BigInt::from_biguint(Sign::Plus, parent.difficulty.clone());

    // (2 if parent has uncles else 1) - (time - parent.time) // 9
    let mut x = (BigInt::from(time) - parent_time) / BigInt::from(9);
    if parent.uncle_hash == empty_uncle_hash() {
        x = BigInt::one() - x;
    } else {
        x = BigInt::from(2) - x;
    }
    if x < BigInt::from(-99) {
        x = BigInt::from(-99);
    }

    let y = &parent_diff / BigInt::from(DIFFICULTY_BOUND_DIVISOR);
    let mut diff = parent_diff + y * x;

    let minimum = BigInt::from(MINIMUM_DIFFICULTY);
    if diff < minimum {
        diff = minimum;
    }

    // fake block number for the delayed exponential term
    let fake_number = parent.number.saturating_sub(2_999_999);
    diff += exponential_term(fake_number);

    diff.magnitude().clone()
}

/// Homestead rules: ten-second buckets, no uncle bonus.
fn calc_difficulty_homestead(time: u64, parent: &Header) -> BigUint {
    let parent_time = BigInt::from_biguint(Sign::Plus, parent.time.clone());
    let parent_diff = BigInt::from_biguint(Sign::Plus, parent.difficulty.clone());

    // 1 - (time - parent.time) // 10
    let mut x = BigInt::one() - (BigInt::from(time) - parent_time) / BigInt::from(10);
    if x < BigInt::from(-99) {
        x = BigInt::from(-99);
    }

    let y = &parent_diff / BigInt::from(DIFFICULTY_BOUND_DIVISOR);
    let mut diff = parent_diff + y * x;

    let minimum = BigInt::from(MINIMUM_DIFFICULTY);
    if diff < minimum {
        diff = minimum;
    }

    diff += exponential_term(parent.number + 1);
    diff.magnitude().clone()
}

/// Frontier rules: a single duration threshold decides the direction.
fn calc_difficulty_frontier(time: u64, parent: &Header) -> BigUint {
    let parent_time = BigInt::from_biguint(Sign::Plus, parent.time.clone());
    let parent_diff = BigInt::from_biguint(Sign::Plus, parent.difficulty.clone());

    let adjust = &parent_diff / BigInt::from(DIFFICULTY_BOUND_DIVISOR);
    let mut diff = if BigInt::from(time) - parent_time < BigInt::from(DURATION_LIMIT) {
        &parent_diff + &adjust
    } else {
        &parent_diff - &adjust
    };

    let minimum = BigInt::from(MINIMUM_DIFFICULTY);
    if diff < minimum {
        diff = minimum.clone();
    }

    let bomb = exponential_term(parent.number + 1);
    if bomb > BigInt::from(0) {
        diff += bomb;
        if diff < minimum {
            diff = minimum;
        }
    }

    diff.magnitude().clone()
}

/// The exponential term `2^(number / EXP_DIFF_PERIOD - 2)`, zero while the
/// period count has not passed one.
fn exponential_term(number: u64) -> BigInt {
    let period = number / EXP_DIFF_PERIOD;
    if period > 1 {
        BigInt::one() << (period - 2) as usize
    } else {
        BigInt::from(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genchain_types::Hash32;

    const MIN: u64 = MINIMUM_DIFFICULTY;

    fn parent(number: u64, time: u64, difficulty: u64) -> Header {
        Header {
            number,
            time: BigUint::from(time),
            difficulty: BigUint::from(difficulty),
            uncle_hash: empty_uncle_hash(),
            ..Header::default()
        }
    }

    fn homestead_config() -> ChainConfig {
        ChainConfig {
            homestead_block: Some(0),
            ..ChainConfig::default()
        }
    }

    fn byzantium_config() -> ChainConfig {
        ChainConfig {
            homestead_block: Some(0),
            byzantium_block: Some(0),
            ..ChainConfig::default()
        }
    }

    #[test]
    fn homestead_fast_block_raises_difficulty() {
        let p = parent(1_000, 10_000, MIN);
        let diff = calc_difficulty(&homestead_config(), 10_001, &p);
        assert_eq!(diff, BigUint::from(MIN + MIN / DIFFICULTY_BOUND_DIVISOR));
    }

    #[test]
    fn homestead_ten_second_block_holds_difficulty() {
        let p = parent(1_000, 10_000, 2_048_000);
        let diff = calc_difficulty(&homestead_config(), 10_010, &p);
        assert_eq!(diff, BigUint::from(2_048_000u64));
    }

    #[test]
    fn homestead_slow_block_floors_at_minimum() {
        let p = parent(1_000, 10_000, MIN);
        let diff = calc_difficulty(&homestead_config(), 20_000, &p);
        assert_eq!(diff, BigUint::from(MIN));
    }

    #[test]
    fn homestead_bucketing_factor_floors_at_minus_99() {
        let p = parent(1_000, 0, 100 * 2_048);
        // an enormous delta buckets far below -99; unclamped it would
        // crash through the minimum, clamped it sheds exactly 99 steps
        let diff = calc_difficulty(&homestead_config(), 1_000_000, &p);
        assert_eq!(diff, BigUint::from(204_800u64 - 99 * 100));
    }

    #[test]
    fn byzantium_uncle_bonus_uses_factor_two() {
        let no_uncles = parent(1_000, 10_000, MIN);
        let mut with_uncles = no_uncles.clone();
        with_uncles.uncle_hash = Hash32([0xaa; 32]);

        let config = byzantium_config();
        let plain = calc_difficulty(&config, 10_001, &no_uncles);
        let bonus = calc_difficulty(&config, 10_001, &with_uncles);

        assert_eq!(plain, BigUint::from(MIN + MIN / DIFFICULTY_BOUND_DIVISOR));
        assert_eq!(
            bonus,
            BigUint::from(MIN + 2 * (MIN / DIFFICULTY_BOUND_DIVISOR))
        );
    }

    #[test]
    fn byzantium_delay_suppresses_the_exponential_term() {
        let config = byzantium_config();

        // just before the delay window opens: no term
        let p = parent(2_999_999, 10_000, MIN);
        assert_eq!(
            calc_difficulty(&config, 10_008, &p),
            BigUint::from(MIN + MIN / DIFFICULTY_BOUND_DIVISOR)
        );

        // 200_000 past the window: period 2, term 2^0
        let p = parent(3_199_999, 10_000, MIN);
        assert_eq!(
            calc_difficulty(&config, 10_008, &p),
            BigUint::from(MIN + MIN / DIFFICULTY_BOUND_DIVISOR + 1)
        );
    }

    #[test]
    fn homestead_exponential_term_follows_the_block_number() {
        // period count (199_999 + 1) / 100_000 = 2, term 2^0
        let p = parent(199_999, 10_000, 2_048_000);
        let diff = calc_difficulty(&homestead_config(), 10_010, &p);
        assert_eq!(diff, BigUint::from(2_048_000u64 + 1));
    }

    #[test]
    fn frontier_direction_flips_at_the_duration_limit() {
        let config = ChainConfig::default();
        let p = parent(1_000, 10_000, 2_048_000);

        let fast = calc_difficulty(&config, 10_000 + DURATION_LIMIT - 1, &p);
        assert_eq!(fast, BigUint::from(2_048_000u64 + 1_000));

        let slow = calc_difficulty(&config, 10_000 + DURATION_LIMIT, &p);
        assert_eq!(slow, BigUint::from(2_048_000u64 - 1_000));
    }

    #[test]
    fn frontier_floors_at_minimum() {
        let config = ChainConfig::default();
        let p = parent(1_000, 10_000, MIN);
        let slow = calc_difficulty(&config, 10_000 + DURATION_LIMIT, &p);
        assert_eq!(slow, BigUint::from(MIN));
    }

    #[test]
    fn config_selects_the_rule_set() {
        // a 25-second delta: Homestead buckets to -1, Byzantium to -1 as
        // well, Frontier simply decreases; distinguish via the uncle bonus
        let mut p = parent(1_000, 10_000, 2_048_000);
        p.uncle_hash = Hash32([0xaa; 32]);

        let byzantium = calc_difficulty(&byzantium_config(), 10_025, &p);
        let homestead = calc_difficulty(&homestead_config(), 10_025, &p);

        // byzantium: 2 - 25/9 = 0, homestead: 1 - 25/10 = -1
        assert_eq!(byzantium, BigUint::from(2_048_000u64));
        assert_eq!(homestead, BigUint::from(2_048_000u64 - 1_000));
    }
}
