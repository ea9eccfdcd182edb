//! The two-regime adjustment of the chain's custom difficulty pair
//! `(n, p)` and the cumulative difficulty `np`.
//!
//! Before the Sea fork the Lake regime measures the timespan across a
//! twelve-block window; from the fork on, the Sea regime measures single
//! block gaps. Both keep `n >= INITIAL_N` and `INITIAL_P <= p <= 256`, and
//! both record the observed timespan in the header (`alpha`) so any node
//! can re-run the adjustment from the header alone.

use crate::chain_params::{INITIAL_N, INITIAL_P, P_CEILING};
use genchain_types::Header;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use tracing::trace;

/// Timespan assumed by the Lake regime when no window is measurable.
pub const LAKE_DEFAULT_TIMESPAN: u64 = 120;

/// How many trailing blocks the Lake regime measures across.
pub const LAKE_WINDOW: u64 = 12;

/// Timespan assumed by the Sea regime at height one or on clock inversion.
pub const SEA_DEFAULT_TIMESPAN: u64 = 10;

/// The difficulty tuple stamped into a prepared header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyTuple {
    /// Matrix dimension parameter.
    pub n: u64,
    /// Zero-digit parameter.
    pub p: u64,
    /// Timespan the adjustment observed.
    pub alpha: u64,
    /// Cumulative chain difficulty including this block.
    pub np: BigUint,
}

/// One block's contribution to the cumulative difficulty: `n^3 * p^6`.
///
/// The product is taken in wrapping 64-bit space so every node lands on
/// the same value even at parameter extremes.
pub fn block_contribution(n: u64, p: u64) -> u64 {
    let n3 = n.wrapping_mul(n).wrapping_mul(n);
    let p2 = p.wrapping_mul(p);
    let p6 = p2.wrapping_mul(p2).wrapping_mul(p2);
    n3.wrapping_mul(p6)
}

/// Lake-regime parameter adjustment.
///
/// The branch chain is strictly first-match: a timespan above 138 consumes
/// the chain even when the `p` guard inside fails, so the 132 arm never
/// sees it. The trailing clause can take back an `n` the chain just
/// granted; both behaviors are part of the protocol.
pub fn calc_np(timespan: u64, n: u64, p: u64) -> (u64, u64) {
    let mut n = n;
    let mut p = p;

    if p < P_CEILING {
        if timespan < 102 {
            p += 1;
        } else if timespan < 108 {
            n += 1;
        } else if timespan > 138 {
            if p > INITIAL_P {
                p -= 1;
            }
        } else if timespan > 132 {
            if n > INITIAL_N {
                n -= 1;
            }
        }
        if p <= INITIAL_P && n > INITIAL_N && timespan > 360 {
            n -= 1;
        }
    } else {
        // p frozen at the ceiling: the same thresholds steer n instead
        if timespan < 102 {
            n += 1;
        } else if timespan > 138 {
            if n > INITIAL_N {
                n -= 1;
            }
        }
        if n <= INITIAL_N && p > INITIAL_P && timespan > 360 {
            p -= 1;
        }
    }

    clamp_np(n, p)
}

/// Sea-regime parameter adjustment.
///
/// Long stalls shed a proportional share of both parameters; the floors
/// below catch any overshoot.
pub fn calc_np_sea(timespan: u64, n: u64, p: u64) -> (u64, u64) {
    let mut n = n;
    let mut p = p;

    if p < P_CEILING {
        if timespan < 5 {
            p += 1;
        } else if timespan < 7 {
            n += 1;
        } else if timespan > 900 {
            p -= p / 7;
            n -= n / 7;
        } else if timespan > 600 {
            p -= p / 10;
            n -= n / 10;
        } else if timespan > 16 {
            if p > INITIAL_P {
                p -= 1;
            }
        } else if timespan > 13 {
            if n > INITIAL_N {
                n -= 1;
            }
        }
        if p <= INITIAL_P && n > INITIAL_N && timespan > 30 {
            n -= 1;
        }
    } else {
        if timespan < 5 {
            n += 1;
        } else if timespan > 16 {
            if n > INITIAL_N {
                n -= 1;
            }
        }
        if n <= INITIAL_N && p > INITIAL_P && timespan > 30 {
            p -= 1;
        }
    }

    clamp_np(n, p)
}

fn clamp_np(mut n: u64, mut p: u64) -> (u64, u64) {
    if n <= INITIAL_N {
        n = INITIAL_N;
    }
    if p <= INITIAL_P {
        p = INITIAL_P;
    }
    if p > P_CEILING {
        p = P_CEILING;
    }
    (n, p)
}

/// Compute the difficulty tuple for a new block under the Lake regime.
///
/// `parent12` is the header twelve blocks back; heights inside the window
/// run on the initial parameters and do not consult it.
pub fn lake_tuple(header: &Header, parent: &Header, parent12: Option<&Header>) -> DifficultyTuple {
    let number = header.number;
    let mut np = if number < 1 {
        BigUint::from(0u32)
    } else {
        parent.np.clone()
    };

    if number <= LAKE_WINDOW {
        np += block_contribution(INITIAL_N, INITIAL_P);
        return DifficultyTuple {
            n: INITIAL_N,
            p: INITIAL_P,
            alpha: LAKE_DEFAULT_TIMESPAN,
            np,
        };
    }

    // measured in ordered space first: a clock inversion falls back to the
    // window default instead of wrapping
    let timespan = match parent12 {
        Some(p12) if header.time >= p12.time => saturating_u64(&(&header.time - &p12.time)),
        _ => LAKE_DEFAULT_TIMESPAN,
    };

    let (n, p) = calc_np(timespan, parent.n, parent.p);
    trace!(number, timespan, n, p, "lake difficulty adjusted");
    np += block_contribution(n, p);

    DifficultyTuple {
        n,
        p,
        alpha: timespan,
        np,
    }
}

/// Compute the difficulty tuple for a new block under the Sea regime.
pub fn sea_tuple(header: &Header, parent: &Header) -> DifficultyTuple {
    let number = header.number;

    let timespan = if number == 1 || header.time < parent.time {
        SEA_DEFAULT_TIMESPAN
    } else {
        saturating_u64(&(&header.time - &parent.time))
    };

    let (n, p) = calc_np_sea(timespan, parent.n, parent.p);
    trace!(number, timespan, n, p, "sea difficulty adjusted");

    let contribution = block_contribution(n, p).wrapping_sub(timespan);
    let mut np = if number < 1 {
        BigUint::from(0u32)
    } else {
        parent.np.clone()
    };
    np += contribution;

    DifficultyTuple {
        n,
        p,
        alpha: timespan,
        np,
    }
}

/// Re-derive the `(n, p)` pair a header must carry, from the header alone.
/// Inside the Lake window the stored timespan and parent parameters clamp
/// back to the initial values, so no height special-casing is needed.
pub fn verify_tuple(seafork: bool, header: &Header) -> (u64, u64) {
    if seafork {
        calc_np_sea(header.alpha, header.nn, header.pp)
    } else {
        calc_np(header.alpha, header.nn, header.pp)
    }
}

/// The cumulative-difficulty contribution a header claims, re-derived from
/// its own fields.
pub fn verify_contribution(seafork: bool, header: &Header) -> u64 {
    let base = block_contribution(header.n, header.p);
    if seafork {
        base.wrapping_sub(header.alpha)
    } else {
        base
    }
}

fn saturating_u64(value: &BigUint) -> u64 {
    value.to_u64().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_at(number: u64, time: u64) -> Header {
        Header {
            number,
            time: BigUint::from(time),
            ..Header::default()
        }
    }

    #[test]
    fn lake_fast_window_raises_p() {
        assert_eq!(calc_np(100, 2, 2), (2, 3));
    }

    #[test]
    fn lake_medium_window_raises_n() {
        assert_eq!(calc_np(104, 2, 2), (3, 2));
    }

    #[test]
    fn lake_slow_window_lowers_p() {
        assert_eq!(calc_np(200, 2, 3), (2, 2));
    }

    #[test]
    fn lake_target_band_leaves_parameters_alone() {
        assert_eq!(calc_np(120, 2, 2), (2, 2));
        assert_eq!(calc_np(108, 5, 7), (5, 7));
        assert_eq!(calc_np(132, 5, 7), (5, 7));
    }

    #[test]
    fn lake_slow_branch_shadows_the_n_arm() {
        // 400 > 138 consumes the chain with p already floored, so the
        // n-lowering arm at 132 never runs; only the trailing clause does.
        assert_eq!(calc_np(400, 5, 2), (4, 2));
        // at 135 the n arm does run
        assert_eq!(calc_np(135, 5, 2), (4, 2));
    }

    #[test]
    fn lake_trailing_clause_can_take_back_a_fresh_increment() {
        // 361 > 138 leaves n untouched, then the trailing clause fires
        assert_eq!(calc_np(361, 3, 2), (2, 2));
    }

    #[test]
    fn lake_ceiling_freezes_p_and_steers_n() {
        assert_eq!(calc_np(100, 5, 256), (6, 256));
        assert_eq!(calc_np(140, 5, 256), (4, 256));
        // n floored, long stall: p finally backs off the ceiling
        assert_eq!(calc_np(400, 2, 256), (2, 255));
    }

    #[test]
    fn lake_floors_hold() {
        assert_eq!(calc_np(1000, 2, 2), (2, 2));
        assert_eq!(calc_np(140, 2, 2), (2, 2));
    }

    #[test]
    fn sea_fast_blocks_raise_parameters() {
        assert_eq!(calc_np_sea(4, 2, 2), (2, 3));
        assert_eq!(calc_np_sea(5, 2, 2), (3, 2));
        assert_eq!(calc_np_sea(6, 2, 2), (3, 2));
    }

    #[test]
    fn sea_target_band_leaves_parameters_alone() {
        assert_eq!(calc_np_sea(7, 4, 9), (4, 9));
        assert_eq!(calc_np_sea(10, 4, 9), (4, 9));
        assert_eq!(calc_np_sea(13, 4, 9), (4, 9));
    }

    #[test]
    fn sea_slow_blocks_lower_parameters() {
        assert_eq!(calc_np_sea(17, 4, 9), (4, 8));
        assert_eq!(calc_np_sea(15, 4, 9), (3, 9));
        assert_eq!(calc_np_sea(16, 4, 9), (3, 9));
        assert_eq!(calc_np_sea(601, 40, 90), (36, 81));
        assert_eq!(calc_np_sea(901, 49, 70), (42, 60));
    }

    #[test]
    fn sea_long_stall_respects_floors() {
        // n already floored sheds nothing; p sheds a seventh
        assert_eq!(calc_np_sea(1000, 2, 100), (2, 86));
    }

    #[test]
    fn sea_trailing_clause_lowers_n_when_p_is_floored() {
        assert_eq!(calc_np_sea(31, 5, 2), (4, 2));
        // the clause needs strictly more than 30 seconds
        assert_eq!(calc_np_sea(30, 5, 2), (5, 2));
    }

    #[test]
    fn sea_ceiling_mirrors_onto_n() {
        assert_eq!(calc_np_sea(4, 5, 256), (6, 256));
        assert_eq!(calc_np_sea(17, 5, 256), (4, 256));
        assert_eq!(calc_np_sea(31, 2, 256), (2, 255));
    }

    #[test]
    fn contribution_matches_the_seed_scenarios() {
        assert_eq!(block_contribution(2, 3), 5832);
        assert_eq!(block_contribution(3, 2), 1728);
        assert_eq!(block_contribution(2, 2), 512);
        assert_eq!(block_contribution(2, 86), 8 * 86u64.pow(6));
    }

    #[test]
    fn lake_tuple_inside_the_window_uses_initial_parameters() {
        let mut parent = header_at(11, 1_000);
        parent.np = BigUint::from(11u32 * 512);
        let header = header_at(12, 1_010);

        let tuple = lake_tuple(&header, &parent, None);
        assert_eq!((tuple.n, tuple.p), (INITIAL_N, INITIAL_P));
        assert_eq!(tuple.alpha, LAKE_DEFAULT_TIMESPAN);
        assert_eq!(tuple.np, BigUint::from(12u32 * 512));
    }

    #[test]
    fn lake_tuple_engages_adjustment_at_height_13() {
        let mut parent = header_at(12, 2_000);
        parent.n = 2;
        parent.p = 2;
        parent.np = BigUint::from(12u32 * 512);
        let parent12 = header_at(1, 900);
        let header = header_at(13, 2_000 + 10);

        // timespan = 2010 - 900 = 1110 > 138 with p floored: unchanged
        let tuple = lake_tuple(&header, &parent, Some(&parent12));
        assert_eq!((tuple.n, tuple.p), (2, 2));
        assert_eq!(tuple.alpha, 1110);
        assert_eq!(tuple.np, BigUint::from(13u32 * 512));
    }

    #[test]
    fn lake_tuple_clock_inversion_falls_back_to_default() {
        let mut parent = header_at(20, 5_000);
        parent.n = 3;
        parent.p = 4;
        parent.np = BigUint::from(1_000u32);
        let parent12 = header_at(8, 9_000);
        let header = header_at(21, 5_010);

        let tuple = lake_tuple(&header, &parent, Some(&parent12));
        assert_eq!(tuple.alpha, LAKE_DEFAULT_TIMESPAN);
        assert_eq!((tuple.n, tuple.p), (3, 4));
    }

    #[test]
    fn sea_tuple_height_one_uses_the_default_timespan() {
        let parent = header_at(0, 1_000);
        let header = header_at(1, 2_000);

        let tuple = sea_tuple(&header, &parent);
        assert_eq!(tuple.alpha, SEA_DEFAULT_TIMESPAN);
        assert_eq!((tuple.n, tuple.p), (INITIAL_N, INITIAL_P));
        assert_eq!(
            tuple.np,
            BigUint::from(block_contribution(2, 2) - SEA_DEFAULT_TIMESPAN)
        );
    }

    #[test]
    fn sea_tuple_accumulates_onto_the_parent() {
        let mut parent = header_at(41, 10_000);
        parent.n = 3;
        parent.p = 5;
        parent.np = BigUint::from(70_000u32);
        let header = header_at(42, 10_010);

        let tuple = sea_tuple(&header, &parent);
        assert_eq!((tuple.n, tuple.p), (3, 5));
        assert_eq!(tuple.alpha, 10);
        let contribution = block_contribution(3, 5) - 10;
        assert_eq!(tuple.np, BigUint::from(70_000u64 + contribution));
    }

    #[test]
    fn sea_contribution_wraps_below_the_timespan() {
        // floored parameters against a stall longer than their product
        let wrapped = block_contribution(2, 2).wrapping_sub(1_000);
        assert_eq!(wrapped, u64::MAX - 487);

        let mut parent = header_at(50, 1_000);
        parent.n = 2;
        parent.p = 2;
        let header = header_at(51, 2_000);
        let tuple = sea_tuple(&header, &parent);
        assert_eq!(tuple.np, BigUint::from(wrapped));
    }

    #[test]
    fn verify_tuple_rederives_from_the_header_alone() {
        let mut header = header_at(100, 0);
        header.alpha = 100;
        header.nn = 2;
        header.pp = 2;
        assert_eq!(verify_tuple(false, &header), (2, 3));

        header.alpha = 4;
        assert_eq!(verify_tuple(true, &header), (2, 3));

        let mut early = header_at(5, 0);
        early.alpha = LAKE_DEFAULT_TIMESPAN;
        assert_eq!(verify_tuple(false, &early), (INITIAL_N, INITIAL_P));
    }
}
