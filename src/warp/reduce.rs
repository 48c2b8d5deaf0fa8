//! Warp-level reduction framework
//!
//! Combines the value contributed by every lane within each contiguous
//! subgroup of `K` lanes ("items per reduction", a compile-time constant),
//! using an associative operator.
//!
//! Two algorithms, selected by an explicit strategy keyed on `K`:
//!
//! - **Tree** (power-of-two `K`): butterfly reduction over XOR exchanges,
//!   halving the reach from `K/2` down to 1. `log2(K)` steps. Because the
//!   XOR exchange is self-dual, **every** lane of a subgroup ends up holding
//!   the combined value. The pairing order is fixed, so repeated calls with
//!   identical inputs are bit-reproducible despite floating rounding.
//! - **Linear** (the supported non-power-of-two sizes): `K - 1` downward
//!   exchanges at offsets `1..K`; only the subgroup leader (the lane at
//!   subgroup-relative offset 0) folds them in. Non-leader lanes finish with
//!   an unspecified value that callers must not read.
//!
//! Callers branch on `K.is_power_of_two()` to know where the result lives —
//! this asymmetry is a deliberate algorithm choice, not an inconsistency.
//!
//! When the warp size is not divisible by `K`, the trailing short subgroup
//! is treated as having exactly the lanes that remain: its leader combines
//! only those, never a boundary lane's own-value echo.

use std::ops::Add;

use num_traits::{Bounded, Zero};

use super::exchange::Exchange;
use super::{LaneHandle, FULL_MASK, WARP_SIZE};

// ── Operators ─────────────────────────────────────────────────────

/// An associative binary combinator for reductions.
pub trait ReduceOp<T> {
    /// Neutral element of the combinator.
    fn identity() -> T;

    /// Combine two partial results.
    fn combine(a: T, b: T) -> T;
}

/// Addition. Defined for every element type with a zero, real and complex.
pub struct Sum;

impl<T: Zero + Add<Output = T>> ReduceOp<T> for Sum {
    fn identity() -> T {
        T::zero()
    }

    fn combine(a: T, b: T) -> T {
        a + b
    }
}

/// Maximum. Real-valued element types only.
pub struct Max;

impl<T: Bounded + PartialOrd> ReduceOp<T> for Max {
    fn identity() -> T {
        T::min_value()
    }

    fn combine(a: T, b: T) -> T {
        if b > a { b } else { a }
    }
}

/// Minimum. Real-valued element types only.
pub struct Min;

impl<T: Bounded + PartialOrd> ReduceOp<T> for Min {
    fn identity() -> T {
        T::max_value()
    }

    fn combine(a: T, b: T) -> T {
        if b < a { b } else { a }
    }
}

// ── Strategy selection ────────────────────────────────────────────

/// The closed set of reduction algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceStrategy {
    /// Butterfly over XOR exchanges; requires a power-of-two subgroup.
    Tree,
    /// Downward-shift accumulation at the subgroup leader.
    Linear,
}

/// Algorithm for a given subgroup size.
///
/// The linear specialisation covers the supported non-power-of-two sizes;
/// every power of two (and any other size) takes the tree, which requires
/// `K` to divide into power-of-two reach steps — callers must only request
/// supported sizes.
pub const fn strategy_for(k: u32) -> ReduceStrategy {
    match k {
        3 | 5 | 6 | 7 | 9 | 10 | 11 | 12 | 13 | 14 | 15 => ReduceStrategy::Linear,
        _ => ReduceStrategy::Tree,
    }
}

// ── Lane-level API ────────────────────────────────────────────────

impl LaneHandle {
    /// Reduce `value` within this lane's `K`-sized contiguous subgroup.
    ///
    /// For power-of-two `K` every lane of the subgroup returns the combined
    /// value; otherwise only the subgroup leader does (see module docs for
    /// the result-location contract and the short trailing subgroup policy).
    pub fn reduce<const K: u32, Op, T>(&self, value: T) -> T
    where
        T: Exchange,
        Op: ReduceOp<T>,
    {
        debug_assert!(K >= 1 && K <= WARP_SIZE);
        match strategy_for(K) {
            ReduceStrategy::Tree => self.reduce_tree::<K, Op, T>(value),
            ReduceStrategy::Linear => self.reduce_linear::<K, Op, T>(value),
        }
    }

    fn reduce_tree<const K: u32, Op, T>(&self, value: T) -> T
    where
        T: Exchange,
        Op: ReduceOp<T>,
    {
        debug_assert!(K.is_power_of_two());
        let mut x = value;
        let mut reach = K / 2;
        while reach >= 1 {
            let other = self.exchange_xor(x, reach, K, FULL_MASK);
            x = Op::combine(x, other);
            reach >>= 1;
        }
        x
    }

    fn reduce_linear<const K: u32, Op, T>(&self, value: T) -> T
    where
        T: Exchange,
        Op: ReduceOp<T>,
    {
        let lane = self.lane_index();
        let mut x = value;
        for i in 1..K {
            let y = self.exchange_down(x, i, WARP_SIZE, FULL_MASK);
            // Only subgroup leaders fold, and never past the end of the
            // warp: the trailing short subgroup combines exactly the lanes
            // that exist.
            if lane % K == 0 && lane + i < WARP_SIZE {
                x = Op::combine(x, y);
            }
        }
        x
    }
}

// ── Tests ─────────────────────────────────────────────────────────
