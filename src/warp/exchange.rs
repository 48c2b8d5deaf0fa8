//! Cross-lane value exchange
//!
//! Shuffle-style communication: each lane contributes a value and receives,
//! without any shared-memory round trip visible to kernel code, the value
//! contributed by a partner lane determined by the pattern — broadcast by
//! index, XOR permutation (the butterfly building block), or directional
//! up/down shift (the linear-reduction building block).
//!
//! Values move through the warp's 32-bit word buffer one word at a time.
//! 64-bit elements are split into hi/lo words, each exchanged with the same
//! pattern, and recombined bit-exactly — the portable path for hardware
//! without a native wide exchange. Complex elements run the pattern
//! independently on the real and imaginary components; components are never
//! mixed across lanes.
//!
//! The `bound` argument segments the warp: indices wrap within contiguous
//! `bound`-sized segments (`bound` must be a power of two), which is how
//! segmented exchanges and subgroup reductions are built. A partner falling
//! outside the caller's segment yields the caller's own value back; callers
//! must not rely on that value.

use num_complex::{Complex32, Complex64};

use super::{LaneHandle, WarpState, WARP_SIZE};

// ── Element trait ─────────────────────────────────────────────────

/// An element type that can move through the warp's word buffer.
///
/// `exchange` runs one collective round per underlying 32-bit word; every
/// lane of the cohort must call it with the same element type so the round
/// counts line up.
pub trait Exchange: Copy {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self;
}

impl Exchange for u32 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        state.word_exchange(lane, value, src)
    }
}

impl Exchange for i32 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        state.word_exchange(lane, value as u32, src) as i32
    }
}

impl Exchange for f32 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        f32::from_bits(state.word_exchange(lane, value.to_bits(), src))
    }
}

impl Exchange for u64 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        // Split into two 32-bit words, exchange each with the same pattern,
        // recombine. Reconstruction is bit-exact.
        let lo = state.word_exchange(lane, value as u32, src);
        let hi = state.word_exchange(lane, (value >> 32) as u32, src);
        (u64::from(hi) << 32) | u64::from(lo)
    }
}

impl Exchange for i64 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        u64::exchange(state, lane, value as u64, src) as i64
    }
}

impl Exchange for f64 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        f64::from_bits(u64::exchange(state, lane, value.to_bits(), src))
    }
}

impl Exchange for Complex32 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        let re = f32::exchange(state, lane, value.re, src);
        let im = f32::exchange(state, lane, value.im, src);
        Complex32::new(re, im)
    }
}

impl Exchange for Complex64 {
    fn exchange(state: &WarpState, lane: u32, value: Self, src: Option<u32>) -> Self {
        let re = f64::exchange(state, lane, value.re, src);
        let im = f64::exchange(state, lane, value.im, src);
        Complex64::new(re, im)
    }
}

// ── Partner-lane patterns ─────────────────────────────────────────

fn segment_base(lane: u32, bound: u32) -> u32 {
    lane & !(bound - 1)
}

fn src_broadcast(lane: u32, source_lane: u32, bound: u32) -> u32 {
    segment_base(lane, bound) + (source_lane % bound)
}

fn src_xor(lane: u32, pattern: u32, bound: u32) -> Option<u32> {
    let s = lane ^ pattern;
    let base = segment_base(lane, bound);
    if s >= base && s < base + bound {
        Some(s)
    } else {
        None
    }
}

fn src_down(lane: u32, offset: u32, bound: u32) -> Option<u32> {
    let s = lane + offset;
    if s < segment_base(lane, bound) + bound {
        Some(s)
    } else {
        None
    }
}

fn src_up(lane: u32, offset: u32, bound: u32) -> Option<u32> {
    if lane >= offset && lane - offset >= segment_base(lane, bound) {
        Some(lane - offset)
    } else {
        None
    }
}

// ── Lane-level API ────────────────────────────────────────────────

impl LaneHandle {
    fn check_collective(&self, bound: u32, mask: u32) {
        debug_assert!(
            bound.is_power_of_two() && bound <= WARP_SIZE,
            "exchange bound must be a power of two <= {}",
            WARP_SIZE
        );
        // Lanes outside `mask` still pass through the collective (lockstep);
        // using them as a source or relying on their result is a caller bug
        // this layer cannot detect cheaply.
        let _ = mask;
    }

    /// Receive the value held by `source_lane` within this lane's
    /// `bound`-sized segment; `source_lane` wraps modulo `bound`.
    pub fn broadcast_from<T: Exchange>(
        &self,
        value: T,
        source_lane: u32,
        bound: u32,
        mask: u32,
    ) -> T {
        self.check_collective(bound, mask);
        let src = src_broadcast(self.lane_index(), source_lane, bound);
        T::exchange(self.state(), self.lane_index(), value, Some(src))
    }

    /// Receive the value held by the lane at index `lane ^ lane_mask_pattern`.
    ///
    /// Self-dual: applying twice with the same pattern returns the original
    /// value. A partner outside the segment yields the own value back.
    pub fn exchange_xor<T: Exchange>(
        &self,
        value: T,
        lane_mask_pattern: u32,
        bound: u32,
        mask: u32,
    ) -> T {
        self.check_collective(bound, mask);
        debug_assert!(lane_mask_pattern < WARP_SIZE);
        let src = src_xor(self.lane_index(), lane_mask_pattern, bound);
        T::exchange(self.state(), self.lane_index(), value, src)
    }

    /// Receive the value held by the lane at `lane + offset`. Lanes near the
    /// segment end receive their own value back (unspecified for callers).
    pub fn exchange_down<T: Exchange>(&self, value: T, offset: u32, bound: u32, mask: u32) -> T {
        self.check_collective(bound, mask);
        let src = src_down(self.lane_index(), offset, bound);
        T::exchange(self.state(), self.lane_index(), value, src)
    }

    /// Receive the value held by the lane at `lane - offset`. Lanes near the
    /// segment start receive their own value back (unspecified for callers).
    pub fn exchange_up<T: Exchange>(&self, value: T, offset: u32, bound: u32, mask: u32) -> T {
        self.check_collective(bound, mask);
        let src = src_up(self.lane_index(), offset, bound);
        T::exchange(self.state(), self.lane_index(), value, src)
    }
}

// ── Tests ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warp::{Warp, FULL_MASK};

    #[test]
    fn test_source_patterns() {
        // Full-warp broadcast from lane 7
        assert_eq!(src_broadcast(0, 7, WARP_SIZE), 7);
        assert_eq!(src_broadcast(31, 7, WARP_SIZE), 7);
        // Segmented: lane 12 in an 8-wide segment reads its segment's lane 3
        assert_eq!(src_broadcast(12, 3, 8), 11);
        assert_eq!(src_broadcast(12, 35, 8), 11); // wraps modulo bound

        assert_eq!(src_xor(5, 1, WARP_SIZE), Some(4));
        assert_eq!(src_xor(5, 4, 4), None); // partner leaves the segment

        assert_eq!(src_down(5, 3, WARP_SIZE), Some(8));
        assert_eq!(src_down(31, 1, WARP_SIZE), None);
        assert_eq!(src_down(6, 3, 8), None); // 9 is outside segment [0, 8)

        assert_eq!(src_up(5, 2, WARP_SIZE), Some(3));
        assert_eq!(src_up(0, 1, WARP_SIZE), None);
        assert_eq!(src_up(9, 2, 8), None); // 7 is below segment base 8
    }

    #[test]
    fn test_broadcast_full_warp() {
        let out = Warp::launch(|lane| {
            let v = lane.lane_index() as f32 * 1.5;
            lane.broadcast_from(v, 7, WARP_SIZE, FULL_MASK)
        })
        .unwrap();
        for v in out {
            assert_eq!(v, 10.5);
        }
    }

    #[test]
    fn test_broadcast_segmented() {
        let out = Warp::launch(|lane| {
            lane.broadcast_from(lane.lane_index() as i32, 2, 8, FULL_MASK)
        })
        .unwrap();
        for (lane, v) in out.iter().enumerate() {
            let base = (lane as i32 / 8) * 8;
            assert_eq!(*v, base + 2);
        }
    }

    #[test]
    fn test_exchange_xor_pairs_f64_bit_exact() {
        // Full-entropy bit patterns verify the hi/lo split recombines exactly.
        let out = Warp::launch(|lane| {
            let v = f64::from_bits(0x0123_4567_89AB_CDEF ^ u64::from(lane.lane_index()) << 3);
            lane.exchange_xor(v, 1, WARP_SIZE, FULL_MASK)
        })
        .unwrap();
        for lane in 0..WARP_SIZE as usize {
            let partner = lane ^ 1;
            let expected = f64::from_bits(0x0123_4567_89AB_CDEF ^ (partner as u64) << 3);
            assert_eq!(out[lane].to_bits(), expected.to_bits());
        }
    }

    #[test]
    fn test_exchange_xor_involution() {
        let out = Warp::launch(|lane| {
            let v = f64::from_bits(0xDEAD_BEEF_0000_0000 | u64::from(lane.lane_index()));
            let once = lane.exchange_xor(v, 5, WARP_SIZE, FULL_MASK);
            let twice = lane.exchange_xor(once, 5, WARP_SIZE, FULL_MASK);
            (v, twice)
        })
        .unwrap();
        for (original, round_tripped) in out {
            assert_eq!(original.to_bits(), round_tripped.to_bits());
        }
    }

    #[test]
    fn test_exchange_down_boundary_own_value() {
        let out = Warp::launch(|lane| {
            lane.exchange_down(lane.lane_index() as i32, 3, WARP_SIZE, FULL_MASK)
        })
        .unwrap();
        for lane in 0..WARP_SIZE as usize {
            if lane + 3 < WARP_SIZE as usize {
                assert_eq!(out[lane], lane as i32 + 3);
            } else {
                assert_eq!(out[lane], lane as i32); // own value back
            }
        }
    }

    #[test]
    fn test_exchange_up_shift_i64() {
        let out = Warp::launch(|lane| {
            let v = i64::from(lane.lane_index()) << 40 | 0x1234;
            lane.exchange_up(v, 2, WARP_SIZE, FULL_MASK)
        })
        .unwrap();
        for lane in 0..WARP_SIZE as usize {
            if lane >= 2 {
                assert_eq!(out[lane], ((lane as i64 - 2) << 40) | 0x1234);
            } else {
                assert_eq!(out[lane], (lane as i64) << 40 | 0x1234);
            }
        }
    }

    #[test]
    fn test_complex_exchange_matches_componentwise() {
        let value = |lane: u32| Complex64::new(f64::from(lane) * 0.5, -f64::from(lane) * 2.0);
        let composite = Warp::launch(|lane| {
            lane.exchange_xor(value(lane.lane_index()), 3, WARP_SIZE, FULL_MASK)
        })
        .unwrap();
        let parts = Warp::launch(|lane| {
            let v = value(lane.lane_index());
            let re = lane.exchange_xor(v.re, 3, WARP_SIZE, FULL_MASK);
            let im = lane.exchange_xor(v.im, 3, WARP_SIZE, FULL_MASK);
            Complex64::new(re, im)
        })
        .unwrap();
        for lane in 0..WARP_SIZE as usize {
            assert_eq!(composite[lane].re.to_bits(), parts[lane].re.to_bits());
            assert_eq!(composite[lane].im.to_bits(), parts[lane].im.to_bits());
        }
    }
}
