//! Bit and lane-mask introspection tools
//!
//! Pure integer helpers used by the warp layer and by kernels directly:
//! population count, first-set-bit, bit-field extraction, most-significant-bit
//! search, bit reversal, and the lane-mask family.

use crate::warp::{FULL_MASK, WARP_SIZE};

/// Population count — number of set bits.
pub fn popc(x: u32) -> u32 {
    x.count_ones()
}

/// Find first set bit (1-indexed, 0 if no bits set).
pub fn ffs(x: u32) -> u32 {
    if x == 0 { 0 } else { x.trailing_zeros() + 1 }
}

/// Count leading zeros.
pub fn clz(x: u32) -> u32 {
    x.leading_zeros()
}

/// Extract the low `num_bits` bits of `src`.
///
/// `num_bits >= 32` returns `src` unchanged.
pub fn bfe(src: u32, num_bits: u32) -> u32 {
    if num_bits >= 32 {
        src
    } else {
        src & ((1u32 << num_bits) - 1)
    }
}

/// Position of the most significant set bit, or `None` for zero.
pub fn bfind(src: u32) -> Option<u32> {
    if src == 0 { None } else { Some(31 - src.leading_zeros()) }
}

/// Position of the most significant set bit of a 64-bit word, or `None`.
pub fn bfind_u64(src: u64) -> Option<u32> {
    if src == 0 { None } else { Some(63 - src.leading_zeros()) }
}

/// Reverse the bit order of a 64-bit word.
pub fn brev(src: u64) -> u64 {
    src.reverse_bits()
}

/// Lane mask less-than: bitmask of all lanes with index < `lane`.
pub fn lanemask_lt(lane: u32) -> u32 {
    debug_assert!(lane < WARP_SIZE);
    if lane == 0 { 0 } else { (1u32 << lane) - 1 }
}

/// Lane mask less-than-or-equal.
pub fn lanemask_le(lane: u32) -> u32 {
    debug_assert!(lane < WARP_SIZE);
    if lane >= WARP_SIZE - 1 { FULL_MASK } else { (1u32 << (lane + 1)) - 1 }
}

/// Lane mask greater-than.
pub fn lanemask_gt(lane: u32) -> u32 {
    !lanemask_le(lane)
}
