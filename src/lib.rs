//! Warp-level cooperative execution primitives
//!
//! This crate provides the low-level cooperative-group layer that numerical
//! kernels (sparse matrix assembly, smoothers, dot products) are written
//! against: lane introspection, cross-lane value exchange, warp votes, a
//! generic reduction framework, cache-policy-aware loads, and cross-group
//! atomic accumulation.
//!
//! On SIMT hardware these map to single instructions. Here a warp is modelled
//! as a barrier-synchronised cohort of OS threads executing in lockstep: each
//! lane is one thread pinned to a lane index, and all cross-lane
//! communication goes through explicit exchange calls against shared warp
//! state — never through ambient shared mutable variables. This preserves the
//! "no implicit communication" contract kernels rely on.
//!
//! # Quick example
//!
//! ```no_run
//! use warp_primitives::warp::Warp;
//! use warp_primitives::warp::reduce::Sum;
//!
//! // Every lane contributes its lane index; each 4-lane subgroup ends up
//! // holding that subgroup's sum.
//! let sums = Warp::launch(|lane| {
//!     lane.reduce::<4, Sum, f32>(lane.lane_index() as f32)
//! }).unwrap();
//! assert_eq!(sums[0], 6.0); // 0 + 1 + 2 + 3
//! ```

pub mod atomic;
pub mod bits;
pub mod error;
pub mod memory;
pub mod warp;

pub use error::{Result, WarpError};
pub use warp::{LaneHandle, Warp, WarpState, FULL_MASK, WARP_SIZE};

/// Commonly used types for kernel authors.
pub mod prelude {
    pub use crate::atomic::{AtomicAccumulate, AtomicF32, AtomicF64};
    pub use crate::memory::load::{Ld, LdAuto, LdCa, LdCg, LdNc};
    pub use crate::warp::reduce::{Max, Min, ReduceOp, Sum};
    pub use crate::warp::{LaneHandle, Warp, FULL_MASK, WARP_SIZE};
    pub use crate::{Result, WarpError};
}
