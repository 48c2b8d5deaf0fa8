//! Cache-policy-aware loads
//!
//! Kernels read streamed or reused data through [`Ld`], parameterised at
//! compile time by a caching strategy. Every policy returns exactly the
//! value a plain read returns; the policy only describes how the value
//! should travel through the cache hierarchy. On this CPU emulation the
//! hint is recorded but has no effect on the data path, the same way the
//! emulated backends treat device-side placement.
//!
//! Vector-width variants read 2 or 4 contiguous scalars as one wide
//! transaction and decompose them into components in address order.

use std::marker::PhantomData;

/// The closed set of caching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheHint {
    /// No hint; the hardware default.
    Default,
    /// Cache at all levels (reused data).
    AllLevels,
    /// Cache at the global level only, bypassing near caches (streamed,
    /// not-reused data).
    GlobalOnly,
    /// Non-coherent read-only path (data never concurrently written during
    /// the kernel's lifetime).
    NonCoherent,
}

/// A compile-time caching strategy marker.
pub trait LoadPolicy {
    const HINT: CacheHint;
}

/// Default load, no caching hint.
pub struct LdAuto;

/// Cache-at-all-levels load.
pub struct LdCa;

/// Cache-global-only load.
pub struct LdCg;

/// Non-coherent read-only load.
pub struct LdNc;

impl LoadPolicy for LdAuto {
    const HINT: CacheHint = CacheHint::Default;
}

impl LoadPolicy for LdCa {
    const HINT: CacheHint = CacheHint::AllLevels;
}

impl LoadPolicy for LdCg {
    const HINT: CacheHint = CacheHint::GlobalOnly;
}

impl LoadPolicy for LdNc {
    const HINT: CacheHint = CacheHint::NonCoherent;
}

/// Policy-parameterised reader.
///
/// Works for any `Copy` element, scalar or composite: a complex value loads
/// as the wide read of its two components.
pub struct Ld<P: LoadPolicy> {
    _policy: PhantomData<P>,
}

impl<P: LoadPolicy> Ld<P> {
    /// The caching strategy this reader was instantiated with.
    pub const fn hint() -> CacheHint {
        P::HINT
    }

    /// Read `data[idx]` under the policy.
    ///
    /// # Panics
    /// On an out-of-range index (caller precondition violation).
    pub fn load<T: Copy>(data: &[T], idx: usize) -> T {
        data[idx]
    }
}

/// Read 2 contiguous scalars starting at `idx` as a single wide transaction,
/// decomposed in address order.
///
/// # Panics
/// If the span `idx..idx + 2` is out of range.
pub fn load_vec2<T: Copy>(data: &[T], idx: usize) -> [T; 2] {
    assert!(idx + 2 <= data.len(), "load_vec2: span {}..{} out of range (len={})", idx, idx + 2, data.len());
    [data[idx], data[idx + 1]]
}

/// Read 4 contiguous scalars starting at `idx` as a single wide transaction,
/// decomposed in address order.
///
/// # Panics
/// If the span `idx..idx + 4` is out of range.
pub fn load_vec4<T: Copy>(data: &[T], idx: usize) -> [T; 4] {
    assert!(idx + 4 <= data.len(), "load_vec4: span {}..{} out of range (len={})", idx, idx + 4, data.len());
    [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
}
