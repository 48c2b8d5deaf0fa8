//! Atomic accumulation across execution groups
//!
//! The only primitive in this layer with meaning *across* warps: kernels that
//! must combine partial sums from distinct groups do so through these cells.
//! Targets are caller-owned and outlive any single launch.
//!
//! Floating-point adds go through a compare-and-swap retry loop over the bit
//! pattern: load the current bits, compute `current + value`, attempt to swap
//! in the new bits conditioned on the location still holding the observed
//! bits, retry on mismatch. The loop is lock-free, unbounded under contention
//! (fairness is left to the scheduler), and converges to exactly one net add
//! per call with no lost updates under arbitrary interleavings.
//!
//! Ordering is sequentially consistent per address; there is no ordering
//! guarantee between different addresses.

use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU32, AtomicU64, Ordering};

use num_complex::{Complex32, Complex64};

/// Uniform entry point for kernels generic over the accumulated element type.
pub trait AtomicAccumulate {
    type Value: Copy;

    /// Add `value` to the cell as a single indivisible update.
    fn atomic_add(&self, value: Self::Value);
}

// ── Real-valued cells ─────────────────────────────────────────────

/// An `f32` cell supporting lock-free atomic addition.
#[derive(Debug, Default)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self { bits: AtomicU32::new(value.to_bits()) }
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::SeqCst))
    }

    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::SeqCst);
    }

    /// Atomically add `value`, returning the previous value.
    pub fn fetch_add(&self, value: f32) -> f32 {
        let mut observed = self.bits.load(Ordering::SeqCst);
        loop {
            let new = f32::from_bits(observed) + value;
            match self.bits.compare_exchange_weak(
                observed,
                new.to_bits(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(prev) => return f32::from_bits(prev),
                Err(actual) => observed = actual,
            }
        }
    }
}

/// An `f64` cell supporting lock-free atomic addition.
///
/// This is the wide-word path: hardware without a native 64-bit float add
/// runs the same retry loop over the 64-bit bit pattern.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self { bits: AtomicU64::new(value.to_bits()) }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::SeqCst);
    }

    /// Atomically add `value`, returning the previous value.
    pub fn fetch_add(&self, value: f64) -> f64 {
        let mut observed = self.bits.load(Ordering::SeqCst);
        loop {
            let new = f64::from_bits(observed) + value;
            match self.bits.compare_exchange_weak(
                observed,
                new.to_bits(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(prev) => return f64::from_bits(prev),
                Err(actual) => observed = actual,
            }
        }
    }
}

impl AtomicAccumulate for AtomicF32 {
    type Value = f32;

    fn atomic_add(&self, value: f32) {
        self.fetch_add(value);
    }
}

impl AtomicAccumulate for AtomicF64 {
    type Value = f64;

    fn atomic_add(&self, value: f64) {
        self.fetch_add(value);
    }
}

// ── Composite (complex) cells ─────────────────────────────────────

/// A single-precision complex cell: a real component followed by an
/// imaginary component at the adjacent offset.
///
/// `fetch_add` decomposes into two independent component adds. The pair is
/// **not atomic as a pair**: a concurrent reader may observe a torn update
/// (real component updated, imaginary not yet). Each component individually
/// never loses an update.
#[derive(Debug, Default)]
#[repr(C)]
pub struct AtomicComplex32 {
    re: AtomicF32,
    im: AtomicF32,
}

impl AtomicComplex32 {
    pub fn new(value: Complex32) -> Self {
        Self { re: AtomicF32::new(value.re), im: AtomicF32::new(value.im) }
    }

    /// Read the cell. Subject to the torn-pair caveat above when readers
    /// race with writers.
    pub fn load(&self) -> Complex32 {
        Complex32::new(self.re.load(), self.im.load())
    }

    /// Atomically add each component. No combined previous value is returned
    /// because the pair update is not indivisible.
    pub fn fetch_add(&self, value: Complex32) {
        self.re.fetch_add(value.re);
        self.im.fetch_add(value.im);
    }
}

/// A double-precision complex cell. Same component-wise contract as
/// [`AtomicComplex32`].
#[derive(Debug, Default)]
#[repr(C)]
pub struct AtomicComplex64 {
    re: AtomicF64,
    im: AtomicF64,
}

impl AtomicComplex64 {
    pub fn new(value: Complex64) -> Self {
        Self { re: AtomicF64::new(value.re), im: AtomicF64::new(value.im) }
    }

    pub fn load(&self) -> Complex64 {
        Complex64::new(self.re.load(), self.im.load())
    }

    pub fn fetch_add(&self, value: Complex64) {
        self.re.fetch_add(value.re);
        self.im.fetch_add(value.im);
    }
}

impl AtomicAccumulate for AtomicComplex32 {
    type Value = Complex32;

    fn atomic_add(&self, value: Complex32) {
        self.fetch_add(value);
    }
}

impl AtomicAccumulate for AtomicComplex64 {
    type Value = Complex64;

    fn atomic_add(&self, value: Complex64) {
        self.fetch_add(value);
    }
}

// ── Compare-and-swap building blocks ──────────────────────────────

/// Compare-and-swap on a 32-bit integer cell.
///
/// Returns the value observed at the cell: equal to `expected` iff the swap
/// succeeded. Exposed independently for custom lock-free protocols.
pub fn atomic_cas_i32(address: &AtomicI32, expected: i32, desired: i32) -> i32 {
    match address.compare_exchange(expected, desired, Ordering::SeqCst, Ordering::SeqCst) {
        Ok(observed) | Err(observed) => observed,
    }
}

/// Compare-and-swap on a 64-bit integer cell.
pub fn atomic_cas_i64(address: &AtomicI64, expected: i64, desired: i64) -> i64 {
    match address.compare_exchange(expected, desired, Ordering::SeqCst, Ordering::SeqCst) {
        Ok(observed) | Err(observed) => observed,
    }
}
