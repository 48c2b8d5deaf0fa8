//! Warp execution model: lockstep lane cohorts
//!
//! A warp is a fixed-size group of [`WARP_SIZE`] lanes executing in lockstep.
//! On SIMT hardware the lockstep is physical; here it is modelled as a
//! barrier-synchronised cohort of OS threads, one per lane, sharing a
//! [`WarpState`]. Lanes communicate only through the explicit exchange, vote,
//! and reduction calls in the submodules — there is no ambient shared mutable
//! state visible to kernel code.
//!
//! Every collective call (exchange, vote, sync) must be reached by **all**
//! lanes of the cohort, in the same order. This mirrors SIMT execution, where
//! masked-off lanes still occupy their instruction slot: a lane outside the
//! declared participation mask passes through the collective, but its slot
//! holds an unspecified value and it must not be used as a communication
//! source or target. A lane that skips a collective while others wait in it
//! deadlocks the cohort — the classic divergence bug this layer exists to
//! make explicit.

pub mod exchange;
pub mod reduce;
pub mod vote;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};

use crate::error::{Result, WarpError};
use crate::{bits, runtime_error};

/// The number of lanes in a warp (matches the canonical hardware group size).
pub const WARP_SIZE: u32 = 32;

/// Full warp mask (all 32 lanes active).
pub const FULL_MASK: u32 = 0xFFFF_FFFF;

// ── Shared lockstep state ─────────────────────────────────────────

/// Per-warp shared state backing the collective primitives.
///
/// Exchange and vote values move through 32-bit word buffers; wider element
/// types are split into words by the [`exchange`] layer. The barrier enforces
/// the write-then-read phases of each collective round.
pub struct WarpState {
    /// Word buffer for exchange operations. Each lane publishes its word,
    /// then reads its partner's after the write barrier.
    exchange_buf: [AtomicU32; WARP_SIZE as usize],

    /// Predicate buffer for vote/ballot operations.
    predicate_buf: [AtomicU32; WARP_SIZE as usize],

    /// Bitmask of active lanes. Bit `i` set means lane `i` participates in
    /// collectives by default.
    active_mask: AtomicU32,

    /// Phase barrier shared by all lanes of the cohort.
    barrier: Barrier,
}

impl WarpState {
    /// Create warp state with all lanes active.
    pub fn new() -> Self {
        const ZERO: AtomicU32 = AtomicU32::new(0);
        Self {
            exchange_buf: [ZERO; WARP_SIZE as usize],
            predicate_buf: [ZERO; WARP_SIZE as usize],
            active_mask: AtomicU32::new(FULL_MASK),
            barrier: Barrier::new(WARP_SIZE as usize),
        }
    }

    /// Current active-lane mask.
    pub fn active_mask(&self) -> u32 {
        self.active_mask.load(Ordering::SeqCst)
    }

    pub(crate) fn set_lane_active(&self, lane: u32, active: bool) {
        debug_assert!(lane < WARP_SIZE);
        if active {
            self.active_mask.fetch_or(1 << lane, Ordering::SeqCst);
        } else {
            self.active_mask.fetch_and(!(1 << lane), Ordering::SeqCst);
        }
    }

    /// One collective 32-bit exchange round: publish `word`, barrier, read
    /// from `src` (own word when `src` is `None`), barrier.
    ///
    /// The trailing barrier keeps the next round from overwriting the buffer
    /// before every lane has read.
    pub(crate) fn word_exchange(&self, lane: u32, word: u32, src: Option<u32>) -> u32 {
        debug_assert!(lane < WARP_SIZE);
        self.exchange_buf[lane as usize].store(word, Ordering::SeqCst);
        self.barrier.wait();
        let out = match src {
            Some(s) => {
                debug_assert!(s < WARP_SIZE);
                self.exchange_buf[s as usize].load(Ordering::SeqCst)
            }
            None => word,
        };
        self.barrier.wait();
        out
    }

    /// One collective ballot round: publish `predicate`, barrier, gather the
    /// votes of lanes named by `mask`, barrier.
    pub(crate) fn ballot_word(&self, lane: u32, predicate: bool, mask: u32) -> u32 {
        debug_assert!(lane < WARP_SIZE);
        self.predicate_buf[lane as usize].store(predicate as u32, Ordering::SeqCst);
        self.barrier.wait();
        let mut result = 0u32;
        for i in 0..WARP_SIZE {
            if (mask >> i) & 1 == 1 && self.predicate_buf[i as usize].load(Ordering::SeqCst) != 0 {
                result |= 1 << i;
            }
        }
        self.barrier.wait();
        result
    }

    pub(crate) fn sync(&self) {
        self.barrier.wait();
    }
}

impl Default for WarpState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Per-lane handle ───────────────────────────────────────────────

/// A lane's view of its warp: identity, participation, and the entry point
/// for every collective primitive.
///
/// Handed to each lane closure by [`Warp::launch`]. Lane identity and group
/// membership are stable for the lifetime of one launch.
#[derive(Clone)]
pub struct LaneHandle {
    lane: u32,
    group: u32,
    state: Arc<WarpState>,
}

impl LaneHandle {
    /// Build a handle for `lane` against existing warp state.
    ///
    /// Exposed for custom harnesses; [`Warp::launch`] is the usual entry.
    pub fn new(lane: u32, group: u32, state: Arc<WarpState>) -> Result<Self> {
        if lane >= WARP_SIZE {
            return Err(runtime_error!(
                "Lane index {} exceeds warp size {}",
                lane,
                WARP_SIZE
            ));
        }
        Ok(Self { lane, group, state })
    }

    /// This lane's position within its warp, in `[0, WARP_SIZE)`.
    pub fn lane_index(&self) -> u32 {
        self.lane
    }

    /// Which warp within the launched block this lane belongs to.
    pub fn group_index(&self) -> u32 {
        self.group
    }

    /// True for the lane at offset 0.
    pub fn is_leader(&self) -> bool {
        self.lane == 0
    }

    /// Bitmask of all lanes below this one.
    pub fn lanemask_lt(&self) -> u32 {
        bits::lanemask_lt(self.lane)
    }

    /// Mask of lanes currently participating in collectives.
    pub fn active_lane_mask(&self) -> u32 {
        self.state.active_mask()
    }

    /// Declare this lane active or inactive for subsequent collectives.
    ///
    /// An inactive lane still passes through every collective call (lockstep
    /// is preserved); it is only excluded from the logical participation set.
    pub fn set_active(&self, active: bool) {
        self.state.set_lane_active(self.lane, active);
    }

    /// Barrier: every lane in `mask` reaches this point before any proceeds.
    ///
    /// Required before and after any exchange sequence that straddles a
    /// control-flow divergence. All cohort lanes must reach the call; `mask`
    /// declares which of them the caller logically synchronises with.
    pub fn group_sync(&self, mask: u32) {
        let _ = mask;
        self.state.sync();
    }

    pub(crate) fn state(&self) -> &WarpState {
        &self.state
    }
}

// ── Cohort launcher ───────────────────────────────────────────────

/// Launches lockstep lane cohorts.
pub struct Warp;

impl Warp {
    /// Run `f` on every lane of a single warp and collect the per-lane
    /// results in lane order.
    pub fn launch<R, F>(f: F) -> Result<Vec<R>>
    where
        F: Fn(&LaneHandle) -> R + Sync,
        R: Send,
    {
        Self::launch_block(1, f)
    }

    /// Run `f` on every lane of `num_warps` warps sharing one block.
    ///
    /// Each warp gets its own [`WarpState`]; collectives never cross warp
    /// boundaries (only [`crate::atomic`] does). Results are returned in
    /// thread-rank order: warp 0 lanes 0..31, then warp 1, and so on.
    pub fn launch_block<R, F>(num_warps: u32, f: F) -> Result<Vec<R>>
    where
        F: Fn(&LaneHandle) -> R + Sync,
        R: Send,
    {
        if num_warps == 0 {
            return Err(runtime_error!("Block must contain at least one warp"));
        }

        let total = num_warps * WARP_SIZE;
        log::debug!("Launching block: {} warp(s), {} lanes", num_warps, total);

        let states: Vec<Arc<WarpState>> =
            (0..num_warps).map(|_| Arc::new(WarpState::new())).collect();
        let f = &f;

        std::thread::scope(|s| {
            let mut handles = Vec::with_capacity(total as usize);
            for group in 0..num_warps {
                for lane in 0..WARP_SIZE {
                    let state = Arc::clone(&states[group as usize]);
                    handles.push(s.spawn(move || {
                        let handle = LaneHandle { lane, group, state };
                        f(&handle)
                    }));
                }
            }

            let mut results = Vec::with_capacity(handles.len());
            for (rank, h) in handles.into_iter().enumerate() {
                let rank = rank as u32;
                results.push(h.join().map_err(|_| {
                    WarpError::LaneFailure(format!(
                        "lane {} of warp {} panicked during launch",
                        rank % WARP_SIZE,
                        rank / WARP_SIZE
                    ))
                })?);
            }
            log::debug!("Block complete: {} lanes joined", results.len());
            Ok(results)
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_warp_state() {
        let state = WarpState::new();
        assert_eq!(state.active_mask(), FULL_MASK);
    }

    #[test]
    fn test_lane_handle_invalid_lane() {
        let state = Arc::new(WarpState::new());
        assert!(LaneHandle::new(WARP_SIZE, 0, state).is_err());
    }

    #[test]
    fn test_launch_lane_identity() {
        let ids = Warp::launch(|lane| (lane.lane_index(), lane.group_index())).unwrap();
        assert_eq!(ids.len(), WARP_SIZE as usize);
        for (i, (lane, group)) in ids.iter().enumerate() {
            assert_eq!(*lane, i as u32);
            assert_eq!(*group, 0);
        }
    }

    #[test]
    fn test_launch_block_group_identity() {
        let ids = Warp::launch_block(3, |lane| lane.group_index()).unwrap();
        assert_eq!(ids.len(), 3 * WARP_SIZE as usize);
        for (rank, group) in ids.iter().enumerate() {
            assert_eq!(*group, rank as u32 / WARP_SIZE);
        }
    }

    #[test]
    fn test_launch_zero_warps_rejected() {
        assert!(Warp::launch_block(0, |lane| lane.lane_index()).is_err());
    }

    #[test]
    fn test_group_sync_lockstep() {
        // All lanes must pass the barrier; a deadlock here fails by timeout.
        let out = Warp::launch(|lane| {
            lane.group_sync(FULL_MASK);
            lane.lane_index()
        })
        .unwrap();
        assert_eq!(out[31], 31);
    }

    #[test]
    fn test_leader_and_lanemask() {
        let out = Warp::launch(|lane| (lane.is_leader(), lane.lanemask_lt())).unwrap();
        assert!(out[0].0);
        assert!(!out[5].0);
        assert_eq!(out[0].1, 0);
        assert_eq!(out[4].1, 0b1111);
    }

    #[test]
    fn test_set_active_updates_mask() {
        let masks = Warp::launch(|lane| {
            if lane.lane_index() == 5 {
                lane.set_active(false);
            }
            lane.group_sync(FULL_MASK);
            lane.active_lane_mask()
        })
        .unwrap();
        for mask in masks {
            assert_eq!(mask, FULL_MASK & !(1 << 5));
        }
    }
}
