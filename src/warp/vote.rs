//! Group-wide boolean votes
//!
//! Each lane contributes a predicate; the group agrees on a bitmask
//! (`ballot`) or a single bool (`any` / `all`). Votes are collective: every
//! cohort lane must reach the call. The participation `mask` names the lanes
//! whose votes count; [`LaneHandle::active_lane_mask`] is the conventional
//! default.

use super::LaneHandle;

impl LaneHandle {
    /// Bitmask with bit `i` set iff lane `i` is in `mask` and voted true.
    ///
    /// Every cohort lane must reach the call; a lane outside `mask` passes
    /// through but its vote does not count and its own result is
    /// unspecified.
    pub fn ballot(&self, predicate: bool, mask: u32) -> u32 {
        self.state().ballot_word(self.lane_index(), predicate, mask)
    }

    /// True iff at least one lane in `mask` voted true.
    pub fn any(&self, predicate: bool, mask: u32) -> bool {
        self.ballot(predicate, mask) != 0
    }

    /// True iff every lane in `mask` voted true.
    pub fn all(&self, predicate: bool, mask: u32) -> bool {
        self.ballot(predicate, mask) == mask
    }

    /// Number of lanes in `mask` that voted true.
    pub fn ballot_count(&self, predicate: bool, mask: u32) -> u32 {
        self.ballot(predicate, mask).count_ones()
    }
}

#[cfg(test)]
mod tests {
    use crate::warp::{Warp, FULL_MASK, WARP_SIZE};

    #[test]
    fn test_ballot_even_lanes() {
        let out = Warp::launch(|lane| {
            lane.ballot(lane.lane_index() % 2 == 0, FULL_MASK)
        })
        .unwrap();
        for mask in out {
            assert_eq!(mask, 0x5555_5555);
        }
    }

    #[test]
    fn test_ballot_restricted_mask() {
        // Everyone votes true; only the low half's votes count.
        let out = Warp::launch(|lane| lane.ballot(true, 0x0000_FFFF)).unwrap();
        // Lanes outside the mask still pass through the collective; their
        // result reflects the declared participation set.
        for mask in out.iter().take(16) {
            assert_eq!(*mask, 0x0000_FFFF);
        }
    }

    #[test]
    fn test_any_all() {
        let out = Warp::launch(|lane| {
            let one_voter = lane.any(lane.lane_index() == 13, FULL_MASK);
            let unanimous = lane.all(lane.lane_index() < WARP_SIZE, FULL_MASK);
            let not_all = lane.all(lane.lane_index() != 13, FULL_MASK);
            (one_voter, unanimous, not_all)
        })
        .unwrap();
        for (one_voter, unanimous, not_all) in out {
            assert!(one_voter);
            assert!(unanimous);
            assert!(!not_all);
        }
    }

    #[test]
    fn test_ballot_count() {
        let out = Warp::launch(|lane| {
            lane.ballot_count(lane.lane_index() < 5, FULL_MASK)
        })
        .unwrap();
        for count in out {
            assert_eq!(count, 5);
        }
    }
}
