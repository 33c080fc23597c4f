//! Image set and the index state machine that walks it.
//!
//! The index moves in sweeps: forward until the last slide, then back until
//! the first, and so on. Requests that would leave `[0, len - 1]` are
//! dropped without touching any state. Only auto-advance turns the sweep
//! around; explicit jumps never touch the stored direction.

use tracing::trace;

/// Ordered, fixed-size collection of slide handles, snapshotted at connect.
#[derive(Debug, Clone)]
pub struct ImageSet<H> {
    items: Vec<H>,
}

impl<H> ImageSet<H> {
    pub fn new(items: Vec<H>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&H> {
        self.items.get(index)
    }
}

impl<H> FromIterator<H> for ImageSet<H> {
    fn from_iter<I: IntoIterator<Item = H>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// An applied index transition. `old` is `None` only for the initial placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexChange {
    pub old: Option<usize>,
    pub new: usize,
}

#[derive(Debug, Clone)]
pub struct IndexState {
    len: usize,
    current: Option<usize>,
    direction: Direction,
}

impl IndexState {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            current: (len > 0).then_some(0),
            direction: Direction::Forward,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Direction the sweep is heading in. An index sitting on an end
    /// already reads as turned around there, since the next auto-advance
    /// step will turn it.
    pub fn direction(&self) -> Direction {
        match self.current {
            Some(0) => Direction::Forward,
            Some(current) if current + 1 == self.len => Direction::Reverse,
            _ => self.direction,
        }
    }

    pub fn is_reverse(&self) -> bool {
        self.direction() == Direction::Reverse
    }

    /// The placement that puts the first slide on screen.
    pub fn initial_change(&self) -> Option<IndexChange> {
        self.current.map(|new| IndexChange { old: None, new })
    }

    /// Current index shifted by `delta`, for relative requests.
    pub fn offset(&self, delta: isize) -> Option<isize> {
        self.current
            .and_then(|current| isize::try_from(current).ok())
            .map(|current| current.saturating_add(delta))
    }

    /// Move to `requested`. Missing or out-of-range requests are no-ops.
    pub fn set_index(&mut self, requested: Option<isize>) -> Option<IndexChange> {
        let Some(requested) = requested else {
            trace!("index request without a value ignored");
            return None;
        };
        let new = match usize::try_from(requested) {
            Ok(new) if new < self.len => new,
            _ => {
                trace!(requested, len = self.len, "index request out of range ignored");
                return None;
            }
        };
        let old = self.current.replace(new);
        Some(IndexChange { old, new })
    }

    /// One auto-advance step.
    ///
    /// The boundary checks look at the index before stepping; the step then
    /// goes through `set_index`, so it can never leave the valid range.
    pub fn advance(&mut self) -> Option<IndexChange> {
        self.current?;
        self.settle_direction();
        let delta = match self.direction {
            Direction::Reverse => -1,
            Direction::Forward => 1,
        };
        self.set_index(self.offset(delta))
    }

    fn settle_direction(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        // last first, so a single slide ends up forward
        if current + 1 == self.len {
            self.direction = Direction::Reverse;
        }
        if current == 0 {
            self.direction = Direction::Forward;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_requests_leave_state_alone() {
        let mut state = IndexState::new(4);
        state.set_index(Some(2)).unwrap();
        for bad in [None, Some(-1), Some(4), Some(isize::MAX), Some(isize::MIN)] {
            assert!(state.set_index(bad).is_none());
            assert_eq!(state.current(), Some(2));
        }
    }

    #[test]
    fn empty_set_has_no_index() {
        let mut state = IndexState::new(0);
        assert_eq!(state.current(), None);
        assert!(state.initial_change().is_none());
        assert!(state.set_index(Some(0)).is_none());
        assert!(state.advance().is_none());
        assert_eq!(state.offset(1), None);
    }

    #[test]
    fn three_slides_sweep_back_and_forth() {
        let mut state = IndexState::new(3);
        assert_eq!(state.current(), Some(0));
        assert_eq!(state.direction(), Direction::Forward);

        state.advance();
        state.advance();
        assert_eq!(state.current(), Some(2));
        assert!(state.is_reverse());

        state.advance();
        assert_eq!(state.current(), Some(1));

        state.advance();
        state.advance();
        assert_eq!(state.current(), Some(0));
        assert_eq!(state.direction(), Direction::Forward);

        let change = state.advance().unwrap();
        assert_eq!(change, IndexChange { old: Some(0), new: 1 });
    }

    #[test]
    fn single_slide_never_moves() {
        let mut state = IndexState::new(1);
        for _ in 0..5 {
            assert!(state.advance().is_none());
            assert_eq!(state.current(), Some(0));
        }
    }

    #[test]
    fn two_slides_alternate() {
        let mut state = IndexState::new(2);
        let seen: Vec<usize> = (0..6)
            .map(|_| state.advance().map(|c| c.new).unwrap())
            .collect();
        assert_eq!(seen, vec![1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn sweep_only_reverses_at_the_ends() {
        let len = 6;
        let mut state = IndexState::new(len);
        let mut last_direction = state.direction();
        for _ in 0..40 {
            state.advance().unwrap();
            let current = state.current().unwrap();
            if state.direction() != last_direction {
                match state.direction() {
                    Direction::Reverse => assert_eq!(current, len - 1),
                    Direction::Forward => assert_eq!(current, 0),
                }
            }
            last_direction = state.direction();
        }
    }

    #[test]
    fn arbitrary_requests_stay_in_range() {
        let len = 5;
        let mut state = IndexState::new(len);
        // cheap deterministic mix of in-range, boundary, and wild requests
        let mut seed: i64 = 17;
        for step in 0..500 {
            seed = (seed * 1_103_515_245 + 12_345) % 2_147_483_648;
            let requested = match step % 4 {
                0 => None,
                1 => Some((seed % 11 - 3) as isize),
                2 => state.offset(if seed % 2 == 0 { 1 } else { -1 }),
                _ => {
                    state.advance();
                    continue;
                }
            };
            state.set_index(requested);
            let current = state.current().unwrap();
            assert!(current < len);
        }
    }

    #[test]
    fn direct_jump_to_last_reverses_next_step() {
        let mut state = IndexState::new(5);
        state.set_index(Some(4)).unwrap();
        assert!(state.is_reverse());
        assert_eq!(state.advance().unwrap().new, 3);
    }

    #[test]
    fn jumps_between_ticks_keep_the_sweep_direction() {
        let mut state = IndexState::new(5);
        state.set_index(Some(4)).unwrap();
        state.set_index(Some(3)).unwrap();
        assert_eq!(state.direction(), Direction::Forward);
        assert_eq!(state.advance().unwrap().new, 4);

        // Reaching the end by ticks, then stepping back by hand.
        let mut state = IndexState::new(5);
        for _ in 0..4 {
            state.advance().unwrap();
        }
        assert_eq!(state.current(), Some(4));
        assert!(state.is_reverse());
        state.set_index(state.offset(-1)).unwrap();
        assert_eq!(state.advance().unwrap().new, 4);
        assert_eq!(state.advance().unwrap().new, 3);
    }
}
