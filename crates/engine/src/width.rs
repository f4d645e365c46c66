//! Width changes: increases that knit a row while splitting new loops in
//! at the edges, and decreases that only move loops inward.
//!
//! All operations validate before emitting anything. A rejected request
//! leaves both the tube state and the instruction stream untouched. Each
//! one hands the machine back at rack 0.

use crate::engine::{Knitter, down_by_two, is_even, up_by_two};
use tracing::trace;
use tubeknit_core::{Direction, InstructionSink, KnittingState, Needle, Rack, ShapingError};

impl<S: InstructionSink> Knitter<S> {
    /// Knit one row and add two needles at the `min` edge, `stitches` in
    /// from the edge. `min -= 2`, `row += 1`.
    pub fn increase_left(
        &mut self,
        state: &mut KnittingState,
        stitches: i32,
    ) -> Result<(), ShapingError> {
        check_increase(state, stitches, 2 * stitches + 3)?;
        let (min, max) = (state.min, state.max);
        let front_gap = 2 * stitches + 1;
        let back_gap = 2 * stitches;
        let carrier = state.carrier;
        trace!(min, max, stitches, "increase left");

        self.knit_front(state, max, min + front_gap + 2, false);
        self.split(
            Direction::Right,
            Needle::front(min + front_gap),
            Needle::back(min + front_gap),
            carrier,
        );
        self.knit_front(state, min + front_gap - 2, min, false);

        self.knit_back(state, min, min + back_gap - 2, false);
        self.split(
            Direction::Left,
            Needle::back(min + back_gap),
            Needle::front(min + back_gap),
            carrier,
        );
        self.miss(Direction::Left, Needle::back(min - 5), carrier);

        self.funnel_left(min, front_gap, back_gap);

        self.knit_back(state, min + back_gap + 2, max, false);
        state.min -= 2;
        state.row += 1;
        Ok(())
    }

    /// Knit one row and add two needles at the `max` edge, `stitches` in
    /// from the edge. `max += 2`, `row += 1`.
    pub fn increase_right(
        &mut self,
        state: &mut KnittingState,
        stitches: i32,
    ) -> Result<(), ShapingError> {
        check_increase(state, stitches, 2 * stitches + 3)?;
        let (min, max) = (state.min, state.max);
        let front_gap = 2 * stitches;
        let back_gap = 2 * stitches + 1;
        let carrier = state.carrier;
        trace!(min, max, stitches, "increase right");

        self.knit_front(state, max, max - front_gap + 2, false);
        self.split(
            Direction::Right,
            Needle::front(max - front_gap),
            Needle::back(max - front_gap),
            carrier,
        );
        self.knit_front(state, max - front_gap - 2, min, false);
        self.knit_back(state, min, max - back_gap - 2, false);
        self.split(
            Direction::Left,
            Needle::back(max - back_gap),
            Needle::front(max - back_gap),
            carrier,
        );
        self.miss(Direction::Left, Needle::back(max - back_gap - 2), carrier);

        self.funnel_right(max, front_gap, back_gap);

        state.max += 2;
        self.knit_back(state, state.max - back_gap + 2, state.max, false);
        state.row += 1;
        Ok(())
    }

    /// Knit one row and add two needles at each edge. The left funnel runs
    /// before the back pass reaches the right split so the two transfer
    /// batches never interleave.
    pub fn increase_both(
        &mut self,
        state: &mut KnittingState,
        stitches: i32,
    ) -> Result<(), ShapingError> {
        check_increase(state, stitches, 4 * stitches + 5)?;
        let (min, max) = (state.min, state.max);
        let even_gap = 2 * stitches;
        let odd_gap = 2 * stitches + 1;
        let carrier = state.carrier;
        trace!(min, max, stitches, "increase both");

        self.knit_front(state, max, max - even_gap + 2, false);
        self.split(
            Direction::Right,
            Needle::front(max - even_gap),
            Needle::back(max - even_gap),
            carrier,
        );
        self.knit_front(state, max - even_gap - 2, min + odd_gap + 2, false);
        self.split(
            Direction::Right,
            Needle::front(min + odd_gap),
            Needle::back(min + odd_gap),
            carrier,
        );
        self.knit_front(state, min + odd_gap - 2, min, false);

        self.knit_back(state, min, min + even_gap - 2, false);
        self.split(
            Direction::Left,
            Needle::back(min + even_gap),
            Needle::front(min + even_gap),
            carrier,
        );
        self.miss(Direction::Left, Needle::back(min - 4), carrier);
        self.funnel_left(min, odd_gap, even_gap);

        self.knit_back(state, min + even_gap + 2, max - odd_gap - 2, false);
        state.min -= 2;

        self.split(
            Direction::Left,
            Needle::back(max - odd_gap),
            Needle::front(max - odd_gap),
            carrier,
        );
        self.miss(Direction::Left, Needle::back(max - odd_gap - 2), carrier);
        self.funnel_right(max, even_gap, odd_gap);

        state.max += 2;
        self.knit_back(state, state.max - odd_gap + 2, state.max, false);
        state.row += 1;
        Ok(())
    }

    /// Move a run of `2·stitches - 1` needles at the `min` edge inward by
    /// two. No knitting. `min += 2`.
    pub fn decrease_left(
        &mut self,
        state: &mut KnittingState,
        stitches: i32,
    ) -> Result<(), ShapingError> {
        let needles = check_decrease(state, stitches)?;
        trace!(min = state.min, max = state.max, needles, "decrease left");

        // back bed
        let min = state.min;
        for j in up_by_two(min, min + needles) {
            self.xfer(Needle::back(j), Needle::front(j));
        }
        self.set_rack(Rack::needles(-2));
        for j in up_by_two(min, min + needles) {
            self.xfer(Needle::front(j), Needle::back(j + 2));
        }
        state.min += 1;

        // front bed
        let min = state.min;
        for j in up_by_two(min, min + needles) {
            self.xfer(Needle::front(j), Needle::back(j + 2));
        }
        self.set_rack(Rack::ZERO);
        for j in up_by_two(min, min + needles) {
            self.xfer(Needle::back(j + 2), Needle::front(j + 2));
        }
        state.min += 1;
        Ok(())
    }

    /// Move a run of `2·stitches - 1` needles at the `max` edge inward by
    /// two. No knitting. `max -= 2`.
    pub fn decrease_right(
        &mut self,
        state: &mut KnittingState,
        stitches: i32,
    ) -> Result<(), ShapingError> {
        let needles = check_decrease(state, stitches)?;
        trace!(min = state.min, max = state.max, needles, "decrease right");

        // front bed
        let max = state.max;
        for j in down_by_two(max, max - needles) {
            self.xfer(Needle::front(j), Needle::back(j));
        }
        self.set_rack(Rack::needles(-2));
        for j in down_by_two(max, max - needles) {
            self.xfer(Needle::back(j), Needle::front(j - 2));
        }
        state.max -= 1;

        // back bed
        let max = state.max;
        for j in down_by_two(max, max - needles) {
            self.xfer(Needle::back(j), Needle::front(j - 2));
        }
        self.set_rack(Rack::ZERO);
        for j in down_by_two(max, max - needles) {
            self.xfer(Needle::front(j - 2), Needle::back(j - 2));
        }
        state.max -= 1;
        Ok(())
    }

    /// Decrease all four corners at once. No knitting.
    ///
    /// `front_stitches` sets the run length at the front-bed corners and
    /// `back_stitches` at the back-bed corners. Unless `maintain_carrier`
    /// is set, the carrier is first parked just past `max` so the
    /// following pass does not drag it across the moved loops.
    pub fn decrease_both(
        &mut self,
        state: &mut KnittingState,
        front_stitches: i32,
        back_stitches: i32,
        maintain_carrier: bool,
    ) -> Result<(), ShapingError> {
        let front_needles = check_decrease(state, front_stitches)?;
        let back_needles = check_decrease(state, back_stitches)?;
        let (min, max) = (state.min, state.max);
        let widest = front_needles.max(back_needles);
        if min + 2 * widest >= max {
            return Err(ShapingError::DecreasesOverlap {
                min,
                max,
                needles: widest,
            });
        }
        trace!(min, max, front_needles, back_needles, "decrease both");

        if !maintain_carrier {
            self.miss(Direction::Right, Needle::back(max + 1), state.carrier);
        }

        // front right and back left, first half
        for j in (max - front_needles..=max).rev().filter(|&j| is_even(j)) {
            self.xfer(Needle::front(j), Needle::back(j));
        }
        for j in (min..=min + back_needles).rev().filter(|&j| !is_even(j)) {
            self.xfer(Needle::back(j), Needle::front(j));
        }
        self.set_rack(Rack::needles(-2));
        for j in (min..=min + back_needles).filter(|&j| !is_even(j)) {
            self.xfer(Needle::front(j), Needle::back(j + 2));
        }
        for j in (max - front_needles..=max).filter(|&j| is_even(j)) {
            self.xfer(Needle::back(j), Needle::front(j - 2));
        }
        state.max -= 1;
        state.min += 1;

        // back right and front left, second half
        let (min, max) = (state.min, state.max);
        for j in (max - back_needles..=max).rev().filter(|&j| !is_even(j)) {
            self.xfer(Needle::back(j), Needle::front(j - 2));
        }
        for j in (min..=min + front_needles).rev().filter(|&j| is_even(j)) {
            self.xfer(Needle::front(j), Needle::back(j + 2));
        }
        self.set_rack(Rack::ZERO);
        for j in (min..=min + front_needles).filter(|&j| is_even(j)) {
            self.xfer(Needle::back(j + 2), Needle::front(j + 2));
        }
        for j in (max - back_needles..=max).filter(|&j| !is_even(j)) {
            self.xfer(Needle::front(j - 2), Needle::back(j - 2));
        }
        state.min += 1;
        state.max -= 1;
        Ok(())
    }

    // ── Internal ───────────────────────────────────────────────────

    /// Shift the loops between `min` and the left splits two needles
    /// outward, then settle them on their home beds.
    fn funnel_left(&mut self, min: i32, front_gap: i32, back_gap: i32) {
        for i in down_by_two(min + back_gap - 2, min) {
            self.xfer(Needle::back(i), Needle::front(i));
        }
        self.set_rack(Rack::needles(2));
        for i in down_by_two(min + back_gap, min) {
            self.xfer(Needle::front(i), Needle::back(i - 2));
        }
        for i in down_by_two(min + front_gap, min + 1) {
            self.xfer(Needle::front(i), Needle::back(i - 2));
        }
        self.set_rack(Rack::ZERO);
        for i in down_by_two(min + front_gap, min + 1) {
            self.xfer(Needle::back(i - 2), Needle::front(i - 2));
        }
        // split loops back to their home beds
        self.xfer(Needle::back(min + front_gap), Needle::front(min + front_gap));
        self.xfer(Needle::front(min + back_gap), Needle::back(min + back_gap));
    }

    /// Mirror of [`Self::funnel_left`] for the `max` edge.
    fn funnel_right(&mut self, max: i32, front_gap: i32, back_gap: i32) {
        for i in up_by_two(max - front_gap + 2, max) {
            self.xfer(Needle::front(i), Needle::back(i));
        }
        self.set_rack(Rack::needles(2));
        for i in up_by_two(max - front_gap, max) {
            self.xfer(Needle::back(i), Needle::front(i + 2));
        }
        for i in up_by_two(max - back_gap, max - 1) {
            self.xfer(Needle::back(i), Needle::front(i + 2));
        }
        self.set_rack(Rack::ZERO);
        for i in up_by_two(max - back_gap, max - 1) {
            self.xfer(Needle::front(i + 2), Needle::back(i + 2));
        }
        self.xfer(Needle::back(max - front_gap), Needle::front(max - front_gap));
        self.xfer(Needle::front(max - back_gap), Needle::back(max - back_gap));
    }
}

/// `span` is how far the increase zone reaches in from the edge.
fn check_increase(state: &KnittingState, stitches: i32, span: i32) -> Result<(), ShapingError> {
    if stitches < 1 {
        return Err(ShapingError::InvalidStitchCount(stitches));
    }
    if state.min + span > state.max {
        return Err(ShapingError::IncreaseTooWide {
            stitches,
            min: state.min,
            max: state.max,
        });
    }
    Ok(())
}

/// Returns the needle run length `2·stitches - 1`.
fn check_decrease(state: &KnittingState, stitches: i32) -> Result<i32, ShapingError> {
    if stitches < 1 {
        return Err(ShapingError::InvalidStitchCount(stitches));
    }
    let needles = stitches * 2 - 1;
    let available = state.max - state.min;
    if needles > available {
        return Err(ShapingError::DecreaseTooWide { needles, available });
    }
    Ok(needles)
}
