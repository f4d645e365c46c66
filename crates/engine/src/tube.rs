//! Row and tube executor: bed sweeps, full circular loops, rows with
//! optional width changes, and ribbing.
//!
//! Convention: the front bed is knit right-to-left (`max` → `min`) and
//! the back bed left-to-right, so the carrier travels clockwise around
//! the tube and ends every loop back at `max`.

use crate::engine::Knitter;
use crate::pattern::{Decision, back_decision, front_decision};
use tracing::debug;
use tubeknit_core::{
    Bed, Direction, InstructionSink, KnittingState, Needle, RowKind, ShapingError, Side,
    StitchMode,
};

impl<S: InstructionSink> Knitter<S> {
    /// Knit the front bed from `start` to `end`.
    ///
    /// Travels left when `start >= end`, right otherwise.
    pub fn knit_front(&mut self, state: &KnittingState, start: i32, end: i32, force_basic: bool) {
        let direction = Direction::between(start, end);
        self.sweep(Bed::Front, direction, state, start, end, force_basic);
    }

    /// Knit the back bed from `start` to `end`.
    ///
    /// Travels right when `start <= end`, left otherwise.
    pub fn knit_back(&mut self, state: &KnittingState, start: i32, end: i32, force_basic: bool) {
        let direction = if start <= end {
            Direction::Right
        } else {
            Direction::Left
        };
        self.sweep(Bed::Back, direction, state, start, end, force_basic);
    }

    /// One full circular pass: front `max → min`, back `min → max`.
    pub fn one_loop(&mut self, state: &mut KnittingState, force_basic: bool) {
        debug_assert!(self.rack_offset().is_zero(), "plain loop started racked");
        self.knit_front(state, state.max, state.min, force_basic);
        self.knit_back(state, state.min, state.max, force_basic);
        state.row += 1;
    }

    /// `length` plain loops.
    pub fn tube(&mut self, length: usize, state: &mut KnittingState) {
        for _ in 0..length {
            self.one_loop(state, false);
        }
    }

    /// Knit one schedule row, changing width on `side` if asked.
    ///
    /// An increase row knits exactly one row (the increase itself). A
    /// decrease row moves the loops and then knits one plain loop. If the
    /// width change is rejected, a plain loop is knit in its place so the
    /// row count still holds, and the error is returned for reporting.
    pub fn execute_row(
        &mut self,
        state: &mut KnittingState,
        side: Side,
        kind: RowKind,
        stitches: i32,
    ) -> Result<(), ShapingError> {
        let shaped = match kind {
            RowKind::Plain => {
                self.one_loop(state, false);
                return Ok(());
            }
            RowKind::Increase => match side {
                Side::Left => self.increase_left(state, stitches),
                Side::Right => self.increase_right(state, stitches),
                Side::Both => self.increase_both(state, stitches),
            },
            RowKind::Decrease => {
                let moved = self.decrease_on(state, side, stitches);
                if moved.is_ok() {
                    self.one_loop(state, false);
                }
                moved
            }
        };

        if let Err(err) = &shaped {
            debug!(row = state.row, ?side, ?kind, %err, "width change skipped, knitting plain");
            self.one_loop(state, false);
        }
        shaped
    }

    /// An `knit`×`purl` rib over the whole tube, `length` rows.
    ///
    /// Front purls are parked on the back bed and back purls on the front
    /// bed for the duration of each pass. The row counter is not touched.
    pub fn rib_tube(&mut self, knit: i32, purl: i32, length: usize, state: &KnittingState) {
        if length == 0 || knit + purl <= 0 {
            return;
        }
        let set = (knit + purl) * 2;
        let switch_point = knit * 2;
        let (min, max) = (state.min, state.max);
        let carrier = state.carrier;

        let k = |bed: Bed, n: i32| match bed {
            Bed::Front => n.rem_euclid(2) == 0 && (max - n).rem_euclid(set) < switch_point,
            Bed::Back => {
                n.rem_euclid(2) != 0 && (max - min + 1 + (n - min)).rem_euclid(set) < switch_point
            }
        };
        let p = |bed: Bed, n: i32| {
            let own = match bed {
                Bed::Front => n.rem_euclid(2) == 0,
                Bed::Back => n.rem_euclid(2) != 0,
            };
            own && !k(bed, n)
        };

        for _ in 0..length {
            for n in min..=max {
                if p(Bed::Front, n) {
                    self.xfer(Needle::front(n), Needle::back(n));
                }
            }

            for n in (min..=max).rev() {
                if k(Bed::Front, n) {
                    self.knit(Direction::Left, Needle::front(n), carrier);
                } else if p(Bed::Front, n) {
                    self.knit(Direction::Left, Needle::back(n), carrier);
                }
            }
            self.miss(Direction::Left, Needle::back(min), carrier);

            // front purls go home, back purls move over for the back pass
            for n in (min..=max).rev() {
                if p(Bed::Front, n) || p(Bed::Back, n) {
                    self.xfer(Needle::back(n), Needle::front(n));
                }
            }

            for n in min..=max {
                if k(Bed::Back, n) {
                    self.knit(Direction::Right, Needle::back(n), carrier);
                } else if p(Bed::Back, n) {
                    self.knit(Direction::Right, Needle::front(n), carrier);
                }
            }
            self.miss(Direction::Right, Needle::front(max), carrier);

            for n in min..=max {
                if p(Bed::Back, n) {
                    self.xfer(Needle::front(n), Needle::back(n));
                }
            }
        }
    }

    // ── Internal ───────────────────────────────────────────────────

    /// Single- or both-sided decrease with the same run on every corner.
    pub(crate) fn decrease_on(
        &mut self,
        state: &mut KnittingState,
        side: Side,
        stitches: i32,
    ) -> Result<(), ShapingError> {
        match side {
            Side::Left => self.decrease_left(state, stitches),
            Side::Right => self.decrease_right(state, stitches),
            Side::Both => self.decrease_both(state, stitches, stitches, false),
        }
    }

    fn sweep(
        &mut self,
        bed: Bed,
        direction: Direction,
        state: &KnittingState,
        start: i32,
        end: i32,
        force_basic: bool,
    ) {
        let decide = |n: i32| -> Decision {
            match bed {
                Bed::Front => front_decision(n, state, force_basic),
                Bed::Back => back_decision(n, state, force_basic),
            }
        };
        let (lo, hi) = (start.min(end), start.max(end));
        let carrier = state.carrier;

        // Park purls against the direction of travel, knit along it.
        let park_order: Vec<i32> = match direction {
            Direction::Left => (lo..=hi).collect(),
            Direction::Right => (lo..=hi).rev().collect(),
        };
        let knit_order: Vec<i32> = park_order.iter().rev().copied().collect();

        for &n in &park_order {
            if decide(n).purl {
                let home = Needle::on(bed, n);
                self.xfer(home, home.across());
            }
        }
        for &n in &knit_order {
            let d = decide(n);
            let home = Needle::on(bed, n);
            if d.knit {
                self.knit(direction, home, carrier);
            }
            if d.purl {
                self.knit(direction, home.across(), carrier);
            }
        }
        if state.mode != StitchMode::Plain {
            self.miss(direction, Needle::on(bed, end).across(), carrier);
        }
        for &n in &park_order {
            if decide(n).purl {
                let home = Needle::on(bed, n);
                self.xfer(home.across(), home);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Knitter;
    use tubeknit_core::{
        Carrier, Direction, Instruction, KnittingState, Needle, RowKind, Side, StitchMode,
    };

    fn tube(mode: StitchMode) -> KnittingState {
        KnittingState::new(1, 12, mode, Carrier(3)).unwrap()
    }

    #[test]
    fn plain_loop_knits_every_needle_once() {
        let mut knitter = Knitter::new();
        let mut ks = tube(StitchMode::Plain);
        knitter.one_loop(&mut ks, false);

        let program = knitter.into_sink();
        assert_eq!(program.len(), 12);
        assert_eq!(ks.row, 1);
        // front first, right to left, starting at max
        assert_eq!(
            program.instructions()[0],
            Instruction::Knit {
                direction: Direction::Left,
                needle: Needle::front(12),
                carrier: Carrier(3),
            }
        );
        assert_eq!(
            program.instructions()[11],
            Instruction::Knit {
                direction: Direction::Right,
                needle: Needle::back(11),
                carrier: Carrier(3),
            }
        );
        assert!(program.rack().is_zero());
    }

    #[test]
    fn garter_purl_row_parks_and_restores() {
        let mut knitter = Knitter::new();
        let mut ks = tube(StitchMode::Garter).at_row(1);
        knitter.one_loop(&mut ks, false);
        let program = knitter.into_sink();

        let xfers = program.count(|i| matches!(i, Instruction::Xfer { .. }));
        // 6 front + 6 back loops, out and back again
        assert_eq!(xfers, 24);
        assert_eq!(program.count(|i| matches!(i, Instruction::Miss { .. })), 2);
        // front purls are knit on the back bed
        assert!(program.instructions().contains(&Instruction::Knit {
            direction: Direction::Left,
            needle: Needle::back(12),
            carrier: Carrier(3),
        }));
    }

    #[test]
    fn tube_advances_row_per_loop() {
        let mut knitter = Knitter::new();
        let mut ks = tube(StitchMode::Seed);
        knitter.tube(5, &mut ks);
        assert_eq!(ks.row, 5);
        assert!(knitter.rack_offset().is_zero());
    }

    #[test]
    fn execute_row_dispatches_by_kind() {
        let mut knitter = Knitter::new();
        let mut ks = KnittingState::new(1, 40, StitchMode::Plain, Carrier(3)).unwrap();

        knitter.execute_row(&mut ks, Side::Both, RowKind::Plain, 2).unwrap();
        assert_eq!((ks.min, ks.max, ks.row), (1, 40, 1));

        knitter.execute_row(&mut ks, Side::Left, RowKind::Increase, 2).unwrap();
        assert_eq!((ks.min, ks.max, ks.row), (-1, 40, 2));

        knitter.execute_row(&mut ks, Side::Left, RowKind::Decrease, 2).unwrap();
        assert_eq!((ks.min, ks.max, ks.row), (1, 40, 3));

        knitter.execute_row(&mut ks, Side::Both, RowKind::Decrease, 2).unwrap();
        assert_eq!((ks.min, ks.max, ks.row), (3, 38, 4));
    }

    #[test]
    fn rejected_width_change_still_knits_the_row() {
        let mut knitter = Knitter::new();
        let mut ks = KnittingState::new(1, 8, StitchMode::Plain, Carrier(3)).unwrap();
        let err = knitter.execute_row(&mut ks, Side::Right, RowKind::Decrease, 10);
        assert!(err.is_err());
        assert_eq!((ks.min, ks.max, ks.row), (1, 8, 1));
        assert_eq!(knitter.sink().len(), 8);
    }

    #[test]
    fn rib_keeps_row_and_rack() {
        let mut knitter = Knitter::new();
        let ks = tube(StitchMode::Plain);
        knitter.rib_tube(1, 1, 3, &ks);
        let program = knitter.into_sink();
        assert_eq!(ks.row, 0);
        assert!(program.rack().is_zero());
        assert_eq!(program.count(|i| matches!(i, Instruction::Miss { .. })), 6);
        // 1x1 rib: half the needles of each pass are purled
        let knits = program.count(|i| matches!(i, Instruction::Knit { .. }));
        assert_eq!(knits, 3 * 12);
    }
}
