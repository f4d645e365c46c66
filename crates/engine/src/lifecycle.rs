//! Cast-on and bind-off: the first and last rows of a tube.

use crate::engine::{Knitter, down_by_two, is_even, up_by_two};
use tracing::info;
use tubeknit_core::{
    Bed, Carrier, Direction, Instruction, InstructionSink, KnittingState, Needle, Rack,
};

/// Fractional rack used to offset the beds for zigzag tucks.
const ZIGZAG_RACK: Rack = Rack::quarters(-3);

impl<S: InstructionSink> Knitter<S> {
    /// Bring the yarn in and cast on every needle of the tube.
    ///
    /// Even needles are tucked first while the beds sit a fraction apart,
    /// secured with a pass each way and settled onto the front bed; then
    /// the odd needles the same way onto the back bed. Ends with one plain
    /// loop, so `row += 1`.
    pub fn zigzag_cast_on(&mut self, state: &mut KnittingState) {
        let (min, max) = (state.min, state.max);
        let c = state.carrier;
        info!(min, max, carrier = %c, "casting on");

        self.emit(Instruction::InHook(c));

        // front bed (even needles)
        self.tuck(Direction::Left, Needle::front(max + 1), c);
        self.set_rack(ZIGZAG_RACK);
        for i in (min..=max).rev().filter(|&i| is_even(i)) {
            self.tuck(Direction::Left, Needle::front(i), c);
            self.tuck(Direction::Left, Needle::back(i), c);
        }
        self.drop_loop(Needle::front(max + 1));
        for i in (min..=max).filter(|&i| is_even(i)) {
            self.knit(Direction::Right, Needle::front(i), c);
        }
        for i in (min..=max).rev().filter(|&i| is_even(i)) {
            self.knit(Direction::Left, Needle::back(i), c);
        }
        self.miss(Direction::Left, Needle::back(min), c);
        self.set_rack(Rack::ZERO);
        self.emit(Instruction::ReleaseHook(c));
        for i in (min..=max).filter(|&i| is_even(i)) {
            self.xfer(Needle::back(i), Needle::front(i));
        }

        // back bed (odd needles)
        self.set_rack(ZIGZAG_RACK);
        for i in (min..=max).filter(|&i| !is_even(i)) {
            self.tuck(Direction::Right, Needle::back(i), c);
            self.tuck(Direction::Right, Needle::front(i), c);
        }
        for i in (min..=max).rev().filter(|&i| !is_even(i)) {
            self.knit(Direction::Left, Needle::back(i), c);
        }
        for i in (min..=max).filter(|&i| !is_even(i)) {
            self.knit(Direction::Right, Needle::front(i), c);
        }
        self.set_rack(Rack::ZERO);
        for i in (min..=max).rev().filter(|&i| !is_even(i)) {
            self.xfer(Needle::front(i), Needle::back(i));
        }

        self.one_loop(state, true);
    }

    /// Cast on at the cast-on stitch size, then a `knit`×`purl` rib of
    /// `rows` rows framed by plain loops at the body stitch size.
    pub fn cast_on_and_rib(
        &mut self,
        state: &mut KnittingState,
        knit: i32,
        purl: i32,
        rows: usize,
    ) {
        self.stitch_number(self.settings().cast_on_stitch);
        self.zigzag_cast_on(state);
        self.stitch_number(self.settings().body_stitch);
        self.one_loop(state, true);
        self.rib_tube(knit, purl, rows, state);
        self.one_loop(state, true);
    }

    /// Bind off one bed, chaining each loop into its neighbour two needles
    /// inward. Front binds off right to left, back left to right.
    ///
    /// Before each step a small anchor tuck is made on the opposite bed,
    /// `2·slack` needles out, to keep the edge stretchy.
    pub fn bindoff_edge(&mut self, state: &KnittingState, bed: Bed, slack: i32) {
        let (min, max) = (state.min, state.max);
        let c = state.carrier;
        let tuck_stitch = self.settings().tuck_stitch;
        let bindoff_stitch = self.settings().bindoff_stitch;

        let (steps, tuck_dir, knit_dir, shift): (Vec<i32>, Direction, Direction, i32) = match bed {
            Bed::Front => (
                (min + 2..=max).rev().filter(|&i| is_even(i)).collect(),
                Direction::Right,
                Direction::Left,
                -2,
            ),
            Bed::Back => (
                (min..max - 1).filter(|&i| !is_even(i)).collect(),
                Direction::Left,
                Direction::Right,
                2,
            ),
        };
        let other = bed.opposite();

        for i in steps {
            let next = i + shift;
            self.stitch_number(tuck_stitch);
            self.tuck(tuck_dir, Needle::on(other, i - slack * shift), c);
            self.stitch_number(bindoff_stitch);
            self.set_rack(Rack::needles(2));
            self.xfer(Needle::on(bed, i), Needle::on(other, next));
            self.set_rack(Rack::ZERO);
            self.xfer(Needle::on(other, next), Needle::on(bed, next));
            self.knit(knit_dir, Needle::on(bed, next), c);
        }
    }

    /// Bind off the whole tube, knit a tag on the last loop, and clear both
    /// beds. Consumes the tube's state.
    pub fn bindoff_tube(&mut self, state: KnittingState) {
        let (min, max) = (state.min, state.max);
        let c = state.carrier;
        let slack = self.settings().bindoff_slack;
        info!(min, max, row = state.row, "binding off");

        self.bindoff_edge(&state, Bed::Front, slack);

        // cross from the front bed to the back
        self.set_rack(Rack::needles(1));
        self.xfer(Needle::front(min + 1), Needle::back(min));
        self.set_rack(Rack::ZERO);
        self.knit(Direction::Right, Needle::back(min), c);

        self.bindoff_edge(&state, Bed::Back, slack);

        self.xfer(Needle::back(max - 1), Needle::front(max - 1));
        self.tag(max - 1, c);

        for i in (min..=max).rev() {
            self.drop_loop(Needle::front(i));
        }
        for i in min..=max {
            self.drop_loop(Needle::back(i));
        }
    }

    /// Knit a short cord over `last`, `last + 2` and `last + 4` on the front
    /// bed, drop it and take the yarn out.
    pub fn tag(&mut self, last: i32, carrier: Carrier) {
        let cord = [last, last + 2, last + 4];

        self.knit(Direction::Right, Needle::front(last), carrier);
        self.knit(Direction::Left, Needle::front(last + 2), carrier);
        self.knit(Direction::Left, Needle::front(last), carrier);
        self.knit(Direction::Right, Needle::front(last), carrier);
        self.knit(Direction::Right, Needle::front(last + 2), carrier);
        for _ in 0..6 {
            for i in down_by_two(last + 4, last) {
                self.knit(Direction::Left, Needle::front(i), carrier);
            }
            for i in up_by_two(last, last + 4) {
                self.knit(Direction::Right, Needle::front(i), carrier);
            }
        }

        for i in cord {
            self.drop_loop(Needle::front(i));
        }
        self.emit(Instruction::OutHook(carrier));
    }
}
