//! Short rows and darts: partial passes that turn on a tuck anchor.
//!
//! The row counter is bumped around each turn so the return leg of a
//! garter or seed short row works the opposite face.

use crate::engine::Knitter;
use crate::schedule::spaced_instructions;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tubeknit_core::{
    Direction, InstructionSink, KnittingState, Needle, ScheduleError, ShapingError, Side,
};

/// Round up to the nearest even needle.
pub fn round_up_even(n: i32) -> i32 {
    n + n.rem_euclid(2)
}

/// Round a fractional needle position up to the nearest even needle.
pub fn round_up_even_f64(x: f64) -> i32 {
    2 * (x / 2.0).ceil() as i32
}

/// One row of a horizontal dart profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DartRow {
    /// Whether a short row is knit on this body row.
    pub short_row: bool,
    /// How far (0.0 at the edge) the turn points sit toward the dart
    /// points. The caller maps this onto live needles.
    pub edge_fraction: f64,
}

/// Lay out a hexagonal horizontal dart over `row_count` body rows with
/// `extra_rows` additional front rows (two per short row).
pub fn horizontal_dart(row_count: usize, extra_rows: usize) -> Result<Vec<DartRow>, ScheduleError> {
    let mut extra_rows = extra_rows;
    if extra_rows / 2 > row_count {
        warn!(
            row_count,
            extra_rows, "dart needs more than twice its length in short rows, clamping"
        );
        extra_rows = row_count;
    }

    let flags = spaced_instructions(row_count, extra_rows / 2, true, false)?;

    let half = row_count.div_ceil(2);
    let step = if row_count == 0 {
        0.0
    } else {
        2.0 / row_count as f64
    };
    let ramp: Vec<f64> = (0..half).map(|i| i as f64 * step).collect();
    let profile = ramp.iter().chain(ramp.iter().rev()).copied();

    Ok(flags
        .into_iter()
        .zip(profile)
        .map(|(short_row, edge_fraction)| DartRow {
            short_row,
            edge_fraction,
        })
        .collect())
}

impl<S: InstructionSink> Knitter<S> {
    /// Knit a short row at one or both edges of the tube.
    ///
    /// `front_stitches` and `back_stitches` are the lengths of the two
    /// legs; a leg of one stitch or fewer is skipped. The call leaves `row`
    /// unchanged.
    pub fn short_row(
        &mut self,
        state: &mut KnittingState,
        side: Side,
        front_stitches: i32,
        back_stitches: i32,
    ) -> Result<(), ShapingError> {
        match side {
            Side::Left => self.short_row_left(state, front_stitches, back_stitches),
            Side::Right => self.short_row_right(state, front_stitches, back_stitches),
            Side::Both => {
                left_turns(state, front_stitches, back_stitches)?;
                right_turns(state, front_stitches, back_stitches)?;
                self.short_row_left(state, front_stitches, back_stitches)?;
                self.short_row_right(state, front_stitches, back_stitches)
            }
        }
    }

    /// Back leg then front leg, each out from `min` and back.
    pub fn short_row_left(
        &mut self,
        state: &mut KnittingState,
        front_stitches: i32,
        back_stitches: i32,
    ) -> Result<(), ShapingError> {
        let (front_turn, back_turn) = left_turns(state, front_stitches, back_stitches)?;
        let min = state.min;
        let carrier = state.carrier;
        debug!(min, front_turn, back_turn, "short row left");

        if back_stitches > 1 {
            self.knit_back(state, min, back_turn - 2, false);
            self.tuck(Direction::Right, Needle::back(back_turn), carrier);
            state.row += 1;
            self.knit_back(state, back_turn - 2, min, false);
            state.row -= 1;
        }
        if front_stitches > 1 {
            state.row += 1;
            self.knit_front(state, min, front_turn - 2, false);
            self.tuck(Direction::Right, Needle::front(front_turn), carrier);
            state.row -= 1;
            self.knit_front(state, front_turn - 2, min, false);
        }
        Ok(())
    }

    /// Front leg then back leg, each out from `max` and back.
    pub fn short_row_right(
        &mut self,
        state: &mut KnittingState,
        front_stitches: i32,
        back_stitches: i32,
    ) -> Result<(), ShapingError> {
        let (front_turn, back_turn) = right_turns(state, front_stitches, back_stitches)?;
        let max = state.max;
        let carrier = state.carrier;
        debug!(max, front_turn, back_turn, "short row right");

        if front_stitches > 1 {
            self.knit_front(state, max, front_turn + 2, false);
            self.tuck(Direction::Left, Needle::front(front_turn), carrier);
            state.row += 1;
            self.knit_front(state, front_turn + 2, max, false);
            state.row -= 1;
        }
        if back_stitches > 1 {
            self.knit_back(state, max, back_turn + 2, false);
            self.tuck(Direction::Left, Needle::back(back_turn), carrier);
            state.row += 1;
            self.knit_back(state, back_turn + 2, max, false);
            state.row -= 1;
        }
        Ok(())
    }

    /// A front-bed short row with two turns: `start` to `left_turn`, across
    /// to `right_turn`, then on to `end`. Turn points are rounded up to even
    /// needles. `row += 2`.
    pub fn dart_row_front(
        &mut self,
        state: &mut KnittingState,
        start: i32,
        left_turn: i32,
        right_turn: i32,
        end: i32,
    ) -> Result<(), ShapingError> {
        let left = round_up_even(left_turn);
        let right = round_up_even(right_turn);
        if left < state.min || right > state.max || left + 2 > right - 2 {
            return Err(ShapingError::InvalidExtent {
                min: left,
                max: right,
            });
        }
        let carrier = state.carrier;

        self.knit_front(state, start, left + 2, false);
        self.tuck(Direction::Left, Needle::front(left), carrier);
        state.row += 1;
        self.knit_front(state, left + 2, right - 2, false);
        self.tuck(Direction::Right, Needle::front(right), carrier);
        state.row += 1;
        self.knit_front(state, right - 2, end, false);
        Ok(())
    }
}

// ── Internal ───────────────────────────────────────────────────────

/// Turn points `(front, back)` for a short row at `min`.
fn left_turns(
    state: &KnittingState,
    front_stitches: i32,
    back_stitches: i32,
) -> Result<(i32, i32), ShapingError> {
    let back_turn = round_up_even(state.min + back_stitches * 2) - 1;
    let front_turn = round_up_even(state.min + front_stitches * 2);
    if back_stitches > 1 && back_turn > state.max {
        return Err(too_wide(state, back_stitches));
    }
    if front_stitches > 1 && front_turn > state.max {
        return Err(too_wide(state, front_stitches));
    }
    Ok((front_turn, back_turn))
}

/// Turn points `(front, back)` for a short row at `max`.
fn right_turns(
    state: &KnittingState,
    front_stitches: i32,
    back_stitches: i32,
) -> Result<(i32, i32), ShapingError> {
    let back_turn = round_up_even(state.max - back_stitches * 2) + 1;
    let front_turn = round_up_even(state.max - front_stitches * 2);
    if back_stitches > 1 && back_turn < state.min {
        return Err(too_wide(state, back_stitches));
    }
    if front_stitches > 1 && front_turn < state.min {
        return Err(too_wide(state, front_stitches));
    }
    Ok((front_turn, back_turn))
}

fn too_wide(state: &KnittingState, stitches: i32) -> ShapingError {
    ShapingError::ShortRowTooWide {
        stitches,
        width: state.width(),
    }
}
