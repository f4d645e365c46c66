//! Stitch-pattern predicates: knit, purl or skip for one needle in one pass.
//!
//! The front pass works the even needles and the back pass the odd ones.
//! A purl is realised by parking the loop on the opposite bed, knitting it
//! there and moving it home again, so the predicates only decide *which*
//! needles take part; the executor does the choreography.

use tubeknit_core::{KnittingState, StitchMode};

/// What a single needle does during a pass. Never both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decision {
    pub knit: bool,
    pub purl: bool,
}

impl Decision {
    pub const SKIP: Decision = Decision {
        knit: false,
        purl: false,
    };

    fn knit_if(cond: bool) -> Self {
        Decision {
            knit: cond,
            purl: false,
        }
    }

    fn purl_if(cond: bool) -> Self {
        Decision {
            knit: false,
            purl: cond,
        }
    }

    pub fn is_skip(self) -> bool {
        !self.knit && !self.purl
    }
}

/// Decision for `needle` during a front-bed pass.
pub fn front_decision(needle: i32, state: &KnittingState, force_basic: bool) -> Decision {
    decide(needle, state, force_basic, 0)
}

/// Decision for `needle` during a back-bed pass.
pub fn back_decision(needle: i32, state: &KnittingState, force_basic: bool) -> Decision {
    decide(needle, state, force_basic, 1)
}

/// `parity` is 0 for the front pass and 1 for the back pass. The seed
/// checkerboard is offset by one needle per bed so the columns line up
/// around the tube.
fn decide(needle: i32, state: &KnittingState, force_basic: bool, parity: i32) -> Decision {
    let own_bed = needle.rem_euclid(2) == parity;
    let even_row = state.row.rem_euclid(2) == 0;

    if force_basic {
        return Decision::knit_if(own_bed);
    }

    match state.mode {
        StitchMode::Plain => Decision::knit_if(own_bed),
        StitchMode::Garter if even_row => Decision::knit_if(own_bed),
        StitchMode::Garter => Decision::purl_if(own_bed),
        StitchMode::Seed => {
            let phase = needle.rem_euclid(4);
            // front: 0 knits and 2 purls on even rows; back: 1 knits, 3 purls
            let (knit_phase, purl_phase) = match (parity, even_row) {
                (0, true) => (0, 2),
                (0, false) => (2, 0),
                (_, true) => (1, 3),
                (_, false) => (3, 1),
            };
            Decision {
                knit: phase == knit_phase,
                purl: phase == purl_phase,
            }
        }
    }
}
