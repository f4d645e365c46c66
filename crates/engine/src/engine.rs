//! The instruction-generation engine.
//!
//! [`Knitter`] owns the output sink and the stitch settings. Every shaping
//! operation is a method taking the tube's [`KnittingState`] by `&mut`, so
//! the caller keeps ownership of each tube while all tubes share one
//! ordered instruction stream.
//!
//! [`KnittingState`]: tubeknit_core::KnittingState

use serde::{Deserialize, Serialize};
use tubeknit_core::{Carrier, Direction, Instruction, InstructionSink, Needle, Program, Rack};

/// Stitch size presets, bind-off looseness and the default shaping offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnitSettings {
    /// Tight stitch used while casting on.
    pub cast_on_stitch: u32,
    /// Regular fabric stitch.
    pub body_stitch: u32,
    /// Stitch used to knit through bind-off loops.
    pub bindoff_stitch: u32,
    /// Small stitch for the anchor tucks of the bind-off.
    pub tuck_stitch: u32,
    /// How far (in stitches) the bind-off anchor tuck sits from the loop.
    pub bindoff_slack: i32,
    /// How many stitches in from the edge width changes are made.
    pub width_change_stitches: i32,
}

impl Default for KnitSettings {
    fn default() -> Self {
        Self {
            cast_on_stitch: 102,
            body_stitch: 101,
            bindoff_stitch: 103,
            tuck_stitch: 5,
            bindoff_slack: 0,
            width_change_stitches: 2,
        }
    }
}

/// The knitting engine.
///
/// Generic over the sink so tests can collect into a `Vec` while the CLI
/// collects into a [`Program`]. Tracks the rack it last emitted; every
/// public operation returns with the rack at 0.
pub struct Knitter<S: InstructionSink = Program> {
    out: S,
    settings: KnitSettings,
    rack: Rack,
}

impl Knitter<Program> {
    /// Create an engine writing into a fresh [`Program`].
    pub fn new() -> Self {
        Self::with_sink(Program::new())
    }
}

impl Default for Knitter<Program> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: InstructionSink> Knitter<S> {
    /// Create an engine writing into `out`.
    pub fn with_sink(out: S) -> Self {
        Self {
            out,
            settings: KnitSettings::default(),
            rack: Rack::ZERO,
        }
    }

    /// Replace the stitch settings.
    pub fn with_settings(mut self, settings: KnitSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &KnitSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.out
    }

    pub fn into_sink(self) -> S {
        self.out
    }

    /// The rack most recently emitted.
    pub fn rack_offset(&self) -> Rack {
        self.rack
    }

    // ── Emission helpers ──────────────────────────────────────────

    pub(crate) fn emit(&mut self, instruction: Instruction) {
        self.out.emit(instruction);
    }

    pub(crate) fn knit(&mut self, direction: Direction, needle: Needle, carrier: Carrier) {
        self.emit(Instruction::Knit {
            direction,
            needle,
            carrier,
        });
    }

    pub(crate) fn tuck(&mut self, direction: Direction, needle: Needle, carrier: Carrier) {
        self.emit(Instruction::Tuck {
            direction,
            needle,
            carrier,
        });
    }

    pub(crate) fn miss(&mut self, direction: Direction, needle: Needle, carrier: Carrier) {
        self.emit(Instruction::Miss {
            direction,
            needle,
            carrier,
        });
    }

    pub(crate) fn split(
        &mut self,
        direction: Direction,
        from: Needle,
        to: Needle,
        carrier: Carrier,
    ) {
        self.emit(Instruction::Split {
            direction,
            from,
            to,
            carrier,
        });
    }

    pub(crate) fn xfer(&mut self, from: Needle, to: Needle) {
        self.emit(Instruction::Xfer { from, to });
    }

    pub(crate) fn set_rack(&mut self, rack: Rack) {
        self.rack = rack;
        self.emit(Instruction::Rack(rack));
    }

    pub(crate) fn drop_loop(&mut self, needle: Needle) {
        self.emit(Instruction::Drop(needle));
    }

    pub(crate) fn stitch_number(&mut self, number: u32) {
        self.emit(Instruction::StitchNumber(number));
    }
}

/// `from, from + 2, ...` up to and including `to`.
pub(crate) fn up_by_two(from: i32, to: i32) -> impl Iterator<Item = i32> {
    (from..=to).step_by(2)
}

/// `from, from - 2, ...` down to and including `to`.
pub(crate) fn down_by_two(from: i32, to: i32) -> impl Iterator<Item = i32> {
    let span = if from >= to { (from - to) / 2 + 1 } else { 0 };
    (0..span).map(move |k| from - 2 * k)
}

/// Front-bed parity.
pub(crate) fn is_even(n: i32) -> bool {
    n.rem_euclid(2) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_helpers_are_inclusive() {
        assert_eq!(up_by_two(1, 7).collect::<Vec<_>>(), vec![1, 3, 5, 7]);
        assert_eq!(up_by_two(1, 6).collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(down_by_two(8, 2).collect::<Vec<_>>(), vec![8, 6, 4, 2]);
        assert_eq!(down_by_two(7, 2).collect::<Vec<_>>(), vec![7, 5, 3]);
        assert!(down_by_two(1, 3).next().is_none());
        assert!(up_by_two(5, 3).next().is_none());
    }

    #[test]
    fn rack_is_tracked_and_emitted() {
        let mut knitter = Knitter::new();
        knitter.set_rack(Rack::needles(2));
        assert_eq!(knitter.rack_offset(), Rack::needles(2));
        knitter.set_rack(Rack::ZERO);
        assert_eq!(knitter.sink().len(), 2);
        assert!(knitter.sink().rack().is_zero());
    }

    #[test]
    fn default_settings_match_machine_presets() {
        let settings = KnitSettings::default();
        assert_eq!(settings.cast_on_stitch, 102);
        assert_eq!(settings.body_stitch, 101);
        assert_eq!(settings.bindoff_stitch, 103);
        assert_eq!(settings.tuck_stitch, 5);
    }
}
