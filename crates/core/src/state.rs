//! Knitting state — the live description of one tube on the machine.
//!
//! A [`KnittingState`] is owned by whoever drives a tube and is lent to the
//! engine by `&mut` for each operation. Nothing else holds it, so two
//! shaping operations can never interleave on the same tube.

use crate::error::ShapingError;
use crate::instruction::Carrier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stitch pattern selecting the knit/purl decision table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StitchMode {
    /// Stockinette: every stitch knit.
    #[default]
    #[serde(alias = "jersey", alias = "j")]
    Plain,
    /// Alternating knit and purl rows.
    #[serde(alias = "g")]
    Garter,
    /// Knit/purl checkerboard.
    #[serde(alias = "s")]
    Seed,
}

/// Which edge(s) of the tube a shaping operation applies to.
///
/// Left is the `min` edge, right is the `max` edge, as seen facing the
/// machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    #[default]
    Both,
}

/// The shaping symbol for one row of a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    #[default]
    Plain,
    Increase,
    Decrease,
}

impl RowKind {
    pub fn symbol(self) -> char {
        match self {
            RowKind::Plain => 'n',
            RowKind::Increase => 'i',
            RowKind::Decrease => 'd',
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The extent, row counter, pattern and feeder of one tube.
///
/// `min` is typically a back-bed (odd) needle and `max` a front-bed (even)
/// needle; `max - min + 1` is always even.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnittingState {
    /// Leftmost needle of the tube.
    pub min: i32,
    /// Rightmost needle of the tube.
    pub max: i32,
    /// Row counter; its parity drives garter and seed patterns.
    pub row: i32,
    pub mode: StitchMode,
    pub carrier: Carrier,
}

impl KnittingState {
    /// Create a state for a freshly cast-on tube at row 0.
    pub fn new(
        min: i32,
        max: i32,
        mode: StitchMode,
        carrier: Carrier,
    ) -> Result<Self, ShapingError> {
        let state = Self {
            min,
            max,
            row: 0,
            mode,
            carrier,
        };
        state.check_extent()?;
        Ok(state)
    }

    /// Start the row counter somewhere other than 0.
    pub fn at_row(mut self, row: i32) -> Self {
        self.row = row;
        self
    }

    /// Number of needles the tube occupies across both beds.
    pub fn width(&self) -> i32 {
        self.max - self.min + 1
    }

    /// Verify `max >= min` and an even needle count.
    pub fn check_extent(&self) -> Result<(), ShapingError> {
        if self.max < self.min {
            return Err(ShapingError::InvalidExtent {
                min: self.min,
                max: self.max,
            });
        }
        if self.width() % 2 != 0 {
            return Err(ShapingError::OddWidth {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Switch feeders at a join point.
    pub fn with_carrier(mut self, carrier: Carrier) -> Self {
        self.carrier = carrier;
        self
    }

    /// Merge two tubes into one spanning both ranges.
    ///
    /// Both inputs are consumed. The result keeps `self`'s row counter,
    /// mode and carrier.
    pub fn join(self, other: KnittingState) -> Result<KnittingState, ShapingError> {
        if self.min <= other.max && other.min <= self.max {
            return Err(ShapingError::OverlappingTubes {
                first: (self.min, self.max),
                second: (other.min, other.max),
            });
        }
        let joined = KnittingState {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            ..self
        };
        joined.check_extent()?;
        Ok(joined)
    }
}
