//! Knitout instruction model — the records the engine emits.
//!
//! Every instruction renders to exactly one line of knitout via its
//! `Display` impl, e.g. `knit - f12 3`, `xfer f4 b6`, `rack -0.75`.
//!
//! ## Needle indexing
//!
//! Tubes are knit on alternating needles: even indices hold the front
//! fabric, odd indices hold the back fabric. A loop may sit on the
//! opposite bed temporarily (purls, transfers), but its *home* bed is
//! always given by the parity of its index. See [`Needle::home`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two needle beds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bed {
    Front,
    Back,
}

impl Bed {
    /// The bed facing this one.
    pub fn opposite(self) -> Self {
        match self {
            Bed::Front => Bed::Back,
            Bed::Back => Bed::Front,
        }
    }

    fn prefix(self) -> char {
        match self {
            Bed::Front => 'f',
            Bed::Back => 'b',
        }
    }
}

/// A needle on a specific bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Needle {
    pub bed: Bed,
    pub index: i32,
}

impl Needle {
    pub fn front(index: i32) -> Self {
        Self {
            bed: Bed::Front,
            index,
        }
    }

    pub fn back(index: i32) -> Self {
        Self {
            bed: Bed::Back,
            index,
        }
    }

    pub fn on(bed: Bed, index: i32) -> Self {
        Self { bed, index }
    }

    /// The needle on the home bed for `index`: front for even, back for odd.
    pub fn home(index: i32) -> Self {
        if index.rem_euclid(2) == 0 {
            Self::front(index)
        } else {
            Self::back(index)
        }
    }

    /// The needle at the same index on the other bed.
    pub fn across(self) -> Self {
        Self {
            bed: self.bed.opposite(),
            index: self.index,
        }
    }
}

impl fmt::Display for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bed.prefix(), self.index)
    }
}

/// Carriage direction. `Left` moves toward lower needle numbers (`-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Direction of travel from `from` to `to`; equal needles count as `Left`.
    pub fn between(from: i32, to: i32) -> Self {
        if to > from {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Left => "-",
            Direction::Right => "+",
        })
    }
}

/// A yarn carrier (feeder) number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Carrier(pub u8);

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lateral offset between the beds, stored in quarter pitches so the
/// fractional racks used by the cast-on stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rack {
    quarters: i32,
}

impl Rack {
    pub const ZERO: Rack = Rack { quarters: 0 };

    /// A whole-needle rack.
    pub const fn needles(offset: i32) -> Self {
        Self {
            quarters: offset * 4,
        }
    }

    /// A rack expressed in quarter pitches (`-3` renders as `-0.75`).
    pub const fn quarters(quarters: i32) -> Self {
        Self { quarters }
    }

    pub fn is_zero(self) -> bool {
        self.quarters == 0
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quarters == 0 {
            return f.write_str("0");
        }
        let sign = if self.quarters > 0 { '+' } else { '-' };
        let abs = self.quarters.abs();
        match abs % 4 {
            0 => write!(f, "{sign}{}", abs / 4),
            1 => write!(f, "{sign}{}.25", abs / 4),
            2 => write!(f, "{sign}{}.5", abs / 4),
            _ => write!(f, "{sign}{}.75", abs / 4),
        }
    }
}

/// A single machine instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Instruction {
    Knit {
        direction: Direction,
        needle: Needle,
        carrier: Carrier,
    },
    Tuck {
        direction: Direction,
        needle: Needle,
        carrier: Carrier,
    },
    /// Move the loop on `from` to `to`. Cross-bed only.
    Xfer { from: Needle, to: Needle },
    /// Knit on `from` and pass the old loop to `to` in one operation.
    Split {
        direction: Direction,
        from: Needle,
        to: Needle,
        carrier: Carrier,
    },
    /// Move the carrier past a needle without forming a loop.
    Miss {
        direction: Direction,
        needle: Needle,
        carrier: Carrier,
    },
    Rack(Rack),
    Drop(Needle),
    InHook(Carrier),
    ReleaseHook(Carrier),
    OutHook(Carrier),
    /// `x-stitch-number` extension: selects a stitch size preset.
    StitchNumber(u32),
}

impl Instruction {
    /// The knitout opcode.
    pub fn verb(&self) -> &'static str {
        match self {
            Instruction::Knit { .. } => "knit",
            Instruction::Tuck { .. } => "tuck",
            Instruction::Xfer { .. } => "xfer",
            Instruction::Split { .. } => "split",
            Instruction::Miss { .. } => "miss",
            Instruction::Rack(_) => "rack",
            Instruction::Drop(_) => "drop",
            Instruction::InHook(_) => "inhook",
            Instruction::ReleaseHook(_) => "releasehook",
            Instruction::OutHook(_) => "outhook",
            Instruction::StitchNumber(_) => "x-stitch-number",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            Instruction::Knit {
                direction,
                needle,
                carrier,
            }
            | Instruction::Tuck {
                direction,
                needle,
                carrier,
            }
            | Instruction::Miss {
                direction,
                needle,
                carrier,
            } => write!(f, "{verb} {direction} {needle} {carrier}"),
            Instruction::Xfer { from, to } => write!(f, "{verb} {from} {to}"),
            Instruction::Split {
                direction,
                from,
                to,
                carrier,
            } => write!(f, "{verb} {direction} {from} {to} {carrier}"),
            Instruction::Rack(rack) => write!(f, "{verb} {rack}"),
            Instruction::Drop(needle) => write!(f, "{verb} {needle}"),
            Instruction::InHook(carrier)
            | Instruction::ReleaseHook(carrier)
            | Instruction::OutHook(carrier) => write!(f, "{verb} {carrier}"),
            Instruction::StitchNumber(n) => write!(f, "{verb} {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_bed_follows_parity() {
        assert_eq!(Needle::home(12), Needle::front(12));
        assert_eq!(Needle::home(7), Needle::back(7));
        assert_eq!(Needle::home(-3), Needle::back(-3));
        assert_eq!(Needle::home(-4), Needle::front(-4));
    }

    #[test]
    fn rack_renders_like_knitout() {
        assert_eq!(Rack::ZERO.to_string(), "0");
        assert_eq!(Rack::needles(2).to_string(), "+2");
        assert_eq!(Rack::needles(-2).to_string(), "-2");
        assert_eq!(Rack::needles(1).to_string(), "+1");
        assert_eq!(Rack::quarters(-3).to_string(), "-0.75");
        assert_eq!(Rack::quarters(2).to_string(), "+0.5");
    }

    #[test]
    fn instructions_render_one_line_each() {
        let c = Carrier(3);
        let knit = Instruction::Knit {
            direction: Direction::Left,
            needle: Needle::front(12),
            carrier: c,
        };
        assert_eq!(knit.to_string(), "knit - f12 3");

        let split = Instruction::Split {
            direction: Direction::Right,
            from: Needle::front(8),
            to: Needle::back(8),
            carrier: c,
        };
        assert_eq!(split.to_string(), "split + f8 b8 3");

        let xfer = Instruction::Xfer {
            from: Needle::back(7),
            to: Needle::front(9),
        };
        assert_eq!(xfer.to_string(), "xfer b7 f9");

        assert_eq!(Instruction::InHook(c).to_string(), "inhook 3");
        assert_eq!(Instruction::ReleaseHook(c).to_string(), "releasehook 3");
        assert_eq!(Instruction::Drop(Needle::back(7)).to_string(), "drop b7");
        assert_eq!(
            Instruction::StitchNumber(101).to_string(),
            "x-stitch-number 101"
        );
    }

    #[test]
    fn direction_between_needles() {
        assert_eq!(Direction::between(4, 10), Direction::Right);
        assert_eq!(Direction::between(10, 4), Direction::Left);
        assert_eq!(Direction::between(4, 4), Direction::Left);
    }

    #[test]
    fn across_keeps_index_and_flips_bed() {
        assert_eq!(Needle::front(8).across(), Needle::back(8));
        assert_eq!(Needle::back(7).across().across(), Needle::back(7));
    }

    #[test]
    fn instruction_serializes_with_op_tag() {
        let json = serde_json::to_string(&Instruction::Rack(Rack::needles(2))).unwrap();
        assert!(json.contains("\"op\":\"rack\""));
    }
}
