//! Instruction output — the sink trait the engine writes through and the
//! in-memory [`Program`] that collects and renders a knitout file.

use crate::instruction::{Carrier, Instruction, Rack};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Destination for emitted instructions.
///
/// The engine never prints; it pushes every instruction through a sink so
/// the stream can be collected, inspected in tests, or rendered later.
pub trait InstructionSink {
    fn emit(&mut self, instruction: Instruction);
}

impl InstructionSink for Vec<Instruction> {
    fn emit(&mut self, instruction: Instruction) {
        self.push(instruction);
    }
}

/// The fixed knitout header: version marker, machine, declared carriers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub machine: String,
    pub carriers: Vec<Carrier>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            machine: "SWGN2".into(),
            carriers: (1..=10).map(Carrier).collect(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";!knitout-2")?;
        writeln!(f, ";;Machine: {}", self.machine)?;
        let carriers: Vec<String> = self.carriers.iter().map(|c| c.to_string()).collect();
        writeln!(f, ";;Carriers: {}", carriers.join(" "))
    }
}

/// An ordered, append-only instruction stream.
///
/// Tracks the rack in effect after the last instruction so callers can
/// check that shaping routines hand the machine back at rack 0.
#[derive(Debug, Clone, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
    rack: Rack,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rack in effect at the end of the stream.
    pub fn rack(&self) -> Rack {
        self.rack
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of instructions matching `pred`.
    pub fn count(&self, pred: impl Fn(&Instruction) -> bool) -> usize {
        self.instructions.iter().filter(|i| pred(i)).count()
    }

    /// Each instruction paired with the rack it executes under.
    pub fn with_racks(&self) -> impl Iterator<Item = (Rack, &Instruction)> + '_ {
        let mut rack = Rack::ZERO;
        self.instructions.iter().map(move |instruction| {
            if let Instruction::Rack(r) = instruction {
                rack = *r;
            }
            (rack, instruction)
        })
    }

    /// Render the whole file: header, then one instruction per line.
    pub fn render(&self, header: &Header) -> String {
        let mut out = header.to_string();
        for instruction in &self.instructions {
            out.push_str(&instruction.to_string());
            out.push('\n');
        }
        out
    }

    /// Stream the rendered file into a writer.
    pub fn write_to<W: Write>(&self, header: &Header, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{header}")?;
        for instruction in &self.instructions {
            writeln!(writer, "{instruction}")?;
        }
        writer.flush()
    }
}

impl InstructionSink for Program {
    fn emit(&mut self, instruction: Instruction) {
        if let Instruction::Rack(rack) = instruction {
            self.rack = rack;
        }
        self.instructions.push(instruction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Direction, Needle};

    #[test]
    fn default_header_matches_machine_format() {
        let header = Header::default().to_string();
        assert_eq!(
            header,
            ";!knitout-2\n;;Machine: SWGN2\n;;Carriers: 1 2 3 4 5 6 7 8 9 10\n"
        );
    }

    #[test]
    fn program_tracks_rack() {
        let mut program = Program::new();
        program.emit(Instruction::Rack(Rack::needles(2)));
        assert_eq!(program.rack(), Rack::needles(2));
        program.emit(Instruction::Xfer {
            from: Needle::front(4),
            to: Needle::back(2),
        });
        program.emit(Instruction::Rack(Rack::ZERO));
        assert!(program.rack().is_zero());

        let racks: Vec<Rack> = program.with_racks().map(|(r, _)| r).collect();
        assert_eq!(racks, vec![Rack::needles(2), Rack::needles(2), Rack::ZERO]);
    }

    #[test]
    fn render_puts_header_first() {
        let mut program = Program::new();
        program.emit(Instruction::InHook(Carrier(3)));
        program.emit(Instruction::Knit {
            direction: Direction::Right,
            needle: Needle::back(5),
            carrier: Carrier(3),
        });
        let text = program.render(&Header::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ";!knitout-2");
        assert_eq!(lines[3], "inhook 3");
        assert_eq!(lines[4], "knit + b5 3");

        let mut buf = Vec::new();
        program.write_to(&Header::default(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), text);
    }

    #[test]
    fn vec_is_a_sink() {
        let mut sink: Vec<Instruction> = Vec::new();
        sink.emit(Instruction::Drop(Needle::front(2)));
        assert_eq!(sink.len(), 1);
    }
}
