//! `tubeknit tube` — knit a plan file into knitout.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};
use tubeknit_config::KnitConfig;
use tubeknit_core::{Header, Program};
use tubeknit_engine::{Knitter, TubePlan};

pub fn run(
    config: &KnitConfig,
    plan_path: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = TubePlan::from_file(plan_path)?;
    if !config.has_carrier(plan.carrier) {
        return Err(format!(
            "carrier {} is not on machine {}",
            plan.carrier, config.machine.name
        )
        .into());
    }
    info!(
        plan = %plan_path.display(),
        width = plan.width,
        rows = plan.schedule_len(),
        "loaded plan"
    );

    let mut knitter = Knitter::new().with_settings(super::knit_settings(config));
    let report = knitter.run_plan(&plan)?;
    let program = knitter.into_sink();

    if !report.failures.is_empty() {
        warn!(
            rows = report.failures.len(),
            "some width changes were skipped; the tube is knit but its shape differs from the plan"
        );
    }
    info!(
        instructions = program.len(),
        min = report.min,
        max = report.max,
        "generated knitout"
    );

    write_program(&program, &config.header(), json, output)?;
    Ok(())
}

/// Write knitout (or JSON) to `output`, or stdout when absent.
pub fn write_program(
    program: &Program,
    header: &Header,
    json: bool,
    output: Option<&Path>,
) -> tubeknit_core::Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)?;
            write_to(program, header, json, BufWriter::new(file))
        }
        None => write_to(program, header, json, std::io::stdout().lock()),
    }
}

fn write_to<W: Write>(
    program: &Program,
    header: &Header,
    json: bool,
    mut writer: W,
) -> tubeknit_core::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut writer, program.instructions())?;
        writeln!(writer)?;
        writer.flush()?;
    } else {
        program.write_to(header, writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeknit_core::{Carrier, Instruction};

    fn sample() -> Program {
        let mut knitter = Knitter::new();
        knitter.tag(11, Carrier(3));
        knitter.into_sink()
    }

    #[test]
    fn writes_knitout_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.k");
        write_program(&sample(), &Header::default(), false, Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(";!knitout-2\n;;Machine: SWGN2\n"));
        assert!(text.trim_end().ends_with("outhook 3"));
    }

    #[test]
    fn writes_json_instructions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_program(&sample(), &Header::default(), true, Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Instruction> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample().into_instructions());
    }
}
