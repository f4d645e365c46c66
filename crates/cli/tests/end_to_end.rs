//! End-to-end tests for the tubeknit pipeline.
//!
//! These drive the engine the way the CLI does (cast on, shape, finish,
//! render) and run the built binary against plan files.

use std::process::Command;

use tubeknit_core::{
    Carrier, Header, Instruction, KnittingState, Program, Rack, RowKind, ShapingError, Side,
    StitchMode,
};
use tubeknit_engine::{Knitter, TubePlan, width_changing_tube};

// ── Helpers ──────────────────────────────────────────────────────────────

fn cast_on(knitter: &mut Knitter, min: i32, max: i32) -> KnittingState {
    let mut state = KnittingState::new(min, max, StitchMode::Plain, Carrier(3)).unwrap();
    knitter.zigzag_cast_on(&mut state);
    state
}

fn xfers_at(program: &Program, rack: Rack) -> usize {
    program
        .with_racks()
        .filter(|(r, i)| *r == rack && matches!(i, Instruction::Xfer { .. }))
        .count()
}

fn tubeknit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tubeknit"));
    cmd.env_remove("TUBEKNIT_MACHINE")
        .env_remove("TUBEKNIT_CONFIG")
        .env("RUST_LOG", "warn");
    cmd
}

// ── Engine pipeline ──────────────────────────────────────────────────────

#[test]
fn cast_on_knit_and_increase_right() {
    let mut knitter = Knitter::new();
    let mut state = cast_on(&mut knitter, 1, 40);
    let after_cast_on = state.row;
    let cast_on_len = knitter.sink().len();

    knitter.tube(4, &mut state);
    knitter.increase_right(&mut state, 2).unwrap();

    assert_eq!((state.min, state.max), (1, 42));
    assert_eq!(state.row, after_cast_on + 5);
    assert!(knitter.rack_offset().is_zero());

    let program = knitter.into_sink();
    let shaping = &program.instructions()[cast_on_len..];
    let splits: Vec<String> = shaping
        .iter()
        .filter(|i| matches!(i, Instruction::Split { .. }))
        .map(ToString::to_string)
        .collect();
    assert_eq!(splits, ["split + f36 b36 3", "split - b35 f35 3"]);
    assert_eq!(xfers_at(&program, Rack::needles(2)), 6);
}

#[test]
fn increase_then_decrease_restores_extent() {
    let mut knitter = Knitter::new();
    let mut state = cast_on(&mut knitter, 1, 40);

    for side in [Side::Left, Side::Right, Side::Both] {
        knitter.execute_row(&mut state, side, RowKind::Increase, 2).unwrap();
        knitter.execute_row(&mut state, side, RowKind::Decrease, 2).unwrap();
        assert_eq!((state.min, state.max), (1, 40), "{side:?}");
        assert!(knitter.rack_offset().is_zero());
    }
    assert_eq!(knitter.sink().rack(), Rack::ZERO);
}

#[test]
fn too_wide_decrease_leaves_everything_untouched() {
    let mut knitter = Knitter::new();
    let mut state = cast_on(&mut knitter, 1, 8);
    let before = state.clone();
    let emitted = knitter.sink().len();

    assert!(matches!(
        knitter.decrease_left(&mut state, 5),
        Err(ShapingError::DecreaseTooWide { .. })
    ));
    assert_eq!(state, before);
    assert_eq!(knitter.sink().len(), emitted);
}

#[test]
fn schedule_drives_rows() {
    let schedule = width_changing_tube(false, 8, RowKind::Increase, 8).unwrap();
    let mut knitter = Knitter::new();
    let mut state = cast_on(&mut knitter, 1, 40);
    let start_row = state.row;

    for kind in &schedule {
        knitter.execute_row(&mut state, Side::Right, *kind, 2).unwrap();
    }
    assert_eq!((state.min, state.max), (1, 48));
    assert_eq!(state.row, start_row + 8);

    knitter.bindoff_tube(state);
    let program = knitter.into_sink();
    assert!(program.rack().is_zero());
    assert_eq!(program.count(|i| *i == Instruction::OutHook(Carrier(3))), 1);
    assert!(matches!(program.instructions().last(), Some(Instruction::Drop(_))));
}

#[test]
fn rendered_program_has_header_then_body() {
    let plan = TubePlan::from_toml("width = 16\n[[segments]]\nwidth = 16\nrows = 2").unwrap();
    let mut knitter = Knitter::new();
    let report = knitter.run_plan(&plan).unwrap();
    assert!(report.failures.is_empty());

    let text = knitter.into_sink().render(&Header::default());
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(";!knitout-2"));
    assert_eq!(lines.next(), Some(";;Machine: SWGN2"));
    assert_eq!(lines.next(), Some(";;Carriers: 1 2 3 4 5 6 7 8 9 10"));
    assert_eq!(lines.next(), Some("x-stitch-number 102"));
    assert_eq!(lines.next(), Some("inhook 3"));
    assert!(text.contains("x-stitch-number 101"));
}

// ── Binary ───────────────────────────────────────────────────────────────

#[test]
fn cli_knits_a_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let plan = dir.path().join("sleeve.toml");
    let output = dir.path().join("sleeve.k");
    std::fs::write(
        &plan,
        "width = 24\nmode = \"garter\"\nside = \"right\"\n\n[[segments]]\nwidth = 28\nrows = 6\n",
    )
    .unwrap();

    let status = tubeknit()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .arg("tube")
        .arg(&plan)
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with(";!knitout-2\n"));
    assert!(text.contains("split "));
    assert!(text.contains("\nouthook 3\n"));
}

#[test]
fn cli_rejects_unknown_carrier() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let plan = dir.path().join("plan.toml");
    std::fs::write(&config, "[machine]\ncarriers = [1, 2]\n").unwrap();
    std::fs::write(&plan, "width = 24\ncarrier = 5\n").unwrap();

    let out = tubeknit()
        .arg("--config")
        .arg(&config)
        .arg("tube")
        .arg(&plan)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn cli_prints_schedule() {
    let out = tubeknit()
        .args(["schedule", "--rows", "7", "--changes", "6"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "nininin");
}
