//! Tube plans: a whole tube described in TOML and knit in one call.
//!
//! ```toml
//! width = 40
//! mode = "garter"
//! carrier = 3
//! side = "both"
//!
//! [rib]
//! knit = 1
//! purl = 1
//! rows = 6
//!
//! [[segments]]
//! width = 48
//! rows = 30
//!
//! [[segments]]
//! width = 48
//! rows = 20
//! ```

use crate::{PlanError, PlanResult};
use crate::engine::Knitter;
use crate::schedule::{Segment, project_extent, width_changing_segments};
use crate::short_row::{DartRow, horizontal_dart, round_up_even, round_up_even_f64};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use tubeknit_core::{
    Carrier, Instruction, InstructionSink, KnittingState, RowKind, ShapingError, Side, StitchMode,
};

/// Everything needed to knit one tube from cast-on to finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TubePlan {
    /// Leftmost needle at cast-on. Odd, so the tube starts on the back bed.
    #[serde(default = "default_start_needle")]
    pub start_needle: i32,

    /// Needles at cast-on, across both beds.
    pub width: i32,

    #[serde(default)]
    pub mode: StitchMode,

    #[serde(default = "default_carrier")]
    pub carrier: Carrier,

    /// Edge(s) that grow or shrink.
    #[serde(default)]
    pub side: Side,

    /// Overrides the configured stitch offset for width changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_change_stitches: Option<i32>,

    /// Starting row counter, to line the pattern up with another tube.
    #[serde(default)]
    pub row_offset: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rib: Option<RibSpec>,

    #[serde(default)]
    pub segments: Vec<Segment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dart: Option<DartSpec>,

    /// Bind off at the end. Otherwise the yarn is taken out part way along
    /// the front and the loops stay live for a later join.
    #[serde(default = "default_true")]
    pub bind_off: bool,
}

/// Dart points closer than this leave no room between the two turns.
const MIN_DART_SEPARATION: i32 = 4;

fn default_start_needle() -> i32 {
    1
}
fn default_carrier() -> Carrier {
    Carrier(3)
}
fn default_true() -> bool {
    true
}

/// A `knit`×`purl` rib knit straight after the cast-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RibSpec {
    pub knit: i32,
    pub purl: i32,
    pub rows: usize,
}

/// A horizontal front dart laid over part of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DartSpec {
    /// First schedule row of the dart.
    pub start_row: usize,
    /// Schedule rows the dart spans.
    pub rows: usize,
    /// Extra front rows to add, two per short row.
    pub extra_rows: usize,
    /// Needles between the two dart points.
    pub separation: i32,
    /// How far past each dart point the turns may reach.
    #[serde(default)]
    pub radius: i32,
}

/// What happened while knitting a plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanReport {
    /// Schedule rows knit after the cast-on.
    pub rows: usize,
    /// Dart short rows knit successfully.
    pub dart_rows: usize,
    /// Extent just before the finish.
    pub min: i32,
    pub max: i32,
    /// Row counter just before the finish.
    pub final_row: i32,
    /// Rows where a width change or a dart short row was rejected.
    pub failures: Vec<RowFailure>,
}

/// The part of a row that could not be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStep {
    /// The increase or decrease was rejected; the row was knit plain.
    WidthChange,
    /// The width change (if any) was made but the dart short row was not;
    /// the row was finished with a plain loop.
    Dart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub row: usize,
    pub step: RowStep,
    pub error: ShapingError,
}

impl TubePlan {
    /// Parse and validate a plan.
    pub fn from_toml(toml_str: &str) -> PlanResult<Self> {
        let plan: TubePlan = toml::from_str(toml_str)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load a plan file.
    pub fn from_file(path: &std::path::Path) -> PlanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.width <= 0 || self.width % 2 != 0 {
            return Err(PlanError::Invalid(format!(
                "width must be a positive even needle count, got {}",
                self.width
            )));
        }
        if self.start_needle.rem_euclid(2) != 1 {
            return Err(PlanError::Invalid(format!(
                "start_needle must be odd, got {}",
                self.start_needle
            )));
        }
        if self.carrier.0 == 0 {
            return Err(PlanError::Invalid("carrier 0 does not exist".into()));
        }
        if let Some(stitches) = self.width_change_stitches
            && stitches < 1
        {
            return Err(PlanError::Invalid(format!(
                "width_change_stitches must be at least 1, got {stitches}"
            )));
        }
        if let Some(rib) = &self.rib
            && (rib.knit < 1 || rib.purl < 0)
        {
            return Err(PlanError::Invalid(format!(
                "rib {}x{} needs at least one knit and no negative purls",
                rib.knit, rib.purl
            )));
        }
        if let Some(segment) = self.segments.iter().find(|s| s.width <= 0 || s.width % 2 != 0) {
            return Err(PlanError::Invalid(format!(
                "segment width must be a positive even needle count, got {}",
                segment.width
            )));
        }
        if let Some(dart) = &self.dart
            && (dart.rows == 0 || dart.separation < MIN_DART_SEPARATION)
        {
            return Err(PlanError::Invalid(format!(
                "dart needs rows >= 1 and separation >= {MIN_DART_SEPARATION}, got {} and {}",
                dart.rows, dart.separation
            )));
        }
        Ok(())
    }

    /// Total rows in the width schedule.
    pub fn schedule_len(&self) -> usize {
        self.segments.iter().map(|s| s.rows).sum()
    }
}

impl<S: InstructionSink> Knitter<S> {
    /// Knit a whole tube: cast-on (and rib), the segment schedule with any
    /// dart, then the finish.
    ///
    /// A row whose width change or dart short row cannot be made is
    /// logged, finished plain and recorded in the report; the tube carries
    /// on.
    pub fn run_plan(&mut self, plan: &TubePlan) -> PlanResult<PlanReport> {
        plan.validate()?;
        let min = plan.start_needle;
        let mut state = KnittingState::new(min, min + plan.width - 1, plan.mode, plan.carrier)?
            .at_row(plan.row_offset);
        let stitches = plan
            .width_change_stitches
            .unwrap_or(self.settings().width_change_stitches);

        let mut schedule =
            width_changing_segments(plan.width, plan.side == Side::Both, &plan.segments)?;
        let darts = match &plan.dart {
            Some(dart) => Some(lay_out_dart(dart, &mut schedule)?),
            None => None,
        };

        let (end_min, end_max) = project_extent(&schedule, plan.side, state.min, state.max);
        info!(
            min = state.min,
            max = state.max,
            end_min,
            end_max,
            rows = schedule.len(),
            mode = ?plan.mode,
            "knitting tube"
        );

        match plan.rib {
            Some(rib) => self.cast_on_and_rib(&mut state, rib.knit, rib.purl, rib.rows),
            None => {
                self.stitch_number(self.settings().cast_on_stitch);
                self.zigzag_cast_on(&mut state);
                self.stitch_number(self.settings().body_stitch);
            }
        }

        let turns = plan.dart.map(|dart| dart_points(&state, &dart));
        let mut report = PlanReport {
            rows: schedule.len(),
            ..PlanReport::default()
        };

        for (i, kind) in schedule.iter().copied().enumerate() {
            let dart_fraction = darts.as_ref().and_then(|(start, rows)| {
                let row = rows.get(i.checked_sub(*start)?)?;
                row.short_row.then_some(row.edge_fraction)
            });

            let result = match (dart_fraction, turns) {
                (Some(fraction), Some(points)) => {
                    let knit =
                        self.knit_dart_row(&mut state, plan.side, kind, stitches, fraction, points);
                    if knit.is_ok() {
                        report.dart_rows += 1;
                    }
                    knit
                }
                _ => self
                    .execute_row(&mut state, plan.side, kind, stitches)
                    .map_err(|err| (RowStep::WidthChange, err)),
            };

            if let Err((step, err)) = result {
                match step {
                    RowStep::WidthChange => {
                        error!(row = i, kind = %kind, %err, "width change failed, row knit plain")
                    }
                    RowStep::Dart => error!(
                        row = i,
                        kind = %kind,
                        %err,
                        "dart short row failed, row finished plain"
                    ),
                }
                report.failures.push(RowFailure {
                    row: i,
                    step,
                    error: err,
                });
            }
        }

        report.min = state.min;
        report.max = state.max;
        report.final_row = state.row;

        if plan.bind_off {
            self.bindoff_tube(state);
        } else {
            // stop part way along the front so the yarn end sits mid-fabric
            let (min, max) = (state.min, state.max);
            self.knit_front(&state, max, (max - 12).max(min), false);
            self.emit(Instruction::OutHook(state.carrier));
        }

        info!(
            rows = report.rows,
            failures = report.failures.len(),
            "tube finished"
        );
        Ok(report)
    }

    /// A plain (or decrease) row with a two-turn front short row on top.
    ///
    /// Never called with an increase; `lay_out_dart` keeps increases off
    /// short rows.
    fn knit_dart_row(
        &mut self,
        state: &mut KnittingState,
        side: Side,
        kind: RowKind,
        stitches: i32,
        fraction: f64,
        (left_point, right_point): (i32, i32),
    ) -> Result<(), (RowStep, ShapingError)> {
        debug_assert_ne!(kind, RowKind::Increase, "increase on a dart row");
        if kind == RowKind::Decrease
            && let Err(err) = self.decrease_on(state, side, stitches)
        {
            self.one_loop(state, false);
            return Err((RowStep::WidthChange, err));
        }

        let (min, max) = (state.min, state.max);
        let left = round_up_even_f64(min as f64 + fraction * (left_point - min) as f64);
        let right = round_up_even_f64(max as f64 - fraction * (max - right_point) as f64);
        debug!(left, right, fraction, "dart row");

        match self.dart_row_front(state, max, left, right, min) {
            Ok(()) => {
                self.knit_back(state, min, max, false);
                state.row += 1;
                Ok(())
            }
            Err(err) => {
                self.one_loop(state, false);
                Err((RowStep::Dart, err))
            }
        }
    }
}

// ── Internal ───────────────────────────────────────────────────────

/// Lay the dart over the schedule and clear increases off its short rows.
///
/// An increase on a short row moves to the row before when that row is
/// plain and not itself a short row. Otherwise the short row is dropped
/// from the layout. Returns the dart's first row and its per-row layout;
/// no short row in it falls on an increase.
fn lay_out_dart(
    dart: &DartSpec,
    schedule: &mut [RowKind],
) -> PlanResult<(usize, Vec<DartRow>)> {
    let end = dart.start_row + dart.rows;
    if end > schedule.len() {
        return Err(PlanError::Invalid(format!(
            "dart rows {}..{end} run past the {}-row schedule",
            dart.start_row,
            schedule.len()
        )));
    }
    let mut rows = horizontal_dart(dart.rows, dart.extra_rows)?;

    for offset in 0..rows.len() {
        let i = dart.start_row + offset;
        if !rows[offset].short_row || schedule[i] != RowKind::Increase {
            continue;
        }
        let before_is_free = offset == 0 || !rows[offset - 1].short_row;
        if i > 0 && before_is_free && schedule[i - 1] == RowKind::Plain {
            schedule.swap(i - 1, i);
        } else {
            warn!(row = i, "increase on a dart row, dart skipped for this row");
            rows[offset].short_row = false;
        }
    }
    Ok((dart.start_row, rows))
}

/// Left and right dart points, centred on the tube.
fn dart_points(state: &KnittingState, dart: &DartSpec) -> (i32, i32) {
    let left = round_up_even(state.min + state.width() / 2 - dart.separation / 2) - dart.radius;
    let right = round_up_even(left + dart.separation) + dart.radius;
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeknit_core::{Instruction, Program};

    const BASIC: &str = r#"
width = 40
mode = "plain"
carrier = 3
side = "both"

[rib]
knit = 1
purl = 1
rows = 4

[[segments]]
width = 48
rows = 16

[[segments]]
width = 48
rows = 4
"#;

    #[test]
    fn parse_plan_with_defaults() {
        let plan = TubePlan::from_toml("width = 24").unwrap();
        assert_eq!(plan.start_needle, 1);
        assert_eq!(plan.carrier, Carrier(3));
        assert_eq!(plan.side, Side::Both);
        assert!(plan.bind_off);
        assert!(plan.segments.is_empty());
    }

    #[test]
    fn invalid_plans_are_rejected() {
        assert!(matches!(
            TubePlan::from_toml("width = 23"),
            Err(PlanError::Invalid(_))
        ));
        assert!(matches!(
            TubePlan::from_toml("width = 24\nstart_needle = 2"),
            Err(PlanError::Invalid(_))
        ));
        assert!(matches!(
            TubePlan::from_toml("width = 24\n[[segments]]\nwidth = 27\nrows = 4"),
            Err(PlanError::Invalid(_))
        ));
        assert!(matches!(
            TubePlan::from_toml("width = \"wide\""),
            Err(PlanError::Parse(_))
        ));
    }

    #[test]
    fn run_plan_follows_schedule() {
        let plan = TubePlan::from_toml(BASIC).unwrap();
        let mut knitter = Knitter::new();
        let report = knitter.run_plan(&plan).unwrap();

        assert_eq!(report.rows, 20);
        assert!(report.failures.is_empty());
        assert_eq!((report.min, report.max), (-3, 44));
        // cast-on loop, two rib framing loops, then one per schedule row
        assert_eq!(report.final_row, 3 + 20);

        let program = knitter.into_sink();
        assert!(program.rack().is_zero());
        assert_eq!(
            program.instructions().last(),
            Some(&Instruction::Drop(tubeknit_core::Needle::back(44)))
        );
    }

    #[test]
    fn unfinished_tube_hooks_out_mid_front() {
        let plan =
            TubePlan::from_toml("width = 40\nbind_off = false\n[[segments]]\nwidth = 40\nrows = 2")
                .unwrap();
        let mut knitter = Knitter::new();
        knitter.run_plan(&plan).unwrap();
        let program: Program = knitter.into_sink();
        let text: Vec<String> = program.instructions().iter().map(|i| i.to_string()).collect();
        assert_eq!(text.last().map(String::as_str), Some("outhook 3"));
        assert_eq!(text[text.len() - 2], "knit - f28 3");
    }

    #[test]
    fn failed_rows_are_reported_and_knit_plain() {
        let toml = r#"
width = 12
side = "right"
width_change_stitches = 7
[[segments]]
width = 8
rows = 4
"#;
        let plan = TubePlan::from_toml(toml).unwrap();
        let mut knitter = Knitter::new();
        let report = knitter.run_plan(&plan).unwrap();
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].step, RowStep::WidthChange);
        assert!(matches!(
            report.failures[0].error,
            ShapingError::DecreaseTooWide { .. }
        ));
        assert_eq!((report.min, report.max), (1, 12));
        assert_eq!(report.final_row, 1 + 4);
    }

    #[test]
    fn dart_adds_front_rows() {
        let toml = r#"
width = 60
[[segments]]
width = 60
rows = 12
[dart]
start_row = 2
rows = 8
extra_rows = 8
separation = 10
"#;
        let plan = TubePlan::from_toml(toml).unwrap();
        let mut knitter = Knitter::new();
        let report = knitter.run_plan(&plan).unwrap();
        assert_eq!(report.dart_rows, 4);
        assert!(report.failures.is_empty());
        // each dart row adds two extra front rows
        assert_eq!(report.final_row, 1 + 12 + 2 * 4);
    }

    #[test]
    fn dart_past_schedule_is_invalid() {
        let toml = r#"
width = 40
[[segments]]
width = 40
rows = 4
[dart]
start_row = 2
rows = 4
extra_rows = 2
separation = 8
"#;
        let plan = TubePlan::from_toml(toml).unwrap();
        assert!(matches!(
            Knitter::new().run_plan(&plan),
            Err(PlanError::Invalid(_))
        ));
    }

    fn no_increase_on_a_short_row(start: usize, rows: &[DartRow], schedule: &[RowKind]) -> bool {
        rows.iter()
            .enumerate()
            .all(|(offset, r)| !r.short_row || schedule[start + offset] != RowKind::Increase)
    }

    #[test]
    fn increases_step_off_dart_rows() {
        let mut schedule = vec![RowKind::Plain, RowKind::Plain, RowKind::Increase, RowKind::Plain];
        let dart = DartSpec {
            start_row: 2,
            rows: 2,
            extra_rows: 4,
            separation: 10,
            radius: 0,
        };
        let (start, rows) = lay_out_dart(&dart, &mut schedule).unwrap();
        assert_eq!(start, 2);
        assert!(rows.iter().all(|r| r.short_row));
        assert_eq!(schedule[1], RowKind::Increase);
        assert_eq!(schedule[2], RowKind::Plain);
        assert!(no_increase_on_a_short_row(start, &rows, &schedule));
    }

    #[test]
    fn increase_between_short_rows_drops_that_short_row() {
        let mut schedule = vec![RowKind::Plain, RowKind::Plain, RowKind::Increase, RowKind::Plain];
        let dart = DartSpec {
            start_row: 0,
            rows: 4,
            extra_rows: 8,
            separation: 10,
            radius: 0,
        };
        let (start, rows) = lay_out_dart(&dart, &mut schedule).unwrap();
        // the row before is a short row too, so the increase stays put
        assert_eq!(schedule[2], RowKind::Increase);
        assert!(!rows[2].short_row);
        assert_eq!(rows.iter().filter(|r| r.short_row).count(), 3);
        assert!(no_increase_on_a_short_row(start, &rows, &schedule));
    }

    #[test]
    fn increase_on_first_row_drops_that_short_row() {
        let mut schedule = vec![RowKind::Increase, RowKind::Plain];
        let dart = DartSpec {
            start_row: 0,
            rows: 2,
            extra_rows: 4,
            separation: 10,
            radius: 0,
        };
        let (start, rows) = lay_out_dart(&dart, &mut schedule).unwrap();
        assert_eq!(schedule[0], RowKind::Increase);
        assert!(!rows[0].short_row);
        assert!(rows[1].short_row);
        assert!(no_increase_on_a_short_row(start, &rows, &schedule));
    }

    #[test]
    fn dart_over_increases_counts_only_knit_short_rows() {
        let toml = r#"
width = 60
side = "right"
[[segments]]
width = 64
rows = 8
[dart]
start_row = 0
rows = 8
extra_rows = 16
separation = 10
"#;
        let plan = TubePlan::from_toml(toml).unwrap();
        let mut knitter = Knitter::new();
        let report = knitter.run_plan(&plan).unwrap();
        // increases land on rows 0 and 4, both inside a run of short rows
        assert_eq!(report.dart_rows, 6);
        assert!(report.failures.is_empty());
        assert_eq!((report.min, report.max), (1, 64));
        assert_eq!(report.final_row, 1 + 8 + 2 * 6);
    }

    #[test]
    fn dart_failure_is_reported_apart_from_width_change() {
        let toml = r#"
width = 40
side = "right"
[[segments]]
width = 16
rows = 12
[dart]
start_row = 6
rows = 6
extra_rows = 12
separation = 4
"#;
        let plan = TubePlan::from_toml(toml).unwrap();
        let mut knitter = Knitter::new();
        let report = knitter.run_plan(&plan).unwrap();
        // the right edge passes the dart point, so the middle turns miss the tube
        let rows: Vec<usize> = report.failures.iter().map(|f| f.row).collect();
        assert_eq!(rows, [8, 9, 10]);
        assert!(report.failures.iter().all(|f| f.step == RowStep::Dart));
        assert_eq!(report.dart_rows, 3);
        // every decrease was still made
        assert_eq!((report.min, report.max), (1, 16));
    }

    #[test]
    fn dart_separation_must_leave_room_for_turns() {
        let toml = r#"
width = 40
[[segments]]
width = 40
rows = 4
[dart]
start_row = 0
rows = 4
extra_rows = 2
separation = 2
"#;
        assert!(matches!(TubePlan::from_toml(toml), Err(PlanError::Invalid(_))));
    }
}
