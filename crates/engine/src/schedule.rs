//! Row schedules: which rows of a tube change width.
//!
//! Pure functions. A schedule is a `Vec<RowKind>` with one entry per row,
//! consumed row by row by [`Knitter::execute_row`].
//!
//! [`Knitter::execute_row`]: crate::Knitter::execute_row

use serde::{Deserialize, Serialize};
use tubeknit_core::{RowKind, ScheduleError, Side};

/// A stretch of tube ending at `width` needles after `rows` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub width: i32,
    pub rows: usize,
}

/// `total_rows` entries holding exactly `count` copies of `value`, spread
/// as evenly as possible, `default` everywhere else.
///
/// Rows left over from the even split are handed out as extra `default`
/// rows in front of every `count / excess`-th value.
pub fn spaced_instructions<T: Clone + PartialEq>(
    total_rows: usize,
    count: usize,
    value: T,
    default: T,
) -> Result<Vec<T>, ScheduleError> {
    if value == default {
        return Err(ScheduleError::IdenticalSymbols);
    }
    if count > total_rows {
        return Err(ScheduleError::TooManyEvents {
            events: count,
            rows: total_rows,
        });
    }
    if count == 0 {
        return Ok(vec![default; total_rows]);
    }

    let per = total_rows / count;
    let mut excess = total_rows - per * count;
    let stride = if excess > 0 { count / excess } else { count };

    let mut rows = Vec::with_capacity(total_rows);
    for i in 0..count {
        if excess > 0 && i % stride == 0 {
            rows.push(default.clone());
            excess -= 1;
        }
        rows.push(value.clone());
        rows.extend(std::iter::repeat_n(default.clone(), per - 1));
    }
    Ok(rows)
}

/// Schedule `change_count` needles of width change over `length` rows.
///
/// Each event moves one edge by two needles, or both edges (four needles)
/// when `both_sides` is set.
pub fn width_changing_tube(
    both_sides: bool,
    change_count: u32,
    symbol: RowKind,
    length: usize,
) -> Result<Vec<RowKind>, ScheduleError> {
    let mut events = (change_count / 2) as usize;
    if both_sides {
        events /= 2;
    }
    if events > length {
        return Err(ScheduleError::TooManyEvents {
            events,
            rows: length,
        });
    }
    spaced_instructions(length, events, symbol, RowKind::Plain)
}

/// Concatenate width-changing tubes for consecutive segments, starting from
/// a tube `current_width` needles wide.
pub fn width_changing_segments(
    current_width: i32,
    both_sides: bool,
    segments: &[Segment],
) -> Result<Vec<RowKind>, ScheduleError> {
    let mut schedule = Vec::new();
    let mut width = current_width;
    for segment in segments {
        let delta = segment.width - width;
        let rows = if delta > 0 {
            width_changing_tube(both_sides, delta.unsigned_abs(), RowKind::Increase, segment.rows)?
        } else if delta < 0 {
            width_changing_tube(both_sides, delta.unsigned_abs(), RowKind::Decrease, segment.rows)?
        } else {
            vec![RowKind::Plain; segment.rows]
        };
        schedule.extend(rows);
        width = segment.width;
    }
    Ok(schedule)
}

/// The `(min, max)` a tube will have after knitting `schedule` on `side`.
pub fn project_extent(schedule: &[RowKind], side: Side, min: i32, max: i32) -> (i32, i32) {
    let (grow_left, grow_right) = match side {
        Side::Left => (2, 0),
        Side::Right => (0, 2),
        Side::Both => (2, 2),
    };
    schedule
        .iter()
        .fold((min, max), |(lo, hi), kind| match kind {
            RowKind::Increase => (lo - grow_left, hi + grow_right),
            RowKind::Decrease => (lo + grow_left, hi - grow_right),
            RowKind::Plain => (lo, hi),
        })
}
