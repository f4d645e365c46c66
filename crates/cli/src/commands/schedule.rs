//! `tubeknit schedule` — print a width-change row schedule.

use tubeknit_core::RowKind;
use tubeknit_engine::width_changing_tube;

pub fn run(
    rows: usize,
    changes: u32,
    both: bool,
    decrease: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render(rows, changes, both, decrease)?);
    Ok(())
}

/// The schedule as one symbol per row, e.g. `ninini`.
fn render(rows: usize, changes: u32, both: bool, decrease: bool) -> tubeknit_core::Result<String> {
    let symbol = if decrease {
        RowKind::Decrease
    } else {
        RowKind::Increase
    };
    let schedule = width_changing_tube(both, changes, symbol, rows)?;
    Ok(schedule.iter().map(|row| row.symbol()).collect())
}
