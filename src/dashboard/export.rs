// Writing the augmented table: CSV export and preview on the terminal.

use std::io;

use kepatuhan_pajak::{CellValue, Table};
use tabled::builder::Builder;
use tabled::settings::{object::Segment, Modify, Style, Width};

use crate::dashboard::*;

const PREVIEW_CELL_WIDTH: usize = 30;

pub fn write_table<W: io::Write>(table: &Table, mut wtr: csv::Writer<W>) -> Result<(), csv::Error> {
    wtr.write_record(table.columns().iter().map(|c| c.to_string()))?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the table in CSV format. Period columns get their ISO date as header.
pub fn write_csv(table: &Table, path: &str) -> DashboardResult<()> {
    let wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path })?;
    write_table(table, wtr).context(CsvWriteSnafu { path })
}

fn preview_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(x) if x.fract() != 0.0 => format!("{:.2}", x),
        c => c.to_string(),
    }
}

/// The first rows of the table as aligned text.
pub fn render_preview(table: &Table, limit: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns().iter().map(|c| c.to_string()));
    for row in table.rows().iter().take(limit) {
        builder.push_record(row.iter().map(preview_cell));
    }
    let mut preview = builder.build();
    preview.with(Style::psql()).with(
        Modify::new(Segment::all()).with(Width::truncate(PREVIEW_CELL_WIDTH).suffix("...")),
    );
    format!(
        "{}\n(showing {} of {} rows)",
        preview,
        table.num_rows().min(limit),
        table.num_rows()
    )
}
