// Primitives for reading CSV files.

use log::debug;

use kepatuhan_pajak::{CellValue, ColumnKey, Table};

use crate::dashboard::io_common::{cell_from_text, unnamed_header};
use crate::dashboard::*;

/// Reads a CSV file with a header line into a table.
///
/// Blank lines are skipped. Short lines are padded with missing cells.
pub fn read_csv_table(path: &str) -> DashboardResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let headers = rdr.headers().context(CsvLineParseSnafu { lineno: 1_usize })?;
    let columns: Vec<ColumnKey> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let h = h.trim();
            if h.is_empty() {
                ColumnKey::Name(unnamed_header(idx))
            } else {
                ColumnKey::from(h)
            }
        })
        .collect();
    debug!("read_csv_table: columns: {:?}", columns);
    let width = columns.len();
    let mut table = Table::new(columns);

    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let mut cells: Vec<CellValue> = line.iter().map(cell_from_text).collect();
        if cells.iter().all(|c| *c == CellValue::Empty) {
            continue;
        }
        if cells.len() > width {
            whatever!(
                "line {} of {} has {} fields, the header has {}",
                lineno,
                path,
                cells.len(),
                width
            )
        }
        cells.resize(width, CellValue::Empty);
        table.push_row(cells).context(PipelineSnafu {})?;
    }
    debug!("read_csv_table: {} rows", table.num_rows());
    Ok(table)
}
