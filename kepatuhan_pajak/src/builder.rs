use chrono::NaiveDate;

pub use crate::config::*;
use crate::table::Table;

/// A builder for assembling a table row by row.
///
/// ```
/// use kepatuhan_pajak::builder::*;
///
/// let table = TableBuilder::new(&["TMT", "Jan-24"])
///     .row(vec![date(2023, 6, 15), number(150_000.0)])
///     .row(vec![text("bukan tanggal"), CellValue::Empty])
///     .build()?;
/// assert_eq!(table.num_rows(), 2);
///
/// # Ok::<(), ComplianceErrors>(())
/// ```
pub struct TableBuilder {
    pub(crate) _columns: Vec<ColumnKey>,
    pub(crate) _rows: Vec<Vec<CellValue>>,
}

impl TableBuilder {
    /// Starts a table whose columns are all named.
    pub fn new(headers: &[&str]) -> TableBuilder {
        TableBuilder::with_keys(headers.iter().map(|h| ColumnKey::from(*h)).collect())
    }

    pub fn with_keys(columns: Vec<ColumnKey>) -> TableBuilder {
        TableBuilder {
            _columns: columns,
            _rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: Vec<CellValue>) -> TableBuilder {
        self.add_row(cells);
        self
    }

    pub fn add_row(&mut self, cells: Vec<CellValue>) {
        self._rows.push(cells);
    }

    /// Checks that every row has one cell per column.
    pub fn build(self) -> Result<Table, ComplianceErrors> {
        Table::from_rows(self._columns, self._rows)
    }
}

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn number(x: f64) -> CellValue {
    CellValue::Number(x)
}

/// A date cell, or an empty cell if the date does not exist.
pub fn date(year: i32, month: u32, day: u32) -> CellValue {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(d) => CellValue::Date(d),
        None => CellValue::Empty,
    }
}
