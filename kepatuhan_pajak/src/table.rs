use chrono::NaiveDate;

use crate::config::*;

/// An in-memory table: ordered column keys and rows of cells.
///
/// Invariant: every row holds exactly one cell per column.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    columns: Vec<ColumnKey>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<ColumnKey>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(
        columns: Vec<ColumnKey>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Table, ComplianceErrors> {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), ComplianceErrors> {
        if row.len() != self.columns.len() {
            return Err(ComplianceErrors::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The position of the first column with this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == Some(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// All the columns keyed by a period, in table order.
    pub fn period_columns(&self) -> Vec<(usize, NaiveDate)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.period().map(|d| (idx, d)))
            .collect()
    }

    /// A new table with the same columns and only the rows accepted by the predicate.
    pub fn filter_rows<P>(&self, mut pred: P) -> Table
    where
        P: FnMut(&[CellValue]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| pred(r.as_slice()))
                .cloned()
                .collect(),
        }
    }

    pub(crate) fn with_columns(&self, columns: Vec<ColumnKey>) -> Table {
        debug_assert_eq!(columns.len(), self.columns.len());
        Table {
            columns,
            rows: self.rows.clone(),
        }
    }

    /// Replaces the content of the named column, or appends it at the end.
    pub(crate) fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(ColumnKey::Name(name.to_string()));
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let res = TableBuilder::new(&["a", "b"])
            .row(vec![number(1.0), number(2.0)])
            .row(vec![number(3.0)])
            .build();
        assert_eq!(
            res,
            Err(ComplianceErrors::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn set_column_replaces_then_appends() {
        let mut t = TableBuilder::new(&["a", "b"])
            .row(vec![text("x"), number(1.0)])
            .build()
            .unwrap();
        t.set_column("b", vec![number(5.0)]);
        t.set_column("c", vec![text("new")]);
        assert_eq!(t.columns().len(), 3);
        assert_eq!(t.rows()[0], vec![text("x"), number(5.0), text("new")]);
    }

    #[test]
    fn first_column_with_a_name_wins() {
        let t = TableBuilder::new(&["a", "a"]).build().unwrap();
        assert_eq!(t.column_index("a"), Some(0));
        assert!(!t.has_column("z"));
    }
}
