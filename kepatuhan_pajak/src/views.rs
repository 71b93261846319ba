//! Data behind the dashboard: filters, chart series and the ranking table.
//!
//! All the functions here work on the augmented table produced by
//! [`crate::engine::compute_compliance`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::config::*;
use crate::table::Table;

/// The choice made in one filter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    /// Reads a filter value. The "Semua" sentinel means no filter.
    pub fn parse(s: &str) -> Selection {
        if s == ALL_SENTINEL {
            Selection::All
        } else {
            Selection::Only(s.to_string())
        }
    }

    /// Missing cells never match a specific value.
    pub fn matches(&self, cell: &CellValue) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(v) => cell.as_text().as_deref() == Some(v.as_str()),
        }
    }
}

impl From<Option<&str>> for Selection {
    fn from(s: Option<&str>) -> Self {
        s.map(Selection::parse).unwrap_or(Selection::All)
    }
}

/// The equality filters on the unit, the tax category and the status.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecordFilter {
    pub unit: Selection,
    pub klasifikasi: Selection,
    pub status: Selection,
}

impl RecordFilter {
    pub const ALL: RecordFilter = RecordFilter {
        unit: Selection::All,
        klasifikasi: Selection::All,
        status: Selection::All,
    };

    pub fn is_all(&self) -> bool {
        *self == RecordFilter::ALL
    }

    /// Applies the filters in turn. A filter on a column the table does not
    /// have rejects every row.
    pub fn apply(&self, table: &Table) -> Table {
        let mut res = table.clone();
        for (column, selection) in [
            (NM_UNIT, &self.unit),
            (KLASIFIKASI, &self.klasifikasi),
            (STATUS, &self.status),
        ] {
            if *selection == Selection::All {
                continue;
            }
            res = match res.column_index(column) {
                Some(idx) => res.filter_rows(|row| selection.matches(&row[idx])),
                None => res.filter_rows(|_| false),
            };
            debug!(
                "RecordFilter::apply: {} = {:?}: {} rows left",
                column,
                selection,
                res.num_rows()
            );
        }
        res
    }
}

impl Default for RecordFilter {
    fn default() -> Self {
        RecordFilter::ALL
    }
}

/// The distinct values of a column, sorted, without the missing ones.
pub fn filter_options(table: &Table, column: &str) -> Vec<String> {
    let values: BTreeSet<String> = table
        .column(column)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.as_text())
        .collect();
    values.into_iter().collect()
}

/// The number of records in each compliance class, largest first.
pub fn classification_counts(table: &Table) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for cell in table.column(KLASIFIKASI_KEPATUHAN).unwrap_or_default() {
        if let Some(label) = cell.as_text() {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    let mut res: Vec<(String, u64)> = counts.into_iter().collect();
    res.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    res
}

/// The total paid in one month, across all the records.
#[derive(PartialEq, Debug, Clone)]
pub struct MonthlyTotal {
    pub month: NaiveDate,
    /// For example `Jan 2024`.
    pub label: String,
    pub total: f64,
}

/// Payments per month of the target year, in chronological order.
///
/// Several columns for the same month are added together.
pub fn monthly_totals(table: &Table, payment_columns: &[NaiveDate], year: i32) -> Vec<MonthlyTotal> {
    let wanted: BTreeSet<NaiveDate> = payment_columns
        .iter()
        .filter(|d| d.year() == year)
        .cloned()
        .collect();
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (idx, month) in table.period_columns() {
        if !wanted.contains(&month) {
            continue;
        }
        let s: f64 = table.rows().iter().map(|r| r[idx].as_amount()).sum();
        *totals.entry(month).or_insert(0.0) += s;
    }
    totals
        .into_iter()
        .map(|(month, total)| MonthlyTotal {
            month,
            label: month.format("%b %Y").to_string(),
            total,
        })
        .collect()
}

/// One line of the ranking of taxable objects.
#[derive(PartialEq, Debug, Clone)]
pub struct TopObject {
    pub nama_op: String,
    pub nm_unit: String,
    pub klasifikasi: String,
    pub total_payment: f64,
}

/// The objects that paid the most, grouped by name, unit and category.
///
/// Rows with a missing name, unit or category are left out of the ranking.
pub fn top_objects(table: &Table, limit: usize) -> Result<Vec<TopObject>, ComplianceErrors> {
    let names = [NAMA_OP, NM_UNIT, KLASIFIKASI, TOTAL_PEMBAYARAN];
    let missing: Vec<String> = names
        .iter()
        .filter(|n| !table.has_column(n))
        .map(|n| n.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ComplianceErrors::MissingColumns(missing));
    }
    let idx: Vec<usize> = names
        .iter()
        .filter_map(|n| table.column_index(n))
        .collect();

    let mut groups: BTreeMap<(String, String, String), f64> = BTreeMap::new();
    for row in table.rows() {
        let key = match (row[idx[0]].as_text(), row[idx[1]].as_text(), row[idx[2]].as_text()) {
            (Some(op), Some(unit), Some(k)) => (op, unit, k),
            _ => continue,
        };
        *groups.entry(key).or_insert(0.0) += row[idx[3]].as_amount();
    }

    // The map iterates in key order, the stable sort keeps it for equal totals.
    let mut res: Vec<TopObject> = groups
        .into_iter()
        .map(|((nama_op, nm_unit, klasifikasi), total_payment)| TopObject {
            nama_op,
            nm_unit,
            klasifikasi,
            total_payment,
        })
        .collect();
    res.sort_by(|a, b| b.total_payment.total_cmp(&a.total_payment));
    res.truncate(limit);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn augmented() -> Table {
        let mut b = TableBuilder::with_keys(vec![
            ColumnKey::from(NAMA_OP),
            ColumnKey::from(NM_UNIT),
            ColumnKey::from(KLASIFIKASI),
            ColumnKey::from(STATUS),
            ColumnKey::Period(ymd(2024, 2, 1)),
            ColumnKey::Period(ymd(2023, 12, 1)),
            ColumnKey::Period(ymd(2024, 1, 1)),
            ColumnKey::from(TOTAL_PEMBAYARAN),
            ColumnKey::from(KLASIFIKASI_KEPATUHAN),
        ]);
        let rows = [
            ("Hotel A", "UPPPD 1", "Hotel", "Aktif", 20.0, 5.0, 10.0, "Patuh"),
            ("Resto B", "UPPPD 2", "Restoran", "Aktif", 0.0, 0.0, 30.0, "Tidak Patuh"),
            ("Hotel A", "UPPPD 1", "Hotel", "Tutup", 1.0, 0.0, 1.0, "Kurang Patuh"),
            ("Kafe C", "UPPPD 2", "Restoran", "Aktif", 0.0, 0.0, 0.0, "Tidak Patuh"),
        ];
        for (op, unit, k, st, feb, dec, jan, class) in rows {
            b.add_row(vec![
                text(op),
                text(unit),
                text(k),
                text(st),
                number(feb),
                number(dec),
                number(jan),
                number(feb + jan),
                text(class),
            ]);
        }
        b.add_row(vec![
            CellValue::Empty,
            text("UPPPD 1"),
            text("Hotel"),
            CellValue::Empty,
            number(100.0),
            CellValue::Empty,
            CellValue::Empty,
            number(100.0),
            text("Kurang Patuh"),
        ]);
        b.build().unwrap()
    }

    #[test]
    fn sentinel_means_all() {
        assert_eq!(Selection::parse("Semua"), Selection::All);
        assert_eq!(Selection::parse("UPPPD 1"), Selection::Only("UPPPD 1".to_string()));
        assert_eq!(Selection::from(None), Selection::All);
        assert!(!Selection::parse("x").matches(&CellValue::Empty));
    }

    #[test]
    fn filters_compose() {
        let t = augmented();
        assert_eq!(RecordFilter::ALL.apply(&t), t);

        let f = RecordFilter {
            unit: Selection::parse("UPPPD 1"),
            klasifikasi: Selection::All,
            status: Selection::parse("Aktif"),
        };
        let out = f.apply(&t);
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.rows()[0][0], text("Hotel A"));

        let f = RecordFilter {
            klasifikasi: Selection::parse("Restoran"),
            ..RecordFilter::ALL
        };
        assert_eq!(f.apply(&t).num_rows(), 2);

        let f = RecordFilter {
            status: Selection::parse("Dibekukan"),
            ..RecordFilter::ALL
        };
        assert!(f.apply(&t).is_empty());
    }

    #[test]
    fn options_are_sorted_and_distinct() {
        let t = augmented();
        assert_eq!(filter_options(&t, NM_UNIT), vec!["UPPPD 1", "UPPPD 2"]);
        assert_eq!(filter_options(&t, STATUS), vec!["Aktif", "Tutup"]);
        assert!(filter_options(&t, "tidak ada").is_empty());
    }

    #[test]
    fn counts_per_class() {
        let t = augmented();
        assert_eq!(
            classification_counts(&t),
            vec![
                ("Kurang Patuh".to_string(), 2),
                ("Tidak Patuh".to_string(), 2),
                ("Patuh".to_string(), 1),
            ]
        );
        assert!(classification_counts(&Table::default()).is_empty());
    }

    #[test]
    fn monthly_series_is_chronological_and_limited_to_the_year() {
        let t = augmented();
        let series = monthly_totals(&t, &[ymd(2024, 2, 1), ymd(2024, 1, 1)], 2024);
        assert_eq!(
            series,
            vec![
                MonthlyTotal {
                    month: ymd(2024, 1, 1),
                    label: "Jan 2024".to_string(),
                    total: 41.0
                },
                MonthlyTotal {
                    month: ymd(2024, 2, 1),
                    label: "Feb 2024".to_string(),
                    total: 121.0
                },
            ]
        );
        assert!(monthly_totals(&t, &[], 2024).is_empty());
        assert!(monthly_totals(&t, &[ymd(2023, 12, 1)], 2024).is_empty());
    }

    #[test]
    fn ranking_groups_and_sorts() {
        let t = augmented();
        let top = top_objects(&t, 5).unwrap();
        let names: Vec<(&str, f64)> = top
            .iter()
            .map(|o| (o.nama_op.as_str(), o.total_payment))
            .collect();
        assert_eq!(
            names,
            vec![("Hotel A", 32.0), ("Resto B", 30.0), ("Kafe C", 0.0)]
        );
        assert_eq!(top_objects(&t, 1).unwrap().len(), 1);
    }

    #[test]
    fn ranking_needs_the_object_name() {
        let t = TableBuilder::new(&[NM_UNIT, KLASIFIKASI, TOTAL_PEMBAYARAN])
            .build()
            .unwrap();
        assert_eq!(
            top_objects(&t, 5),
            Err(ComplianceErrors::MissingColumns(vec![NAMA_OP.to_string()]))
        );
    }
}
