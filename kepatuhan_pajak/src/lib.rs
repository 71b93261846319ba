//! Compliance classification of regional taxpayers.
//!
//! The input is a table read from a spreadsheet: one row per taxable object,
//! some descriptive columns, and one column per month of payments. The
//! [`Pipeline`] maps the headers to canonical names, recognizes the month
//! columns, and computes for each object how many months it was active in the
//! tax year, how many months it paid, and the resulting compliance class.
//!
//! See the [`manual`] for the details of the computation.

mod config;
mod table;

pub mod builder;
pub mod engine;
pub mod manual;
pub mod normalizer;
pub mod period;
pub mod views;

use log::{debug, info};

pub use crate::config::*;
pub use crate::engine::ComplianceReport;
pub use crate::normalizer::AliasTable;
pub use crate::period::PeriodFormats;
pub use crate::table::Table;

/// Checks that all the canonical columns needed by the computation are present.
///
/// All the missing columns are reported at once.
pub fn validate_required_columns(table: &Table) -> Result<(), ComplianceErrors> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ComplianceErrors::MissingColumns(missing))
    }
}

/// The configuration of a computation: header aliases, accepted date formats
/// and classification rules.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Pipeline {
    pub aliases: AliasTable,
    pub formats: PeriodFormats,
    pub rules: ComplianceRules,
}

impl Pipeline {
    /// Normalizes the headers, resolves the period columns and validates the result.
    ///
    /// The prepared table can be reused for several computations.
    pub fn prepare(&self, raw: &Table) -> Result<Table, ComplianceErrors> {
        let normalized = normalizer::normalize_columns(raw, &self.aliases);
        let resolved = period::resolve_periods(&normalized, &self.formats);
        debug!(
            "prepare: columns after normalization: {:?}",
            resolved.columns()
        );
        info!(
            "prepare: {} rows, {} columns, {} period columns",
            resolved.num_rows(),
            resolved.columns().len(),
            resolved.period_columns().len()
        );
        validate_required_columns(&resolved)?;
        Ok(resolved)
    }

    /// Computes the compliance of every record of a prepared table for the given year.
    pub fn compute(&self, prepared: &Table, year: i32) -> Result<ComplianceReport, ComplianceErrors> {
        engine::compute_compliance(prepared, year, &self.rules, &self.formats)
    }

    pub fn run(&self, raw: &Table, year: i32) -> Result<ComplianceReport, ComplianceErrors> {
        let prepared = self.prepare(raw)?;
        self.compute(&prepared, year)
    }
}

#[cfg(test)]
mod tests {
    use super::builder::*;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn run_from_raw_headers() {
        init();
        let raw = TableBuilder::new(&[
            "Nama OP", "t.m.t", "status", "Jenis", "UNIT", "Jan-24", "02/2024", "Keterangan",
        ])
        .row(vec![
            text("Hotel Melati"),
            date(2024, 2, 1),
            text("Aktif"),
            text("Hotel"),
            text("UPPPD Barat"),
            CellValue::Empty,
            number(500_000.0),
            CellValue::Empty,
        ])
        .build()
        .unwrap();

        let report = Pipeline::default().run(&raw, 2024).unwrap();
        let r = &report.records[0];
        assert_eq!(r.active_months, 11);
        assert_eq!(r.paid_months, 1);
        assert_eq!(r.class, ComplianceClass::NonCompliant);
        assert_eq!(report.payment_columns.len(), 2);
        assert!(report.table.has_column("Keterangan"));
        assert!(report.table.has_column(NAMA_OP));
    }

    #[test]
    fn missing_columns_are_all_reported() {
        init();
        let raw = TableBuilder::new(&["tmt", "Jan-24", "unit"]).build().unwrap();
        assert_eq!(
            Pipeline::default().run(&raw, 2024),
            Err(ComplianceErrors::MissingColumns(vec![
                STATUS.to_string(),
                KLASIFIKASI.to_string()
            ]))
        );
        let msg = Pipeline::default().prepare(&raw).unwrap_err().to_string();
        assert_eq!(msg, "missing required columns: STATUS, KLASIFIKASI");
    }

    #[test]
    fn injected_aliases_reach_the_computation() {
        let pipeline = Pipeline {
            aliases: AliasTable::default().with_alias("tanggal mulai", TMT),
            ..Pipeline::default()
        };
        let raw = TableBuilder::new(&["Tanggal Mulai", "STATUS", "KLASIFIKASI", "Nm Unit"])
            .row(vec![date(2020, 1, 1), text("Aktif"), text("Hotel"), text("U")])
            .build()
            .unwrap();
        let report = pipeline.run(&raw, 2024).unwrap();
        assert_eq!(report.records[0].active_months, 12);
        assert!(report.payment_columns.is_empty());
        assert_eq!(report.records[0].class, ComplianceClass::NonCompliant);
    }
}
