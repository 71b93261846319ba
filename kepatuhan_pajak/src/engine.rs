use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use log::{debug, info};

use crate::config::*;
use crate::period::{coerce_date, PeriodFormats};
use crate::table::Table;

/// The outcome of a compliance computation.
#[derive(PartialEq, Debug, Clone)]
pub struct ComplianceReport {
    /// The input table with the coerced start dates and the derived columns.
    pub table: Table,
    /// The period columns that fall in the target year, in table order.
    pub payment_columns: Vec<NaiveDate>,
    /// The metrics of each row, in row order.
    pub records: Vec<ComplianceRecord>,
}

/// Number of months of the target year during which the object had to pay.
pub fn active_months(tmt: Option<NaiveDate>, year: i32) -> u32 {
    match tmt {
        None => 0,
        Some(d) if d.year() < year => 12,
        Some(d) if d.year() > year => 0,
        Some(d) => 12 - d.month() + 1,
    }
}

/// Classifies a record. The checks are evaluated in order, so an object with
/// no active month and no payment is not active rather than compliant.
pub fn classify(active_months: u32, paid_months: u32, rules: &ComplianceRules) -> ComplianceClass {
    if active_months == 0 && paid_months == 0 {
        ComplianceClass::NotActive
    } else if paid_months == active_months {
        ComplianceClass::Compliant
    } else if i64::from(active_months) - i64::from(paid_months)
        <= i64::from(rules.shortfall_tolerance)
    {
        ComplianceClass::PartiallyCompliant
    } else {
        ComplianceClass::NonCompliant
    }
}

/// The period columns of the target year.
pub fn payment_columns(table: &Table, year: i32) -> Vec<(usize, NaiveDate)> {
    table
        .period_columns()
        .into_iter()
        .filter(|(_, d)| d.year() == year)
        .collect()
}

/// Computes the metrics of one record from its start date and its payments
/// over the target year.
///
/// A zero denominator is replaced by 1: no payment gives an average of 0, and
/// no active month gives a compliance of 0%.
pub fn compute_record(
    tmt: Option<NaiveDate>,
    amounts: &[f64],
    year: i32,
    rules: &ComplianceRules,
) -> ComplianceRecord {
    let total_payment: f64 = amounts.iter().sum();
    let paid_months = amounts.iter().filter(|x| **x > 0.0).count() as u32;
    let active = active_months(tmt, year);
    ComplianceRecord {
        total_payment,
        active_months: active,
        paid_months,
        average_payment: total_payment / f64::from(paid_months.max(1)),
        compliance_pct: f64::from(paid_months) / f64::from(active.max(1)) * 100.0,
        class: classify(active, paid_months, rules),
    }
}

/// Runs the compliance computation over a normalized and resolved table.
///
/// The input is left untouched; the returned table is a new copy with the
/// `TMT` column coerced to dates and the six derived columns attached.
pub fn compute_compliance(
    table: &Table,
    year: i32,
    rules: &ComplianceRules,
    formats: &PeriodFormats,
) -> Result<ComplianceReport, ComplianceErrors> {
    let tmt_idx = table
        .column_index(TMT)
        .ok_or_else(|| ComplianceErrors::MissingColumns(vec![TMT.to_string()]))?;
    let cols = payment_columns(table, year);
    info!(
        "compute_compliance: {} records, {} payment columns in {}",
        table.num_rows(),
        cols.len(),
        year
    );

    let mut records: Vec<ComplianceRecord> = Vec::with_capacity(table.num_rows());
    let mut tmts: Vec<CellValue> = Vec::with_capacity(table.num_rows());
    for (idx, row) in table.rows().iter().enumerate() {
        let tmt = coerce_date(&row[tmt_idx], formats);
        if tmt.is_none() && !row[tmt_idx].is_missing() {
            debug!(
                "compute_compliance: row {}: unreadable TMT {:?}",
                idx, row[tmt_idx]
            );
        }
        let amounts: Vec<f64> = cols.iter().map(|(c, _)| row[*c].as_amount()).collect();
        records.push(compute_record(tmt, &amounts, year, rules));
        tmts.push(tmt.map(CellValue::Date).unwrap_or(CellValue::Empty));
    }

    let mut counts: HashMap<ComplianceClass, usize> = HashMap::new();
    for r in records.iter() {
        *counts.entry(r.class).or_insert(0) += 1;
    }
    for class in ComplianceClass::ALL {
        info!(
            "compute_compliance: {}: {}",
            class.label(&rules.labels),
            counts.get(&class).unwrap_or(&0)
        );
    }

    let mut out = table.clone();
    out.set_column(TMT, tmts);
    out.set_column(
        TOTAL_PEMBAYARAN,
        records
            .iter()
            .map(|r| CellValue::Number(r.total_payment))
            .collect(),
    );
    out.set_column(
        BULAN_AKTIF,
        records
            .iter()
            .map(|r| CellValue::Number(f64::from(r.active_months)))
            .collect(),
    );
    out.set_column(
        BULAN_PEMBAYARAN,
        records
            .iter()
            .map(|r| CellValue::Number(f64::from(r.paid_months)))
            .collect(),
    );
    out.set_column(
        RATA_RATA_PEMBAYARAN,
        records
            .iter()
            .map(|r| CellValue::Number(r.average_payment))
            .collect(),
    );
    out.set_column(
        KEPATUHAN_PERSEN,
        records
            .iter()
            .map(|r| CellValue::Number(r.compliance_pct))
            .collect(),
    );
    out.set_column(
        KLASIFIKASI_KEPATUHAN,
        records
            .iter()
            .map(|r| CellValue::Text(r.class.label(&rules.labels).to_string()))
            .collect(),
    );

    Ok(ComplianceReport {
        table: out,
        payment_columns: cols.into_iter().map(|(_, d)| d).collect(),
        records,
    })
}
