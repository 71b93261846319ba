// ********* Column names **********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

pub const TMT: &str = "TMT";
pub const STATUS: &str = "STATUS";
pub const KLASIFIKASI: &str = "KLASIFIKASI";
pub const NM_UNIT: &str = "Nm Unit";
pub const NAMA_OP: &str = "Nama Op";
pub const NAMA_WP: &str = "Nama WP";

/// The columns that must be present after normalization before any computation.
pub const REQUIRED_COLUMNS: [&str; 4] = [TMT, STATUS, KLASIFIKASI, NM_UNIT];

// Derived columns, in the order they are attached to the table.
pub const TOTAL_PEMBAYARAN: &str = "Total Pembayaran";
pub const BULAN_AKTIF: &str = "bulan_aktif";
pub const BULAN_PEMBAYARAN: &str = "bulan_pembayaran";
pub const RATA_RATA_PEMBAYARAN: &str = "Rata-rata Pembayaran";
pub const KEPATUHAN_PERSEN: &str = "Kepatuhan (%)";
pub const KLASIFIKASI_KEPATUHAN: &str = "Klasifikasi Kepatuhan";

/// Filter value meaning "no filter" ("all").
pub const ALL_SENTINEL: &str = "Semua";

// ********* Table contents **********

/// The content of a single cell, as read from a spreadsheet.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    /// The value of this cell seen as a payment amount.
    ///
    /// Numbers and numeric text count, everything else is zero.
    pub fn as_amount(&self) -> f64 {
        let x = match self {
            CellValue::Number(x) => *x,
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if x.is_finite() {
            x
        } else {
            0.0
        }
    }

    /// The categorical value of this cell, or None if the cell is missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(x) if x.is_nan() => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.as_text().is_none()
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(x) => write!(f, "{}", format_number(*x)),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Integral values are written without a fractional part.
pub fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{:.0}", x)
    } else {
        format!("{}", x)
    }
}

/// The key of a column: either a plain name, or a payment period resolved
/// to the first day of its month.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub enum ColumnKey {
    Name(String),
    Period(NaiveDate),
}

impl ColumnKey {
    pub fn name(&self) -> Option<&str> {
        match self {
            ColumnKey::Name(s) => Some(s.as_str()),
            ColumnKey::Period(_) => None,
        }
    }

    pub fn period(&self) -> Option<NaiveDate> {
        match self {
            ColumnKey::Name(_) => None,
            ColumnKey::Period(d) => Some(*d),
        }
    }
}

impl Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKey::Name(s) => write!(f, "{}", s),
            ColumnKey::Period(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for ColumnKey {
    fn from(s: &str) -> Self {
        ColumnKey::Name(s.to_string())
    }
}

// ******** Output data structures *********

/// The compliance status of a taxable object over the target year.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ComplianceClass {
    /// Not active during the year and nothing paid.
    NotActive,
    /// Paid for every active month.
    Compliant,
    /// Behind by at most the tolerated number of months.
    PartiallyCompliant,
    NonCompliant,
}

impl ComplianceClass {
    pub const ALL: [ComplianceClass; 4] = [
        ComplianceClass::NotActive,
        ComplianceClass::Compliant,
        ComplianceClass::PartiallyCompliant,
        ComplianceClass::NonCompliant,
    ];

    pub fn label(self, labels: &ComplianceLabels) -> &'static str {
        match self {
            ComplianceClass::NotActive => labels.not_active,
            ComplianceClass::Compliant => labels.compliant,
            ComplianceClass::PartiallyCompliant => labels.partially_compliant,
            ComplianceClass::NonCompliant => labels.non_compliant,
        }
    }
}

/// Metrics computed for one record.
#[derive(PartialEq, Debug, Clone)]
pub struct ComplianceRecord {
    pub total_payment: f64,
    pub active_months: u32,
    pub paid_months: u32,
    pub average_payment: f64,
    pub compliance_pct: f64,
    pub class: ComplianceClass,
}

/// Errors that prevent the pipeline from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ComplianceErrors {
    /// Canonical columns absent from the table, in the order they are required.
    MissingColumns(Vec<String>),
    /// A row does not have one cell per column.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Error for ComplianceErrors {}

impl Display for ComplianceErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceErrors::MissingColumns(names) => {
                write!(f, "missing required columns: {}", names.join(", "))
            }
            ComplianceErrors::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells, expected {} (one per column)",
                row, found, expected
            ),
        }
    }
}

// ********* Configuration **********

/// The names given to each compliance class in the output table.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ComplianceLabels {
    pub not_active: &'static str,
    pub compliant: &'static str,
    pub partially_compliant: &'static str,
    pub non_compliant: &'static str,
}

impl ComplianceLabels {
    pub const DEFAULT_LABELS: ComplianceLabels = ComplianceLabels {
        not_active: "Belum Aktif",
        compliant: "Patuh",
        partially_compliant: "Kurang Patuh",
        non_compliant: "Tidak Patuh",
    };
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ComplianceRules {
    /// Maximum number of unpaid active months still classified as partially compliant.
    pub shortfall_tolerance: u32,
    pub labels: ComplianceLabels,
}

impl ComplianceRules {
    pub const DEFAULT_RULES: ComplianceRules = ComplianceRules {
        shortfall_tolerance: 3,
        labels: ComplianceLabels::DEFAULT_LABELS,
    };
}

impl Default for ComplianceRules {
    fn default() -> Self {
        ComplianceRules::DEFAULT_RULES
    }
}
