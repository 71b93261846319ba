//! Detection of the payment-period columns, and date coercion.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::debug;

use crate::config::*;
use crate::table::Table;

// Formats that name a month but not a day. The order matters: two-digit
// years are tried before four-digit years. `%b` only reads the short month
// names, `%B` the full ones.
const DEFAULT_MONTH_FORMATS: [&str; 12] = [
    "%b-%y", "%b-%Y", "%b %y", "%b %Y", "%B-%y", "%B-%Y", "%B %y", "%B %Y", "%m/%Y", "%m-%Y",
    "%Y-%m", "%Y/%m",
];

// Month first for ambiguous slashed dates.
const DEFAULT_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%d %b %Y",
];

const DEFAULT_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2199;

/// The chrono formats accepted when reading dates and period headers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PeriodFormats {
    pub month_formats: Vec<String>,
    pub date_formats: Vec<String>,
    pub datetime_formats: Vec<String>,
}

impl Default for PeriodFormats {
    fn default() -> Self {
        PeriodFormats {
            month_formats: DEFAULT_MONTH_FORMATS.iter().map(|s| s.to_string()).collect(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            datetime_formats: DEFAULT_DATETIME_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn plausible(d: &NaiveDate) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&d.year())
}

pub fn month_start(d: NaiveDate) -> Option<NaiveDate> {
    d.with_day(1)
}

/// Parses a complete date (or date and time, the time being dropped).
pub fn parse_date(s: &str, formats: &PeriodFormats) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    formats
        .date_formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok().filter(plausible))
        .or_else(|| {
            formats.datetime_formats.iter().find_map(|f| {
                NaiveDateTime::parse_from_str(s, f)
                    .ok()
                    .map(|dt| dt.date())
                    .filter(plausible)
            })
        })
}

/// Reads a header as a payment period: the first day of the month it names.
///
/// Returns None for anything that is not a date, which is the normal case for
/// the descriptive columns.
pub fn parse_period(header: &str, formats: &PeriodFormats) -> Option<NaiveDate> {
    let s = header.trim();
    if s.is_empty() {
        return None;
    }
    // chrono needs a day to build a date.
    let with_day = format!("{} 01", s);
    formats
        .month_formats
        .iter()
        .find_map(|f| {
            NaiveDate::parse_from_str(&with_day, &format!("{} %d", f))
                .ok()
                .filter(plausible)
        })
        .or_else(|| parse_date(s, formats))
        .and_then(month_start)
}

/// Coerces a cell to a date. Anything that cannot be read as a date is missing.
pub fn coerce_date(cell: &CellValue, formats: &PeriodFormats) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date(s, formats).or_else(|| parse_period(s, formats)),
        _ => None,
    }
}

/// Turns every header that names a month into a period column.
pub fn resolve_periods(table: &Table, formats: &PeriodFormats) -> Table {
    let columns: Vec<ColumnKey> = table
        .columns()
        .iter()
        .map(|key| match key {
            ColumnKey::Name(header) => match parse_period(header, formats) {
                Some(d) => {
                    debug!("resolve_periods: {:?} -> period {}", header, d);
                    ColumnKey::Period(d)
                }
                None => key.clone(),
            },
            ColumnKey::Period(_) => key.clone(),
        })
        .collect();
    table.with_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_headers() {
        let f = PeriodFormats::default();
        let jan = Some(ymd(2024, 1, 1));
        assert_eq!(parse_period("Jan-24", &f), jan);
        assert_eq!(parse_period("01/2024", &f), jan);
        assert_eq!(parse_period("2024-01-01", &f), jan);
        assert_eq!(parse_period("Jan-2024", &f), jan);
        assert_eq!(parse_period("January 2024", &f), jan);
        assert_eq!(parse_period(" 2024-01 ", &f), jan);
        assert_eq!(parse_period("2024-01-17 00:00:00", &f), jan);
        assert_eq!(parse_period("Dec-23", &f), Some(ymd(2023, 12, 1)));
        assert_eq!(parse_period("15/03/2024", &f), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn full_month_names() {
        let f = PeriodFormats::default();
        assert_eq!(parse_period("January 2024", &f), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_period("March-24", &f), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_period("september 2023", &f), Some(ymd(2023, 9, 1)));
        assert_eq!(parse_period("Desember 2023", &f), None);
        assert_eq!(coerce_date(&text("February-2024"), &f), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn other_headers_are_not_periods() {
        let f = PeriodFormats::default();
        for h in [
            "Revenue Notes",
            "TMT",
            "STATUS",
            "Nm Unit",
            "Jan",
            "2024",
            "",
            "Unnamed: 3",
            "Total Pembayaran",
        ] {
            assert_eq!(parse_period(h, &f), None, "{:?}", h);
        }
    }

    #[test]
    fn resolution_keeps_the_other_headers() {
        let t = TableBuilder::new(&["TMT", "Jan-24", "Revenue Notes", "01/2024"])
            .build()
            .unwrap();
        let out = resolve_periods(&t, &PeriodFormats::default());
        assert_eq!(
            out.columns(),
            &[
                ColumnKey::from("TMT"),
                ColumnKey::Period(ymd(2024, 1, 1)),
                ColumnKey::from("Revenue Notes"),
                ColumnKey::Period(ymd(2024, 1, 1)),
            ]
        );
    }

    #[test]
    fn coercion_of_start_dates() {
        let f = PeriodFormats::default();
        assert_eq!(
            coerce_date(&date(2023, 6, 15), &f),
            Some(ymd(2023, 6, 15))
        );
        assert_eq!(
            coerce_date(&text("2024-03-10"), &f),
            Some(ymd(2024, 3, 10))
        );
        assert_eq!(
            coerce_date(&text("2024-03-10 08:30:00"), &f),
            Some(ymd(2024, 3, 10))
        );
        assert_eq!(coerce_date(&text("Mar-24"), &f), Some(ymd(2024, 3, 1)));
        assert_eq!(coerce_date(&text("belum terdaftar"), &f), None);
        assert_eq!(coerce_date(&number(45000.0), &f), None);
        assert_eq!(coerce_date(&CellValue::Empty, &f), None);
    }

    #[test]
    fn formats_can_be_injected() {
        let f = PeriodFormats {
            month_formats: vec!["%m.%Y".to_string()],
            date_formats: vec![],
            datetime_formats: vec![],
        };
        assert_eq!(parse_period("05.2024", &f), Some(ymd(2024, 5, 1)));
        assert_eq!(parse_period("Jan-24", &f), None);
    }
}
