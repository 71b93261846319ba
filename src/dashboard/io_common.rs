use std::path::Path;

use chrono::{Days, NaiveDate};

use kepatuhan_pajak::CellValue;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The header given to the columns without a name.
pub fn unnamed_header(idx: usize) -> String {
    format!("Unnamed: {}", idx)
}

/// Converts the serial number of a spreadsheet date to a date.
///
/// The fractional part (the time of day) is dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    // Day 0 is 1899-12-30, which absorbs the fictitious 1900-02-29.
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// The cell of a text-based source. Blank text is missing, numbers are read
/// as numbers, and the rest is kept as text.
pub fn cell_from_text(s: &str) -> CellValue {
    let t = s.trim();
    if t.is_empty() {
        CellValue::Empty
    } else {
        match t.parse::<f64>() {
            Ok(x) if x.is_finite() => CellValue::Number(x),
            _ => CellValue::Text(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/data/2024/objek.xlsx"), "objek.xlsx");
        assert_eq!(simplify_file_name("objek.csv"), "objek.csv");
    }

    #[test]
    fn serial_dates() {
        assert_eq!(
            excel_serial_to_date(45292.0),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            excel_serial_to_date(45092.75),
            NaiveDate::from_ymd_opt(2023, 6, 15)
        );
        assert_eq!(excel_serial_to_date(-1.0), None);
    }

    #[test]
    fn text_cells() {
        assert_eq!(cell_from_text("  "), CellValue::Empty);
        assert_eq!(cell_from_text("250000"), CellValue::Number(250000.0));
        assert_eq!(cell_from_text(" 1.5 "), CellValue::Number(1.5));
        assert_eq!(cell_from_text("Aktif"), CellValue::Text("Aktif".to_string()));
        assert_eq!(cell_from_text("NaN"), CellValue::Text("NaN".to_string()));
    }
}
