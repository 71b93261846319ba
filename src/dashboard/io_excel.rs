// Reading the worksheets of Excel files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::debug;

use kepatuhan_pajak::{format_number, CellValue, ColumnKey, Table};

use crate::dashboard::io_common::{excel_serial_to_date, unnamed_header};
use crate::dashboard::*;

fn open(path: &str) -> DashboardResult<Xlsx<std::io::BufReader<std::fs::File>>> {
    open_workbook(path).context(OpeningExcelSnafu { path })
}

pub fn sheet_names(path: &str) -> DashboardResult<Vec<String>> {
    let workbook = open(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// The used range of a worksheet. Without a name, the first worksheet of the
/// workbook is read.
fn get_range(path: &str, sheet: Option<&str>) -> DashboardResult<(String, Range<DataType>)> {
    let mut workbook = open(path)?;
    let sheet_name = match sheet {
        Some(s) => s.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .context(EmptyWorkbookSnafu { path })?,
    };
    debug!("get_range: path: {:?} worksheet: {:?}", path, sheet_name);
    let wrange = workbook
        .worksheet_range(&sheet_name)
        .context(MissingWorksheetSnafu {
            sheet: sheet_name.clone(),
            path,
        })?
        .context(OpeningExcelSnafu { path })?;
    Ok((sheet_name, wrange))
}

fn header_text(idx: usize, cell: &DataType) -> String {
    let s = match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(x) => format_number(*x),
        DataType::DateTime(x) => excel_serial_to_date(*x)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format_number(*x)),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    };
    if s.is_empty() {
        unnamed_header(idx)
    } else {
        s
    }
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(s) if s.trim().is_empty() => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(x) => CellValue::Number(*x),
        DataType::DateTime(x) => excel_serial_to_date(*x)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Empty),
        DataType::Bool(b) => CellValue::Bool(*b),
        _ => CellValue::Empty,
    }
}

/// Reads a worksheet into a table. The first row holds the headers; the
/// rows with no value at all are skipped.
pub fn read_excel_table(path: &str, sheet: Option<&str>) -> DashboardResult<(String, Table)> {
    let (sheet_name, wrange) = get_range(path, sheet)?;
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu {})?;
    debug!("read_excel_table: header: {:?}", header);

    let columns: Vec<ColumnKey> = header
        .iter()
        .enumerate()
        .map(|(idx, c)| ColumnKey::Name(header_text(idx, c)))
        .collect();
    let mut table = Table::new(columns);
    for row in iter {
        let cells: Vec<CellValue> = row.iter().map(cell_value).collect();
        if cells.iter().all(|c| *c == CellValue::Empty) {
            continue;
        }
        table.push_row(cells).context(PipelineSnafu {})?;
    }
    debug!(
        "read_excel_table: {:?}: {} rows",
        sheet_name,
        table.num_rows()
    );
    Ok((sheet_name, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn headers() {
        assert_eq!(header_text(0, &DataType::String(" TMT ".into())), "TMT");
        assert_eq!(header_text(3, &DataType::Empty), "Unnamed: 3");
        assert_eq!(header_text(4, &DataType::DateTime(45292.0)), "2024-01-01");
        assert_eq!(header_text(5, &DataType::Float(2024.0)), "2024");
    }

    #[test]
    fn cells() {
        assert_eq!(cell_value(&DataType::Int(150)), CellValue::Number(150.0));
        assert_eq!(cell_value(&DataType::String(" ".into())), CellValue::Empty);
        assert_eq!(
            cell_value(&DataType::DateTime(45092.0)),
            CellValue::Date(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap())
        );
    }

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/objek_pajak.xlsx");

    #[test]
    fn worksheet_names() {
        assert_eq!(sheet_names(FIXTURE).unwrap(), vec!["2024", "Catatan"]);
    }

    #[test]
    fn first_worksheet_by_default() {
        let (sheet, table) = read_excel_table(FIXTURE, None).unwrap();
        assert_eq!(sheet, "2024");
        let headers: Vec<String> = table.columns().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            headers,
            vec!["Nama OP", "TMT", "Status", "Jenis", "Unit", "2024-01-01", "Feb-24", "Unnamed: 7"]
        );
        // The blank third line of the sheet is skipped.
        assert_eq!(table.num_rows(), 2);
        let melati = &table.rows()[0];
        assert_eq!(
            melati[1],
            CellValue::Date(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap())
        );
        assert_eq!(melati[5], CellValue::Number(100.0));
        assert_eq!(melati[7], CellValue::Text("lama".to_string()));
        let sari = &table.rows()[1];
        assert_eq!(sari[0], CellValue::Text("Resto Sari".to_string()));
        assert_eq!(sari[5], CellValue::Empty);
        assert_eq!(sari[6], CellValue::Number(250.0));
        assert_eq!(sari[7], CellValue::Empty);
    }

    #[test]
    fn named_worksheet() {
        let (sheet, table) = read_excel_table(FIXTURE, Some("Catatan")).unwrap();
        assert_eq!(sheet, "Catatan");
        assert_eq!(table.columns(), &[ColumnKey::from("Keterangan")]);
        assert_eq!(table.num_rows(), 1);
    }

    #[test]
    fn missing_worksheet() {
        match read_excel_table(FIXTURE, Some("2023")) {
            Err(DashboardError::MissingWorksheet { sheet, .. }) => assert_eq!(sheet, "2023"),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_excel_table("/tidak/ada.xlsx", None),
            Err(DashboardError::OpeningExcel { .. })
        ));
    }
}
