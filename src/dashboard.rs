use log::{info, warn};

use kepatuhan_pajak::views::*;
use kepatuhan_pajak::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
pub mod export;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

use crate::args::Args;
use crate::dashboard::config_reader::*;
use crate::dashboard::io_common::simplify_file_name;

/// Number of lines in the ranking of the taxable objects.
const TOP_OBJECTS_LIMIT: usize = 5;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashboardError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyWorkbook { path: String },
    #[snafu(display("Worksheet {sheet:?} not found in {path}"))]
    MissingWorksheet { sheet: String, path: String },
    #[snafu(display("The worksheet has no header row"))]
    EmptyExcel {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No input file: use --input or the input.filePath option"))]
    MissingInput {},
    #[snafu(display("{source}"))]
    Pipeline { source: ComplianceErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashboardResult<T> = Result<T, DashboardError>;

fn selection_to_json(s: &Selection) -> JSValue {
    match s {
        Selection::All => json!(kepatuhan_pajak::ALL_SENTINEL),
        Selection::Only(v) => json!(v),
    }
}

fn build_summary_js(
    settings: &Settings,
    sheet: Option<&str>,
    report: &ComplianceReport,
    filtered: &Table,
) -> JSValue {
    let payment_columns: Vec<String> = report
        .payment_columns
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    let classification: Vec<JSValue> = classification_counts(filtered)
        .into_iter()
        .map(|(label, count)| json!({"klasifikasi": label, "jumlah": count}))
        .collect();
    if classification.is_empty() {
        warn!("No compliance data to show in the classification chart");
    }

    let monthly: Vec<JSValue> = monthly_totals(filtered, &report.payment_columns, settings.year)
        .into_iter()
        .map(|m| {
            json!({
                "bulan": m.month.format("%Y-%m-%d").to_string(),
                "label": m.label,
                "totalPembayaran": m.total
            })
        })
        .collect();
    if report.payment_columns.is_empty() {
        warn!("No valid payment column found for {}", settings.year);
    } else if monthly.is_empty() {
        warn!("No payment data for {}", settings.year);
    }

    let top: Vec<JSValue> = match top_objects(filtered, TOP_OBJECTS_LIMIT) {
        Ok(objects) => objects
            .into_iter()
            .map(|o| {
                json!({
                    "namaOp": o.nama_op,
                    "nmUnit": o.nm_unit,
                    "klasifikasi": o.klasifikasi,
                    "totalPembayaran": o.total_payment
                })
            })
            .collect(),
        Err(e) => {
            warn!("Cannot rank the taxable objects: {}", e);
            Vec::new()
        }
    };

    json!({
        "config": {
            "source": simplify_file_name(&settings.input_path),
            "sheet": sheet,
            "taxYear": settings.year,
            "filters": {
                "unit": selection_to_json(&settings.filter.unit),
                "klasifikasi": selection_to_json(&settings.filter.klasifikasi),
                "status": selection_to_json(&settings.filter.status),
            }
        },
        "results": {
            "records": filtered.num_rows(),
            "totalRecords": report.table.num_rows(),
            "paymentColumns": payment_columns,
            "classification": classification,
            "monthlyTotals": monthly,
            "topObjects": top,
        }
    })
}

fn read_table(settings: &Settings) -> DashboardResult<(Option<String>, Table)> {
    info!(
        "Attempting to read {:?} ({:?})",
        settings.input_path, settings.provider
    );
    match settings.provider {
        InputProvider::Xlsx => {
            let (sheet, table) =
                io_excel::read_excel_table(&settings.input_path, settings.sheet.as_deref())?;
            Ok((Some(sheet), table))
        }
        InputProvider::Csv => Ok((None, io_csv::read_csv_table(&settings.input_path)?)),
    }
}

fn log_filter_options(table: &Table) {
    for column in [NM_UNIT, KLASIFIKASI, STATUS] {
        info!(
            "Filter options for {}: {:?}",
            column,
            filter_options(table, column)
        );
    }
}

fn write_summary(destination: &str, contents: &str) -> DashboardResult<()> {
    if destination == STDOUT {
        println!("summary:{}", contents);
        Ok(())
    } else {
        info!("Writing summary to {:?}", destination);
        fs::write(destination, contents).context(WritingFileSnafu { path: destination })
    }
}

fn check_reference(reference_path: &str, pretty_js_summary: &str) -> DashboardResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_summary, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_dashboard(args: &Args) -> DashboardResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => DashboardConfig::default(),
    };
    let settings = Settings::resolve(&config, args.config.as_deref(), args)?;
    info!("settings: {:?}", settings);

    if args.list_sheets {
        if settings.provider != InputProvider::Xlsx {
            whatever!("--list-sheets needs an Excel input")
        }
        for name in io_excel::sheet_names(&settings.input_path)? {
            println!("{}", name);
        }
        return Ok(());
    }

    let (sheet, raw) = read_table(&settings)?;

    let pipeline = settings.pipeline();
    let prepared = pipeline.prepare(&raw).context(PipelineSnafu {})?;
    let report = pipeline
        .compute(&prepared, settings.year)
        .context(PipelineSnafu {})?;
    log_filter_options(&report.table);

    // Filters only narrow down what is displayed and exported, the computation
    // covers the whole table.
    let filtered = settings.filter.apply(&report.table);
    if filtered.is_empty() {
        warn!("No record left after filtering");
    } else {
        info!(
            "{} of {} records after filtering",
            filtered.num_rows(),
            report.table.num_rows()
        );
    }

    if settings.preview_rows > 0 {
        println!("{}", export::render_preview(&filtered, settings.preview_rows));
    }

    if let Some(path) = &settings.export_path {
        export::write_csv(&filtered, path)?;
        info!("Exported {} records to {:?}", filtered.num_rows(), path);
    }

    let summary_js = build_summary_js(&settings, sheet.as_deref(), &report, &filtered);
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    write_summary(&settings.summary_path, &pretty_js_summary)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &settings.reference {
        check_reference(reference_path, &pretty_js_summary)?;
    }

    Ok(())
}
