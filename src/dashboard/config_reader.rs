use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use kepatuhan_pajak::views::{RecordFilter, Selection};
use kepatuhan_pajak::{AliasTable, ComplianceRules, Pipeline};

use crate::args::Args;
use crate::dashboard::*;

/// Writing the summary to this destination prints it on the standard output.
pub const STDOUT: &str = "stdout";

pub const DEFAULT_TAX_YEAR: i32 = 2024;
pub const MIN_TAX_YEAR: i32 = 2000;
pub const MAX_TAX_YEAR: i32 = 2100;
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub provider: Option<String>,
    #[serde(rename = "sheetName")]
    pub sheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSettings {
    #[serde(rename = "taxYear")]
    pub tax_year: Option<i32>,
    #[serde(rename = "shortfallTolerance")]
    pub shortfall_tolerance: Option<u32>,
    /// Extra header spellings, mapped to their canonical column name.
    #[serde(rename = "columnAliases")]
    pub column_aliases: BTreeMap<String, String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub unit: Option<String>,
    pub klasifikasi: Option<String>,
    pub status: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    #[serde(rename = "exportPath")]
    pub export_path: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
    #[serde(rename = "previewRows")]
    pub preview_rows: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub input: InputSettings,
    pub rules: RulesSettings,
    pub filters: FilterSettings,
    pub output: OutputSettings,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputProvider {
    Xlsx,
    Csv,
}

impl InputProvider {
    pub fn parse(s: &str) -> DashboardResult<InputProvider> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(InputProvider::Xlsx),
            "csv" => Ok(InputProvider::Csv),
            _ => whatever!("unknown input type: {}", s),
        }
    }

    /// Deduces the provider from the extension of the file.
    pub fn infer(path: &str) -> DashboardResult<InputProvider> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("xlsx") | Some("xlsm") => Ok(InputProvider::Xlsx),
            Some("csv") => Ok(InputProvider::Csv),
            _ => whatever!(
                "cannot deduce the type of {:?}: use --input-type xlsx or csv",
                path
            ),
        }
    }
}

/// The options of one run, once the command line and the configuration file
/// have been merged.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub input_path: String,
    pub provider: InputProvider,
    pub sheet: Option<String>,
    pub year: i32,
    pub shortfall_tolerance: u32,
    pub column_aliases: BTreeMap<String, String>,
    pub filter: RecordFilter,
    pub export_path: Option<String>,
    pub summary_path: String,
    pub preview_rows: usize,
    pub reference: Option<String>,
}

/// Paths in a configuration file are relative to the directory of that file.
fn config_relative(config_path: Option<&str>, path: &str) -> String {
    match config_path.and_then(|p| Path::new(p).parent()) {
        Some(dir) if Path::new(path).is_relative() && path != STDOUT => {
            dir.join(path).display().to_string()
        }
        _ => path.to_string(),
    }
}

impl Settings {
    pub fn resolve(
        config: &DashboardConfig,
        config_path: Option<&str>,
        args: &Args,
    ) -> DashboardResult<Settings> {
        let from_config = |p: &Option<String>| p.as_deref().map(|s| config_relative(config_path, s));

        let input_path = args
            .input
            .clone()
            .or_else(|| from_config(&config.input.file_path))
            .context(MissingInputSnafu {})?;

        let provider = match args
            .input_type
            .as_deref()
            .or(config.input.provider.as_deref())
        {
            Some(p) => InputProvider::parse(p)?,
            None => InputProvider::infer(&input_path)?,
        };

        let year = args
            .year
            .or(config.rules.tax_year)
            .unwrap_or(DEFAULT_TAX_YEAR);
        if !(MIN_TAX_YEAR..=MAX_TAX_YEAR).contains(&year) {
            whatever!(
                "the tax year must be between {} and {}, got {}",
                MIN_TAX_YEAR,
                MAX_TAX_YEAR,
                year
            )
        }

        let pick = |arg: &Option<String>, conf: &Option<String>| -> Selection {
            Selection::from(arg.as_deref().or(conf.as_deref()))
        };
        let filter = RecordFilter {
            unit: pick(&args.unit, &config.filters.unit),
            klasifikasi: pick(&args.klasifikasi, &config.filters.klasifikasi),
            status: pick(&args.status, &config.filters.status),
        };

        let settings = Settings {
            input_path,
            provider,
            sheet: args.sheet.clone().or_else(|| config.input.sheet_name.clone()),
            year,
            shortfall_tolerance: config
                .rules
                .shortfall_tolerance
                .unwrap_or(ComplianceRules::DEFAULT_RULES.shortfall_tolerance),
            column_aliases: config.rules.column_aliases.clone(),
            filter,
            export_path: args
                .out
                .clone()
                .or_else(|| from_config(&config.output.export_path)),
            summary_path: args
                .summary
                .clone()
                .or_else(|| from_config(&config.output.summary_path))
                .unwrap_or_else(|| STDOUT.to_string()),
            preview_rows: args
                .preview
                .or(config.output.preview_rows)
                .unwrap_or(DEFAULT_PREVIEW_ROWS),
            reference: args.reference.clone(),
        };
        debug!("Settings::resolve: {:?}", settings);
        Ok(settings)
    }

    /// The computation pipeline: the default aliases extended by the
    /// configured ones, and the configured tolerance.
    pub fn pipeline(&self) -> Pipeline {
        let aliases = self
            .column_aliases
            .iter()
            .fold(AliasTable::default(), |t, (header, canonical)| {
                t.with_alias(header, canonical)
            });
        Pipeline {
            aliases,
            rules: ComplianceRules {
                shortfall_tolerance: self.shortfall_tolerance,
                ..ComplianceRules::DEFAULT_RULES
            },
            ..Pipeline::default()
        }
    }
}

pub fn read_config(path: &str) -> DashboardResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> DashboardResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}
