use clap::Parser;

/// Computes the compliance of regional taxpayers from a spreadsheet of monthly payments.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. The options given on the command line
    /// take precedence over the content of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The spreadsheet (.xlsx) or CSV file with one row per taxable object.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. By default, it is deduced from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the first sheet) When using an Excel file, the name of the worksheet to use.
    #[clap(short, long, value_parser)]
    pub sheet: Option<String>,

    /// If passed as an argument, prints the names of the worksheets of the input and stops.
    #[clap(long, takes_value = false)]
    pub list_sheets: bool,

    /// (default 2024) The tax year, between 2000 and 2100.
    #[clap(short, long, value_parser = clap::value_parser!(i32).range(2000..=2100))]
    pub year: Option<i32>,

    /// Only keep the objects of this unit (Nm Unit). 'Semua' keeps all of them.
    #[clap(long, value_parser)]
    pub unit: Option<String>,

    /// Only keep the objects of this tax category (KLASIFIKASI). 'Semua' keeps all of them.
    #[clap(long, value_parser)]
    pub klasifikasi: Option<String>,

    /// Only keep the objects with this status (STATUS). 'Semua' keeps all of them.
    #[clap(long, value_parser)]
    pub status: Option<String>,

    /// (file path, usually hasil_dashboard.csv) If specified, the filtered table with the
    /// computed columns is written to this location in CSV format.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or 'stdout', default stdout) Where to write the JSON summary.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (default 50) The number of rows printed as a preview. 0 disables the preview.
    #[clap(long, value_parser)]
    pub preview: Option<usize>,

    /// (file path) A reference summary in JSON format. If provided, the program checks that
    /// the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
