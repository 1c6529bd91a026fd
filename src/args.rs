use clap::Parser;

/// This is a survey tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the survey input and the report options.
    /// The command line options below override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey export to tabulate: a CSV file or an Excel workbook. The first row
    /// must contain the questions.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or excel, inferred from the file extension by default) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (column name, optional) Breaks down every question by the values of this column.
    #[clap(short, long, value_parser)]
    pub segment_by: Option<String>,

    /// If passed as an argument, appends a total row to the single-choice tallies.
    #[clap(long, takes_value = false)]
    pub totals: bool,

    /// If passed as an argument, the photo columns are listed in the report instead of being
    /// dropped.
    #[clap(long, takes_value = false)]
    pub keep_photos: bool,

    /// (column name, may be repeated) Downloads all the pictures of this photo column into a
    /// zip archive in the output directory.
    #[clap(long, value_parser)]
    pub archive_photos: Vec<String>,

    /// (directory, default '.') Where the combined summary and the photo archives are written.
    #[clap(long, value_parser)]
    pub output_dir: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the report will be written in JSON format to
    /// the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference report in JSON format. If provided, the computed report is
    /// checked against it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
