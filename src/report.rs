use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_summary::classify::{normalize_header, RuleSet};
use survey_summary::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::InputType;

mod config_reader;
mod export;
mod io_common;
mod io_csv;
mod io_excel;
mod photos;
mod render;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The file {path} has no header row"))]
    EmptyInput { path: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("No input file: use --input or the fileSource section of the configuration"))]
    MissingInput {},
    #[snafu(display("Unknown input type {input_type:?}, expected csv or excel"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Invalid delimiter {delimiter:?}: a single byte character is expected"))]
    InvalidDelimiter { delimiter: String },
    #[snafu(display("{source}"))]
    Summary { source: SummaryErrors },
    #[snafu(display("Column {column:?} is not a photo column"))]
    NotAPhotoColumn { column: String },
    #[snafu(display("Error writing the combined summary"))]
    WritingXlsx { source: rust_xlsxwriter::XlsxError },
    #[snafu(display("Error writing the photo archive"))]
    WritingZip { source: zip::result::ZipError },
    #[snafu(display("Error creating the HTTP client"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

fn tally_rows_to_json(table: &TallyTable) -> Vec<JSValue> {
    table
        .rows
        .iter()
        .map(|r| json!({"response": r.response, "count": r.count, "percent": r.percent}))
        .collect()
}

fn total_to_json(table: &TallyTable) -> JSValue {
    match &table.total {
        Some(r) => json!({"count": r.count, "percent": r.percent}),
        None => JSValue::Null,
    }
}

fn summary_to_json(summary: &SurveySummary) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for q in summary.questions.iter() {
        let mut breakdown: Vec<JSValue> = Vec::new();
        for st in q.breakdown.iter() {
            let segment = match &st.segment {
                Some((column, value)) => json!({"column": column, "value": value}),
                None => JSValue::Null,
            };
            breakdown.push(json!({
                "subtitle": st.subtitle,
                "segment": segment,
                "tally": tally_rows_to_json(&st.table),
                "total": total_to_json(&st.table),
            }));
        }
        l.push(json!({
            "question": q.name,
            "kind": q.kind.label(),
            "overall": tally_rows_to_json(&q.overall),
            "total": total_to_json(&q.overall),
            "breakdown": breakdown,
        }));
    }
    l
}

fn build_summary_js(config: &SurveyConfig, summary: &SurveySummary) -> JSValue {
    json!({
        "config": {
            "input": config.file_source.file_path,
            "segmentBy": summary.segment_by,
            "respondents": summary.respondents,
            "dropped": summary.dropped,
        },
        "results": summary_to_json(summary),
    })
}

fn read_survey(config: &SurveyConfig) -> ReportResult<ResponseTable> {
    let path = config
        .file_source
        .file_path
        .clone()
        .context(MissingInputSnafu {})?;
    let input_type = config.input_type()?;
    let missing = config.missing_values();
    info!("Attempting to read survey file {:?} as {:?}", path, input_type);
    let table = match input_type {
        InputType::Csv => io_csv::read_csv(&path, config.delimiter()?, &missing)?,
        InputType::Excel => io_excel::read_excel(
            &path,
            config.file_source.excel_worksheet_name.as_deref(),
            &missing,
        )?,
    };
    info!(
        "Read {} respondents and {} columns from {}",
        table.num_rows(),
        table.columns().len(),
        io_common::simplify_file_name(&path)
    );
    Ok(table)
}

fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> ReportResult<PathBuf> {
    fs::create_dir_all(dir).context(WritingFileSnafu {
        path: dir.display().to_string(),
    })?;
    let p = dir.join(file_name);
    fs::write(&p, bytes).context(WritingFileSnafu {
        path: p.display().to_string(),
    })?;
    Ok(p)
}

fn archive_photo_columns(
    config: &SurveyConfig,
    table: &ResponseTable,
    rules: &RuleSet,
    out_dir: &Path,
) -> ReportResult<()> {
    let requested = config.photo_columns();
    if requested.is_empty() {
        return Ok(());
    }
    let normalized = normalize_table(table).context(SummarySnafu {})?;
    let mut columns: Vec<&Column> = Vec::new();
    for name in requested {
        let name = normalize_header(&name);
        match normalized.column(&name) {
            Some(c) if rules.classify(&c.name) == ColumnKind::Photo => columns.push(c),
            _ => return NotAPhotoColumnSnafu { column: name }.fail(),
        };
    }
    let fetcher = photos::HttpFetcher::new(config.photo_timeout())?;
    for column in columns {
        let archive = photos::build_photo_archive(&column.name, &column.values, &fetcher)?;
        for (row, reason) in archive.skipped.iter() {
            warn!(
                "Skipped the photo of row {} in {:?}: {}",
                row, column.name, reason
            );
        }
        let p = write_artifact(out_dir, &archive.file_name, &archive.bytes)?;
        info!(
            "Wrote {} photos ({} skipped) to {} ({})",
            archive.stored,
            archive.skipped.len(),
            p.display(),
            photos::ZIP_MIME
        );
    }
    Ok(())
}

/// Tabulates one survey export.
///
/// Arguments:
/// * `config` the input file and the report options
/// * `out` where to write the JSON report ('stdout' or a file path)
/// * `check_summary_path` a reference JSON report to compare with
pub fn run_report(
    config: &SurveyConfig,
    out: Option<String>,
    check_summary_path: Option<String>,
) -> ReportResult<()> {
    debug!("run_report: config: {:?}", config);
    // Nothing is processed if the file cannot be read.
    let table = read_survey(config)?;
    let rules = config.rule_set()?;
    let options = config.summary_options();

    let summary = summarize_survey(&table, &rules, &options).context(SummarySnafu {})?;

    println!("{}", render::render_summary(&summary));

    let out_dir = config.output_directory();
    let combined = combined_summary(&summary);
    let xlsx = export::write_combined_summary(&combined)?;
    let p = write_artifact(&out_dir, &config.summary_file_name(), &xlsx)?;
    info!(
        "Wrote the combined summary ({} rows) to {} ({})",
        combined.len(),
        p.display(),
        export::XLSX_MIME
    );

    archive_photo_columns(config, &table, &rules, &out_dir)?;

    let result_js = build_summary_js(config, &summary);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingFileSnafu { path })?;
            info!("Wrote the JSON report to {}", path);
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference report {}", summary_p);
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated report and reference report")
        }
        info!("The report matches the reference {}", summary_p);
    }

    Ok(())
}

pub fn run_cli(args: &Args) -> ReportResult<()> {
    let base = match &args.config {
        Some(p) => read_config(p)?,
        None => SurveyConfig::default(),
    };
    let config = config_from_args(base, args);
    run_report(&config, args.out.clone(), args.reference.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, contents: &str) -> String {
        let p = dir.join(name);
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        p.display().to_string()
    }

    fn config_for(input: String, out_dir: &Path) -> SurveyConfig {
        let mut config = SurveyConfig::default();
        config.file_source.file_path = Some(input);
        config.output_settings.output_directory = Some(out_dir.display().to_string());
        config
    }

    const SURVEY: &str = "Respondent Email,Color (pick one),Select all that apply - Toppings,Region\n\
a@x.org,Red,\"Cheese, Pepperoni\",North\n\
b@x.org,Blue,Cheese,South\n\
c@x.org,Red,,North\n\
d@x.org,,,\n";

    #[test]
    fn end_to_end_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(dir.path(), "survey.csv", SURVEY);
        let out_dir = dir.path().join("out");
        let report = dir.path().join("report.json");
        let mut config = config_for(input, &out_dir);
        config.rules.segment_by = Some("Region".to_string());

        run_report(&config, Some(report.display().to_string()), None).unwrap();

        assert!(out_dir.join(export::COMBINED_FILE_NAME).exists());
        let js: JSValue =
            serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        let results = js["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["question"], "Color");
        assert_eq!(results[0]["overall"][0]["response"], "Red");
        assert_eq!(results[0]["breakdown"][0]["subtitle"], "Region = North");
        assert_eq!(results[1]["kind"], "multi_select");
        assert_eq!(results[1]["overall"][0]["percent"], 100.0);
        assert_eq!(js["config"]["dropped"][0], "Respondent Email");

        // The report is its own reference.
        run_report(&config, None, Some(report.display().to_string())).unwrap();
    }

    #[test]
    fn reference_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(dir.path(), "survey.csv", SURVEY);
        let reference = write_csv(dir.path(), "reference.json", "{\"results\": []}");
        let config = config_for(input, dir.path());
        let res = run_report(&config, None, Some(reference));
        assert!(matches!(res, Err(ReportError::Whatever { .. })));
    }

    #[test]
    fn missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = SurveyConfig::default();
        assert!(matches!(
            run_report(&config, None, None),
            Err(ReportError::MissingInput {})
        ));
        let config = config_for(dir.path().join("nope.csv").display().to_string(), dir.path());
        assert!(matches!(
            run_report(&config, None, None),
            Err(ReportError::CsvOpen { .. })
        ));
        // Nothing was written.
        assert!(!dir.path().join(export::COMBINED_FILE_NAME).exists());
    }

    #[test]
    fn archive_requires_a_photo_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(dir.path(), "survey.csv", SURVEY);
        let mut config = config_for(input, dir.path());
        config.photo_archive.columns = Some(vec!["Color".to_string()]);
        let res = run_report(&config, None, None);
        assert!(matches!(res, Err(ReportError::NotAPhotoColumn { .. })));
    }
}
