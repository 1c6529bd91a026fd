use crate::report::io_common::{infer_input_type, InputType};
use crate::report::*;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PHOTO_TIMEOUT_SECS: u64 = 10;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryFileName")]
    pub summary_file_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub delimiter: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "missingValues")]
    pub missing_values: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyRules {
    #[serde(rename = "segmentBy")]
    pub segment_by: Option<String>,
    #[serde(rename = "includeTotals")]
    pub include_totals: Option<bool>,
    #[serde(rename = "keepPhotos")]
    pub keep_photos: Option<bool>,
    #[serde(rename = "extraIrrelevantPatterns")]
    pub extra_irrelevant_patterns: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoArchiveSettings {
    pub columns: Option<Vec<String>>,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "fileSource", default)]
    pub file_source: FileSource,
    #[serde(default)]
    pub rules: SurveyRules,
    #[serde(rename = "photoArchive", default)]
    pub photo_archive: PhotoArchiveSettings,
}

impl SurveyConfig {
    pub fn input_type(&self) -> ReportResult<InputType> {
        match (&self.file_source.provider, &self.file_source.file_path) {
            (Some(p), _) => InputType::parse(p),
            (None, Some(path)) => Ok(infer_input_type(path)),
            (None, None) => MissingInputSnafu {}.fail(),
        }
    }

    pub fn delimiter(&self) -> ReportResult<u8> {
        match self.file_source.delimiter.as_deref() {
            None => Ok(b','),
            Some("\\t") | Some("tab") => Ok(b'\t'),
            Some(d) if d.len() == 1 => Ok(d.as_bytes()[0]),
            Some(d) => InvalidDelimiterSnafu { delimiter: d }.fail(),
        }
    }

    pub fn missing_values(&self) -> Vec<String> {
        match &self.file_source.missing_values {
            Some(l) => l.clone(),
            None => builder::DEFAULT_MISSING_VALUES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn rule_set(&self) -> ReportResult<RuleSet> {
        let mut rs = RuleSet::default_rules().context(SummarySnafu {})?;
        for p in self
            .rules
            .extra_irrelevant_patterns
            .iter()
            .flatten()
        {
            rs = rs
                .with_rule(ColumnKind::Irrelevant, p)
                .context(SummarySnafu {})?;
        }
        Ok(rs)
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            segment_by: self.rules.segment_by.clone(),
            include_totals: self.rules.include_totals.unwrap_or(false),
            photo_policy: if self.rules.keep_photos.unwrap_or(false) {
                PhotoPolicy::Archive
            } else {
                PhotoPolicy::Drop
            },
        }
    }

    pub fn output_directory(&self) -> PathBuf {
        PathBuf::from(
            self.output_settings
                .output_directory
                .clone()
                .unwrap_or_else(|| ".".to_string()),
        )
    }

    pub fn summary_file_name(&self) -> String {
        self.output_settings
            .summary_file_name
            .clone()
            .unwrap_or_else(|| export::COMBINED_FILE_NAME.to_string())
    }

    pub fn photo_columns(&self) -> Vec<String> {
        self.photo_archive.columns.clone().unwrap_or_default()
    }

    pub fn photo_timeout(&self) -> Duration {
        Duration::from_secs(
            self.photo_archive
                .timeout_seconds
                .unwrap_or(DEFAULT_PHOTO_TIMEOUT_SECS),
        )
    }
}

/// Resolves a path of the configuration file against the directory of that file.
fn resolve(root: &Path, p: &Option<String>) -> Option<String> {
    p.as_ref().map(|s| {
        let path = Path::new(s);
        if path.is_absolute() {
            s.clone()
        } else {
            root.join(path).display().to_string()
        }
    })
}

pub fn read_config(path: &str) -> ReportResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    let root = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
    config.file_source.file_path = resolve(root, &config.file_source.file_path);
    config.output_settings.output_directory =
        resolve(root, &config.output_settings.output_directory);
    Ok(config)
}

/// The command line options take precedence over the configuration file.
pub fn config_from_args(base: SurveyConfig, args: &Args) -> SurveyConfig {
    let mut config = base;
    if args.input.is_some() {
        config.file_source.file_path = args.input.clone();
        // The provider of the file in the configuration does not apply anymore.
        config.file_source.provider = None;
    }
    if args.input_type.is_some() {
        config.file_source.provider = args.input_type.clone();
    }
    if args.excel_worksheet_name.is_some() {
        config.file_source.excel_worksheet_name = args.excel_worksheet_name.clone();
    }
    if args.segment_by.is_some() {
        config.rules.segment_by = args.segment_by.clone();
    }
    if args.totals {
        config.rules.include_totals = Some(true);
    }
    if args.keep_photos {
        config.rules.keep_photos = Some(true);
    }
    if !args.archive_photos.is_empty() {
        config.photo_archive.columns = Some(args.archive_photos.clone());
    }
    if args.output_dir.is_some() {
        config.output_settings.output_directory = args.output_dir.clone();
    }
    config
}

/// Reads a reference report.
pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_config() {
        let config: SurveyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SurveyConfig::default());
        assert_eq!(config.summary_options(), SummaryOptions::DEFAULT_OPTIONS);
        assert_eq!(config.summary_file_name(), "survey_combined_summary.xlsx");
        assert_eq!(config.photo_timeout(), Duration::from_secs(10));
        assert_eq!(config.delimiter().unwrap(), b',');
        assert!(config.missing_values().contains(&"NA".to_string()));
    }

    #[test]
    fn read_config_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.json");
        fs::write(
            &p,
            r#"{
                "outputSettings": {"outputDirectory": "out"},
                "fileSource": {"filePath": "survey.xlsx", "delimiter": ";"},
                "rules": {"segmentBy": "Region", "includeTotals": true, "keepPhotos": true,
                          "extraIrrelevantPatterns": ["^internal"]},
                "photoArchive": {"columns": ["Storefront photo"], "timeoutSeconds": 3}
            }"#,
        )
        .unwrap();
        let config = read_config(&p.display().to_string()).unwrap();
        assert_eq!(
            config.file_source.file_path,
            Some(dir.path().join("survey.xlsx").display().to_string())
        );
        assert_eq!(config.output_directory(), dir.path().join("out"));
        assert_eq!(config.input_type().unwrap(), InputType::Excel);
        assert_eq!(config.delimiter().unwrap(), b';');
        assert_eq!(config.photo_timeout(), Duration::from_secs(3));
        assert_eq!(
            config.summary_options(),
            SummaryOptions {
                segment_by: Some("Region".to_string()),
                include_totals: true,
                photo_policy: PhotoPolicy::Archive,
            }
        );
        let rules = config.rule_set().unwrap();
        assert_eq!(rules.classify("Internal notes"), ColumnKind::Irrelevant);
    }

    #[test]
    fn invalid_settings() {
        let mut config = SurveyConfig::default();
        config.file_source.delimiter = Some("::".to_string());
        assert!(matches!(
            config.delimiter(),
            Err(ReportError::InvalidDelimiter { .. })
        ));
        config.file_source.provider = Some("pdf".to_string());
        assert!(matches!(
            config.input_type(),
            Err(ReportError::UnknownInputType { .. })
        ));
        config.rules.extra_irrelevant_patterns = Some(vec!["[".to_string()]);
        assert!(matches!(
            config.rule_set(),
            Err(ReportError::Summary { .. })
        ));
    }

    #[test]
    fn args_override_config() {
        let mut base = SurveyConfig::default();
        base.file_source.file_path = Some("a.xlsx".to_string());
        base.file_source.provider = Some("excel".to_string());
        base.rules.segment_by = Some("Region".to_string());
        let args = Args::parse_from([
            "survey_tally",
            "-i",
            "b.csv",
            "--totals",
            "--archive-photos",
            "Photo",
            "--archive-photos",
            "Take a picture",
        ]);
        let config = config_from_args(base, &args);
        assert_eq!(config.file_source.file_path, Some("b.csv".to_string()));
        assert_eq!(config.input_type().unwrap(), InputType::Csv);
        assert_eq!(config.rules.segment_by, Some("Region".to_string()));
        assert_eq!(config.rules.include_totals, Some(true));
        assert_eq!(config.photo_columns(), vec!["Photo", "Take a picture"]);
    }
}
