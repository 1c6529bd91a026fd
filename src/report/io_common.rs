use std::path::Path;

use crate::report::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Excel,
}

impl InputType {
    pub fn parse(s: &str) -> ReportResult<InputType> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(InputType::Csv),
            "excel" | "xlsx" => Ok(InputType::Excel),
            _ => UnknownInputTypeSnafu { input_type: s }.fail(),
        }
    }
}

/// Spreadsheets are recognized by their extension, everything else is read as delimited text.
pub fn infer_input_type(path: &str) -> InputType {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => InputType::Excel,
        _ => InputType::Csv,
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}
