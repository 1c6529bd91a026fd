// The combined summary spreadsheet.

use rust_xlsxwriter::{Format, Workbook};

use crate::report::*;

pub const COMBINED_FILE_NAME: &str = "survey_combined_summary.xlsx";
pub const COMBINED_SHEET_NAME: &str = "All Responses";
pub const COMBINED_HEADER: [&str; 4] = ["Question", "Response", "Count", "Percent (%)"];
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Serializes the combined rows into a workbook with a single sheet.
pub fn write_combined_summary(rows: &[CombinedRow]) -> ReportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(COMBINED_SHEET_NAME)
        .context(WritingXlsxSnafu {})?;

    let header_format = Format::new().set_bold();
    for (col, name) in COMBINED_HEADER.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *name, &header_format)
            .context(WritingXlsxSnafu {})?;
    }

    for (idx, r) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet
            .write_string(row, 0, &r.question)
            .context(WritingXlsxSnafu {})?;
        sheet
            .write_string(row, 1, &r.response)
            .context(WritingXlsxSnafu {})?;
        sheet
            .write_number(row, 2, r.count as f64)
            .context(WritingXlsxSnafu {})?;
        sheet
            .write_number(row, 3, r.percent)
            .context(WritingXlsxSnafu {})?;
    }
    debug!("write_combined_summary: {} rows", rows.len());

    workbook.save_to_buffer().context(WritingXlsxSnafu {})
}
