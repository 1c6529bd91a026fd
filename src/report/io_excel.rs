use calamine::{open_workbook_auto, DataType, Reader};
use survey_summary::builder::Builder;

use crate::report::*;

/// How date cells are rendered, with the time of day even for plain dates.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads a survey from a spreadsheet.
///
/// The first worksheet is used unless a worksheet name is given. The first row
/// is the header.
pub fn read_excel(
    path: &str,
    worksheet_name: Option<&str>,
    missing_values: &[String],
) -> ReportResult<ResponseTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyInputSnafu { path })?
        .iter()
        .map(|c| cell_to_string(c).unwrap_or_default())
        .collect();
    debug!("read_excel: header: {:?}", header);
    if header.iter().all(|h| h.is_empty()) {
        return EmptyInputSnafu { path }.fail();
    }

    let mut builder = Builder::new(&header)
        .context(SummarySnafu {})?
        .missing_values(missing_values);
    for (idx, row) in iter.enumerate() {
        let cells: Vec<Option<String>> = row.iter().map(cell_to_string).collect();
        debug!("read_excel: idx: {:?} row: {:?}", idx, &cells);
        builder.add_row(&cells);
    }
    builder.build().context(SummarySnafu {})
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> ReportResult<calamine::Range<DataType>> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
    debug!(
        "read_excel: path: {:?} worksheets: {:?}",
        path,
        workbook.sheet_names()
    );

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyInputSnafu { path })?
            .context(OpeningExcelSnafu { path })
    }
}

/// The text of a cell, or None if the cell is empty or holds an error.
fn cell_to_string(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Empty => None,
        // Whole numbers are stored as floats.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Bool(true) => Some("True".to_string()),
        DataType::Bool(false) => Some("False".to_string()),
        DataType::DateTime(f) => match cell.as_datetime() {
            Some(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
            None => Some(f.to_string()),
        },
        DataType::Error(_) => None,
        #[allow(unreachable_patterns)]
        other => Some(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn missing() -> Vec<String> {
        builder::DEFAULT_MISSING_VALUES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn write_workbook(dir: &Path) -> String {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Form1").unwrap();
        sheet.write_string(0, 0, "Color (pick one)").unwrap();
        sheet.write_string(0, 1, "Rating").unwrap();
        sheet.write_string(1, 0, "Red").unwrap();
        sheet.write_number(1, 1, 3.0).unwrap();
        sheet.write_string(2, 0, "N/A").unwrap();
        sheet.write_number(2, 1, 4.5).unwrap();
        sheet.write_string(3, 0, "Blue").unwrap();
        let second = workbook.add_worksheet();
        second.set_name("Other").unwrap();
        second.write_string(0, 0, "Only").unwrap();
        second.write_string(1, 0, "x").unwrap();
        let p = dir.join("survey.xlsx");
        workbook.save(&p).unwrap();
        p.display().to_string()
    }

    #[test]
    fn reads_first_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_workbook(dir.path());
        let t = read_excel(&p, None, &missing()).unwrap();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(
            t.column("Color (pick one)").unwrap().values,
            vec![Some("Red".to_string()), None, Some("Blue".to_string())]
        );
        assert_eq!(
            t.column("Rating").unwrap().values,
            vec![Some("3".to_string()), Some("4.5".to_string()), None]
        );
    }

    #[test]
    fn reads_dates_as_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_string(0, 0, "Visit date").unwrap();
        sheet
            .write_datetime_with_format(
                1,
                0,
                &ExcelDateTime::from_ymd(2024, 3, 15).unwrap(),
                &date_format,
            )
            .unwrap();
        sheet
            .write_datetime_with_format(
                2,
                0,
                &ExcelDateTime::from_ymd(2024, 3, 15).unwrap(),
                &date_format,
            )
            .unwrap();
        let p = dir.path().join("dates.xlsx");
        workbook.save(&p).unwrap();

        let t = read_excel(&p.display().to_string(), None, &missing()).unwrap();
        let values = &t.column("Visit date").unwrap().values;
        assert_eq!(
            values,
            &vec![
                Some("2024-03-15 00:00:00".to_string()),
                Some("2024-03-15 00:00:00".to_string())
            ]
        );
        let tally = tally_simple(values, false);
        assert_eq!(tally.rows.len(), 1);
        assert_eq!(tally.rows[0].count, 2);
    }

    #[test]
    fn reads_named_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_workbook(dir.path());
        let t = read_excel(&p, Some("Other"), &missing()).unwrap();
        assert_eq!(t.columns().len(), 1);
        assert_eq!(t.column("Only").unwrap().values, vec![Some("x".to_string())]);
        assert!(matches!(
            read_excel(&p, Some("Missing"), &missing()),
            Err(ReportError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn not_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey.xlsx");
        fs::write(&p, "not a zip").unwrap();
        assert!(matches!(
            read_excel(&p.display().to_string(), None, &missing()),
            Err(ReportError::OpeningExcel { .. })
        ));
    }

    #[test]
    fn cells() {
        assert_eq!(cell_to_string(&DataType::Float(2.0)), Some("2".to_string()));
        assert_eq!(cell_to_string(&DataType::Bool(true)), Some("True".to_string()));
        assert_eq!(cell_to_string(&DataType::Empty), None);
        assert_eq!(
            cell_to_string(&DataType::DateTime(45366.5)),
            Some("2024-03-15 12:00:00".to_string())
        );
    }
}
