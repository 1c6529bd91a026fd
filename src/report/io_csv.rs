// Primitives for reading CSV files.

use survey_summary::builder::Builder;

use crate::report::*;

pub fn read_csv(path: &str, delimiter: u8, missing_values: &[String]) -> ReportResult<ResponseTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv: header: {:?}", header);
    if header.is_empty() || header.iter().all(|h| h.is_empty()) {
        return EmptyInputSnafu { path }.fail();
    }

    let mut builder = Builder::new(&header)
        .context(SummarySnafu {})?
        .missing_values(missing_values);
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv: lineno: {:?} row: {:?}", lineno, &cells);
        builder.add_row_simple(&cells);
    }
    builder.build().context(SummarySnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(contents: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey.csv");
        fs::write(&p, contents).unwrap();
        let s = p.display().to_string();
        (dir, s)
    }

    fn missing() -> Vec<String> {
        builder::DEFAULT_MISSING_VALUES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn reads_header_and_rows() {
        let (_dir, p) = write("Color (pick one),Toppings\nRed,\"Cheese, Pepperoni\"\nBlue,\nNA,Cheese\n");
        let t = read_csv(&p, b',', &missing()).unwrap();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.columns()[0].name, "Color (pick one)");
        assert_eq!(
            t.columns()[0].values,
            vec![Some("Red".to_string()), Some("Blue".to_string()), None]
        );
        assert_eq!(
            t.columns()[1].values[0],
            Some("Cheese, Pepperoni".to_string())
        );
        assert_eq!(t.columns()[1].values[1], None);
    }

    #[test]
    fn short_rows_and_delimiter() {
        let (_dir, p) = write("a;b;c\n1;2\n4;5;6\n");
        let t = read_csv(&p, b';', &missing()).unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.column("c").unwrap().values, vec![None, Some("6".to_string())]);
    }

    #[test]
    fn empty_file() {
        let (_dir, p) = write("");
        assert!(matches!(
            read_csv(&p, b',', &missing()),
            Err(ReportError::EmptyInput { .. })
        ));
    }

    #[test]
    fn invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey.csv");
        fs::write(&p, b"a,b\n\xff\xfe,1\n").unwrap();
        let res = read_csv(&p.display().to_string(), b',', &missing());
        assert!(matches!(
            res,
            Err(ReportError::CsvLineParse { lineno: 2, .. })
        ));
    }
}
