use log::debug;

pub use crate::config::*;

/// The markers that are read as a missing answer, in addition to empty cells.
pub const DEFAULT_MISSING_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A builder for assembling a response table row by row.
///
/// Readers should use it rather than building the columns by hand: it takes
/// care of short rows and of the missing-value markers.
///
/// ```
/// use survey_summary::builder::Builder;
/// # use survey_summary::SummaryErrors;
///
/// let mut builder = Builder::new(&["Color".to_string(), "Size".to_string()])?;
/// builder.add_row_simple(&["Red".to_string(), "".to_string()]);
/// builder.add_row_simple(&["NA".to_string(), "L".to_string()]);
/// let table = builder.build()?;
///
/// assert_eq!(table.num_rows(), 2);
/// assert_eq!(table.column("Size").unwrap().values[0], None);
/// assert_eq!(table.column("Color").unwrap().values[1], None);
/// # Ok::<(), SummaryErrors>(())
/// ```
pub struct Builder {
    pub(crate) _header: Vec<String>,
    pub(crate) _missing_values: Vec<String>,
    pub(crate) _rows: Vec<Vec<Option<String>>>,
}

impl Builder {
    pub fn new(header: &[String]) -> Result<Builder, SummaryErrors> {
        if header.is_empty() {
            return Err(SummaryErrors::EmptyHeader);
        }
        Ok(Builder {
            _header: header.to_vec(),
            _missing_values: DEFAULT_MISSING_VALUES.iter().map(|s| s.to_string()).collect(),
            _rows: Vec::new(),
        })
    }

    /// Replaces the list of markers read as missing. Empty cells are always missing.
    pub fn missing_values(self, markers: &[String]) -> Builder {
        Builder {
            _header: self._header,
            _missing_values: markers.to_vec(),
            _rows: self._rows,
        }
    }

    /// Adds a row of raw strings, as read from a delimited file.
    pub fn add_row_simple(&mut self, cells: &[String]) {
        let row: Vec<Option<String>> = cells.iter().map(|s| Some(s.clone())).collect();
        self.add_row(&row)
    }

    /// Adds a row in which some cells may already be known to be missing.
    ///
    /// Rows shorter than the header are padded with missing values, longer
    /// rows are truncated.
    pub fn add_row(&mut self, cells: &[Option<String>]) {
        if cells.len() > self._header.len() {
            debug!(
                "add_row: row {} has {} cells, truncating to {}",
                self._rows.len(),
                cells.len(),
                self._header.len()
            );
        }
        let row: Vec<Option<String>> = (0..self._header.len())
            .map(|idx| match cells.get(idx) {
                Some(Some(s)) if s.is_empty() || self._missing_values.contains(s) => None,
                Some(x) => x.clone(),
                None => None,
            })
            .collect();
        self._rows.push(row);
    }

    pub fn build(self) -> Result<ResponseTable, SummaryErrors> {
        let mut columns: Vec<Column> = self
            ._header
            .iter()
            .map(|name| Column {
                name: name.clone(),
                values: Vec::with_capacity(self._rows.len()),
            })
            .collect();
        for row in self._rows {
            for (col, cell) in columns.iter_mut().zip(row) {
                col.values.push(cell);
            }
        }
        ResponseTable::new(columns)
    }
}
