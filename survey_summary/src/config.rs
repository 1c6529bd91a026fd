// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The label used for the missing category in a tally.
pub const MISSING_LABEL: &str = "NaN";

/// The label of the synthetic total row.
pub const TOTAL_LABEL: &str = "Total";

/// The subtitle of an unsegmented breakdown.
pub const OVERALL_LABEL: &str = "Overall";

/// One question of the survey: a named column of answers.
///
/// A `None` value is a missing answer (the respondent skipped the question).
#[derive(PartialEq, Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<String>>,
}

/// The uploaded survey, one column per question and one row per respondent.
///
/// Invariant: all the columns have the same number of rows.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResponseTable {
    columns: Vec<Column>,
}

impl ResponseTable {
    pub fn new(columns: Vec<Column>) -> Result<ResponseTable, SummaryErrors> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(c) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(SummaryErrors::RaggedColumn {
                    column: c.name.clone(),
                    expected,
                    found: c.values.len(),
                });
            }
        }
        Ok(ResponseTable { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }
}

/// The role of a column, as derived from its (normalized) name.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ColumnKind {
    /// Identity or bookkeeping fields. Dropped before any processing.
    Irrelevant,
    /// Image upload questions. Never tallied, optionally archived.
    Photo,
    /// Checkbox questions: each cell is a comma-separated list of options.
    MultiSelect,
    /// A single categorical answer per respondent.
    Simple,
}

impl ColumnKind {
    /// Lower values win when a name matches the patterns of several kinds.
    pub fn precedence(&self) -> u8 {
        match self {
            ColumnKind::Irrelevant => 0,
            ColumnKind::Photo => 1,
            ColumnKind::MultiSelect => 2,
            ColumnKind::Simple => 3,
        }
    }

    pub fn is_tallied(&self) -> bool {
        matches!(self, ColumnKind::MultiSelect | ColumnKind::Simple)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Irrelevant => "irrelevant",
            ColumnKind::Photo => "photo",
            ColumnKind::MultiSelect => "multi_select",
            ColumnKind::Simple => "simple",
        }
    }
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct TallyRow {
    pub response: String,
    pub count: u64,
    /// Percent of the respondents, rounded to one decimal.
    pub percent: f64,
}

/// The frequency table of one column, possibly restricted to a segment.
///
/// Rows are sorted by decreasing count.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TallyTable {
    pub rows: Vec<TallyRow>,
    pub total: Option<TallyRow>,
}

impl TallyTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, response: &str) -> Option<&TallyRow> {
        self.rows.iter().find(|r| r.response == response)
    }
}

/// A subset of the respondents: all the rows in which `column` equals `value`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Segment {
    pub column: String,
    pub value: String,
    pub rows: Vec<usize>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SegmentTally {
    pub subtitle: String,
    /// The (column, value) pair, or None for the overall breakdown.
    pub segment: Option<(String, String)>,
    pub table: TallyTable,
}

/// Everything that is displayed for one retained question.
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionSummary {
    pub name: String,
    pub kind: ColumnKind,
    /// The unsegmented tally. Empty for archive-only photo columns.
    pub overall: TallyTable,
    /// The tallies to display, one per segment or a single overall one.
    pub breakdown: Vec<SegmentTally>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SurveySummary {
    pub questions: Vec<QuestionSummary>,
    pub segment_by: Option<String>,
    pub respondents: usize,
    /// The columns that were dropped, after normalization.
    pub dropped: Vec<String>,
}

/// One line of the combined export.
#[derive(PartialEq, Debug, Clone)]
pub struct CombinedRow {
    pub question: String,
    pub response: String,
    pub count: u64,
    pub percent: f64,
}

/// Errors that prevent a summary from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SummaryErrors {
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    EmptyHeader,
    UnknownSegmentColumn(String),
    NotTallied {
        column: String,
        kind: ColumnKind,
    },
    InvalidPattern(String),
}

impl Error for SummaryErrors {}

impl Display for SummaryErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryErrors::RaggedColumn {
                column,
                expected,
                found,
            } => write!(
                f,
                "column {:?} has {} rows, expected {}",
                column, found, expected
            ),
            SummaryErrors::EmptyHeader => write!(f, "the table has no header row"),
            SummaryErrors::UnknownSegmentColumn(c) => {
                write!(f, "cannot segment by {:?}: not a tallied column", c)
            }
            SummaryErrors::NotTallied { column, kind } => write!(
                f,
                "column {:?} of kind {} cannot be tallied",
                column,
                kind.label()
            ),
            SummaryErrors::InvalidPattern(p) => write!(f, "invalid column pattern {:?}", p),
        }
    }
}

// ********* Configuration **********

/// What happens to the image upload questions.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PhotoPolicy {
    /// Dropped together with the irrelevant columns.
    Drop,
    /// Kept as archive-only questions: listed, but never tallied or exported.
    Archive,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryOptions {
    pub segment_by: Option<String>,
    /// Appends a total row to the simple tallies.
    pub include_totals: bool,
    pub photo_policy: PhotoPolicy,
}

impl SummaryOptions {
    pub const DEFAULT_OPTIONS: SummaryOptions = SummaryOptions {
        segment_by: None,
        include_totals: false,
        photo_policy: PhotoPolicy::Drop,
    };
}
