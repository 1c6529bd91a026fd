/*!

Response-frequency summaries for survey exports.

The input is a [ResponseTable]: one column per question and one row per respondent,
as exported by most online form builders. The column names are cleaned up,
classified with a [classify::RuleSet], and every retained question is tallied,
optionally broken down by the values of another question.

```
use survey_summary::builder::Builder;
use survey_summary::classify::RuleSet;
use survey_summary::*;

let mut builder = Builder::new(&["Color (pick one)".to_string(), "Email".to_string()])?;
builder.add_row_simple(&["Red".to_string(), "a@example.com".to_string()]);
builder.add_row_simple(&["Blue".to_string(), "b@example.com".to_string()]);
builder.add_row_simple(&["Red".to_string(), "".to_string()]);
let table = builder.build()?;

let summary = summarize_survey(&table, &RuleSet::default_rules()?, &SummaryOptions::DEFAULT_OPTIONS)?;
assert_eq!(summary.questions.len(), 1);
assert_eq!(summary.questions[0].name, "Color");
assert_eq!(summary.questions[0].overall.rows[0].response, "Red");
assert_eq!(summary.questions[0].overall.rows[0].count, 2);
# Ok::<(), SummaryErrors>(())
```

See the [manual] for the full description of the rules.
*/

pub mod builder;
pub mod classify;
mod config;
pub mod manual;

use log::{debug, info, warn};

use std::collections::{HashMap, HashSet};

use crate::classify::{normalize_header, RuleSet};
pub use crate::config::*;

// **** Private structures ****

/// Occurrence counts, remembering the order in which the keys were first seen.
struct Counter<K> {
    order: Vec<K>,
    counts: HashMap<K, u64>,
}

impl<K: Eq + std::hash::Hash + Clone> Counter<K> {
    fn new() -> Counter<K> {
        Counter {
            order: Vec::new(),
            counts: HashMap::new(),
        }
    }

    fn add(&mut self, key: &K) {
        if let Some(c) = self.counts.get_mut(key) {
            *c += 1;
        } else {
            self.order.push(key.clone());
            self.counts.insert(key.clone(), 1);
        }
    }

    /// The keys with their counts, most frequent first. Ties keep the first-seen order.
    fn sorted(&self) -> Vec<(K, u64)> {
        let mut res: Vec<(K, u64)> = self
            .order
            .iter()
            .map(|k| (k.clone(), self.counts.get(k).cloned().unwrap_or(0)))
            .collect();
        res.sort_by(|a, b| b.1.cmp(&a.1));
        res
    }
}

/// Rounds to one decimal, half to even.
fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(count as f64 / total as f64 * 100.0)
    }
}

fn total_row(rows: &[TallyRow]) -> TallyRow {
    TallyRow {
        response: TOTAL_LABEL.to_string(),
        count: rows.iter().map(|r| r.count).sum(),
        // Sum of the rounded values: it may not be exactly 100.
        percent: round1(rows.iter().map(|r| r.percent).sum()),
    }
}

fn select_rows(values: &[Option<String>], rows: &[usize]) -> Vec<Option<String>> {
    rows.iter()
        .filter_map(|idx| values.get(*idx).cloned())
        .collect()
}

// **** Tallies ****

/// Tallies a single-choice question.
///
/// Missing answers form their own category, and every row counts in the
/// denominator.
pub fn tally_simple(values: &[Option<String>], include_total: bool) -> TallyTable {
    let mut counter: Counter<Option<String>> = Counter::new();
    for v in values {
        counter.add(v);
    }
    let total = values.len() as u64;
    let rows: Vec<TallyRow> = counter
        .sorted()
        .into_iter()
        .map(|(k, count)| TallyRow {
            response: k.unwrap_or_else(|| MISSING_LABEL.to_string()),
            count,
            percent: percent_of(count, total),
        })
        .collect();
    let total = if include_total {
        Some(total_row(&rows))
    } else {
        None
    };
    TallyTable { rows, total }
}

/// Splits a checkbox answer into the options it selects.
///
/// Empty tokens are dropped and an option listed twice counts once.
pub fn split_selections(cell: &str) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for token in cell.split(',').map(|s| s.trim()) {
        if !token.is_empty() && !res.iter().any(|s| s == token) {
            res.push(token.to_string());
        }
    }
    res
}

/// Tallies a multi-select question.
///
/// Missing answers are ignored, and the percentages are relative to the number
/// of respondents who answered, not to the number of selected options.
pub fn tally_multi_select(values: &[Option<String>]) -> TallyTable {
    let mut counter: Counter<String> = Counter::new();
    let mut respondents: u64 = 0;
    for cell in values.iter().flatten() {
        respondents += 1;
        for option in split_selections(cell) {
            counter.add(&option);
        }
    }
    let rows = counter
        .sorted()
        .into_iter()
        .map(|(response, count)| TallyRow {
            response,
            count,
            percent: percent_of(count, respondents),
        })
        .collect();
    TallyTable { rows, total: None }
}

/// Tallies a column with the strategy that corresponds to its kind.
pub fn tally_column(
    name: &str,
    kind: ColumnKind,
    values: &[Option<String>],
    include_total: bool,
) -> Result<TallyTable, SummaryErrors> {
    let res = match kind {
        ColumnKind::Simple => tally_simple(values, include_total),
        ColumnKind::MultiSelect => tally_multi_select(values),
        ColumnKind::Irrelevant | ColumnKind::Photo => {
            return Err(SummaryErrors::NotTallied {
                column: name.to_string(),
                kind,
            })
        }
    };
    debug!(
        "tally_column: {:?} ({:?}): {} values -> {} rows",
        name,
        kind,
        values.len(),
        res.rows.len()
    );
    Ok(res)
}

// **** Tables ****

/// Returns a copy of the table with all the column names normalized.
pub fn normalize_table(table: &ResponseTable) -> Result<ResponseTable, SummaryErrors> {
    let mut seen: HashSet<String> = HashSet::new();
    let columns: Vec<Column> = table
        .columns()
        .iter()
        .map(|c| {
            let name = normalize_header(&c.name);
            if !seen.insert(name.clone()) {
                warn!(
                    "normalize_table: column {:?} has the same name as a previous column once normalized ({:?})",
                    c.name, name
                );
            }
            Column {
                name,
                values: c.values.clone(),
            }
        })
        .collect();
    ResponseTable::new(columns)
}

/// Classifies every column of the table, in order.
pub fn classify_columns(table: &ResponseTable, rules: &RuleSet) -> Vec<(String, ColumnKind)> {
    table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), rules.classify(&c.name)))
        .collect()
}

/// Partitions the rows of a table by the distinct values of a column.
///
/// Rows in which the column is missing belong to no segment. Segments are
/// returned in the order in which their value first appears.
pub fn segment_rows(table: &ResponseTable, column: &str) -> Result<Vec<Segment>, SummaryErrors> {
    let col = table
        .column(column)
        .ok_or_else(|| SummaryErrors::UnknownSegmentColumn(column.to_string()))?;
    let mut segments: Vec<Segment> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (row, v) in col.values.iter().enumerate() {
        if let Some(value) = v {
            let pos = *positions.entry(value.as_str()).or_insert_with(|| {
                segments.push(Segment {
                    column: column.to_string(),
                    value: value.clone(),
                    rows: Vec::new(),
                });
                segments.len() - 1
            });
            segments[pos].rows.push(row);
        }
    }
    debug!(
        "segment_rows: {:?}: {} segments over {} rows",
        column,
        segments.len(),
        col.values.len()
    );
    Ok(segments)
}

fn segment_breakdown(
    column: &Column,
    kind: ColumnKind,
    overall: &TallyTable,
    segmentation: Option<(&str, &[Segment])>,
    include_total: bool,
) -> Result<Vec<SegmentTally>, SummaryErrors> {
    match segmentation {
        Some((segment_column, segs)) if segment_column != column.name => {
            let mut res: Vec<SegmentTally> = Vec::new();
            for s in segs {
                let values = select_rows(&column.values, &s.rows);
                res.push(SegmentTally {
                    subtitle: format!("{} = {}", s.column, s.value),
                    segment: Some((s.column.clone(), s.value.clone())),
                    table: tally_column(&column.name, kind, &values, include_total)?,
                });
            }
            Ok(res)
        }
        // Not segmented, or segmented by itself.
        _ => Ok(vec![SegmentTally {
            subtitle: OVERALL_LABEL.to_string(),
            segment: None,
            table: overall.clone(),
        }]),
    }
}

/// Runs the whole pipeline on an uploaded table: normalization, classification,
/// tallies and the optional segmentation.
///
/// Arguments:
/// * `table` the table as uploaded. It is not modified.
/// * `rules` the classification rules
/// * `options` the segmentation, total and photo settings
pub fn summarize_survey(
    table: &ResponseTable,
    rules: &RuleSet,
    options: &SummaryOptions,
) -> Result<SurveySummary, SummaryErrors> {
    info!(
        "Processing {} respondents, {} columns, options: {:?}",
        table.num_rows(),
        table.columns().len(),
        options
    );
    let normalized = normalize_table(table)?;

    let mut retained: Vec<(Column, ColumnKind)> = Vec::new();
    let mut dropped: Vec<String> = Vec::new();
    let kinds = classify_columns(&normalized, rules);
    for (c, (_, kind)) in normalized.columns().iter().zip(kinds) {
        let keep = match kind {
            ColumnKind::Irrelevant => false,
            ColumnKind::Photo => options.photo_policy == PhotoPolicy::Archive,
            ColumnKind::MultiSelect | ColumnKind::Simple => true,
        };
        if keep {
            retained.push((c.clone(), kind));
        } else {
            dropped.push(c.name.clone());
        }
    }
    info!(
        "Retained {} columns, dropped {}: {:?}",
        retained.len(),
        dropped.len(),
        dropped
    );

    let segment_by: Option<String> = options.segment_by.as_deref().map(normalize_header);
    let segments: Option<Vec<Segment>> = match &segment_by {
        Some(name) => {
            let is_tallied = retained
                .iter()
                .any(|(c, kind)| c.name == *name && kind.is_tallied());
            if !is_tallied {
                return Err(SummaryErrors::UnknownSegmentColumn(name.clone()));
            }
            Some(segment_rows(&normalized, name)?)
        }
        None => None,
    };

    let mut questions: Vec<QuestionSummary> = Vec::new();
    for (column, kind) in retained {
        if !kind.is_tallied() {
            questions.push(QuestionSummary {
                name: column.name,
                kind,
                overall: TallyTable::default(),
                breakdown: Vec::new(),
            });
            continue;
        }
        let overall = tally_column(&column.name, kind, &column.values, options.include_totals)?;
        let segmentation = match (&segment_by, &segments) {
            (Some(name), Some(segs)) => Some((name.as_str(), segs.as_slice())),
            _ => None,
        };
        let breakdown = segment_breakdown(
            &column,
            kind,
            &overall,
            segmentation,
            options.include_totals,
        )?;
        questions.push(QuestionSummary {
            name: column.name,
            kind,
            overall,
            breakdown,
        });
    }

    Ok(SurveySummary {
        questions,
        segment_by,
        respondents: table.num_rows(),
        dropped,
    })
}

/// Concatenates the overall tallies of all the tallied questions, tagged with
/// the name of their question.
///
/// The segmentation is ignored, and so are the total rows.
pub fn combined_summary(summary: &SurveySummary) -> Vec<CombinedRow> {
    summary
        .questions
        .iter()
        .filter(|q| q.kind.is_tallied())
        .flat_map(|q| {
            q.overall.rows.iter().map(move |r| CombinedRow {
                question: q.name.clone(),
                response: r.response.clone(),
                count: r.count,
                percent: r.percent,
            })
        })
        .collect()
}
