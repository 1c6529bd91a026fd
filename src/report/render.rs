// Console rendering of a survey summary.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::report::*;

const PHOTO_NOTE: &str = "Photo question: not tallied, available in the photo archive.";

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn tally_table(tally: &TallyTable) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("Response"),
            header_cell("Count"),
            header_cell("Percent (%)"),
        ]);
    for r in tally.rows.iter() {
        table.add_row(vec![
            Cell::new(&r.response),
            Cell::new(r.count),
            Cell::new(format!("{:.1}", r.percent)),
        ]);
    }
    if let Some(t) = &tally.total {
        table.add_row(vec![
            Cell::new(&t.response).add_attribute(Attribute::Bold),
            Cell::new(t.count).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.1}", t.percent)).add_attribute(Attribute::Bold),
        ]);
    }
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table
}

/// The text shown on the console for a whole survey.
///
/// One section per question, with one table per segment.
pub fn render_summary(summary: &SurveySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} respondents, {} questions\n",
        summary.respondents,
        summary.questions.len()
    ));
    if !summary.dropped.is_empty() {
        out.push_str(&format!("Dropped: {}\n", summary.dropped.join(", ")));
    }
    for q in summary.questions.iter() {
        out.push('\n');
        out.push_str(&format!("## {}\n", q.name));
        if q.kind == ColumnKind::Photo {
            out.push_str(PHOTO_NOTE);
            out.push('\n');
            continue;
        }
        for st in q.breakdown.iter() {
            out.push_str(&st.subtitle);
            out.push('\n');
            if st.table.is_empty() && st.table.total.is_none() {
                out.push_str("(no responses)\n");
            } else {
                out.push_str(&tally_table(&st.table).to_string());
                out.push('\n');
            }
        }
    }
    out
}
