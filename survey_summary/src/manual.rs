/*!

This is the long-form manual for `survey_summary` and `survey_tally`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values (or any other single-byte delimiter)
* `excel` Excel workbooks (`.xlsx`, `.xlsm`, `.xls`) and OpenDocument spreadsheets (`.ods`)

In both cases the first row is the header: one column per question. Every following
row is one respondent. Only the first worksheet is read, unless a worksheet name is
provided.

Empty cells are missing answers. The usual markers for missing data (`NA`, `N/A`,
`NaN`, `null`, `#N/A`, ...) are read as missing too. The list can be replaced in the
configuration file with `missingValues`.

## Column names

Annotations between parentheses are removed from the column names and the names are
trimmed: `Color (pick one)` becomes `Color`.

## Column kinds

Every column is given one kind, based on its name only. The first matching family of
patterns wins, in this order:

1. **irrelevant**: identity and bookkeeping fields (`First and last name`, `Email`,
   `Tracking`, `Token`, `Submitted at`, ...) and the metadata that upload widgets add
   next to a picture (`Photo file name`, `Picture size`, ...). These columns are dropped.
2. **photo**: picture uploads (`Take a picture ...`, `Attach a picture ...`, any name
   containing `photo`). They are dropped by default. With `keepPhotos` (or
   `--keep-photos`) they are listed as archive-only questions, and their pictures can be
   downloaded into a zip archive.
3. **multi select**: checkbox questions, detected with the words `select ... apply`
   (`Select all that apply`). Each cell holds the comma-separated options picked by the
   respondent.
4. **simple**: everything else.

Additional irrelevant patterns (regular expressions, case insensitive) can be added
with `extraIrrelevantPatterns`.

## Tallies

For a simple question, every distinct answer is counted, including the missing answers
(reported as `NaN`). The percentage is relative to the number of respondents, rounded
to one decimal. A `Total` row can be appended: it is the sum of the counts and the sum
of the rounded percentages, which may be slightly off 100.

For a multi select question, the missing answers are ignored. Each option is counted
once per respondent who selected it, and the percentage is relative to the number of
respondents who answered. The percentages of a multi select question usually add up to
more than 100.

Rows are sorted by decreasing count. Ties keep the order in which the answers first
appear in the file.

## Segments

When a segment column is selected, each question is also tallied separately for every
distinct (non missing) value of that column, in the order in which the values first
appear. The segment column itself is only shown overall.

## Outputs

* `survey_combined_summary.xlsx`: one sheet `All Responses` with the columns
  `Question`, `Response`, `Count`, `Percent (%)`. It always contains the overall
  tallies, whatever the segment column.
* `{column}_photos.zip`: the pictures of a photo column, named `{column}/{row}.{ext}`.
  The pictures that cannot be downloaded are skipped.
* a JSON report, optionally compared with a reference report.

*/
