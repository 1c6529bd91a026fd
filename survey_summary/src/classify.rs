//! Header cleanup and column classification.
//!
//! The classification of a column is a pure function of its normalized name:
//! the content of the cells is never inspected.

use std::sync::LazyLock;

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::config::*;

// A parenthesized group with the whitespace before it. Unbalanced parentheses are left alone.
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("Invalid annotation regex"));

/// Identity and bookkeeping fields, plus the metadata that upload widgets
/// attach next to a photo question.
pub const IRRELEVANT_PATTERNS: &[&str] = &[
    r"first.*last.*name",
    r"\b(first|last|full)\s*name\b",
    r"\brespondent\s*id\b",
    r"tracking",
    r"clean",
    r"email",
    r"(picture|photo)\s*(file\s*)?(name|size|type|url\s*expir\w*|metadata|timestamp|count)\b",
    r"\btoken\b",
    r"submitted\s*at",
];

pub const PHOTO_PATTERNS: &[&str] = &[r"take.*picture", r"attach.*picture", r"photo"];

/// Covers the "select all that apply" family of prompts.
pub const MULTI_SELECT_PATTERNS: &[&str] = &[r"select.*appl"];

/// Removes the parenthesized annotations of a column name and trims it.
///
/// ```
/// use survey_summary::classify::normalize_header;
/// assert_eq!(normalize_header(" Color (pick one) "), "Color");
/// ```
pub fn normalize_header(name: &str) -> String {
    ANNOTATION.replace_all(name, "").trim().to_string()
}

#[derive(Debug, Clone)]
struct Rule {
    kind: ColumnKind,
    pattern: Regex,
}

/// A compiled, ordered set of classification rules.
///
/// The rules are kept sorted by the precedence of their kind, so that the
/// order in which they are added does not change the outcome.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> RuleSet {
        RuleSet { rules: Vec::new() }
    }

    /// The rules used for survey exports from the common form builders.
    pub fn default_rules() -> Result<RuleSet, SummaryErrors> {
        let mut rs = RuleSet::new();
        for p in IRRELEVANT_PATTERNS {
            rs = rs.with_rule(ColumnKind::Irrelevant, p)?;
        }
        for p in PHOTO_PATTERNS {
            rs = rs.with_rule(ColumnKind::Photo, p)?;
        }
        for p in MULTI_SELECT_PATTERNS {
            rs = rs.with_rule(ColumnKind::MultiSelect, p)?;
        }
        Ok(rs)
    }

    /// Adds a case-insensitive pattern for the given kind.
    pub fn with_rule(mut self, kind: ColumnKind, pattern: &str) -> Result<RuleSet, SummaryErrors> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|_| SummaryErrors::InvalidPattern(pattern.to_string()))?;
        self.rules.push(Rule {
            kind,
            pattern: compiled,
        });
        self.rules.sort_by_key(|r| r.kind.precedence());
        Ok(self)
    }

    pub fn classify(&self, name: &str) -> ColumnKind {
        let kind = self
            .rules
            .iter()
            .find(|r| r.pattern.is_match(name))
            .map(|r| r.kind)
            .unwrap_or(ColumnKind::Simple);
        debug!("classify: {:?} -> {:?}", name, kind);
        kind
    }

    /// The heuristic used to detect checkbox questions, on its own.
    pub fn is_multi_select(&self, name: &str) -> bool {
        self.rules
            .iter()
            .filter(|r| r.kind == ColumnKind::MultiSelect)
            .any(|r| r.pattern.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::default_rules().unwrap()
    }

    #[test]
    fn normalize_strips_annotations() {
        assert_eq!(normalize_header("Color (pick one)"), "Color");
        assert_eq!(normalize_header("  Age  "), "Age");
        assert_eq!(normalize_header("Rate (1-5) the service (optional)"), "Rate the service");
        assert_eq!(normalize_header("(internal) Notes"), "Notes");
        assert_eq!(normalize_header("Broken (paren"), "Broken (paren");
    }

    #[test]
    fn normalize_nested_and_unbalanced() {
        // The innermost group closes the annotation.
        assert_eq!(normalize_header("a ((b) c)"), "a c)");
        assert_eq!(normalize_header("x (a (b) c) y"), "x c) y");
        assert_eq!(normalize_header("Age\t(years)\n"), "Age");
        assert_eq!(normalize_header(") odd ( order"), ") odd ( order");
        assert_eq!(normalize_header("  (only)  "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let names = [
            "Color (pick one)",
            "a ((b) c)",
            "x (a (b) c) y",
            "  (only)  ",
            "tail ( ",
            ") odd ( order",
            "",
        ];
        for n in names {
            let once = normalize_header(n);
            assert_eq!(normalize_header(&once), once, "input {:?}", n);
        }
    }

    #[test]
    fn irrelevant_columns() {
        let rs = rules();
        for name in [
            "Respondent Email",
            "First and Last Name",
            "Tracking number",
            "Clean data flag",
            "Token",
            "Submitted At",
            "Photo file name",
            "Picture size",
        ] {
            assert_eq!(rs.classify(name), ColumnKind::Irrelevant, "{}", name);
        }
    }

    #[test]
    fn photo_columns() {
        let rs = rules();
        for name in [
            "Please take a picture of the site",
            "Attach a picture",
            "Storefront photo",
            "PHOTO",
        ] {
            assert_eq!(rs.classify(name), ColumnKind::Photo, "{}", name);
        }
    }

    #[test]
    fn tokens_are_whole_words() {
        let rs = rules();
        assert_eq!(rs.classify("Tokens of appreciation"), ColumnKind::Simple);
    }

    #[test]
    fn multi_select_columns() {
        let rs = rules();
        let name = "Select all that apply - Toppings";
        assert!(rs.is_multi_select(name));
        assert_eq!(rs.classify(name), ColumnKind::MultiSelect);
        assert_eq!(rs.classify("Which apply? select"), ColumnKind::Simple);
        assert_eq!(rs.classify("Color"), ColumnKind::Simple);
    }

    #[test]
    fn precedence_does_not_depend_on_insertion_order() {
        let rs = RuleSet::new()
            .with_rule(ColumnKind::MultiSelect, "select")
            .unwrap()
            .with_rule(ColumnKind::Photo, "photo")
            .unwrap()
            .with_rule(ColumnKind::Irrelevant, "photo id")
            .unwrap();
        assert_eq!(rs.classify("Select a photo id"), ColumnKind::Irrelevant);
        assert_eq!(rs.classify("Select a photo"), ColumnKind::Photo);
        assert_eq!(rs.classify("Select one"), ColumnKind::MultiSelect);
    }

    #[test]
    fn invalid_pattern() {
        let res = RuleSet::new().with_rule(ColumnKind::Irrelevant, "(unclosed");
        assert_eq!(
            res.err(),
            Some(SummaryErrors::InvalidPattern("(unclosed".to_string()))
        );
    }
}
