//! Value and year-token coercion.
//!
//! Coercion never fails loudly: unparseable values become absent, and a token
//! with no plausible year simply yields `None` (the caller drops the row, since
//! year is mandatory).

use regex::Regex;

use crate::types::Cell;

/// Years outside this range are treated as non-years even if a custom pattern
/// matches them.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2099;

/// First left-to-right year token in `text`, if any.
pub(crate) fn first_year(text: &str, year_pattern: &Regex) -> Option<i32> {
    let matched = year_pattern.find(text)?;
    matched
        .as_str()
        .parse()
        .ok()
        .filter(|y| YEAR_RANGE.contains(y))
}

/// Best-effort numeric parse of a value cell.
///
/// Thousands separators are stripped; anything that still fails to parse
/// becomes `None`.
pub(crate) fn cell_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v),
        Cell::Text(s) => {
            let cleaned = s.trim().replace(',', "");
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse().ok()
        }
        Cell::Empty => None,
    }
}
