//! Core data model: raw spreadsheet grids and tidy output rows.
//!
//! A [`RawSheet`] is read once per source sheet, classified, converted into zero
//! or more [`TidyRow`]s, and discarded. It is never mutated after construction.

use serde::Serialize;

/// A single spreadsheet cell after reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing/blank cell.
    Empty,
    /// Textual content.
    Text(String),
    /// Numeric content (Excel stores all numbers as floats).
    Number(f64),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// True for [`Cell::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Textual content, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the cell as a header/label token.
    ///
    /// Whole numbers render without a trailing `.0` so that a year stored as
    /// `2001.0` becomes `"2001"`. Empty cells and blank text yield `None`.
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let t = s.trim();
                if t.is_empty() { None } else { Some(t.to_string()) }
            }
            Cell::Number(f) => {
                if f.fract() == 0.0 {
                    Some((*f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
        }
    }
}

/// An ordered 2-D grid of cells, as read from one sheet.
///
/// Rows may be ragged; [`RawSheet::cell`] treats out-of-range positions as
/// empty, and [`RawSheet::width`] is the widest row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl RawSheet {
    /// Build a sheet from row-major cells.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (widest row).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at `(row, col)`; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// One row as a slice (empty slice when out of range).
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Calendar month, parsed from the leftmost cell of monthly-block data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Parse a full English month name, case-insensitively, ignoring
    /// surrounding whitespace. Abbreviations do not match.
    pub fn from_name(name: &str) -> Option<Month> {
        let lower = name.trim().to_ascii_lowercase();
        Month::ALL.iter().copied().find(|m| m.as_str() == lower)
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }
}

/// One observation in the long-format output.
///
/// Invariants: `year` is always a 4-digit calendar year in [1900, 2099];
/// `row_label` is never empty (the sentinel `"NA"` stands in when a layout has
/// no descriptive column, so row identity survives later joins).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyRow {
    /// Calendar year the observation belongs to.
    pub year: i32,
    /// Month, for monthly-block layouts only.
    pub month: Option<Month>,
    /// Descriptive identity of the data row, independent of year/measure.
    pub row_label: String,
    /// Name of the quantity being recorded (originating column/variable name).
    pub measure: String,
    /// Observed value; `None` when the cell was blank or unparseable.
    pub value: Option<f64>,
    /// Originating workbook identifier (file stem).
    pub source_file: String,
    /// Originating sheet name.
    pub source_sheet: String,
}

/// An owned sequence of tidy rows from one or more sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TidyTable {
    /// Output rows, in extraction order.
    pub rows: Vec<TidyRow>,
}

impl TidyTable {
    /// Create a table from rows.
    pub fn new(rows: Vec<TidyRow>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Concatenate tables in order into one combined table.
    pub fn concat(tables: impl IntoIterator<Item = TidyTable>) -> TidyTable {
        let mut rows = Vec::new();
        for mut t in tables {
            rows.append(&mut t.rows);
        }
        TidyTable::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Month, RawSheet};

    #[test]
    fn month_parses_case_insensitively_with_whitespace() {
        assert_eq!(Month::from_name("January"), Some(Month::January));
        assert_eq!(Month::from_name("  december "), Some(Month::December));
        assert_eq!(Month::from_name("jan"), None);
        assert_eq!(Month::from_name("Smarch"), None);
    }

    #[test]
    fn cell_label_renders_whole_numbers_without_fraction() {
        assert_eq!(Cell::Number(2001.0).label(), Some("2001".to_string()));
        assert_eq!(Cell::Number(12.5).label(), Some("12.5".to_string()));
        assert_eq!(
            Cell::Text("  Coal ".to_string()).label(),
            Some("Coal".to_string())
        );
        assert_eq!(Cell::Text("   ".to_string()).label(), None);
        assert_eq!(Cell::Empty.label(), None);
    }

    #[test]
    fn ragged_sheets_read_out_of_range_as_empty() {
        let sheet = RawSheet::from_rows(vec![
            vec![Cell::Text("a".to_string()), Cell::Number(1.0)],
            vec![Cell::Text("b".to_string())],
        ]);
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.width(), 2);
        assert!(sheet.cell(1, 1).is_empty());
        assert!(sheet.cell(5, 5).is_empty());
    }
}
