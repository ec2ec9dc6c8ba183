//! Heuristic layout classification.
//!
//! Sheets are scanned for content signals rather than trusting any fixed header
//! position: government workbooks put titles, footnotes, and blank spacer rows
//! above the real header band. The scan window and both matching patterns are
//! configurable because the heuristic is best-effort by design.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::TidyResult;
use crate::types::{Cell, RawSheet};

/// Default number of leading rows inspected for layout signals.
pub const DEFAULT_SCAN_ROWS: usize = 30;

/// Minimum number of year-bearing cells for a row to count as a year header.
const MIN_YEAR_CELLS: usize = 3;

static DEFAULT_YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").expect("built-in year pattern"));

static DEFAULT_MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Year\s+((?:19|20)\d{2})\s*$").expect("built-in marker pattern"));

/// Knobs for the layout heuristic.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// How many leading rows to scan for markers and header rows.
    pub scan_rows: usize,
    /// Pattern a cell must contain to count as a 4-digit year token.
    pub year_pattern: Regex,
    /// Pattern a leftmost-column cell must match (entirely) to open a monthly
    /// block; capture group 1 must hold the year digits.
    pub marker_pattern: Regex,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            scan_rows: DEFAULT_SCAN_ROWS,
            year_pattern: DEFAULT_YEAR_PATTERN.clone(),
            marker_pattern: DEFAULT_MARKER_PATTERN.clone(),
        }
    }
}

impl LayoutConfig {
    /// Build a config with custom patterns.
    ///
    /// `marker_pattern` must expose the year digits as capture group 1.
    pub fn with_patterns(
        scan_rows: usize,
        year_pattern: &str,
        marker_pattern: &str,
    ) -> TidyResult<Self> {
        Ok(Self {
            scan_rows,
            year_pattern: Regex::new(year_pattern)?,
            marker_pattern: Regex::new(marker_pattern)?,
        })
    }
}

/// Closed classification of recognized physical sheet shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Repeated `"Year YYYY"` sections, each followed by twelve month rows.
    MonthlyBlock,
    /// A "Year" first column with years running down the data rows.
    YearMatrix,
    /// Year-valued column headers with category labels in the first column.
    WideYear,
    /// A two-row header band: descriptive labels over a row of years.
    LabeledYearPair,
    /// No recognized pattern; the sheet is skipped.
    Unrecognized,
}

/// One `"Year YYYY"` marker cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMarker {
    /// Row index of the marker cell.
    pub row: usize,
    /// Year announced by the marker.
    pub year: i32,
}

/// A classified layout plus the auxiliary positions extraction needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Monthly blocks at the given marker positions.
    MonthlyBlock {
        /// All markers in the leftmost column, top to bottom.
        markers: Vec<BlockMarker>,
    },
    /// Year-down matrix with its header row.
    YearMatrix {
        /// Row index of the measure-name header.
        header_row: usize,
    },
    /// Year-across table with its header row.
    WideYear {
        /// Row index of the year-bearing header.
        header_row: usize,
    },
    /// Two-row header band.
    LabeledYearPair {
        /// Row index of the descriptive header.
        header_row: usize,
        /// Row index of the year header beneath it.
        year_row: usize,
    },
    /// No extraction rule applies.
    Unrecognized,
}

impl Layout {
    /// The bare classification, without positions.
    pub fn kind(&self) -> LayoutKind {
        match self {
            Layout::MonthlyBlock { .. } => LayoutKind::MonthlyBlock,
            Layout::YearMatrix { .. } => LayoutKind::YearMatrix,
            Layout::WideYear { .. } => LayoutKind::WideYear,
            Layout::LabeledYearPair { .. } => LayoutKind::LabeledYearPair,
            Layout::Unrecognized => LayoutKind::Unrecognized,
        }
    }
}

/// Classify a sheet into a [`Layout`].
///
/// Monthly markers are checked first and win over every other signal: marker
/// cells can sit below decorative header rows that would otherwise match the
/// year-header scan. Detection looks only at the scan window, but once a
/// monthly sheet is recognized, markers are collected over the whole leftmost
/// column so later blocks are not lost.
pub fn classify(sheet: &RawSheet, config: &LayoutConfig) -> Layout {
    let window = config.scan_rows.min(sheet.height());

    if (0..window).any(|r| marker_year(sheet, r, config).is_some()) {
        let markers = (0..sheet.height())
            .filter_map(|r| marker_year(sheet, r, config).map(|year| BlockMarker { row: r, year }))
            .collect();
        return Layout::MonthlyBlock { markers };
    }

    let Some((header_row, by_year_count)) = find_header_row(sheet, window, config) else {
        return Layout::Unrecognized;
    };

    // A second year-bearing row directly beneath a year-bearing header marks a
    // two-row band; splitting the compound label from the year preserves more
    // information than collapsing both rows into one label.
    if by_year_count {
        let last = (header_row + 2).min(sheet.height().saturating_sub(1));
        for r in header_row + 1..=last {
            if year_cell_count(sheet.row(r), config) >= MIN_YEAR_CELLS {
                return Layout::LabeledYearPair {
                    header_row,
                    year_row: r,
                };
            }
        }
    }

    let first_header = sheet.cell(header_row, 0).label().unwrap_or_default();
    if first_header.to_ascii_lowercase().starts_with("year") {
        return Layout::YearMatrix { header_row };
    }

    let has_year_column = (1..sheet.width()).any(|c| {
        sheet
            .cell(header_row, c)
            .label()
            .is_some_and(|h| config.year_pattern.is_match(&h))
    });
    if has_year_column {
        return Layout::WideYear { header_row };
    }

    Layout::Unrecognized
}

fn marker_year(sheet: &RawSheet, row: usize, config: &LayoutConfig) -> Option<i32> {
    let text = sheet.cell(row, 0).text()?;
    let caps = config.marker_pattern.captures(text)?;
    caps.get(1)?.as_str().parse().ok()
}

/// First row in the window that either carries the exact token "year" in some
/// cell or holds at least [`MIN_YEAR_CELLS`] year-bearing cells. The bool is
/// true when the row qualified via the year-cell count.
fn find_header_row(
    sheet: &RawSheet,
    window: usize,
    config: &LayoutConfig,
) -> Option<(usize, bool)> {
    for r in 0..window {
        let row = sheet.row(r);
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        if row
            .iter()
            .any(|c| c.text().is_some_and(|t| t.trim().eq_ignore_ascii_case("year")))
        {
            return Some((r, false));
        }
        if year_cell_count(row, config) >= MIN_YEAR_CELLS {
            return Some((r, true));
        }
    }
    None
}

fn year_cell_count(row: &[Cell], config: &LayoutConfig) -> usize {
    row.iter()
        .filter(|c| c.label().is_some_and(|l| config.year_pattern.is_match(&l)))
        .count()
}
