//! Per-layout extraction of tidy rows from a classified sheet.

use crate::types::{Cell, Month, RawSheet, TidyRow, TidyTable};

use super::classify::{BlockMarker, Layout, LayoutConfig};
use super::coerce::{cell_number, first_year};

/// Sentinel row label for layouts without a descriptive column.
pub const NO_LABEL: &str = "NA";

/// Row label used for every monthly-block observation.
pub const MONTHLY_LABEL: &str = "monthly";

/// Measure name used when a layout carries exactly one unnamed measure.
pub const SINGLE_MEASURE: &str = "value";

const LABEL_SEPARATOR: &str = " | ";

/// Extract tidy rows from a classified sheet.
///
/// Returns an empty vector for [`Layout::Unrecognized`] and for recognized
/// layouts with no extractable data; neither case is an error.
pub fn extract(
    sheet: &RawSheet,
    layout: &Layout,
    config: &LayoutConfig,
    source_file: &str,
    source_sheet: &str,
) -> Vec<TidyRow> {
    let mut rows = match layout {
        Layout::MonthlyBlock { markers } => monthly_block(sheet, markers),
        Layout::YearMatrix { header_row } => year_matrix(sheet, *header_row, config),
        Layout::WideYear { header_row } => wide_year(sheet, *header_row, config),
        Layout::LabeledYearPair {
            header_row,
            year_row,
        } => labeled_year_pair(sheet, *header_row, *year_row, config),
        Layout::Unrecognized => Vec::new(),
    };

    // Source identifiers are attached unconditionally, for traceability.
    for row in &mut rows {
        row.source_file = source_file.to_string();
        row.source_sheet = source_sheet.to_string();
    }
    rows
}

fn sourceless(
    year: i32,
    month: Option<Month>,
    row_label: String,
    measure: String,
    value: Option<f64>,
) -> TidyRow {
    TidyRow {
        year,
        month,
        row_label,
        measure,
        value,
        source_file: String::new(),
        source_sheet: String::new(),
    }
}

/// Each marker opens a window of the next twelve rows. Rows whose leftmost
/// cell is not a month name are discarded; this guards against blank or
/// footnote rows inside a short trailing block.
fn monthly_block(sheet: &RawSheet, markers: &[BlockMarker]) -> Vec<TidyRow> {
    let Some(first) = markers.first() else {
        return Vec::new();
    };
    let measures = monthly_measures(sheet, first.row);

    let mut out = Vec::new();
    for marker in markers {
        let end = (marker.row + 13).min(sheet.height());
        for r in marker.row + 1..end {
            let Some(month) = sheet.cell(r, 0).text().and_then(Month::from_name) else {
                continue;
            };
            for col in 1..sheet.width() {
                out.push(sourceless(
                    marker.year,
                    Some(month),
                    MONTHLY_LABEL.to_string(),
                    measures[col].clone(),
                    cell_number(sheet.cell(r, col)),
                ));
            }
        }
    }
    out
}

/// Measure names for monthly blocks: the nearest row above the first marker
/// that names any data column, with generated `c{i}` names as fallback.
fn monthly_measures(sheet: &RawSheet, first_marker: usize) -> Vec<String> {
    let header = (0..first_marker)
        .rev()
        .find(|&r| (1..sheet.width()).any(|c| !sheet.cell(r, c).is_empty()));

    (0..sheet.width())
        .map(|c| {
            header
                .and_then(|h| sheet.cell(h, c).label())
                .map(|l| collapse_ws(&l))
                .unwrap_or_else(|| format!("c{c}"))
        })
        .collect()
}

/// Header row holds measure names; years run down the first column. Data rows
/// whose first cell carries no year are dropped, since year is mandatory.
fn year_matrix(sheet: &RawSheet, header_row: usize, config: &LayoutConfig) -> Vec<TidyRow> {
    let measures = header_labels(sheet, header_row);

    let mut out = Vec::new();
    for r in header_row + 1..sheet.height() {
        let Some(year) = sheet
            .cell(r, 0)
            .label()
            .and_then(|t| first_year(&t, &config.year_pattern))
        else {
            continue;
        };
        for col in 1..sheet.width() {
            out.push(sourceless(
                year,
                None,
                NO_LABEL.to_string(),
                measures[col].clone(),
                cell_number(sheet.cell(r, col)),
            ));
        }
    }
    out
}

/// Year-valued headers melt into one observation per `(row, year-column)`.
/// Headers containing "through" mark range/footnote columns, not single years.
fn wide_year(sheet: &RawSheet, header_row: usize, config: &LayoutConfig) -> Vec<TidyRow> {
    let year_columns: Vec<(usize, i32)> = (1..sheet.width())
        .filter_map(|c| {
            let header = sheet.cell(header_row, c).label()?;
            if header.to_ascii_lowercase().contains("through") {
                return None;
            }
            first_year(&header, &config.year_pattern).map(|y| (c, y))
        })
        .collect();

    let mut out = Vec::new();
    for r in header_row + 1..sheet.height() {
        if sheet.row(r).iter().all(Cell::is_empty) {
            continue;
        }
        let row_label = sheet
            .cell(r, 0)
            .label()
            .map(|l| collapse_ws(&l))
            .unwrap_or_else(|| NO_LABEL.to_string());
        for &(col, year) in &year_columns {
            out.push(sourceless(
                year,
                None,
                row_label.clone(),
                SINGLE_MEASURE.to_string(),
                cell_number(sheet.cell(r, col)),
            ));
        }
    }
    out
}

/// Two-row band: the lower row keys columns by year, the upper row names what
/// is measured. Columns with an empty lower header are descriptive and join
/// into the compound row label; columns with a non-year lower header are
/// dropped.
fn labeled_year_pair(
    sheet: &RawSheet,
    header_row: usize,
    year_row: usize,
    config: &LayoutConfig,
) -> Vec<TidyRow> {
    let mut year_columns: Vec<(usize, i32, String)> = Vec::new();
    let mut descriptive_columns: Vec<usize> = Vec::new();

    // The upper header forward-fills across merged spans, as spreadsheet
    // readers render a label merged over several year columns.
    let mut last_measure: Option<String> = None;
    for c in 0..sheet.width() {
        if let Some(m) = sheet.cell(header_row, c).label() {
            last_measure = Some(collapse_ws(&m));
        }
        match sheet.cell(year_row, c).label() {
            Some(h) => {
                if let Some(year) = first_year(&h, &config.year_pattern) {
                    let measure = last_measure
                        .clone()
                        .unwrap_or_else(|| SINGLE_MEASURE.to_string());
                    year_columns.push((c, year, measure));
                }
            }
            None => descriptive_columns.push(c),
        }
    }

    if year_columns.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for r in year_row + 1..sheet.height() {
        if sheet.row(r).iter().all(Cell::is_empty) {
            continue;
        }
        let parts: Vec<String> = descriptive_columns
            .iter()
            .filter_map(|&c| sheet.cell(r, c).label())
            .map(|l| collapse_ws(&l))
            .collect();
        let row_label = if parts.is_empty() {
            NO_LABEL.to_string()
        } else {
            parts.join(LABEL_SEPARATOR)
        };
        for (col, year, measure) in &year_columns {
            out.push(sourceless(
                *year,
                None,
                row_label.clone(),
                measure.clone(),
                cell_number(sheet.cell(r, *col)),
            ));
        }
    }
    out
}

fn header_labels(sheet: &RawSheet, header_row: usize) -> Vec<String> {
    (0..sheet.width())
        .map(|c| {
            sheet
                .cell(header_row, c)
                .label()
                .map(|l| collapse_ws(&l))
                .unwrap_or_else(|| format!("c{c}"))
        })
        .collect()
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify and extract in one step, tagging every row with its source.
///
/// Returns `None` both for unrecognized layouts and for recognized layouts
/// that produced zero rows; callers treat both as "skip this sheet".
pub fn tidy_grid(
    sheet: &RawSheet,
    config: &LayoutConfig,
    source_file: &str,
    source_sheet: &str,
) -> Option<TidyTable> {
    let layout = super::classify(sheet, config);
    let rows = extract(sheet, &layout, config, source_file, source_sheet);
    if rows.is_empty() {
        None
    } else {
        Some(TidyTable::new(rows))
    }
}
