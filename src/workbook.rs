//! Workbook reading: calamine-backed entry points over the grid normalizer.
//!
//! The download layer (out of scope here) leaves workbook files on local
//! storage; these functions read them sheet by sheet and hand each grid to
//! [`crate::normalize::tidy_grid`].

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{TidyError, TidyResult};
use crate::normalize::{tidy_grid, LayoutConfig};
use crate::types::{Cell, RawSheet, TidyTable};

/// Outcome of normalizing one sheet of a workbook.
#[derive(Debug)]
pub enum SheetOutcome {
    /// The sheet matched a layout and produced rows.
    Tidied(TidyTable),
    /// No recognizable layout, or a recognized layout with zero rows.
    Skipped,
    /// The sheet itself could not be read.
    Failed(TidyError),
}

/// Normalize a single named sheet.
///
/// `Ok(None)` means the sheet was read but not recognized (or produced no
/// rows); `Err` means the workbook or sheet could not be read.
pub fn tidy_sheet(
    path: impl AsRef<Path>,
    sheet_name: &str,
    config: &LayoutConfig,
) -> TidyResult<Option<TidyTable>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet_name)?;
    Ok(tidy_range(&range, &file_stem(path), sheet_name, config))
}

/// Normalize every sheet of a workbook, in workbook order.
///
/// Sheets that skip or fail are omitted; use [`tidy_workbook_outcomes`] when
/// per-sheet outcomes matter.
pub fn tidy_workbook(path: impl AsRef<Path>, config: &LayoutConfig) -> TidyResult<Vec<TidyTable>> {
    Ok(tidy_workbook_outcomes(path, config)?
        .into_iter()
        .filter_map(|(_, outcome)| match outcome {
            SheetOutcome::Tidied(table) => Some(table),
            _ => None,
        })
        .collect())
}

/// Normalize every sheet, capturing per-sheet failures instead of aborting
/// the workbook. `Err` is returned only when the workbook itself cannot be
/// opened.
pub fn tidy_workbook_outcomes(
    path: impl AsRef<Path>,
    config: &LayoutConfig,
) -> TidyResult<Vec<(String, SheetOutcome)>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let stem = file_stem(path);

    let sheets: Vec<String> = workbook.sheet_names().to_vec();
    let mut out = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let outcome = match workbook.worksheet_range(&sheet) {
            Ok(range) => match tidy_range(&range, &stem, &sheet, config) {
                Some(table) => SheetOutcome::Tidied(table),
                None => SheetOutcome::Skipped,
            },
            Err(e) => SheetOutcome::Failed(e.into()),
        };
        out.push((sheet, outcome));
    }
    Ok(out)
}

fn tidy_range(
    range: &Range<Data>,
    source_file: &str,
    source_sheet: &str,
    config: &LayoutConfig,
) -> Option<TidyTable> {
    let sheet = sheet_from_range(range);
    tidy_grid(&sheet, config, source_file, source_sheet)
}

/// Convert a calamine range into the owned grid model.
pub fn sheet_from_range(range: &Range<Data>) -> RawSheet {
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    RawSheet::from_rows(rows)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
