//! Directory-tree driver: normalize every workbook sheet under a root and
//! write per-sheet plus combined Parquet output.
//!
//! Each sheet's extraction is a pure function of its own input, so workbooks
//! fan out across a rayon pool; per-file results fold back in input order,
//! which keeps reruns deterministic.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{TidyError, TidyResult};
use crate::normalize::LayoutConfig;
use crate::observe::{SheetContext, SheetObserver, SheetStats};
use crate::output;
use crate::types::TidyTable;
use crate::workbook::{self, SheetOutcome};

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xls", "xlsm", "xlsb", "ods"];

/// Per-sheet outcome counts and the combined row count for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Workbook files visited.
    pub workbooks: usize,
    /// Sheets that produced tidy rows.
    pub tidied: usize,
    /// Sheets with no recognizable layout.
    pub skipped: usize,
    /// Sheets (or whole workbooks) that could not be read.
    pub failed: usize,
    /// Total rows across all tidied sheets (the combined table's height).
    pub rows: usize,
}

/// Options controlling a batch run.
#[derive(Clone, Default)]
pub struct BatchOptions {
    /// Layout heuristic configuration applied to every sheet.
    pub config: LayoutConfig,
    /// Optional observer for per-sheet outcomes.
    pub observer: Option<Arc<dyn SheetObserver>>,
}

impl fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOptions")
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// Normalize every workbook under `input_dir`, writing one Parquet file per
/// tidied sheet into `output_dir` plus a combined
/// [`crate::output::COMBINED_FILE`] when any rows were produced.
///
/// Unreadable sheets are counted and skipped, never fatal; the batch degrades
/// to fewer rows rather than halting. Hard errors are limited to the output
/// side (directory creation, Parquet writes).
pub fn tidy_tree(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: &BatchOptions,
) -> TidyResult<BatchSummary> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let files = workbook_files(input_dir.as_ref());

    let per_file: Vec<TidyResult<(Vec<TidyTable>, BatchSummary)>> = files
        .par_iter()
        .map(|path| process_workbook(path, output_dir, options))
        .collect();

    let mut summary = BatchSummary::default();
    let mut tables: Vec<TidyTable> = Vec::new();
    for result in per_file {
        let (mut file_tables, file_summary) = result?;
        summary.workbooks += file_summary.workbooks;
        summary.tidied += file_summary.tidied;
        summary.skipped += file_summary.skipped;
        summary.failed += file_summary.failed;
        summary.rows += file_summary.rows;
        tables.append(&mut file_tables);
    }

    let combined = TidyTable::concat(tables);
    if !combined.is_empty() {
        output::write_parquet(&combined, output_dir.join(output::COMBINED_FILE))?;
    }
    Ok(summary)
}

fn process_workbook(
    path: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> TidyResult<(Vec<TidyTable>, BatchSummary)> {
    let mut summary = BatchSummary {
        workbooks: 1,
        ..BatchSummary::default()
    };
    let mut tables = Vec::new();

    let outcomes = match workbook::tidy_workbook_outcomes(path, &options.config) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            summary.failed += 1;
            notify_failed(options, path, "*", &e);
            return Ok((tables, summary));
        }
    };

    let stem = workbook::file_stem(path);
    for (sheet, outcome) in outcomes {
        let ctx = SheetContext {
            workbook: path.to_path_buf(),
            sheet: sheet.clone(),
        };
        match outcome {
            SheetOutcome::Tidied(table) => {
                let name = output::sheet_output_name(&stem, &sheet);
                output::write_parquet(&table, output_dir.join(name))?;

                summary.tidied += 1;
                summary.rows += table.row_count();
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_tidied(
                        &ctx,
                        SheetStats {
                            rows: table.row_count(),
                        },
                    );
                }
                tables.push(table);
            }
            SheetOutcome::Skipped => {
                summary.skipped += 1;
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_skipped(&ctx);
                }
            }
            SheetOutcome::Failed(e) => {
                summary.failed += 1;
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_failed(&ctx, &e);
                }
            }
        }
    }
    Ok((tables, summary))
}

fn notify_failed(options: &BatchOptions, workbook: &Path, sheet: &str, error: &TidyError) {
    if let Some(obs) = options.observer.as_ref() {
        let ctx = SheetContext {
            workbook: workbook.to_path_buf(),
            sheet: sheet.to_string(),
        };
        obs.on_failed(&ctx, error);
    }
}

/// All workbook files under `root`, sorted for a deterministic batch order.
fn workbook_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_workbook(path))
        .collect();
    files.sort();
    files
}

fn is_workbook(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    // `~$` files are Office lock files, not data.
    if name.starts_with("~$") {
        return false;
    }
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::{is_workbook, tidy_tree, BatchOptions, BatchSummary};
    use std::path::Path;

    #[test]
    fn lock_files_and_other_extensions_are_not_workbooks() {
        assert!(is_workbook(Path::new("data/epa_01_01.xlsx")));
        assert!(is_workbook(Path::new("data/epa_01_01.XLSX")));
        assert!(is_workbook(Path::new("legacy.xls")));
        assert!(!is_workbook(Path::new("data/~$epa_01_01.xlsx")));
        assert!(!is_workbook(Path::new("data/readme.txt")));
        assert!(!is_workbook(Path::new("data/tidy_combined.parquet")));
    }

    #[test]
    fn empty_tree_yields_an_empty_summary_and_no_combined_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let summary = tidy_tree(input.path(), output.path(), &BatchOptions::default()).unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert!(!output.path().join(crate::output::COMBINED_FILE).exists());
    }
}
