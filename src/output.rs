//! Tidy output assembly: polars frames and Parquet files.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::TidyResult;
use crate::types::TidyTable;

/// Fixed column order of every tidy output file.
pub const OUTPUT_COLUMNS: [&str; 7] = [
    "year",
    "month",
    "row_label",
    "measure",
    "value",
    "source_file",
    "source_sheet",
];

/// File name of the combined table written at the end of a batch run.
pub const COMBINED_FILE: &str = "tidy_combined.parquet";

/// Convert a tidy table into a columnar frame with the fixed column order.
pub fn tidy_frame(table: &TidyTable) -> TidyResult<DataFrame> {
    let n = table.row_count();
    let mut years: Vec<i32> = Vec::with_capacity(n);
    let mut months: Vec<Option<&str>> = Vec::with_capacity(n);
    let mut row_labels: Vec<&str> = Vec::with_capacity(n);
    let mut measures: Vec<&str> = Vec::with_capacity(n);
    let mut values: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut source_files: Vec<&str> = Vec::with_capacity(n);
    let mut source_sheets: Vec<&str> = Vec::with_capacity(n);

    for row in &table.rows {
        years.push(row.year);
        months.push(row.month.map(|m| m.as_str()));
        row_labels.push(row.row_label.as_str());
        measures.push(row.measure.as_str());
        values.push(row.value);
        source_files.push(row.source_file.as_str());
        source_sheets.push(row.source_sheet.as_str());
    }

    let df = df!(
        "year" => years,
        "month" => months,
        "row_label" => row_labels,
        "measure" => measures,
        "value" => values,
        "source_file" => source_files,
        "source_sheet" => source_sheets,
    )?;
    Ok(df)
}

/// Write one tidy table as a Parquet file.
pub fn write_parquet(table: &TidyTable, path: impl AsRef<Path>) -> TidyResult<()> {
    let mut df = tidy_frame(table)?;
    let file = File::create(path.as_ref())?;
    ParquetWriter::new(file).finish(&mut df)?;
    Ok(())
}

/// Per-sheet output file name, `melted_{file}_{sheet}.parquet`.
///
/// Sheet names may contain characters that are not filesystem-safe; anything
/// outside `[A-Za-z0-9._-]` becomes an underscore.
pub fn sheet_output_name(source_file: &str, source_sheet: &str) -> String {
    format!(
        "melted_{}_{}.parquet",
        sanitize(source_file),
        sanitize(source_sheet)
    )
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
