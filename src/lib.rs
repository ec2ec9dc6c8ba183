//! Heuristic normalizer for statistical spreadsheets.
//!
//! Government energy workbooks publish the same numbers in a handful of
//! recurring physical layouts: year-per-column tables, year-in-first-column
//! matrices, two-row header bands, and stacked monthly blocks introduced by
//! `Year NNNN` markers. This crate detects which layout a sheet uses and melts
//! it into one long-format table with a fixed schema (`year`, `month`,
//! `row_label`, `measure`, `value`, `source_file`, `source_sheet`), ready for
//! Parquet output.
//!
//! The pipeline is layered so each step is usable on its own:
//!
//! - [`normalize`] — pure grid-in, rows-out classification and extraction.
//! - [`workbook`] — calamine-backed reading of `.xlsx`/`.xls`/`.ods` files.
//! - [`output`] — polars frames and Parquet writing in the fixed column order.
//! - [`batch`] — walk a directory tree, normalize every sheet in parallel,
//!   write per-sheet files plus a combined table.
//! - [`observe`] — per-sheet outcome callbacks for logging and counters.
//!
//! Unrecognized sheets are skipped, not failed: source workbooks routinely
//! mix data sheets with notes and title pages, and the normalizer's job is to
//! take what it can read.
//!
//! ```rust
//! use tidymelt::{tidy_grid, Cell, LayoutConfig, RawSheet};
//!
//! let sheet = RawSheet::from_rows(vec![
//!     vec![
//!         Cell::Text("Fuel".into()),
//!         Cell::Text("2020".into()),
//!         Cell::Text("2021".into()),
//!         Cell::Text("2022".into()),
//!     ],
//!     vec![
//!         Cell::Text("Wind".into()),
//!         Cell::Number(338.0),
//!         Cell::Number(378.0),
//!         Cell::Number(434.0),
//!     ],
//! ]);
//!
//! let table = tidy_grid(&sheet, &LayoutConfig::default(), "gen_annual", "Sheet1").unwrap();
//! assert_eq!(table.row_count(), 3);
//! assert_eq!(table.rows[2].year, 2022);
//! assert_eq!(table.rows[2].value, Some(434.0));
//! ```

pub mod batch;
pub mod error;
pub mod normalize;
pub mod observe;
pub mod output;
pub mod types;
pub mod workbook;

pub use batch::{tidy_tree, BatchOptions, BatchSummary};
pub use error::{TidyError, TidyResult};
pub use normalize::{classify, extract, tidy_grid, Layout, LayoutConfig, LayoutKind};
pub use types::{Cell, Month, RawSheet, TidyRow, TidyTable};
pub use workbook::{tidy_sheet, tidy_workbook};
