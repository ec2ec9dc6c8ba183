//! Layout classification and long-format extraction (the core normalizer).
//!
//! A [`crate::types::RawSheet`] goes through two steps:
//!
//! 1. [`classify`] decides which recognized physical [`Layout`] the sheet uses,
//!    recording the positions extraction needs (header rows, block markers).
//! 2. [`extract`] applies the matching extraction rule and emits
//!    [`crate::types::TidyRow`]s.
//!
//! [`tidy_grid`] runs both and tags every row with its source identifiers.
//! Unrecognized sheets produce `None`; that is a normal outcome, not an error.
//!
//! ```rust
//! use tidymelt::normalize::{tidy_grid, LayoutConfig};
//! use tidymelt::types::{Cell, RawSheet};
//!
//! let sheet = RawSheet::from_rows(vec![
//!     vec![
//!         Cell::Text("Category".into()),
//!         Cell::Text("1999".into()),
//!         Cell::Text("2000".into()),
//!         Cell::Text("2001".into()),
//!     ],
//!     vec![
//!         Cell::Text("Coal".into()),
//!         Cell::Number(10.0),
//!         Cell::Number(20.0),
//!         Cell::Number(30.0),
//!     ],
//! ]);
//!
//! let table = tidy_grid(&sheet, &LayoutConfig::default(), "epa_01_01", "Annual").unwrap();
//! assert_eq!(table.row_count(), 3);
//! assert_eq!(table.rows[0].year, 1999);
//! assert_eq!(table.rows[0].row_label, "Coal");
//! ```

mod classify;
mod coerce;
mod extract;

pub use classify::{
    classify, BlockMarker, Layout, LayoutConfig, LayoutKind, DEFAULT_SCAN_ROWS,
};
pub use extract::{extract, tidy_grid, MONTHLY_LABEL, NO_LABEL, SINGLE_MEASURE};
