use thiserror::Error;

/// Convenience result type for tidying operations.
pub type TidyResult<T> = Result<T, TidyError>;

/// Error type returned by workbook, output, and batch operations.
///
/// Cell-level parse failures are not errors: an unparseable value becomes an
/// absent value, and a row with an unparseable year is dropped. An
/// unrecognized sheet layout is likewise not an error; it is signaled as "no
/// result" (`Option::None`).
#[derive(Debug, Error)]
pub enum TidyError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook read error (corrupt file, unsupported format, missing sheet).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Frame construction or Parquet write error.
    #[error("dataframe error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// A user-supplied layout pattern failed to compile.
    #[error("invalid layout pattern: {0}")]
    Pattern(#[from] regex::Error),
}
