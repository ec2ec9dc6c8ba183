//! Per-sheet outcome observability for batch runs.
//!
//! Every sheet ends in exactly one of three outcomes: tidied (rows produced),
//! skipped (no recognizable layout), or failed (unreadable). Observers receive
//! each outcome; implementors can record logs or counters.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TidyError;

/// Context about one sheet-normalization attempt.
#[derive(Debug, Clone)]
pub struct SheetContext {
    /// The workbook file being processed.
    pub workbook: PathBuf,
    /// The sheet name within the workbook (`"*"` when the whole workbook
    /// failed to open).
    pub sheet: String,
}

/// Minimal stats reported when a sheet tidies successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetStats {
    /// Number of tidy rows emitted for the sheet.
    pub rows: usize,
}

/// Observer interface for per-sheet outcomes.
pub trait SheetObserver: Send + Sync {
    /// Called when a sheet produces tidy rows.
    fn on_tidied(&self, _ctx: &SheetContext, _stats: SheetStats) {}

    /// Called when a sheet has no recognizable layout (a normal outcome).
    fn on_skipped(&self, _ctx: &SheetContext) {}

    /// Called when a sheet or workbook cannot be read.
    fn on_failed(&self, _ctx: &SheetContext, _error: &TidyError) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn SheetObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn SheetObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl SheetObserver for CompositeObserver {
    fn on_tidied(&self, ctx: &SheetContext, stats: SheetStats) {
        for o in &self.observers {
            o.on_tidied(ctx, stats);
        }
    }

    fn on_skipped(&self, ctx: &SheetContext) {
        for o in &self.observers {
            o.on_skipped(ctx);
        }
    }

    fn on_failed(&self, ctx: &SheetContext, error: &TidyError) {
        for o in &self.observers {
            o.on_failed(ctx, error);
        }
    }
}

/// Logs sheet outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl SheetObserver for StdErrObserver {
    fn on_tidied(&self, ctx: &SheetContext, stats: SheetStats) {
        eprintln!(
            "[tidy][ok] workbook={} sheet={} rows={}",
            ctx.workbook.display(),
            ctx.sheet,
            stats.rows
        );
    }

    fn on_skipped(&self, ctx: &SheetContext) {
        eprintln!(
            "[tidy][skip] workbook={} sheet={} (no recognizable layout)",
            ctx.workbook.display(),
            ctx.sheet
        );
    }

    fn on_failed(&self, ctx: &SheetContext, error: &TidyError) {
        eprintln!(
            "[tidy][fail] workbook={} sheet={} err={}",
            ctx.workbook.display(),
            ctx.sheet,
            error
        );
    }
}

/// Appends sheet outcomes to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl SheetObserver for FileObserver {
    fn on_tidied(&self, ctx: &SheetContext, stats: SheetStats) {
        self.append_line(&format!(
            "{} ok workbook={} sheet={} rows={}",
            unix_ts(),
            ctx.workbook.display(),
            ctx.sheet,
            stats.rows
        ));
    }

    fn on_skipped(&self, ctx: &SheetContext) {
        self.append_line(&format!(
            "{} skip workbook={} sheet={}",
            unix_ts(),
            ctx.workbook.display(),
            ctx.sheet
        ));
    }

    fn on_failed(&self, ctx: &SheetContext, error: &TidyError) {
        self.append_line(&format!(
            "{} fail workbook={} sheet={} err={}",
            unix_ts(),
            ctx.workbook.display(),
            ctx.sheet,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
