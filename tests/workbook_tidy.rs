#![cfg(feature = "xlsx_test_writer")]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use polars::prelude::{ParquetReader, SerReader};
use tidymelt::observe::{SheetContext, SheetObserver, SheetStats};
use tidymelt::output::COMBINED_FILE;
use tidymelt::{tidy_sheet, tidy_tree, tidy_workbook, BatchOptions, LayoutConfig, TidyError};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tidymelt-{name}-{nanos}.xlsx"))
}

/// One wide-year sheet plus a notes sheet that should be skipped.
fn write_annual_xlsx(path: &Path) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    let ws = wb.add_worksheet();
    ws.set_name("Annual").unwrap();
    ws.write_string(0, 0, "Table 3.1 Net Generation").unwrap();
    ws.write_string(2, 0, "Fuel").unwrap();
    ws.write_number(2, 1, 1999).unwrap();
    ws.write_number(2, 2, 2000).unwrap();
    ws.write_number(2, 3, 2001).unwrap();
    ws.write_string(3, 0, "Coal").unwrap();
    ws.write_number(3, 1, 10.0).unwrap();
    ws.write_number(3, 2, 20.0).unwrap();
    ws.write_number(3, 3, 30.0).unwrap();
    ws.write_string(4, 0, "Gas").unwrap();
    ws.write_number(4, 1, 1.0).unwrap();
    ws.write_number(4, 2, 2.0).unwrap();
    ws.write_number(4, 3, 3.0).unwrap();

    let notes = wb.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Source: agency publication").unwrap();

    wb.save(path).unwrap();
}

fn write_monthly_xlsx(path: &Path) {
    use rust_xlsxwriter::Workbook;

    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Monthly").unwrap();
    ws.write_string(0, 1, "MWh").unwrap();
    ws.write_string(1, 0, "Year 2001").unwrap();
    for (i, month) in MONTHS.iter().enumerate() {
        let row = 2 + i as u32;
        ws.write_string(row, 0, *month).unwrap();
        ws.write_number(row, 1, (i + 1) as f64).unwrap();
    }
    wb.save(path).unwrap();
}

#[test]
fn tidy_workbook_takes_data_sheets_and_skips_notes() {
    let path = tmp_file("annual");
    write_annual_xlsx(&path);

    let tables = tidy_workbook(&path, &LayoutConfig::default()).unwrap();
    assert_eq!(tables.len(), 1);

    let table = &tables[0];
    // 2 data rows x 3 year columns
    assert_eq!(table.row_count(), 6);
    assert!(table.rows.iter().all(|r| r.source_sheet == "Annual"));
    assert_eq!(table.rows[0].row_label, "Coal");
    assert_eq!(table.rows[0].year, 1999);
    assert_eq!(table.rows[0].value, Some(10.0));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn tidy_sheet_reads_one_named_sheet() {
    let path = tmp_file("monthly");
    write_monthly_xlsx(&path);

    let table = tidy_sheet(&path, "Monthly", &LayoutConfig::default())
        .unwrap()
        .expect("monthly layout recognized");
    assert_eq!(table.row_count(), 12);
    assert!(table.rows.iter().all(|r| r.year == 2001));
    assert!(table.rows.iter().all(|r| r.measure == "MWh"));
    assert_eq!(table.rows[11].value, Some(12.0));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn tidy_sheet_errors_on_a_missing_sheet() {
    let path = tmp_file("missing-sheet");
    write_annual_xlsx(&path);

    assert!(tidy_sheet(&path, "NoSuchSheet", &LayoutConfig::default()).is_err());
    let _ = std::fs::remove_file(&path);
}

#[derive(Default)]
struct CountingObserver {
    tidied: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    rows: AtomicUsize,
}

impl SheetObserver for CountingObserver {
    fn on_tidied(&self, _ctx: &SheetContext, stats: SheetStats) {
        self.tidied.fetch_add(1, Ordering::Relaxed);
        self.rows.fetch_add(stats.rows, Ordering::Relaxed);
    }

    fn on_skipped(&self, _ctx: &SheetContext) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn on_failed(&self, _ctx: &SheetContext, _error: &TidyError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn tidy_tree_writes_per_sheet_and_combined_parquet() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_annual_xlsx(&input.path().join("epa_01_01.xlsx"));
    let nested = input.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    write_monthly_xlsx(&nested.join("eia_02_01.xlsx"));

    let observer = Arc::new(CountingObserver::default());
    let options = BatchOptions {
        config: LayoutConfig::default(),
        observer: Some(observer.clone()),
    };
    let summary = tidy_tree(input.path(), output.path(), &options).unwrap();

    assert_eq!(summary.workbooks, 2);
    assert_eq!(summary.tidied, 2);
    assert_eq!(summary.skipped, 1); // the Notes sheet
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.rows, 6 + 12);

    assert_eq!(observer.tidied.load(Ordering::Relaxed), summary.tidied);
    assert_eq!(observer.skipped.load(Ordering::Relaxed), summary.skipped);
    assert_eq!(observer.rows.load(Ordering::Relaxed), summary.rows);

    assert!(output
        .path()
        .join("melted_epa_01_01_Annual.parquet")
        .exists());
    assert!(output
        .path()
        .join("melted_eia_02_01_Monthly.parquet")
        .exists());

    let combined = output.path().join(COMBINED_FILE);
    let df = ParquetReader::new(File::open(&combined).unwrap())
        .finish()
        .unwrap();
    assert_eq!(df.height(), 18);
    assert_eq!(
        df.get_column_names()
            .into_iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>(),
        tidymelt::output::OUTPUT_COLUMNS.to_vec()
    );
}

#[test]
fn tidy_tree_counts_unreadable_workbooks_as_failed() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    std::fs::write(input.path().join("broken.xlsx"), b"not a workbook").unwrap();
    write_annual_xlsx(&input.path().join("good.xlsx"));

    let summary = tidy_tree(input.path(), output.path(), &BatchOptions::default()).unwrap();
    assert_eq!(summary.workbooks, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.tidied, 1);
    assert_eq!(summary.rows, 6);
}
