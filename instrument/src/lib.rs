//! Capture of market events into column-oriented tables.
//!
//! The simulation emits one `tracing` event per trade (target `"trade"`) and
//! one per trading day (target `"day"`). [`TableSubscriber`] turns each target
//! into a table whose columns are discovered from the event fields, so new
//! fields show up without touching this crate.
//!
//! # Usage
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "trade", day, seller_id, buyer_id, price);
//!
//! // In a test:
//! let (series, recorder) = instrument::capture(|| market.run(30));
//! let prices = recorder.table("trade").and_then(|t| t.f64s("price"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

/// A column of typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl TypedColumn {
    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Bool(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill with the type's zero value up to `rows` entries.
    fn pad_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        if missing == 0 {
            return;
        }
        match self {
            TypedColumn::U64(v) => v.extend(std::iter::repeat_n(0, missing)),
            TypedColumn::I64(v) => v.extend(std::iter::repeat_n(0, missing)),
            TypedColumn::F64(v) => v.extend(std::iter::repeat_n(0.0, missing)),
            TypedColumn::Bool(v) => v.extend(std::iter::repeat_n(false, missing)),
            TypedColumn::Str(v) => v.extend(std::iter::repeat_n(String::new(), missing)),
        }
    }
}

/// One event target's rows, stored column by column.
#[derive(Debug, Clone, Default)]
pub struct DynamicTable {
    pub columns: HashMap<String, TypedColumn>,
    pub row_count: usize,
}

impl DynamicTable {
    fn pad_columns_to_row_count(&mut self) {
        let rows = self.row_count;
        for col in self.columns.values_mut() {
            col.pad_to(rows);
        }
    }

    pub fn f64s(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            TypedColumn::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn u64s(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name)? {
            TypedColumn::U64(v) => Some(v),
            _ => None,
        }
    }
}

/// Collection of tables, keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, DynamicTable>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&DynamicTable> {
        self.tables.get(target)
    }

    /// Rows recorded for `target`; zero if the target never fired.
    pub fn rows(&self, target: &str) -> usize {
        self.table(target).map_or(0, |t| t.row_count)
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

/// Visitor that appends event fields to the current row of a table.
struct ColumnVisitor<'a> {
    table: &'a mut DynamicTable,
}

impl ColumnVisitor<'_> {
    /// Column for `field`, created and back-filled on first sight.
    fn column(&mut self, field: &Field, make: fn(usize) -> TypedColumn) -> &mut TypedColumn {
        let rows = self.table.row_count;
        self.table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| make(rows))
    }
}

impl Visit for ColumnVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if let TypedColumn::U64(v) = self.column(field, |n| TypedColumn::U64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let TypedColumn::I64(v) = self.column(field, |n| TypedColumn::I64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let TypedColumn::F64(v) = self.column(field, |n| TypedColumn::F64(vec![0.0; n])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let TypedColumn::Bool(v) = self.column(field, |n| TypedColumn::Bool(vec![false; n])) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let TypedColumn::Str(v) =
            self.column(field, |n| TypedColumn::Str(vec![String::new(); n]))
        {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }
}

/// Tracing subscriber that appends info-level events to per-target tables.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        // Debug chatter from the simulation is not tabular data.
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();

        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder.tables.entry(target).or_default();

            table.pad_columns_to_row_count();
            event.record(&mut ColumnVisitor { table: &mut *table });
            table.row_count += 1;
            // Fields this event did not carry.
            table.pad_columns_to_row_count();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install the TableSubscriber as the global default.
/// Recording stays per-thread: each thread fills its own tables.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber);
}

/// Drain all recorded data from this thread's recorder.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

/// Clear all recorded data without returning it.
pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with a scoped TableSubscriber and return its result together
/// with everything it recorded. Leaves the global subscriber untouched.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Recorder) {
    clear();
    let out = tracing::subscriber::with_default(TableSubscriber, f);
    (out, drain())
}

// === Polars Integration ===

use polars::prelude::*;

impl DynamicTable {
    /// Convert this table to a polars DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                TypedColumn::U64(v) => Column::new(name.into(), v),
                TypedColumn::I64(v) => Column::new(name.into(), v),
                TypedColumn::F64(v) => Column::new(name.into(), v),
                TypedColumn::Bool(v) => Column::new(name.into(), v),
                TypedColumn::Str(v) => Column::new(name.into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }
}

impl Recorder {
    /// Convert all tables to polars DataFrames.
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

/// Write each DataFrame to `{dir}/{name}.parquet`.
pub fn save_parquet(dfs: &mut HashMap<String, DataFrame>, dir: &Path) -> PolarsResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| PolarsError::IO {
        error: e.into(),
        msg: None,
    })?;
    for (name, df) in dfs.iter_mut() {
        let path = dir.join(format!("{}.parquet", name));
        let file = std::fs::File::create(&path).map_err(|e| PolarsError::IO {
            error: e.into(),
            msg: None,
        })?;
        ParquetWriter::new(file).finish(df)?;
    }
    Ok(())
}

/// Keep ASCII alphanumerics, replace the rest with `_`, cap at 60 chars.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(60)
        .collect()
}

/// RAII guard for a recorded run: clears this thread's tables on creation
/// and writes them as parquet (plus a `_ready` sentinel) on drop.
///
/// Runs land in `{parent}/{name}_seed{seed}/`, so re-running the same seeded
/// scenario overwrites its previous output instead of piling up directories.
///
/// ```ignore
/// let mut rec = instrument::RunRecorder::new("data", "baseline", 42);
/// market.run(180);
/// let dfs = rec.get();
/// // rec drops → writes data/baseline_seed42/{trade,day}.parquet + _ready
/// ```
pub struct RunRecorder {
    run_dir: PathBuf,
    dfs: Option<HashMap<String, DataFrame>>,
}

impl RunRecorder {
    pub fn new(parent: impl Into<PathBuf>, name: &str, seed: u64) -> Self {
        let run_dir = parent
            .into()
            .join(format!("{}_seed{}", sanitize(name), seed));
        clear();
        install_subscriber();
        Self { run_dir, dfs: None }
    }

    /// Drain recorded data on first call; later calls return the cached frames.
    pub fn get(&mut self) -> &HashMap<String, DataFrame> {
        self.dfs.get_or_insert_with(|| drain().to_dataframes())
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl Drop for RunRecorder {
    fn drop(&mut self) {
        let mut dfs = self.dfs.take().unwrap_or_else(|| drain().to_dataframes());
        if dfs.is_empty() {
            return;
        }
        if let Err(e) = save_parquet(&mut dfs, &self.run_dir) {
            eprintln!("RunRecorder({}): failed to write parquet: {}", self.run_dir.display(), e);
            return;
        }
        let sentinel = self.run_dir.join("_ready");
        if let Err(e) = std::fs::File::create(&sentinel) {
            eprintln!("RunRecorder({}): failed to write _ready sentinel: {}", self.run_dir.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_events_become_columns() {
        let ((), recorder) = capture(|| {
            tracing::info!(target: "trade", day = 0u64, seller_id = 1u64, buyer_id = 2u64, price = 22.5f64);
            tracing::info!(target: "trade", day = 0u64, seller_id = 3u64, buyer_id = 4u64, price = 21.0f64);
            tracing::info!(target: "trade", day = 1u64, seller_id = 1u64, buyer_id = 4u64, price = 20.0f64);
        });

        let trades = recorder.table("trade").expect("trade table");
        assert_eq!(trades.row_count, 3);
        assert_eq!(trades.u64s("day"), Some(&[0, 0, 1][..]));
        assert_eq!(trades.f64s("price"), Some(&[22.5, 21.0, 20.0][..]));
        assert_eq!(trades.u64s("price"), None, "price is not a u64 column");
        assert_eq!(recorder.rows("day"), 0);
    }

    #[test]
    fn test_debug_events_are_ignored() {
        let ((), recorder) = capture(|| {
            tracing::debug!(target: "day", trades = 3u64, "trading day complete");
            tracing::info!(target: "day", day = 0u64, transactions = 3u64);
        });
        assert_eq!(recorder.rows("day"), 1);
    }

    #[test]
    fn test_missing_and_late_fields_are_padded() {
        let ((), recorder) = capture(|| {
            tracing::info!(target: "day", day = 0u64, average_price = 21.0f64);
            tracing::info!(target: "day", day = 1u64);
            tracing::info!(target: "day", day = 2u64, average_price = 22.0f64, note = "late");
        });

        let days = recorder.table("day").expect("day table");
        assert_eq!(days.row_count, 3);
        assert_eq!(days.f64s("average_price"), Some(&[21.0, 0.0, 22.0][..]));
        match &days.columns["note"] {
            TypedColumn::Str(notes) => assert_eq!(notes, &vec![String::new(), String::new(), "late".to_string()]),
            other => panic!("note should be a Str column, got {other:?}"),
        }
        assert!(days.columns.values().all(|c| c.len() == 3));
    }

    #[test]
    fn test_table_converts_to_dataframe() {
        let ((), recorder) = capture(|| {
            tracing::info!(target: "trade", day = 0u64, price = 10.0f64);
            tracing::info!(target: "trade", day = 0u64, price = 12.0f64);
        });
        let dfs = recorder.to_dataframes();
        let df = &dfs["trade"];
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_sanitize_run_names() {
        assert_eq!(sanitize("inflation 0.01/high"), "inflation_0_01_high");
        assert_eq!(sanitize(&"x".repeat(80)).len(), 60);
    }
}
