mod config;
mod domain;
mod engine;
mod error;
mod input;
mod orchestration;
mod output;
mod telemetry;

pub use config::{Config, LogFormat};
pub use domain::{DepartmentTotal, DepartmentTotals, Money, SalesRecord};
pub use engine::{PipelineOptions, process_file, process_reader, summarize};
pub use error::{Error, ErrorKind, ParseError};
pub use input::{parse_line, parse_record};
pub use orchestration::{JobHandle, JobId, JobOutcome, JobRunner, JobStatus};
pub use output::{OutputId, ResultStore};
pub use telemetry::setup_logging;

/// Aggregates a sales CSV file into per-department totals and persists the summary.
///
/// This is the synchronous entry point: it runs the whole pipeline on the calling thread and
/// returns the identifier of the new result file in `store`. Use a [`JobRunner`] to run the same
/// pipeline on worker threads instead.
///
/// The input has three columns, `department,date,sales`, and no header (a leading
/// `department,date,sales` row is skipped by default, see [`PipelineOptions`]). The first
/// invalid line aborts the run, and then no file is written at all.
///
/// # Example
///
/// ```no_run
/// use sales_summary::{ResultStore, process};
///
/// let store = ResultStore::new("results").unwrap();
/// let id = process("sales.csv", &store).unwrap();
///
/// let path = store.resolve(id.as_str()).unwrap();
/// println!("{}", std::fs::read_to_string(path).unwrap());
/// ```
pub fn process(path: impl AsRef<std::path::Path>, store: &ResultStore) -> Result<OutputId, Error> {
    engine::process_file(path.as_ref(), store, PipelineOptions::default())
}
