//! Module for the streaming pipeline driving parsing and aggregation over one input

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::Path,
};

use tracing::debug;

use crate::{
    domain::{DepartmentTotal, DepartmentTotals},
    error::{Error, malformed_input},
    input::parse_records,
    output::{OutputId, ResultStore},
};


/// Knobs of the pipeline which do not depend on how it is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Drop a leading `department,date,sales` row instead of treating it as data.
    pub skip_header: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { skip_header: true }
    }
}

///
/// Reads the input record by record and returns the per-department totals in first-seen order.
///
/// Memory grows with the number of distinct departments only. The first invalid record aborts the
/// whole run with [`Error::MalformedInput`]; no partial totals are ever returned.
///
pub fn summarize(
    reader: impl Read,
    options: PipelineOptions,
) -> Result<Vec<DepartmentTotal>, Error> {
    let mut reader = BufReader::new(reader);
    if reader.fill_buf().map_err(Error::StreamRead)?.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut totals = DepartmentTotals::new();
    let mut records = 0u64;
    for result in parse_records(reader, options.skip_header) {
        let (line, record) = result?;
        totals
            .accumulate(&record)
            .map_err(|reason| malformed_input(line, record.to_string(), reason))?;
        records += 1;
    }

    debug!(records, departments = totals.len(), "input aggregated");
    Ok(totals.snapshot())
}

/// Aggregates the input and persists the summary, returning the identifier of the new result.
/// Nothing is written unless the whole input was valid.
pub fn process_reader(
    reader: impl Read,
    store: &ResultStore,
    options: PipelineOptions,
) -> Result<OutputId, Error> {
    let totals = summarize(reader, options)?;
    store.write(&totals)
}

/// Same as [`process_reader`] for a file on disk.
pub fn process_file(
    path: &Path,
    store: &ResultStore,
    options: PipelineOptions,
) -> Result<OutputId, Error> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::StreamRead(e),
    })?;
    process_reader(file, store, options)
}
