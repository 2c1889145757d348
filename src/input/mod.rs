//! Module defining the parsing logic used to convert raw CSV lines into validated sales records that can be fed to the aggregation.

use std::io::Read;

use csv::{ByteRecord, StringRecord};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::SalesRecord;
use crate::error::{Error, ParseError, malformed_input};


/// Field names of the optional header row, in the fixed input column order
pub(crate) const HEADER_FIELDS: [&str; 3] = ["department", "date", "sales"];

const FIELD_COUNT: usize = HEADER_FIELDS.len();

/// Parses a single raw input line, e.g. `New York,2023-01-01,100`.
///
/// Applies the same field splitting as the streaming pipeline, so quoted fields may contain commas.
pub fn parse_line(line: &str) -> Result<SalesRecord, ParseError> {
    let mut reader = csv_reader(line.as_bytes());
    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => parse_record(&record),
        Ok(false) => Err(field_count_error(0)),
        Err(e) => Err(ParseError::MalformedRecord(e.to_string())),
    }
}

/// Converts one CSV record into a [`SalesRecord`]. Pure: no trimming, no coercion.
pub fn parse_record(record: &StringRecord) -> Result<SalesRecord, ParseError> {
    if record.len() != FIELD_COUNT {
        return Err(field_count_error(record.len()));
    }
    let (department, date, sales) = (&record[0], &record[1], &record[2]);

    let amount = parse_amount(sales)?;
    SalesRecord::new(department, date, amount).map_err(ParseError::MalformedRecord)
}

fn parse_amount(raw: &str) -> Result<Decimal, ParseError> {
    if !is_plain_decimal(raw) {
        return Err(ParseError::InvalidAmount(raw.to_string()));
    }
    // more than 28 fractional digits or a magnitude beyond ~7.9e28 is rejected, never rounded
    Decimal::from_str_exact(raw).map_err(|_| ParseError::AmountOutOfRange(raw.to_string()))
}

/// `[+-]?(digits[.digits?] | .digits)`
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && all_digits(frac) && !(int.is_empty() && frac.is_empty())
}

fn field_count_error(found: usize) -> ParseError {
    ParseError::MalformedRecord(format!("expected {FIELD_COUNT} fields, found {found}"))
}

/// Lazily parses the data provided by the reader, one record at a time.
///
/// Each record comes with the input line it started on. When `skip_header` is set, a first record
/// reading exactly `department,date,sales` is dropped. I/O failures of the reader surface as
/// [`Error::StreamRead`].
pub(crate) fn parse_records(
    reader: impl Read,
    skip_header: bool,
) -> impl Iterator<Item = Result<(u64, SalesRecord), Error>> {
    csv_reader(reader)
        .into_byte_records()
        .enumerate()
        .filter_map(move |(idx, result)| {
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => return Some(Err(from_csv_error(e))),
            };
            let line = raw.position().map_or(0, |p| p.line());
            let record = match StringRecord::from_byte_record(raw) {
                Ok(record) => record,
                Err(e) => {
                    let reason = ParseError::MalformedRecord(e.utf8_error().to_string());
                    let text = raw_text(&e.into_byte_record());
                    return Some(Err(malformed_input(line, text, reason)));
                }
            };
            if idx == 0 && skip_header && is_header(&record) {
                debug!("skipping header row");
                return None;
            }
            let parsed = parse_record(&record).map(|sales| (line, sales)).map_err(|reason| {
                malformed_input(line, raw_text(record.as_byte_record()), reason)
            });
            Some(parsed)
        })
}

/// The record as it would appear in the input, quoting included. Invalid UTF-8 is replaced.
fn raw_text(record: &ByteRecord) -> String {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    let written = wtr.write_byte_record(record).is_ok();
    match wtr.into_inner() {
        Ok(bytes) if written => String::from_utf8_lossy(&bytes)
            .trim_end_matches('\n')
            .to_string(),
        _ => String::new(),
    }
}

fn is_header(record: &StringRecord) -> bool {
    record.iter().eq(HEADER_FIELDS)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader)
}

fn from_csv_error(err: csv::Error) -> Error {
    let line = err.position().map_or(0, |p| p.line());
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::StreamRead(e),
        other => malformed_input(
            line,
            String::new(),
            ParseError::MalformedRecord(format!("{other:?}")),
        ),
    }
}
