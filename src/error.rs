//! Module defining the errors which are exposed to the users of the crate

use std::{fmt, path::PathBuf};

/// Terminal failure of a job or of an output lookup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input path does not exist
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// The input contains zero bytes
    #[error("empty input: nothing to aggregate")]
    EmptyInput,

    /// A record could not be parsed. Aborts the whole job, no output is written.
    #[error("malformed input at line {line} ({record:?}): {reason}")]
    MalformedInput {
        line: u64,
        record: String,
        reason: ParseError,
    },

    /// Reading the input failed part way through
    #[error("failed to read input: {0}")]
    StreamRead(#[source] std::io::Error),

    /// The result file could not be persisted
    #[error("failed to write result {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The identifier is not a plain file name inside the output directory
    #[error("invalid output identifier: {0:?}")]
    InvalidIdentifier(String),

    /// No result exists under a well-formed identifier
    #[error("no result found for identifier {0:?}")]
    NotFound(String),

    /// The execution context of a job died before reporting an outcome
    #[error("job execution aborted: {0}")]
    ExecutionAborted(String),
}

impl Error {
    /// Stable classification of the error, independent of its detail message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::MalformedInput { .. } => ErrorKind::MalformedInput,
            Error::StreamRead(_) => ErrorKind::StreamReadError,
            Error::WriteFailure { .. } => ErrorKind::WriteFailure,
            Error::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::ExecutionAborted(_) => ErrorKind::ExecutionAborted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SourceNotFound,
    EmptyInput,
    MalformedInput,
    StreamReadError,
    WriteFailure,
    InvalidIdentifier,
    NotFound,
    ExecutionAborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SourceNotFound => "SourceNotFound",
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::StreamReadError => "StreamReadError",
            ErrorKind::WriteFailure => "WriteFailure",
            ErrorKind::InvalidIdentifier => "InvalidIdentifier",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ExecutionAborted => "ExecutionAborted",
        };
        f.write_str(name)
    }
}

/// Reason a single record was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Wrong number of fields, empty department or undecodable bytes
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The sales field is not a decimal number
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Plain decimal notation, but not exactly representable (too large or too many fractional digits)
    #[error("amount out of range: {0:?}")]
    AmountOutOfRange(String),

    /// Adding the amount would leave the representable range of the running total
    #[error("total for department {0:?} overflows")]
    TotalOverflow(String),
}

pub(crate) fn malformed_input(line: u64, record: impl Into<String>, reason: ParseError) -> Error {
    Error::MalformedInput {
        line,
        record: record.into(),
        reason,
    }
}

pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
    Error::WriteFailure {
        path: path.into(),
        source,
    }
}
