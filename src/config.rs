//! Module reading the runtime configuration from environment variables

use std::{env, ffi::OsString, path::PathBuf};

use anyhow::{Context, Result, bail};

use crate::engine::PipelineOptions;

const OUTPUT_DIR_VAR: &str = "SALES_OUTPUT_DIR";
const WORKERS_VAR: &str = "SALES_WORKERS";
const SKIP_HEADER_VAR: &str = "SALES_SKIP_HEADER";
const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

const DEFAULT_OUTPUT_DIR: &str = "results";

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the result files
    pub output_dir: PathBuf,
    /// Number of worker threads processing jobs
    pub workers: usize,
    pub pipeline: PipelineOptions,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// | variable            | default                      |
    /// |---------------------|------------------------------|
    /// | `SALES_OUTPUT_DIR`  | `results`                    |
    /// | `SALES_WORKERS`     | available parallelism − 1    |
    /// | `SALES_SKIP_HEADER` | `true`                       |
    /// | `LOG_FORMAT`        | `pretty` (or `json`)         |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var_os(key))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        // paths need not be unicode
        let output_dir = lookup(OUTPUT_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let text = |key: &str| -> Result<Option<String>> {
            lookup(key)
                .map(|raw| {
                    raw.into_string()
                        .map_err(|raw| anyhow::anyhow!("{key} is not valid unicode: {raw:?}"))
                })
                .transpose()
        };

        let workers = match text(WORKERS_VAR)? {
            Some(raw) => {
                let workers: usize = raw
                    .parse()
                    .with_context(|| format!("{WORKERS_VAR} must be a positive integer, got {raw:?}"))?;
                if workers == 0 {
                    bail!("{WORKERS_VAR} must be at least 1");
                }
                workers
            }
            None => default_workers(),
        };

        let skip_header = match text(SKIP_HEADER_VAR)? {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("{SKIP_HEADER_VAR} must be a boolean, got {raw:?}"))?,
            None => PipelineOptions::default().skip_header,
        };

        let log_format = match text(LOG_FORMAT_VAR)?.as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("{LOG_FORMAT_VAR} must be `pretty` or `json`, got {other:?}"),
        };

        Ok(Self {
            output_dir,
            workers,
            pipeline: PipelineOptions { skip_header },
            log_format,
        })
    }
}

// Leaves one core to the submitting thread
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
