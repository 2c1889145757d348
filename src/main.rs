use std::{env, path::PathBuf};

use anyhow::{Result, bail};
use sales_summary::{Config, Error, JobRunner, ResultStore, setup_logging};

fn main() -> Result<()> {
    let config = Config::from_env()?;
    setup_logging(config.log_format)?;

    let inputs = get_inputs()?;
    let store = ResultStore::new(&config.output_dir)?;
    let runner = JobRunner::new(store, config.workers, config.pipeline)?;

    // All inputs are queued up front; the workers pick them up while we wait below
    let handles: Vec<_> = inputs.into_iter().map(|input| runner.submit(input)).collect();
    let total = handles.len();

    let mut failed = 0;
    for handle in handles {
        let input = handle.input().display().to_string();
        match handle.wait() {
            Ok(id) => println!("{input}\t{id}"),
            Err(e) => {
                handle_job_error(&input, &e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} inputs could not be processed");
    }
    Ok(())
}

fn get_inputs() -> Result<Vec<PathBuf>> {
    let inputs: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if inputs.is_empty() {
        bail!("Usage: sales-summary <input.csv>...");
    }
    Ok(inputs)
}

// Only logs here; a caller wanting retries can resubmit the whole input
fn handle_job_error(input: &str, error: &Error) {
    tracing::error!(input, kind = %error.kind(), "{error}")
}
