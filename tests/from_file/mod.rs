//! Integration tests testing against the actual crate binary and reading from and writing to a file: Test the full E2E path.

use std::path::PathBuf;
use std::process::Command;

use tempfile::tempdir;

#[test]
fn summary_of_fixture() {
    let input_path = fixture_path("sales.csv");
    let expected = std::fs::read_to_string(fixture_path("sales_expected.csv"))
        .expect("failed to read expected output fixture");
    let output_dir = tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sales-summary"))
        .arg(&input_path)
        .env("SALES_OUTPUT_DIR", output_dir.path())
        .env("SALES_WORKERS", "1")
        .output()
        .expect("failed to execute binary");

    assert!(
        output.status.success(),
        "binary exited with non-zero status.\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("binary output was not valid UTF-8");
    let (input, id) = stdout
        .trim_end()
        .split_once('\t')
        .expect("output line is `<input>\\t<identifier>`");
    assert_eq!(PathBuf::from(input), input_path);

    let actual = std::fs::read_to_string(output_dir.path().join(id))
        .expect("result file exists under the printed identifier");
    assert_eq!(actual, expected);
}

#[test]
fn failing_input_sets_exit_code() {
    let output_dir = tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sales-summary"))
        .arg(fixture_path("sales.csv"))
        .arg(fixture_path("does_not_exist.csv"))
        .env("SALES_OUTPUT_DIR", output_dir.path())
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
    // the valid input is still processed
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert_eq!(std::fs::read_dir(output_dir.path()).unwrap().count(), 1);
}

#[test]
fn missing_arguments_is_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_sales-summary"))
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

/// Returns the absolute path to a test fixture file in `tests/data/`.
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}
