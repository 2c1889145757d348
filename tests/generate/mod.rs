//! This module contains scripts which are used to generate the inputs used for benchmarking. They are implemented as ignored tests to enable running them comfortably

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

const SEED: u64 = 20231001;
const DEPARTMENTS: [&str; 5] = ["Electronics", "Clothing", "Home", "Garden", "Sports"];

/// About 15 MB of input: 15 000 lines per MB.
const ROWS: u64 = 15 * 15_000;

/// Writes `tests/data/benchmark.csv` with a header and deterministic pseudo-random rows.
///
/// Regenerate with:
/// `cargo nextest run --run-ignored only generate_benchmark_fixture`
#[test]
#[ignore]
fn generate_benchmark_fixture() {
    let path = data_dir().join("benchmark.csv");
    let file =
        File::create(&path).unwrap_or_else(|e| panic!("failed to create {}: {e}", path.display()));
    let mut out = BufWriter::new(file);

    writeln!(out, "department,date,sales").unwrap();
    let mut state = SEED;
    for _ in 0..ROWS {
        let department = DEPARTMENTS[(next(&mut state) % DEPARTMENTS.len() as u64) as usize];
        let month = next(&mut state) % 12 + 1;
        let day = next(&mut state) % 28 + 1;
        let sales = next(&mut state) % 1000;
        writeln!(out, "{department},2023-{month:02}-{day:02},{sales}").unwrap();
    }
    out.flush().unwrap();

    eprintln!("  wrote {} ({ROWS} rows)", path.display());
}

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
}

// splitmix64, stable across platforms so the fixture is reproducible
fn next(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
