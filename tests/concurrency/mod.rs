//! Integration tests running several jobs at once

use std::{fs, path::PathBuf, thread};

use sales_summary::{JobRunner, JobStatus, PipelineOptions, ResultStore};
use tempfile::tempdir;

/// Builds an input where department `Dept-<n>` appears `rows` times with amount `n`.
fn input_for(n: usize, rows: usize) -> String {
    (0..rows)
        .map(|i| format!("Dept-{n},2023-01-{:02},{n}\nShared,2023-01-01,{n}\n", i % 28 + 1))
        .collect()
}

#[test]
fn concurrent_jobs_keep_independent_totals() {
    let dir = tempdir().unwrap();
    let store = ResultStore::new(dir.path().join("results")).unwrap();
    let runner = JobRunner::new(store.clone(), 4, PipelineOptions::default()).unwrap();

    let rows = 2_000;
    let inputs: Vec<PathBuf> = (1..=8)
        .map(|n| {
            let path = dir.path().join(format!("input-{n}.csv"));
            fs::write(&path, input_for(n, rows)).unwrap();
            path
        })
        .collect();

    let handles: Vec<_> = inputs.iter().map(|input| runner.submit(input)).collect();

    for (n, handle) in (1..=8).zip(handles) {
        let id = handle.wait().expect("job succeeds");
        let content = fs::read_to_string(store.resolve(id.as_str()).unwrap()).unwrap();
        let total = n * rows;
        assert_eq!(
            content,
            format!("department,totalSales\nDept-{n},{total}\nShared,{total}\n")
        );
    }
}

#[test]
fn submissions_from_several_threads() {
    let dir = tempdir().unwrap();
    let store = ResultStore::new(dir.path().join("results")).unwrap();
    let runner = JobRunner::new(store.clone(), 2, PipelineOptions::default()).unwrap();

    let outputs: Vec<(usize, String)> = thread::scope(|s| {
        let submitters: Vec<_> = (1..=4)
            .map(|n| {
                let runner = &runner;
                let path = dir.path().join(format!("thread-{n}.csv"));
                s.spawn(move || {
                    fs::write(&path, input_for(n, 10)).unwrap();
                    let mut handle = runner.submit(&path);
                    while handle.try_wait().is_none() {
                        thread::yield_now();
                    }
                    assert_eq!(handle.status(), JobStatus::Succeeded);
                    (n, handle.wait().unwrap().to_string())
                })
            })
            .collect();
        submitters.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(fs::read_dir(store.dir()).unwrap().count(), 4);
    for (n, id) in outputs {
        let content = fs::read_to_string(store.resolve(&id).unwrap()).unwrap();
        assert!(content.contains(&format!("Dept-{n},{}", n * 10)), "{content}");
    }
}
