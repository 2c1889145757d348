//! Module focusing on the way processing jobs are handed from the submitter to dedicated worker threads

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TryRecvError},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{info, warn};

use crate::{
    Error,
    engine::{self, PipelineOptions},
    output::{OutputId, ResultStore},
};


/// Terminal result of a job.
pub type JobOutcome = Result<OutputId, Error>;

type Pipeline = dyn Fn(&Path, &ResultStore, PipelineOptions) -> JobOutcome + Send + Sync;

/// Sequence number of a job within its runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle of a job: `Pending → Running → Succeeded | Failed`. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

///
/// Runs the pipeline for submitted inputs on a fixed set of worker threads.
///
/// Submitting never waits for processing, so one large input cannot hold up other submissions.
/// Each job owns its own aggregation state; workers only share the result store, whose entries
/// never collide. Dropping the runner stops accepting work, lets the workers drain the queue and
/// joins them.
///
pub struct JobRunner {
    queue: Option<Sender<QueuedJob>>,
    workers: Vec<JoinHandle<()>>,
    next_id: AtomicU64,
}

impl JobRunner {
    /// Spawns `workers` threads (at least one) processing files into `store`.
    pub fn new(
        store: ResultStore,
        workers: usize,
        options: PipelineOptions,
    ) -> std::io::Result<Self> {
        Self::with_pipeline(store, workers, options, engine::process_file)
    }

    pub(crate) fn with_pipeline(
        store: ResultStore,
        workers: usize,
        options: PipelineOptions,
        pipeline: impl Fn(&Path, &ResultStore, PipelineOptions) -> JobOutcome + Send + Sync + 'static,
    ) -> std::io::Result<Self> {
        let (queue, jobs) = mpsc::channel::<QueuedJob>();
        let jobs = Arc::new(Mutex::new(jobs));
        let pipeline: Arc<Pipeline> = Arc::new(pipeline);

        let workers = (0..workers.max(1))
            .map(|idx| {
                let jobs = Arc::clone(&jobs);
                let pipeline = Arc::clone(&pipeline);
                let store = store.clone();
                thread::Builder::new()
                    .name(format!("sales-worker-{idx}"))
                    .spawn(move || worker_loop(&jobs, &*pipeline, &store, options))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        Ok(Self {
            queue: Some(queue),
            workers,
            next_id: AtomicU64::new(1),
        })
    }

    /// Queues the input for processing and returns immediately.
    pub fn submit(&self, input: impl Into<PathBuf>) -> JobHandle {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (job, handle) = new_job(id, input.into());

        if let Some(queue) = &self.queue {
            // Send fails only if every worker is gone; the dropped job then reports as aborted.
            let _ = queue.send(job);
        }
        handle
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for JobRunner {
    fn drop(&mut self) {
        // Closing the queue ends the worker loops once the pending jobs are done
        drop(self.queue.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker thread terminated abnormally");
            }
        }
    }
}

/// The submitter's view of a job: its status and its single outcome.
///
/// Dropping the handle abandons the job without affecting it; the result, if any, stays
/// resolvable through the [`ResultStore`].
pub struct JobHandle {
    id: JobId,
    input: PathBuf,
    status: Arc<Mutex<JobStatus>>,
    receiver: Receiver<JobOutcome>,
    outcome: Option<JobOutcome>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn status(&self) -> JobStatus {
        *lock(&self.status)
    }

    /// Returns the outcome if the job has finished, without blocking.
    pub fn try_wait(&mut self) -> Option<&JobOutcome> {
        if self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.outcome = Some(self.aborted()),
            }
        }
        self.outcome.as_ref()
    }

    /// Waits at most `timeout` for the outcome.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<&JobOutcome> {
        if self.outcome.is_none() {
            match self.receiver.recv_timeout(timeout) {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.outcome = Some(self.aborted()),
            }
        }
        self.outcome.as_ref()
    }

    /// Blocks until the job has finished.
    pub fn wait(mut self) -> JobOutcome {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        self.receiver.recv().unwrap_or_else(|_| self.aborted())
    }

    // The worker went away without reporting
    fn aborted(&self) -> JobOutcome {
        transition(&self.status, JobStatus::Failed);
        Err(Error::ExecutionAborted(format!(
            "{} ended without reporting an outcome",
            self.id
        )))
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("input", &self.input)
            .field("status", &self.status())
            .finish()
    }
}

/// The worker's side of a job
struct QueuedJob {
    id: JobId,
    input: PathBuf,
    status: Arc<Mutex<JobStatus>>,
    outcome: SyncSender<JobOutcome>,
}

fn new_job(id: JobId, input: PathBuf) -> (QueuedJob, JobHandle) {
    let status = Arc::new(Mutex::new(JobStatus::Pending));
    let (outcome, receiver) = mpsc::sync_channel(1);

    let job = QueuedJob {
        id,
        input: input.clone(),
        status: Arc::clone(&status),
        outcome,
    };
    let handle = JobHandle {
        id,
        input,
        status,
        receiver,
        outcome: None,
    };
    (job, handle)
}

fn worker_loop(
    jobs: &Mutex<Receiver<QueuedJob>>,
    pipeline: &Pipeline,
    store: &ResultStore,
    options: PipelineOptions,
) {
    loop {
        // The guard is released before the job runs so the other workers can pick up work
        let next = lock(jobs).recv();
        let Ok(job) = next else {
            break;
        };
        run_job(job, pipeline, store, options);
    }
}

fn run_job(job: QueuedJob, pipeline: &Pipeline, store: &ResultStore, options: PipelineOptions) {
    let QueuedJob {
        id,
        input,
        status,
        outcome,
    } = job;

    transition(&status, JobStatus::Running);
    info!(job = %id, input = %input.display(), "job started");

    let result = panic::catch_unwind(AssertUnwindSafe(|| pipeline(&input, store, options)))
        .unwrap_or_else(|payload| Err(Error::ExecutionAborted(panic_message(payload.as_ref()))));

    match &result {
        Ok(output) => {
            info!(job = %id, output = %output, "job succeeded");
            transition(&status, JobStatus::Succeeded);
        }
        Err(e) => {
            warn!(job = %id, kind = %e.kind(), "job failed: {e}");
            transition(&status, JobStatus::Failed);
        }
    }

    // Send fails only if the submitter dropped its handle; the result stays addressable by identifier.
    let _ = outcome.send(result);
}

/// Applies a lifecycle step. Returns `false`, leaving the status untouched, for any step out of a
/// terminal state or backwards.
fn transition(status: &Mutex<JobStatus>, next: JobStatus) -> bool {
    let mut current = lock(status);
    let allowed = matches!(
        (*current, next),
        (JobStatus::Pending, JobStatus::Running)
            | (JobStatus::Pending, JobStatus::Failed)
            | (JobStatus::Running, JobStatus::Succeeded)
            | (JobStatus::Running, JobStatus::Failed)
    );
    if allowed {
        *current = next;
    }
    allowed
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("pipeline panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("pipeline panicked: {msg}")
    } else {
        "pipeline panicked".to_string()
    }
}
