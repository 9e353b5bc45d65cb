use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shopfloor_db::{create_pool, DbPoolConfig, MIGRATOR};
use shopfloor_machine::{
    ControlProbe, MachineAdapter, MachineError, MockMachineAdapter,
};
use shopfloor_store::{JobAttributes, JobStatus, JobStore};
use shopfloor_worker::QueueWorker;
use uuid::Uuid;

async fn store() -> JobStore {
    let mut cfg = DbPoolConfig::new("sqlite::memory:");
    cfg.max_connections = 1;
    let pool = create_pool(&cfg).await.expect("create pool");
    MIGRATOR.run(&pool).await.expect("run migrations");
    JobStore::new(pool)
}

fn fast_adapter() -> Arc<dyn MachineAdapter> {
    Arc::new(MockMachineAdapter::new().with_poll_interval(Duration::from_millis(10)))
}

/// Enqueue a job against a fresh one-second program.
async fn one_second_job(store: &JobStore, name: &str) -> Uuid {
    let program = store
        .register_program(name, "G0 X0", Some(1))
        .await
        .expect("register program");
    store
        .enqueue(program.id, None, JobAttributes::default())
        .await
        .expect("enqueue")
        .id
}

async fn wait_for(
    store: &JobStore,
    id: Uuid,
    pred: impl Fn(JobStatus) -> bool,
) -> JobStatus {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let status = store.status_of(id).await.expect("status read").expect("job exists");
        if pred(status) {
            return status;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting; last status {status}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn idle_cycle_runs_nothing() {
    let store = store().await;
    let worker = QueueWorker::new(store.clone(), fast_adapter());
    assert!(!worker.process_once().await.expect("cycle"));
}

#[tokio::test]
async fn job_runs_to_completion_with_stamps() {
    let store = store().await;
    let id = one_second_job(&store, "square").await;

    let worker = QueueWorker::new(store.clone(), fast_adapter());
    assert!(worker.process_once().await.expect("cycle"));

    let job = store.get_job(id).await.expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.machine_name.as_deref(), Some("MockCNC-01"));
    assert!(job.started_at.is_some());
    assert!(job.finished_at.is_some());
    assert!(job.error_message.is_none());
}

#[tokio::test]
async fn jobs_run_in_priority_order() {
    let store = store().await;
    let program = store
        .register_program("order", "G0 X0", Some(1))
        .await
        .expect("register");
    let later = store
        .enqueue(program.id, Some(50), JobAttributes::default())
        .await
        .expect("enqueue");
    let first = store
        .enqueue(program.id, Some(1), JobAttributes::default())
        .await
        .expect("enqueue");

    let worker = QueueWorker::new(store.clone(), fast_adapter());
    assert!(worker.process_once().await.expect("cycle"));

    assert_eq!(
        store.status_of(first.id).await.expect("status"),
        Some(JobStatus::Completed)
    );
    assert_eq!(
        store.status_of(later.id).await.expect("status"),
        Some(JobStatus::Queued)
    );

    assert!(worker.process_once().await.expect("cycle"));
    assert_eq!(
        store.status_of(later.id).await.expect("status"),
        Some(JobStatus::Completed)
    );
}

#[tokio::test]
async fn cancel_while_running_ends_canceled_not_failed() {
    let store = store().await;
    let program = store
        .register_program("long-cut", "G0 X0", Some(5))
        .await
        .expect("register");
    let job = store
        .enqueue(program.id, None, JobAttributes::default())
        .await
        .expect("enqueue");

    let handle = QueueWorker::new(store.clone(), fast_adapter())
        .with_poll_interval(Duration::from_millis(20))
        .spawn();

    wait_for(&store, job.id, |s| s == JobStatus::Running).await;
    store.cancel(job.id).await.expect("cancel");
    let status = wait_for(&store, job.id, |s| s.is_terminal()).await;
    assert_eq!(status, JobStatus::Canceled);

    let row = store.get_job(job.id).await.expect("job");
    assert_eq!(row.error_message.as_deref(), Some("canceled by operator"));
    assert!(row.finished_at.is_some());

    handle.shutdown().await;
}

#[tokio::test]
async fn pause_holds_and_resume_completes() {
    let store = store().await;
    let program = store
        .register_program("held-cut", "G0 X0", Some(2))
        .await
        .expect("register");
    let job = store
        .enqueue(program.id, None, JobAttributes::default())
        .await
        .expect("enqueue");

    let handle = QueueWorker::new(store.clone(), fast_adapter())
        .with_poll_interval(Duration::from_millis(20))
        .spawn();

    wait_for(&store, job.id, |s| s == JobStatus::Running).await;
    store.pause(job.id).await.expect("pause");
    wait_for(&store, job.id, |s| s == JobStatus::Paused).await;

    // Held: the job stays paused rather than drifting to a terminal state.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(
        store.status_of(job.id).await.expect("status"),
        Some(JobStatus::Paused)
    );

    store.resume(job.id).await.expect("resume");
    let status = wait_for(&store, job.id, |s| s.is_terminal()).await;
    assert_eq!(status, JobStatus::Completed);

    handle.shutdown().await;
}

/// Faults on the first run, then behaves.
struct FlakyAdapter {
    inner: MockMachineAdapter,
    runs: AtomicUsize,
}

#[async_trait]
impl MachineAdapter for FlakyAdapter {
    fn machine_name(&self) -> &str {
        self.inner.machine_name()
    }

    fn estimate_duration(&self, explicit_secs: Option<i64>, code_text: &str) -> Duration {
        self.inner.estimate_duration(explicit_secs, code_text)
    }

    async fn execute(
        &self,
        duration: Duration,
        probe: &dyn ControlProbe,
    ) -> Result<(), MachineError> {
        if self.runs.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(MachineError::Fault("spindle overload".into()));
        }
        self.inner.execute(duration, probe).await
    }
}

#[tokio::test]
async fn worker_survives_a_machine_fault() {
    let store = store().await;
    let first = one_second_job(&store, "fault-first").await;
    let second = one_second_job(&store, "fault-second").await;

    let adapter = Arc::new(FlakyAdapter {
        inner: MockMachineAdapter::new().with_poll_interval(Duration::from_millis(10)),
        runs: AtomicUsize::new(0),
    });
    let handle = QueueWorker::new(store.clone(), adapter)
        .with_poll_interval(Duration::from_millis(20))
        .spawn();

    let status = wait_for(&store, first, |s| s.is_terminal()).await;
    assert_eq!(status, JobStatus::Failed);
    assert_eq!(
        store
            .get_job(first)
            .await
            .expect("job")
            .error_message
            .as_deref(),
        Some("spindle overload")
    );

    // The loop keeps going and runs the next job cleanly.
    let status = wait_for(&store, second, |s| s.is_terminal()).await;
    assert_eq!(status, JobStatus::Completed);

    handle.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_the_polling_loop() {
    let store = store().await;
    let handle = QueueWorker::new(store.clone(), fast_adapter())
        .with_poll_interval(Duration::from_millis(20))
        .spawn();
    handle.shutdown().await;

    // A job enqueued after shutdown is never picked up.
    let id = one_second_job(&store, "after-stop").await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        store.status_of(id).await.expect("status"),
        Some(JobStatus::Queued)
    );
}
