use shopfloor_db::{create_pool, DbPoolConfig, MIGRATOR};
use shopfloor_store::{JobAttributes, JobStatus, JobStore, StatusFields, StoreError};
use uuid::Uuid;

async fn store() -> JobStore {
    // A single connection keeps the in-memory database shared across queries.
    let mut cfg = DbPoolConfig::new("sqlite::memory:");
    cfg.max_connections = 1;
    let pool = create_pool(&cfg).await.expect("create pool");
    MIGRATOR.run(&pool).await.expect("run migrations");
    JobStore::new(pool)
}

async fn sample_program(store: &JobStore, name: &str) -> Uuid {
    store
        .register_program(name, "G0 X0 Y0\nG1 X10 Y10", Some(30))
        .await
        .expect("register program")
        .id
}

#[tokio::test]
async fn enqueue_rejects_missing_program() {
    let store = store().await;
    let missing = Uuid::new_v4();
    let err = store
        .enqueue(missing, None, JobAttributes::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ProgramNotFound(id) if id == missing));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 0, "rejected enqueue must not create a row");
}

#[tokio::test]
async fn enqueue_defaults_and_attributes() {
    let store = store().await;
    let program = sample_program(&store, "bracket").await;

    let attrs = JobAttributes {
        operator_name: Some("A. Smith".into()),
        heat_number: Some("H-4711".into()),
        cut_type: Some("plasma".into()),
        thickness: Some("8mm".into()),
        material: Some("S355".into()),
    };
    let job = store.enqueue(program, None, attrs).await.unwrap();

    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.priority, 100);
    assert_eq!(job.operator_name.as_deref(), Some("A. Smith"));
    assert_eq!(job.heat_number.as_deref(), Some("H-4711"));
    assert_eq!(job.material.as_deref(), Some("S355"));
    assert!(job.started_at.is_none());
    assert!(job.finished_at.is_none());
    assert!(job.error_message.is_none());
}

#[tokio::test]
async fn next_queued_orders_by_priority_then_queued_at_then_id() {
    let store = store().await;
    let program = sample_program(&store, "plate").await;

    let low = store
        .enqueue(program, Some(200), JobAttributes::default())
        .await
        .unwrap();
    let urgent = store
        .enqueue(program, Some(1), JobAttributes::default())
        .await
        .unwrap();
    let tie_a = store
        .enqueue(program, Some(50), JobAttributes::default())
        .await
        .unwrap();
    let tie_b = store
        .enqueue(program, Some(50), JobAttributes::default())
        .await
        .unwrap();

    // The urgent job wins while it stays queued.
    assert_eq!(store.next_queued().await.unwrap().unwrap().id, urgent.id);
    store.cancel(urgent.id).await.unwrap();

    // Equal priorities fall back to queued_at.
    let next = store.next_queued().await.unwrap().unwrap();
    assert_eq!(next.id, tie_a.id);

    // With identical queued_at the smallest id wins.
    sqlx::query("UPDATE jobs SET queued_at = ? WHERE id IN (?, ?)")
        .bind("2026-01-01T00:00:00.000000+00:00")
        .bind(tie_a.id)
        .bind(tie_b.id)
        .execute(store.pool())
        .await
        .unwrap();
    let next = store.next_queued().await.unwrap().unwrap();
    let expected = std::cmp::min(tie_a.id, tie_b.id);
    assert_eq!(next.id, expected);

    // The low-priority job is only ever last.
    assert_ne!(next.id, low.id);
}

#[tokio::test]
async fn next_queued_is_recomputed_after_reorder() {
    let store = store().await;
    let program = sample_program(&store, "gusset").await;

    let a = store.enqueue(program, Some(10), JobAttributes::default()).await.unwrap();
    let b = store.enqueue(program, Some(20), JobAttributes::default()).await.unwrap();
    let c = store.enqueue(program, Some(30), JobAttributes::default()).await.unwrap();

    assert_eq!(store.next_queued().await.unwrap().unwrap().id, a.id);

    store.reorder(&[c.id, a.id, b.id]).await.unwrap();

    assert_eq!(store.next_queued().await.unwrap().unwrap().id, c.id);
    assert_eq!(store.get_job(c.id).await.unwrap().priority, 1);
    assert_eq!(store.get_job(a.id).await.unwrap().priority, 2);
    assert_eq!(store.get_job(b.id).await.unwrap().priority, 3);
}

#[tokio::test]
async fn reorder_with_unknown_id_applies_nothing() {
    let store = store().await;
    let program = sample_program(&store, "rib").await;

    let a = store.enqueue(program, Some(10), JobAttributes::default()).await.unwrap();
    let b = store.enqueue(program, Some(20), JobAttributes::default()).await.unwrap();

    let err = store
        .reorder(&[a.id, Uuid::new_v4(), b.id])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::JobNotFound(_)));

    // No partially-applied priorities.
    assert_eq!(store.get_job(a.id).await.unwrap().priority, 10);
    assert_eq!(store.get_job(b.id).await.unwrap().priority, 20);
}

#[tokio::test]
async fn reorder_rejects_duplicates_and_empty_input() {
    let store = store().await;
    let program = sample_program(&store, "flange").await;
    let a = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    assert!(matches!(
        store.reorder(&[]).await.unwrap_err(),
        StoreError::Validation(_)
    ));
    assert!(matches!(
        store.reorder(&[a.id, a.id]).await.unwrap_err(),
        StoreError::Validation(_)
    ));
    assert_eq!(store.get_job(a.id).await.unwrap().priority, 100);
}

#[tokio::test]
async fn claim_stamps_started_at_and_machine_and_clears_error() {
    let store = store().await;
    let program = sample_program(&store, "shim").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    // Leftover message from a previous life of the row.
    sqlx::query("UPDATE jobs SET error_message = 'stale' WHERE id = ?")
        .bind(job.id)
        .execute(store.pool())
        .await
        .unwrap();

    let claimed = store
        .set_status(job.id, JobStatus::Running, StatusFields::machine("MockCNC-01"))
        .await
        .unwrap();
    assert_eq!(claimed.status, JobStatus::Running);
    assert_eq!(claimed.machine_name.as_deref(), Some("MockCNC-01"));
    assert!(claimed.started_at.is_some());
    assert!(claimed.error_message.is_none());
    assert!(claimed.finished_at.is_none());
}

#[tokio::test]
async fn completion_stamps_finished_at() {
    let store = store().await;
    let program = sample_program(&store, "panel").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    store
        .set_status(job.id, JobStatus::Running, StatusFields::machine("MockCNC-01"))
        .await
        .unwrap();
    let done = store
        .set_status(job.id, JobStatus::Completed, StatusFields::none())
        .await
        .unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert!(done.finished_at.is_some());
    assert!(done.error_message.is_none());
}

#[tokio::test]
async fn terminal_write_keeps_prior_message_when_none_supplied() {
    let store = store().await;
    let program = sample_program(&store, "stringer").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();
    store
        .set_status(job.id, JobStatus::Running, StatusFields::machine("MockCNC-01"))
        .await
        .unwrap();

    sqlx::query("UPDATE jobs SET error_message = 'torch misfire' WHERE id = ?")
        .bind(job.id)
        .execute(store.pool())
        .await
        .unwrap();

    let failed = store
        .set_status(job.id, JobStatus::Failed, StatusFields::none())
        .await
        .unwrap();
    assert_eq!(failed.error_message.as_deref(), Some("torch misfire"));
}

#[tokio::test]
async fn cancel_is_terminal_with_message() {
    let store = store().await;
    let program = sample_program(&store, "keel").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    let canceled = store.cancel(job.id).await.unwrap();
    assert_eq!(canceled.status, JobStatus::Canceled);
    assert_eq!(canceled.error_message.as_deref(), Some("canceled by operator"));
    assert!(canceled.finished_at.is_some());

    // Terminal: nothing else is accepted.
    assert!(matches!(
        store.cancel(job.id).await.unwrap_err(),
        StoreError::InvalidTransition { .. }
    ));
    assert!(matches!(
        store.resume(job.id).await.unwrap_err(),
        StoreError::InvalidTransition { .. }
    ));
}

#[tokio::test]
async fn invalid_transition_is_a_noop() {
    let store = store().await;
    let program = sample_program(&store, "spar").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();
    store
        .set_status(job.id, JobStatus::Running, StatusFields::machine("MockCNC-01"))
        .await
        .unwrap();
    store
        .set_status(job.id, JobStatus::Completed, StatusFields::none())
        .await
        .unwrap();
    let before = store.get_job(job.id).await.unwrap();

    let err = store.pause(job.id).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidTransition {
            from: JobStatus::Completed,
            to: JobStatus::Paused,
        }
    ));

    let after = store.get_job(job.id).await.unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.finished_at, before.finished_at);
    assert_eq!(after.error_message, before.error_message);
    assert_eq!(after.priority, before.priority);
}

#[tokio::test]
async fn pause_requires_running_and_resume_requires_paused() {
    let store = store().await;
    let program = sample_program(&store, "deck").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    // Queued jobs cannot be paused.
    assert!(matches!(
        store.pause(job.id).await.unwrap_err(),
        StoreError::InvalidTransition { .. }
    ));

    store
        .set_status(job.id, JobStatus::Running, StatusFields::machine("MockCNC-01"))
        .await
        .unwrap();
    let paused = store.pause(job.id).await.unwrap();
    assert_eq!(paused.status, JobStatus::Paused);

    let resumed = store.resume(job.id).await.unwrap();
    assert_eq!(resumed.status, JobStatus::Queued, "resume re-enters the queue");
    assert_eq!(resumed.priority, 100, "resume keeps the existing priority");

    // Resuming a non-paused job is rejected.
    assert!(matches!(
        store.resume(job.id).await.unwrap_err(),
        StoreError::InvalidTransition { .. }
    ));
}

#[tokio::test]
async fn status_of_reflects_latest_write() {
    let store = store().await;
    let program = sample_program(&store, "frame").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    assert_eq!(store.status_of(job.id).await.unwrap(), Some(JobStatus::Queued));
    store.cancel(job.id).await.unwrap();
    assert_eq!(store.status_of(job.id).await.unwrap(), Some(JobStatus::Canceled));
    assert_eq!(store.status_of(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn traceability_setters_overwrite_and_clear() {
    let store = store().await;
    let program = sample_program(&store, "hatch").await;
    let job = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    let job = store.set_heat_number(job.id, Some("H-1")).await.unwrap();
    assert_eq!(job.heat_number.as_deref(), Some("H-1"));
    let job = store.set_heat_number(job.id, None).await.unwrap();
    assert!(job.heat_number.is_none());

    let job = store.set_operator(job.id, Some("B. Jones")).await.unwrap();
    assert_eq!(job.operator_name.as_deref(), Some("B. Jones"));

    // Setters ignore execution state entirely.
    store.cancel(job.id).await.unwrap();
    let job = store.set_operator(job.id, Some("C. Lee")).await.unwrap();
    assert_eq!(job.operator_name.as_deref(), Some("C. Lee"));

    assert!(matches!(
        store.set_operator(Uuid::new_v4(), None).await.unwrap_err(),
        StoreError::JobNotFound(_)
    ));
}

#[tokio::test]
async fn duplicate_copies_priority_and_attributes() {
    let store = store().await;
    let program = sample_program(&store, "cowl").await;
    let attrs = JobAttributes {
        operator_name: Some("D. Park".into()),
        heat_number: Some("H-9".into()),
        cut_type: Some("laser".into()),
        thickness: None,
        material: Some("AlMg3".into()),
    };
    let original = store.enqueue(program, Some(7), attrs).await.unwrap();
    store.cancel(original.id).await.unwrap();

    let copy = store.duplicate(original.id).await.unwrap();
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.status, JobStatus::Queued);
    assert_eq!(copy.priority, 7);
    assert_eq!(copy.operator_name.as_deref(), Some("D. Park"));
    assert_eq!(copy.heat_number.as_deref(), Some("H-9"));
    assert_eq!(copy.material.as_deref(), Some("AlMg3"));
    assert!(copy.error_message.is_none());
}

#[tokio::test]
async fn archive_lists_terminal_jobs_with_search() {
    let store = store().await;
    let bracket = sample_program(&store, "bracket-v2").await;
    let plate = sample_program(&store, "baseplate").await;

    let done = store.enqueue(bracket, None, JobAttributes::default()).await.unwrap();
    store
        .set_status(done.id, JobStatus::Running, StatusFields::machine("MockCNC-01"))
        .await
        .unwrap();
    store
        .set_status(done.id, JobStatus::Completed, StatusFields::none())
        .await
        .unwrap();

    let canceled = store.enqueue(plate, None, JobAttributes::default()).await.unwrap();
    store.cancel(canceled.id).await.unwrap();

    let still_queued = store.enqueue(plate, None, JobAttributes::default()).await.unwrap();

    let all = store.list_archive(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|j| j.job.status.is_terminal()));
    assert!(all.iter().all(|j| j.job.id != still_queued.id));

    let filtered = store.list_archive(Some("bracket")).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].job.id, done.id);
    assert_eq!(filtered[0].program_name, "bracket-v2");
}

#[tokio::test]
async fn summary_counts_by_status_and_averages_durations() {
    let store = store().await;
    let program = sample_program(&store, "liner").await;

    let a = store.enqueue(program, None, JobAttributes::default()).await.unwrap();
    let _b = store.enqueue(program, None, JobAttributes::default()).await.unwrap();

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.by_status.get("queued"), Some(&2));
    assert_eq!(summary.avg_duration_seconds, None);

    store
        .set_status(a.id, JobStatus::Running, StatusFields::machine("MockCNC-01"))
        .await
        .unwrap();
    // Pin the run window so the average is exact.
    sqlx::query("UPDATE jobs SET started_at = '2026-01-01T00:00:00.000000+00:00' WHERE id = ?")
        .bind(a.id)
        .execute(store.pool())
        .await
        .unwrap();
    store
        .set_status(a.id, JobStatus::Completed, StatusFields::none())
        .await
        .unwrap();
    sqlx::query("UPDATE jobs SET finished_at = '2026-01-01T00:00:12.000000+00:00' WHERE id = ?")
        .bind(a.id)
        .execute(store.pool())
        .await
        .unwrap();

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.by_status.get("queued"), Some(&1));
    assert_eq!(summary.by_status.get("completed"), Some(&1));
    assert_eq!(summary.avg_duration_seconds, Some(12.0));
}
