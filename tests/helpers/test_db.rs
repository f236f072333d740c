use printkiosk::database::Database;
use printkiosk::models::{Job, JobStatus};
use std::path::PathBuf;
use uuid::Uuid;

/// File-based SQLite with a unique name per test so tests can run in
/// parallel. Schema comes from the real migrations.
pub async fn setup_test_db() -> Database {
    let temp_file = std::env::temp_dir().join(format!("printkiosk_test_{}.db", Uuid::new_v4()));
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.display());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}

/// Insert a job directly in the given state, bypassing the API surface.
pub async fn seed_job(db: &Database, status: JobStatus, file_path: &str, page_count: i64) -> Job {
    let mut job = Job::new(
        format!("fixture-{}", Uuid::new_v4()),
        file_path.to_string(),
        page_count,
    );
    job.status = status;

    db.create_job(&job).await.expect("Failed to insert job");
    job
}

/// Configure a seeded job and advance it to `payment_pending` with the
/// given gateway reference.
pub async fn configure_job(
    db: &Database,
    job_id: &str,
    copies: i64,
    page_range: &str,
    duplex: bool,
    gateway_link_id: &str,
) {
    let applied = db
        .apply_print_settings(job_id, copies, page_range, duplex, 10.0, gateway_link_id)
        .await
        .expect("Failed to apply settings");
    assert!(applied, "settings should apply to a fresh job");
}

/// A scratch directory for upload/conversion artifacts.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("printkiosk_scratch_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}
