use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::{
    api::middleware::error::ApiResult,
    models::{Job, JobStatus, PricingRule},
};

/// The job store: the single source of truth for every job record. All
/// status transitions go through guarded conditional UPDATEs so that a
/// stale writer loses instead of regressing state.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        // Enable foreign keys for SQLite
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> ApiResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ========== Job operations ==========

    pub async fn create_job(&self, job: &Job) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO jobs (id, filename, file_path, converted_path, page_count, copies,
                               page_range, duplex, status, total_cost, gateway_link_id,
                               print_job_id, failure_reason, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&job.id)
        .bind(&job.filename)
        .bind(&job.file_path)
        .bind(&job.converted_path)
        .bind(job.page_count)
        .bind(job.copies)
        .bind(&job.page_range)
        .bind(job.duplex)
        .bind(job.status.as_str())
        .bind(job.total_cost)
        .bind(&job.gateway_link_id)
        .bind(job.print_job_id)
        .bind(&job.failure_reason)
        .bind(&job.created_at)
        .execute(&self.pool)
        .await?;

        tracing::info!("Job created: id={}, filename={}", job.id, job.filename);
        Ok(())
    }

    pub async fn get_job_by_id(&self, id: &str) -> ApiResult<Option<Job>> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| job_from_row(&r)).transpose().map_err(Into::into)
    }

    pub async fn get_job_by_gateway_reference(&self, link_id: &str) -> ApiResult<Option<Job>> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE gateway_link_id = ?"
        ))
        .bind(link_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| job_from_row(&r)).transpose().map_err(Into::into)
    }

    /// Most recently created job, whatever its state. Drives the kiosk
    /// display's coarse machine status.
    pub async fn latest_job(&self) -> ApiResult<Option<Job>> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| job_from_row(&r)).transpose().map_err(Into::into)
    }

    /// Persist confirmed print settings, the computed cost and the payment
    /// reference, moving the job to `payment_pending`. Allowed while the
    /// job has not been paid yet; re-confirmation replaces the old payment
    /// link. Returns false if the job was already past that point.
    pub async fn apply_print_settings(
        &self,
        id: &str,
        copies: i64,
        page_range: &str,
        duplex: bool,
        total_cost: f64,
        gateway_link_id: &str,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs
             SET copies = ?, page_range = ?, duplex = ?, total_cost = ?,
                 gateway_link_id = ?, status = 'payment_pending'
             WHERE id = ? AND status IN ('uploaded', 'payment_pending')",
        )
        .bind(copies)
        .bind(page_range)
        .bind(duplex)
        .bind(total_cost)
        .bind(gateway_link_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The single `payment_pending -> paid` compare-and-swap. Both the
    /// webhook handler and the status poll converge here; a duplicate
    /// confirmation simply affects zero rows.
    pub async fn mark_paid_by_reference(&self, link_id: &str) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'paid'
             WHERE gateway_link_id = ? AND status = 'payment_pending'",
        )
        .bind(link_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically claim the oldest `paid` job by marking it `processing`
    /// and returning the claimed row. At most one job is ever claimed per
    /// call; `None` means nothing is waiting.
    pub async fn claim_next_paid_job(&self) -> ApiResult<Option<Job>> {
        let row = sqlx::query(&format!(
            "UPDATE jobs SET status = 'processing'
             WHERE id = (SELECT id FROM jobs WHERE status = 'paid'
                         ORDER BY created_at ASC, id ASC LIMIT 1)
             RETURNING {JOB_COLUMNS}"
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| job_from_row(&r)).transpose().map_err(Into::into)
    }

    /// Record the converted document and advance `processing -> printing`.
    pub async fn mark_printing(&self, id: &str, converted_path: &str) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'printing', converted_path = ?
             WHERE id = ? AND status = 'processing'",
        )
        .bind(converted_path)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record the print-subsystem job id and advance `printing -> completed`.
    pub async fn mark_completed(&self, id: &str, print_job_id: i64) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'completed', print_job_id = ?
             WHERE id = ? AND status = 'printing'",
        )
        .bind(print_job_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Land an in-flight job on a terminal failure state, preserving the
    /// cause for operator diagnosis. Only `processing`/`printing` jobs can
    /// fail this way, so a terminal state is never overwritten.
    pub async fn mark_failed(&self, id: &str, status: JobStatus, reason: &str) -> ApiResult<bool> {
        debug_assert!(matches!(
            status,
            JobStatus::FailedConversion | JobStatus::FailedPrinter | JobStatus::Failed
        ));

        let result = sqlx::query(
            "UPDATE jobs SET status = ?, failure_reason = ?
             WHERE id = ? AND status IN ('processing', 'printing')",
        )
        .bind(status.as_str())
        .bind(reason)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Startup sweep: any job left in `processing`/`printing` was orphaned
    /// by a crash mid-attempt and cannot be safely resumed. Demote it to
    /// `failed` so the customer/operator retries explicitly.
    pub async fn recover_stale_jobs(&self) -> ApiResult<u64> {
        let result = sqlx::query(
            "UPDATE jobs
             SET status = 'failed',
                 failure_reason = 'interrupted by a restart before finishing'
             WHERE status IN ('processing', 'printing')",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // ========== Pricing operations ==========

    pub async fn list_pricing_rules(&self) -> ApiResult<Vec<PricingRule>> {
        let rows = sqlx::query(
            "SELECT id, min_pages, max_pages, price_per_page
             FROM pricing_rules
             ORDER BY min_pages ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(PricingRule {
                id: row.try_get("id")?,
                min_pages: row.try_get("min_pages")?,
                max_pages: row.try_get("max_pages").ok(),
                price_per_page: row.try_get("price_per_page")?,
            });
        }

        Ok(rules)
    }

    /// Seed one unbounded rule from configuration when the pricing table
    /// is empty, so the store always answers.
    pub async fn seed_default_pricing(&self, price_per_page: f64) -> ApiResult<()> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM pricing_rules")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;

        if count == 0 {
            sqlx::query(
                "INSERT INTO pricing_rules (min_pages, max_pages, price_per_page)
                 VALUES (1, NULL, ?)",
            )
            .bind(price_per_page)
            .execute(&self.pool)
            .await?;

            tracing::info!("Seeded default pricing rule at {} per page", price_per_page);
        }

        Ok(())
    }
}

const JOB_COLUMNS: &str = "id, filename, file_path, converted_path, page_count, copies, \
                           page_range, duplex, status, total_cost, gateway_link_id, \
                           print_job_id, failure_reason, created_at";

fn job_from_row(row: &SqliteRow) -> Result<Job, sqlx::Error> {
    let status_str: String = row.try_get("status")?;

    Ok(Job {
        id: row.try_get("id")?,
        filename: row.try_get("filename")?,
        file_path: row.try_get("file_path")?,
        converted_path: row.try_get("converted_path").ok(),
        page_count: row.try_get("page_count")?,
        copies: row.try_get("copies")?,
        page_range: row.try_get("page_range")?,
        duplex: row.try_get("duplex")?,
        status: JobStatus::from(status_str),
        total_cost: row.try_get("total_cost")?,
        gateway_link_id: row.try_get("gateway_link_id").ok(),
        print_job_id: row.try_get("print_job_id").ok(),
        failure_reason: row.try_get("failure_reason").ok(),
        created_at: row.try_get("created_at")?,
    })
}
