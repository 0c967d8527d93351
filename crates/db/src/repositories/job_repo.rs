//! Repository for the `jobs` table.
//!
//! Uses `JobStatus` from `models::status` for all status transitions.
//! Transition UPDATEs are guarded by the current status so terminal jobs
//! can never be mutated and the `Pending -> Processing -> terminal`
//! order is enforced at the database level.

use sqlx::{PgExecutor, PgPool};

use pawtrait_core::types::DbId;

use crate::models::job::{Job, JobListQuery, SubmitJob};
use crate::models::status::{JobStatus, ModelStatus};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, job_type, status_id, user_id, pet_id, model_id, pack_id, \
    parameters, result, error_message, \
    submitted_at, started_at, completed_at, created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new pending job. Returns the job row; the creation call
    /// is complete once this row exists (durable acknowledgment).
    pub async fn submit<'e>(
        exec: impl PgExecutor<'e>,
        input: &SubmitJob,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (job_type, status_id, user_id, pet_id, model_id, pack_id, parameters) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(input.kind.as_str())
            .bind(JobStatus::Pending.id())
            .bind(input.user_id)
            .bind(input.pet_id)
            .bind(input.model_id)
            .bind(input.pack_id)
            .bind(&input.parameters)
            .fetch_one(exec)
            .await
    }

    /// Atomically claim the oldest pending job, moving it to `Processing`
    /// and stamping `started_at`.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent dispatcher
    /// instances never double-claim a job.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = $1, started_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status_id = $2 \
                 ORDER BY submitted_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Processing.id())
            .bind(JobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a processing job as completed with its result payload.
    ///
    /// Returns `false` if the job was not in `Processing` (already
    /// terminal or never claimed); the row is left untouched in that case.
    pub async fn complete<'e>(
        exec: impl PgExecutor<'e>,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, result = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(result)
        .bind(JobStatus::Processing.id())
        .execute(exec)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Mark a processing job as failed, capturing the error text verbatim
    /// both in `error_message` and in the result payload.
    ///
    /// Returns `false` if the job was not in `Processing`.
    pub async fn fail<'e>(
        exec: impl PgExecutor<'e>,
        job_id: DbId,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, error_message = $3, \
                 result = jsonb_build_object('error', $3::text), \
                 completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(JobStatus::Processing.id())
        .execute(exec)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Force-fail jobs stuck in `Processing` longer than `stale_secs`.
    ///
    /// Maintenance reconciliation for executor crashes: a job only stays
    /// in `Processing` past the threshold if the task driving it died.
    /// Training models attached to swept jobs are failed alongside.
    /// Returns the ids of the swept jobs.
    pub async fn fail_stale(pool: &PgPool, stale_secs: i64) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let swept: Vec<DbId> = sqlx::query_scalar(
            "UPDATE jobs \
             SET status_id = $1, \
                 error_message = 'job stalled in processing; reset by maintenance sweep', \
                 result = jsonb_build_object('error', 'job stalled in processing; reset by maintenance sweep'), \
                 completed_at = NOW() \
             WHERE status_id = $2 \
               AND started_at < NOW() - make_interval(secs => $3::double precision) \
             RETURNING id",
        )
        .bind(JobStatus::Failed.id())
        .bind(JobStatus::Processing.id())
        .bind(stale_secs)
        .fetch_all(&mut *tx)
        .await?;

        if !swept.is_empty() {
            sqlx::query(
                "UPDATE pet_models \
                 SET status_id = $1, \
                     error_message = 'training job stalled; reset by maintenance sweep' \
                 WHERE status_id IN ($2, $3) \
                   AND id IN (SELECT model_id FROM jobs WHERE id = ANY($4) AND job_type = 'train')",
            )
            .bind(ModelStatus::Failed.id())
            .bind(ModelStatus::Pending.id())
            .bind(ModelStatus::Training.id())
            .bind(&swept)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(swept)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a job by ID, scoped to its owner.
    ///
    /// A job belonging to another user is indistinguishable from a
    /// missing one: both return `None`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the pet's non-terminal training job, if one exists.
    ///
    /// The partial unique index `uq_jobs_active_train_per_pet` guarantees
    /// at most one such row.
    pub async fn find_active_train_for_pet(
        pool: &PgPool,
        pet_id: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE pet_id = $1 AND job_type = 'train' AND status_id IN ($2, $3)"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(pet_id)
            .bind(JobStatus::Pending.id())
            .bind(JobStatus::Processing.id())
            .fetch_optional(pool)
            .await
    }

    /// List a user's jobs, newest first, with optional status filter.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let query = if params.status_id.is_some() {
            format!(
                "SELECT {COLUMNS} FROM jobs \
                 WHERE user_id = $1 AND status_id = $2 \
                 ORDER BY submitted_at DESC LIMIT $3 OFFSET $4"
            )
        } else {
            format!(
                "SELECT {COLUMNS} FROM jobs \
                 WHERE user_id = $1 \
                 ORDER BY submitted_at DESC LIMIT $2 OFFSET $3"
            )
        };

        let mut q = sqlx::query_as::<_, Job>(&query).bind(user_id);
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }
}
