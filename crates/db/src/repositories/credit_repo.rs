//! Repository for the append-only `credit_entries` ledger.
//!
//! Writes are serialized per user: every append runs inside a
//! transaction that first locks the owning `users` row, so two
//! concurrent debits can never both read the same "latest" balance and
//! corrupt the running chain.

use sqlx::{PgConnection, PgExecutor, PgPool};

use pawtrait_core::types::DbId;

use crate::models::credit::CreditEntry;

/// Column list for `credit_entries` queries.
const COLUMNS: &str = "id, user_id, amount, balance, reason, created_at";

/// Provides balance computation and ledger appends.
pub struct CreditRepo;

impl CreditRepo {
    /// Current spendable balance: the `balance` of the most recent entry,
    /// or 0 if the user has no entries yet.
    pub async fn balance<'e>(exec: impl PgExecutor<'e>, user_id: DbId) -> Result<i32, sqlx::Error> {
        let balance: Option<i32> = sqlx::query_scalar(
            "SELECT balance FROM credit_entries \
             WHERE user_id = $1 \
             ORDER BY id DESC \
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(exec)
        .await?;
        Ok(balance.unwrap_or(0))
    }

    /// Append a ledger entry inside the caller's transaction.
    ///
    /// Locks the user row first; callers composing a larger transaction
    /// (the executor's finalization) get the same per-user serialization
    /// as standalone grants. `amount` is signed: positive grants,
    /// negative debits. The balance is not re-checked here — acceptance
    /// gating happens at job creation time.
    pub async fn append(
        conn: &mut PgConnection,
        user_id: DbId,
        amount: i32,
        reason: &str,
    ) -> Result<CreditEntry, sqlx::Error> {
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        let previous = Self::balance(&mut *conn, user_id).await?;

        let query = format!(
            "INSERT INTO credit_entries (user_id, amount, balance, reason) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CreditEntry>(&query)
            .bind(user_id)
            .bind(amount)
            .bind(previous + amount)
            .bind(reason)
            .fetch_one(&mut *conn)
            .await
    }

    /// Append a positive entry in its own transaction (signup bonus,
    /// purchase completion).
    pub async fn grant(
        pool: &PgPool,
        user_id: DbId,
        amount: i32,
        reason: &str,
    ) -> Result<CreditEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let entry = Self::append(&mut tx, user_id, amount, reason).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Recent ledger entries, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<CreditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_entries \
             WHERE user_id = $1 \
             ORDER BY id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, CreditEntry>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Total number of debit entries for a user (test/reporting helper).
    pub async fn count_debits(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM credit_entries WHERE user_id = $1 AND amount < 0",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
