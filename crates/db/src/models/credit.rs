//! Credit ledger entry entity.

use pawtrait_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the append-only `credit_entries` table.
///
/// `balance` is the running balance after applying `amount`; the user's
/// current balance is always the `balance` of their most recent entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub amount: i32,
    pub balance: i32,
    pub reason: String,
    pub created_at: Timestamp,
}
