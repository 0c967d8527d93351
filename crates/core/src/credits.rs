//! Credit cost constants and ledger reason strings.
//!
//! The spendable balance is always derived from the most recent ledger
//! entry, never stored on the user row.  Every balance-affecting event
//! appends one entry; nothing is ever updated or deleted.

/// Credits debited when a training job completes successfully.
pub const TRAINING_COST: i32 = 10;

/// Credits debited when a generation job completes successfully.
pub const GENERATION_COST: i32 = 5;

/// Credits granted to a new account on signup.
pub const SIGNUP_BONUS: i32 = 20;

/// Ledger reason recorded for a training debit.
pub const REASON_TRAIN: &str = "train model";

/// Ledger reason recorded for a generation debit.
pub const REASON_GENERATE: &str = "generate photos";

/// Ledger reason recorded for the signup bonus grant.
pub const REASON_SIGNUP_BONUS: &str = "signup bonus";
