//! Shared domain types, errors, and constants for the Pawtrait backend.

pub mod credits;
pub mod error;
pub mod pet;
pub mod prompt;
pub mod types;
