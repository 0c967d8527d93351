//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Status enums mirroring the lookup-table seed data

pub mod asset;
pub mod credit;
pub mod job;
pub mod pet;
pub mod pet_model;
pub mod photo_pack;
pub mod status;
pub mod user;
