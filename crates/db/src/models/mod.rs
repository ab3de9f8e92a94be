//! Table row structs.
//!
//! Each submodule contains a `FromRow` struct named after its table and a
//! conversion into the matching `campus_core::rows` contract. Column names
//! follow the schema in `db/migrations`, not the core's field names.

pub mod category;
pub mod comment;
pub mod event;
pub mod group;
pub mod location;
pub mod membership;
pub mod university;
pub mod user;
