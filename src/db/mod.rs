//! Postgres persistence: row models and the query layer.

pub mod models;
pub mod operations;

pub use models::*;
pub use operations::DbOperations;
