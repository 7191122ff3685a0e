//! Waiting-store interface for the deposit voting pipeline.
//!
//! Holds proofs that are plausible but not yet buried deeply enough, plus
//! the permanent record of transactions this relay has already voted for.

pub mod errors;
pub mod stubs;
pub mod traits;
pub mod types;

pub use errors::DbError;

pub type DbResult<T> = Result<T, DbError>;
