//! Storage Layer
//!
//! Keeps recent detection results in memory behind a repository interface.

mod repository;

pub use repository::{DetectionRecord, Repository, DEFAULT_MAX_RECORDS};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("Record not found")]
    NotFound,
}
