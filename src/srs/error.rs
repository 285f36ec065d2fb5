use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum SrsError {
    #[error("Invalid quality rating {0}: expected 1 (again) to 4 (easy)")]
    InvalidQuality(u8),

    #[error("Storage error: {0}")]
    Store(#[from] StorageError),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, SrsError>;
