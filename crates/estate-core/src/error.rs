//! Engine error taxonomy.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Request rejected before any state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("x={x} or y={y} is out of range")]
    OutOfRange { x: i64, y: i64 },
    #[error("plot with coordinate x={x} and y={y} is already occupied")]
    Occupied { x: i64, y: i64 },
    #[error("estate dimensions {width}x{length} must be between 1 and 50000")]
    InvalidDimensions { width: i64, length: i64 },
    #[error("tree height {0} must be between 1 and 30")]
    InvalidHeight(i64),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("estate {0} not found")]
    EstateNotFound(Uuid),
    /// Collaborator failure, passed through as-is.
    #[error(transparent)]
    Store(#[from] StoreError),
}
