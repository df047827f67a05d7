use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngagementError {
    /// The store could not be reached (connect or pool-acquire failure).
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(DbErr),

    #[error("Storage error: {0}")]
    Storage(DbErr),
}

impl From<DbErr> for EngagementError {
    fn from(err: DbErr) -> Self {
        if is_unavailable(&err) {
            EngagementError::StorageUnavailable(err)
        } else {
            EngagementError::Storage(err)
        }
    }
}

/// Whether a database error means the store itself is unreachable.
pub fn is_unavailable(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}
