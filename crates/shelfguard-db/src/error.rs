//! error types for shelfguard-db.

use thiserror::Error;

/// database errors.
#[derive(Debug, Error)]
pub enum Error {
    /// a referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// a row with the same unique name exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// stored or supplied data is malformed.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// connecting to the database failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// running migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// a query failed.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<Error> for shelfguard_grants::Error {
    fn from(err: Error) -> Self {
        shelfguard_grants::Error::PolicyStore(err.to_string())
    }
}
