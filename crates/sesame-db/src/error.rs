use rusqlite::ErrorCode;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required field was missing or empty.
    #[error("{0}")]
    Validation(&'static str),

    /// A unique constraint rejected the write. Deliberately carries no
    /// column name.
    #[error("already exists")]
    Duplicate,

    /// Unknown id, or a row owned by someone else.
    #[error("not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::Duplicate
            }
            _ => Self::Sqlite(err),
        }
    }
}
