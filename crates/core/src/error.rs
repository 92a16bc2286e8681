//! Unified error types for flickrs.
//!
//! One enum covers both halves of the system: store-side failures (SQLite,
//! migrations, uniqueness violations) and remote-side failures reported by
//! whatever implements [`FlickrApi`](crate::remote::FlickrApi).

use tokio_rusqlite::rusqlite;

/// Unified error type for cache and remote operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty tag name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Primary-key uniqueness violated on an entity table.
    ///
    /// The cache manager is get-or-create throughout, so hitting this means
    /// a broken invariant rather than a recoverable condition.
    #[error("duplicate key in {table}: {key}")]
    DuplicateKey { table: &'static str, key: String },

    /// The remote API reported a non-ok status for the given id.
    #[error("remote lookup failed for {entity} {id}: {message}")]
    RemoteLookup {
        entity: &'static str,
        id: String,
        code: Option<i64>,
        message: String,
    },

    /// Deadline expired while waiting on the remote API.
    #[error("remote call timed out: {method}")]
    RemoteTimeout { method: String },

    /// Network-level failure talking to the remote API.
    #[error("remote transport error: {0}")]
    RemoteTransport(String),

    /// Remote payload could not be decoded.
    #[error("remote response parse error: {0}")]
    RemoteParse(String),

    /// No owner given and no default user configured.
    #[error("no owner nsid given and no default user configured")]
    NoOwner,
}

impl Error {
    /// Classify an insert failure: primary-key and unique-constraint
    /// violations become [`Error::DuplicateKey`], everything else (including
    /// foreign-key violations) stays a database error.
    pub(crate) fn from_insert(table: &'static str, key: &str, err: rusqlite::Error) -> Self {
        const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
        const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
                    || e.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateKey { table, key: key.to_string() }
            }
            _ => Error::Database(tokio_rusqlite::Error::Error(err)),
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RemoteLookup {
            entity: "photo",
            id: "123".to_string(),
            code: Some(1),
            message: "Photo not found".to_string(),
        };
        assert!(err.to_string().contains("photo 123"));
        assert!(err.to_string().contains("Photo not found"));
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = Error::DuplicateKey { table: "owner", key: "12345@N00".to_string() };
        assert!(err.to_string().contains("owner"));
        assert!(err.to_string().contains("12345@N00"));
    }
}
