//! Error types for quill-db.

use miette::Diagnostic;
use thiserror::Error;

/// Database error type for quill-db operations.
///
/// Driver errors pass through unmodified; this layer adds no retry or
/// recovery. Structurally malformed builder input (mismatched pair lengths,
/// non-object records) is a silent no-op rather than an error.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(quill_db::connection),
        help("Check that the DSN is \":memory:\" or an accessible SQLite database path")
    )]
    Connection(String),

    #[error(transparent)]
    #[diagnostic(code(quill_db::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("count query returned no rows")]
    #[diagnostic(
        code(quill_db::missing_count),
        help("The derived count statement produced an empty result set")
    )]
    MissingCount,

    #[error("count column held a non-integer value")]
    #[diagnostic(code(quill_db::malformed_count))]
    MalformedCount,
}

/// A specialized Result type for quill-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
