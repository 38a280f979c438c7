//! Error types for database access.

use seam_sql_core::SqlValue;
use thiserror::Error;

/// Database access errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A backend failure while executing a statement. Carries the exact
    /// statement being executed alongside the underlying failure.
    #[error("backend failure in ( {query} ) of {values:?}")]
    Backend {
        /// The statement text being executed.
        query: String,
        /// The values bound to the statement.
        values: Vec<SqlValue>,
        /// The underlying adapter failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No row matched when exactly one was required.
    #[error("no row found when one was required")]
    NotFound,

    /// A structured column failed to decode during row post-processing.
    #[error("failed to decode structured column {column:?}")]
    Decode {
        /// The column being decoded.
        column: String,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, DbError>;
