//! # seam-sql-sqlite
//!
//! SQLite adapter for the [`seam_db`] facade, built on `sqlx`.
//!
//! # Notes on SQLite behavior
//!
//! - **Metadata**: row counts and rowids come from `changes()` and
//!   `last_insert_rowid()`, read on the same connection that executed
//!   the statement.
//! - **Batching**: [`SqlAdapter::run_batch`] runs the whole batch inside
//!   one transaction on one connection; it commits only if every
//!   statement succeeds.
//! - **Prepared statements**: sqlx keeps a per-connection prepared
//!   statement cache, so repeated statement texts are not re-prepared.
//! - **Row encoding**: INTEGER and REAL columns surface as JSON numbers,
//!   TEXT as strings, BLOB as arrays of byte values, NULL as null.
//!
//! [`SqlAdapter::run_batch`]: seam_db::SqlAdapter::run_batch

mod adapter;

pub use adapter::SqliteAdapter;
