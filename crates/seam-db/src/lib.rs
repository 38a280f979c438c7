//! # seam-db
//!
//! A generic database facade over pluggable statement-execution
//! adapters.
//!
//! A backend implements exactly three primitives — [`SqlAdapter::first`],
//! [`SqlAdapter::run`] and [`SqlAdapter::run_batch`] — and the facade
//! provides the convenience surface on top: `exec`, `get`, `get_one`,
//! `require_one`, `batch`, plus structured-column decoding driven by the
//! schema. Statement inputs are compiled [`Statement`]s or builder
//! closures that receive the schema's reference tree.
//!
//! ```ignore
//! let db = SqlDatabase::with_aliases(adapter, schema, &[("p", "posts")]);
//!
//! // Builder closures close over the reference tree.
//! let rows = db
//!     .get_from("posts", |refs| {
//!         let p = &refs["p"];
//!         sql!("SELECT * FROM " {p} " WHERE " {&p["status"]} " = " {"live"})
//!     })
//!     .await?;
//! ```
//!
//! The facade never retries and never swallows a backend failure: every
//! error surfaces as a [`DbError`] carrying the exact statement being
//! executed.

pub mod database;
pub mod error;
pub mod result;

pub use database::{IntoStatement, IntoStatements, SqlAdapter, SqlDatabase};
pub use error::{DbError, Result};
pub use result::{SqlMeta, SqlResponse, SqlResult, SqlRow};

pub use seam_sql_core::Statement;
