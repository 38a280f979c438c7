//! # seam-sql-core
//!
//! A templated SQL statement compiler with typed table and field
//! references.
//!
//! Statements are built by interleaving literal text with parameters —
//! bound values, arrays, nested statements, and references — and
//! compile to a backend-agnostic `(text, values)` pair that is safe
//! from SQL injection: values never appear in the text, only `?`
//! placeholders do.
//!
//! ## Templated statements
//!
//! ```rust
//! use seam_sql_core::sql;
//!
//! let id = "1234";
//! let status = "draft";
//! let stmt = sql!("SELECT * FROM \"posts\" WHERE \"id\" = " {id} " AND \"status\" = " {status});
//!
//! assert_eq!(
//!     stmt.text(),
//!     r#"SELECT * FROM "posts" WHERE "id" = ? AND "status" = ?"#
//! );
//! assert_eq!(stmt.values().len(), 2);
//! ```
//!
//! Arrays flatten into comma-separated lists, optional fragments splice
//! to nothing, and nested statements are absorbed with their values:
//!
//! ```rust
//! use seam_sql_core::{sql, where_clause, Entry};
//!
//! let predicate = where_clause([Entry::pair("status", "live")]);
//! let stmt = sql!("SELECT * FROM \"posts\" " {predicate});
//! assert_eq!(stmt.text(), r#"SELECT * FROM "posts" WHERE "status" = ?"#);
//!
//! let none = where_clause(Vec::<Entry>::new());
//! let stmt = sql!("SELECT * FROM \"posts\" " {none});
//! assert_eq!(stmt.text(), r#"SELECT * FROM "posts" "#);
//! ```
//!
//! ## Typed references
//!
//! References render as quoted identifiers rather than bound values,
//! and aliasing produces independently-renderable clones:
//!
//! ```rust
//! use seam_sql_core::{build_refs, sql, ColumnDef, ColumnType, SchemaDef, TableDef};
//!
//! let schema = SchemaDef::new().table(
//!     TableDef::new("posts")
//!         .column(ColumnDef::new("id", ColumnType::Text))
//!         .column(ColumnDef::new("title", ColumnType::Text)),
//! );
//! let refs = build_refs(&schema, &[("p", "posts")]);
//! let p = &refs["p"];
//!
//! let id = "1234";
//! let stmt = sql!("SELECT * FROM " {p} " WHERE " {&p["id"]} " = " {id});
//! assert_eq!(
//!     stmt.text(),
//!     r#"SELECT * FROM "posts" as "p" WHERE "p"."id" = ?"#
//! );
//! ```

pub mod compose;
pub mod refs;
pub mod schema;
pub mod statement;
pub mod template;
pub mod value;

pub use compose::{assign, concat, matches, trim, where_clause, Entry, Key};
pub use refs::{build_refs, DbRef, DbRefs, FieldRef, RefKind, SqlRef, TableRef};
pub use schema::{ColumnDef, ColumnType, SchemaDef, TableDef};
pub use statement::Statement;
pub use template::{compile, SqlParam};
pub use value::{SqlValue, ToSqlValue};
