//! The database facade.
//!
//! [`SqlDatabase`] provides the CRUD-style convenience surface on top of
//! exactly three adapter primitives: `first`, `run` and `run_batch`.
//! Everything else — row extraction, not-found handling, structured
//! column decoding, error wrapping — lives here, so adapters stay thin.

use seam_sql_core::{build_refs, DbRefs, SchemaDef, Statement};
use tracing::debug;

use crate::error::{DbError, Result};
use crate::result::{SqlResponse, SqlResult, SqlRow};

/// The three primitives a concrete backend must implement.
///
/// Adapters receive a compiled [`Statement`] per call and report either
/// the wire result shape or their own failure; the facade wraps
/// failures with the statement being executed. Batch implementations
/// must return one result per input statement, order-preserving;
/// whether the batch is atomic is adapter-defined.
#[allow(async_fn_in_trait)]
pub trait SqlAdapter {
    /// The adapter's failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes a statement and returns the first row, if any.
    async fn first(&self, statement: &Statement) -> std::result::Result<Option<SqlRow>, Self::Error>;

    /// Executes a statement and returns rows plus execution metadata.
    async fn run(&self, statement: &Statement) -> std::result::Result<SqlResult, Self::Error>;

    /// Executes statements as one batch, in order, one result each.
    async fn run_batch(
        &self,
        statements: &[Statement],
    ) -> std::result::Result<Vec<SqlResult>, Self::Error>;
}

/// Marker for inputs that already are compiled statements.
pub struct Prepared;
/// Marker for builder closures invoked with the reference tree.
pub struct Deferred;

/// A statement input: either a compiled [`Statement`] or a builder
/// closure that receives the database's reference tree, so callers can
/// close over table and field references without threading them by
/// hand.
pub trait IntoStatement<M> {
    /// Resolves the input to a compiled statement.
    fn into_statement(self, refs: &DbRefs) -> Statement;
}

impl IntoStatement<Prepared> for Statement {
    fn into_statement(self, _refs: &DbRefs) -> Statement {
        self
    }
}

impl<F: FnOnce(&DbRefs) -> Statement> IntoStatement<Deferred> for F {
    fn into_statement(self, refs: &DbRefs) -> Statement {
        self(refs)
    }
}

/// A batch input: a list of compiled statements or a builder closure
/// producing one.
pub trait IntoStatements<M> {
    /// Resolves the input to a list of compiled statements.
    fn into_statements(self, refs: &DbRefs) -> Vec<Statement>;
}

impl IntoStatements<Prepared> for Vec<Statement> {
    fn into_statements(self, _refs: &DbRefs) -> Vec<Statement> {
        self
    }
}

impl<F: FnOnce(&DbRefs) -> Vec<Statement>> IntoStatements<Deferred> for F {
    fn into_statements(self, refs: &DbRefs) -> Vec<Statement> {
        self(refs)
    }
}

/// A database handle: an adapter plus the schema it serves.
///
/// The schema drives the reference tree handed to builder closures and
/// the structured-column decoding applied by the `_from` read methods.
#[derive(Debug)]
pub struct SqlDatabase<A> {
    adapter: A,
    schema: SchemaDef,
    refs: DbRefs,
}

impl<A: SqlAdapter> SqlDatabase<A> {
    /// Creates a database handle with no table aliases.
    pub fn new(adapter: A, schema: SchemaDef) -> Self {
        Self::with_aliases(adapter, schema, &[])
    }

    /// Creates a database handle whose reference tree carries the given
    /// `(alias, table)` pairs.
    pub fn with_aliases(adapter: A, schema: SchemaDef, aliases: &[(&str, &str)]) -> Self {
        let refs = build_refs(&schema, aliases);
        Self {
            adapter,
            schema,
            refs,
        }
    }

    /// The reference tree for this database's schema.
    #[must_use]
    pub fn refs(&self) -> &DbRefs {
        &self.refs
    }

    /// The schema this database serves.
    #[must_use]
    pub fn schema(&self) -> &SchemaDef {
        &self.schema
    }

    /// The underlying adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Executes a statement, discarding any row data. Returns execution
    /// metadata only.
    pub async fn exec<M>(&self, cmd: impl IntoStatement<M>) -> Result<SqlResponse> {
        let statement = cmd.into_statement(&self.refs);
        debug!(query = %statement.text(), "exec");
        let result = self.run(&statement).await?;
        Ok(result.into_response())
    }

    /// Executes a statement and returns all result rows.
    pub async fn get<M>(&self, cmd: impl IntoStatement<M>) -> Result<Vec<SqlRow>> {
        let statement = cmd.into_statement(&self.refs);
        debug!(query = %statement.text(), "get");
        let result = self.run(&statement).await?;
        Ok(result.results)
    }

    /// Executes a statement and returns all result rows, decoding the
    /// named table's structured columns in place.
    pub async fn get_from<M>(&self, table: &str, cmd: impl IntoStatement<M>) -> Result<Vec<SqlRow>> {
        let rows = self.get(cmd).await?;
        self.parse_results(rows, table)
    }

    /// Executes a statement and returns the first row, or `None`.
    pub async fn get_one<M>(&self, cmd: impl IntoStatement<M>) -> Result<Option<SqlRow>> {
        let statement = cmd.into_statement(&self.refs);
        debug!(query = %statement.text(), "get_one");
        self.first(&statement).await
    }

    /// Executes a statement and returns the first row decoded against
    /// the named table, or `None`.
    pub async fn get_one_from<M>(
        &self,
        table: &str,
        cmd: impl IntoStatement<M>,
    ) -> Result<Option<SqlRow>> {
        match self.get_one(cmd).await? {
            Some(row) => {
                let mut rows = self.parse_results(vec![row], table)?;
                Ok(rows.pop())
            }
            None => Ok(None),
        }
    }

    /// Executes a statement and returns the first row, failing with
    /// [`DbError::NotFound`] when no row matches.
    pub async fn require_one<M>(&self, cmd: impl IntoStatement<M>) -> Result<SqlRow> {
        self.get_one(cmd).await?.ok_or(DbError::NotFound)
    }

    /// Executes a statement and returns the first row decoded against
    /// the named table, failing with [`DbError::NotFound`] when no row
    /// matches.
    pub async fn require_one_from<M>(
        &self,
        table: &str,
        cmd: impl IntoStatement<M>,
    ) -> Result<SqlRow> {
        self.get_one_from(table, cmd)
            .await?
            .ok_or(DbError::NotFound)
    }

    /// Executes statements as one batch, returning one result per
    /// statement in input order. Atomicity across the batch is
    /// adapter-defined.
    pub async fn batch<M>(&self, cmds: impl IntoStatements<M>) -> Result<Vec<SqlResult>> {
        let statements = cmds.into_statements(&self.refs);
        debug!(count = statements.len(), "batch");
        self.adapter
            .run_batch(&statements)
            .await
            .map_err(|e| backend_error(statements.first(), e))
    }

    async fn run(&self, statement: &Statement) -> Result<SqlResult> {
        self.adapter
            .run(statement)
            .await
            .map_err(|e| backend_error(Some(statement), e))
    }

    async fn first(&self, statement: &Statement) -> Result<Option<SqlRow>> {
        self.adapter
            .first(statement)
            .await
            .map_err(|e| backend_error(Some(statement), e))
    }

    /// Decodes the named table's structured columns in place on every
    /// row. Unknown table names leave the rows untouched; a decode
    /// failure propagates.
    fn parse_results(&self, mut rows: Vec<SqlRow>, table: &str) -> Result<Vec<SqlRow>> {
        let Some(def) = self.schema.get_table(table) else {
            return Ok(rows);
        };
        let parse_keys: Vec<&str> = def.structured_columns().map(|c| c.name.as_str()).collect();
        if parse_keys.is_empty() {
            return Ok(rows);
        }
        for row in &mut rows {
            for key in &parse_keys {
                let Some(serde_json::Value::String(raw)) = row.get(*key) else {
                    continue;
                };
                let decoded: serde_json::Value =
                    serde_json::from_str(raw).map_err(|source| DbError::Decode {
                        column: (*key).to_owned(),
                        source,
                    })?;
                row.insert((*key).to_owned(), decoded);
            }
        }
        Ok(rows)
    }
}

fn backend_error<E: std::error::Error + Send + Sync + 'static>(
    statement: Option<&Statement>,
    source: E,
) -> DbError {
    DbError::Backend {
        query: statement.map(|s| s.text().to_owned()).unwrap_or_default(),
        values: statement.map(|s| s.values().to_vec()).unwrap_or_default(),
        source: Box::new(source),
    }
}
