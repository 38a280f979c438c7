//! The SQLite adapter.

use seam_db::{SqlAdapter, SqlMeta, SqlResult, SqlRow};
use seam_sql_core::{SqlValue, Statement};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqliteConnection, TypeInfo, ValueRef};
use tracing::debug;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// [`SqlAdapter`] implementation over a [`SqlitePool`].
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
}

impl SqliteAdapter {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the given SQLite URL, e.g. `sqlite://app.db` or
    /// `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new().connect(url).await?;
        Ok(Self::new(pool))
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs raw SQL with no parameters, possibly multiple statements.
    ///
    /// Only use this for maintenance and one-shot tasks, e.g. applying
    /// a schema.
    pub async fn bulk(&self, raw_sql: &str) -> Result<(), sqlx::Error> {
        debug!(sql = %raw_sql, "bulk");
        sqlx::raw_sql(raw_sql).execute(&self.pool).await?;
        Ok(())
    }
}

impl SqlAdapter for SqliteAdapter {
    type Error = sqlx::Error;

    async fn first(&self, statement: &Statement) -> Result<Option<SqlRow>, sqlx::Error> {
        debug!(query = %statement.text(), "first");
        let row = build_query(statement).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_json).transpose()
    }

    async fn run(&self, statement: &Statement) -> Result<SqlResult, sqlx::Error> {
        debug!(query = %statement.text(), "run");
        let mut conn = self.pool.acquire().await?;
        let rows = build_query(statement).fetch_all(&mut *conn).await?;
        let results = rows
            .iter()
            .map(row_to_json)
            .collect::<Result<Vec<_>, _>>()?;
        let meta = read_meta(&mut conn).await?;
        Ok(SqlResult {
            success: true,
            meta,
            results,
        })
    }

    async fn run_batch(&self, statements: &[Statement]) -> Result<Vec<SqlResult>, sqlx::Error> {
        debug!(count = statements.len(), "run_batch");
        let mut tx = self.pool.begin().await?;
        let mut batch = Vec::with_capacity(statements.len());
        for statement in statements {
            let rows = build_query(statement).fetch_all(&mut *tx).await?;
            let results = rows
                .iter()
                .map(row_to_json)
                .collect::<Result<Vec<_>, _>>()?;
            let meta = read_meta(&mut tx).await?;
            batch.push(SqlResult {
                success: true,
                meta,
                results,
            });
        }
        tx.commit().await?;
        Ok(batch)
    }
}

/// Prepares a query with the statement's values bound in order.
fn build_query(statement: &Statement) -> SqliteQuery<'_> {
    let mut query = sqlx::query(statement.text());
    for value in statement.values() {
        query = bind_value(query, value.clone());
    }
    query
}

/// Binds one value to a query.
fn bind_value(query: SqliteQuery<'_>, value: SqlValue) -> SqliteQuery<'_> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

/// Reads execution metadata for the most recent statement on `conn`.
async fn read_meta(conn: &mut SqliteConnection) -> Result<SqlMeta, sqlx::Error> {
    let (changes, last_row_id): (i64, i64) =
        sqlx::query_as("SELECT changes(), last_insert_rowid()")
            .fetch_one(&mut *conn)
            .await?;
    Ok(SqlMeta {
        changed_db: changes > 0,
        changes: u64::try_from(changes).unwrap_or_default(),
        last_row_id,
        extra: serde_json::Map::new(),
    })
}

/// Converts a row by SQLite storage class: integers and reals to JSON
/// numbers, text to strings, blobs to arrays of byte values.
fn row_to_json(row: &SqliteRow) -> Result<SqlRow, sqlx::Error> {
    let mut out = SqlRow::new();
    for column in row.columns() {
        let index = column.ordinal();
        let (is_null, type_name) = {
            let raw = row.try_get_raw(index)?;
            (raw.is_null(), raw.type_info().name().to_owned())
        };
        let value = if is_null {
            serde_json::Value::Null
        } else {
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => serde_json::Value::from(row.try_get::<i64, _>(index)?),
                "REAL" | "NUMERIC" => serde_json::Value::from(row.try_get::<f64, _>(index)?),
                "BLOB" => {
                    let bytes = row.try_get::<Vec<u8>, _>(index)?;
                    serde_json::Value::Array(
                        bytes.into_iter().map(serde_json::Value::from).collect(),
                    )
                }
                _ => serde_json::Value::from(row.try_get::<String, _>(index)?),
            }
        };
        out.insert(column.name().to_owned(), value);
    }
    Ok(out)
}
