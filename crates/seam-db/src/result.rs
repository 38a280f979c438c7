//! Execution result shapes.
//!
//! These mirror the wire shape adapters must produce: a success flag,
//! execution metadata, and (for row-returning operations) the rows.

use serde::{Deserialize, Serialize};

/// One result row, keyed by column name.
pub type SqlRow = serde_json::Map<String, serde_json::Value>;

/// Execution metadata reported by an adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlMeta {
    /// Whether the statement modified the database.
    pub changed_db: bool,
    /// Number of rows changed by the statement.
    pub changes: u64,
    /// Rowid of the most recent successful insert.
    pub last_row_id: i64,
    /// Backend-specific extras, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The result of an execution that discards row data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlResponse {
    /// Always `true`; failures surface as errors instead.
    pub success: bool,
    /// Execution metadata.
    pub meta: SqlMeta,
}

/// The result of a row-returning execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlResult {
    /// Always `true`; failures surface as errors instead.
    pub success: bool,
    /// Execution metadata.
    pub meta: SqlMeta,
    /// The result rows, in backend order.
    pub results: Vec<SqlRow>,
}

impl SqlResult {
    /// Discards the rows, keeping only the execution metadata.
    #[must_use]
    pub fn into_response(self) -> SqlResponse {
        SqlResponse {
            success: self.success,
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_serializes_with_flattened_extras() {
        let mut extra = serde_json::Map::new();
        extra.insert(String::from("duration"), serde_json::json!(0.5));
        let meta = SqlMeta {
            changed_db: true,
            changes: 2,
            last_row_id: 7,
            extra,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "changed_db": true,
                "changes": 2,
                "last_row_id": 7,
                "duration": 0.5,
            })
        );
    }

    #[test]
    fn test_result_into_response_drops_rows() {
        let result = SqlResult {
            success: true,
            meta: SqlMeta::default(),
            results: vec![SqlRow::new()],
        };
        let response = result.into_response();
        assert!(response.success);
    }
}
