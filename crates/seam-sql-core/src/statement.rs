//! Compiled statements.

use serde::Serialize;

use crate::value::SqlValue;

/// A compiled, parameterized statement: SQL text with `?` placeholders
/// plus the ordered values bound to them.
///
/// Statements are immutable once compiled. Composition functions never
/// modify an input statement; they return new ones. The number of
/// placeholders in [`text`](Self::text) always equals
/// [`values`](Self::values)`.len()`, in matching left-to-right order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    text: String,
    values: Vec<SqlValue>,
}

impl Statement {
    pub(crate) fn new(text: String, values: Vec<SqlValue>) -> Self {
        Self { text, values }
    }

    /// The SQL text with `?` binding placeholders.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The binding values, in placeholder order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Consumes the statement and returns its text and values.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.text, self.values)
    }

    /// Counts the `?` placeholders in the statement text.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.text.matches('?').count()
    }

    /// Returns a new statement with leading and trailing whitespace
    /// stripped from the text. Values are untouched.
    #[must_use]
    pub fn trim(&self) -> Self {
        Self {
            text: self.text.trim().to_owned(),
            values: self.values.clone(),
        }
    }
}
