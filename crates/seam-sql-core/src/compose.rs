//! Fragment composition helpers.
//!
//! These build common statement shapes — predicate lists, assignment
//! lists, concatenation — by assembling segment/parameter sequences and
//! handing them to the template compiler.

use crate::refs::{FieldRef, SqlRef};
use crate::statement::Statement;
use crate::template::{compile, SqlParam};
use crate::value::SqlValue;

/// A predicate or assignment key: a plain column name or a typed
/// reference.
#[derive(Debug, Clone)]
pub enum Key {
    /// A column name. Dotted names qualify, e.g. `t1.id`.
    Name(String),
    /// A typed reference.
    Ref(SqlRef),
}

impl Key {
    /// Renders the key with any table qualification: dotted names quote
    /// each path segment, references render with their prefix.
    fn render_qualified(&self) -> String {
        match self {
            Self::Name(name) if name.contains('.') => {
                let parts: Vec<String> =
                    name.split('.').map(|p| format!("\"{p}\"")).collect();
                parts.join(".")
            }
            Self::Name(name) => format!("\"{name}\""),
            Self::Ref(r) => r.render(),
        }
    }

    /// Renders the bare column name, dropping any alias qualification.
    /// Assignment lists take unqualified columns.
    fn render_bare(&self) -> String {
        match self {
            Self::Name(name) => format!("\"{name}\""),
            Self::Ref(r) => format!("\"{}\"", r.name),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&SqlRef> for Key {
    fn from(r: &SqlRef) -> Self {
        Self::Ref(r.clone())
    }
}

impl From<&FieldRef> for Key {
    fn from(field: &FieldRef) -> Self {
        Self::Ref(field.meta().clone())
    }
}

/// One entry of a [`matches`] or [`assign`] call: either an
/// already-compiled sub-statement, or a key/value pair.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A compiled sub-statement, spliced as a sub-expression.
    Statement(Statement),
    /// A key/value pair. An absent value is coerced to `Null`, which
    /// renders as `IS NULL` rather than a placeholder.
    Pair(Key, SqlParam),
}

impl Entry {
    /// Creates a key/value pair entry.
    pub fn pair(key: impl Into<Key>, value: impl Into<SqlParam>) -> Self {
        Self::Pair(key.into(), value.into())
    }
}

impl From<Statement> for Entry {
    fn from(stmt: Statement) -> Self {
        Self::Statement(stmt)
    }
}

impl From<&Statement> for Entry {
    fn from(stmt: &Statement) -> Self {
        Self::Statement(stmt.clone())
    }
}

impl<K: Into<Key>, V: Into<SqlParam>> From<(K, V)> for Entry {
    fn from((key, value): (K, V)) -> Self {
        Self::pair(key, value)
    }
}

/// How entries join and how keys render; [`matches`] and [`assign`]
/// share one traversal.
struct Joiner {
    keyword: &'static str,
    qualified: bool,
}

fn traverse<I, E>(entries: I, joiner: &Joiner) -> (Vec<String>, Vec<SqlParam>)
where
    I: IntoIterator<Item = E>,
    E: Into<Entry>,
{
    let mut codes: Vec<String> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();
    // The literal accumulated since the last placeholder boundary. An
    // IS NULL pair extends it instead of opening a boundary, which
    // keeps segments and values aligned regardless of entry order.
    let mut acc = String::new();
    let mut first = true;

    for entry in entries {
        match entry.into() {
            Entry::Statement(stmt) => {
                if !first {
                    let text = stmt.text().trim_start();
                    // A sub-expression carrying its own boolean keyword
                    // joins with a bare space.
                    if joiner.qualified
                        && (text.starts_with("OR ") || text.starts_with("AND "))
                    {
                        acc.push(' ');
                    } else {
                        acc.push_str(joiner.keyword);
                    }
                }
                codes.push(std::mem::take(&mut acc));
                params.push(SqlParam::Statement(stmt));
            }
            Entry::Pair(key, value) => {
                if !first {
                    acc.push_str(joiner.keyword);
                }
                let name = if joiner.qualified {
                    key.render_qualified()
                } else {
                    key.render_bare()
                };
                acc.push_str(&name);
                // An absent value is coerced to null.
                let value = match value {
                    SqlParam::Omit => SqlParam::Value(SqlValue::Null),
                    other => other,
                };
                if matches!(&value, SqlParam::Value(v) if v.is_null()) {
                    acc.push_str(" IS NULL");
                } else {
                    acc.push_str(" = ");
                    codes.push(std::mem::take(&mut acc));
                    params.push(value);
                }
            }
        }
        first = false;
    }
    codes.push(acc);
    (codes, params)
}

/// Builds a boolean predicate from the given entries, joined with
/// ` AND `. A sub-statement whose text already starts with `OR ` or
/// `AND ` joins with a bare space instead. Pair values of `Null` render
/// as `"key" IS NULL` with no placeholder.
///
/// Zero entries produce `None` — the "no predicate" result — so callers
/// can splice the result into an outer template unconditionally.
pub fn matches<I, E>(entries: I) -> Option<Statement>
where
    I: IntoIterator<Item = E>,
    E: Into<Entry>,
{
    let mut entries = entries.into_iter().peekable();
    entries.peek()?;
    let (codes, params) = traverse(
        entries,
        &Joiner {
            keyword: " AND ",
            qualified: true,
        },
    );
    Some(compile(&codes, params))
}

/// [`matches`], prefixed with `WHERE `. The "no predicate" result
/// passes through unchanged.
pub fn where_clause<I, E>(entries: I) -> Option<Statement>
where
    I: IntoIterator<Item = E>,
    E: Into<Entry>,
{
    matches(entries).map(|stmt| {
        let (text, values) = stmt.into_parts();
        Statement::new(format!("WHERE {text}"), values)
    })
}

/// Builds an assignment list for a SET clause: the same key/value
/// traversal as [`matches`], joined with `, ` and with keys rendered as
/// bare column names (alias qualification dropped).
pub fn assign<I, E>(entries: I) -> Statement
where
    I: IntoIterator<Item = E>,
    E: Into<Entry>,
{
    let (codes, params) = traverse(
        entries,
        &Joiner {
            keyword: ", ",
            qualified: false,
        },
    );
    compile(&codes, params)
}

/// Joins statements with a single space, concatenating their value
/// lists in order.
pub fn concat<I: IntoIterator<Item = Statement>>(statements: I) -> Statement {
    let mut codes: Vec<String> = Vec::new();
    let mut values = Vec::new();
    for stmt in statements {
        let (text, vals) = stmt.into_parts();
        codes.push(text);
        values.extend(vals);
    }
    Statement::new(codes.join(" "), values)
}

/// Returns a new statement with surrounding whitespace stripped from
/// the text; values are untouched.
#[must_use]
pub fn trim(statement: &Statement) -> Statement {
    statement.trim()
}
