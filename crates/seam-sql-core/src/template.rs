//! The template compiler.
//!
//! [`compile`] consumes an ordered sequence of literal text segments and
//! the parameters interleaved between them, and produces one
//! [`Statement`]. Parameters are classified up front into [`SqlParam`]
//! and consumed by a single exhaustive match, so each splicing branch is
//! linear and side-effect-free.
//!
//! Missing literal segments MUST be read as the empty string. This keeps
//! segment access total under recursive splicing and avoids a whole
//! class of bugs when callers assemble the segment list by hand, e.g.
//! from [`crate::compose::matches`].

use std::borrow::Cow;

use crate::refs::{FieldRef, SqlRef, TableRef};
use crate::statement::Statement;
use crate::value::{SqlValue, ToSqlValue};

/// The placeholder marker for parameterized queries.
const PLACEHOLDER: &str = "?";

/// A classified template parameter.
///
/// This is the closed set of things that can be interpolated into a
/// template; the compiler matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// An absent parameter. Dropped entirely: no placeholder, no value,
    /// and the flanking literals concatenate. Supports optional and
    /// conditional fragments.
    Omit,
    /// A bound value, rendered as one placeholder.
    Value(SqlValue),
    /// A parameter list, flattened into a comma-separated sequence of
    /// parameters. An empty list produces nothing. Absent elements are
    /// normalized to `Null` rather than elided: no conditional SQL
    /// inside lists.
    List(Vec<SqlParam>),
    /// A renderable reference, spliced into the text as code.
    Ref(SqlRef),
    /// A nested statement, spliced into the text with its values
    /// absorbed at this position.
    Statement(Statement),
}

/// Compiles literal segments and parameters into a statement.
///
/// The segment count is normally the parameter count plus one; absent
/// leading or trailing segments are read as `""`. The caller's slices
/// are never modified — list expansion works on private copies.
///
/// ```
/// use seam_sql_core::{compile, SqlParam};
///
/// let stmt = compile(
///     &["SELECT * FROM \"t\" WHERE \"id\" = ", ""],
///     vec![SqlParam::from("1234")],
/// );
/// assert_eq!(stmt.text(), "SELECT * FROM \"t\" WHERE \"id\" = ?");
/// assert_eq!(stmt.values().len(), 1);
/// ```
pub fn compile<S: AsRef<str>>(sources: &[S], params: Vec<SqlParam>) -> Statement {
    // Working copies; list expansion splices into both.
    let mut srcs: Vec<Cow<'_, str>> = sources.iter().map(|s| Cow::Borrowed(s.as_ref())).collect();
    let mut params = params;

    let mut codes: Vec<String> = Vec::with_capacity(params.len() + 1);
    // Nested statements absorb extra values, hence the slack.
    let mut values: Vec<SqlValue> = Vec::with_capacity(params.len() * 3 / 2 + 1);
    codes.push(source_at(&srcs, 0));

    let mut i = 0;
    while i < params.len() {
        match std::mem::replace(&mut params[i], SqlParam::Omit) {
            SqlParam::List(items) if !items.is_empty() => {
                let mut items = items.into_iter();
                // The first element replaces the list in place and is
                // re-classified on the next pass. The rest are
                // reinserted as subsequent parameters, each preceded by
                // a ", " segment.
                if let Some(first) = items.next() {
                    params[i] = first;
                }
                let rest: Vec<SqlParam> = items
                    .map(|p| match p {
                        SqlParam::Omit => SqlParam::Value(SqlValue::Null),
                        other => other,
                    })
                    .collect();
                if !rest.is_empty() {
                    let count = rest.len();
                    params.splice(i + 1..i + 1, rest);
                    let at = (i + 1).min(srcs.len());
                    srcs.splice(at..at, std::iter::repeat(Cow::Borrowed(", ")).take(count));
                }
            }
            SqlParam::List(_) | SqlParam::Omit => {
                // Dropped. The next segment joins the current literal
                // instead of opening a new boundary.
                append_code(&mut codes, "", &srcs, i + 1);
                i += 1;
            }
            SqlParam::Ref(r) => {
                append_code(&mut codes, &r.render(), &srcs, i + 1);
                i += 1;
            }
            SqlParam::Statement(stmt) => {
                let (text, nested) = stmt.into_parts();
                append_code(&mut codes, &text, &srcs, i + 1);
                values.extend(nested);
                i += 1;
            }
            SqlParam::Value(value) => {
                values.push(value);
                codes.push(source_at(&srcs, i + 1));
                i += 1;
            }
        }
    }

    Statement::new(codes.join(PLACEHOLDER), values)
}

fn source_at(srcs: &[Cow<'_, str>], index: usize) -> String {
    srcs.get(index).map(|s| s.as_ref().to_owned()).unwrap_or_default()
}

/// Splices `code` onto the current literal and pulls the next segment
/// forward, since the parameter was consumed without a placeholder.
fn append_code(codes: &mut [String], code: &str, srcs: &[Cow<'_, str>], next: usize) {
    if let Some(current) = codes.last_mut() {
        current.push_str(code);
        if let Some(src) = srcs.get(next) {
            current.push_str(src);
        }
    }
}

impl From<SqlValue> for SqlParam {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<i16> for SqlParam {
    fn from(value: i16) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<u32> for SqlParam {
    fn from(value: u32) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<f32> for SqlParam {
    fn from(value: f32) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<serde_json::Value> for SqlParam {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for SqlParam {
    fn from(value: chrono::DateTime<Tz>) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<Statement> for SqlParam {
    fn from(stmt: Statement) -> Self {
        Self::Statement(stmt)
    }
}

impl From<&Statement> for SqlParam {
    fn from(stmt: &Statement) -> Self {
        Self::Statement(stmt.clone())
    }
}

impl From<SqlRef> for SqlParam {
    fn from(r: SqlRef) -> Self {
        Self::Ref(r)
    }
}

impl From<&SqlRef> for SqlParam {
    fn from(r: &SqlRef) -> Self {
        Self::Ref(r.clone())
    }
}

impl From<&FieldRef> for SqlParam {
    fn from(field: &FieldRef) -> Self {
        Self::Ref(field.meta().clone())
    }
}

impl From<&TableRef> for SqlParam {
    fn from(table: &TableRef) -> Self {
        Self::Ref(table.meta().clone())
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    /// `None` is the absent parameter: it is dropped entirely.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Omit,
        }
    }
}

impl<T: Into<SqlParam>> From<Vec<T>> for SqlParam {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Compiles a statement from interleaved literal segments and `{param}`
/// interpolations, mirroring a tagged template literal.
///
/// Parameters accept anything `Into<SqlParam>`: values, arrays, nested
/// statements and references.
///
/// ```
/// use seam_sql_core::sql;
///
/// let id = "1234";
/// let stmt = sql!("SELECT * FROM \"posts\" WHERE \"id\" = " {id});
/// assert_eq!(stmt.text(), "SELECT * FROM \"posts\" WHERE \"id\" = ?");
/// ```
#[macro_export]
macro_rules! sql {
    () => {
        $crate::compile::<&str>(&[], ::std::vec::Vec::new())
    };
    ($($tt:tt)+) => {
        $crate::__sql_munch!(@open [] [] $($tt)+)
    };
}

/// Internal muncher for [`sql!`]. The `@open` state accepts a literal
/// segment or a parameter (inserting an empty segment between adjacent
/// parameters); `@closed` follows a literal and accepts a parameter.
#[doc(hidden)]
#[macro_export]
macro_rules! __sql_munch {
    (@open [$($src:expr,)*] [$($param:expr,)*]) => {
        $crate::compile(&[$($src,)*], ::std::vec![$($param,)*])
    };
    (@closed [$($src:expr,)*] [$($param:expr,)*]) => {
        $crate::compile(&[$($src,)*], ::std::vec![$($param,)*])
    };
    (@open [$($src:expr,)*] [$($param:expr,)*] $lit:literal $($rest:tt)*) => {
        $crate::__sql_munch!(@closed [$($src,)* $lit,] [$($param,)*] $($rest)*)
    };
    (@open [$($src:expr,)*] [$($param:expr,)*] {$e:expr} $($rest:tt)*) => {
        $crate::__sql_munch!(@open [$($src,)* "",] [$($param,)* $crate::SqlParam::from($e),] $($rest)*)
    };
    (@closed [$($src:expr,)*] [$($param:expr,)*] {$e:expr} $($rest:tt)*) => {
        $crate::__sql_munch!(@open [$($src,)*] [$($param,)* $crate::SqlParam::from($e),] $($rest)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_parameters() {
        let stmt = compile(&["SELECT * FROM \"posts\";"], vec![]);
        assert_eq!(stmt.text(), "SELECT * FROM \"posts\";");
        assert!(stmt.values().is_empty());
    }

    #[test]
    fn test_bound_values_open_boundaries() {
        let stmt = compile(
            &["SELECT * FROM \"posts\" WHERE \"id\" = ", " AND \"status\" = ", ""],
            vec![SqlParam::from("1234"), SqlParam::from("draft")],
        );
        assert_eq!(
            stmt.text(),
            "SELECT * FROM \"posts\" WHERE \"id\" = ? AND \"status\" = ?"
        );
        assert_eq!(
            stmt.values(),
            [
                SqlValue::Text(String::from("1234")),
                SqlValue::Text(String::from("draft"))
            ]
        );
    }

    #[test]
    fn test_missing_trailing_segment_reads_empty() {
        let stmt = compile(&["\"id\" = "], vec![SqlParam::from(7_i64)]);
        assert_eq!(stmt.text(), "\"id\" = ?");
        assert_eq!(stmt.values(), [SqlValue::Int(7)]);
    }

    #[test]
    fn test_omit_is_dropped_and_literals_join() {
        let stmt = compile(
            &["SELECT * FROM \"t\"", ""],
            vec![SqlParam::Omit],
        );
        assert_eq!(stmt.text(), "SELECT * FROM \"t\"");
        assert!(stmt.values().is_empty());
    }

    #[test]
    fn test_list_flattens_with_separators() {
        let stmt = compile(
            &["SELECT * FROM \"t\" WHERE \"id\" IN(", ")"],
            vec![SqlParam::from(vec!["a", "b"])],
        );
        assert_eq!(stmt.text(), "SELECT * FROM \"t\" WHERE \"id\" IN(?, ?)");
        assert_eq!(
            stmt.values(),
            [
                SqlValue::Text(String::from("a")),
                SqlValue::Text(String::from("b"))
            ]
        );
    }

    #[test]
    fn test_empty_list_produces_nothing() {
        let stmt = compile(
            &["SELECT * FROM \"t\" WHERE \"id\" IN(", ")"],
            vec![SqlParam::from(Vec::<&str>::new())],
        );
        assert_eq!(stmt.text(), "SELECT * FROM \"t\" WHERE \"id\" IN()");
        assert!(stmt.values().is_empty());
    }

    #[test]
    fn test_list_null_normalization() {
        // Absent elements inside a list become NULL, never elided.
        let stmt = compile(
            &["IN(", ")"],
            vec![SqlParam::List(vec![
                SqlParam::from("a"),
                SqlParam::Omit,
                SqlParam::from("c"),
            ])],
        );
        assert_eq!(stmt.text(), "IN(?, ?, ?)");
        assert_eq!(
            stmt.values(),
            [
                SqlValue::Text(String::from("a")),
                SqlValue::Null,
                SqlValue::Text(String::from("c"))
            ]
        );
    }

    #[test]
    fn test_list_of_refs_renders_code() {
        let stmt = compile(
            &["INSERT INTO \"posts\" (", ") VALUES (", ")"],
            vec![
                SqlParam::List(vec![
                    SqlParam::Ref(SqlRef::field("id")),
                    SqlParam::Ref(SqlRef::field("title")),
                ]),
                SqlParam::from(vec!["1234", "Bob"]),
            ],
        );
        assert_eq!(
            stmt.text(),
            "INSERT INTO \"posts\" (\"id\", \"title\") VALUES (?, ?)"
        );
        assert_eq!(stmt.values().len(), 2);
    }

    #[test]
    fn test_nested_statement_absorbed() {
        let inner = compile(
            &["WHERE \"id\" = ", ""],
            vec![SqlParam::from("1234")],
        );
        let stmt = compile(
            &["SELECT * FROM \"table\" ", ""],
            vec![SqlParam::from(inner)],
        );
        assert_eq!(stmt.text(), "SELECT * FROM \"table\" WHERE \"id\" = ?");
        assert_eq!(stmt.values(), [SqlValue::Text(String::from("1234"))]);
    }

    #[test]
    fn test_nested_statement_value_order() {
        let inner = compile(&["\"b\" = ", ""], vec![SqlParam::from("b")]);
        let stmt = compile(
            &["\"a\" = ", " AND ", " AND \"c\" = ", ""],
            vec![
                SqlParam::from("a"),
                SqlParam::from(inner),
                SqlParam::from("c"),
            ],
        );
        assert_eq!(stmt.text(), "\"a\" = ? AND \"b\" = ? AND \"c\" = ?");
        assert_eq!(
            stmt.values(),
            [
                SqlValue::Text(String::from("a")),
                SqlValue::Text(String::from("b")),
                SqlValue::Text(String::from("c"))
            ]
        );
    }

    #[test]
    fn test_placeholder_invariant_holds_under_splicing() {
        let inner = compile(&["\"x\" = ", ""], vec![SqlParam::from(1_i64)]);
        let stmt = compile(
            &["A ", " B ", " C ", ""],
            vec![
                SqlParam::from(&inner),
                SqlParam::from(2_i64),
                SqlParam::from(vec![3_i64, 4_i64]),
            ],
        );
        assert_eq!(stmt.placeholder_count(), stmt.values().len());
    }

    #[test]
    fn test_sql_macro_interleaving() {
        let id = "1234";
        let status = "draft";
        let stmt = sql!("SELECT * FROM \"posts\" WHERE \"id\" = " {id} " AND \"status\" = " {status});
        assert_eq!(
            stmt.text(),
            "SELECT * FROM \"posts\" WHERE \"id\" = ? AND \"status\" = ?"
        );
        assert_eq!(stmt.values().len(), 2);
    }

    #[test]
    fn test_sql_macro_adjacent_params() {
        let stmt = sql!({1_i64} {2_i64});
        assert_eq!(stmt.text(), "??");
        assert_eq!(stmt.values(), [SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn test_sql_macro_empty() {
        let stmt = sql!();
        assert_eq!(stmt.text(), "");
        assert!(stmt.values().is_empty());
    }

    #[test]
    fn test_option_none_maps_to_omit() {
        let fragment: Option<Statement> = None;
        let stmt = sql!("SELECT * FROM \"posts\"" {fragment});
        assert_eq!(stmt.text(), "SELECT * FROM \"posts\"");
        assert!(stmt.values().is_empty());
    }
}
