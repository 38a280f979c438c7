//! Typed references to databases, tables and fields.
//!
//! References interpolate into templates as renderable code rather than
//! bound values: a field renders as `prefix + "name" + suffix`, a table
//! as `"name" + suffix`. The tree is built once from a [`SchemaDef`] and
//! is read-only afterward. Aliasing produces deep, independent clones;
//! the canonical unaliased tree is never mutated.

use std::collections::BTreeMap;
use std::ops::Index;

use crate::schema::{SchemaDef, TableDef};

/// The kind of entity a [`SqlRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// A database.
    Database,
    /// A table.
    Table,
    /// A column.
    Field,
}

/// A renderable reference to a database, table or field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlRef {
    /// What the reference points at.
    pub kind: RefKind,
    /// Name of the database, table or field.
    pub name: String,
    /// Code prefix, e.g. `"p".` on a field of an aliased table.
    pub prefix: String,
    /// Code suffix, e.g. ` as "p"` on an aliased table.
    pub suffix: String,
}

impl SqlRef {
    /// Creates a reference with empty prefix and suffix.
    #[must_use]
    pub fn new(kind: RefKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Creates a field reference.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::new(RefKind::Field, name)
    }

    /// Creates a table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(RefKind::Table, name)
    }

    /// Creates a database reference.
    #[must_use]
    pub fn database(name: impl Into<String>) -> Self {
        Self::new(RefKind::Database, name)
    }

    /// Renders the reference as code: `prefix + "name" + suffix`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}\"{}\"{}", self.prefix, self.name, self.suffix)
    }
}

/// A reference to a single column.
///
/// On an aliased table the field carries the alias prefix, and
/// [`canonical`](Self::canonical) recovers the bare, unqualified form
/// for contexts like INSERT column lists.
#[derive(Debug, Clone)]
pub struct FieldRef {
    meta: SqlRef,
    canonical: Option<Box<SqlRef>>,
}

impl FieldRef {
    /// Creates an unaliased field reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: SqlRef::field(name),
            canonical: None,
        }
    }

    /// The reference metadata used for rendering.
    #[must_use]
    pub fn meta(&self) -> &SqlRef {
        &self.meta
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// The unaliased form of this field. For a field of an aliased
    /// table this is the original bare reference; otherwise the field
    /// itself.
    #[must_use]
    pub fn canonical(&self) -> &SqlRef {
        self.canonical.as_deref().unwrap_or(&self.meta)
    }
}

/// A reference to a table and its fields.
#[derive(Debug, Clone)]
pub struct TableRef {
    meta: SqlRef,
    canonical: Option<Box<SqlRef>>,
    fields: BTreeMap<String, FieldRef>,
}

impl TableRef {
    fn build(def: &TableDef) -> Self {
        let fields = def
            .columns
            .iter()
            .map(|c| (c.name.clone(), FieldRef::new(c.name.clone())))
            .collect();
        Self {
            meta: SqlRef::table(def.name.clone()),
            canonical: None,
            fields,
        }
    }

    /// Deep-clones this table under an alias. Every cloned field gains
    /// the `"alias".` prefix and a back-pointer to the original; the
    /// clone's own descriptor gains the ` as "alias"` suffix. `self` is
    /// left untouched.
    #[must_use]
    pub fn aliased(&self, alias: &str) -> Self {
        let fields = self
            .fields
            .iter()
            .map(|(name, field)| {
                let aliased = FieldRef {
                    meta: SqlRef {
                        prefix: format!("\"{alias}\"."),
                        ..field.meta.clone()
                    },
                    canonical: Some(Box::new(field.meta.clone())),
                };
                (name.clone(), aliased)
            })
            .collect();
        Self {
            meta: SqlRef {
                suffix: format!(" as \"{alias}\""),
                ..self.meta.clone()
            },
            canonical: Some(Box::new(self.meta.clone())),
            fields,
        }
    }

    /// The reference metadata used for rendering.
    #[must_use]
    pub fn meta(&self) -> &SqlRef {
        &self.meta
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// The unaliased form of this table, for contexts like an INSERT
    /// target or a plain FROM without alias.
    #[must_use]
    pub fn canonical(&self) -> &SqlRef {
        self.canonical.as_deref().unwrap_or(&self.meta)
    }

    /// Looks up a field reference by column name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.fields.get(name)
    }
}

impl Index<&str> for TableRef {
    type Output = FieldRef;

    fn index(&self, name: &str) -> &FieldRef {
        self.field(name)
            .unwrap_or_else(|| panic!("no field {name:?} on table {:?}", self.meta.name))
    }
}

/// The canonical, unaliased reference tree of a schema: one
/// [`TableRef`] per declared table.
#[derive(Debug, Clone)]
pub struct DbRef {
    tables: BTreeMap<String, TableRef>,
}

impl DbRef {
    fn build(schema: &SchemaDef) -> Self {
        let tables = schema
            .tables()
            .iter()
            .map(|t| (t.name.clone(), TableRef::build(t)))
            .collect();
        Self { tables }
    }

    /// Looks up a table reference by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableRef> {
        self.tables.get(name)
    }
}

impl Index<&str> for DbRef {
    type Output = TableRef;

    fn index(&self, name: &str) -> &TableRef {
        self.table(name)
            .unwrap_or_else(|| panic!("no table {name:?} in schema"))
    }
}

/// The full reference tree handed to statement builders: the canonical
/// database tree plus one aliased table per requested alias.
#[derive(Debug, Clone)]
pub struct DbRefs {
    db: DbRef,
    aliases: BTreeMap<String, TableRef>,
}

impl DbRefs {
    /// The canonical, unaliased tree.
    #[must_use]
    pub fn db(&self) -> &DbRef {
        &self.db
    }

    /// Looks up an aliased table by alias.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&TableRef> {
        self.aliases.get(name)
    }
}

impl Index<&str> for DbRefs {
    type Output = TableRef;

    fn index(&self, name: &str) -> &TableRef {
        self.alias(name)
            .unwrap_or_else(|| panic!("no alias {name:?} in reference tree"))
    }
}

/// Builds the reference tree for a schema.
///
/// Each `(alias, table)` pair produces an independent aliased clone of
/// the named table; pairs naming a table absent from the schema are
/// ignored. The canonical tree is never affected by aliasing.
#[must_use]
pub fn build_refs(schema: &SchemaDef, aliases: &[(&str, &str)]) -> DbRefs {
    let db = DbRef::build(schema);
    let aliases = aliases
        .iter()
        .filter_map(|(alias, table)| {
            let aliased = db.table(table)?.aliased(alias);
            Some(((*alias).to_owned(), aliased))
        })
        .collect();
    DbRefs { db, aliases }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, ColumnType, TableDef};

    fn schema() -> SchemaDef {
        SchemaDef::new().table(
            TableDef::new("posts")
                .column(ColumnDef::new("id", ColumnType::Text))
                .column(ColumnDef::new("title", ColumnType::Text)),
        )
    }

    #[test]
    fn test_canonical_rendering() {
        let refs = build_refs(&schema(), &[]);
        let posts = &refs.db()["posts"];
        assert_eq!(posts.meta().render(), "\"posts\"");
        assert_eq!(posts["id"].meta().render(), "\"id\"");
    }

    #[test]
    fn test_alias_rendering() {
        let refs = build_refs(&schema(), &[("p", "posts")]);
        let p = &refs["p"];
        assert_eq!(p.meta().render(), "\"posts\" as \"p\"");
        assert_eq!(p["id"].meta().render(), "\"p\".\"id\"");
        assert_eq!(p["id"].canonical().render(), "\"id\"");
        assert_eq!(p.canonical().render(), "\"posts\"");
    }

    #[test]
    fn test_alias_never_mutates_canonical() {
        let refs = build_refs(&schema(), &[("p", "posts")]);
        let posts = &refs.db()["posts"];
        assert_eq!(posts.meta().suffix, "");
        assert_eq!(posts["id"].meta().prefix, "");
    }

    #[test]
    fn test_unknown_alias_target_ignored() {
        let refs = build_refs(&schema(), &[("x", "missing")]);
        assert!(refs.alias("x").is_none());
    }
}
