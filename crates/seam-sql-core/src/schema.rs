//! Schema descriptions for tables and columns.
//!
//! A [`SchemaDef`] drives two things: building the reference tree
//! (see [`crate::refs::build_refs`]) and deciding which result columns
//! hold structured values that need decoding at the read boundary.

/// The declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Boolean column.
    Boolean,
    /// Integer column.
    Integer,
    /// Floating-point column.
    Real,
    /// Text column (including ISO-8601 datetimes stored as text).
    Text,
    /// Structured column, stored as serialized JSON text and decoded in
    /// place when rows are read back.
    Json,
}

impl ColumnType {
    /// Returns whether values of this type are stored as serialized text
    /// and must be decoded when reading rows.
    #[must_use]
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A column declaration.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// The SQL column name.
    pub name: String,
    /// The declared column type.
    pub column_type: ColumnType,
    /// Whether the column admits NULL.
    pub nullable: bool,
}

impl ColumnDef {
    /// Creates a non-nullable column declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
        }
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A table declaration: a name and its ordered columns.
#[derive(Debug, Clone)]
pub struct TableDef {
    /// The SQL table name.
    pub name: String,
    /// The declared columns, in order.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Creates a table declaration with no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column declaration.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Looks up a column declaration by name.
    #[must_use]
    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Iterates over the columns holding structured values.
    pub fn structured_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.column_type.is_structured())
    }
}

/// A database schema: the set of declared tables.
#[derive(Debug, Clone, Default)]
pub struct SchemaDef {
    tables: Vec<TableDef>,
}

impl SchemaDef {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table declaration.
    #[must_use]
    pub fn table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    /// Looks up a table declaration by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// The declared tables, in order.
    #[must_use]
    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }
}
