//! Normalized relational model handed to code generators

use serde::Serialize;

/// Position of a table (or view) in [`DatabaseModel::tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TableId(pub usize);

/// Position of a column in its owning table's [`DatabaseTable::columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColumnId(pub usize);

/// The complete normalized schema of one package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseModel {
    pub database_name: String,
    pub default_schema: String,
    /// Connection string recorded for scaffolding tools that expect one
    pub connection_string: String,
    /// Tables first, then views, in package order
    pub tables: Vec<DatabaseTable>,
}

impl DatabaseModel {
    pub fn new(database_name: &str, default_schema: &str) -> Self {
        Self {
            database_name: database_name.to_string(),
            default_schema: default_schema.to_string(),
            connection_string: format!(
                "Data Source=(local);Initial Catalog={};Integrated Security=true",
                database_name
            ),
            tables: Vec::new(),
        }
    }

    pub fn table(&self, id: TableId) -> Option<&DatabaseTable> {
        self.tables.get(id.0)
    }

    pub fn find_table(&self, schema: &str, name: &str) -> Option<&DatabaseTable> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == name)
    }

    pub fn views(&self) -> impl Iterator<Item = &DatabaseTable> {
        self.tables.iter().filter(|t| t.kind == TableKind::View)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableKind {
    Table,
    /// Views carry columns only, never keys or indexes
    View,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseTable {
    pub id: TableId,
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
    pub comment: Option<String>,
    pub is_memory_optimized: bool,
    pub columns: Vec<DatabaseColumn>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub indexes: Vec<DatabaseIndex>,
}

impl DatabaseTable {
    pub fn new(id: TableId, schema: &str, name: &str, kind: TableKind) -> Self {
        Self {
            id,
            schema: schema.to_string(),
            name: name.to_string(),
            kind,
            comment: None,
            is_memory_optimized: false,
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(&self, id: ColumnId) -> Option<&DatabaseColumn> {
        self.columns.get(id.0)
    }

    /// Exact, case-sensitive column lookup by name.
    pub fn find_column(&self, name: &str) -> Option<ColumnId> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(ColumnId)
    }

    /// Names of the given columns, for display and assertions.
    pub fn column_names(&self, ids: &[ColumnId]) -> Vec<&str> {
        ids.iter()
            .filter_map(|id| self.column(*id))
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// When a column's value is produced by the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueGenerated {
    OnAdd,
    OnAddOrUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseColumn {
    pub table: TableId,
    pub name: String,
    pub is_nullable: bool,
    /// Store type such as `nvarchar(50)`; absent when it could not be resolved
    pub store_type: Option<String>,
    /// Default expression after filtering out runtime-implicit defaults
    pub default_value_sql: Option<String>,
    pub computed_column_sql: Option<String>,
    pub comment: Option<String>,
    pub value_generated: Option<ValueGenerated>,
    pub is_concurrency_token: bool,
}

impl DatabaseColumn {
    pub fn new(table: TableId, name: &str, is_nullable: bool) -> Self {
        Self {
            table,
            name: name.to_string(),
            is_nullable,
            store_type: None,
            default_value_sql: None,
            computed_column_sql: None,
            comment: None,
            value_generated: None,
            is_concurrency_token: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub table: TableId,
    pub columns: Vec<ColumnId>,
    /// `Some(false)` only for non-clustered keys
    pub clustered: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueConstraint {
    pub name: Option<String>,
    pub table: TableId,
    pub columns: Vec<ColumnId>,
    /// `Some(true)` only for clustered constraints
    pub clustered: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseIndex {
    pub name: Option<String>,
    pub table: TableId,
    pub columns: Vec<ColumnId>,
    pub is_unique: bool,
    pub filter: Option<String>,
    /// `Some(true)` only for clustered indexes
    pub clustered: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferentialAction {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub table: TableId,
    pub principal_table: TableId,
    /// Referencing columns on `table`
    pub columns: Vec<ColumnId>,
    /// Referenced columns on `principal_table`, parallel to `columns`
    pub principal_columns: Vec<ColumnId>,
    pub on_delete: Option<ReferentialAction>,
}
