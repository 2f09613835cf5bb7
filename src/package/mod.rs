//! The schema package: user-defined objects read from a dacpac.
//!
//! These types mirror the object graph DacFx serializes into `model.xml`.
//! They are read-only input to the model builder; nothing in the
//! transformation mutates them.

pub mod model_xml;
pub mod names;
pub mod reader;

use std::collections::HashMap;

pub use names::ObjectName;

/// All user-defined objects of one schema package.
#[derive(Debug, Clone, Default)]
pub struct SchemaPackage {
    pub tables: Vec<PackageTable>,
    pub views: Vec<PackageView>,
    pub data_types: Vec<PackageDataType>,
    pub default_constraints: Vec<PackageDefaultConstraint>,
    pub extended_properties: Vec<PackageExtendedProperty>,
}

impl SchemaPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every table and view column by its full name.
    ///
    /// View output columns are indexed as computed columns, which is how
    /// DacFx reports them.
    pub fn column_lookup(&self) -> HashMap<&ObjectName, ColumnRef<'_>> {
        let mut lookup = HashMap::new();
        for table in &self.tables {
            for column in &table.columns {
                lookup.insert(&column.name, ColumnRef::Table(column));
            }
        }
        for view in &self.views {
            for column in &view.columns {
                lookup.insert(&column.name, ColumnRef::View(column));
            }
        }
        lookup
    }
}

/// A column found by full name, either on a table or a view.
#[derive(Debug, Clone, Copy)]
pub enum ColumnRef<'a> {
    Table(&'a PackageColumn),
    View(&'a PackageViewColumn),
}

/// A user-defined table and its sub-objects.
#[derive(Debug, Clone, Default)]
pub struct PackageTable {
    /// `[schema].[table]`
    pub name: ObjectName,
    pub is_memory_optimized: bool,
    /// System-generated history table of a temporal table
    pub is_auto_generated_history_table: bool,
    pub columns: Vec<PackageColumn>,
    pub primary_keys: Vec<PackageKeyConstraint>,
    pub unique_constraints: Vec<PackageKeyConstraint>,
    pub foreign_keys: Vec<PackageForeignKey>,
    pub indexes: Vec<PackageIndex>,
}

impl PackageTable {
    pub fn schema(&self) -> &str {
        self.name.part(0).unwrap_or_default()
    }

    pub fn table_name(&self) -> &str {
        self.name.part(1).unwrap_or_default()
    }
}

/// Kind of a table column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnType {
    #[default]
    Simple,
    Computed,
    /// XML column set over the table's sparse columns
    ColumnSet,
}

/// A table column with its declared facets.
#[derive(Debug, Clone)]
pub struct PackageColumn {
    /// `[schema].[table].[column]`
    pub name: ObjectName,
    pub column_type: ColumnType,
    pub is_nullable: bool,
    pub is_identity: bool,
    /// Hidden columns (e.g. temporal period columns declared HIDDEN)
    pub is_hidden: bool,
    /// Computed column expression
    pub expression: Option<String>,
    /// Declared type; absent for computed columns
    pub data_type: Option<TypeReference>,
}

impl Default for PackageColumn {
    fn default() -> Self {
        Self {
            name: ObjectName::default(),
            column_type: ColumnType::Simple,
            is_nullable: true,
            is_identity: false,
            is_hidden: false,
            expression: None,
            data_type: None,
        }
    }
}

impl PackageColumn {
    pub fn column_name(&self) -> &str {
        self.name.last().unwrap_or_default()
    }
}

/// A reference to a built-in or user-defined type together with its facets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeReference {
    /// `[int]` for built-ins, `[schema].[alias]` for user-defined types
    pub name: ObjectName,
    pub length: i32,
    pub is_max: bool,
    pub precision: u8,
    pub scale: u8,
}

impl TypeReference {
    /// Declared length with `-1` standing for `max`.
    pub fn max_length(&self) -> i32 {
        if self.is_max {
            -1
        } else {
            self.length
        }
    }

    /// Schema-qualified names refer to user-defined alias types.
    pub fn is_user_defined(&self) -> bool {
        self.name.len() > 1
    }
}

/// A user-defined alias type (`CREATE TYPE [dbo].[Phone] FROM varchar(20)`).
#[derive(Debug, Clone, Default)]
pub struct PackageDataType {
    /// `[schema].[alias]`
    pub name: ObjectName,
    /// The underlying built-in type with the alias's own facets
    pub base_type: TypeReference,
}

/// Primary key or unique constraint.
#[derive(Debug, Clone, Default)]
pub struct PackageKeyConstraint {
    /// `[schema].[constraint]`, or unnamed
    pub name: ObjectName,
    pub is_clustered: bool,
    /// Member columns in key order, as full column names
    pub columns: Vec<ObjectName>,
}

/// ON DELETE action of a foreign key, as serialized in model.xml
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Unknown,
}

impl ForeignKeyAction {
    /// Decode the numeric `DeleteAction` property.
    pub fn from_model_value(value: &str) -> Self {
        match value.trim() {
            "0" => ForeignKeyAction::NoAction,
            "1" => ForeignKeyAction::Cascade,
            "2" => ForeignKeyAction::SetNull,
            "3" => ForeignKeyAction::SetDefault,
            _ => ForeignKeyAction::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackageForeignKey {
    pub name: ObjectName,
    pub columns: Vec<ObjectName>,
    /// `[schema].[table]` of the principal table
    pub foreign_table: ObjectName,
    pub foreign_columns: Vec<ObjectName>,
    pub delete_action: ForeignKeyAction,
}

#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    /// `[schema].[table].[index]`
    pub name: ObjectName,
    pub is_unique: bool,
    pub is_clustered: bool,
    pub filter_predicate: Option<String>,
    pub columns: Vec<ObjectName>,
}

/// A user-defined view and its output columns.
#[derive(Debug, Clone, Default)]
pub struct PackageView {
    /// `[schema].[view]`
    pub name: ObjectName,
    pub columns: Vec<PackageViewColumn>,
}

impl PackageView {
    pub fn schema(&self) -> &str {
        self.name.part(0).unwrap_or_default()
    }

    pub fn view_name(&self) -> &str {
        self.name.part(1).unwrap_or_default()
    }
}

/// One projected output item of a view.
#[derive(Debug, Clone, Default)]
pub struct PackageViewColumn {
    /// `[schema].[view].[column]`
    pub name: ObjectName,
    /// Objects the output expression depends on
    pub references: Vec<ObjectName>,
}

#[derive(Debug, Clone, Default)]
pub struct PackageDefaultConstraint {
    pub name: ObjectName,
    /// Full name of the column the default applies to
    pub target_column: ObjectName,
    pub expression: String,
}

/// An extended property, e.g. `[SqlColumn].[dbo].[T].[C].[MS_Description]`.
#[derive(Debug, Clone, Default)]
pub struct PackageExtendedProperty {
    pub name: ObjectName,
    /// Raw script value (`N'text'`); `None` when declared as NULL
    pub value: Option<String>,
}
