//! Build the normalized [`DatabaseModel`] from a [`SchemaPackage`].
//!
//! Construction runs in two stages:
//!
//! 1. Tables and their columns, one table at a time (in parallel, order preserved),
//!    followed by views.
//! 2. Keys, foreign keys, unique constraints and indexes, resolved by name against
//!    the finished stage 1 tables (see [`super::relationships`]).

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::ScaffoldError;
use crate::package::names::qualified_name;
use crate::package::{
    ColumnRef, ColumnType, ObjectName, PackageColumn, PackageTable, PackageView, SchemaPackage,
};

use super::comments::CommentIndex;
use super::database_model::{
    DatabaseColumn, DatabaseModel, DatabaseTable, TableId, TableKind, ValueGenerated,
};
use super::defaults::filter_clr_default;
use super::relationships::build_relationships;
use super::store_type::{resolve_type, TypeAliasMap};

/// Table maintained by the migrations runtime; never scaffolded.
pub const MIGRATION_HISTORY_TABLE: &str = "__EFMigrationsHistory";

/// Default schema when no schema filter is given.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Caller-supplied include lists. Empty lists include everything.
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    /// Schema names, compared exactly
    pub schemas: Vec<String>,
    /// Qualified `[schema].[name]` table names, compared exactly
    pub tables: Vec<String>,
}

impl ModelFilter {
    /// The first configured schema, else `dbo`.
    pub fn default_schema(&self) -> &str {
        self.schemas
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_SCHEMA)
    }

    fn includes_qualified(&self, schema: &str, name: &str) -> bool {
        self.tables.is_empty() || self.tables.contains(&qualified_name(schema, name))
    }

    fn includes_schema(&self, schema: &str) -> bool {
        self.schemas.is_empty() || self.schemas.iter().any(|s| s == schema)
    }

    fn includes_table(&self, table: &PackageTable) -> bool {
        let (schema, name) = (table.schema(), table.table_name());
        if table.is_auto_generated_history_table {
            tracing::debug!(schema, table = name, "skipping temporal history table");
            return false;
        }
        if !self.includes_qualified(schema, name) {
            return false;
        }
        if name == MIGRATION_HISTORY_TABLE {
            tracing::debug!(schema, table = name, "skipping migration history table");
            return false;
        }
        self.includes_schema(schema)
    }

    /// Views honour the qualified table list only.
    fn includes_view(&self, view: &PackageView) -> bool {
        self.includes_qualified(view.schema(), view.view_name())
    }
}

/// Package-wide lookups shared by all entity builders of one run.
struct BuildContext<'a> {
    aliases: TypeAliasMap,
    comments: CommentIndex<'a>,
    /// Default expression per target column; first constraint wins
    defaults: HashMap<&'a ObjectName, &'a str>,
    columns: HashMap<&'a ObjectName, ColumnRef<'a>>,
}

impl<'a> BuildContext<'a> {
    fn new(package: &'a SchemaPackage) -> Self {
        let mut defaults = HashMap::new();
        for constraint in &package.default_constraints {
            defaults
                .entry(&constraint.target_column)
                .or_insert(constraint.expression.as_str());
        }

        Self {
            aliases: TypeAliasMap::from_data_types(&package.data_types),
            comments: CommentIndex::new(&package.extended_properties),
            defaults,
            columns: package.column_lookup(),
        }
    }
}

/// Transform a schema package into a normalized database model.
///
/// Fails only when a primary key names a column its table does not have;
/// every other unresolvable reference is dropped with a warning.
pub fn build_model(
    package: &SchemaPackage,
    database_name: &str,
    filter: &ModelFilter,
) -> Result<DatabaseModel, ScaffoldError> {
    let context = BuildContext::new(package);

    let sources: Vec<&PackageTable> = package
        .tables
        .iter()
        .filter(|t| filter.includes_table(t))
        .collect();

    // Stage 1: tables and columns
    let mut tables: Vec<DatabaseTable> = sources
        .par_iter()
        .enumerate()
        .map(|(i, source)| build_table(source, TableId(i), &context))
        .collect();

    // Stage 2: relationships against the finished tables
    let relationships = build_relationships(&sources, &tables)?;
    for (table, related) in tables.iter_mut().zip(relationships) {
        table.primary_key = related.primary_key;
        table.foreign_keys = related.foreign_keys;
        table.unique_constraints = related.unique_constraints;
        table.indexes = related.indexes;
    }

    let table_count = tables.len();
    for view in package.views.iter().filter(|v| filter.includes_view(v)) {
        let id = TableId(tables.len());
        tables.push(build_view(view, id, &context));
    }

    tracing::info!(
        database = database_name,
        tables = table_count,
        views = tables.len() - table_count,
        skipped_tables = package.tables.len() - table_count,
        "built database model"
    );

    let mut model = DatabaseModel::new(database_name, filter.default_schema());
    model.tables = tables;
    Ok(model)
}

fn build_table(source: &PackageTable, id: TableId, context: &BuildContext<'_>) -> DatabaseTable {
    let (schema, name) = (source.schema(), source.table_name());
    let mut table = DatabaseTable::new(id, schema, name, TableKind::Table);
    table.is_memory_optimized = source.is_memory_optimized;
    table.comment = context.comments.table_comment(schema, name);
    table.columns = source
        .columns
        .iter()
        .filter_map(|column| build_column(column, &table, context))
        .collect();
    table
}

fn build_column(
    column: &PackageColumn,
    table: &DatabaseTable,
    context: &BuildContext<'_>,
) -> Option<DatabaseColumn> {
    let name = column.column_name();
    if column.is_hidden || column.column_type == ColumnType::ColumnSet {
        tracing::debug!(table = %table.name, column = name, "skipping hidden or column set column");
        return None;
    }

    let mut result = DatabaseColumn::new(table.id, name, column.is_nullable);
    if column.column_type == ColumnType::Computed {
        result.computed_column_sql = column.expression.clone();
        return Some(result);
    }

    result.comment = context
        .comments
        .column_comment(&table.schema, &table.name, name);

    let resolved = column
        .data_type
        .as_ref()
        .and_then(|t| resolve_type(t, &context.aliases));

    if let Some(raw) = context.defaults.get(&column.name) {
        let system_type = resolved.as_ref().map(|r| r.system_type_name.as_str());
        result.default_value_sql = filter_clr_default(system_type, column.is_nullable, raw);
    }

    let is_rowversion = resolved.as_ref().is_some_and(|r| r.is_rowversion());
    result.value_generated = if column.is_identity {
        Some(ValueGenerated::OnAdd)
    } else if is_rowversion {
        Some(ValueGenerated::OnAddOrUpdate)
    } else {
        None
    };
    result.is_concurrency_token = is_rowversion;
    result.store_type = resolved.map(|r| r.store_type);

    Some(result)
}

/// Views carry columns only. Each output column must be bound to exactly one
/// non-computed table column, whose type and nullability it takes over.
fn build_view(view: &PackageView, id: TableId, context: &BuildContext<'_>) -> DatabaseTable {
    let mut table = DatabaseTable::new(id, view.schema(), view.view_name(), TableKind::View);

    for view_column in &view.columns {
        let name = view_column.name.last().unwrap_or_default();
        let mut bound = view_column
            .references
            .iter()
            .filter_map(|r| context.columns.get(r));

        let source = match (bound.next(), bound.next()) {
            (Some(ColumnRef::Table(source)), None) => *source,
            _ => {
                tracing::debug!(view = %table.name, column = name, "view column not bound to a single table column, skipped");
                continue;
            }
        };
        if source.column_type == ColumnType::Computed {
            continue;
        }

        let mut column = DatabaseColumn::new(id, name, source.is_nullable);
        column.store_type = source
            .data_type
            .as_ref()
            .and_then(|t| resolve_type(t, &context.aliases))
            .map(|r| r.store_type);
        table.columns.push(column);
    }

    table
}
