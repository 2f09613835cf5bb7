//! Second pass: keys, foreign keys, unique constraints and indexes.
//!
//! Runs after every table and its columns exist. Package objects refer to
//! tables and columns by name; those names are resolved here against the
//! already built tables through a [`TableIndex`]. Only primary keys treat an
//! unknown column as fatal. Every other relationship drops what it cannot
//! resolve and is discarded once nothing is left.

use std::collections::HashMap;

use crate::error::ScaffoldError;
use crate::package::{
    ForeignKeyAction, ObjectName, PackageForeignKey, PackageIndex, PackageKeyConstraint,
    PackageTable,
};

use super::database_model::{
    ColumnId, DatabaseIndex, DatabaseTable, ForeignKey, PrimaryKey, ReferentialAction, TableId,
    UniqueConstraint,
};

/// Lookup from `(schema, name)` to the built table.
pub struct TableIndex<'a> {
    tables: &'a [DatabaseTable],
    by_name: HashMap<(&'a str, &'a str), TableId>,
}

impl<'a> TableIndex<'a> {
    pub fn new(tables: &'a [DatabaseTable]) -> Self {
        let by_name = tables
            .iter()
            .map(|t| ((t.schema.as_str(), t.name.as_str()), t.id))
            .collect();
        Self { tables, by_name }
    }

    pub fn get(&self, schema: &str, name: &str) -> Option<&'a DatabaseTable> {
        let id = self.by_name.get(&(schema, name))?;
        self.tables.get(id.0)
    }

    /// Resolve a `[schema].[table]` reference.
    pub fn resolve(&self, name: &ObjectName) -> Option<&'a DatabaseTable> {
        self.get(name.part(0)?, name.part(1)?)
    }
}

/// Relationship objects produced for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRelationships {
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub indexes: Vec<DatabaseIndex>,
}

/// Build relationships for every table.
///
/// `sources[i]` is the package table `tables[i]` was built from. The result is
/// parallel to both.
pub fn build_relationships(
    sources: &[&PackageTable],
    tables: &[DatabaseTable],
) -> Result<Vec<TableRelationships>, ScaffoldError> {
    let index = TableIndex::new(tables);

    sources
        .iter()
        .zip(tables)
        .map(|(source, table)| -> Result<TableRelationships, ScaffoldError> {
            Ok(TableRelationships {
                primary_key: build_primary_key(source, table)?,
                foreign_keys: source
                    .foreign_keys
                    .iter()
                    .filter_map(|fk| build_foreign_key(fk, table, &index))
                    .collect(),
                unique_constraints: source
                    .unique_constraints
                    .iter()
                    .filter_map(|uq| build_unique_constraint(uq, table))
                    .collect(),
                indexes: source
                    .indexes
                    .iter()
                    .filter_map(|ix| build_index(ix, table))
                    .collect(),
            })
        })
        .collect()
}

/// Column of `table` named by the third part of a `[schema].[table].[column]` reference.
fn resolve_column(table: &DatabaseTable, column: &ObjectName) -> Option<ColumnId> {
    table.find_column(column.part(2)?)
}

/// Resolve member columns, skipping the ones that do not exist on `table`.
fn resolve_columns(table: &DatabaseTable, columns: &[ObjectName]) -> Vec<ColumnId> {
    columns
        .iter()
        .filter_map(|c| {
            let resolved = resolve_column(table, c);
            if resolved.is_none() {
                tracing::debug!(table = %table.name, column = %c, "member column not found, skipped");
            }
            resolved
        })
        .collect()
}

/// Name part `index` of an explicitly named constraint.
fn constraint_name(name: &ObjectName, index: usize) -> Option<String> {
    if !name.has_name() {
        return None;
    }
    name.part(index).map(str::to_string)
}

fn build_primary_key(
    source: &PackageTable,
    table: &DatabaseTable,
) -> Result<Option<PrimaryKey>, ScaffoldError> {
    let Some(pk) = source.primary_keys.first() else {
        return Ok(None);
    };

    let mut columns = Vec::with_capacity(pk.columns.len());
    for column in &pk.columns {
        let id = resolve_column(table, column).ok_or_else(|| {
            ScaffoldError::PrimaryKeyColumnNotFound {
                schema: table.schema.clone(),
                table: table.name.clone(),
                constraint: constraint_name(&pk.name, 1).unwrap_or_else(|| "<unnamed>".to_string()),
                column: column.part(2).unwrap_or_default().to_string(),
            }
        })?;
        columns.push(id);
    }

    if columns.is_empty() {
        return Ok(None);
    }

    Ok(Some(PrimaryKey {
        name: constraint_name(&pk.name, 1),
        table: table.id,
        columns,
        clustered: (!pk.is_clustered).then_some(false),
    }))
}

fn build_foreign_key(
    fk: &PackageForeignKey,
    table: &DatabaseTable,
    index: &TableIndex<'_>,
) -> Option<ForeignKey> {
    let Some(principal) = index.resolve(&fk.foreign_table) else {
        tracing::debug!(
            table = %table.name,
            principal = %fk.foreign_table,
            "principal table not in model, foreign key dropped"
        );
        return None;
    };

    let (columns, principal_columns): (Vec<ColumnId>, Vec<ColumnId>) = fk
        .columns
        .iter()
        .zip(&fk.foreign_columns)
        .filter_map(|(column, foreign_column)| {
            Some((
                resolve_column(table, column)?,
                resolve_column(principal, foreign_column)?,
            ))
        })
        .unzip();

    if principal_columns.is_empty() {
        tracing::warn!(
            table = %table.name,
            principal = %fk.foreign_table,
            "no foreign key columns resolved, foreign key dropped"
        );
        return None;
    }

    Some(ForeignKey {
        name: constraint_name(&fk.name, 1),
        table: table.id,
        principal_table: principal.id,
        columns,
        principal_columns,
        on_delete: referential_action(fk.delete_action),
    })
}

fn referential_action(action: ForeignKeyAction) -> Option<ReferentialAction> {
    match action {
        ForeignKeyAction::NoAction => Some(ReferentialAction::NoAction),
        ForeignKeyAction::Cascade => Some(ReferentialAction::Cascade),
        ForeignKeyAction::SetNull => Some(ReferentialAction::SetNull),
        ForeignKeyAction::SetDefault => Some(ReferentialAction::SetDefault),
        ForeignKeyAction::Unknown => None,
    }
}

fn build_unique_constraint(
    uq: &PackageKeyConstraint,
    table: &DatabaseTable,
) -> Option<UniqueConstraint> {
    let columns = resolve_columns(table, &uq.columns);
    if columns.is_empty() {
        tracing::warn!(table = %table.name, constraint = %uq.name, "unique constraint has no resolvable columns, dropped");
        return None;
    }

    Some(UniqueConstraint {
        name: constraint_name(&uq.name, 1),
        table: table.id,
        columns,
        clustered: uq.is_clustered.then_some(true),
    })
}

fn build_index(ix: &PackageIndex, table: &DatabaseTable) -> Option<DatabaseIndex> {
    let columns = resolve_columns(table, &ix.columns);
    if columns.is_empty() {
        tracing::warn!(table = %table.name, index = %ix.name, "index has no resolvable columns, dropped");
        return None;
    }

    Some(DatabaseIndex {
        name: ix.name.part(2).map(str::to_string),
        table: table.id,
        columns,
        is_unique: ix.is_unique,
        filter: ix.filter_predicate.clone(),
        clustered: ix.is_clustered.then_some(true),
    })
}
