//! Table and column comments from `MS_Description` extended properties

use std::collections::HashMap;

use crate::package::{ObjectName, PackageExtendedProperty};

/// Extended property holding human-readable descriptions.
pub const DESCRIPTION_PROPERTY: &str = "MS_Description";

const TABLE_HOST: &str = "SqlTableBase";
const COLUMN_HOST: &str = "SqlColumn";

/// Extended property values keyed by their full hierarchical name.
///
/// When a name occurs more than once the first property in package order wins,
/// even if its value is null.
pub struct CommentIndex<'a> {
    values: HashMap<&'a ObjectName, Option<&'a str>>,
}

impl<'a> CommentIndex<'a> {
    pub fn new(properties: &'a [PackageExtendedProperty]) -> Self {
        let mut values = HashMap::new();
        for property in properties {
            values
                .entry(&property.name)
                .or_insert(property.value.as_deref());
        }
        Self { values }
    }

    /// `[SqlTableBase].[schema].[table].[MS_Description]`
    pub fn table_comment(&self, schema: &str, table: &str) -> Option<String> {
        self.lookup(ObjectName::from_parts([
            TABLE_HOST,
            schema,
            table,
            DESCRIPTION_PROPERTY,
        ]))
    }

    /// `[SqlColumn].[schema].[table].[column].[MS_Description]`
    pub fn column_comment(&self, schema: &str, table: &str, column: &str) -> Option<String> {
        self.lookup(ObjectName::from_parts([
            COLUMN_HOST,
            schema,
            table,
            column,
            DESCRIPTION_PROPERTY,
        ]))
    }

    fn lookup(&self, key: ObjectName) -> Option<String> {
        self.values
            .get(&key)
            .copied()
            .flatten()
            .map(fix_extended_property_value)
    }
}

/// Strip the `N'` prefix and closing quote of a scripted string literal.
///
/// Embedded doubled quotes are left as they are.
pub fn fix_extended_property_value(value: &str) -> String {
    let value = value.strip_prefix("N'").unwrap_or(value);
    let value = value.strip_suffix('\'').unwrap_or(value);
    value.to_string()
}
