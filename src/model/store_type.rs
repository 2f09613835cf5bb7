//! Store type resolution for built-in and user-defined alias types

use std::collections::HashMap;

use crate::package::{PackageDataType, TypeReference};

/// Store type of fixed-length auto-updating binary columns.
pub const ROWVERSION: &str = "rowversion";

/// Fractional-seconds precision SQL Server applies when none is declared.
pub const DEFAULT_TEMPORAL_SCALE: u8 = 7;

/// Length facet value meaning `max`.
pub const MAX_LENGTH: i32 = -1;

/// How a built-in type's facets are rendered into its store type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTypeKind {
    /// `timestamp` / `rowversion`
    RowVersion,
    /// `decimal` / `numeric`
    Decimal,
    /// `datetime2`, `datetimeoffset`, `time`
    FractionalTemporal,
    /// `binary`, `varbinary`, `char`, `varchar`, `nchar`, `nvarchar`
    LengthBounded,
    Other,
}

impl StoreTypeKind {
    pub fn classify(type_name: &str) -> Self {
        match type_name.to_ascii_lowercase().as_str() {
            "timestamp" | "rowversion" => StoreTypeKind::RowVersion,
            "decimal" | "numeric" => StoreTypeKind::Decimal,
            "datetime2" | "datetimeoffset" | "time" => StoreTypeKind::FractionalTemporal,
            "binary" | "varbinary" | "char" | "varchar" | "nchar" | "nvarchar" => {
                StoreTypeKind::LengthBounded
            }
            _ => StoreTypeKind::Other,
        }
    }
}

/// Render a built-in type and its facets as a store type string.
///
/// `max_length` is [`MAX_LENGTH`] for `max` types.
pub fn store_type(type_name: &str, max_length: i32, precision: u8, scale: u8) -> String {
    match StoreTypeKind::classify(type_name) {
        StoreTypeKind::RowVersion => ROWVERSION.to_string(),
        StoreTypeKind::Decimal => format!("{}({}, {})", type_name, precision, scale),
        StoreTypeKind::FractionalTemporal if scale != DEFAULT_TEMPORAL_SCALE => {
            format!("{}({})", type_name, scale)
        }
        StoreTypeKind::LengthBounded if max_length == MAX_LENGTH => format!("{}(max)", type_name),
        StoreTypeKind::LengthBounded => format!("{}({})", type_name, max_length),
        StoreTypeKind::FractionalTemporal | StoreTypeKind::Other => type_name.to_string(),
    }
}

/// A column type after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub store_type: String,
    /// The underlying built-in type name, used for default filtering
    pub system_type_name: String,
}

impl ResolvedType {
    pub fn is_rowversion(&self) -> bool {
        self.store_type == ROWVERSION
    }
}

/// User-defined alias types keyed case-insensitively by `schema.alias`.
#[derive(Debug, Clone, Default)]
pub struct TypeAliasMap {
    aliases: HashMap<String, ResolvedType>,
}

impl TypeAliasMap {
    pub fn from_data_types(data_types: &[PackageDataType]) -> Self {
        let mut aliases = HashMap::new();

        for udt in data_types {
            let (Some(schema), Some(name)) = (udt.name.part(0), udt.name.part(1)) else {
                continue;
            };
            let base = &udt.base_type;
            let system_type_name = base.name.part(0).unwrap_or_default().to_string();
            let resolved = ResolvedType {
                store_type: store_type(
                    &system_type_name,
                    base.max_length(),
                    base.precision,
                    base.scale,
                ),
                system_type_name,
            };

            let key = alias_key(schema, name);
            if aliases.contains_key(&key) {
                tracing::warn!(alias = %udt.name, "duplicate alias type ignored");
                continue;
            }
            aliases.insert(key, resolved);
        }

        Self { aliases }
    }

    pub fn get(&self, schema: &str, name: &str) -> Option<&ResolvedType> {
        self.aliases.get(&alias_key(schema, name))
    }
}

fn alias_key(schema: &str, name: &str) -> String {
    format!("{}.{}", schema, name).to_lowercase()
}

/// Resolve a declared column type.
///
/// Schema-qualified types go through the alias map; a miss leaves the type
/// unresolved rather than failing.
pub fn resolve_type(type_ref: &TypeReference, aliases: &TypeAliasMap) -> Option<ResolvedType> {
    if type_ref.is_user_defined() {
        let schema = type_ref.name.part(0).unwrap_or_default();
        let name = type_ref.name.part(1).unwrap_or_default();
        let resolved = aliases.get(schema, name).cloned();
        if resolved.is_none() {
            tracing::warn!(alias = %type_ref.name, "unknown alias type, store type left unset");
        }
        return resolved;
    }

    let type_name = type_ref.name.part(0)?;
    Some(ResolvedType {
        store_type: store_type(
            type_name,
            type_ref.max_length(),
            type_ref.precision,
            type_ref.scale,
        ),
        system_type_name: type_name.to_string(),
    })
}
