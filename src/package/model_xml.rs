//! Parse model.xml into a [`SchemaPackage`].
//!
//! Only the element types the scaffolder consumes are read; everything else
//! in the model (procedures, functions, permissions, ...) is ignored.

use std::collections::HashMap;

use crate::error::ScaffoldError;
use crate::model::store_type::StoreTypeKind;

use super::{
    ColumnType, ForeignKeyAction, ObjectName, PackageColumn, PackageDataType,
    PackageDefaultConstraint, PackageExtendedProperty, PackageForeignKey, PackageIndex,
    PackageKeyConstraint, PackageTable, PackageView, PackageViewColumn, SchemaPackage,
    TypeReference,
};

const NS: &str = "http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02";

type Node<'a, 'input> = roxmltree::Node<'a, 'input>;

/// Check if a node is an element with the given local name in the DAC namespace.
fn is_ns_element(node: &Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace() == Some(NS)
}

/// Find the first child element with the given local name in the DAC namespace.
fn find_child<'a, 'input>(parent: &Node<'a, 'input>, local_name: &str) -> Option<Node<'a, 'input>> {
    parent.children().find(|c| is_ns_element(c, local_name))
}

fn find_children<'a, 'input>(
    parent: &Node<'a, 'input>,
    local_name: &str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    let local_name = local_name.to_string();
    parent
        .children()
        .filter(move |c| is_ns_element(c, &local_name))
}

/// Value of a named Property, from its `Value` attribute or its `<Value>` child text.
fn get_property(elem: &Node, name: &str) -> Option<String> {
    let prop = find_children(elem, "Property").find(|p| p.attribute("Name") == Some(name))?;
    if let Some(v) = prop.attribute("Value") {
        return Some(v.to_string());
    }
    find_child(&prop, "Value")
        .and_then(|v| v.text())
        .map(|text| text.trim().to_string())
}

fn get_bool_property(elem: &Node, name: &str) -> Option<bool> {
    get_property(elem, name).map(|v| v.eq_ignore_ascii_case("true"))
}

fn get_number_property<T: std::str::FromStr>(elem: &Node, name: &str) -> Option<T> {
    get_property(elem, name).and_then(|v| v.trim().parse().ok())
}

fn find_relationship<'a, 'input>(elem: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    find_children(elem, "Relationship").find(|r| r.attribute("Name") == Some(name))
}

/// Names of all `References` entries in a named relationship, in document order.
fn relationship_refs(elem: &Node, rel_name: &str) -> Vec<ObjectName> {
    let Some(rel) = find_relationship(elem, rel_name) else {
        return Vec::new();
    };
    find_children(&rel, "Entry")
        .filter_map(|entry| find_child(&entry, "References"))
        .filter_map(|refs| refs.attribute("Name").map(ObjectName::parse))
        .collect()
}

fn relationship_ref(elem: &Node, rel_name: &str) -> Option<ObjectName> {
    relationship_refs(elem, rel_name).into_iter().next()
}

/// Inline `Element` children of a named relationship, in document order.
fn relationship_elements<'a, 'input>(elem: &Node<'a, 'input>, rel_name: &str) -> Vec<Node<'a, 'input>> {
    let Some(rel) = find_relationship(elem, rel_name) else {
        return Vec::new();
    };
    find_children(&rel, "Entry")
        .filter_map(|entry| find_child(&entry, "Element"))
        .collect()
}

fn element_name(elem: &Node) -> ObjectName {
    elem.attribute("Name")
        .map(ObjectName::parse)
        .unwrap_or_else(ObjectName::unnamed)
}

/// Columns referenced by `ColumnSpecifications/SqlIndexedColumnSpecification/Column`.
fn column_specifications(elem: &Node) -> Vec<ObjectName> {
    relationship_elements(elem, "ColumnSpecifications")
        .iter()
        .filter_map(|spec| relationship_ref(spec, "Column"))
        .collect()
}

/// Read length/precision/scale facets plus the `Type` reference of a type
/// specifier or alias type element.
///
/// DacFx omits facets that hold their default value. Precision falls back to
/// 18 for decimal/numeric; every other omitted facet is 0. Temporal types
/// always carry an explicit `Scale`, so a missing one means scale 0.
fn read_type_reference(elem: &Node) -> Option<TypeReference> {
    let name = relationship_ref(elem, "Type")?;
    let kind = match name.len() {
        1 => StoreTypeKind::classify(name.part(0).unwrap_or_default()),
        _ => StoreTypeKind::Other,
    };

    let precision: u8 = get_number_property(elem, "Precision").unwrap_or(match kind {
        StoreTypeKind::Decimal => 18,
        _ => 0,
    });
    let scale: u8 = get_number_property(elem, "Scale").unwrap_or(0);

    Some(TypeReference {
        name,
        length: get_number_property(elem, "Length").unwrap_or(0),
        is_max: get_bool_property(elem, "IsMax").unwrap_or(false),
        precision,
        scale,
    })
}

fn read_column(elem: &Node) -> Option<PackageColumn> {
    let column_type = match elem.attribute("Type")? {
        "SqlSimpleColumn" if get_bool_property(elem, "IsColumnSet").unwrap_or(false) => {
            ColumnType::ColumnSet
        }
        "SqlSimpleColumn" => ColumnType::Simple,
        "SqlComputedColumn" => ColumnType::Computed,
        _ => return None,
    };

    let data_type = relationship_elements(elem, "TypeSpecifier")
        .first()
        .and_then(read_type_reference);

    Some(PackageColumn {
        name: element_name(elem),
        column_type,
        is_nullable: get_bool_property(elem, "IsNullable").unwrap_or(true),
        is_identity: get_bool_property(elem, "IsIdentity").unwrap_or(false),
        is_hidden: get_bool_property(elem, "IsHidden").unwrap_or(false),
        expression: get_property(elem, "ExpressionScript"),
        data_type,
    })
}

fn read_table(elem: &Node) -> PackageTable {
    PackageTable {
        name: element_name(elem),
        is_memory_optimized: get_bool_property(elem, "IsMemoryOptimized").unwrap_or(false),
        is_auto_generated_history_table: get_bool_property(elem, "IsAutoGeneratedHistoryTable")
            .unwrap_or(false),
        columns: relationship_elements(elem, "Columns")
            .iter()
            .filter_map(read_column)
            .collect(),
        ..Default::default()
    }
}

fn read_view(elem: &Node) -> PackageView {
    PackageView {
        name: element_name(elem),
        columns: relationship_elements(elem, "Columns")
            .iter()
            .map(|col| PackageViewColumn {
                name: element_name(col),
                references: relationship_refs(col, "ExpressionDependencies"),
            })
            .collect(),
    }
}

/// A constraint or index waiting to be attached to its defining table.
enum TableObject {
    PrimaryKey(PackageKeyConstraint),
    Unique(PackageKeyConstraint),
    ForeignKey(PackageForeignKey),
    Index(PackageIndex),
}

fn read_key_constraint(elem: &Node, default_clustered: bool) -> PackageKeyConstraint {
    PackageKeyConstraint {
        name: element_name(elem),
        is_clustered: get_bool_property(elem, "IsClustered").unwrap_or(default_clustered),
        columns: column_specifications(elem),
    }
}

fn read_table_object(elem: &Node, element_type: &str) -> Option<(ObjectName, TableObject)> {
    let object = match element_type {
        "SqlPrimaryKeyConstraint" => {
            let table = relationship_ref(elem, "DefiningTable")?;
            (table, TableObject::PrimaryKey(read_key_constraint(elem, true)))
        }
        "SqlUniqueConstraint" => {
            let table = relationship_ref(elem, "DefiningTable")?;
            (table, TableObject::Unique(read_key_constraint(elem, false)))
        }
        "SqlForeignKeyConstraint" => {
            let table = relationship_ref(elem, "DefiningTable")?;
            let foreign_key = PackageForeignKey {
                name: element_name(elem),
                columns: relationship_refs(elem, "Columns"),
                foreign_table: relationship_ref(elem, "ForeignTable")?,
                foreign_columns: relationship_refs(elem, "ForeignColumns"),
                delete_action: get_property(elem, "DeleteAction")
                    .map(|v| ForeignKeyAction::from_model_value(&v))
                    .unwrap_or_default(),
            };
            (table, TableObject::ForeignKey(foreign_key))
        }
        "SqlIndex" => {
            let table = relationship_ref(elem, "IndexedObject")?;
            let index = PackageIndex {
                name: element_name(elem),
                is_unique: get_bool_property(elem, "IsUnique").unwrap_or(false),
                is_clustered: get_bool_property(elem, "IsClustered").unwrap_or(false),
                filter_predicate: get_property(elem, "FilterPredicate"),
                columns: column_specifications(elem),
            };
            (table, TableObject::Index(index))
        }
        _ => return None,
    };
    Some(object)
}

/// Parse a model.xml document into the package object graph.
pub fn parse_model_xml(xml: &str) -> Result<SchemaPackage, ScaffoldError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ScaffoldError::ModelXmlParseError { source: e })?;
    let root = doc.root_element();
    let model = find_child(&root, "Model").ok_or_else(|| ScaffoldError::InvalidModelXml {
        message: "no Model element under DataSchemaModel".to_string(),
    })?;

    let mut package = SchemaPackage::new();
    let mut table_objects = Vec::new();

    for elem in find_children(&model, "Element") {
        let Some(element_type) = elem.attribute("Type") else {
            continue;
        };

        match element_type {
            "SqlTable" => package.tables.push(read_table(&elem)),
            "SqlView" => package.views.push(read_view(&elem)),
            "SqlUserDefinedDataType" => {
                if let Some(base_type) = read_type_reference(&elem) {
                    package.data_types.push(PackageDataType {
                        name: element_name(&elem),
                        base_type,
                    });
                }
            }
            "SqlDefaultConstraint" => {
                if let Some(target_column) = relationship_ref(&elem, "ForColumn") {
                    package.default_constraints.push(PackageDefaultConstraint {
                        name: element_name(&elem),
                        target_column,
                        expression: get_property(&elem, "DefaultExpressionScript")
                            .unwrap_or_default(),
                    });
                }
            }
            "SqlExtendedProperty" => package.extended_properties.push(PackageExtendedProperty {
                name: element_name(&elem),
                value: get_property(&elem, "Value"),
            }),
            other => {
                if let Some(object) = read_table_object(&elem, other) {
                    table_objects.push(object);
                }
            }
        }
    }

    let table_positions: HashMap<ObjectName, usize> = package
        .tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.clone(), i))
        .collect();

    for (table_name, object) in table_objects {
        let Some(&position) = table_positions.get(&table_name) else {
            // Indexes on views and objects of tables from referenced packages
            continue;
        };
        let table = &mut package.tables[position];
        match object {
            TableObject::PrimaryKey(pk) => table.primary_keys.push(pk),
            TableObject::Unique(uq) => table.unique_constraints.push(uq),
            TableObject::ForeignKey(fk) => table.foreign_keys.push(fk),
            TableObject::Index(ix) => table.indexes.push(ix),
        }
    }

    tracing::debug!(
        tables = package.tables.len(),
        views = package.views.len(),
        data_types = package.data_types.len(),
        "parsed model.xml"
    );

    Ok(package)
}
