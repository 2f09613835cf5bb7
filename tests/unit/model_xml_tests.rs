//! Unit tests for model.xml parsing into the schema package

use dacpac_scaffold::package::model_xml::parse_model_xml;
use dacpac_scaffold::package::{ColumnRef, ColumnType, ForeignKeyAction, ObjectName};

use crate::common::{Col, ModelXmlBuilder};

#[test]
fn test_type_specifier_facets() {
    let xml = ModelXmlBuilder::new()
        .table(
            "[dbo].[T]",
            &[
                Col::new("A", "nvarchar").length(50),
                Col::new("B", "varbinary").max(),
                Col::new("C", "decimal").precision(9).scale(3),
                Col::new("D", "datetimeoffset"),
                Col::new("E", "[dbo].[Alias]"),
            ],
        )
        .finish();
    let package = parse_model_xml(&xml).unwrap();
    let columns = &package.tables[0].columns;

    let a = columns[0].data_type.as_ref().unwrap();
    assert_eq!(a.length, 50);
    assert!(!a.is_max);
    assert_eq!(a.max_length(), 50);

    let b = columns[1].data_type.as_ref().unwrap();
    assert!(b.is_max);
    assert_eq!(b.max_length(), -1);

    let c = columns[2].data_type.as_ref().unwrap();
    assert_eq!((c.precision, c.scale), (9, 3));

    let d = columns[3].data_type.as_ref().unwrap();
    assert_eq!(d.scale, 7);

    let e = columns[4].data_type.as_ref().unwrap();
    assert!(e.is_user_defined());
    assert_eq!(e.name, ObjectName::from_parts(["dbo", "Alias"]));
}

#[test]
fn test_column_flags() {
    let xml = ModelXmlBuilder::new()
        .table(
            "[dbo].[T]",
            &[
                Col::new("Id", "int").not_null().identity(),
                Col::new("Start", "datetime2").not_null().hidden(),
                Col::new("Extra", "xml").column_set(),
                Col::computed("Calc", "([Id]+(1))"),
                Col::new("Optional", "int"),
            ],
        )
        .finish();
    let package = parse_model_xml(&xml).unwrap();
    let columns = &package.tables[0].columns;

    assert!(!columns[0].is_nullable);
    assert!(columns[0].is_identity);
    assert!(columns[1].is_hidden);
    assert_eq!(columns[2].column_type, ColumnType::ColumnSet);
    assert_eq!(columns[3].column_type, ColumnType::Computed);
    assert_eq!(columns[3].expression.as_deref(), Some("([Id]+(1))"));
    assert!(columns[4].is_nullable);
    assert!(!columns[4].is_identity);
}

#[test]
fn test_escaped_bracket_names() {
    let xml = ModelXmlBuilder::new()
        .table("[dbo].[Odd]]Name]", &[Col::new("Id", "int")])
        .finish();
    let package = parse_model_xml(&xml).unwrap();
    let table = &package.tables[0];

    assert_eq!(table.table_name(), "Odd]Name");
    assert_eq!(table.columns[0].name.parts(), ["dbo", "Odd]Name", "Id"]);
}

#[test]
fn test_constraints_in_document_order() {
    let xml = ModelXmlBuilder::new()
        .table("[dbo].[A]", &[Col::new("Id", "int"), Col::new("BId", "int")])
        .table("[dbo].[B]", &[Col::new("Id", "int")])
        .foreign_key(Some("[dbo].[FK_1]"), "[dbo].[A]", &["BId"], "[dbo].[B]", &["Id"], 1)
        .foreign_key(Some("[dbo].[FK_2]"), "[dbo].[A]", &["BId"], "[dbo].[B]", &["Id"], 2)
        .unique(None, "[dbo].[B]", &["Id"], false)
        .finish();
    let package = parse_model_xml(&xml).unwrap();

    let a = &package.tables[0];
    let names: Vec<String> = a.foreign_keys.iter().map(|fk| fk.name.to_string()).collect();
    assert_eq!(names, vec!["[dbo].[FK_1]", "[dbo].[FK_2]"]);
    assert_eq!(a.foreign_keys[0].delete_action, ForeignKeyAction::Cascade);
    assert_eq!(a.foreign_keys[1].delete_action, ForeignKeyAction::SetNull);
    assert_eq!(
        a.foreign_keys[0].columns,
        vec![ObjectName::from_parts(["dbo", "A", "BId"])]
    );

    let b = &package.tables[1];
    assert_eq!(b.unique_constraints.len(), 1);
    assert!(!b.unique_constraints[0].name.has_name());
    assert!(!b.unique_constraints[0].is_clustered);
}

#[test]
fn test_primary_key_clustered_by_default() {
    let xml = ModelXmlBuilder::new()
        .table("[dbo].[A]", &[Col::new("Id", "int").not_null()])
        .primary_key(None, "[dbo].[A]", &["Id"], true)
        .finish();
    let package = parse_model_xml(&xml).unwrap();
    assert!(package.tables[0].primary_keys[0].is_clustered);
}

#[test]
fn test_objects_of_unknown_tables_ignored() {
    let xml = ModelXmlBuilder::new()
        .table("[dbo].[A]", &[Col::new("Id", "int")])
        .primary_key(None, "[other].[Gone]", &["Id"], true)
        .index("IX_Gone", "[other].[Gone]", &["Id"], &[], None)
        .finish();
    let package = parse_model_xml(&xml).unwrap();
    assert!(package.tables[0].primary_keys.is_empty());
    assert!(package.tables[0].indexes.is_empty());
}

#[test]
fn test_column_lookup_covers_tables_and_views() {
    let xml = ModelXmlBuilder::new()
        .table("[dbo].[A]", &[Col::new("Id", "int")])
        .view("[dbo].[V]", &[("Id", &["[dbo].[A].[Id]"])])
        .finish();
    let package = parse_model_xml(&xml).unwrap();
    let lookup = package.column_lookup();

    assert!(matches!(
        lookup.get(&ObjectName::from_parts(["dbo", "A", "Id"])),
        Some(ColumnRef::Table(_))
    ));
    assert!(matches!(
        lookup.get(&ObjectName::from_parts(["dbo", "V", "Id"])),
        Some(ColumnRef::View(_))
    ));
    assert!(lookup.get(&ObjectName::from_parts(["dbo", "A"])).is_none());
}

#[test]
fn test_elements_outside_scaffold_scope_ignored() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<DataSchemaModel xmlns="http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02">
  <Model>
    <Element Type="SqlDatabaseOptions" />
    <Element Type="SqlSchema" Name="[sales]" />
    <Element Type="SqlProcedure" Name="[dbo].[DoWork]" />
  </Model>
</DataSchemaModel>"#;
    let package = parse_model_xml(xml).unwrap();
    assert!(package.tables.is_empty());
    assert!(package.views.is_empty());
    assert!(package.data_types.is_empty());
}
