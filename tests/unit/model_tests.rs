//! Unit tests for model building over parsed packages

use pretty_assertions::assert_eq;

use dacpac_scaffold::model::defaults::filter_clr_default;
use dacpac_scaffold::model::store_type::store_type;
use dacpac_scaffold::model::{build_model, ModelFilter, TableKind, ValueGenerated};
use dacpac_scaffold::package::model_xml::parse_model_xml;
use dacpac_scaffold::package::SchemaPackage;

use crate::common::{Col, ModelXmlBuilder};

fn parse(builder: ModelXmlBuilder) -> SchemaPackage {
    parse_model_xml(&builder.finish()).unwrap()
}

#[test]
fn test_store_type_table() {
    let cases: &[(&str, i32, u8, u8, &str)] = &[
        ("decimal", 0, 18, 2, "decimal(18, 2)"),
        ("numeric", 0, 38, 10, "numeric(38, 10)"),
        ("varchar", -1, 0, 0, "varchar(max)"),
        ("nvarchar", 4000, 0, 0, "nvarchar(4000)"),
        ("binary", 16, 0, 0, "binary(16)"),
        ("datetime2", 0, 0, 7, "datetime2"),
        ("datetime2", 0, 0, 3, "datetime2(3)"),
        ("datetimeoffset", 0, 0, 0, "datetimeoffset(0)"),
        ("timestamp", 8, 0, 0, "rowversion"),
        ("money", 8, 19, 4, "money"),
    ];
    for (name, length, precision, scale, expected) in cases {
        assert_eq!(
            store_type(name, *length, *precision, *scale),
            *expected,
            "store type of {name}"
        );
    }
}

#[test]
fn test_default_filter_nullable_always_kept() {
    for type_name in ["int", "bit", "money", "date", "uniqueidentifier"] {
        assert!(filter_clr_default(Some(type_name), true, "((0))").is_some());
    }
}

#[test]
fn test_build_from_parsed_package() {
    let package = parse(
        ModelXmlBuilder::new()
            .table(
                "[dbo].[Items]",
                &[
                    Col::new("Id", "bigint").not_null().identity(),
                    Col::new("Price", "money").not_null(),
                ],
            )
            .default_constraint("[dbo].[Items]", "Price", "((0.0))")
            .primary_key(Some("[dbo].[PK_Items]"), "[dbo].[Items]", &["Id"], true),
    );

    let model = build_model(&package, "Inventory", &ModelFilter::default()).unwrap();
    assert_eq!(model.tables.len(), 1);

    let items = &model.tables[0];
    assert_eq!(items.kind, TableKind::Table);
    assert_eq!(items.columns[0].store_type.as_deref(), Some("bigint"));
    assert_eq!(items.columns[0].value_generated, Some(ValueGenerated::OnAdd));
    assert_eq!(items.columns[1].default_value_sql, None);
    assert_eq!(
        items.primary_key.as_ref().and_then(|pk| pk.name.as_deref()),
        Some("PK_Items")
    );
}

#[test]
fn test_model_serializes_to_json() {
    let package = parse(
        ModelXmlBuilder::new()
            .table("[dbo].[Items]", &[Col::new("Id", "int").not_null()])
            .primary_key(None, "[dbo].[Items]", &["Id"], false),
    );
    let model = build_model(&package, "Inventory", &ModelFilter::default()).unwrap();

    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["database_name"], "Inventory");
    assert_eq!(json["default_schema"], "dbo");

    let table = &json["tables"][0];
    assert_eq!(table["kind"], "Table");
    assert_eq!(table["columns"][0]["name"], "Id");
    assert_eq!(table["columns"][0]["store_type"], "int");
    assert_eq!(table["columns"][0]["table"], 0);
    assert_eq!(table["primary_key"]["columns"], serde_json::json!([0]));
    assert_eq!(table["primary_key"]["clustered"], false);
    assert!(table["primary_key"]["name"].is_null());
}
