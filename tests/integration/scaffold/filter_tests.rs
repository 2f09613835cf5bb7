//! Table selection: history tables, schema and table include lists

use pretty_assertions::assert_eq;

use dacpac_scaffold::model::TableKind;

use crate::common::{Col, ModelXmlBuilder, TestContext};

fn package() -> String {
    ModelXmlBuilder::new()
        .table("[dbo].[Orders]", &[Col::new("Id", "int").not_null()])
        .table(
            "[dbo].[__EFMigrationsHistory]",
            &[
                Col::new("MigrationId", "nvarchar").length(150).not_null(),
                Col::new("ProductVersion", "nvarchar").length(32).not_null(),
            ],
        )
        .table_with(
            "[dbo].[OrdersHistory]",
            &[("IsAutoGeneratedHistoryTable", "True")],
            &[Col::new("Id", "int").not_null()],
        )
        .table("[audit].[Events]", &[Col::new("Id", "bigint").not_null()])
        .table("[audit].[__EFMigrationsHistory]", &[Col::new("MigrationId", "nvarchar").length(150)])
        .view("[dbo].[RecentOrders]", &[("Id", &["[dbo].[Orders].[Id]"])])
        .view("[audit].[RecentEvents]", &[("Id", &["[audit].[Events].[Id]"])])
        .finish()
}

fn qualified_names(model: &dacpac_scaffold::DatabaseModel) -> Vec<String> {
    model
        .tables
        .iter()
        .map(|t| format!("[{}].[{}]", t.schema, t.name))
        .collect()
}

#[test]
fn test_history_and_migration_tables_excluded() {
    let model = TestContext::with_model("Shop", &package()).scaffold();
    assert_eq!(
        qualified_names(&model),
        vec![
            "[dbo].[Orders]",
            "[audit].[Events]",
            "[dbo].[RecentOrders]",
            "[audit].[RecentEvents]",
        ]
    );
}

#[test]
fn test_tables_precede_views() {
    let model = TestContext::with_model("Shop", &package()).scaffold();
    let kinds: Vec<TableKind> = model.tables.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TableKind::Table,
            TableKind::Table,
            TableKind::View,
            TableKind::View
        ]
    );
}

#[test]
fn test_schema_filter_applies_to_tables_only() {
    let ctx = TestContext::with_model("Shop", &package());
    let model = ctx.scaffold_with(&["audit"], &[]).unwrap();

    assert_eq!(model.default_schema, "audit");
    assert_eq!(
        qualified_names(&model),
        vec![
            "[audit].[Events]",
            "[dbo].[RecentOrders]",
            "[audit].[RecentEvents]",
        ]
    );
}

#[test]
fn test_view_column_resolves_against_filtered_out_table() {
    let ctx = TestContext::with_model("Shop", &package());
    let model = ctx.scaffold_with(&["audit"], &[]).unwrap();

    let view = model.find_table("dbo", "RecentOrders").unwrap();
    assert_eq!(view.columns.len(), 1);
    assert_eq!(view.columns[0].store_type.as_deref(), Some("int"));
}

#[test]
fn test_table_filter_applies_to_tables_and_views() {
    let ctx = TestContext::with_model("Shop", &package());
    let model = ctx
        .scaffold_with(&[], &["[dbo].[Orders]", "[audit].[RecentEvents]"])
        .unwrap();

    assert_eq!(model.default_schema, "dbo");
    assert_eq!(
        qualified_names(&model),
        vec!["[dbo].[Orders]", "[audit].[RecentEvents]"]
    );
}

#[test]
fn test_schema_and_table_filters_combine() {
    let ctx = TestContext::with_model("Shop", &package());
    let model = ctx
        .scaffold_with(&["audit"], &["[dbo].[Orders]", "[audit].[Events]"])
        .unwrap();
    assert_eq!(qualified_names(&model), vec!["[audit].[Events]"]);
}

#[test]
fn test_database_name_from_file_stem() {
    let model = TestContext::with_model("Northwind.Core", &package()).scaffold();
    assert_eq!(model.database_name, "Northwind.Core");
    assert_eq!(
        model.connection_string,
        "Data Source=(local);Initial Catalog=Northwind.Core;Integrated Security=true"
    );
}

#[test]
fn test_scaffold_is_idempotent() {
    let ctx = TestContext::with_model("Shop", &package());
    let first = ctx.scaffold();
    let second = ctx.scaffold();
    assert_eq!(first, second);
}
