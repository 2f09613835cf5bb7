//! dacpac-scaffold: turn a SQL Server .dacpac into a normalized relational model
//!
//! The model (tables, views, columns, keys, foreign keys, indexes) is the
//! input a code generator needs to scaffold entity types, without connecting
//! to a live database.

pub mod error;
pub mod model;
pub mod package;

use std::path::{Path, PathBuf};

use anyhow::Result;

pub use error::ScaffoldError;
pub use model::{DatabaseModel, ModelFilter};

use package::model_xml::parse_model_xml;
use package::reader::DacpacContents;

/// Options for scaffolding a dacpac
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    /// Path to the .dacpac file
    pub package_path: PathBuf,
    /// Restrict output to these schemas; the first one becomes the default schema
    pub schemas: Vec<String>,
    /// Restrict output to these `[schema].[name]` tables and views
    pub tables: Vec<String>,
}

/// Load a dacpac and build its database model
pub fn scaffold_dacpac(options: &ScaffoldOptions) -> Result<DatabaseModel> {
    // Step 1: Read the package
    let contents = DacpacContents::from_path(&options.package_path)?;

    // Step 2: Parse the schema model
    let package = parse_model_xml(&contents.model_xml()?)?;

    // Step 3: Build the normalized model
    let database_name = database_name(&options.package_path);
    let filter = ModelFilter {
        schemas: options.schemas.clone(),
        tables: options.tables.clone(),
    };

    Ok(model::build_model(&package, &database_name, &filter)?)
}

/// The database name is the package file name without its extension.
fn database_name(package_path: &Path) -> String {
    package_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
