//! Normalized database model and the rules that build it

mod builder;
pub mod comments;
mod database_model;
pub mod defaults;
pub mod relationships;
pub mod store_type;

pub use builder::{build_model, ModelFilter, DEFAULT_SCHEMA, MIGRATION_HISTORY_TABLE};
pub use database_model::*;
