//! Error types for dacpac-scaffold

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scaffolding run
#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Invalid package path: path is empty")]
    InvalidPackagePath,

    #[error("Dacpac file not found: {path}")]
    PackageNotFound { path: PathBuf },

    #[error("Failed to read dacpac: {path}")]
    DacpacReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP read error: {message}")]
    ZipError { message: String },

    #[error("Dacpac does not contain a model.xml: {path}")]
    MissingModelXml { path: PathBuf },

    #[error("model.xml could not be decoded as text")]
    ModelXmlEncodingError,

    #[error("Failed to parse model.xml")]
    ModelXmlParseError {
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid model.xml: {message}")]
    InvalidModelXml { message: String },

    #[error("Primary key {constraint} on [{schema}].[{table}] references unknown column [{column}]")]
    PrimaryKeyColumnNotFound {
        schema: String,
        table: String,
        constraint: String,
        column: String,
    },

    #[error("Failed to write output to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<zip::result::ZipError> for ScaffoldError {
    fn from(err: zip::result::ZipError) -> Self {
        ScaffoldError::ZipError {
            message: err.to_string(),
        }
    }
}
