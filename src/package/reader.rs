//! Read dacpac ZIP contents into memory

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::{Encoding, UTF_8};
use zip::ZipArchive;

use crate::error::ScaffoldError;

/// Name of the serialized schema model inside a dacpac.
pub const MODEL_XML: &str = "model.xml";

/// All files from a dacpac ZIP, loaded into memory.
pub struct DacpacContents {
    path: PathBuf,
    files: HashMap<String, Vec<u8>>,
}

impl DacpacContents {
    /// Read all entries from a dacpac ZIP file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(ScaffoldError::InvalidPackagePath.into());
        }
        if !path.is_file() {
            return Err(ScaffoldError::PackageNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let file = File::open(path).map_err(|e| ScaffoldError::DacpacReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = ZipArchive::new(file).map_err(|e| ScaffoldError::ZipError {
            message: format!("Failed to read dacpac {}: {}", path.display(), e),
        })?;

        let mut files = HashMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| ScaffoldError::ZipError {
                message: format!("Failed to read entry {} in {}: {}", i, path.display(), e),
            })?;

            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| ScaffoldError::DacpacReadError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            files.insert(name, data);
        }

        tracing::debug!(path = %path.display(), entries = files.len(), "read dacpac");

        Ok(Self {
            path: path.to_path_buf(),
            files,
        })
    }

    /// Get raw file contents.
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(|v| v.as_slice())
    }

    /// Decoded model.xml text.
    ///
    /// DacFx writes UTF-8 with a byte order mark; a UTF-16 BOM is honoured as well.
    pub fn model_xml(&self) -> Result<String> {
        let bytes = self
            .get_bytes(MODEL_XML)
            .ok_or_else(|| ScaffoldError::MissingModelXml {
                path: self.path.clone(),
            })?;
        Ok(decode_text(bytes)?)
    }
}

fn decode_text(bytes: &[u8]) -> Result<String, ScaffoldError> {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
    if had_errors {
        return Err(ScaffoldError::ModelXmlEncodingError);
    }
    Ok(text.into_owned())
}
