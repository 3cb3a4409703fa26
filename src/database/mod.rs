use crate::models::Registry;
use crate::utils::AppError;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Flat-file store: the whole registry lives in one JSON document that is
/// read in full and rewritten in full on every change.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the full mapping. A missing file is an empty store; a file
    /// that exists but is not valid JSON is a `Parse` error.
    pub fn load(&self) -> Result<Registry, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("📭 No data file at {}, starting empty", self.path.display());
                return Ok(Registry::new());
            }
            Err(e) => {
                return Err(AppError::Io(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            AppError::Parse(format!("{} is not a valid data file: {}", self.path.display(), e))
        })
    }

    /// Overwrites the file with the full mapping (4-space indented JSON).
    pub fn save(&self, registry: &Registry) -> Result<(), AppError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        registry.serialize(&mut serializer)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, buf).map_err(|e| {
            AppError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        log::debug!("💾 Saved {} records to {}", registry.len(), self.path.display());
        Ok(())
    }
}
