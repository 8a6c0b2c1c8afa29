// ABOUTME: Durable parameter store backed by a JSON file.
// ABOUTME: Records who wrote each value and when; writes replace the file atomically.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{ParameterStore, Result, StoreError};
use crate::types::ParameterName;

/// Default location of the store relative to the project directory.
pub const DEFAULT_STORE_PATH: &str = ".stackplan/parameters.json";

/// One published value with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredParameter {
    pub value: String,
    /// When the value was last written.
    pub updated_at: DateTime<Utc>,
    /// Hostname of the machine that wrote it.
    pub written_by: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    parameters: BTreeMap<ParameterName, StoredParameter>,
}

/// File-backed store. The file is re-read on every call so that values
/// written by earlier runs are always visible.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    /// Store at the default location under `project_dir`.
    pub fn in_project(project_dir: &Path) -> Self {
        Self::new(project_dir.join(DEFAULT_STORE_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full record for a parameter, including provenance.
    pub fn record(&self, name: &ParameterName) -> Result<StoredParameter> {
        self.load()?
            .parameters
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.clone()))
    }

    fn load(&self) -> Result<StoreDocument> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(StoreDocument::default());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, document: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl ParameterStore for FileStore {
    fn put(&self, name: &ParameterName, value: &str) -> Result<()> {
        let _guard = self.write_guard.lock();
        let mut document = self.load()?;

        document.parameters.insert(
            name.clone(),
            StoredParameter {
                value: value.to_string(),
                updated_at: Utc::now(),
                written_by: gethostname::gethostname().to_string_lossy().into_owned(),
            },
        );

        self.save(&document)?;
        tracing::debug!("put {} ({})", name, self.path.display());
        Ok(())
    }

    fn get(&self, name: &ParameterName) -> Result<String> {
        self.record(name).map(|record| record.value)
    }

    fn list(&self) -> Result<Vec<ParameterName>> {
        Ok(self.load()?.parameters.into_keys().collect())
    }
}
