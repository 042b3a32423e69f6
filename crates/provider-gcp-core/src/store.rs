use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ProviderError, Result};
use crate::resource::Managed;

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Storage for managed records with optimistic concurrency.
///
/// Every successful write bumps `metadata.resource_version`. A write whose
/// version does not match the stored one fails with
/// [`ProviderError::Conflict`]; the caller re-reads and retries.
pub trait RecordStore {
    fn get(&self, name: &str) -> Result<Managed>;
    fn create(&self, record: &Managed) -> Result<Managed>;
    fn update(&self, record: &Managed) -> Result<Managed>;
    fn delete(&self, name: &str) -> Result<()>;
    fn list(&self) -> Result<Vec<Managed>>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One YAML file per record under a directory: `<dir>/<name>.yaml`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records are addressed by name only; anything that could leave `dir`
    /// is refused.
    fn path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(ProviderError::InvalidRecordName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.yaml")))
    }

    fn read(&self, path: &Path) -> Result<Managed> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    fn write(&self, record: &Managed) -> Result<()> {
        let data = serde_yaml::to_string(record)?;
        atomic_write(&self.path(record.name())?, data.as_bytes())
    }
}

impl RecordStore for FileStore {
    fn get(&self, name: &str) -> Result<Managed> {
        let path = self.path(name)?;
        if !path.exists() {
            return Err(ProviderError::RecordNotFound(name.to_string()));
        }
        self.read(&path)
    }

    fn create(&self, record: &Managed) -> Result<Managed> {
        if self.path(record.name())?.exists() {
            return Err(ProviderError::RecordExists(record.name().to_string()));
        }
        let mut stored = record.clone();
        stored.metadata_mut().resource_version = 1;
        self.write(&stored)?;
        Ok(stored)
    }

    fn update(&self, record: &Managed) -> Result<Managed> {
        let current = self.get(record.name())?;
        let stored = current.metadata().resource_version;
        let given = record.metadata().resource_version;
        if stored != given {
            return Err(ProviderError::Conflict {
                name: record.name().to_string(),
                stored,
                given,
            });
        }
        let mut next = record.clone();
        next.metadata_mut().resource_version = stored + 1;
        self.write(&next)?;
        tracing::debug!(name = %record.name(), version = stored + 1, "record updated");
        Ok(next)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.path(name)?;
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Managed>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                records.push(self.read(&path)?);
            }
        }
        records.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(records)
    }
}

/// Atomically write `data` to `path` using a tempfile in the same directory,
/// so a crash never leaves a half-written record behind.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
