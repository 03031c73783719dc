//! Saving and restoring the project between sessions.
//!
//! A saved record bundles the project with its settings:
//!
//! ```text
//! { "project": { ... }, "settings": { ... }, "savedAt": 1718000000 }
//! ```
//!
//! Records are written as pretty JSON through a [`StorageBackend`]: a file on
//! disk for the CLI ([`FileBackend`]) or an in-memory slot for tests
//! ([`MemoryBackend`]). [`Store`] sits on top and handles validity checks,
//! load-time upgrades and change detection.
//!
//! ## Loading
//!
//! Loading never fails loudly. A missing file, unparseable JSON or a record
//! that fails [`is_valid`] all yield `None`, and the caller starts fresh.
//! Accepted records are upgraded before anyone reads them:
//!
//! 1. legacy button fields are migrated ([`crate::buttons::migrate`])
//! 2. the header rule is enforced and missing `showIcon` flags are filled in
//!    ([`crate::project::normalize`])
//!
//! ## Change detection
//!
//! Each save hashes the project and settings with SHA-256 (the timestamp is
//! excluded). When the hash matches the last write, the save is skipped, so
//! the periodic autosave sweep costs nothing while the user is idle.

use crate::buttons;
use crate::project::{self, Project};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A persisted project together with its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    pub project: Project,
    #[serde(default)]
    pub settings: Settings,
    /// Unix seconds of the write.
    #[serde(default)]
    pub saved_at: u64,
}

/// Minimum shape a stored project must have before it is trusted:
/// a string `title` and a non-empty `sections` list.
pub fn is_valid(project: &Value) -> bool {
    project.get("title").is_some_and(Value::is_string)
        && project
            .get("sections")
            .and_then(Value::as_array)
            .is_some_and(|sections| !sections.is_empty())
}

/// Apply load-time upgrades to a stored record.
pub fn upgrade(mut record: SavedProject) -> SavedProject {
    if record.settings.has_legacy_fields() {
        debug!("migrating legacy button settings");
    }
    record.settings = buttons::migrate(record.settings);
    project::normalize(&mut record.project);
    record
}

/// Parse and upgrade a stored record. `None` when it cannot be trusted.
pub fn decode(json: &str) -> Option<SavedProject> {
    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "saved project is not valid JSON, ignoring it");
            return None;
        }
    };
    if !value.get("project").is_some_and(is_valid) {
        warn!("saved project failed validity check, ignoring it");
        return None;
    }
    match serde_json::from_value::<SavedProject>(value) {
        Ok(record) => Some(upgrade(record)),
        Err(e) => {
            warn!(error = %e, "saved project has an unexpected shape, ignoring it");
            None
        }
    }
}

/// SHA-256 of the project and settings, as a hex string.
pub fn fingerprint(project: &Project, settings: &Settings) -> Result<String, StoreError> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(project)?);
    hasher.update(b"\0");
    hasher.update(serde_json::to_vec(settings)?);
    Ok(format!("{:x}", hasher.finalize()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ============================================================================
// Backends
// ============================================================================

/// Where serialized records live.
pub trait StorageBackend {
    /// The stored record, or `None` if nothing has been saved.
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&mut self, contents: &str) -> Result<(), StoreError>;
    /// Remove the stored record. Removing nothing is not an error.
    fn remove(&mut self) -> Result<(), StoreError>;
    /// Keep a copy of an unreadable record before it is overwritten.
    /// Returns where the copy went.
    fn backup(&mut self, contents: &str) -> Result<String, StoreError>;
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `site.json` → `site.json.bak`, next to the original.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn backup(&mut self, contents: &str) -> Result<String, StoreError> {
        let path = self.backup_path();
        std::fs::write(&path, contents)?;
        Ok(path.display().to_string())
    }
}

/// In-memory slot; counts writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pub contents: Option<String>,
    pub writes: usize,
    pub backup: Option<String>,
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StoreError> {
        self.contents = None;
        Ok(())
    }

    fn backup(&mut self, contents: &str) -> Result<String, StoreError> {
        self.backup = Some(contents.to_string());
        Ok("memory backup".to_string())
    }
}

// ============================================================================
// Store
// ============================================================================

/// Project persistence over a backend.
///
/// The first save through a store checks what is already stored. A record
/// that exists but cannot be decoded is copied aside with
/// [`StorageBackend::backup`] before it is replaced.
#[derive(Debug, Clone, Default)]
pub struct Store<B> {
    backend: B,
    last_fingerprint: Option<String>,
}

/// The store used by the CLI.
pub type FileStore = Store<FileBackend>;

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Store::new(FileBackend::new(path))
    }
}

impl<B: StorageBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            last_fingerprint: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Write the project and settings unless they are unchanged since the
    /// last save. Returns whether a write happened.
    pub fn save(&mut self, project: &Project, settings: &Settings) -> Result<bool, StoreError> {
        let print = fingerprint(project, settings)?;
        if self.last_fingerprint.as_deref() == Some(print.as_str()) {
            debug!("project unchanged since last save, skipping");
            return Ok(false);
        }

        if self.last_fingerprint.is_none() {
            self.preserve_unreadable()?;
        }

        let record = SavedProject {
            project: project.clone(),
            settings: settings.clone(),
            saved_at: unix_now(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        self.backend.write(&json)?;
        self.last_fingerprint = Some(print);
        info!(
            sections = project.sections.len(),
            bytes = json.len(),
            "project saved"
        );
        Ok(true)
    }

    fn preserve_unreadable(&mut self) -> Result<(), StoreError> {
        let Some(existing) = self.backend.read()? else {
            return Ok(());
        };
        if existing.trim().is_empty() || decode(&existing).is_some() {
            return Ok(());
        }
        let location = self.backend.backup(&existing)?;
        warn!(backup = %location, "stored project could not be read, kept a copy before saving");
        Ok(())
    }

    /// Load and upgrade the stored record. `None` when there is nothing
    /// usable; read errors are logged, not returned.
    pub fn load(&self) -> Option<SavedProject> {
        match self.backend.read() {
            Ok(Some(json)) => decode(&json),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read saved project");
                None
            }
        }
    }

    /// Whether anything non-empty is stored, readable or not.
    pub fn has_record(&self) -> bool {
        matches!(self.backend.read(), Ok(Some(json)) if !json.trim().is_empty())
    }

    /// Delete the stored record.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove()?;
        self.last_fingerprint = None;
        info!("saved project cleared");
        Ok(())
    }
}
