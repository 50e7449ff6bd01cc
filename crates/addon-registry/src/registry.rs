//! The addon registry.
//!
//! One store per addon root (`installed.toml`) holding an ordered list of
//! `(name, api-version, slot)` records. Each installed addon also owns a
//! resource directory at `<root>/<group parts>/<name>/<slot>` that holds its
//! artifact files and its `addon.toml` descriptor.
//!
//! Every read goes back to disk. Mutations take a per-instance mutex around
//! the read-modify-write of the store, and the store itself is replaced via
//! temp-file-then-rename so concurrent readers never see a partial write.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use addon_fs::{AddonPath, ConfigStore, NormalizedPath, RobustnessConfig, validate_path_identifier};
use addon_meta::{AddonDescriptor, DependencyEntry, Version, is_api_compatible_str};
use tracing::{debug, info};

use crate::entry::{AddonQuery, RegistryEntry, RegistryFile};
use crate::error::{Error, Result};

/// Durable record of installed addons under one root directory.
#[derive(Debug)]
pub struct AddonRegistry {
    root: NormalizedPath,
    store: ConfigStore,
    lock: Mutex<()>,
}

impl AddonRegistry {
    /// Open the registry rooted at `root` with default write settings.
    ///
    /// Nothing is created until the first install.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_store(root, ConfigStore::new())
    }

    pub fn with_store(root: impl AsRef<Path>, store: ConfigStore) -> Self {
        Self {
            root: NormalizedPath::new(root),
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Write settings shared by the store and descriptor writes.
    pub fn robustness(&self) -> RobustnessConfig {
        self.store.robustness()
    }

    /// Path of the backing store file.
    pub fn store_path(&self) -> NormalizedPath {
        self.root.join(AddonPath::RegistryFile.as_str())
    }

    /// All installed records in store order.
    ///
    /// A missing store is an empty registry.
    pub fn list_installed(&self) -> Result<Vec<RegistryEntry>> {
        self.read_entries()
    }

    /// Records whose API version runs on `runtime`.
    ///
    /// Records with an unparsable API version never match.
    pub fn list_by_api_compatible_version(&self, runtime: &Version) -> Result<Vec<RegistryEntry>> {
        let runtime = runtime.to_string();
        Ok(self
            .read_entries()?
            .into_iter()
            .filter(|e| is_api_compatible_str(&runtime, &e.api_version))
            .collect())
    }

    /// Record `name` as installed, replacing any record with the same name.
    ///
    /// An empty `slot` means the default slot.
    pub fn install(&self, name: &str, api_version: &str, slot: &str) -> Result<RegistryEntry> {
        if name.is_empty() {
            return Err(Error::invalid_argument("addon name must not be empty"));
        }
        if api_version.is_empty() {
            return Err(Error::invalid_argument(format!(
                "api version of '{name}' must not be empty"
            )));
        }
        let slot = if slot.is_empty() {
            AddonPath::DefaultSlot.as_str()
        } else {
            slot
        };
        validate_name_segments(name)?;
        validate_path_identifier(slot).map_err(|e| Error::invalid_argument(e.to_string()))?;

        let entry = RegistryEntry::new(name, api_version, slot);

        let _guard = self.guard();
        let mut entries = self.read_entries()?;
        if entries.contains(&entry) {
            debug!(name, api_version, slot, "Addon already registered");
            return Ok(entry);
        }

        let before = entries.len();
        entries.retain(|e| e.name != name);
        if entries.len() != before {
            debug!(name, "Replacing existing registry record");
        }
        entries.push(entry.clone());
        self.write_entries(entries)?;

        info!(name, api_version, slot, "Registered addon");
        Ok(entry)
    }

    /// Delete the record matching `entry` by name and API version.
    ///
    /// Returns whether a record was removed. A missing store is a no-op.
    pub fn remove(&self, entry: &RegistryEntry) -> Result<bool> {
        if entry.name.is_empty() {
            return Err(Error::invalid_argument("addon name must not be empty"));
        }

        let _guard = self.guard();
        if !self.store_path().exists() {
            return Ok(false);
        }

        let mut entries = self.read_entries()?;
        let before = entries.len();
        entries.retain(|e| !(e.name == entry.name && e.api_version == entry.api_version));
        if entries.len() == before {
            return Ok(false);
        }

        self.write_entries(entries)?;
        info!(name = %entry.name, api_version = %entry.api_version, "Removed addon");
        Ok(true)
    }

    /// First record matching `query`.
    pub fn get(&self, query: &AddonQuery) -> Result<Option<RegistryEntry>> {
        Ok(self.read_entries()?.into_iter().find(|e| query.matches(e)))
    }

    pub fn has(&self, query: &AddonQuery) -> Result<bool> {
        Ok(self.get(query)?.is_some())
    }

    /// `<root>/<first name segment>`, the directory shared by an addon group.
    pub fn base_dir(&self, entry: &RegistryEntry) -> PathBuf {
        let first = name_segments(&entry.name).first().copied().unwrap_or_default();
        self.root.join(first).to_native()
    }

    /// `<root>/<group parts>/<name>/<slot>`.
    pub fn resource_dir(&self, entry: &RegistryEntry) -> PathBuf {
        name_segments(&entry.name)
            .into_iter()
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
            .join(&entry.slot)
            .to_native()
    }

    /// Artifact files present in the entry's resource directory.
    ///
    /// The descriptor and hidden files are not resources. A missing directory
    /// yields an empty set.
    pub fn get_resource_files(&self, entry: &RegistryEntry) -> Result<BTreeSet<PathBuf>> {
        let dir = self.resource_dir(entry);
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(addon_fs::Error::io(&dir, e).into()),
        };

        let mut files = BTreeSet::new();
        for item in read_dir {
            let item = item.map_err(|e| addon_fs::Error::io(&dir, e))?;
            let file_name = item.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with('.') || file_name == AddonPath::Descriptor.as_str() {
                continue;
            }
            let file_type = item.file_type().map_err(|e| addon_fs::Error::io(item.path(), e))?;
            if file_type.is_file() {
                files.insert(item.path());
            }
        }
        Ok(files)
    }

    /// Dependencies declared by the installed descriptor, empty when absent.
    pub fn get_dependency_entries(&self, entry: &RegistryEntry) -> Result<Vec<DependencyEntry>> {
        let path = self.descriptor_path(entry);
        Ok(AddonDescriptor::load(&path)?
            .map(|d| d.dependencies)
            .unwrap_or_default())
    }

    /// Write the entry's descriptor.
    pub fn write_dependency_entries(
        &self,
        entry: &RegistryEntry,
        dependencies: &[DependencyEntry],
    ) -> Result<()> {
        let path = self.descriptor_path(entry);
        AddonDescriptor::new(dependencies.to_vec()).save(&path, self.store.robustness())?;
        Ok(())
    }

    fn descriptor_path(&self, entry: &RegistryEntry) -> PathBuf {
        self.resource_dir(entry).join(AddonPath::Descriptor.as_str())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_entries(&self) -> Result<Vec<RegistryEntry>> {
        let path = self.store_path();
        match self.store.load_optional::<RegistryFile>(&path) {
            Ok(file) => Ok(file.map(|f| f.addons).unwrap_or_default()),
            Err(addon_fs::Error::ConfigParse { path, message, .. }) => {
                Err(Error::RegistryCorrupt { path, message })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, addons: Vec<RegistryEntry>) -> Result<()> {
        self.store.save(&self.store_path(), &RegistryFile { addons })?;
        Ok(())
    }
}

/// `group:name` becomes the group's dot-separated parts followed by `name`.
/// A name without a group is a single segment.
fn name_segments(name: &str) -> Vec<&str> {
    match name.split_once(':') {
        Some((group, simple)) => group.split('.').chain(std::iter::once(simple)).collect(),
        None => vec![name],
    }
}

fn validate_name_segments(name: &str) -> Result<()> {
    for segment in name_segments(name) {
        if segment.contains(':') {
            return Err(Error::invalid_argument(format!(
                "addon name '{name}': more than one ':'"
            )));
        }
        validate_path_identifier(segment)
            .map_err(|e| Error::invalid_argument(format!("addon name '{name}': {e}")))?;
    }
    Ok(())
}
