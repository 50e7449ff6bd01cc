//! A metadata source backed by a directory tree.
//!
//! ```text
//! <repo>/org/example/tools/1.0.0/tools.jar
//! <repo>/org/example/tools/1.0.0/addon.toml
//! <repo>/org/example/tools/1.1.0/tools.jar
//! ```
//!
//! `org.example:tools` maps to `org/example/tools`; each child directory whose
//! name parses as a version is one release.

use std::fs;
use std::path::{Path, PathBuf};

use addon_fs::{AddonPath, validate_path_identifier};
use addon_meta::{AddonDescriptor, AddonId, Version, validate_name};
use tracing::debug;

use crate::error::{Error, Result};
use crate::metadata::{DependencyMetadata, DependencyQuery, MetadataResolver};

/// Directory-backed addon repository.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Open an existing repository directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = dunce::canonicalize(path).map_err(|_| Error::RepositoryNotFound {
            path: path.to_path_buf(),
        })?;
        if !root.is_dir() {
            return Err(Error::RepositoryNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every release of `name`.
    pub fn addon_dir(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let (group, simple) = name.split_once(':').unwrap_or(("", name));

        let mut dir = self.root.clone();
        for segment in group.split('.').chain(std::iter::once(simple)) {
            validate_path_identifier(segment)?;
            dir.push(segment);
        }
        Ok(dir)
    }

    /// Releases of `name` as `(version, directory)`, ascending by version.
    fn releases(&self, name: &str) -> Result<Vec<(Version, PathBuf)>> {
        let dir = self.addon_dir(name)?;
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(addon_fs::Error::io(&dir, e).into()),
        };

        let mut releases = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| addon_fs::Error::io(&dir, e))?;
            if !item.path().is_dir() {
                continue;
            }
            let dir_name = item.file_name().to_string_lossy().into_owned();
            match Version::parse(&dir_name) {
                Ok(version) => releases.push((version, item.path())),
                Err(_) => debug!(addon = name, dir = %dir_name, "Skipping non-version directory"),
            }
        }
        releases.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(releases)
    }

    fn release_dir(&self, id: &AddonId) -> Result<PathBuf> {
        self.releases(id.name())?
            .into_iter()
            .find(|(version, _)| version == id.version())
            .map(|(_, dir)| dir)
            .ok_or_else(|| Error::ArtifactNotFound {
                addon: id.to_coordinates(),
                path: self
                    .addon_dir(id.name())
                    .unwrap_or_else(|_| self.root.clone())
                    .join(id.version().to_string()),
            })
    }
}

impl MetadataResolver for LocalRepository {
    fn resolve_dependency_metadata(&self, query: &DependencyQuery) -> Result<DependencyMetadata> {
        let matching: Vec<_> = self
            .releases(&query.name)?
            .into_iter()
            .filter(|(version, _)| query.matches(version))
            .collect();

        let dependencies = match matching.last() {
            Some((_, dir)) => AddonDescriptor::load(&dir.join(AddonPath::Descriptor.as_str()))?
                .map(|d| d.dependencies)
                .unwrap_or_default(),
            None => Vec::new(),
        };

        debug!(
            addon = %query.name,
            versions = matching.len(),
            dependencies = dependencies.len(),
            "Resolved metadata"
        );

        Ok(DependencyMetadata {
            dependencies,
            available_versions: matching.into_iter().map(|(v, _)| v).collect(),
        })
    }

    fn fetch_artifact(&self, id: &AddonId) -> Result<Vec<PathBuf>> {
        let dir = self.release_dir(id)?;
        let mut files = Vec::new();
        for item in fs::read_dir(&dir).map_err(|e| addon_fs::Error::io(&dir, e))? {
            let item = item.map_err(|e| addon_fs::Error::io(&dir, e))?;
            let file_name = item.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with('.') || file_name == AddonPath::Descriptor.as_str() {
                continue;
            }
            if item.path().is_file() {
                files.push(item.path());
            }
        }
        files.sort();
        Ok(files)
    }
}
