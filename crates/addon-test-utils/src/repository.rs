//! [`TestRepository`] builder for resolver and manager scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use addon_fs::AddonPath;
use addon_meta::{AddonDescriptor, AddonId, DependencyEntry, VersionRange};
use addon_resolver::LocalRepository;
use tempfile::TempDir;

/// A temporary directory laid out as a [`LocalRepository`].
///
/// # Example
///
/// ```rust,no_run
/// use addon_test_utils::{TestRepository, dep};
///
/// let repo = TestRepository::new();
/// repo.publish("org.example:core,1.0.0", &[]);
/// repo.publish("org.example:app,1.0.0", &[dep("org.example:core", "[1.0.0,2.0.0)")]);
/// let local = repo.open();
/// ```
pub struct TestRepository {
    temp_dir: TempDir,
}

impl Default for TestRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepository {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Publish a release with one artifact named `<name>-<version>.jar`.
    pub fn publish(&self, coordinates: &str, dependencies: &[DependencyEntry]) -> AddonId {
        let id: AddonId = coordinates
            .parse()
            .unwrap_or_else(|e| panic!("bad coordinates '{coordinates}': {e}"));
        let artifact = format!("{}-{}.jar", id.simple_name(), id.version());
        self.publish_files(coordinates, dependencies, &[(&artifact, coordinates)])
    }

    /// Publish a release with explicit artifact files.
    pub fn publish_files(
        &self,
        coordinates: &str,
        dependencies: &[DependencyEntry],
        files: &[(&str, &str)],
    ) -> AddonId {
        let id: AddonId = coordinates
            .parse()
            .unwrap_or_else(|e| panic!("bad coordinates '{coordinates}': {e}"));
        let dir = self.release_dir(&id);
        fs::create_dir_all(&dir).unwrap();

        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        if !dependencies.is_empty() {
            let content = AddonDescriptor::new(dependencies.to_vec()).to_toml().unwrap();
            fs::write(dir.join(AddonPath::Descriptor.as_str()), content).unwrap();
        }
        id
    }

    /// Directory of one release.
    pub fn release_dir(&self, id: &AddonId) -> PathBuf {
        let mut dir = self.root().to_path_buf();
        for segment in id.group().split('.') {
            dir.push(segment);
        }
        dir.push(id.simple_name());
        dir.push(id.version().to_string());
        dir
    }

    /// Open the directory as a [`LocalRepository`].
    pub fn open(&self) -> LocalRepository {
        LocalRepository::open(self.root()).unwrap()
    }
}

/// A dependency entry from a name and range notation.
///
/// # Panics
/// Panics if `range` is not valid range notation.
pub fn dep(name: &str, range: &str) -> DependencyEntry {
    let range = VersionRange::parse(range)
        .unwrap_or_else(|e| panic!("bad range '{range}': {e}"));
    DependencyEntry::new(name, range)
}
