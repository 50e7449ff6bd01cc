//! [`FailingResolver`] wraps a metadata source and fails chosen fetches.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use addon_meta::AddonId;
use addon_resolver::{
    DependencyMetadata, DependencyQuery, Error, MetadataResolver, Result,
};

/// Delegates to `inner`, except that fetching any addon whose name has been
/// marked with [`fail_fetch`](Self::fail_fetch) returns `ArtifactNotFound`.
pub struct FailingResolver {
    inner: Arc<dyn MetadataResolver>,
    failing: Mutex<HashSet<String>>,
}

impl FailingResolver {
    pub fn new(inner: Arc<dyn MetadataResolver>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_fetch(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn heal(&self, name: &str) {
        self.failing.lock().unwrap().remove(name);
    }
}

impl MetadataResolver for FailingResolver {
    fn resolve_dependency_metadata(&self, query: &DependencyQuery) -> Result<DependencyMetadata> {
        self.inner.resolve_dependency_metadata(query)
    }

    fn fetch_artifact(&self, id: &AddonId) -> Result<Vec<PathBuf>> {
        if self.failing.lock().unwrap().contains(id.name()) {
            return Err(Error::ArtifactNotFound {
                addon: id.to_coordinates(),
                path: PathBuf::from("<injected failure>"),
            });
        }
        self.inner.fetch_artifact(id)
    }
}
