//! Public entry point composing resolver, registry, and metadata source.

use std::sync::Arc;

use addon_meta::{AddonId, Version};
use addon_registry::AddonRegistry;
use addon_resolver::{DependencyResolver, LocalRepository, MetadataResolver, Resolution};
use tracing::info;

use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::request::InstallRequest;

/// Plans and performs addon installs against one registry.
pub struct AddonManager {
    metadata: Arc<dyn MetadataResolver>,
    registry: Arc<AddonRegistry>,
    resolver: DependencyResolver,
}

impl AddonManager {
    pub fn new(
        runtime: Version,
        metadata: Arc<dyn MetadataResolver>,
        registry: Arc<AddonRegistry>,
    ) -> Self {
        let resolver =
            DependencyResolver::new(runtime, Arc::clone(&metadata), Arc::clone(&registry));
        Self {
            metadata,
            registry,
            resolver,
        }
    }

    /// Build a manager over the configured repository and addon directory.
    pub fn from_config(config: &ManagerConfig) -> Result<Self> {
        let repository = config.repository.as_ref().ok_or(Error::NoRepository)?;
        let metadata = LocalRepository::open(repository)?;
        info!(
            repository = %metadata.root().display(),
            addon_dir = %config.addon_dir.display(),
            runtime = %config.runtime_version,
            "Opened addon manager"
        );
        Ok(Self::new(
            config.runtime_version.clone(),
            Arc::new(metadata),
            Arc::new(config.open_registry()),
        ))
    }

    pub fn runtime(&self) -> &Version {
        self.resolver.runtime()
    }

    pub fn registry(&self) -> &Arc<AddonRegistry> {
        &self.registry
    }

    /// Full classification of what `target` needs, including exclusions.
    pub fn resolve_addon_dependency_hierarchy(&self, target: &AddonId) -> Result<Resolution> {
        Ok(self.resolver.resolve(target)?)
    }

    /// Plan the install of `target`. Nothing is written until
    /// [`InstallRequest::perform`].
    pub fn install(&self, target: &AddonId) -> Result<InstallRequest> {
        let resolution = self.resolve_addon_dependency_hierarchy(target)?;
        Ok(InstallRequest::new(
            resolution,
            Arc::clone(&self.metadata),
            Arc::clone(&self.registry),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::InstallState;
    use addon_registry::AddonQuery;
    use addon_test_utils::{FailingResolver, TestRepository, dep};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn id(coords: &str) -> AddonId {
        coords.parse().unwrap()
    }

    fn manager(repo: &TestRepository) -> (TempDir, AddonManager) {
        let addons = TempDir::new().unwrap();
        let manager = AddonManager::new(
            Version::new(1, 0, 0),
            Arc::new(repo.open()),
            Arc::new(AddonRegistry::new(addons.path())),
        );
        (addons, manager)
    }

    #[test]
    fn install_is_pure_planning() {
        let repo = TestRepository::new();
        repo.publish("g:x,1.0.0", &[dep("g:a", "(,)")]);
        repo.publish("g:a,1.0.0", &[]);
        let (addons, manager) = manager(&repo);

        let request = manager.install(&id("g:x,1.0.0")).unwrap();
        assert_eq!(request.required_addons(), &[id("g:a,1.0.0")]);
        assert_eq!(request.state(), InstallState::Created);
        assert_eq!(std::fs::read_dir(addons.path()).unwrap().count(), 0);
    }

    #[test]
    fn perform_installs_dependencies_then_target() {
        let repo = TestRepository::new();
        repo.publish("g:x,1.0.0", &[dep("g:a", "(,)"), dep("g:o", "(,)").optional(true)]);
        repo.publish("g:a,1.0.0", &[]);
        repo.publish("g:o,2.0.0", &[]);
        let (_addons, manager) = manager(&repo);

        let mut request = manager.install(&id("g:x,1.0.0")).unwrap();
        let report = request.perform().unwrap();

        assert_eq!(report.installed, vec![id("g:a,1.0.0"), id("g:x,1.0.0")]);
        assert_eq!(report.optional_installed, vec![id("g:o,2.0.0")]);
        assert_eq!(request.state(), InstallState::Performed);

        let registry = manager.registry();
        let names: Vec<_> = registry
            .list_installed()
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.api_version, e.slot))
            .collect();
        assert_eq!(
            names,
            vec![
                ("g:a".to_string(), "1.0.0".to_string(), "1.0.0".to_string()),
                ("g:x".to_string(), "1.0.0".to_string(), "1.0.0".to_string()),
                ("g:o".to_string(), "2.0.0".to_string(), "2.0.0".to_string()),
            ]
        );

        let x = registry.get(&AddonQuery::new("g:x")).unwrap().unwrap();
        assert_eq!(registry.get_resource_files(&x).unwrap().len(), 1);
        assert_eq!(registry.get_dependency_entries(&x).unwrap().len(), 2);
    }

    #[test]
    fn perform_twice_is_rejected() {
        let repo = TestRepository::new();
        repo.publish("g:x,1.0.0", &[]);
        let (_addons, manager) = manager(&repo);

        let mut request = manager.install(&id("g:x,1.0.0")).unwrap();
        request.perform().unwrap();
        assert!(matches!(
            request.perform(),
            Err(Error::InvalidState {
                state: InstallState::Performed
            })
        ));
    }

    #[test]
    fn required_failure_reports_partial_progress() {
        let repo = TestRepository::new();
        repo.publish("g:x,1.0.0", &[dep("g:a", "(,)"), dep("g:b", "(,)")]);
        repo.publish("g:a,1.0.0", &[]);
        repo.publish("g:b,1.0.0", &[]);

        let failing = Arc::new(FailingResolver::new(Arc::new(repo.open())));
        failing.fail_fetch("g:b");
        let addons = TempDir::new().unwrap();
        let registry = Arc::new(AddonRegistry::new(addons.path()));
        let manager = AddonManager::new(Version::new(1, 0, 0), failing.clone(), registry.clone());

        let mut request = manager.install(&id("g:x,1.0.0")).unwrap();
        match request.perform() {
            Err(Error::PartialInstall {
                failed, completed, ..
            }) => {
                assert_eq!(failed, id("g:b,1.0.0"));
                assert_eq!(completed, vec![id("g:a,1.0.0")]);
            }
            other => panic!("expected partial install, got {other:?}"),
        }
        assert_eq!(request.state(), InstallState::Failed);
        assert!(registry.has(&AddonQuery::new("g:a")).unwrap());
        assert!(!registry.has(&AddonQuery::new("g:x")).unwrap());

        // A retry heals: g:a is already installed and is elided
        failing.heal("g:b");
        let mut retry = manager.install(&id("g:x,1.0.0")).unwrap();
        assert_eq!(retry.required_addons(), &[id("g:b,1.0.0")]);
        retry.perform().unwrap();
        assert_eq!(registry.list_installed().unwrap().len(), 3);
    }

    #[test]
    fn optional_failure_is_a_warning() {
        let repo = TestRepository::new();
        repo.publish("g:x,1.0.0", &[dep("g:o", "(,)").optional(true)]);
        repo.publish("g:o,1.0.0", &[]);

        let failing = Arc::new(FailingResolver::new(Arc::new(repo.open())));
        failing.fail_fetch("g:o");
        let addons = TempDir::new().unwrap();
        let manager = AddonManager::new(
            Version::new(1, 0, 0),
            failing,
            Arc::new(AddonRegistry::new(addons.path())),
        );

        let report = manager.install(&id("g:x,1.0.0")).unwrap().perform().unwrap();
        assert_eq!(report.installed, vec![id("g:x,1.0.0")]);
        assert!(report.optional_installed.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn from_config_requires_repository() {
        let config = ManagerConfig::default();
        assert!(matches!(
            AddonManager::from_config(&config),
            Err(Error::NoRepository)
        ));
    }
}
