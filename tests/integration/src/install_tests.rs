//! End-to-end install flows: plan, perform, and inspect the addon directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use addon_manager::{AddonManager, Error, InstallState, ManagerConfig};
use addon_meta::{AddonId, Version};
use addon_registry::{AddonQuery, AddonRegistry};
use addon_test_utils::{TestRepository, dep};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn id(coords: &str) -> AddonId {
    coords.parse().unwrap()
}

fn manager_for(repo: &TestRepository, addons: &Path, runtime: &str) -> AddonManager {
    AddonManager::new(
        runtime.parse().unwrap(),
        Arc::new(repo.open()),
        Arc::new(AddonRegistry::new(addons)),
    )
}

/// Snapshot of every file under `root`, relative path plus bytes.
fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
        for item in fs::read_dir(dir).unwrap() {
            let path = item.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                out.push((rel, fs::read(&path).unwrap()));
            }
        }
    }
    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}

/// A shell addon with a required persistence layer, an optional reporting
/// extra, and one extra that needs a newer runtime.
fn publish_shell_scenario(repo: &TestRepository) {
    repo.publish("org.shell:core,2.0.0", &[]);
    repo.publish("org.shell:core,2.1.0", &[]);
    repo.publish("org.shell:core,3.0.0", &[]);
    repo.publish(
        "org.shell:persistence,1.0.0",
        &[dep("org.shell:core", "[2.0.0,3.0.0)")],
    );
    repo.publish("org.shell:reports,0.9.0", &[dep("org.shell:core", "[2.0.0,)")]);
    repo.publish("org.shell:cloud,1.0.0", &[]);
    repo.publish(
        "org.shell:app,1.0.0",
        &[
            dep("org.shell:persistence", "[1.0.0,2.0.0)").exported(true),
            dep("org.shell:reports", "(,)").optional(true),
            dep("org.shell:cloud", "(,)").with_api_version(Version::new(2, 5, 0)),
        ],
    );
}

#[test]
fn test_full_install_of_addon_with_optional_and_excluded_dependencies() {
    let repo = TestRepository::new();
    publish_shell_scenario(&repo);
    let addons = TempDir::new().unwrap();
    let manager = manager_for(&repo, addons.path(), "2.1.0");

    let resolution = manager
        .resolve_addon_dependency_hierarchy(&id("org.shell:app,1.0.0"))
        .unwrap();
    assert_eq!(resolution.excluded.len(), 1);
    assert_eq!(resolution.excluded[0].entry.name, "org.shell:cloud");

    let mut request = manager.install(&id("org.shell:app,1.0.0")).unwrap();
    assert_eq!(
        request.required_addons(),
        &[id("org.shell:persistence,1.0.0"), id("org.shell:core,2.1.0")]
    );
    assert_eq!(request.optional_addons(), &[id("org.shell:reports,0.9.0")]);

    let report = request.perform().unwrap();
    assert_eq!(
        report.installed,
        vec![
            id("org.shell:persistence,1.0.0"),
            id("org.shell:core,2.1.0"),
            id("org.shell:app,1.0.0"),
        ]
    );
    assert_eq!(report.optional_installed, vec![id("org.shell:reports,0.9.0")]);
    assert_eq!(request.state(), InstallState::Performed);

    let registry = manager.registry();
    assert!(!registry.has(&AddonQuery::new("org.shell:cloud")).unwrap());

    let app = registry.get(&AddonQuery::new("org.shell:app")).unwrap().unwrap();
    let files = registry.get_resource_files(&app).unwrap();
    assert_eq!(files.len(), 1);
    assert!(
        files
            .iter()
            .all(|f| f.starts_with(addons.path().join("org/shell/app/1.0.0")))
    );

    let declared = registry.get_dependency_entries(&app).unwrap();
    assert_eq!(declared.len(), 3);
    assert!(declared[0].exported);
    assert!(declared[1].optional);
}

#[test]
fn test_perform_on_installed_plan_is_idempotent() {
    let repo = TestRepository::new();
    publish_shell_scenario(&repo);
    let addons = TempDir::new().unwrap();
    let manager = manager_for(&repo, addons.path(), "2.1.0");

    manager
        .install(&id("org.shell:app,1.0.0"))
        .unwrap()
        .perform()
        .unwrap();
    let before = snapshot(addons.path());
    let store_before = fs::read(addons.path().join("installed.toml")).unwrap();

    let mut again = manager.install(&id("org.shell:app,1.0.0")).unwrap();
    assert!(again.required_addons().is_empty());
    assert!(again.optional_addons().is_empty());
    again.perform().unwrap();

    assert_eq!(fs::read(addons.path().join("installed.toml")).unwrap(), store_before);
    assert_eq!(snapshot(addons.path()), before);
}

#[test]
fn test_unsatisfiable_required_dependency_writes_nothing() {
    let repo = TestRepository::new();
    repo.publish("g:lib,1.0.0", &[]);
    repo.publish("g:x,1.0.0", &[dep("g:lib", "[2.0.0,3.0.0)")]);
    let addons = TempDir::new().unwrap();
    let manager = manager_for(&repo, addons.path(), "1.0.0");

    let result = manager.install(&id("g:x,1.0.0"));
    assert!(matches!(
        result,
        Err(Error::Resolver(addon_resolver::Error::DependencyResolution { .. }))
    ));
    assert!(snapshot(addons.path()).is_empty());
}

#[test]
fn test_unsatisfiable_optional_dependency_is_dropped() {
    let repo = TestRepository::new();
    repo.publish("g:lib,1.0.0", &[]);
    repo.publish("g:x,1.0.0", &[dep("g:lib", "[2.0.0,3.0.0)").optional(true)]);
    let addons = TempDir::new().unwrap();
    let manager = manager_for(&repo, addons.path(), "1.0.0");

    let mut request = manager.install(&id("g:x,1.0.0")).unwrap();
    assert!(request.optional_addons().is_empty());

    let report = request.perform().unwrap();
    assert_eq!(report.installed, vec![id("g:x,1.0.0")]);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_upgrade_replaces_registry_record_and_keeps_old_slot() {
    let repo = TestRepository::new();
    repo.publish("g:x,1.0.0", &[]);
    repo.publish("g:x,1.1.0", &[]);
    let addons = TempDir::new().unwrap();
    let manager = manager_for(&repo, addons.path(), "1.0.0");

    manager.install(&id("g:x,1.0.0")).unwrap().perform().unwrap();
    manager.install(&id("g:x,1.1.0")).unwrap().perform().unwrap();

    let entries = manager.registry().list_installed().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].api_version, "1.1.0");
    assert!(addons.path().join("g/x/1.0.0").is_dir());
    assert!(addons.path().join("g/x/1.1.0").is_dir());
}

#[test]
fn test_manager_from_config_file() {
    let repo = TestRepository::new();
    repo.publish("g:x,1.0.0", &[]);
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "addon-dir = {:?}\nrepository = {:?}\nruntime-version = \"1.0.0\"\nfsync = false\n",
            home.path().join("addons").to_string_lossy(),
            repo.root().to_string_lossy(),
        ),
    )
    .unwrap();

    let config = ManagerConfig::load(&config_path).unwrap();
    let manager = AddonManager::from_config(&config).unwrap();
    manager.install(&id("g:x,1.0.0")).unwrap().perform().unwrap();

    assert!(home.path().join("addons").join("installed.toml").is_file());
    assert_eq!(manager.runtime(), &Version::new(1, 0, 0));
}
