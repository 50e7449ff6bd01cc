//! Many threads planning and performing installs against one registry.

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use addon_manager::AddonManager;
use addon_meta::{AddonId, Version};
use addon_registry::AddonRegistry;
use addon_test_utils::{TestRepository, dep};
use tempfile::TempDir;

#[test]
fn test_concurrent_installs_of_distinct_addons() {
    let num_threads = 12;
    let repo = TestRepository::new();
    repo.publish("g:common,1.0.0", &[]);
    for i in 0..num_threads {
        repo.publish(&format!("g:addon{i},1.0.0"), &[dep("g:common", "[1.0.0,)")]);
    }

    let addons = TempDir::new().unwrap();
    let manager = Arc::new(AddonManager::new(
        Version::new(1, 0, 0),
        Arc::new(repo.open()),
        Arc::new(AddonRegistry::new(addons.path())),
    ));
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let target: AddonId = format!("g:addon{i},1.0.0").parse().unwrap();
                barrier.wait();
                manager.install(&target).unwrap().perform().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }

    let entries = manager.registry().list_installed().unwrap();
    let names: BTreeSet<_> = entries.iter().map(|e| e.name.clone()).collect();

    // One record per name, no duplicates of the shared dependency
    assert_eq!(entries.len(), num_threads + 1);
    assert_eq!(names.len(), num_threads + 1);
    assert!(names.contains("g:common"));
    for i in 0..num_threads {
        assert!(names.contains(&format!("g:addon{i}")));
    }
}

#[test]
fn test_concurrent_registry_writes_across_managers_sharing_one_registry() {
    let num_threads = 8;
    let repo = TestRepository::new();
    for i in 0..num_threads {
        repo.publish(&format!("g:solo{i},1.0.0"), &[]);
    }
    let metadata = Arc::new(repo.open());

    let addons = TempDir::new().unwrap();
    let registry = Arc::new(AddonRegistry::new(addons.path()));
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let manager = AddonManager::new(
                Version::new(1, 0, 0),
                metadata.clone(),
                Arc::clone(&registry),
            );
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let target: AddonId = format!("g:solo{i},1.0.0").parse().unwrap();
                let mut request = manager.install(&target).unwrap();
                barrier.wait();
                request.perform().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }

    assert_eq!(registry.list_installed().unwrap().len(), num_threads);
}
