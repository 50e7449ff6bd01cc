//! Dependency classification.
//!
//! Starting from a requested addon, the resolver walks declared dependencies
//! breadth-first and sorts every reachable addon into one of:
//!
//! - **required**: reached through at least one path of non-optional edges
//! - **optional**: only reachable through an optional edge
//! - **excluded**: declares an API floor the runtime does not meet
//! - **satisfied**: the selected version is already in the registry
//!
//! For each name the highest available version satisfying the first
//! constraint seen is selected. Later constraints must accept that
//! selection; on a required path a mismatch aborts resolution, on an
//! optional path it is logged and skipped. When a required constraint
//! rejects a version picked only for optional edges, the walk restarts with
//! that constraint pinned, so an optional dependency never blocks its owner.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use addon_meta::{AddonId, DependencyEntry, Version, VersionRange};
use addon_registry::{AddonQuery, AddonRegistry};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::metadata::{DependencyQuery, MetadataResolver};

/// A dependency left out because its API floor does not run on the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    /// Addon that declared the dependency.
    pub owner: AddonId,
    pub entry: DependencyEntry,
}

/// Outcome of resolving one requested addon.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub target: AddonId,
    pub required: Vec<AddonId>,
    pub optional: Vec<AddonId>,
    pub excluded: Vec<Exclusion>,
    /// Selections elided because the registry already holds them.
    pub satisfied: Vec<AddonId>,
    /// Optional dependencies that could not be resolved.
    pub warnings: Vec<String>,
    /// Declared dependencies of the target and every planned addon.
    pub declared: BTreeMap<AddonId, Vec<DependencyEntry>>,
}

impl Resolution {
    /// Dependencies declared by `id`, empty when it was not walked.
    pub fn dependencies_of(&self, id: &AddonId) -> &[DependencyEntry] {
        self.declared.get(id).map(Vec::as_slice).unwrap_or_default()
    }
}

enum Walk {
    Complete(Resolution),
    /// An optional selection blocks a required constraint; restart with `range` pinned.
    Repin {
        name: String,
        range: VersionRange,
        warning: String,
    },
}

#[derive(Debug)]
struct Selection {
    id: AddonId,
    optional: bool,
    installed: bool,
}

/// Resolves the dependency plan of an addon against a runtime version.
pub struct DependencyResolver {
    runtime: Version,
    metadata: Arc<dyn MetadataResolver>,
    registry: Arc<AddonRegistry>,
}

impl DependencyResolver {
    pub fn new(
        runtime: Version,
        metadata: Arc<dyn MetadataResolver>,
        registry: Arc<AddonRegistry>,
    ) -> Self {
        Self {
            runtime,
            metadata,
            registry,
        }
    }

    pub fn runtime(&self) -> &Version {
        &self.runtime
    }

    /// Classify everything `target` needs.
    ///
    /// Performs no writes.
    pub fn resolve(&self, target: &AddonId) -> Result<Resolution> {
        let target_meta = self
            .metadata
            .resolve_dependency_metadata(&DependencyQuery::exact(target))?;
        if !target_meta.available_versions.contains(target.version()) {
            return Err(Error::AddonNotFound {
                addon: target.to_coordinates(),
            });
        }

        let mut pins: Vec<(String, VersionRange)> = Vec::new();
        let mut replaced: Vec<String> = Vec::new();
        loop {
            match self.walk(target, &target_meta.dependencies, &pins)? {
                Walk::Complete(mut resolution) => {
                    replaced.append(&mut resolution.warnings);
                    resolution.warnings = replaced;
                    info!(
                        target = %target,
                        required = resolution.required.len(),
                        optional = resolution.optional.len(),
                        excluded = resolution.excluded.len(),
                        satisfied = resolution.satisfied.len(),
                        "Resolved dependencies"
                    );
                    return Ok(resolution);
                }
                Walk::Repin { name, range, warning } => {
                    // A repeated pin would select the same version again
                    if pins.iter().any(|(n, r)| *n == name && *r == range) {
                        return Err(Error::DependencyResolution {
                            addon: target.to_coordinates(),
                            dependency: name,
                            constraint: range.to_string(),
                            reason: "constraint cannot be satisfied".to_string(),
                        });
                    }
                    replaced.push(warning);
                    pins.push((name, range));
                }
            }
        }
    }

    /// One breadth-first pass with versions of pinned names restricted.
    fn walk(
        &self,
        target: &AddonId,
        target_dependencies: &[DependencyEntry],
        pins: &[(String, VersionRange)],
    ) -> Result<Walk> {
        let mut declared = BTreeMap::new();
        declared.insert(target.clone(), target_dependencies.to_vec());

        let mut selections: HashMap<String, Selection> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut excluded: Vec<Exclusion> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        let mut queue = VecDeque::from([(target.clone(), false)]);

        while let Some((owner, owner_optional)) = queue.pop_front() {
            let entries = match declared.get(&owner) {
                Some(entries) => entries.clone(),
                None => match self
                    .metadata
                    .resolve_dependency_metadata(&DependencyQuery::exact(&owner))
                {
                    Ok(meta) => {
                        declared.insert(owner.clone(), meta.dependencies.clone());
                        meta.dependencies
                    }
                    Err(e) if owner_optional => {
                        warn!(addon = %owner, error = %e, "Cannot read dependencies of optional addon");
                        warnings.push(format!("dependencies of optional addon {owner} unavailable: {e}"));
                        continue;
                    }
                    Err(e) => return Err(e),
                },
            };

            for entry in entries {
                let optional = owner_optional || entry.optional;

                if entry.name == target.name() {
                    debug!(owner = %owner, "Ignoring dependency on the requested addon");
                    continue;
                }

                if !entry.is_api_compatible_with(&self.runtime) {
                    warn!(
                        owner = %owner,
                        dependency = %entry.name,
                        api = ?entry.api_version.as_ref().map(ToString::to_string),
                        runtime = %self.runtime,
                        "Excluding API-incompatible dependency"
                    );
                    let exclusion = Exclusion {
                        owner: owner.clone(),
                        entry,
                    };
                    if !excluded.contains(&exclusion) {
                        excluded.push(exclusion);
                    }
                    continue;
                }

                if let Some(selection) = selections.get_mut(&entry.name) {
                    if entry.version_range.satisfies(selection.id.version()) {
                        if selection.optional && !optional {
                            debug!(addon = %selection.id, "Promoting optional dependency to required");
                            selection.optional = false;
                            if !selection.installed {
                                queue.push_back((selection.id.clone(), false));
                            }
                        }
                        continue;
                    }

                    if selection.optional && !optional {
                        warn!(
                            addon = %selection.id,
                            owner = %owner,
                            constraint = %entry.version_range,
                            "Reselecting optional dependency for a required constraint"
                        );
                        return Ok(Walk::Repin {
                            warning: format!(
                                "replaced optional selection {} because {} requires {} {}",
                                selection.id, owner, entry.name, entry.version_range
                            ),
                            name: entry.name,
                            range: entry.version_range,
                        });
                    }

                    let reason = format!("conflicts with selected version {}", selection.id.version());
                    if optional {
                        warnings.push(self.skip_warning(&owner, &entry, &reason));
                        continue;
                    }
                    return Err(resolution_error(&owner, &entry, reason));
                }

                let query = DependencyQuery::new(entry.name.clone())
                    .with_range(entry.version_range.clone());
                let available = match self.metadata.resolve_dependency_metadata(&query) {
                    Ok(available) => available,
                    Err(e) if optional => {
                        warnings.push(self.skip_warning(&owner, &entry, &e.to_string()));
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                let best = available
                    .available_versions
                    .into_iter()
                    .filter(|v| entry.version_range.satisfies(v))
                    .filter(|v| {
                        pins.iter()
                            .filter(|(name, _)| *name == entry.name)
                            .all(|(_, range)| range.satisfies(v))
                    })
                    .max();

                let Some(best) = best else {
                    let reason = "no available version satisfies the constraint".to_string();
                    if optional {
                        warnings.push(self.skip_warning(&owner, &entry, &reason));
                        continue;
                    }
                    return Err(resolution_error(&owner, &entry, reason));
                };

                let id = AddonId::new(entry.name.clone(), best)?;
                let installed = self.registry.has(
                    &AddonQuery::new(id.name()).with_api_version(id.version().to_string()),
                )?;
                debug!(addon = %id, optional, installed, "Selected dependency");

                if !installed {
                    queue.push_back((id.clone(), optional));
                }
                order.push(entry.name.clone());
                selections.insert(
                    entry.name,
                    Selection {
                        id,
                        optional,
                        installed,
                    },
                );
            }
        }

        let mut resolution = Resolution {
            target: target.clone(),
            required: Vec::new(),
            optional: Vec::new(),
            excluded,
            satisfied: Vec::new(),
            warnings,
            declared,
        };
        for name in &order {
            let Some(selection) = selections.get(name) else {
                continue;
            };
            let bucket = if selection.installed {
                &mut resolution.satisfied
            } else if selection.optional {
                &mut resolution.optional
            } else {
                &mut resolution.required
            };
            bucket.push(selection.id.clone());
        }
        let planned: Vec<_> = std::iter::once(&resolution.target)
            .chain(&resolution.required)
            .chain(&resolution.optional)
            .cloned()
            .collect();
        resolution.declared.retain(|id, _| planned.contains(id));

        Ok(Walk::Complete(resolution))
    }

    fn skip_warning(&self, owner: &AddonId, entry: &DependencyEntry, reason: &str) -> String {
        warn!(
            owner = %owner,
            dependency = %entry.name,
            constraint = %entry.version_range,
            reason,
            "Skipping optional dependency"
        );
        format!(
            "skipped optional dependency '{}' {} of {}: {}",
            entry.name, entry.version_range, owner, reason
        )
    }
}

fn resolution_error(owner: &AddonId, entry: &DependencyEntry, reason: String) -> Error {
    Error::DependencyResolution {
        addon: owner.to_coordinates(),
        dependency: entry.name.clone(),
        constraint: entry.version_range.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DependencyMetadata;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// In-memory metadata keyed by `(name, version)`.
    #[derive(Default)]
    struct StaticMetadata {
        releases: Vec<(AddonId, Vec<DependencyEntry>)>,
    }

    impl StaticMetadata {
        fn release(mut self, coords: &str, deps: Vec<DependencyEntry>) -> Self {
            self.releases.push((coords.parse().unwrap(), deps));
            self
        }
    }

    impl MetadataResolver for StaticMetadata {
        fn resolve_dependency_metadata(
            &self,
            query: &DependencyQuery,
        ) -> Result<DependencyMetadata> {
            addon_meta::validate_name(&query.name)?;
            let mut matching: Vec<_> = self
                .releases
                .iter()
                .filter(|(id, _)| id.name() == query.name && query.matches(id.version()))
                .collect();
            matching.sort_by(|a, b| a.0.version().cmp(b.0.version()));
            Ok(DependencyMetadata {
                dependencies: matching.last().map(|(_, d)| d.clone()).unwrap_or_default(),
                available_versions: matching.iter().map(|(id, _)| id.version().clone()).collect(),
            })
        }

        fn fetch_artifact(&self, _id: &AddonId) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    fn dep(name: &str, range: &str) -> DependencyEntry {
        DependencyEntry::new(name, VersionRange::parse(range).unwrap())
    }

    fn id(coords: &str) -> AddonId {
        coords.parse().unwrap()
    }

    fn resolver(metadata: StaticMetadata, runtime: &str) -> (TempDir, DependencyResolver) {
        let temp = TempDir::new().unwrap();
        let registry = Arc::new(AddonRegistry::new(temp.path()));
        let resolver = DependencyResolver::new(runtime.parse().unwrap(), Arc::new(metadata), registry);
        (temp, resolver)
    }

    #[rstest]
    #[case("[1.0.0,2.0.0)", "g:a,1.5.0")]
    #[case("(,)", "g:a,2.0.0")]
    #[case("[2.0.0]", "g:a,2.0.0")]
    #[case("(,1.5.0)", "g:a,1.0.0")]
    #[case("1.0.0", "g:a,1.0.0")]
    fn selects_highest_satisfying_version(#[case] range: &str, #[case] expected: &str) {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep("g:a", range)])
            .release("g:a,1.0.0", vec![])
            .release("g:a,1.5.0", vec![])
            .release("g:a,2.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.required, vec![id(expected)]);
        assert!(resolution.optional.is_empty());
    }

    #[test]
    fn unknown_target_is_rejected() {
        let (_temp, resolver) = resolver(StaticMetadata::default(), "1.0.0");
        assert!(matches!(
            resolver.resolve(&id("g:x,1.0.0")),
            Err(Error::AddonNotFound { .. })
        ));
    }

    #[test]
    fn unsatisfiable_required_dependency_fails() {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep("g:a", "[5.0.0,)")])
            .release("g:a,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        match resolver.resolve(&id("g:x,1.0.0")) {
            Err(Error::DependencyResolution {
                addon,
                dependency,
                constraint,
                ..
            }) => {
                assert_eq!(addon, "g:x,1.0.0");
                assert_eq!(dependency, "g:a");
                assert_eq!(constraint, "[5.0.0,)");
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn unsatisfiable_optional_dependency_is_skipped() {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep("g:a", "[5.0.0,)").optional(true)]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert!(resolution.required.is_empty());
        assert!(resolution.optional.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn api_incompatible_dependency_is_excluded() {
        let metadata = StaticMetadata::default()
            .release(
                "g:x,1.0.0",
                vec![
                    dep("g:a", "(,)").with_api_version(Version::new(2, 1, 0)),
                    dep("g:b", "(,)").with_api_version(Version::new(2, 0, 0)),
                ],
            )
            .release("g:a,1.0.0", vec![])
            .release("g:b,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "2.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.required, vec![id("g:b,1.0.0")]);
        assert_eq!(resolution.excluded.len(), 1);
        assert_eq!(resolution.excluded[0].entry.name, "g:a");
    }

    #[test]
    fn exclusion_takes_precedence_over_missing_versions() {
        let metadata = StaticMetadata::default().release(
            "g:x,1.0.0",
            vec![dep("g:gone", "[9.0.0]").with_api_version(Version::new(3, 0, 0))],
        );
        let (_temp, resolver) = resolver(metadata, "2.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.excluded.len(), 1);
    }

    #[test]
    fn walks_transitively_and_inherits_optionality() {
        let metadata = StaticMetadata::default()
            .release(
                "g:x,1.0.0",
                vec![dep("g:a", "(,)"), dep("g:o", "(,)").optional(true)],
            )
            .release("g:a,1.0.0", vec![dep("g:b", "(,)")])
            .release("g:b,1.0.0", vec![])
            .release("g:o,1.0.0", vec![dep("g:p", "(,)")])
            .release("g:p,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.required, vec![id("g:a,1.0.0"), id("g:b,1.0.0")]);
        assert_eq!(resolution.optional, vec![id("g:o,1.0.0"), id("g:p,1.0.0")]);
        assert_eq!(resolution.dependencies_of(&id("g:a,1.0.0")).len(), 1);
    }

    #[test]
    fn required_path_promotes_optional_node() {
        let metadata = StaticMetadata::default()
            .release(
                "g:x,1.0.0",
                vec![dep("g:o", "(,)").optional(true), dep("g:a", "(,)")],
            )
            .release("g:o,1.0.0", vec![dep("g:c", "(,)")])
            .release("g:a,1.0.0", vec![dep("g:o", "(,)")])
            .release("g:c,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(
            resolution.required,
            vec![id("g:o,1.0.0"), id("g:a,1.0.0"), id("g:c,1.0.0")]
        );
        assert!(resolution.optional.is_empty());
    }

    #[test]
    fn conflicting_required_constraint_fails() {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep("g:a", "(,)"), dep("g:b", "(,)")])
            .release("g:a,1.0.0", vec![dep("g:c", "[2.0.0]")])
            .release("g:b,1.0.0", vec![dep("g:c", "[1.0.0]")])
            .release("g:c,1.0.0", vec![])
            .release("g:c,2.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        assert!(matches!(
            resolver.resolve(&id("g:x,1.0.0")),
            Err(Error::DependencyResolution { .. })
        ));
    }

    #[test]
    fn cycles_terminate_and_skip_target() {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep("g:a", "(,)")])
            .release("g:a,1.0.0", vec![dep("g:b", "(,)"), dep("g:x", "(,)")])
            .release("g:b,1.0.0", vec![dep("g:a", "(,)")]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.required, vec![id("g:a,1.0.0"), id("g:b,1.0.0")]);
    }

    #[test]
    fn installed_selections_are_elided() {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep("g:a", "(,)")])
            .release("g:a,1.0.0", vec![dep("g:b", "(,)")])
            .release("g:b,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");
        resolver.registry.install("g:a", "1.0.0", "1.0.0").unwrap();

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert!(resolution.required.is_empty());
        assert_eq!(resolution.satisfied, vec![id("g:a,1.0.0")]);
    }

    #[test]
    fn duplicate_paths_are_deduplicated() {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep("g:a", "(,)"), dep("g:b", "(,)")])
            .release("g:a,1.0.0", vec![dep("g:c", "[1.0.0,)")])
            .release("g:b,1.0.0", vec![dep("g:c", "(,2.0.0)")])
            .release("g:c,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(
            resolution.required,
            vec![id("g:a,1.0.0"), id("g:b,1.0.0"), id("g:c,1.0.0")]
        );
    }

    #[test]
    fn required_constraint_replaces_optional_selection() {
        let metadata = StaticMetadata::default()
            .release(
                "g:x,1.0.0",
                vec![dep("g:o", "(,)").optional(true), dep("g:a", "(,)")],
            )
            .release("g:a,1.0.0", vec![dep("g:o", "[1.0.0]")])
            .release("g:o,1.0.0", vec![])
            .release("g:o,2.0.0", vec![dep("g:c", "(,)")])
            .release("g:c,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.required, vec![id("g:o,1.0.0"), id("g:a,1.0.0")]);
        assert!(resolution.optional.is_empty());
        assert_eq!(resolution.warnings.len(), 1);
        assert!(resolution.warnings[0].contains("g:o,2.0.0"));
    }

    #[test]
    fn optional_entry_outside_pinned_range_is_skipped() {
        let metadata = StaticMetadata::default()
            .release(
                "g:x,1.0.0",
                vec![dep("g:o", "[2.0.0]").optional(true), dep("g:a", "(,)")],
            )
            .release("g:a,1.0.0", vec![dep("g:o", "[1.0.0]")])
            .release("g:o,1.0.0", vec![])
            .release("g:o,2.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.required, vec![id("g:a,1.0.0"), id("g:o,1.0.0")]);
        assert_eq!(resolution.warnings.len(), 2);
    }

    #[rstest]
    #[case::bare_name("bare")]
    #[case::empty_group(":a")]
    fn optional_metadata_error_becomes_warning(#[case] name: &str) {
        let metadata = StaticMetadata::default()
            .release("g:x,1.0.0", vec![dep(name, "(,)").optional(true), dep("g:a", "(,)")])
            .release("g:a,1.0.0", vec![]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        let resolution = resolver.resolve(&id("g:x,1.0.0")).unwrap();
        assert_eq!(resolution.required, vec![id("g:a,1.0.0")]);
        assert_eq!(resolution.warnings.len(), 1);
        assert!(resolution.warnings[0].contains(name));
    }

    #[test]
    fn required_metadata_error_propagates() {
        let metadata =
            StaticMetadata::default().release("g:x,1.0.0", vec![dep("bare", "(,)")]);
        let (_temp, resolver) = resolver(metadata, "1.0.0");

        assert!(matches!(
            resolver.resolve(&id("g:x,1.0.0")),
            Err(Error::Meta(addon_meta::Error::InvalidName { .. }))
        ));
    }
}
