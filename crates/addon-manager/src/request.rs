//! Install plans and their execution.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use addon_fs::NormalizedPath;
use addon_fs::io::copy_atomic;
use addon_meta::{AddonId, DependencyEntry};
use addon_registry::{AddonRegistry, RegistryEntry};
use addon_resolver::{Exclusion, MetadataResolver, Resolution};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Lifecycle of an [`InstallRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Created,
    Performed,
    Failed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Performed => "performed",
            Self::Failed => "failed",
        })
    }
}

/// What a successful [`InstallRequest::perform`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallReport {
    /// Required dependencies followed by the target, in install order.
    pub installed: Vec<AddonId>,
    pub optional_installed: Vec<AddonId>,
    /// Optional dependencies that were skipped or failed.
    pub warnings: Vec<String>,
}

/// A resolved plan for installing one addon.
///
/// Creating a request has no side effects; [`perform`](Self::perform) runs it
/// exactly once.
pub struct InstallRequest {
    target: AddonId,
    required: Vec<AddonId>,
    optional: Vec<AddonId>,
    declared: BTreeMap<AddonId, Vec<DependencyEntry>>,
    excluded: Vec<Exclusion>,
    satisfied: Vec<AddonId>,
    warnings: Vec<String>,
    state: InstallState,
    metadata: Arc<dyn MetadataResolver>,
    registry: Arc<AddonRegistry>,
}

impl InstallRequest {
    pub(crate) fn new(
        resolution: Resolution,
        metadata: Arc<dyn MetadataResolver>,
        registry: Arc<AddonRegistry>,
    ) -> Self {
        Self {
            target: resolution.target,
            required: resolution.required,
            optional: resolution.optional,
            declared: resolution.declared,
            excluded: resolution.excluded,
            satisfied: resolution.satisfied,
            warnings: resolution.warnings,
            state: InstallState::Created,
            metadata,
            registry,
        }
    }

    pub fn target(&self) -> &AddonId {
        &self.target
    }

    pub fn required_addons(&self) -> &[AddonId] {
        &self.required
    }

    pub fn optional_addons(&self) -> &[AddonId] {
        &self.optional
    }

    /// Dependencies left out because the runtime API is too old.
    pub fn excluded(&self) -> &[Exclusion] {
        &self.excluded
    }

    /// Dependencies already present in the registry.
    pub fn already_installed(&self) -> &[AddonId] {
        &self.satisfied
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Copy artifacts and register every planned addon.
    ///
    /// Required dependencies go first, then the target, then optional
    /// dependencies. A failure on the required path stops the run with
    /// [`Error::PartialInstall`]; whatever was installed before it stays
    /// installed and a fresh request for the same target picks up from there.
    /// Optional failures only add a warning to the report.
    pub fn perform(&mut self) -> Result<InstallReport> {
        if self.state != InstallState::Created {
            return Err(Error::InvalidState { state: self.state });
        }

        let mut report = InstallReport {
            warnings: self.warnings.clone(),
            ..InstallReport::default()
        };

        let required_path: Vec<AddonId> = self
            .required
            .iter()
            .chain(std::iter::once(&self.target))
            .cloned()
            .collect();
        for id in required_path {
            if let Err(e) = self.install_one(&id) {
                self.state = InstallState::Failed;
                warn!(addon = %id, error = %e, "Required install failed");
                return Err(Error::PartialInstall {
                    failed: id,
                    completed: report.installed,
                    source: Box::new(e),
                });
            }
            report.installed.push(id);
        }

        for id in self.optional.clone() {
            match self.install_one(&id) {
                Ok(()) => report.optional_installed.push(id),
                Err(e) => {
                    warn!(addon = %id, error = %e, "Optional install failed");
                    report.warnings.push(format!("optional addon {id} not installed: {e}"));
                }
            }
        }

        self.state = InstallState::Performed;
        info!(
            target = %self.target,
            installed = report.installed.len(),
            optional = report.optional_installed.len(),
            "Install complete"
        );
        Ok(report)
    }

    fn install_one(&self, id: &AddonId) -> Result<()> {
        let version = id.version().to_string();
        let entry = RegistryEntry::new(id.name(), &version, &version);
        let dir = self.registry.resource_dir(&entry);
        let robustness = self.registry.robustness();

        // Slow I/O happens before the registry lock is taken
        for file in self.metadata.fetch_artifact(id)? {
            let Some(file_name) = file.file_name().and_then(|n| n.to_str()) else {
                warn!(addon = %id, file = %file.display(), "Skipping artifact without a file name");
                continue;
            };
            let dest = NormalizedPath::new(dir.join(file_name));
            if copy_atomic(&file, &dest, robustness)? {
                debug!(addon = %id, file = file_name, "Copied artifact");
            }
        }

        let dependencies = self.declared.get(id).map(Vec::as_slice).unwrap_or_default();
        self.registry.write_dependency_entries(&entry, dependencies)?;
        self.registry.install(id.name(), &version, &version)?;
        Ok(())
    }
}

impl fmt::Debug for InstallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallRequest")
            .field("target", &self.target)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
