//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;
use tracing::debug;

use crate::{Error, NormalizedPath, Result, checksum};

/// Tuning for writes that must survive crashes and concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying the sidecar lock before giving up
    pub lock_timeout: Duration,
    /// Flush file contents to disk before the rename
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Holds an exclusive advisory lock on a hidden `.<name>.lock` sidecar while
/// the content is written to a temporary file in the same directory and
/// renamed over the target. Readers see either the old or the new content.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();
    ensure_parent(&native_path)?;

    let _lock = SidecarLock::acquire(&native_path, config.lock_timeout)?;
    replace(&native_path, content, config.enable_fsync)
}

/// Copy `source` to `dest` through a temporary file and rename.
///
/// No sidecar lock is taken; artifact copies are never read-modify-write.
/// Returns `false` without touching `dest` when it already holds identical
/// content.
pub fn copy_atomic(source: &Path, dest: &NormalizedPath, config: RobustnessConfig) -> Result<bool> {
    let native_dest = dest.to_native();

    if native_dest.is_file() {
        let existing =
            checksum::compute_file_checksum(&native_dest).map_err(|e| Error::io(&native_dest, e))?;
        let incoming = checksum::compute_file_checksum(source).map_err(|e| Error::io(source, e))?;
        if existing == incoming {
            debug!(dest = %dest, "Skipping copy of unchanged file");
            return Ok(false);
        }
    }

    let content = fs::read(source).map_err(|e| Error::io(source, e))?;
    ensure_parent(&native_dest)?;
    replace(&native_dest, &content, config.enable_fsync)?;
    Ok(true)
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically with default robustness settings.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

fn ensure_parent(native_path: &Path) -> Result<()> {
    if let Some(parent) = native_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}

fn file_name_of(native_path: &Path) -> String {
    native_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn replace(native_path: &Path, content: &[u8], enable_fsync: bool) -> Result<()> {
    let parent = match native_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // Temp file lives next to the target so the rename stays on one filesystem
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name_of(native_path)))
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| Error::io(&parent, e))?;

    temp.write_all(content)
        .map_err(|e| Error::io(temp.path(), e))?;

    if enable_fsync {
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::io(temp.path(), e))?;
    }

    temp.persist(native_path)
        .map_err(|e| Error::io(native_path, e.error))?;

    Ok(())
}

/// Exclusive advisory lock on a sidecar file, released on drop.
struct SidecarLock {
    file: File,
}

impl SidecarLock {
    fn acquire(target: &Path, timeout: Duration) -> Result<Self> {
        let lock_path = target.with_file_name(format!(".{}.lock", file_name_of(target)));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(5))
            .with_max_interval(Duration::from_millis(100))
            .with_max_elapsed_time(Some(timeout))
            .build();

        backoff::retry(policy, || {
            FileExt::try_lock_exclusive(&file).map_err(backoff::Error::transient)
        })
        .map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;

        Ok(Self { file })
    }
}

impl Drop for SidecarLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
