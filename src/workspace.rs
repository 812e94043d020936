//! Per-request workspace management.
//!
//! Every execution request gets an exclusively-owned, uuid-named scratch
//! directory under a configured root. Workspaces never outlive their
//! request: cleanup runs on every exit path, and a failed cleanup is
//! logged rather than failing the user's result.

use crate::config::types::{Result, SandboxError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Disposable scratch directory owned by a single execution request.
pub struct Workspace {
    run_id: String,
    run_dir: PathBuf,
}

impl Workspace {
    fn create(base_dir: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let run_dir = base_dir.join(&run_id);

        fs::create_dir_all(&run_dir).map_err(|e| {
            SandboxError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create workspace directory {}: {}", run_dir.display(), e),
            ))
        })?;

        Ok(Self { run_id, run_dir })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Materialize the submitted source under `file_name` inside the run
    /// directory. The name must be a bare file name; anything that could
    /// escape the workspace is rejected.
    pub fn write_source(&self, file_name: &str, code: &str) -> Result<PathBuf> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(SandboxError::Workspace(format!(
                "Invalid source file name: {file_name:?}"
            )));
        }

        let source_path = self.run_dir.join(file_name);
        fs::write(&source_path, code).map_err(|e| {
            SandboxError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write source file {}: {}", source_path.display(), e),
            ))
        })?;
        Ok(source_path)
    }

    /// Remove the run directory tree (idempotent, best-effort).
    /// Failures are logged and never propagated; a sandbox whose cleanup
    /// fails must not fail the user's request.
    pub fn cleanup(&self) {
        if self.run_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.run_dir) {
                log::warn!("Failed to remove workspace {}: {}", self.run_dir.display(), e);
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Creates uniquely named workspaces under one root directory.
pub struct WorkspaceManager {
    base_dir: PathBuf,
}

impl WorkspaceManager {
    /// Create a manager, creating the root directory if absent.
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir).map_err(|e| {
            SandboxError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create workspace root {}: {}", base_dir.display(), e),
            ))
        })?;

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create a fresh workspace for one request. Uuid naming keeps
    /// concurrent requests collision-free without any cross-request locks.
    pub fn create_workspace(&self) -> Result<Workspace> {
        Workspace::create(&self.base_dir)
    }

    /// Sweep run directories orphaned by a crashed process.
    ///
    /// Never invoked on the request path; intended for an operator command
    /// or periodic maintenance. Returns the number of directories removed.
    pub fn cleanup_stale(&self, max_age: Duration) -> Result<usize> {
        let mut cleaned = 0;
        let now = std::time::SystemTime::now();

        if !self.base_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.base_dir).map_err(|e| {
            SandboxError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read workspace root {}: {}", self.base_dir.display(), e),
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Failed to read workspace root entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("Failed to stat workspace {}: {}", path.display(), e);
                    continue;
                }
            };

            let age = match now.duration_since(modified) {
                Ok(d) => d,
                Err(_) => continue, // Future timestamp, skip
            };

            if age > max_age {
                log::info!("Removing stale workspace: {}", path.display());
                if let Err(e) = fs::remove_dir_all(&path) {
                    log::warn!("Failed to remove stale workspace {}: {}", path.display(), e);
                } else {
                    cleaned += 1;
                }
            }
        }

        Ok(cleaned)
    }
}
