//! Configuration for the execution core.
//!
//! Everything a deployment can tune lives in [`SandboxConfig`], passed at
//! construction. There is no process-wide default instance; callers own
//! their executor and its configuration.

pub mod types;

use std::path::PathBuf;
use std::time::Duration;

/// Wall-clock budgets per toolchain stage.
///
/// Compiling is bounded tighter than running: a compiler that has not
/// finished in seconds is stuck, while interpretation and compute may
/// legitimately take longer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageBudgets {
    pub compile: Duration,
    pub run: Duration,
}

impl Default for StageBudgets {
    fn default() -> Self {
        Self {
            compile: Duration::from_secs(10),
            run: Duration::from_secs(15),
        }
    }
}

/// Configuration for a [`crate::executor::CodeExecutor`].
#[derive(Clone, Debug)]
pub struct SandboxConfig {
    /// Root directory under which per-request workspaces are created
    pub workspace_root: PathBuf,
    /// Per-stage wall-clock timeouts
    pub budgets: StageBudgets,
    /// Captured stdout cap in bytes; output beyond this is truncated
    pub stdout_limit: usize,
    /// Captured stderr cap in bytes
    pub stderr_limit: usize,
}

impl SandboxConfig {
    /// Workspace root scoped by effective UID.
    /// Prevents root and non-root deployments from colliding on a shared temp dir.
    pub fn runtime_root_dir() -> PathBuf {
        let euid = unsafe { libc::geteuid() };
        std::env::temp_dir().join(format!("codebox-uid-{}", euid))
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_budgets(mut self, budgets: StageBudgets) -> Self {
        self.budgets = budgets;
        self
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            workspace_root: Self::runtime_root_dir(),
            budgets: StageBudgets::default(),
            stdout_limit: 8 * 1024 * 1024,
            stderr_limit: 2 * 1024 * 1024,
        }
    }
}
