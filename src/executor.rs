//! Execution coordinator.
//!
//! Public entry point of the crate. Drives workspace lifecycle, the
//! optional build stage, and the run stage; every failure mode is folded
//! into a well-formed [`ExecutionResult`] so no fault crosses the public
//! boundary.

use crate::config::types::{ExecutionRequest, ExecutionResult, Result};
use crate::config::SandboxConfig;
use crate::languages::adapter::{LanguageAdapter, RunOutcome};
use crate::languages::registry::LanguageRegistry;
use crate::runner::ProcessRunner;
use crate::workspace::{Workspace, WorkspaceManager};
use std::time::Instant;

/// Executes untrusted code submissions in disposable workspaces.
///
/// Explicitly constructed with its configuration and language registry;
/// holds no process-wide state, so deployments can run several executors
/// with different roots or budgets side by side.
pub struct CodeExecutor {
    workspaces: WorkspaceManager,
    runner: ProcessRunner,
    registry: LanguageRegistry,
}

impl CodeExecutor {
    /// Executor with the built-in java/python adapter set.
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let registry = LanguageRegistry::with_defaults(config.budgets);
        Self::with_registry(config, registry)
    }

    /// Executor with a caller-supplied registry.
    pub fn with_registry(config: SandboxConfig, registry: LanguageRegistry) -> Result<Self> {
        let workspaces = WorkspaceManager::new(config.workspace_root.clone())?;
        let runner = ProcessRunner::new(config.stdout_limit, config.stderr_limit);
        Ok(Self {
            workspaces,
            runner,
            registry,
        })
    }

    pub fn workspace_manager(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// Execute one submission. Never returns an error: every failure mode
    /// (compile, runtime, timeout, unsupported language, infrastructure)
    /// surfaces as `success: false` with a diagnostic in `errors`.
    pub fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let started = Instant::now();

        // Fail fast before any filesystem work
        let adapter = match self.registry.resolve(&request.language) {
            Ok(adapter) => adapter,
            Err(err) => {
                return ExecutionResult::failure(vec![err.to_string()], elapsed_ms(started))
            }
        };

        if request.code.trim().is_empty() {
            return ExecutionResult::failure(
                vec!["System Error: code must not be empty".to_string()],
                elapsed_ms(started),
            );
        }

        match self.run_stages(adapter.as_ref(), request) {
            Ok(run) => ExecutionResult {
                success: run.success,
                output: run.output,
                errors: run.diagnostics,
                execution_time: elapsed_ms(started),
            },
            Err(err) => {
                log::error!(
                    "infrastructure failure executing {} submission: {}",
                    request.language,
                    err
                );
                ExecutionResult::failure(
                    vec![format!("System Error: {}", err)],
                    elapsed_ms(started),
                )
            }
        }
    }

    fn run_stages(
        &self,
        adapter: &dyn LanguageAdapter,
        request: &ExecutionRequest,
    ) -> Result<RunOutcome> {
        let workspace = self.workspaces.create_workspace()?;
        log::debug!(
            "run {}: executing {} submission",
            workspace.run_id(),
            adapter.language()
        );

        let outcome = self.run_in_workspace(&workspace, adapter, request);

        // Release on every path; Drop is the backstop if this frame unwinds
        workspace.cleanup();
        outcome
    }

    fn run_in_workspace(
        &self,
        workspace: &Workspace,
        adapter: &dyn LanguageAdapter,
        request: &ExecutionRequest,
    ) -> Result<RunOutcome> {
        let source_file =
            adapter.source_file_name(&request.code, request.entry_file_name.as_deref());
        workspace.write_source(&source_file, &request.code)?;

        if let Some(invocation) = adapter.build_invocation(workspace, &source_file) {
            let raw = self.runner.run(&invocation)?;
            let build = adapter.interpret_build(&raw);
            if !build.success {
                // Failed build stops the request; the run stage never starts
                return Ok(RunOutcome {
                    success: false,
                    output: String::new(),
                    diagnostics: build.diagnostics,
                });
            }
        }

        let raw = self
            .runner
            .run(&adapter.run_invocation(workspace, &source_file))?;
        Ok(adapter.interpret_run(&raw))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn test_config(name: &str) -> (SandboxConfig, PathBuf) {
        let root = std::env::temp_dir().join(format!(
            "codebox_exec_test_{}_{}",
            name,
            std::process::id()
        ));
        let config = SandboxConfig::default().with_workspace_root(root.clone());
        (config, root)
    }

    #[test]
    fn unsupported_language_fails_without_touching_disk() {
        let (config, root) = test_config("unsupported");
        let executor = CodeExecutor::new(config).unwrap();

        let result = executor.execute(&ExecutionRequest::new("print(1)", "cobol"));
        assert!(!result.success);
        assert!(result.errors[0].contains("Unsupported language: cobol"));
        assert!(result.output.is_empty());

        let entries = fs::read_dir(&root).unwrap().count();
        assert_eq!(entries, 0, "no workspace may be created for a rejected language");

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn empty_code_is_rejected() {
        let (config, root) = test_config("empty");
        let executor = CodeExecutor::new(config).unwrap();

        let result = executor.execute(&ExecutionRequest::new("   \n", "python"));
        assert!(!result.success);
        assert!(result.errors[0].starts_with("System Error:"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn unwritable_root_fails_at_construction() {
        let config =
            SandboxConfig::default().with_workspace_root("/proc/codebox-cannot-exist/ws");
        assert!(CodeExecutor::new(config).is_err());
    }
}
