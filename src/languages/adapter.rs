use crate::runner::{RawOutcome, ToolchainInvocation};
use crate::workspace::Workspace;

/// Reported as `output` when a program runs to completion without writing
/// anything, so callers can tell "ran, no output" from "no result".
pub const EMPTY_OUTPUT_PLACEHOLDER: &str = "Program executed successfully (no output)";

/// Outcome of the compile stage. A failed build stops the request; the run
/// stage is never attempted.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    pub success: bool,
    pub diagnostics: Vec<String>,
}

/// Outcome of the run stage, already mapped to user-facing shape.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub success: bool,
    pub output: String,
    pub diagnostics: Vec<String>,
}

/// Per-language strategy for compile/run stages and error mapping.
///
/// Compiled languages return a build invocation; interpreted languages
/// return `None` and go straight to the run stage.
pub trait LanguageAdapter: Send + Sync + std::fmt::Debug {
    fn language(&self) -> &'static str;

    /// File name the submitted source is written under inside the workspace.
    fn source_file_name(&self, code: &str, entry_hint: Option<&str>) -> String;

    /// Compiler launch for compiled languages, `None` for interpreted ones.
    fn build_invocation(
        &self,
        workspace: &Workspace,
        source_file: &str,
    ) -> Option<ToolchainInvocation>;

    fn run_invocation(&self, workspace: &Workspace, source_file: &str) -> ToolchainInvocation;

    /// Prefix attached to run-stage failure diagnostics.
    fn runtime_error_prefix(&self) -> &'static str {
        "Error: "
    }

    /// Map a raw compile-stage outcome. Non-zero exit or compiler output on
    /// stderr marks the build failed.
    fn interpret_build(&self, raw: &RawOutcome) -> BuildOutcome {
        if raw.timed_out {
            return BuildOutcome {
                success: false,
                diagnostics: vec![format!(
                    "Compilation Error: compiler timed out after {} seconds",
                    raw.timeout.as_secs()
                )],
            };
        }

        let stderr = raw.stderr.trim();
        if raw.exited_zero() && stderr.is_empty() {
            BuildOutcome {
                success: true,
                diagnostics: Vec::new(),
            }
        } else {
            let detail = if stderr.is_empty() {
                abnormal_exit_message(raw)
            } else {
                stderr.to_string()
            };
            BuildOutcome {
                success: false,
                diagnostics: vec![format!("Compilation Error: {}", detail)],
            }
        }
    }

    /// Map a raw run-stage outcome. Partial stdout produced before a
    /// failure is preserved in `output`.
    fn interpret_run(&self, raw: &RawOutcome) -> RunOutcome {
        if raw.timed_out {
            return RunOutcome {
                success: false,
                output: raw.stdout.clone(),
                diagnostics: vec![format!(
                    "Execution timed out after {} seconds",
                    raw.timeout.as_secs()
                )],
            };
        }

        if raw.exited_zero() {
            let output = if raw.stdout.is_empty() {
                EMPTY_OUTPUT_PLACEHOLDER.to_string()
            } else {
                raw.stdout.clone()
            };
            let diagnostics = if raw.stderr.trim().is_empty() {
                Vec::new()
            } else {
                vec![raw.stderr.clone()]
            };
            RunOutcome {
                success: true,
                output,
                diagnostics,
            }
        } else {
            let detail = if raw.stderr.trim().is_empty() {
                abnormal_exit_message(raw)
            } else {
                raw.stderr.clone()
            };
            RunOutcome {
                success: false,
                output: raw.stdout.clone(),
                diagnostics: vec![format!("{}{}", self.runtime_error_prefix(), detail)],
            }
        }
    }
}

/// Diagnostic for processes that died without writing to stderr.
fn abnormal_exit_message(raw: &RawOutcome) -> String {
    match (raw.signal, raw.exit_code) {
        (Some(signal), _) => format!("process terminated by signal {}", signal),
        (None, Some(code)) => format!("process exited with status {}", code),
        (None, None) => "process exited abnormally".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug)]
    struct FakeAdapter;

    impl LanguageAdapter for FakeAdapter {
        fn language(&self) -> &'static str {
            "fake"
        }

        fn source_file_name(&self, _code: &str, _entry_hint: Option<&str>) -> String {
            "main.fake".to_string()
        }

        fn build_invocation(
            &self,
            _workspace: &Workspace,
            _source_file: &str,
        ) -> Option<ToolchainInvocation> {
            None
        }

        fn run_invocation(
            &self,
            workspace: &Workspace,
            source_file: &str,
        ) -> ToolchainInvocation {
            ToolchainInvocation::new(
                "/bin/true",
                vec![source_file.to_string()],
                workspace.run_dir(),
                Duration::from_secs(1),
            )
        }
    }

    fn raw(exit_code: Option<i32>, stdout: &str, stderr: &str, timed_out: bool) -> RawOutcome {
        RawOutcome {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
            signal: None,
            timed_out,
            wall_time: Duration::from_millis(10),
            timeout: Duration::from_secs(15),
        }
    }

    #[test]
    fn successful_run_with_empty_stdout_reports_placeholder() {
        let outcome = FakeAdapter.interpret_run(&raw(Some(0), "", "", false));
        assert!(outcome.success);
        assert_eq!(outcome.output, EMPTY_OUTPUT_PLACEHOLDER);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn stderr_on_successful_exit_is_a_diagnostic_not_a_failure() {
        let outcome = FakeAdapter.interpret_run(&raw(Some(0), "ok\n", "warning: deprecated\n", false));
        assert!(outcome.success);
        assert_eq!(outcome.output, "ok\n");
        assert_eq!(outcome.diagnostics, vec!["warning: deprecated\n".to_string()]);
    }

    #[test]
    fn failed_run_keeps_partial_stdout_and_prefixes_stderr() {
        let outcome = FakeAdapter.interpret_run(&raw(Some(1), "partial\n", "boom\n", false));
        assert!(!outcome.success);
        assert_eq!(outcome.output, "partial\n");
        assert_eq!(outcome.diagnostics, vec!["Error: boom\n".to_string()]);
    }

    #[test]
    fn timed_out_run_is_identified_distinctly() {
        let outcome = FakeAdapter.interpret_run(&raw(None, "", "", true));
        assert!(!outcome.success);
        assert_eq!(
            outcome.diagnostics,
            vec!["Execution timed out after 15 seconds".to_string()]
        );
    }

    #[test]
    fn silent_nonzero_exit_synthesizes_a_diagnostic() {
        let outcome = FakeAdapter.interpret_run(&raw(Some(7), "", "", false));
        assert!(!outcome.success);
        assert_eq!(
            outcome.diagnostics,
            vec!["Error: process exited with status 7".to_string()]
        );
    }

    #[test]
    fn build_failure_carries_compile_prefix() {
        let outcome = FakeAdapter.interpret_build(&raw(Some(1), "", "expected ';'\n", false));
        assert!(!outcome.success);
        assert_eq!(
            outcome.diagnostics,
            vec!["Compilation Error: expected ';'".to_string()]
        );
    }

    #[test]
    fn compiler_stderr_fails_build_even_on_zero_exit() {
        let outcome = FakeAdapter.interpret_build(&raw(Some(0), "", "warning treated as error\n", false));
        assert!(!outcome.success);
    }

    #[test]
    fn clean_build_succeeds() {
        let outcome = FakeAdapter.interpret_build(&raw(Some(0), "", "", false));
        assert!(outcome.success);
        assert!(outcome.diagnostics.is_empty());
    }
}
