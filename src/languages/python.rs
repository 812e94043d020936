use crate::config::StageBudgets;
use crate::languages::adapter::LanguageAdapter;
use crate::runner::ToolchainInvocation;
use crate::workspace::Workspace;

const DEFAULT_SOURCE_NAME: &str = "main.py";

/// Interpreted adapter: no build stage, the interpreter runs the written
/// source directly.
#[derive(Debug, Clone)]
pub struct PythonAdapter {
    budgets: StageBudgets,
}

impl PythonAdapter {
    pub fn new(budgets: StageBudgets) -> Self {
        Self { budgets }
    }
}

impl Default for PythonAdapter {
    fn default() -> Self {
        Self::new(StageBudgets::default())
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> &'static str {
        "python"
    }

    fn source_file_name(&self, _code: &str, entry_hint: Option<&str>) -> String {
        match entry_hint {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_SOURCE_NAME.to_string(),
        }
    }

    fn build_invocation(
        &self,
        _workspace: &Workspace,
        _source_file: &str,
    ) -> Option<ToolchainInvocation> {
        None
    }

    fn run_invocation(&self, workspace: &Workspace, source_file: &str) -> ToolchainInvocation {
        ToolchainInvocation::new(
            "python3",
            vec!["-B".to_string(), source_file.to_string()],
            workspace.run_dir(),
            self.budgets.run,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::WorkspaceManager;

    #[test]
    fn default_source_name_without_hint() {
        let adapter = PythonAdapter::default();
        assert_eq!(adapter.source_file_name("print(1)", None), "main.py");
        assert_eq!(adapter.source_file_name("print(1)", Some("")), "main.py");
    }

    #[test]
    fn entry_hint_overrides_source_name() {
        let adapter = PythonAdapter::default();
        assert_eq!(
            adapter.source_file_name("print(1)", Some("solution.py")),
            "solution.py"
        );
    }

    #[test]
    fn run_invocation_targets_the_workspace() {
        let root = std::env::temp_dir().join(format!("codebox_python_{}", std::process::id()));
        let manager = WorkspaceManager::new(root.clone()).unwrap();
        let workspace = manager.create_workspace().unwrap();

        let adapter = PythonAdapter::default();
        assert!(adapter.build_invocation(&workspace, "main.py").is_none());

        let run = adapter.run_invocation(&workspace, "main.py");
        assert_eq!(run.program, "python3");
        assert_eq!(run.args, vec!["-B".to_string(), "main.py".to_string()]);
        assert_eq!(run.workdir, workspace.run_dir());

        drop(workspace);
        let _ = std::fs::remove_dir_all(&root);
    }
}
