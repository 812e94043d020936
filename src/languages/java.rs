use crate::config::StageBudgets;
use crate::languages::adapter::LanguageAdapter;
use crate::runner::ToolchainInvocation;
use crate::workspace::Workspace;

const DEFAULT_CLASS_NAME: &str = "Main";

/// Compiled-then-run adapter: `javac` produces class files consumed by a
/// separate `java` launch.
#[derive(Debug, Clone)]
pub struct JavaAdapter {
    budgets: StageBudgets,
}

impl JavaAdapter {
    pub fn new(budgets: StageBudgets) -> Self {
        Self { budgets }
    }
}

impl Default for JavaAdapter {
    fn default() -> Self {
        Self::new(StageBudgets::default())
    }
}

/// Best-effort scan for a declared public class name.
///
/// A deliberate pattern match, not a parser; isolated here so a real
/// parser could replace it without touching the coordinator. Code that
/// fails to match falls back to the default class name.
fn detect_public_class(code: &str) -> Option<String> {
    for line in code.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*") {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let Some(class_idx) = tokens.iter().position(|t| *t == "class") else {
            continue;
        };
        if !tokens[..class_idx].contains(&"public") {
            continue;
        }
        let Some(raw) = tokens.get(class_idx + 1) else {
            continue;
        };

        let name: String = raw
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
            .collect();
        if !name.is_empty() && !name.starts_with(|c: char| c.is_numeric()) {
            return Some(name);
        }
    }
    None
}

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> &'static str {
        "java"
    }

    /// The file must be named after the public class or javac rejects it;
    /// the entry hint is ignored for java.
    fn source_file_name(&self, code: &str, _entry_hint: Option<&str>) -> String {
        let class_name =
            detect_public_class(code).unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string());
        format!("{}.java", class_name)
    }

    fn build_invocation(
        &self,
        workspace: &Workspace,
        source_file: &str,
    ) -> Option<ToolchainInvocation> {
        Some(
            ToolchainInvocation::new(
                "javac",
                vec![
                    "-encoding".to_string(),
                    "UTF-8".to_string(),
                    source_file.to_string(),
                ],
                workspace.run_dir(),
                self.budgets.compile,
            )
            .with_env("JAVA_TOOL_OPTIONS", "-Dfile.encoding=UTF-8"),
        )
    }

    fn run_invocation(&self, workspace: &Workspace, source_file: &str) -> ToolchainInvocation {
        let class_name = source_file
            .strip_suffix(".java")
            .unwrap_or(DEFAULT_CLASS_NAME);
        ToolchainInvocation::new(
            "java",
            vec![
                "-Xmx256m".to_string(),
                "-XX:+UseSerialGC".to_string(),
                "-cp".to_string(),
                ".".to_string(),
                class_name.to_string(),
            ],
            workspace.run_dir(),
            self.budgets.run,
        )
        .with_env("JAVA_TOOL_OPTIONS", "-Dfile.encoding=UTF-8")
    }

    fn runtime_error_prefix(&self) -> &'static str {
        "Runtime Error: "
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::WorkspaceManager;

    #[test]
    fn detects_declared_public_class() {
        let code = "public class HelloWorld {\n  public static void main(String[] a) {}\n}";
        assert_eq!(detect_public_class(code), Some("HelloWorld".to_string()));
    }

    #[test]
    fn tolerates_modifiers_and_generics() {
        assert_eq!(
            detect_public_class("public final class Box<T> extends Base {"),
            Some("Box".to_string())
        );
    }

    #[test]
    fn falls_back_when_nothing_matches() {
        let adapter = JavaAdapter::default();
        assert_eq!(
            adapter.source_file_name("class Hidden {}", None),
            "Main.java"
        );
        assert_eq!(adapter.source_file_name("not java at all", None), "Main.java");
    }

    #[test]
    fn ignores_commented_declarations() {
        let code = "// public class Old {}\npublic class Current {}";
        assert_eq!(detect_public_class(code), Some("Current".to_string()));
    }

    #[test]
    fn build_then_run_share_the_workspace() {
        let root = std::env::temp_dir().join(format!("codebox_java_{}", std::process::id()));
        let manager = WorkspaceManager::new(root.clone()).unwrap();
        let workspace = manager.create_workspace().unwrap();

        let adapter = JavaAdapter::default();
        let source = adapter.source_file_name("public class App {}", None);
        assert_eq!(source, "App.java");

        let build = adapter.build_invocation(&workspace, &source).unwrap();
        assert_eq!(build.program, "javac");
        assert_eq!(build.workdir, workspace.run_dir());
        assert!(build.args.contains(&"App.java".to_string()));

        let run = adapter.run_invocation(&workspace, &source);
        assert_eq!(run.program, "java");
        assert_eq!(run.args.last().unwrap(), "App");
        assert!(build.timeout < run.timeout);

        drop(workspace);
        let _ = std::fs::remove_dir_all(&root);
    }
}
