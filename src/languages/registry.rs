use crate::config::types::{Result, SandboxError};
use crate::config::StageBudgets;
use crate::languages::adapter::LanguageAdapter;
use crate::languages::java::JavaAdapter;
use crate::languages::python::PythonAdapter;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps normalized language identifiers to adapters.
///
/// Built explicitly and injected into the coordinator; callers extend it
/// with [`register`](Self::register) for additional languages.
pub struct LanguageRegistry {
    adapters: HashMap<String, Arc<dyn LanguageAdapter>>,
}

impl LanguageRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry with the built-in adapter set.
    pub fn with_defaults(budgets: StageBudgets) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(JavaAdapter::new(budgets)));
        registry.register(Arc::new(PythonAdapter::new(budgets)));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn LanguageAdapter>) {
        self.adapters
            .insert(adapter.language().to_string(), adapter);
    }

    /// Resolve an adapter. Unknown identifiers fail distinctly rather than
    /// falling through to some default toolchain.
    pub fn resolve(&self, language: &str) -> Result<Arc<dyn LanguageAdapter>> {
        self.adapters
            .get(&normalize(language))
            .cloned()
            .ok_or_else(|| SandboxError::UnsupportedLanguage(language.to_string()))
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Normalize common aliases so adapter lookup stays deterministic.
fn normalize(language: &str) -> String {
    let lower = language.trim().to_lowercase();
    match lower.as_str() {
        "py" => "python".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_languages_and_aliases() {
        let registry = LanguageRegistry::with_defaults(StageBudgets::default());
        assert_eq!(registry.resolve("python").unwrap().language(), "python");
        assert_eq!(registry.resolve("py").unwrap().language(), "python");
        assert_eq!(registry.resolve("Java").unwrap().language(), "java");
        assert_eq!(registry.languages(), vec!["java", "python"]);
    }

    #[test]
    fn unknown_language_fails_distinctly() {
        let registry = LanguageRegistry::with_defaults(StageBudgets::default());
        let err = registry.resolve("brainfuck").unwrap_err();
        assert!(matches!(err, SandboxError::UnsupportedLanguage(_)));
        assert!(err.to_string().contains("brainfuck"));
    }

    #[test]
    fn custom_adapters_can_be_registered() {
        let mut registry = LanguageRegistry::empty();
        assert!(registry.resolve("python").is_err());
        registry.register(Arc::new(PythonAdapter::default()));
        assert!(registry.resolve("python").is_ok());
    }
}
