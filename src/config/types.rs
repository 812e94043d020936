/// Core types and structures for the codebox system
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One code submission to execute.
///
/// Deserializes directly from the web collaborator's request body.
/// `user_id`/`task_id` are opaque correlation identifiers the caller uses
/// to key submission records; they are accepted and otherwise ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// Raw source text, non-empty
    pub code: String,
    /// Language identifier (e.g. "java", "python"; aliases are normalized)
    pub language: String,
    /// Optional source file name hint, used by interpreted languages
    #[serde(default)]
    pub entry_file_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub task_id: Option<i64>,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            entry_file_name: None,
            user_id: None,
            task_id: None,
        }
    }

    pub fn with_entry_file_name(mut self, name: impl Into<String>) -> Self {
        self.entry_file_name = Some(name.into());
        self
    }
}

/// Final result of one execution request.
///
/// Serializes to the shape the web collaborator consumes
/// (`executionTime` on the wire). Failure kinds are distinguished by
/// diagnostic text in `errors`, not a separate channel.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Whether the submission compiled (if applicable) and ran to a zero exit
    pub success: bool,
    /// Captured standard output, possibly empty
    pub output: String,
    /// Ordered diagnostics: compile errors, stderr, or synthesized messages
    pub errors: Vec<String>,
    /// Wall-clock milliseconds from request acceptance to final result
    pub execution_time: u64,
}

impl ExecutionResult {
    /// Failed result carrying only diagnostics.
    pub fn failure(errors: Vec<String>, execution_time: u64) -> Self {
        Self {
            success: false,
            output: String::new(),
            errors,
            execution_time,
        }
    }
}

/// Custom error types for codebox
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Result type alias for codebox operations
pub type Result<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_with_camel_case_time_field() {
        let result = ExecutionResult {
            success: true,
            output: "hi\n".to_string(),
            errors: Vec::new(),
            execution_time: 42,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"executionTime\":42"), "got: {json}");
        assert!(json.contains("\"success\":true"));
    }

    #[test]
    fn request_accepts_opaque_caller_ids() {
        let json = r#"{"code":"print(1)","language":"python","userId":7,"taskId":12}"#;
        let request: ExecutionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.language, "python");
        assert_eq!(request.user_id, Some(7));
        assert_eq!(request.task_id, Some(12));
        assert!(request.entry_file_name.is_none());
    }

    #[test]
    fn unsupported_language_error_names_the_language() {
        let err = SandboxError::UnsupportedLanguage("cobol".to_string());
        assert_eq!(err.to_string(), "Unsupported language: cobol");
    }
}
