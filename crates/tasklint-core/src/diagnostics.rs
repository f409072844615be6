//! Diagnostic types and error reporting

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type LintResult<T> = Result<T, LintError>;

/// A single finding produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub rule: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(rule: &str, message: String) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message,
            rule: rule.to_string(),
            suggestion: None,
        }
    }

    pub fn warning(rule: &str, message: String) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message,
            rule: rule.to_string(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

/// Ordered accumulator of findings for one validation pass.
///
/// Merging with [`ValidationResult::append`] keeps the receiver's findings
/// first, followed by the other result's findings in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, rule: &str, message: impl Into<String>) -> &mut Diagnostic {
        self.push(Diagnostic::warning(rule, message.into()))
    }

    pub fn error(&mut self, rule: &str, message: impl Into<String>) -> &mut Diagnostic {
        self.push(Diagnostic::error(rule, message.into()))
    }

    /// Push a finding and hand it back so callers can attach a suggestion.
    pub fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        self.diagnostics.push(diagnostic);
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    pub fn append(&mut self, other: ValidationResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
    }

    /// A result passes when it holds no error-level findings.
    pub fn is_passing(&self) -> bool {
        self.errors().next().is_none()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Diagnostic) -> bool) {
        self.diagnostics.retain(keep);
    }
}

impl From<Vec<Diagnostic>> for ValidationResult {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// Linter errors
#[derive(Error, Debug)]
pub enum LintError {
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML document: {source}")]
    YamlParse {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("document is missing {field}")]
    MissingField { field: &'static str },

    #[error("unsupported apiVersion {api_version:?} for kind {kind:?}")]
    UnsupportedVersion { api_version: String, kind: String },

    #[error("kind {kind:?} is not a task-like resource")]
    NotATask { kind: String },

    #[error("Invalid exclude pattern in config: {pattern}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn result_from(entries: &[(bool, String)]) -> ValidationResult {
        let mut result = ValidationResult::new();
        for (is_error, message) in entries {
            if *is_error {
                result.error("TL-TEST-001", message.clone());
            } else {
                result.warn("TL-TEST-002", message.clone());
            }
        }
        result
    }

    #[test]
    fn test_empty_result_is_passing() {
        let result = ValidationResult::new();
        assert!(result.is_passing());
        assert!(result.is_empty());
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut result = ValidationResult::new();
        result.warn("TL-IMG-002", "consider a fully qualified name");
        assert!(result.is_passing());
        assert_eq!(result.warnings().count(), 1);
    }

    #[test]
    fn test_error_fails() {
        let mut result = ValidationResult::new();
        result.warn("TL-IMG-002", "w");
        result.error("TL-IMG-006", "e");
        assert!(!result.is_passing());
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn test_from_diagnostics_keeps_order() {
        let result = ValidationResult::from(vec![
            Diagnostic::warning("TL-IMG-002", "qualify".to_string()),
            Diagnostic::error("TL-IMG-006", "latest".to_string()),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(result.diagnostics()[1].rule, "TL-IMG-006");
        assert!(!result.is_passing());
    }

    #[test]
    fn test_suggestion_attached_in_place() {
        let mut result = ValidationResult::new();
        result
            .warn("TL-SCR-001", "not using env")
            .suggestion = Some("Use #!/usr/bin/env sh".to_string());
        assert_eq!(
            result.diagnostics()[0].suggestion.as_deref(),
            Some("Use #!/usr/bin/env sh")
        );
    }

    proptest! {
        #[test]
        fn append_keeps_order(
            a in prop::collection::vec((any::<bool>(), "[a-z]{0,8}"), 0..8),
            b in prop::collection::vec((any::<bool>(), "[a-z]{0,8}"), 0..8),
        ) {
            let mut merged = result_from(&a);
            merged.append(result_from(&b));

            let expected: Vec<Diagnostic> = result_from(&a)
                .into_diagnostics()
                .into_iter()
                .chain(result_from(&b).into_diagnostics())
                .collect();
            prop_assert_eq!(merged.into_diagnostics(), expected);
        }

        #[test]
        fn append_is_associative(
            a in prop::collection::vec((any::<bool>(), "[a-z]{0,8}"), 0..6),
            b in prop::collection::vec((any::<bool>(), "[a-z]{0,8}"), 0..6),
            c in prop::collection::vec((any::<bool>(), "[a-z]{0,8}"), 0..6),
        ) {
            let mut left = result_from(&a);
            left.append(result_from(&b));
            left.append(result_from(&c));

            let mut tail = result_from(&b);
            tail.append(result_from(&c));
            let mut right = result_from(&a);
            right.append(tail);

            prop_assert_eq!(left, right);
        }
    }
}
