//! JSON output format support.
//!
//! One entry per finding, flattened across resources, plus summary counts.

use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tasklint_core::{DiagnosticLevel, ResourceReport};

/// Root structure for JSON output.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// Version of tasklint that produced this output.
    pub version: String,
    /// Number of unique files checked.
    pub files_checked: usize,
    /// Number of resources decoded from those files.
    pub resources_checked: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub summary: JsonSummary,
}

/// A single finding in JSON format.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Severity level: error or warning.
    pub level: String,
    /// Rule identifier (e.g., TL-IMG-006).
    pub rule: String,
    /// File path (forward slashes for cross-platform consistency).
    pub file: String,
    /// Resource kind as declared in the document.
    pub kind: String,
    /// Resource `metadata.name`.
    pub resource: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub errors: usize,
    pub warnings: usize,
}

fn level_to_string(level: DiagnosticLevel) -> &'static str {
    match level {
        DiagnosticLevel::Error => "error",
        DiagnosticLevel::Warning => "warning",
    }
}

fn path_to_string(path: &Path, base_path: &Path) -> String {
    path.strip_prefix(base_path)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Convert resource reports to JSON output format.
pub fn reports_to_json(reports: &[ResourceReport], base_path: &Path) -> JsonOutput {
    let mut files: HashSet<&Path> = HashSet::new();
    let mut errors = 0;
    let mut warnings = 0;
    let mut diagnostics = Vec::new();

    for report in reports {
        files.insert(report.file.as_path());
        let file = path_to_string(&report.file, base_path);

        for diag in report.result.diagnostics() {
            match diag.level {
                DiagnosticLevel::Error => errors += 1,
                DiagnosticLevel::Warning => warnings += 1,
            }
            diagnostics.push(JsonDiagnostic {
                level: level_to_string(diag.level).to_string(),
                rule: diag.rule.clone(),
                file: file.clone(),
                kind: report.kind.clone(),
                resource: report.name.clone(),
                message: diag.message.clone(),
                suggestion: diag.suggestion.clone(),
            });
        }
    }

    JsonOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        files_checked: files.len(),
        resources_checked: reports.len(),
        diagnostics,
        summary: JsonSummary { errors, warnings },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tasklint_core::{Diagnostic, ValidationResult};

    fn report(file: &str, name: &str, diagnostics: Vec<Diagnostic>) -> ResourceReport {
        ResourceReport {
            file: PathBuf::from(file),
            kind: "Task".to_string(),
            name: name.to_string(),
            result: ValidationResult::from(diagnostics),
        }
    }

    #[test]
    fn test_empty_reports() {
        let output = reports_to_json(&[], Path::new("."));
        assert_eq!(output.files_checked, 0);
        assert_eq!(output.resources_checked, 0);
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.summary.errors, 0);
        assert_eq!(output.summary.warnings, 0);
    }

    #[test]
    fn test_version_matches_cargo() {
        let output = reports_to_json(&[], Path::new("."));
        assert_eq!(output.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(level_to_string(DiagnosticLevel::Error), "error");
        assert_eq!(level_to_string(DiagnosticLevel::Warning), "warning");
    }

    #[test]
    fn test_counts_and_files() {
        let reports = vec![
            report(
                "catalog/a.yaml",
                "first",
                vec![
                    Diagnostic::error("TL-IMG-006", "latest".to_string()),
                    Diagnostic::warning("TL-IMG-002", "qualify".to_string()),
                ],
            ),
            report("catalog/a.yaml", "second", vec![]),
            report(
                "catalog/b.yaml",
                "third",
                vec![Diagnostic::warning("TL-SEC-001", "secret".to_string())],
            ),
        ];

        let output = reports_to_json(&reports, Path::new("catalog"));

        assert_eq!(output.files_checked, 2);
        assert_eq!(output.resources_checked, 3);
        assert_eq!(output.summary.errors, 1);
        assert_eq!(output.summary.warnings, 2);
        assert_eq!(output.diagnostics[0].file, "a.yaml");
        assert_eq!(output.diagnostics[0].resource, "first");
        assert_eq!(output.diagnostics[2].resource, "third");
    }

    #[test]
    fn test_suggestion_omitted_when_absent() {
        let reports = vec![report(
            "a.yaml",
            "task",
            vec![
                Diagnostic::warning("TL-SCR-001", "env".to_string())
                    .with_suggestion("Use #!/usr/bin/env sh".to_string()),
                Diagnostic::error("TL-IMG-006", "latest".to_string()),
            ],
        )];

        let json = serde_json::to_value(reports_to_json(&reports, Path::new("."))).unwrap();

        assert_eq!(json["diagnostics"][0]["suggestion"], "Use #!/usr/bin/env sh");
        assert!(json["diagnostics"][1].get("suggestion").is_none());
    }
}
