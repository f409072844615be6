//! # tasklint-core
//!
//! Core validation engine for CI task catalogs.
//!
//! Validates:
//! - Task and ClusterTask resources (`tekton.dev/v1`, `tekton.dev/v1beta1`)
//! - Step container image references
//! - Secret handling in step environments
//! - Parameter interpolation inside step scripts
//! - Step scripts, by delegating to external linters picked from the shebang

pub mod config;
pub mod diagnostics;
pub mod image_ref;
pub mod linters;
pub mod parsers;
pub mod rules;
pub mod schemas;

pub(crate) mod regex_util;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

pub use config::LintConfig;
pub use diagnostics::{Diagnostic, DiagnosticLevel, LintError, LintResult, ValidationResult};
pub use parsers::Resource;
pub use rules::{script::ScriptLinter, task::TaskValidator, Validator};

/// Resource kind used for validator dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Task,
    ClusterTask,
    /// Any other kind, normalized to lowercase
    Unrecognized(String),
}

impl ResourceKind {
    /// Kinds are compared case-insensitively
    pub fn parse(kind: &str) -> Self {
        let kind = kind.to_ascii_lowercase();
        match kind.as_str() {
            "task" => ResourceKind::Task,
            "clustertask" => ResourceKind::ClusterTask,
            _ => ResourceKind::Unrecognized(kind),
        }
    }

    pub fn is_task_like(&self) -> bool {
        matches!(self, ResourceKind::Task | ResourceKind::ClusterTask)
    }
}

/// Get validators for a resource kind
fn get_validators_for_kind(kind: &ResourceKind, config: &LintConfig) -> Vec<Box<dyn Validator>> {
    match kind {
        ResourceKind::Task | ResourceKind::ClusterTask => {
            vec![Box::new(TaskValidator::from_config(config))]
        }
        ResourceKind::Unrecognized(_) => vec![],
    }
}

/// Validate one decoded resource. Unrecognized kinds pass with no findings.
pub fn validate_resource(resource: &Resource, config: &LintConfig) -> ValidationResult {
    let kind = resource.resource_kind();
    tracing::debug!(kind = %resource.kind, name = %resource.name, "validating resource");

    let mut result = ValidationResult::new();
    for validator in get_validators_for_kind(&kind, config) {
        result.append(validator.validate(resource, config));
    }

    result.retain(|d| config.is_rule_enabled(&d.rule));
    result
}

/// Findings for one resource of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub file: PathBuf,
    pub kind: String,
    pub name: String,
    pub result: ValidationResult,
}

/// Validate every document of a single YAML (or JSON) file
pub fn validate_file(path: &Path, config: &LintConfig) -> LintResult<Vec<ResourceReport>> {
    let content = std::fs::read_to_string(path).map_err(|e| LintError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reports = parsers::parse_resources(&content)?
        .into_iter()
        .enumerate()
        .map(|(index, parsed)| match parsed {
            Ok(resource) => ResourceReport {
                file: path.to_path_buf(),
                result: validate_resource(&resource, config),
                kind: resource.kind,
                name: resource.name,
            },
            Err(e) => undecodable_document(path, index, &e, config),
        })
        .collect();

    Ok(reports)
}

/// Report for a document whose type header could not be read
fn undecodable_document(
    path: &Path,
    index: usize,
    error: &LintError,
    config: &LintConfig,
) -> ResourceReport {
    let mut result = ValidationResult::new();
    result.error(
        tasklint_rules::RESOURCE_DECODE,
        format!("Failed to decode document {} - {}", index + 1, error),
    );
    result.retain(|d| config.is_rule_enabled(&d.rule));

    ResourceReport {
        file: path.to_path_buf(),
        kind: String::new(),
        name: String::new(),
        result,
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Main entry point for validating a catalog directory (or a single file)
pub fn validate_catalog(root: &Path, config: &LintConfig) -> LintResult<Vec<ResourceReport>> {
    use ignore::WalkBuilder;

    let exclude_patterns = config
        .exclude
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|source| LintError::InvalidExclude {
                pattern: p.clone(),
                source,
            })
        })
        .collect::<LintResult<Vec<_>>>()?;

    // Sequential walk, parallel validation
    let paths: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(true)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file() && is_yaml(entry.path()))
        .filter(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let relative = relative.to_string_lossy();
            !exclude_patterns.iter().any(|p| p.matches(&relative))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();

    tracing::debug!(root = %root.display(), files = paths.len(), "validating catalog");

    let mut reports: Vec<ResourceReport> = paths
        .par_iter()
        .flat_map(|file| match validate_file(file, config) {
            Ok(reports) => reports,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping unreadable file");
                let mut result = ValidationResult::new();
                result.error(
                    tasklint_rules::RESOURCE_READ,
                    format!("Failed to validate file: {}", e),
                );
                vec![ResourceReport {
                    file: file.clone(),
                    kind: String::new(),
                    name: String::new(),
                    result,
                }]
            }
        })
        .collect();

    // Stable: documents of one file keep their order
    reports.sort_by(|a, b| a.file.cmp(&b.file));

    Ok(reports)
}
