//! Task and ClusterTask step validation

use regex::Regex;
use tasklint_rules::{
    IMAGE_DIGEST_WITHOUT_TAG, IMAGE_INVALID_DIGEST, IMAGE_INVALID_TAG, IMAGE_LATEST_TAG,
    IMAGE_NOT_QUALIFIED, IMAGE_VARIABLE, PARAM_IN_SCRIPT, RESOURCE_DECODE, SECRET_ENV,
    SECRET_ENV_FROM,
};

use crate::{
    config::LintConfig,
    diagnostics::ValidationResult,
    image_ref::{parse_digest, parse_tag, DEFAULT_TAG},
    parsers::Resource,
    regex_util::static_regex,
    rules::{script::ScriptLinter, Validator},
    schemas::Step,
};

static_regex!(fn variable_expression, r"\$\([_a-zA-Z][^()\s]*\)");
static_regex!(
    fn param_expression,
    r#"\$\(params(\.[_a-zA-Z][_a-zA-Z0-9.-]*|\[['"][_a-zA-Z][_a-zA-Z0-9.-]*['"]\])(\[\*\])?\)"#
);

pub struct TaskValidator {
    script_linter: ScriptLinter,
}

impl TaskValidator {
    pub fn new(script_linter: ScriptLinter) -> Self {
        Self { script_linter }
    }

    pub fn from_config(config: &LintConfig) -> Self {
        Self::new(ScriptLinter::from_config(config))
    }

    /// Apply every step rule, in a fixed order, without short-circuiting.
    pub fn validate_step(
        &self,
        resource_name: &str,
        step: &Step,
        config: &LintConfig,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.rules.images {
            result.append(validate_image(&step.name, &step.image));
        }

        if config.rules.secrets {
            result.append(validate_secrets(step));
        }

        if let Some(script) = &step.script {
            if config.rules.params {
                result.append(validate_param_usage(&step.name, script));
            }
            if config.rules.scripts {
                result.append(
                    self.script_linter
                        .lint_script(resource_name, &step.name, script),
                );
            }
        }

        result
    }
}

impl Validator for TaskValidator {
    fn validate(&self, resource: &Resource, config: &LintConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        let task = match resource.to_type() {
            Ok(task) => task,
            Err(e) => {
                result.error(RESOURCE_DECODE, format!("Failed to decode to a Task - {}", e));
                return result;
            }
        };

        for step in task.steps() {
            result.append(self.validate_step(task.name(), &step, config));
        }

        result
    }
}

fn validate_image(step: &str, image: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    // Only known at run time
    if variable_expression().is_match(image) {
        result.warn(
            IMAGE_VARIABLE,
            format!(
                "Step {:?} uses image {:?} that contains variables; skipping validation",
                step, image
            ),
        );
        return result;
    }

    if !image.contains('/') || !has_registry_host(image) {
        result
            .warn(
                IMAGE_NOT_QUALIFIED,
                format!(
                    "Step {:?} uses image {:?}; consider using a fully qualified name - e.g. docker.io/library/ubuntu:1.0",
                    step, image
                ),
            )
            .suggestion = Some("Prefix the image with its registry host".to_string());
    }

    if image.contains("@sha256") {
        match parse_digest(image) {
            Err(e) => {
                result.error(
                    IMAGE_INVALID_DIGEST,
                    format!(
                        "Step {:?} uses image {:?} with an invalid digest. Error: {}",
                        step, image, e
                    ),
                );
            }
            Ok(digest) if !digest.has_specific_tag() => {
                result.warn(
                    IMAGE_DIGEST_WITHOUT_TAG,
                    format!(
                        "Step {:?} uses image {:?}; consider using an image tagged with specific version along with digest eg. abc.io/img:v1@sha256:abcde",
                        step, image
                    ),
                );
            }
            Ok(_) => {}
        }
        return result;
    }

    match parse_tag(image) {
        Err(e) => {
            result.error(
                IMAGE_INVALID_TAG,
                format!(
                    "Step {:?} uses image {:?} with an invalid tag. Error: {}",
                    step, image, e
                ),
            );
        }
        Ok(tag) if tag.identifier().eq_ignore_ascii_case(DEFAULT_TAG) => {
            result.error(
                IMAGE_LATEST_TAG,
                format!(
                    "Step {:?} uses image {:?} which must be tagged with a specific version",
                    step, image
                ),
            );
        }
        Ok(_) => {}
    }

    result
}

/// Leading path segment looks like a DNS host
fn has_registry_host(image: &str) -> bool {
    image
        .split('/')
        .next()
        .is_some_and(|host| host.contains('.'))
}

// CIS Kubernetes benchmark 5.4.1: prefer secrets as files over secrets as
// environment variables.
fn validate_secrets(step: &Step) -> ValidationResult {
    let mut result = ValidationResult::new();

    for env in step.env.iter().filter(|e| e.is_secret_backed()) {
        result.warn(
            SECRET_ENV,
            format!(
                "Step {:?} uses secret to populate env {:?}. Prefer using secrets as files over secrets as environment variables",
                step.name, env.name
            ),
        );
    }

    for _ in step.env_from.iter().filter(|e| e.is_secret_backed()) {
        result.warn(
            SECRET_ENV_FROM,
            format!(
                "Step {:?} uses secret as environment variables. Prefer using secrets as files over secrets as environment variables",
                step.name
            ),
        );
    }

    result
}

fn validate_param_usage(step: &str, script: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Some(expr) = param_expression().find(script) {
        result.warn(
            PARAM_IN_SCRIPT,
            format!(
                "Step {:?} references {:?} directly from its script block. For reliability and security, consider putting the param into an environment variable of the Step and accessing that environment variable in your script instead.",
                step,
                expr.as_str()
            ),
        );
    }

    result
}
