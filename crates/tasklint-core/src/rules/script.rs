//! Embedded script linting
//!
//! The script's shebang picks rules from the linter table; every matching
//! rule's linters run, in table order, each against its own temporary copy of
//! the script. A failure in one invocation is reported and the rest still run.

use std::path::PathBuf;
use std::time::Duration;

use tasklint_rules::{
    RESOURCE_DECODE, SCRIPT_INVALID_PATTERN, SCRIPT_IO, SCRIPT_LINTER_FAILED,
    SCRIPT_LINTER_NOT_FOUND, SCRIPT_LINTER_TIMEOUT, SCRIPT_SHEBANG,
};

use crate::{
    config::LintConfig,
    diagnostics::ValidationResult,
    linters::{
        compile_table,
        exec::{resolve_command, run_linter, LinterOutcome, ScriptFile},
        CompiledRule, LinterInvocation, LinterRule, NormalizedScript,
    },
    parsers::Resource,
    rules::Validator,
};

pub struct ScriptLinter {
    rules: Vec<CompiledRule>,
    timeout: Option<Duration>,
    temp_dir: Option<PathBuf>,
}

impl ScriptLinter {
    pub fn new(table: &[LinterRule]) -> Self {
        Self {
            rules: compile_table(table),
            timeout: None,
            temp_dir: None,
        }
    }

    pub fn from_config(config: &LintConfig) -> Self {
        Self::new(&config.linters).with_timeout(config.linter_timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory for temporary script copies (system temp dir by default)
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Lint one step script. `resource_name` and `step_name` form the label
    /// that replaces the temporary file path in linter output.
    pub fn lint_script(
        &self,
        resource_name: &str,
        step_name: &str,
        script: &str,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        let script = NormalizedScript::new(script);

        if !script.synthesized_shebang && !script.uses_env() {
            result
                .warn(
                    SCRIPT_SHEBANG,
                    format!(
                        "Step {:?} of {:?} is not using #!/usr/bin/env",
                        step_name, resource_name
                    ),
                )
                .suggestion = Some("Use a shebang of the form #!/usr/bin/env <interpreter>".to_string());
        }

        let shebang = script.shebang_line();
        let label = format!("{}-{}", resource_name, step_name);

        for compiled in &self.rules {
            let matcher = match &compiled.matcher {
                Ok(matcher) => matcher,
                Err(e) => {
                    result.error(
                        SCRIPT_INVALID_PATTERN,
                        format!("Invalid regexp: {} ({})", compiled.rule.pattern, e),
                    );
                    continue;
                }
            };

            if !matcher.is_match(&shebang) {
                continue;
            }

            for invocation in &compiled.rule.commands {
                result.append(self.invoke(invocation, &script.text, &label));
            }
        }

        result
    }

    /// One linter run. The temporary script copy lives exactly as long as
    /// this call.
    fn invoke(&self, invocation: &LinterInvocation, text: &str, label: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(program) = resolve_command(&invocation.command) else {
            result
                .error(
                    SCRIPT_LINTER_NOT_FOUND,
                    format!("Couldn't find the linter {} in the path", invocation.command),
                )
                .suggestion = Some(format!("Install {} or adjust the linters table", invocation.command));
            return result;
        };

        let script = match ScriptFile::create(text, self.temp_dir.as_deref()) {
            Ok(script) => script,
            Err(e) => {
                result.error(SCRIPT_IO, e.to_string());
                return result;
            }
        };

        let args = invocation.args.join(" ");
        match run_linter(&program, &invocation.args, &script, self.timeout) {
            Ok(LinterOutcome::Passed) => {}
            Ok(LinterOutcome::Failed { output }) => {
                let output = scrub_script_path(&output, &script, label);
                result.error(
                    SCRIPT_LINTER_FAILED,
                    format!("{}, [{}] failed:\n{}", program.display(), args, output),
                );
            }
            Ok(LinterOutcome::TimedOut { after }) => {
                result.error(
                    SCRIPT_LINTER_TIMEOUT,
                    format!(
                        "{}, [{}] did not finish linting {} within {:?}",
                        program.display(),
                        args,
                        label,
                        after
                    ),
                );
            }
            Err(e) => {
                result.error(SCRIPT_IO, e.to_string());
            }
        }

        result
    }
}

/// Replace the temporary file's path, then its bare stem (how pylint names
/// the module), with the stable label.
fn scrub_script_path(output: &str, script: &ScriptFile, label: &str) -> String {
    let path = script.path();
    let output = output.replace(path.to_string_lossy().as_ref(), label);
    match path.file_stem() {
        Some(stem) => output.replace(stem.to_string_lossy().as_ref(), label),
        None => output,
    }
}

impl Validator for ScriptLinter {
    fn validate(&self, resource: &Resource, _config: &LintConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        let task = match resource.to_type() {
            Ok(task) => task,
            Err(e) => {
                result.error(RESOURCE_DECODE, format!("Failed to decode to a Task - {}", e));
                return result;
            }
        };

        for step in task.steps() {
            if let Some(script) = &step.script {
                result.append(self.lint_script(task.name(), &step.name, script));
            }
        }

        result
    }
}
