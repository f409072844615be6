//! Interpreter to external linter mapping
//!
//! A script's shebang line selects which external tools check it. The table
//! is plain data: it is loaded once per run and shared read-only.

pub mod exec;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shebang used when a script does not declare one
pub const DEFAULT_SHEBANG: &str = "#!/usr/bin/env sh\n";

const ENV_SHEBANG: &str = "#!/usr/bin/env";

/// One external tool invocation: `command args... <script-file>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterInvocation {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl LinterInvocation {
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Interpreter pattern and the linters run for scripts matching it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterRule {
    /// Matched against the shebang line, without the leading `#!`
    pub pattern: String,
    #[serde(default)]
    pub commands: Vec<LinterInvocation>,
}

/// Built-in table. The first entry is the default-shell rule.
pub fn default_linter_table() -> Vec<LinterRule> {
    vec![
        LinterRule {
            pattern: r"(/usr/bin/env |.*/bin/)sh".to_string(),
            commands: vec![
                LinterInvocation::new("shellcheck", &["-s", "sh"]),
                LinterInvocation::new("sh", &["-n"]),
            ],
        },
        LinterRule {
            pattern: r"(/usr/bin/env |.*/bin/)bash".to_string(),
            commands: vec![
                LinterInvocation::new("shellcheck", &["-s", "bash"]),
                LinterInvocation::new("bash", &["-n"]),
            ],
        },
        LinterRule {
            pattern: r"(/usr/bin/env\s|.*/bin/|/usr/libexec/platform-)python(23)?".to_string(),
            // C0103 is the naming convention check, noise for step scripts
            commands: vec![LinterInvocation::new("pylint", &["-dC0103"])],
        },
    ]
}

/// A table entry with its pattern compiled up front.
///
/// A malformed pattern is kept as an error so it can be reported against each
/// script it would have been evaluated for, without stopping the other rules.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: LinterRule,
    pub matcher: Result<Regex, regex::Error>,
}

impl CompiledRule {
    pub fn new(rule: LinterRule) -> Self {
        let matcher = Regex::new(&format!(r"^#!{}\n", rule.pattern));
        Self { rule, matcher }
    }
}

pub fn compile_table(table: &[LinterRule]) -> Vec<CompiledRule> {
    table.iter().cloned().map(CompiledRule::new).collect()
}

/// Script as handed to linters, plus how its shebang was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedScript {
    pub text: String,
    pub synthesized_shebang: bool,
}

impl NormalizedScript {
    /// Prefix the default shebang when the script has none.
    pub fn new(script: &str) -> Self {
        if script.starts_with("#!") {
            Self {
                text: script.to_string(),
                synthesized_shebang: false,
            }
        } else {
            Self {
                text: format!("{}{}", DEFAULT_SHEBANG, script),
                synthesized_shebang: true,
            }
        }
    }

    /// Whether the shebang goes through `/usr/bin/env`
    pub fn uses_env(&self) -> bool {
        self.text.starts_with(ENV_SHEBANG)
    }

    /// First line with its terminating newline, the input for pattern matching.
    pub fn shebang_line(&self) -> String {
        let line = self.text.lines().next().unwrap_or_default();
        format!("{}\n", line)
    }
}
