//! Linter configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::linters::{default_linter_table, LinterRule};

/// Default budget for a single external linter invocation
pub const DEFAULT_LINTER_TIMEOUT_SECS: u64 = 60;

/// Configuration for the linter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Rules to enable/disable
    pub rules: RuleConfig,

    /// Paths to exclude
    pub exclude: Vec<String>,

    /// Seconds a single linter run may take before it is killed (0 = no limit)
    pub linter_timeout_secs: u64,

    /// Interpreter pattern to external linter mapping, evaluated in order
    pub linters: Vec<LinterRule>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            exclude: vec![".git/**".to_string(), "target/**".to_string()],
            linter_timeout_secs: DEFAULT_LINTER_TIMEOUT_SECS,
            linters: default_linter_table(),
        }
    }
}

/// Helper function for serde default
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Enable container image checks (TL-IMG-*)
    #[serde(default = "default_true")]
    pub images: bool,

    /// Enable secret handling checks (TL-SEC-*)
    #[serde(default = "default_true")]
    pub secrets: bool,

    /// Enable param interpolation checks (TL-PRM-*)
    #[serde(default = "default_true")]
    pub params: bool,

    /// Enable embedded script linting (TL-SCR-*)
    #[serde(default = "default_true")]
    pub scripts: bool,

    /// Explicitly disabled rules by ID (e.g., ["TL-IMG-002", "TL-SCR-001"])
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            images: true,
            secrets: true,
            params: true,
            scripts: true,
            disabled_rules: Vec::new(),
        }
    }
}

impl LintConfig {
    /// Load config from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config or use default
    pub fn load_or_default(path: Option<&PathBuf>) -> Self {
        match path {
            Some(p) => Self::load(p).unwrap_or_else(|e| {
                tracing::warn!(path = %p.display(), error = %e, "falling back to default config");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Execution budget for one linter run, `None` when unbounded
    pub fn linter_timeout(&self) -> Option<Duration> {
        match self.linter_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Check if a specific rule is enabled based on config
    ///
    /// A rule is enabled if it's not in the disabled_rules list and its
    /// category is enabled. Resource-level rules cannot be turned off by
    /// category.
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.rules.disabled_rules.iter().any(|r| r == rule_id) {
            return false;
        }

        self.is_category_enabled(rule_id)
    }

    fn is_category_enabled(&self, rule_id: &str) -> bool {
        match tasklint_rules::get_category_for_rule(rule_id) {
            Some("images") => self.rules.images,
            Some("secrets") => self.rules.secrets,
            Some("params") => self.rules.params,
            Some("scripts") => self.rules.scripts,
            // Unknown rules are enabled by default
            _ => true,
        }
    }
}
