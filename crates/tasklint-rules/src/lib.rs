//! Rule catalog for tasklint - CI task definition linter.
//!
//! This crate holds the stable identifiers of every finding the engine can
//! produce, so that the core, the CLI and configuration files agree on them.
//!
//! # Usage
//!
//! ```
//! use tasklint_rules::{get_rule_name, RULES_DATA};
//!
//! // RULES_DATA is a static array of (rule_id, rule_name) tuples
//! for (id, name) in RULES_DATA {
//!     println!("{}: {}", id, name);
//! }
//!
//! assert_eq!(get_rule_name("TL-IMG-006"), Some("image-latest-tag"));
//! ```
//!
//! # Rule Categories
//!
//! - **TL-RES-xxx**: Resource decoding
//! - **TL-IMG-xxx**: Container image references
//! - **TL-SEC-xxx**: Secret handling
//! - **TL-PRM-xxx**: Parameter interpolation
//! - **TL-SCR-xxx**: Embedded script linting

pub const RESOURCE_DECODE: &str = "TL-RES-001";
pub const RESOURCE_READ: &str = "TL-RES-002";

pub const IMAGE_VARIABLE: &str = "TL-IMG-001";
pub const IMAGE_NOT_QUALIFIED: &str = "TL-IMG-002";
pub const IMAGE_INVALID_DIGEST: &str = "TL-IMG-003";
pub const IMAGE_DIGEST_WITHOUT_TAG: &str = "TL-IMG-004";
pub const IMAGE_INVALID_TAG: &str = "TL-IMG-005";
pub const IMAGE_LATEST_TAG: &str = "TL-IMG-006";

pub const SECRET_ENV: &str = "TL-SEC-001";
pub const SECRET_ENV_FROM: &str = "TL-SEC-002";

pub const PARAM_IN_SCRIPT: &str = "TL-PRM-001";

pub const SCRIPT_SHEBANG: &str = "TL-SCR-001";
pub const SCRIPT_INVALID_PATTERN: &str = "TL-SCR-002";
pub const SCRIPT_LINTER_NOT_FOUND: &str = "TL-SCR-003";
pub const SCRIPT_IO: &str = "TL-SCR-004";
pub const SCRIPT_LINTER_FAILED: &str = "TL-SCR-005";
pub const SCRIPT_LINTER_TIMEOUT: &str = "TL-SCR-006";

/// All rules as `(id, name)` tuples, in catalog order.
pub const RULES_DATA: &[(&str, &str)] = &[
    (RESOURCE_DECODE, "resource-decode"),
    (RESOURCE_READ, "resource-read"),
    (IMAGE_VARIABLE, "image-variable"),
    (IMAGE_NOT_QUALIFIED, "image-not-fully-qualified"),
    (IMAGE_INVALID_DIGEST, "image-invalid-digest"),
    (IMAGE_DIGEST_WITHOUT_TAG, "image-digest-without-tag"),
    (IMAGE_INVALID_TAG, "image-invalid-tag"),
    (IMAGE_LATEST_TAG, "image-latest-tag"),
    (SECRET_ENV, "secret-env-var"),
    (SECRET_ENV_FROM, "secret-env-from"),
    (PARAM_IN_SCRIPT, "param-in-script"),
    (SCRIPT_SHEBANG, "script-shebang-env"),
    (SCRIPT_INVALID_PATTERN, "script-invalid-pattern"),
    (SCRIPT_LINTER_NOT_FOUND, "script-linter-not-found"),
    (SCRIPT_IO, "script-io"),
    (SCRIPT_LINTER_FAILED, "script-linter-failed"),
    (SCRIPT_LINTER_TIMEOUT, "script-linter-timeout"),
];

/// Rule id prefixes mapped to the config category that toggles them.
pub const CATEGORY_PREFIXES: &[(&str, &str)] = &[
    ("TL-RES-", "resources"),
    ("TL-IMG-", "images"),
    ("TL-SEC-", "secrets"),
    ("TL-PRM-", "params"),
    ("TL-SCR-", "scripts"),
];

/// Returns the total number of rules.
pub fn rule_count() -> usize {
    RULES_DATA.len()
}

/// Looks up a rule by ID, returning the name if found.
pub fn get_rule_name(id: &str) -> Option<&'static str> {
    RULES_DATA
        .iter()
        .find(|(rule_id, _)| *rule_id == id)
        .map(|(_, name)| *name)
}

/// Returns the config category for a rule ID, if its prefix is known.
///
/// # Example
/// ```
/// use tasklint_rules::get_category_for_rule;
///
/// assert_eq!(get_category_for_rule("TL-SCR-003"), Some("scripts"));
/// assert_eq!(get_category_for_rule("XX-001"), None);
/// ```
pub fn get_category_for_rule(id: &str) -> Option<&'static str> {
    CATEGORY_PREFIXES
        .iter()
        .find(|(prefix, _)| id.starts_with(prefix))
        .map(|(_, category)| *category)
}
