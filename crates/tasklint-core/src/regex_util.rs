//! Fixed rule patterns, compiled once per process.
//!
//! Patterns written into the rules live here behind accessor functions.
//! Interpreter patterns from the linter table are user input and go through
//! `Regex::new` in `linters` instead, where a bad one becomes a finding.

/// `static_regex!(fn name, r"...")` expands to `fn name() -> &'static Regex`.
///
/// The caller needs `regex::Regex` in scope. A malformed literal is a bug in
/// this crate and panics with the pattern text on first use.
macro_rules! static_regex {
    (fn $fname:ident, $pattern:expr) => {
        fn $fname() -> &'static Regex {
            static CELL: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
            CELL.get_or_init(|| {
                Regex::new($pattern)
                    .unwrap_or_else(|e| panic!("malformed rule pattern {:?}: {}", $pattern, e))
            })
        }
    };
}
pub(crate) use static_regex;
