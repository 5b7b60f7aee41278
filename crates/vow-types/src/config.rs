//! Behavior switches.

use serde::Deserialize;

/// Switches for signature extraction and validation.
///
/// Flags are read at each call, never cached at construction, so a host can
/// flip them between calls on a shared instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read block-comment annotations while building signatures.
    pub parse_comments: bool,
    /// Evaluate declared default literals and validate them against the
    /// declared type at build time.
    pub check_defaults: bool,
    /// Enforce magic-member shape and arity rules.
    pub magic_methods: bool,
    /// When a position is typed by both channels, the definition wins.
    /// Otherwise the annotation wins.
    pub prefer_definitions: bool,
    /// Let a variadic destructured parameter build; its per-element
    /// validation is skipped at call time.
    pub allow_variadic_destructuring: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            parse_comments: true,
            check_defaults: false,
            magic_methods: true,
            prefer_definitions: true,
            allow_variadic_destructuring: false,
        }
    }
}
