//! Type resolution errors.

use thiserror::Error;

/// An error raised while resolving a type expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A name that neither the builtin table nor the registry knows.
    #[error("unknown type `{name}` in {path}")]
    UnknownType {
        /// The unresolvable name.
        name: String,
        /// Declaration site.
        path: String,
    },

    /// A type expression with no members, such as `"|"` or an empty string.
    #[error("empty type expression in {path}")]
    EmptyExpression {
        /// Declaration site.
        path: String,
    },
}
