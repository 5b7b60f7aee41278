//! Signature extraction errors.

use thiserror::Error;
use vow_types::TypeError;

/// An error raised while segmenting a declaration or building its
/// parameter model.
///
/// `path` names the declaration site (`Source.member`); `position` is the
/// 1-based, dotted parameter position when one is known.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    /// The declaration has no parameter list at all.
    #[error("no parameter list found in declaration of {path}")]
    MissingParameterList {
        /// Declaration site.
        path: String,
    },

    /// An opening delimiter is never closed.
    #[error("unclosed `{open}` in declaration of {path}")]
    UnclosedDelimiter {
        /// Declaration site.
        path: String,
        /// The delimiter left open.
        open: char,
        /// Byte offset of the opening delimiter.
        at: usize,
    },

    /// A `/*` comment runs past the end of the declaration.
    #[error("unterminated block comment in declaration of {path}")]
    UnterminatedComment {
        /// Declaration site.
        path: String,
        /// Byte offset where the comment opens.
        at: usize,
    },

    /// A string literal runs past the end of the declaration.
    #[error("unterminated string literal in declaration of {path}")]
    UnterminatedString {
        /// Declaration site.
        path: String,
        /// Byte offset where the literal opens.
        at: usize,
    },

    /// Two commas with nothing between them.
    #[error("empty parameter entry in {path}")]
    EmptyParameter {
        /// Declaration site.
        path: String,
    },

    /// A parameter name that is not an identifier.
    #[error("`{text}` is not a valid parameter name in {path}")]
    BadParameterName {
        /// Declaration site.
        path: String,
        /// The offending text.
        text: String,
    },

    /// A type expression the mini-grammar cannot parse.
    #[error("malformed type expression `{text}` in {path}")]
    BadTypeExpression {
        /// Declaration site.
        path: String,
        /// The offending expression.
        text: String,
    },

    /// A definitions position key the mini-grammar cannot parse.
    #[error("malformed position key `{key}` in definitions for `{member_key}`")]
    BadPositionKey {
        /// The member whose definitions carry the key.
        member_key: String,
        /// The offending key.
        key: String,
    },

    /// A variadic parameter combined with a destructuring pattern.
    #[error("variadic parameter {position} of {path} cannot be destructured")]
    DestructuredVariadic {
        /// Declaration site.
        path: String,
        /// Parameter position.
        position: String,
    },

    /// A destructured parameter typed with a custom type while its fields
    /// carry their own types.
    #[error(
        "destructured parameter {position} of {path} is typed `{type_expr}` \
         and also carries nested types"
    )]
    AmbiguousDestructuredTyping {
        /// Declaration site.
        path: String,
        /// Parameter position.
        position: String,
        /// The custom type on the pattern itself.
        type_expr: String,
    },

    /// A rest element inside a pattern carrying its own type.
    #[error("rest property {position} of {path} cannot carry its own type")]
    VariadicPropertyDefinition {
        /// Declaration site.
        path: String,
        /// Parameter position.
        position: String,
    },

    /// A declared default that the literal evaluator cannot handle.
    #[error("default of parameter {position} of {path} is not a checkable literal: {reason}")]
    DefaultEval {
        /// Declaration site.
        path: String,
        /// Parameter position.
        position: String,
        /// What the evaluator objected to.
        reason: String,
    },

    /// A declared default that violates the declared type.
    #[error("default of parameter {position} of {path} is {given}, expected {expected}")]
    DefaultMismatch {
        /// Declaration site.
        path: String,
        /// Parameter position.
        position: String,
        /// The declared type expression.
        expected: String,
        /// Runtime kind of the default value.
        given: String,
    },

    /// A type name that failed to resolve.
    #[error(transparent)]
    Type(#[from] TypeError),
}
