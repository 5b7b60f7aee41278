//! Contract violation errors.
//!
//! Two families share this type. Extraction errors are raised while walking
//! a class and building descriptors; call-time errors are raised when real
//! arguments or return values break a built contract. Both carry the source
//! name and member context so a message stands on its own.

use thiserror::Error;
use vow_parser::ExtractError;

/// A violation detected during descriptor extraction or call validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckError {
    /// A property was declared abstract. Only callables can be abstract.
    #[error("{source}.{member} is a property and cannot be abstract")]
    AbstractProperty {
        /// Class name.
        r#source: String,
        /// Declared member name.
        member: String,
    },

    /// An abstract member has a non-empty body.
    #[error("abstract member {source}.{member} must have an empty body")]
    AbstractWithBody {
        /// Class name.
        r#source: String,
        /// Declared member name.
        member: String,
    },

    /// An abstract declaration and a concrete declaration share one name.
    #[error("{source}.{member} is declared both abstract and concrete")]
    AbstractCollision {
        /// Class name.
        r#source: String,
        /// Colliding member name.
        member: String,
    },

    /// Two abstract declarations resolve to the same name.
    #[error("{source}.{member} is declared abstract twice")]
    AbstractAbstractCollision {
        /// Class name.
        r#source: String,
        /// Colliding member name.
        member: String,
    },

    /// The same concrete member is declared more than once.
    #[error("{source}.{member} is declared more than once")]
    DuplicateMember {
        /// Class name.
        r#source: String,
        /// Colliding member name.
        member: String,
    },

    /// A magic name is bound to something other than a method.
    #[error("magic member {source}.{member} must be a method")]
    MagicNotMethod {
        /// Class name.
        r#source: String,
        /// Magic member name.
        member: String,
    },

    /// A magic method declares the wrong number of parameters.
    #[error("magic member {source}.{member} must take exactly {expected} arguments, found {found}")]
    MagicArity {
        /// Class name.
        r#source: String,
        /// Magic member name.
        member: String,
        /// Required parameter count.
        expected: usize,
        /// Declared parameter count, noting a variadic tail when present.
        found: String,
    },

    /// Abstract map entries that never matched a declared member.
    #[error("{source} never declares the abstract members: {}", .names.join(", "))]
    MissingAbstract {
        /// Class name.
        r#source: String,
        /// Unmatched `raw -> public` pairs, sorted.
        names: Vec<String>,
    },

    /// Definition entries that no declared position consumed.
    #[error("{path} has unused definitions: {}", .keys.join(", "))]
    UnusedDefinitions {
        /// The class or `Class.member` site the leftovers belong to.
        path: String,
        /// Unconsumed keys, sorted.
        keys: Vec<String>,
    },

    /// A declaration failed to parse or type-resolve.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A required argument was not supplied.
    #[error("{source}.{function} is missing required argument {position}")]
    MissingParameter {
        /// Class name.
        r#source: String,
        /// Member name.
        function: String,
        /// 1-based position.
        position: usize,
    },

    /// A required property is absent from a destructured argument.
    #[error("{source}.{function} is missing required property '{name}' at position {position}")]
    MissingProperty {
        /// Class name.
        r#source: String,
        /// Member name.
        function: String,
        /// Dotted 1-based position of the missing field.
        position: String,
        /// Field name inside the destructured argument.
        name: String,
    },

    /// An argument value does not satisfy its declared type.
    #[error("{source}.{function} argument {position} expects {expected}, got {given}")]
    NotValidParameter {
        /// Class name.
        r#source: String,
        /// Member name.
        function: String,
        /// Dotted 1-based position.
        position: String,
        /// Declared type expression.
        expected: String,
        /// Runtime kind of the offending value.
        given: String,
    },

    /// A destructured property value does not satisfy its declared type.
    #[error("{source}.{function} property '{name}' at position {position} expects {expected}, got {given}")]
    NotValidProperty {
        /// Class name.
        r#source: String,
        /// Member name.
        function: String,
        /// Dotted 1-based position of the enclosing pattern.
        position: String,
        /// Field name inside the destructured argument.
        name: String,
        /// Declared type expression.
        expected: String,
        /// Runtime kind of the offending value.
        given: String,
    },

    /// A return value does not satisfy the declared return type.
    #[error("{source}.{function} must return {expected}, got {given}")]
    NotValidReturn {
        /// Class name.
        r#source: String,
        /// Member name.
        function: String,
        /// Declared type expression.
        expected: String,
        /// Runtime kind of the offending value.
        given: String,
    },

    /// An iterable-marked position received a value that cannot iterate.
    #[error("{source}.{function} expects an iterable at position {position}, got {given}")]
    NotIterable {
        /// Class name.
        r#source: String,
        /// Member name.
        function: String,
        /// Dotted 1-based position, or `return`.
        position: String,
        /// Runtime kind of the offending value.
        given: String,
    },
}
