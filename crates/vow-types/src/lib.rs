//! Vow Type System
//!
//! Type expressions, matchers and the registry boundary consulted by
//! contract validation.

#![warn(missing_docs)]

pub mod builtin;
pub mod cast;
pub mod config;
pub mod error;
pub mod matcher;
pub mod standard;

pub use builtin::BuiltinKind;
pub use cast::{cast_accepts, CastInfo, Markers, ResolvedType, TypeRegistry};
pub use config::Config;
pub use error::TypeError;
pub use matcher::TypeMatcher;
pub use standard::StandardRegistry;
