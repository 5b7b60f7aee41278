//! Vow Contract Checker
//!
//! Descriptor extraction and call-time contract validation for Vow.
//!
//! This crate provides:
//! - Class member enumeration into typed descriptors
//! - Visibility, magic-method and abstract-member rules
//! - Collision detection across one extraction pass
//! - Argument and return validation against built signatures
//! - Promise and iterable interception with lazy element checks
//! - Diagnostic rendering with stable codes and JSON output
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use vow_checker::{extract_descriptors, AbstractMap, ExtractOptions, Validator};
//! use vow_parser::Definitions;
//! use vow_types::{Config, StandardRegistry};
//!
//! // Describe the typed positions
//! let registry = Arc::new(StandardRegistry::new());
//! let config = Config::default();
//! let mut defs = Definitions::new();
//! defs.insert("save", "1", "string");
//!
//! // Extract descriptors once per class
//! let descriptors = extract_descriptors(
//!     &class,
//!     &ExtractOptions::default(),
//!     &mut defs,
//!     &AbstractMap::default(),
//!     &config,
//!     registry.as_ref(),
//! )?;
//!
//! // Validate each call against the built signature
//! let validator = Validator::new(registry, config);
//! let args = validator.validate_arguments(signature, args)?;
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod diagnostic;
pub mod error;
pub mod extract;
pub mod validate;

pub use descriptor::{
    is_magic, is_reserved, magic_arity, visibility_of, Descriptor, DescriptorKind, Descriptors,
    Visibility,
};
pub use diagnostic::{create_files, error_code, Diagnostic, ErrorCode, JsonDiagnostic, JsonLabel};
pub use error::CheckError;
pub use extract::{extract_descriptors, extract_descriptors_with, AbstractMap, ExtractOptions};
pub use validate::Validator;
