//! Vow Signature Parser
//!
//! Builds call contracts from declaration text: a noise-aware segmenter,
//! block-comment annotations, the definitions channel, and the parameter
//! model the validator consumes.

#![warn(missing_docs)]

pub mod annotation;
pub mod defaults;
pub mod definitions;
pub mod error;
pub mod lexer;
pub mod markers;
pub mod params;
pub mod segment;
pub mod signature;

pub use annotation::{annotation_after, first_annotation_in};
pub use defaults::eval_literal;
pub use definitions::{DefinitionValue, Definitions, MemberDefs};
pub use error::ExtractError;
pub use markers::{dotted, parse_position_key, parse_type_expr, KeyTarget, ParsedKey};
pub use params::{parse_member, ParseCtx};
pub use segment::{body_is_empty, collapse_ws, segment, strip_comments, Segmented};
pub use signature::{MemberContract, Parameter, ReturnSpec, Signature};
