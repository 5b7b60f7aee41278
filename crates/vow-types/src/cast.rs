//! The cast model and the registry boundary.
//!
//! `CastInfo` is what a typed position compiles down to: the resolved
//! matcher plus the wrapper markers that tell the validator how to reach the
//! value (directly, through a promise, through an iterable). The
//! `TypeRegistry` trait is the seam hosts plug their own type universe into;
//! everything above it only ever asks about one type name and one value.

use vow_core::{ClassHandle, Value};

use crate::builtin::BuiltinKind;
use crate::error::TypeError;
use crate::matcher::TypeMatcher;

/// Wrapper markers attached to a type expression or a position key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Markers {
    /// The value position itself may be null.
    pub is_nullable: bool,
    /// The value is a promise; validate its resolution.
    pub check_promise: bool,
    /// The promise resolution may be null.
    pub is_nullable_promise: bool,
    /// The value is iterable; validate its elements.
    pub check_iterable: bool,
    /// Iterable elements may be null.
    pub is_nullable_iterable: bool,
}

impl Markers {
    /// Union of two marker sets. Markers may be spelled on the position key,
    /// on the value expression, or both.
    pub fn merge(self, other: Markers) -> Markers {
        Markers {
            is_nullable: self.is_nullable || other.is_nullable,
            check_promise: self.check_promise || other.check_promise,
            is_nullable_promise: self.is_nullable_promise || other.is_nullable_promise,
            check_iterable: self.check_iterable || other.check_iterable,
            is_nullable_iterable: self.is_nullable_iterable || other.is_nullable_iterable,
        }
    }

    /// Whether any marker is set.
    pub fn any(&self) -> bool {
        self.is_nullable
            || self.check_promise
            || self.is_nullable_promise
            || self.check_iterable
            || self.is_nullable_iterable
    }
}

/// One resolved type name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    /// Canonical name.
    pub name: String,
    /// Whether the name denotes a builtin kind.
    pub is_builtin: bool,
    /// Resolved class handle for nominal names.
    pub source: Option<ClassHandle>,
}

/// A fully resolved, validator-ready type for one position.
#[derive(Debug, Clone, PartialEq)]
pub struct CastInfo {
    /// The bare union expression, markers stripped.
    pub type_expr: String,
    /// Resolved matcher.
    pub matcher: TypeMatcher,
    /// Wrapper markers.
    pub markers: Markers,
}

impl CastInfo {
    /// Builds a cast from its resolved parts.
    pub fn new(type_expr: impl Into<String>, matcher: TypeMatcher, markers: Markers) -> CastInfo {
        CastInfo {
            type_expr: type_expr.into(),
            matcher,
            markers,
        }
    }

    /// Whether the whole expression is builtin kinds.
    pub fn is_builtin(&self) -> bool {
        self.matcher.is_builtin()
    }

    /// The resolved class of a single nominal expression.
    pub fn source(&self) -> Option<&ClassHandle> {
        self.matcher.source()
    }
}

/// The host's type universe.
///
/// `is_valid_cast` is consulted once per union member with a single type
/// name; union logic, wrapper unwrapping and recursion all happen in the
/// validation layer. Implementations decide what names mean and how null,
/// undefined and defaults interact with them.
pub trait TypeRegistry: Send + Sync {
    /// Whether `value` satisfies the single type `type_name`.
    ///
    /// `nullable` admits null at this position; `has_default` admits
    /// undefined (the argument was omitted and a declared default fills in).
    /// `source` is the resolved class handle when the name was pinned at
    /// build time.
    fn is_valid_cast(
        &self,
        type_name: &str,
        has_default: bool,
        value: &Value,
        nullable: bool,
        source: Option<&ClassHandle>,
    ) -> bool;

    /// Resolves one type name at signature-build time.
    ///
    /// `owner` is the class whose member is being built, `is_param` tells
    /// parameter positions from return positions, and `path` names the
    /// declaration site for error messages.
    fn resolve_name(
        &self,
        name: &str,
        owner: Option<&ClassHandle>,
        is_param: bool,
        path: &str,
    ) -> Result<ResolvedType, TypeError>;

    /// Resolves a `|`-union expression into a matcher by resolving each
    /// member name.
    fn resolve_expr(
        &self,
        expr: &str,
        owner: Option<&ClassHandle>,
        is_param: bool,
        path: &str,
    ) -> Result<TypeMatcher, TypeError> {
        let mut members = Vec::new();
        for name in expr.split('|') {
            let name = name.trim();
            if name.is_empty() {
                return Err(TypeError::EmptyExpression {
                    path: path.to_string(),
                });
            }
            let resolved = self.resolve_name(name, owner, is_param, path)?;
            if resolved.is_builtin {
                match BuiltinKind::parse(&resolved.name) {
                    Some(kind) => members.push(TypeMatcher::Builtin(kind)),
                    None => {
                        return Err(TypeError::UnknownType {
                            name: resolved.name,
                            path: path.to_string(),
                        })
                    }
                }
            } else {
                members.push(TypeMatcher::Nominal {
                    name: resolved.name,
                    source: resolved.source,
                });
            }
        }
        if members.is_empty() {
            return Err(TypeError::EmptyExpression {
                path: path.to_string(),
            });
        }
        Ok(if members.len() == 1 {
            members.swap_remove(0)
        } else {
            TypeMatcher::Union(members)
        })
    }
}

/// Tries `value` against every member of `matcher` through the registry.
/// A union passes when any member passes.
pub fn cast_accepts(
    registry: &dyn TypeRegistry,
    matcher: &TypeMatcher,
    value: &Value,
    has_default: bool,
    nullable: bool,
) -> bool {
    matcher.members().iter().any(|member| match member {
        TypeMatcher::Builtin(kind) => {
            registry.is_valid_cast(kind.name(), has_default, value, nullable, None)
        }
        TypeMatcher::Nominal { name, source } => {
            registry.is_valid_cast(name, has_default, value, nullable, source.as_ref())
        }
        TypeMatcher::Union(_) => cast_accepts(registry, member, value, has_default, nullable),
    })
}
