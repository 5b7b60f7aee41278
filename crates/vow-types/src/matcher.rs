//! Resolved type matchers.
//!
//! A matcher is the resolved form of a type expression: builtin kinds by
//! enum, user classes by name plus an optional resolved handle, unions as a
//! flat member list. Validation never probes expression strings; it walks
//! this structure and asks the registry about one member at a time.

use std::fmt;

use vow_core::ClassHandle;

use crate::builtin::BuiltinKind;

/// A resolved type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeMatcher {
    /// A builtin kind.
    Builtin(BuiltinKind),
    /// A user-declared class type.
    Nominal {
        /// Declared type name.
        name: String,
        /// Resolved class handle, when the registry could pin one.
        source: Option<ClassHandle>,
    },
    /// A `|`-union of members. Never nested.
    Union(Vec<TypeMatcher>),
}

impl TypeMatcher {
    /// Whether every member is a builtin kind.
    pub fn is_builtin(&self) -> bool {
        match self {
            TypeMatcher::Builtin(_) => true,
            TypeMatcher::Nominal { .. } => false,
            TypeMatcher::Union(members) => members.iter().all(TypeMatcher::is_builtin),
        }
    }

    /// The members to try in order: the union's list, or the matcher itself.
    pub fn members(&self) -> &[TypeMatcher] {
        match self {
            TypeMatcher::Union(members) => members,
            other => std::slice::from_ref(other),
        }
    }

    /// The resolved class handle of a single nominal matcher.
    pub fn source(&self) -> Option<&ClassHandle> {
        match self {
            TypeMatcher::Nominal { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeMatcher::Builtin(kind) => write!(f, "{kind}"),
            TypeMatcher::Nominal { name, .. } => f.write_str(name),
            TypeMatcher::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}
