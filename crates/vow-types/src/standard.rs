//! A default, shape-based registry.

use dashmap::DashMap;
use vow_core::{ClassHandle, Value};

use crate::builtin::BuiltinKind;
use crate::cast::{ResolvedType, TypeRegistry};
use crate::error::TypeError;

/// Registry over registered classes with shape-based builtin matching.
///
/// Builtin names match by value shape. Nominal names match instances whose
/// class lineage reaches the named class, preferring the handle pinned at
/// build time over a name lookup.
#[derive(Default)]
pub struct StandardRegistry {
    classes: DashMap<String, ClassHandle>,
}

impl StandardRegistry {
    /// An empty registry.
    pub fn new() -> StandardRegistry {
        StandardRegistry::default()
    }

    /// Registers a class under its declared name. Re-registration replaces
    /// the previous handle.
    pub fn register(&self, class: ClassHandle) {
        self.classes.insert(class.name().to_string(), class);
    }

    /// Looks a registered class up by name.
    pub fn get(&self, name: &str) -> Option<ClassHandle> {
        self.classes.get(name).map(|entry| entry.clone())
    }
}

impl TypeRegistry for StandardRegistry {
    fn is_valid_cast(
        &self,
        type_name: &str,
        has_default: bool,
        value: &Value,
        nullable: bool,
        source: Option<&ClassHandle>,
    ) -> bool {
        match value {
            Value::Undefined => return has_default,
            Value::Null => {
                return nullable || BuiltinKind::parse(type_name) == Some(BuiltinKind::Null)
            }
            _ => {}
        }
        if let Some(kind) = BuiltinKind::parse(type_name) {
            return kind.accepts(value);
        }
        let Value::Instance(obj) = value else {
            return false;
        };
        if let Some(class) = source {
            return obj.class().derives_from(class);
        }
        if let Some(class) = self.get(type_name) {
            return obj.class().derives_from(&class);
        }
        obj.class().lineage_has_name(type_name)
    }

    fn resolve_name(
        &self,
        name: &str,
        _owner: Option<&ClassHandle>,
        _is_param: bool,
        path: &str,
    ) -> Result<ResolvedType, TypeError> {
        if let Some(kind) = BuiltinKind::parse(name) {
            return Ok(ResolvedType {
                name: kind.name().to_string(),
                is_builtin: true,
                source: None,
            });
        }
        match self.get(name) {
            Some(class) => Ok(ResolvedType {
                name: name.to_string(),
                is_builtin: false,
                source: Some(class),
            }),
            None => Err(TypeError::UnknownType {
                name: name.to_string(),
                path: path.to_string(),
            }),
        }
    }
}
