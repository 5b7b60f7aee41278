//! Builtin type kinds and their value-shape checks.

use std::fmt;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use vow_core::Value;

/// A builtin type kind of the guarded language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    /// Anything except null and undefined.
    Mixed,
    /// Strings.
    String,
    /// Integers only.
    Integer,
    /// Floats; integers widen into this kind.
    Float,
    /// Integers and floats.
    Number,
    /// Booleans.
    Boolean,
    /// Arrays.
    Array,
    /// Dictionaries and instances; anything destructurable by name.
    Dictionary,
    /// Function values.
    Function,
    /// Class values.
    Class,
    /// The null type itself.
    Null,
}

static ALIASES: Lazy<FxHashMap<&'static str, BuiltinKind>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    map.insert("mixed", BuiltinKind::Mixed);
    map.insert("any", BuiltinKind::Mixed);
    map.insert("string", BuiltinKind::String);
    map.insert("integer", BuiltinKind::Integer);
    map.insert("int", BuiltinKind::Integer);
    map.insert("float", BuiltinKind::Float);
    map.insert("number", BuiltinKind::Number);
    map.insert("boolean", BuiltinKind::Boolean);
    map.insert("bool", BuiltinKind::Boolean);
    map.insert("array", BuiltinKind::Array);
    map.insert("dictionary", BuiltinKind::Dictionary);
    map.insert("object", BuiltinKind::Dictionary);
    map.insert("function", BuiltinKind::Function);
    map.insert("class", BuiltinKind::Class);
    map.insert("null", BuiltinKind::Null);
    map
});

impl BuiltinKind {
    /// Looks a kind up by canonical name or alias.
    pub fn parse(name: &str) -> Option<BuiltinKind> {
        ALIASES.get(name).copied()
    }

    /// The canonical name used in error messages and registry calls.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinKind::Mixed => "mixed",
            BuiltinKind::String => "string",
            BuiltinKind::Integer => "integer",
            BuiltinKind::Float => "float",
            BuiltinKind::Number => "number",
            BuiltinKind::Boolean => "boolean",
            BuiltinKind::Array => "array",
            BuiltinKind::Dictionary => "dictionary",
            BuiltinKind::Function => "function",
            BuiltinKind::Class => "class",
            BuiltinKind::Null => "null",
        }
    }

    /// Shape check for non-nullish values. Null and undefined handling is
    /// the registry's concern.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            BuiltinKind::Mixed => !value.is_nullish(),
            BuiltinKind::String => matches!(value, Value::Str(_)),
            BuiltinKind::Integer => matches!(value, Value::Int(_)),
            BuiltinKind::Float => matches!(value, Value::Float(_) | Value::Int(_)),
            BuiltinKind::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            BuiltinKind::Boolean => matches!(value, Value::Bool(_)),
            BuiltinKind::Array => matches!(value, Value::Array(_)),
            BuiltinKind::Dictionary => value.is_dict_like(),
            BuiltinKind::Function => matches!(value, Value::Function(_)),
            BuiltinKind::Class => matches!(value, Value::Class(_)),
            BuiltinKind::Null => value.is_null(),
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vow_core::{ClassBuilder, InstanceValue};

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(BuiltinKind::parse("int"), Some(BuiltinKind::Integer));
        assert_eq!(BuiltinKind::parse("object"), Some(BuiltinKind::Dictionary));
        assert_eq!(BuiltinKind::parse("any"), Some(BuiltinKind::Mixed));
        assert_eq!(BuiltinKind::parse("Account"), None);
    }

    #[test]
    fn test_number_admits_both_numeric_shapes() {
        assert!(BuiltinKind::Number.accepts(&Value::Int(1)));
        assert!(BuiltinKind::Number.accepts(&Value::Float(1.5)));
        assert!(BuiltinKind::Integer.accepts(&Value::Int(1)));
        assert!(!BuiltinKind::Integer.accepts(&Value::Float(1.5)));
        assert!(BuiltinKind::Float.accepts(&Value::Int(1)));
    }

    #[test]
    fn test_dictionary_admits_instances() {
        let class = ClassBuilder::new("Box").build();
        let obj = Value::Instance(InstanceValue::new(class));
        assert!(BuiltinKind::Dictionary.accepts(&obj));
        assert!(BuiltinKind::Dictionary.accepts(&Value::dict(vec![])));
        assert!(!BuiltinKind::Dictionary.accepts(&Value::array(vec![])));
    }

    #[test]
    fn test_mixed_rejects_nullish() {
        assert!(BuiltinKind::Mixed.accepts(&Value::Int(0)));
        assert!(!BuiltinKind::Mixed.accepts(&Value::Null));
        assert!(!BuiltinKind::Mixed.accepts(&Value::Undefined));
    }
}
