//! Runtime values the contract layer inspects and wraps.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::class::{Callable, ClassHandle};
use crate::iter::IterRef;
use crate::promise::PromiseRef;

/// Shared mutable array storage.
pub type ArrayRef = Arc<Mutex<Vec<Value>>>;

/// Shared mutable dictionary storage, keyed by property name.
pub type DictRef = Arc<Mutex<FxHashMap<String, Value>>>;

/// A function value: a declared callable behind a shared handle.
pub type FunctionRef = Arc<Callable>;

/// An object instance: its class plus a mutable property table.
#[derive(Debug)]
pub struct InstanceValue {
    class: ClassHandle,
    props: Mutex<FxHashMap<String, Value>>,
}

/// Shared instance handle.
pub type InstanceRef = Arc<InstanceValue>;

impl InstanceValue {
    /// An empty instance of `class`. Field declarations are not applied;
    /// see [`ClassHandle::instantiate`] for that.
    pub fn new(class: ClassHandle) -> InstanceRef {
        Arc::new(InstanceValue {
            class,
            props: Mutex::new(FxHashMap::default()),
        })
    }

    /// The class this instance was created from.
    pub fn class(&self) -> &ClassHandle {
        &self.class
    }

    /// Property read. Missing properties read as undefined.
    pub fn get(&self, name: &str) -> Value {
        self.props
            .lock()
            .get(name)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    /// Whether the property table contains `name`.
    pub fn has(&self, name: &str) -> bool {
        self.props.lock().contains_key(name)
    }

    /// Property write.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.props.lock().insert(name.into(), value);
    }
}

/// A value of the guarded dynamic object model.
///
/// Primitives compare structurally; functions, classes, instances, promises
/// and iterators compare by identity. Arrays and dictionaries are shared
/// mutable containers, so in-place replacement by the validator is visible to
/// every holder of the same handle.
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// A missing argument or property.
    Undefined,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// An immutable string.
    Str(Arc<str>),
    /// A shared mutable array.
    Array(ArrayRef),
    /// A shared mutable dictionary.
    Dict(DictRef),
    /// A function value.
    Function(FunctionRef),
    /// A class value (a constructor).
    Class(ClassHandle),
    /// An instance of a class.
    Instance(InstanceRef),
    /// A promise.
    Promise(PromiseRef),
    /// A pull iterator.
    Iterator(IterRef),
}

impl Value {
    /// Runtime kind description used in contract errors. Instances report
    /// their class name; class values report `class <Name>`.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Bool(_) => "boolean".to_string(),
            Value::Int(_) | Value::Float(_) => "number".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Dict(_) => "dictionary".to_string(),
            Value::Function(_) => "function".to_string(),
            Value::Class(class) => format!("class {}", class.name()),
            Value::Instance(obj) => obj.class().name().to_string(),
            Value::Promise(_) => "promise".to_string(),
            Value::Iterator(_) => "iterator".to_string(),
        }
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether the value is null or undefined.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Whether property access by name is meaningful on this value.
    pub fn is_dict_like(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::Instance(_))
    }

    /// Array storage, when the value is an array.
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Dictionary storage, when the value is a dictionary.
    pub fn as_dict(&self) -> Option<&DictRef> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Function handle, when the value is a function.
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Instance handle, when the value is an instance.
    pub fn as_instance(&self) -> Option<&InstanceRef> {
        match self {
            Value::Instance(obj) => Some(obj),
            _ => None,
        }
    }

    /// Promise handle, when the value is a promise.
    pub fn as_promise(&self) -> Option<&PromiseRef> {
        match self {
            Value::Promise(p) => Some(p),
            _ => None,
        }
    }

    /// Iterator handle, when the value is an iterator.
    pub fn as_iterator(&self) -> Option<&IterRef> {
        match self {
            Value::Iterator(it) => Some(it),
            _ => None,
        }
    }

    /// Property lookup for dict-like values. Missing members and non-dict
    /// receivers read as undefined.
    pub fn get_property(&self, name: &str) -> Value {
        match self {
            Value::Dict(map) => map.lock().get(name).cloned().unwrap_or(Value::Undefined),
            Value::Instance(obj) => obj.get(name),
            _ => Value::Undefined,
        }
    }

    /// Membership test for dict-like values.
    pub fn has_property(&self, name: &str) -> bool {
        match self {
            Value::Dict(map) => map.lock().contains_key(name),
            Value::Instance(obj) => obj.has(name),
            _ => false,
        }
    }

    /// Replaces a property on a dict-like value. No-op elsewhere.
    pub fn set_property(&self, name: &str, value: Value) {
        match self {
            Value::Dict(map) => {
                map.lock().insert(name.to_string(), value);
            }
            Value::Instance(obj) => obj.set(name, value),
            _ => {}
        }
    }

    /// A string value.
    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// An array value over `items`.
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Arc::new(Mutex::new(items)))
    }

    /// A dictionary value over `entries`.
    pub fn dict(entries: impl IntoIterator<Item = (String, Value)>) -> Value {
        Value::Dict(Arc::new(Mutex::new(entries.into_iter().collect())))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b) || *a.lock() == *b.lock(),
            (Value::Dict(a), Value::Dict(b)) => Arc::ptr_eq(a, b) || *a.lock() == *b.lock(),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
            (Value::Promise(a), Value::Promise(b)) => Arc::ptr_eq(a, b),
            (Value::Iterator(a), Value::Iterator(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            other => f.write_str(&other.kind_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::str(s)
    }
}
