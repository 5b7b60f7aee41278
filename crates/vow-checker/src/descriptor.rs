//! The descriptor model.
//!
//! A `Descriptor` is the extractor's unit of output: one class member,
//! classified, named, visibility-assigned, with its parameter and return
//! contracts already built. Name-derived rules live here too: reserved
//! keys, magic methods and the underscore visibility convention.

use once_cell::sync::Lazy;
use regex::Regex;
use vow_core::Value;
use vow_parser::{ReturnSpec, Signature};

/// What kind of member a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// A callable method.
    Method,
    /// The `get` half of an accessor.
    Getter,
    /// The `set` half of an accessor.
    Setter,
    /// A plain data property or instance field.
    Property,
}

/// Access level derived from the member's public name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// No underscore prefix.
    Public,
    /// A single leading underscore.
    Protected,
    /// A double leading underscore.
    Private,
}

impl Visibility {
    /// Lowercase keyword form, as used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// One extracted class member.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Member kind.
    pub kind: DescriptorKind,
    /// Public name. Differs from `original_name` for abstract renames.
    pub name: String,
    /// Declaration key as written in the class body.
    pub original_name: String,
    /// Declared on the class rather than the prototype.
    pub is_static: bool,
    /// Declared abstract through the abstract map or `all_abstract`.
    pub is_abstract: bool,
    /// The name is a magic method for its placement.
    pub is_magic: bool,
    /// Derived from the public name.
    pub visibility: Visibility,
    /// Declared value, for properties and fields.
    pub value: Option<Value>,
    /// Parameter contract, for methods and setters.
    pub parameters: Option<Signature>,
    /// Return contract, for methods and getters.
    pub ret: Option<ReturnSpec>,
    /// Name of the class the member was extracted from.
    pub source_name: String,
}

/// Ordered, append-only collection of one extraction pass's descriptors.
#[derive(Debug, Clone, Default)]
pub struct Descriptors {
    items: Vec<Descriptor>,
}

impl Descriptors {
    /// An empty collection.
    pub fn new() -> Descriptors {
        Descriptors::default()
    }

    pub(crate) fn push(&mut self, descriptor: Descriptor) {
        self.items.push(descriptor);
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The descriptor at `index`, in extraction order.
    pub fn get(&self, index: usize) -> Option<&Descriptor> {
        self.items.get(index)
    }

    /// Iterates in extraction order.
    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.items.iter()
    }

    /// The first descriptor matching placement and public name.
    pub fn find(&self, is_static: bool, name: &str) -> Option<&Descriptor> {
        self.items
            .iter()
            .find(|d| d.is_static == is_static && d.name == name)
    }
}

impl<'a> IntoIterator for &'a Descriptors {
    type Item = &'a Descriptor;
    type IntoIter = std::slice::Iter<'a, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Keys the extractor never enumerates.
pub fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "constructor" | "prototype" | "name" | "length" | "caller" | "arguments" | "__proto__"
    )
}

/// Whether `name` is a magic method in the given placement.
pub fn is_magic(is_static: bool, name: &str) -> bool {
    if is_static {
        matches!(name, "__get" | "__set")
    } else {
        matches!(name, "__construct" | "__get" | "__set" | "__has" | "__delete")
    }
}

/// Fixed parameter count for a magic method. `__construct` is magic but
/// takes any number of arguments.
pub fn magic_arity(is_static: bool, name: &str) -> Option<usize> {
    match (is_static, name) {
        (_, "__get") => Some(1),
        (_, "__set") => Some(2),
        (false, "__has") | (false, "__delete") => Some(1),
        _ => None,
    }
}

static PRIVATE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^__[^_]").unwrap());
static PROTECTED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_[^_]").unwrap());

/// Visibility derived from a member's public name. Reserved keys and magic
/// names keep public visibility regardless of their underscores.
pub fn visibility_of(is_static: bool, name: &str) -> Visibility {
    if is_reserved(name) || is_magic(is_static, name) {
        Visibility::Public
    } else if PRIVATE_NAME.is_match(name) {
        Visibility::Private
    } else if PROTECTED_NAME.is_match(name) {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}
