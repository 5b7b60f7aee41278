//! Class declarations and the callable model.
//!
//! A class here is a declaration table, not a live construct: the contract
//! layer walks its member lists and reads each callable's declaration text.
//! The text carries the parameter list, annotations and body exactly as the
//! host declared them, which is the only signature source the extraction
//! machinery consumes.

use std::fmt;
use std::sync::Arc;

use crate::error::Fault;
use crate::value::{InstanceRef, InstanceValue, Value};

/// Native body of a callable.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, Fault> + Send + Sync>;

/// A declared callable: printable declaration text plus an optional body.
#[derive(Clone)]
pub struct Callable {
    text: String,
    body: Option<NativeFn>,
    is_generator: bool,
}

impl Callable {
    /// A callable with a declaration but no runnable body.
    pub fn declared(text: impl Into<String>) -> Self {
        Callable {
            text: text.into(),
            body: None,
            is_generator: false,
        }
    }

    /// A callable backed by a native body.
    pub fn new(
        text: impl Into<String>,
        body: impl Fn(&[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    ) -> Self {
        Callable {
            text: text.into(),
            body: Some(Arc::new(body)),
            is_generator: false,
        }
    }

    /// Marks the callable as a generator function.
    pub fn generator(mut self) -> Self {
        self.is_generator = true;
        self
    }

    /// A copy with the body replaced and the declaration kept.
    pub fn with_body(&self, body: NativeFn) -> Self {
        Callable {
            text: self.text.clone(),
            body: Some(body),
            is_generator: self.is_generator,
        }
    }

    /// The declaration text as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this callable was declared as a generator.
    pub fn is_generator(&self) -> bool {
        self.is_generator
    }

    /// Whether a runnable body is attached.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Runs the body. Bodiless callables evaluate to undefined.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, Fault> {
        match &self.body {
            Some(f) => f(args),
            None => Ok(Value::Undefined),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("text", &self.text)
            .field("is_generator", &self.is_generator)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// One declared member of a class body.
#[derive(Debug, Clone)]
pub struct MemberDecl {
    /// Declaration key as written in the class body.
    pub key: String,
    /// The member's shape.
    pub kind: MemberKind,
}

/// The shape of a declared member.
#[derive(Debug, Clone)]
pub enum MemberKind {
    /// A method.
    Method(Callable),
    /// A getter/setter pair; either side may be absent.
    Accessor {
        /// The `get` side.
        getter: Option<Callable>,
        /// The `set` side.
        setter: Option<Callable>,
    },
    /// A plain data property with its declared value.
    Property(Value),
}

/// An instance field declaration: `key = value` in the class body.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Field name.
    pub key: String,
    /// Declared initial value.
    pub value: Value,
}

/// A class declaration.
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    parent: Option<ClassHandle>,
    statics: Vec<MemberDecl>,
    members: Vec<MemberDecl>,
    fields: Vec<FieldDecl>,
}

/// Shared, identity-compared handle to a class declaration.
#[derive(Debug, Clone)]
pub struct ClassHandle(Arc<ClassDef>);

impl ClassHandle {
    /// The declared class name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The parent class, if any.
    pub fn parent(&self) -> Option<&ClassHandle> {
        self.0.parent.as_ref()
    }

    /// Static member declarations, in declaration order.
    pub fn statics(&self) -> &[MemberDecl] {
        &self.0.statics
    }

    /// Prototype member declarations, in declaration order.
    pub fn members(&self) -> &[MemberDecl] {
        &self.0.members
    }

    /// Instance field declarations, in declaration order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.0.fields
    }

    /// The class and its ancestors, nearest first.
    pub fn lineage(&self) -> Lineage<'_> {
        Lineage { next: Some(self) }
    }

    /// Whether `self` is `other` or derives from it.
    pub fn derives_from(&self, other: &ClassHandle) -> bool {
        self.lineage().any(|class| class == other)
    }

    /// Name-based lineage test, for registries keyed by name.
    pub fn lineage_has_name(&self, name: &str) -> bool {
        self.lineage().any(|class| class.name() == name)
    }

    /// Creates a bare instance with field declarations applied. The
    /// constructor is not run.
    pub fn instantiate(&self) -> InstanceRef {
        let obj = InstanceValue::new(self.clone());
        for class in self.lineage().collect::<Vec<_>>().into_iter().rev() {
            for field in class.fields() {
                obj.set(field.key.clone(), field.value.clone());
            }
        }
        obj
    }
}

impl PartialEq for ClassHandle {
    fn eq(&self, other: &ClassHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ClassHandle {}

/// Iterator over a class and its ancestors.
pub struct Lineage<'a> {
    next: Option<&'a ClassHandle>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a ClassHandle;

    fn next(&mut self) -> Option<&'a ClassHandle> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// Builder for class declarations.
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    parent: Option<ClassHandle>,
    statics: Vec<MemberDecl>,
    members: Vec<MemberDecl>,
    fields: Vec<FieldDecl>,
}

impl ClassBuilder {
    /// Starts a declaration for a class named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            parent: None,
            statics: Vec::new(),
            members: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Sets the parent class.
    pub fn parent(mut self, parent: ClassHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declares a prototype method.
    pub fn method(mut self, key: impl Into<String>, callable: Callable) -> Self {
        self.members.push(MemberDecl {
            key: key.into(),
            kind: MemberKind::Method(callable),
        });
        self
    }

    /// Declares a static method.
    pub fn static_method(mut self, key: impl Into<String>, callable: Callable) -> Self {
        self.statics.push(MemberDecl {
            key: key.into(),
            kind: MemberKind::Method(callable),
        });
        self
    }

    /// Declares a prototype accessor.
    pub fn accessor(
        mut self,
        key: impl Into<String>,
        getter: Option<Callable>,
        setter: Option<Callable>,
    ) -> Self {
        self.members.push(MemberDecl {
            key: key.into(),
            kind: MemberKind::Accessor { getter, setter },
        });
        self
    }

    /// Declares a static accessor.
    pub fn static_accessor(
        mut self,
        key: impl Into<String>,
        getter: Option<Callable>,
        setter: Option<Callable>,
    ) -> Self {
        self.statics.push(MemberDecl {
            key: key.into(),
            kind: MemberKind::Accessor { getter, setter },
        });
        self
    }

    /// Declares a prototype data property.
    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.members.push(MemberDecl {
            key: key.into(),
            kind: MemberKind::Property(value),
        });
        self
    }

    /// Declares a static data property.
    pub fn static_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.statics.push(MemberDecl {
            key: key.into(),
            kind: MemberKind::Property(value),
        });
        self
    }

    /// Declares an instance field.
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.push(FieldDecl {
            key: key.into(),
            value,
        });
        self
    }

    /// Finishes the declaration.
    pub fn build(self) -> ClassHandle {
        ClassHandle(Arc::new(ClassDef {
            name: self.name,
            parent: self.parent,
            statics: self.statics,
            members: self.members,
            fields: self.fields,
        }))
    }
}
