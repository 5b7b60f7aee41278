//! Vow Core Runtime Model
//!
//! Dynamic values, class declarations, promises and iterators shared by the
//! vow contract layer.

#![warn(missing_docs)]

pub mod class;
pub mod error;
pub mod iter;
pub mod promise;
pub mod task;
pub mod value;

pub use class::{
    Callable, ClassBuilder, ClassDef, ClassHandle, FieldDecl, Lineage, MemberDecl, MemberKind,
    NativeFn,
};
pub use error::{fault, Fault, Thrown};
pub use iter::{IterRef, IterValue};
pub use promise::{Promise, PromiseRef};
pub use task::{QueueRef, TaskQueue};
pub use value::{ArrayRef, DictRef, FunctionRef, InstanceRef, InstanceValue, Value};
