//! Fallible pull iterators.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Fault;
use crate::value::Value;

type NextFn = Box<dyn FnMut() -> Result<Option<Value>, Fault> + Send>;

/// A pull iterator over dynamic values.
///
/// Pulls are fallible so a wrapped iterator can surface a contract fault at
/// exactly the element that violates it, without forcing the sequence.
pub struct IterValue {
    next: Mutex<NextFn>,
}

/// Shared iterator handle.
pub type IterRef = Arc<IterValue>;

impl IterValue {
    /// An iterator driven by `f` until it yields `None`.
    pub fn new(f: impl FnMut() -> Result<Option<Value>, Fault> + Send + 'static) -> IterRef {
        Arc::new(IterValue {
            next: Mutex::new(Box::new(f)),
        })
    }

    /// An iterator over a fixed sequence.
    pub fn from_values(values: Vec<Value>) -> IterRef {
        let mut items = values.into_iter();
        IterValue::new(move || Ok(items.next()))
    }

    /// Pulls the next element.
    pub fn next(&self) -> Result<Option<Value>, Fault> {
        let mut next = self.next.lock();
        (*next)()
    }

    /// A new iterator that passes every element pulled from `iter` through
    /// `f`. Laziness is preserved: nothing is pulled until the consumer
    /// pulls.
    pub fn wrap(
        iter: &IterRef,
        mut f: impl FnMut(Value) -> Result<Value, Fault> + Send + 'static,
    ) -> IterRef {
        let inner = Arc::clone(iter);
        IterValue::new(move || match inner.next()? {
            Some(value) => Ok(Some(f(value)?)),
            None => Ok(None),
        })
    }
}

impl fmt::Debug for IterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IterValue { .. }")
    }
}
