//! Single-threaded promises with queue-dispatched reactions.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Fault;
use crate::task::QueueRef;
use crate::value::Value;

type OkFn = Box<dyn FnOnce(Value) + Send>;
type ErrFn = Box<dyn FnOnce(Fault) + Send>;

struct Reaction {
    on_ok: OkFn,
    on_err: ErrFn,
}

enum PromiseState {
    Pending(Vec<Reaction>),
    Fulfilled(Value),
    Rejected(Fault),
}

/// A promise bound to the task queue that runs its reactions.
///
/// Settlement is once-only; later calls to [`Promise::resolve`] or
/// [`Promise::reject`] are ignored. Reactions never run inline: they are
/// scheduled on the queue in settlement order, so observable ordering is
/// exactly queue order.
pub struct Promise {
    queue: QueueRef,
    state: Mutex<PromiseState>,
}

/// Shared promise handle.
pub type PromiseRef = Arc<Promise>;

impl Promise {
    /// A pending promise on `queue`.
    pub fn new(queue: QueueRef) -> PromiseRef {
        Arc::new(Promise {
            queue,
            state: Mutex::new(PromiseState::Pending(Vec::new())),
        })
    }

    /// An already-fulfilled promise.
    pub fn fulfilled(queue: QueueRef, value: Value) -> PromiseRef {
        Arc::new(Promise {
            queue,
            state: Mutex::new(PromiseState::Fulfilled(value)),
        })
    }

    /// An already-rejected promise.
    pub fn rejected(queue: QueueRef, fault: Fault) -> PromiseRef {
        Arc::new(Promise {
            queue,
            state: Mutex::new(PromiseState::Rejected(fault)),
        })
    }

    /// The queue reactions are dispatched on.
    pub fn queue(&self) -> &QueueRef {
        &self.queue
    }

    /// Settles the promise with a value.
    pub fn resolve(&self, value: Value) {
        let reactions = {
            let mut state = self.state.lock();
            match &mut *state {
                PromiseState::Pending(reactions) => {
                    let reactions = std::mem::take(reactions);
                    *state = PromiseState::Fulfilled(value.clone());
                    reactions
                }
                _ => return,
            }
        };
        for reaction in reactions {
            let value = value.clone();
            self.queue.schedule(move || (reaction.on_ok)(value));
        }
    }

    /// Settles the promise with a fault.
    pub fn reject(&self, fault: Fault) {
        let reactions = {
            let mut state = self.state.lock();
            match &mut *state {
                PromiseState::Pending(reactions) => {
                    let reactions = std::mem::take(reactions);
                    *state = PromiseState::Rejected(fault.clone());
                    reactions
                }
                _ => return,
            }
        };
        for reaction in reactions {
            let fault = fault.clone();
            self.queue.schedule(move || (reaction.on_err)(fault));
        }
    }

    /// Registers settlement callbacks. Exactly one of the two runs, at most
    /// once, on the queue.
    pub fn then(
        &self,
        on_ok: impl FnOnce(Value) + Send + 'static,
        on_err: impl FnOnce(Fault) + Send + 'static,
    ) {
        let mut state = self.state.lock();
        match &mut *state {
            PromiseState::Pending(reactions) => {
                reactions.push(Reaction {
                    on_ok: Box::new(on_ok),
                    on_err: Box::new(on_err),
                });
            }
            PromiseState::Fulfilled(value) => {
                let value = value.clone();
                self.queue.schedule(move || on_ok(value));
            }
            PromiseState::Rejected(fault) => {
                let fault = fault.clone();
                self.queue.schedule(move || on_err(fault));
            }
        }
    }

    /// The settled outcome, if any.
    pub fn settled(&self) -> Option<Result<Value, Fault>> {
        match &*self.state.lock() {
            PromiseState::Pending(_) => None,
            PromiseState::Fulfilled(value) => Some(Ok(value.clone())),
            PromiseState::Rejected(fault) => Some(Err(fault.clone())),
        }
    }

    /// State label for debugging.
    pub fn state_name(&self) -> &'static str {
        match &*self.state.lock() {
            PromiseState::Pending(_) => "pending",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.state_name())
            .finish()
    }
}
