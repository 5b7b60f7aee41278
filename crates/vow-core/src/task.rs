//! Cooperative microtask queue.
//!
//! The whole contract layer is single-threaded and cooperative: promise
//! reactions are the only scheduled work, and they run in FIFO order when
//! the host drains the queue.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

type Job = Box<dyn FnOnce() + Send>;

/// FIFO microtask queue.
#[derive(Default)]
pub struct TaskQueue {
    jobs: Mutex<VecDeque<Job>>,
}

/// Shared handle to a task queue.
pub type QueueRef = Arc<TaskQueue>;

impl TaskQueue {
    /// A fresh, empty queue.
    pub fn new() -> QueueRef {
        Arc::new(TaskQueue::default())
    }

    /// Enqueues a job behind every job already scheduled.
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) {
        self.jobs.lock().push_back(Box::new(job));
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Runs jobs in order until the queue is empty, including jobs scheduled
    /// while draining.
    pub fn run_until_idle(&self) {
        loop {
            let job = self.jobs.lock().pop_front();
            match job {
                Some(job) => job(),
                None => break,
            }
        }
    }
}
