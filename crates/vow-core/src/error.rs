//! The dynamic error channel.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::value::Value;

/// Shared dynamic error. Contract faults, host errors and thrown values all
/// travel through this one channel so promise and iterator plumbing can
/// carry any of them.
pub type Fault = Arc<dyn StdError + Send + Sync>;

/// A dynamic value raised as an error.
#[derive(Debug, Error, Clone)]
#[error("uncaught {0}")]
pub struct Thrown(pub Value);

/// Wraps any error into the dynamic channel.
pub fn fault<E>(err: E) -> Fault
where
    E: StdError + Send + Sync + 'static,
{
    Arc::new(err)
}
