//! Common types and constants shared across the crate.

mod constants;
mod value;

pub use constants::*;
pub use value::*;

use parking_lot::RwLock;
use std::sync::Arc;

/// A value protected by a read-write lock behind shared ownership.
pub type Atomic<T> = Arc<RwLock<T>>;

/// Wraps a value into an [Atomic] reference.
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}
