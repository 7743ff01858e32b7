//! Scoped pool of loop-variable identifiers.
//!
//! The planner takes a name immediately before planning a nested iteration
//! and releases it as soon as that subtree's plan is computed. Released names
//! go to the back of the queue, so a name is never live in two open scopes
//! at once and sibling loops get stable, distinct names.
//!
//! One allocator serves one finder. Plans for different finders never share
//! an allocator.

use std::collections::VecDeque;

use crate::error::{FinderError, FinderResult};

/// Ordered pool of candidate identifiers.
#[derive(Debug, Clone)]
pub struct VariableAllocator {
    pool: VecDeque<String>,
    capacity: usize,
}

impl VariableAllocator {
    /// Create an allocator over `names`, in order.
    ///
    /// Repeated names keep their first position and empty names are skipped,
    /// so every issued identifier is distinct.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool: VecDeque<String> = VecDeque::new();
        for name in names.into_iter().map(Into::into) {
            if !name.is_empty() && !pool.contains(&name) {
                pool.push_back(name);
            }
        }
        let capacity = pool.len();
        VariableAllocator { pool, capacity }
    }

    /// Remove `name` from the pool so it is never handed out.
    ///
    /// Used for identifiers already bound in the generated scope, such as the
    /// finder's parameter.
    pub fn reserve(&mut self, name: &str) {
        let before = self.pool.len();
        self.pool.retain(|candidate| candidate != name);
        self.capacity -= before - self.pool.len();
    }

    /// Take the next free identifier.
    ///
    /// # Errors
    ///
    /// [`FinderError::AllocatorExhausted`] when every identifier is live.
    pub fn take(&mut self) -> FinderResult<String> {
        self.pool
            .pop_front()
            .ok_or(FinderError::AllocatorExhausted {
                capacity: self.capacity,
            })
    }

    /// Return an identifier to the back of the pool.
    ///
    /// Releasing a name that is already free is a no-op.
    pub fn release(&mut self, name: String) {
        if self.pool.contains(&name) {
            tracing::debug!(%name, "variable released while free");
            return;
        }
        self.pool.push_back(name);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of identifiers currently taken.
    pub fn live(&self) -> usize {
        self.capacity - self.pool.len()
    }
}
