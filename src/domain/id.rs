//! Identifier allocation for plan elements
//!
//! Every element in a generated plan (scenario, resources, tasks) is linked
//! by an opaque string identifier. Identifiers carry no meaning beyond
//! uniqueness:
//!
//! - [`ProcessIds`] renders a process-wide counter as `gen{n}`, so no two
//!   identifiers handed out in the same process are ever equal.
//! - [`SequentialIds`] owns its own counter and is used where deterministic
//!   output matters (tests, golden files).

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out unique identifiers
///
/// Implementations must be safe to share between threads and must never
/// return the same value twice for their lifetime.
pub trait IdAllocator: Send + Sync {
    fn next(&self) -> String;
}

static PROCESS_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Allocator backed by a single process-wide counter
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessIds;

impl ProcessIds {
    pub const PREFIX: &'static str = "gen";

    pub fn new() -> Self {
        Self
    }
}

impl IdAllocator for ProcessIds {
    fn next(&self) -> String {
        let n = PROCESS_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", Self::PREFIX, n)
    }
}

/// Allocator with its own counter, starting at 1
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::with_prefix("id")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Number of identifiers handed out so far
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for SequentialIds {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}
