//! Script instance ID allocation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{self, AtomicU32};

/// Identifier of one running script instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Thread-safe instance ID generator
///
/// IDs are never handed out twice. Host wake-ups are keyed by ID, so a
/// stale wake-up for a destroyed instance must not reach its successor.
pub struct IdGenerator {
    next_id: AtomicU32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(0),
        }
    }

    /// Get the next available ID
    pub fn get_available_id(&self) -> InstanceId {
        InstanceId(self.next_id.fetch_add(1, atomic::Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
