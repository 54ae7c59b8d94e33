//! Entity identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next id handed out by [`EntityId::new`]. Zero is never issued.
static NEXT_ENTITY: AtomicU64 = AtomicU64::new(1);

/// Identity of an agent or other level entity.
///
/// "Is this agent the protagonist?" is answered by comparing ids, never
/// references. Ids are unique within a process and grow in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Issues a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuilds an id from its number, e.g. one read back from a message.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
