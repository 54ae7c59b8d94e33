//! Weapons held by agents.
//!
//! Firing and projectiles live outside the simulation core; an agent only
//! carries the weapon it was handed.

use serde::{Deserialize, Serialize};

/// A weapon an agent can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Display name
    name: String,
}

impl Weapon {
    /// Creates a weapon with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
