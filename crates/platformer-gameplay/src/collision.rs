//! Collision descriptors and the outcome of testing an agent against one.
//!
//! A descriptor is one obstacle or hazard rectangle in a level, with flags
//! describing how agents interact with it. Testing an agent against a
//! descriptor produces a [`CollisionOutcome`]; the caller owns the descriptor
//! and writes the destroy request back with
//! [`CollisionDescriptor::apply_outcome`].

use platformer_common::Rect;
use serde::{Deserialize, Serialize};

/// An obstacle or hazard rectangle with interaction flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionDescriptor {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
    /// Agents pass through instead of being pushed out
    #[serde(default)]
    pub passable: bool,
    /// Damage dealt on overlap (0 = harmless)
    #[serde(default)]
    pub damage: i32,
    /// Damage applies to every agent, not only the protagonist
    #[serde(default)]
    pub agent_damage: bool,
    /// Contact destruction is triggered by every agent, not only the protagonist
    #[serde(default)]
    pub agent_contact: bool,
    /// Descriptor should be removed when touched
    #[serde(default)]
    pub contact_destroy: bool,
    /// Set once removal has been requested
    #[serde(default, skip_serializing)]
    destroy: bool,
}

impl CollisionDescriptor {
    /// Creates a solid, harmless obstacle.
    #[must_use]
    pub const fn solid(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            passable: false,
            damage: 0,
            agent_damage: false,
            agent_contact: false,
            contact_destroy: false,
            destroy: false,
        }
    }

    /// Creates a passable region (agents move through it freely).
    #[must_use]
    pub const fn passable(x: i32, y: i32, width: i32, height: i32) -> Self {
        let mut descriptor = Self::solid(x, y, width, height);
        descriptor.passable = true;
        descriptor
    }

    /// Sets the damage dealt on overlap.
    #[must_use]
    pub const fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    /// Lets the damage hit any agent rather than only the protagonist.
    #[must_use]
    pub const fn damaging_agents(mut self) -> Self {
        self.agent_damage = true;
        self
    }

    /// Marks the descriptor for removal on contact.
    #[must_use]
    pub const fn destroyed_on_contact(mut self) -> Self {
        self.contact_destroy = true;
        self
    }

    /// Lets any agent trigger contact destruction.
    #[must_use]
    pub const fn destroyed_by_agents(mut self) -> Self {
        self.agent_contact = true;
        self
    }

    /// Absolute bounds.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether removal has been requested.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroy
    }

    /// Writes the destroy request of an outcome back to this descriptor.
    ///
    /// A previously requested destroy is never cleared by a later outcome.
    pub fn apply_outcome(&mut self, outcome: &CollisionOutcome) {
        if outcome.destroy {
            self.destroy = true;
        }
    }
}

/// Axis along which an overlap was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal
    X,
    /// Vertical
    Y,
}

/// Position correction applied to separate an agent from a solid descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushOut {
    /// Axis of minimum overlap
    pub axis: Axis,
    /// Signed X correction
    pub dx: i32,
    /// Signed Y correction
    pub dy: i32,
}

/// What happened to a damage attempt during a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Damage was applied to health
    Applied(i32),
    /// Damage was absorbed by invulnerability
    Absorbed(i32),
}

/// Result of testing an agent against one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollisionOutcome {
    /// Whether the rectangles overlapped at all
    pub overlapped: bool,
    /// Correction applied to the agent's position, if the descriptor is solid
    pub push_out: Option<PushOut>,
    /// The agent was pushed up out of the descriptor and is now grounded
    pub landed: bool,
    /// Damage attempt, if the descriptor hurt this agent
    pub damage: Option<DamageOutcome>,
    /// The descriptor should be removed by its owner
    pub destroy: bool,
}

impl CollisionOutcome {
    /// Outcome for rectangles that do not overlap.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            overlapped: false,
            push_out: None,
            landed: false,
            damage: None,
            destroy: false,
        }
    }

    /// Whether the outcome changed anything.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        !self.overlapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let spikes = CollisionDescriptor::passable(0, 0, 10, 10)
            .with_damage(3)
            .damaging_agents();
        assert!(spikes.passable);
        assert_eq!(spikes.damage, 3);
        assert!(spikes.agent_damage);
        assert!(!spikes.contact_destroy);

        let coin = CollisionDescriptor::passable(0, 0, 4, 4).destroyed_on_contact();
        assert!(coin.contact_destroy);
        assert!(!coin.agent_contact);
    }

    #[test]
    fn test_apply_outcome_is_sticky() {
        let mut descriptor = CollisionDescriptor::solid(0, 0, 10, 10);
        let destroy = CollisionOutcome {
            overlapped: true,
            destroy: true,
            ..CollisionOutcome::none()
        };

        descriptor.apply_outcome(&CollisionOutcome::none());
        assert!(!descriptor.is_destroyed());

        descriptor.apply_outcome(&destroy);
        assert!(descriptor.is_destroyed());

        descriptor.apply_outcome(&CollisionOutcome::none());
        assert!(descriptor.is_destroyed());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"x":1,"y":2,"width":3,"height":4}"#;
        let descriptor: CollisionDescriptor = serde_json::from_str(json).expect("deserialize");
        assert_eq!(descriptor, CollisionDescriptor::solid(1, 2, 3, 4));
        assert!(!descriptor.is_destroyed());
    }
}
