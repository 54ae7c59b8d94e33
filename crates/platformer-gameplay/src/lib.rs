//! # Platformer Gameplay
//!
//! Simulation core of a 2D side-scroller.
//!
//! This crate provides the per-tick behavior of in-level actors:
//! - Entity bodies, facing and sprite mirroring
//! - Hitboxes anchored to their owners
//! - Agents with jumping, gravity and chasing
//! - Axis-aligned collision resolution against level descriptors
//! - Contact damage with a time-based invulnerability cooldown
//! - Levels that run agents and descriptors in a fixed tick order
//! - A message log for damage reports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod clock;
pub mod collision;
pub mod entity;
pub mod environment;
pub mod hitbox;
pub mod level;
pub mod messages;
pub mod movement;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::clock::*;
    pub use crate::collision::*;
    pub use crate::entity::*;
    pub use crate::environment::*;
    pub use crate::hitbox::*;
    pub use crate::level::*;
    pub use crate::messages::*;
    pub use crate::movement::*;
    pub use crate::weapon::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use platformer_common::{Position, Size};

    #[test]
    fn test_hazard_cooldown_through_level() {
        let clock = ManualClock::shared(1_000);
        let mut level = Level::new();
        let hero = Agent::new(Position::new(0, 0), Size::new(32, 32), 5, 10, "hero.png")
            .with_clock(clock.clone())
            .with_grounded(true);
        let id = level.add_agent(hero, Behavior::Idle).expect("add");
        level.set_protagonist(id).expect("protagonist");
        level.add_obstacle(CollisionDescriptor::passable(0, 0, 64, 64).with_damage(2));

        level.tick(MovementSet::new());
        clock.advance(1_000);
        level.tick(MovementSet::new());
        clock.advance(2_000);
        level.tick(MovementSet::new());

        let hero = level.agent(id).expect("hero");
        assert_eq!(hero.health(), 6);
        assert_eq!(hero.last_hit_at(), Some(4_000));
        assert_eq!(level.message_log().len(), 2);
    }

    #[test]
    fn test_movement_tokens_drive_protagonist() {
        let clock = ManualClock::shared(0);
        let mut level = Level::new();
        let hero = Agent::new(Position::new(0, 0), Size::new(16, 16), 3, 1, "hero.png")
            .with_clock(clock)
            .with_grounded(true);
        let id = level.add_agent(hero, Behavior::Idle).expect("add");
        level.set_protagonist(id).expect("protagonist");

        level.tick(MovementSet::from_tokens(["LEFT", "SIDEWAYS"]));

        let hero = level.agent(id).expect("hero");
        assert_eq!(hero.position(), Position::new(-3, 0));
        assert!(hero.is_flipped());
    }
}
