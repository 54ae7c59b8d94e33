//! Agents: gravity-bound actors with health and a damage cooldown.
//!
//! Each tick an agent is driven in a fixed order:
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────────────┐
//! │ gravity_move │────▶│ gravity_effect │────▶│ check_collision × N │
//! │ (input/chase)│     │ (free fall)    │     │ (push-out, damage)  │
//! └──────────────┘     └────────────────┘     └─────────────────────┘
//! ```
//!
//! Gravity must run before collisions, otherwise landing and push-out lag a
//! frame behind the fall.

use platformer_common::{EntityId, Position, Rect, Size};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::clock::{SharedClock, SystemClock};
use crate::collision::{Axis, CollisionDescriptor, CollisionOutcome, DamageOutcome, PushOut};
use crate::entity::{Body, Damageable, Facing, Movable, Sprite};
use crate::environment::Environment;
use crate::hitbox::Hitbox;
use crate::messages::MessageSink;
use crate::movement::{Movement, MovementSet};
use crate::weapon::Weapon;

/// Initial upward speed of a jump, in pixels per tick.
pub const JUMP_STRENGTH: i32 = 18;

/// Downward acceleration, in pixels per tick squared.
pub const GRAVITY: i32 = 1;

/// How long an agent ignores damage after being hit, in milliseconds.
pub const INVULNERABILITY_COOLDOWN_MS: u64 = 3000;

/// Tunable physics constants of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPhysics {
    /// Initial upward speed of a jump
    pub jump_strength: i32,
    /// Downward acceleration per tick
    pub gravity: i32,
    /// Damage cooldown after an accepted hit
    pub invulnerability_cooldown_ms: u64,
}

impl Default for AgentPhysics {
    fn default() -> Self {
        Self {
            jump_strength: JUMP_STRENGTH,
            gravity: GRAVITY,
            invulnerability_cooldown_ms: INVULNERABILITY_COOLDOWN_MS,
        }
    }
}

/// Derived damage-cooldown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvulnerabilityState {
    /// Hits are applied
    Vulnerable,
    /// Hits are absorbed
    Invulnerable {
        /// Time until hits land again
        remaining_ms: u64,
    },
}

impl InvulnerabilityState {
    /// Whether hits are currently absorbed.
    #[must_use]
    pub const fn is_invulnerable(self) -> bool {
        matches!(self, Self::Invulnerable { .. })
    }
}

/// A controllable or AI-driven actor.
#[derive(Debug, Clone)]
pub struct Agent {
    body: Body,
    physics: AgentPhysics,
    /// Time of the last accepted hit; `None` until first hit
    last_hit_at: Option<u64>,
    /// Cooldown state as of the last damage attempt
    invulnerable: bool,
    weapon: Option<Weapon>,
    grounded: bool,
    /// Reserved; jump gating only looks at `grounded`
    can_jump: bool,
    /// Vertical speed, positive is downward
    velocity_y: i32,
    clock: SharedClock,
}

impl Agent {
    /// Creates a right-facing, airborne agent that reads the system clock.
    #[must_use]
    pub fn new(position: Position, size: Size, speed: i32, health: i32, sprite: impl Into<String>) -> Self {
        Self::from_body(Body::new(position, size, speed, health, sprite))
    }

    /// Creates an agent with an explicit initial facing (`true` = left).
    #[must_use]
    pub fn new_facing(
        position: Position,
        size: Size,
        speed: i32,
        health: i32,
        sprite: impl Into<String>,
        flipped: bool,
    ) -> Self {
        Self::from_body(Body::new(position, size, speed, health, sprite).with_flipped(flipped))
    }

    /// Wraps an existing body.
    #[must_use]
    pub fn from_body(body: Body) -> Self {
        Self {
            body,
            physics: AgentPhysics::default(),
            last_hit_at: None,
            invulnerable: false,
            weapon: None,
            grounded: false,
            can_jump: false,
            velocity_y: 0,
            clock: SystemClock::shared(),
        }
    }

    /// Attaches a hitbox.
    #[must_use]
    pub fn with_hitbox(mut self, hitbox: Hitbox) -> Self {
        self.body.set_hitbox(Some(hitbox));
        self
    }

    /// Replaces the time source used for damage cooldowns.
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Overrides the physics constants.
    #[must_use]
    pub fn with_physics(mut self, physics: AgentPhysics) -> Self {
        self.physics = physics;
        self
    }

    /// Hands the agent a weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Sets the spawn grounding state.
    ///
    /// After spawning, only landing and jumping change it.
    #[must_use]
    pub fn with_grounded(mut self, grounded: bool) -> Self {
        self.grounded = grounded;
        self
    }

    /// Entity ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.body.id()
    }

    /// Shared kinematic state.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Top-left position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.body.position()
    }

    /// Collision bounds (hitbox, or sprite bounds without one).
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    /// Facing left.
    #[must_use]
    pub const fn is_flipped(&self) -> bool {
        self.body.is_flipped()
    }

    /// Sprite reference.
    #[must_use]
    pub const fn sprite(&self) -> &Sprite {
        self.body.sprite()
    }

    /// Physics constants.
    #[must_use]
    pub const fn physics(&self) -> &AgentPhysics {
        &self.physics
    }

    /// Damage cooldown length.
    #[must_use]
    pub const fn invulnerability_cooldown(&self) -> u64 {
        self.physics.invulnerability_cooldown_ms
    }

    /// Time of the last accepted hit.
    #[must_use]
    pub const fn last_hit_at(&self) -> Option<u64> {
        self.last_hit_at
    }

    /// Overrides the time of the last accepted hit (e.g. when restoring a save).
    pub fn set_last_hit_at(&mut self, millis: u64) {
        self.last_hit_at = Some(millis);
    }

    /// Cooldown state as evaluated by the most recent damage attempt.
    #[must_use]
    pub const fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// Cooldown state at `now`.
    #[must_use]
    pub fn invulnerability_state(&self, now: u64) -> InvulnerabilityState {
        let Some(last_hit) = self.last_hit_at else {
            return InvulnerabilityState::Vulnerable;
        };
        let elapsed = now.saturating_sub(last_hit);
        let cooldown = self.physics.invulnerability_cooldown_ms;
        if elapsed >= cooldown {
            InvulnerabilityState::Vulnerable
        } else {
            InvulnerabilityState::Invulnerable {
                remaining_ms: cooldown - elapsed,
            }
        }
    }

    /// Cooldown state according to the agent's clock.
    #[must_use]
    pub fn current_invulnerability(&self) -> InvulnerabilityState {
        self.invulnerability_state(self.clock.now_millis())
    }

    /// Weapon, if any.
    #[must_use]
    pub const fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Replaces the weapon.
    pub fn set_weapon(&mut self, weapon: Option<Weapon>) {
        self.weapon = weapon;
    }

    /// Resting on a surface.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Reserved jump flag.
    #[must_use]
    pub const fn can_jump(&self) -> bool {
        self.can_jump
    }

    /// Sets the reserved jump flag. Jumping does not consult it.
    pub fn set_can_jump(&mut self, can_jump: bool) {
        self.can_jump = can_jump;
    }

    /// Vertical speed, positive is downward.
    #[must_use]
    pub const fn velocity_y(&self) -> i32 {
        self.velocity_y
    }

    /// Overrides the vertical speed (knockback, bounce pads).
    pub fn set_velocity_y(&mut self, velocity_y: i32) {
        self.velocity_y = velocity_y;
    }

    /// Walks and jumps under gravity.
    ///
    /// Unlike [`Movable::move_by`], RIGHT and LEFT are checked independently,
    /// so a set holding both moves the agent by both (net zero for equal
    /// steps) and leaves it facing left. UP jumps only from the ground. DOWN
    /// does nothing here; falling is left to [`Agent::gravity_effect`].
    pub fn gravity_move(&mut self, commands: MovementSet) {
        let speed = self.body.speed();

        if commands.contains(Movement::Right) {
            self.body.turn(Facing::Right);
            self.body.shift(speed, 0);
        }
        if commands.contains(Movement::Left) {
            self.body.turn(Facing::Left);
            self.body.shift(-speed, 0);
        }

        if self.grounded && commands.contains(Movement::Up) {
            self.velocity_y = -self.physics.jump_strength;
            self.grounded = false;
            debug!(agent = %self.id(), velocity_y = self.velocity_y, "jump");
        }

        self.body.update_hitbox_position();
    }

    /// Integrates one tick of free fall. Grounded agents are left untouched.
    ///
    /// Fall speed is not capped; speed and position wrap on `i32` overflow.
    pub fn gravity_effect(&mut self) {
        if self.grounded {
            return;
        }
        self.velocity_y = self.velocity_y.wrapping_add(self.physics.gravity);
        self.body.translate(0, self.velocity_y);
    }

    /// Tests the agent against one descriptor and reacts to any overlap.
    ///
    /// On overlap with a solid descriptor the agent is pushed out along the
    /// axis of least penetration (ties resolve vertically). Being pushed up
    /// lands the agent. Damage and the destroy request apply to the
    /// protagonist always and to other agents only when the descriptor says
    /// so; neither depends on the descriptor being solid.
    ///
    /// The descriptor is not modified; apply the returned outcome with
    /// [`CollisionDescriptor::apply_outcome`].
    pub fn check_collision(
        &mut self,
        descriptor: &CollisionDescriptor,
        environment: &mut dyn Environment,
    ) -> CollisionOutcome {
        let own = self.body.bounds();
        let other = descriptor.bounds();
        if !own.overlaps(&other) {
            return CollisionOutcome::none();
        }

        let mut outcome = CollisionOutcome {
            overlapped: true,
            ..CollisionOutcome::none()
        };

        if !descriptor.passable {
            let push = self.push_out_of(&own, &other);
            outcome.push_out = Some(push);
            outcome.landed = push.axis == Axis::Y && push.dy < 0;
        }

        let is_protagonist = environment.is_protagonist(self.id());

        if descriptor.damage > 0 && (is_protagonist || descriptor.agent_damage) {
            outcome.damage = Some(self.take_damage(descriptor.damage, environment.messages()));
        }

        if descriptor.contact_destroy && (is_protagonist || descriptor.agent_contact) {
            debug!(agent = %self.id(), "contact destroy requested");
            outcome.destroy = true;
        }

        outcome
    }

    /// Moves the agent out of an overlapping solid rectangle.
    fn push_out_of(&mut self, own: &Rect, other: &Rect) -> PushOut {
        let (own_cx, own_cy) = own.center();
        let (other_cx, other_cy) = other.center();
        let dx = own_cx - other_cx;
        let dy = own_cy - other_cy;

        let (own_hw, own_hh) = own.half_extents();
        let (other_hw, other_hh) = other.half_extents();
        let overlap_x = own_hw + other_hw - dx.abs();
        let overlap_y = own_hh + other_hh - dy.abs();

        let fix = overlap_x.min(overlap_y).ceil() as i32;

        let push = if overlap_x < overlap_y {
            let dx = if dx > 0.0 { fix } else { -fix };
            PushOut {
                axis: Axis::X,
                dx,
                dy: 0,
            }
        } else if dy > 0.0 {
            PushOut {
                axis: Axis::Y,
                dx: 0,
                dy: fix,
            }
        } else {
            self.grounded = true;
            self.velocity_y = 0;
            debug!(agent = %self.id(), "landed");
            PushOut {
                axis: Axis::Y,
                dx: 0,
                dy: -fix,
            }
        };

        trace!(agent = %self.id(), ?push, overlap_x, overlap_y, "push out");
        self.body.translate(push.dx, push.dy);
        push
    }
}

impl Movable for Agent {
    fn move_by(&mut self, commands: MovementSet) {
        let speed = self.body.speed();
        match commands.first_by_priority() {
            Some(Movement::Right) => {
                self.body.turn(Facing::Right);
                self.body.translate(speed, 0);
            },
            Some(Movement::Left) => {
                self.body.turn(Facing::Left);
                self.body.translate(-speed, 0);
            },
            Some(Movement::Up) => self.body.translate(0, -speed),
            Some(Movement::Down) => self.body.translate(0, speed),
            None => {},
        }
    }

    fn chase(&mut self, target_x: i32, target_y: i32) {
        let position = self.position();
        if target_x > position.x {
            self.gravity_move(MovementSet::single(Movement::Right));
        } else if target_x < position.x {
            self.gravity_move(MovementSet::single(Movement::Left));
        }
        // Never climbs toward a target above; descending is gravity's job.
        if target_y > position.y {
            self.gravity_move(MovementSet::single(Movement::Down));
        }
    }
}

impl Damageable for Agent {
    fn health(&self) -> i32 {
        self.body.health()
    }

    fn take_damage(&mut self, amount: i32, sink: &mut dyn MessageSink) -> DamageOutcome {
        let now = self.clock.now_millis();
        self.invulnerable = self.invulnerability_state(now).is_invulnerable();

        if self.invulnerable {
            debug!(agent = %self.id(), amount, "hit absorbed");
            return DamageOutcome::Absorbed(amount);
        }

        self.body.apply_damage(amount, sink);
        self.last_hit_at = Some(now);
        debug!(agent = %self.id(), amount, health = self.body.health(), "hit taken");
        DamageOutcome::Applied(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::environment::EnvironmentView;
    use crate::messages::{GameMessage, MessageLog};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn agent_at(x: i32, y: i32) -> Agent {
        Agent::new(Position::new(x, y), Size::new(32, 32), 5, 10, "hero.png")
    }

    fn clocked(clock: &Arc<ManualClock>) -> Agent {
        agent_at(0, 0).with_clock(clock.clone())
    }

    // === Damage and invulnerability ===

    #[test]
    fn test_damage_window_scenario() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock);
        let mut log = MessageLog::new();

        clock.set(100);
        assert_eq!(agent.take_damage(5, &mut log), DamageOutcome::Applied(5));
        assert_eq!(agent.health(), 5);
        assert_eq!(agent.last_hit_at(), Some(100));

        clock.set(1000);
        assert_eq!(agent.take_damage(5, &mut log), DamageOutcome::Absorbed(5));
        assert_eq!(agent.health(), 5);
        assert!(agent.is_invulnerable());
        assert_eq!(log.len(), 1);

        clock.set(3200);
        assert_eq!(agent.take_damage(5, &mut log), DamageOutcome::Applied(5));
        assert_eq!(agent.health(), 0);
        assert!(agent.is_dead());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_cooldown_boundary_is_vulnerable() {
        let clock = ManualClock::shared(10_000);
        let mut agent = clocked(&clock);
        let mut log = MessageLog::new();

        agent.take_damage(1, &mut log);
        clock.advance(INVULNERABILITY_COOLDOWN_MS - 1);
        assert_eq!(agent.take_damage(1, &mut log), DamageOutcome::Absorbed(1));

        clock.advance(1);
        assert_eq!(agent.take_damage(1, &mut log), DamageOutcome::Applied(1));
        assert!(!agent.is_invulnerable());
        assert_eq!(agent.health(), 8);
    }

    #[test]
    fn test_absorbed_hit_does_not_extend_cooldown() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock);
        let mut log = MessageLog::new();

        agent.take_damage(1, &mut log);
        clock.set(2999);
        agent.take_damage(1, &mut log);
        assert_eq!(agent.last_hit_at(), Some(0));

        clock.set(3000);
        assert_eq!(agent.take_damage(1, &mut log), DamageOutcome::Applied(1));
    }

    #[test]
    fn test_damage_message_contents() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock);
        let mut log = MessageLog::new();

        agent.take_damage(4, &mut log);

        assert_eq!(
            log.messages(),
            &[GameMessage::Damage {
                entity_id: agent.id(),
                amount: 4,
                remaining_health: 6,
            }]
        );
    }

    #[test]
    fn test_invulnerability_state_remaining() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock);
        assert_eq!(agent.current_invulnerability(), InvulnerabilityState::Vulnerable);

        agent.take_damage(1, &mut MessageLog::new());
        clock.set(1200);
        assert_eq!(
            agent.current_invulnerability(),
            InvulnerabilityState::Invulnerable { remaining_ms: 1800 }
        );
    }

    #[test]
    fn test_custom_cooldown() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock).with_physics(AgentPhysics {
            invulnerability_cooldown_ms: 500,
            ..AgentPhysics::default()
        });
        let mut log = MessageLog::new();

        agent.take_damage(1, &mut log);
        clock.set(500);
        assert_eq!(agent.take_damage(1, &mut log), DamageOutcome::Applied(1));
    }

    proptest! {
        #[test]
        fn prop_only_hits_after_cooldown_land(gaps in prop::collection::vec(1u64..4000, 1..40)) {
            let clock = ManualClock::shared(1);
            let mut agent = clocked(&clock);
            let mut log = MessageLog::new();

            let mut now = 1u64;
            let mut last_accepted: Option<u64> = None;
            let mut expected_health = agent.health();

            for gap in gaps {
                now += gap;
                clock.set(now);
                let before = log.len();
                let outcome = agent.take_damage(1, &mut log);

                let should_land = last_accepted.map_or(true, |t| now - t >= INVULNERABILITY_COOLDOWN_MS);
                if should_land {
                    last_accepted = Some(now);
                    expected_health -= 1;
                    prop_assert_eq!(outcome, DamageOutcome::Applied(1));
                    prop_assert_eq!(log.len(), before + 1);
                } else {
                    prop_assert_eq!(outcome, DamageOutcome::Absorbed(1));
                    prop_assert_eq!(log.len(), before);
                }
                prop_assert_eq!(agent.health(), expected_health);
            }
        }
    }

    // === Four-way movement ===

    #[test]
    fn test_move_by_priority() {
        let mut agent = agent_at(100, 100);
        agent.move_by(MovementSet::from([Movement::Down, Movement::Up, Movement::Left]));
        assert_eq!(agent.position(), Position::new(95, 100));
        assert!(agent.is_flipped());

        agent.move_by(MovementSet::from([Movement::Down, Movement::Up]));
        assert_eq!(agent.position(), Position::new(95, 95));

        agent.move_by(MovementSet::single(Movement::Down));
        assert_eq!(agent.position(), Position::new(95, 100));

        agent.move_by(MovementSet::from([Movement::Left, Movement::Right]));
        assert_eq!(agent.position(), Position::new(100, 100));
        assert!(!agent.is_flipped());
    }

    #[test]
    fn test_move_by_unknown_tokens_is_noop() {
        let mut agent = agent_at(100, 100);
        agent.move_by(MovementSet::from_tokens(["JUMP", "FIRE"]));
        assert_eq!(agent.position(), Position::new(100, 100));
        assert_eq!(agent.sprite().flips(), 0);
    }

    #[test]
    fn test_move_by_refreshes_hitbox() {
        let mut agent = agent_at(0, 0).with_hitbox(Hitbox::new(2, 2, 10, 10));
        agent.move_by(MovementSet::single(Movement::Right));
        assert_eq!(agent.body().hitbox().map(Hitbox::bounds), Some(Rect::new(7, 2, 10, 10)));
    }

    #[test]
    fn test_facing_flips_sprite_only_on_change() {
        let mut agent = agent_at(0, 0);
        agent.move_by(MovementSet::single(Movement::Left));
        agent.move_by(MovementSet::single(Movement::Left));
        assert_eq!(agent.sprite().flips(), 1);

        agent.gravity_move(MovementSet::single(Movement::Right));
        assert_eq!(agent.sprite().flips(), 2);
        assert!(!agent.is_flipped());
        assert!(!agent.sprite().is_mirrored());
    }

    #[test]
    fn test_initial_facing() {
        let agent = Agent::new_facing(Position::new(0, 0), Size::new(8, 8), 1, 1, "bat.png", true);
        assert!(agent.is_flipped());
        assert!(agent.sprite().is_mirrored());
    }

    // === Gravity ===

    #[test]
    fn test_jump_scenario() {
        let mut agent = agent_at(100, 100).with_grounded(true);

        agent.gravity_move(MovementSet::single(Movement::Up));
        assert_eq!(agent.velocity_y(), -18);
        assert!(!agent.is_grounded());

        agent.gravity_effect();
        assert_eq!(agent.velocity_y(), -17);
        assert_eq!(agent.position().y, 83);
    }

    #[test]
    fn test_no_air_jump() {
        let mut agent = agent_at(100, 100);
        agent.set_velocity_y(4);

        agent.gravity_move(MovementSet::single(Movement::Up));

        assert_eq!(agent.velocity_y(), 4);
        assert!(!agent.is_grounded());
        assert_eq!(agent.position(), Position::new(100, 100));
    }

    #[test]
    fn test_can_jump_is_inert() {
        let mut agent = agent_at(0, 0).with_grounded(true);
        agent.set_can_jump(false);
        agent.gravity_move(MovementSet::single(Movement::Up));
        assert_eq!(agent.velocity_y(), -JUMP_STRENGTH);
    }

    #[test]
    fn test_gravity_move_both_directions_is_additive() {
        let mut agent = agent_at(100, 100);
        agent.gravity_move(MovementSet::from([Movement::Right, Movement::Left]));
        assert_eq!(agent.position(), Position::new(100, 100));
        assert!(agent.is_flipped());
        assert_eq!(agent.sprite().flips(), 1);
    }

    #[test]
    fn test_gravity_move_down_only_refreshes_hitbox() {
        let mut agent = agent_at(10, 10).with_hitbox(Hitbox::new(0, 0, 4, 4));
        agent.gravity_move(MovementSet::single(Movement::Down));
        assert_eq!(agent.position(), Position::new(10, 10));
        assert_eq!(agent.velocity_y(), 0);
    }

    #[test]
    fn test_gravity_effect_grounded_is_noop() {
        let mut agent = agent_at(0, 50).with_grounded(true);
        agent.set_velocity_y(3);
        agent.gravity_effect();
        assert_eq!(agent.position().y, 50);
        assert_eq!(agent.velocity_y(), 3);
    }

    #[test]
    fn test_fall_speed_is_unbounded() {
        let mut agent = agent_at(0, 0);
        for _ in 0..100 {
            agent.gravity_effect();
        }
        assert_eq!(agent.velocity_y(), 100);
        assert_eq!(agent.position().y, (1..=100).sum::<i32>());
    }

    // === Chase ===

    #[test]
    fn test_chase_moves_horizontally_toward_target() {
        let mut agent = agent_at(100, 100);
        agent.chase(200, 100);
        assert_eq!(agent.position(), Position::new(105, 100));

        agent.chase(0, 100);
        assert_eq!(agent.position(), Position::new(100, 100));
        assert!(agent.is_flipped());

        agent.chase(100, 100);
        assert_eq!(agent.position(), Position::new(100, 100));
    }

    #[test]
    fn test_chase_never_climbs() {
        let mut agent = agent_at(100, 100).with_grounded(true);
        agent.chase(100, 0);
        assert_eq!(agent.position(), Position::new(100, 100));
        assert!(agent.is_grounded());
        assert_eq!(agent.velocity_y(), 0);
    }

    #[test]
    fn test_chase_target_below_does_not_accelerate() {
        let mut agent = agent_at(100, 100).with_grounded(true);
        agent.chase(100, 500);
        assert_eq!(agent.position(), Position::new(100, 100));
        assert_eq!(agent.velocity_y(), 0);
    }

    // === Collision ===

    fn env(log: &mut MessageLog, protagonist: Option<EntityId>) -> EnvironmentView<'_> {
        EnvironmentView::new(protagonist, log)
    }

    #[test]
    fn test_far_obstacle_is_noop() {
        let mut agent = agent_at(10, 10).with_hitbox(Hitbox::new(0, 0, 32, 32));
        let obstacle = CollisionDescriptor::solid(200, 200, 50, 50)
            .with_damage(5)
            .destroyed_on_contact();
        let mut log = MessageLog::new();
        let id = agent.id();

        let outcome = agent.check_collision(&obstacle, &mut env(&mut log, Some(id)));

        assert!(outcome.is_none());
        assert_eq!(agent.position(), Position::new(10, 10));
        assert_eq!(agent.health(), 10);
        assert!(log.is_empty());
    }

    #[test]
    fn test_landing_on_floor() {
        // Agent bottom at 110 sinks 10px into a floor starting at 100.
        let mut agent = agent_at(0, 78);
        agent.set_velocity_y(6);
        let floor = CollisionDescriptor::solid(-100, 100, 400, 50);
        let mut log = MessageLog::new();

        let outcome = agent.check_collision(&floor, &mut env(&mut log, None));

        assert!(outcome.landed);
        assert_eq!(
            outcome.push_out,
            Some(PushOut {
                axis: Axis::Y,
                dx: 0,
                dy: -10
            })
        );
        assert_eq!(agent.position(), Position::new(0, 68));
        assert!(agent.is_grounded());
        assert_eq!(agent.velocity_y(), 0);
    }

    #[test]
    fn test_head_bump_pushes_down_without_landing() {
        let mut agent = agent_at(0, 45);
        agent.set_velocity_y(-8);
        let ceiling = CollisionDescriptor::solid(-100, 0, 400, 50);
        let mut log = MessageLog::new();

        let outcome = agent.check_collision(&ceiling, &mut env(&mut log, None));

        assert!(!outcome.landed);
        assert_eq!(agent.position(), Position::new(0, 50));
        assert!(!agent.is_grounded());
        assert_eq!(agent.velocity_y(), -8);
    }

    #[test]
    fn test_wall_pushes_sideways() {
        // Overlaps a tall wall by 4px from the left.
        let mut agent = agent_at(72, 100);
        let wall = CollisionDescriptor::solid(100, 0, 20, 400);
        let mut log = MessageLog::new();

        let outcome = agent.check_collision(&wall, &mut env(&mut log, None));

        assert_eq!(
            outcome.push_out,
            Some(PushOut {
                axis: Axis::X,
                dx: -4,
                dy: 0
            })
        );
        assert_eq!(agent.position(), Position::new(68, 100));

        let mut agent = agent_at(116, 100);
        agent.check_collision(&wall, &mut env(&mut log, None));
        assert_eq!(agent.position(), Position::new(120, 100));
    }

    #[test]
    fn test_tie_resolves_vertically() {
        // Equal 4px overlap on both axes, agent up-left of the block.
        let mut agent = agent_at(0, 0);
        let block = CollisionDescriptor::solid(28, 28, 32, 32);
        let mut log = MessageLog::new();

        let outcome = agent.check_collision(&block, &mut env(&mut log, None));

        assert_eq!(outcome.push_out.map(|p| p.axis), Some(Axis::Y));
        assert_eq!(agent.position(), Position::new(0, -4));
        assert!(agent.is_grounded());
    }

    #[test]
    fn test_odd_sizes_resolve_cleanly() {
        // 31px agent against 32px floor: centers land on half pixels.
        let mut agent = Agent::new(Position::new(0, 0), Size::new(31, 31), 1, 1, "imp.png");
        let floor = CollisionDescriptor::solid(-50, 29, 200, 32);
        let mut log = MessageLog::new();

        agent.check_collision(&floor, &mut env(&mut log, None));

        assert_eq!(agent.position(), Position::new(0, -2));
        assert!(!agent.bounds().overlaps(&floor.bounds()));
    }

    #[test]
    fn test_hitbox_used_for_bounds() {
        // Sprite overlaps the floor but the hitbox stops short of it.
        let mut agent = agent_at(0, 70).with_hitbox(Hitbox::new(8, 0, 16, 28));
        let floor = CollisionDescriptor::solid(0, 100, 100, 20);
        let mut log = MessageLog::new();

        let outcome = agent.check_collision(&floor, &mut env(&mut log, None));
        assert!(outcome.is_none());

        agent.gravity_effect();
        agent.gravity_effect();
        // y = 73, hitbox bottom = 101
        let outcome = agent.check_collision(&floor, &mut env(&mut log, None));
        assert!(outcome.landed);
        assert_eq!(agent.position().y, 72);
        assert_eq!(agent.body().hitbox().map(|h| h.bounds().bottom()), Some(100));
    }

    #[test]
    fn test_passable_hazard_damages_without_push() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock);
        let lava = CollisionDescriptor::passable(10, 10, 50, 50).with_damage(3);
        let mut log = MessageLog::new();
        let id = agent.id();

        let outcome = agent.check_collision(&lava, &mut env(&mut log, Some(id)));

        assert!(outcome.overlapped);
        assert_eq!(outcome.push_out, None);
        assert_eq!(outcome.damage, Some(DamageOutcome::Applied(3)));
        assert_eq!(agent.position(), Position::new(0, 0));
        assert_eq!(agent.health(), 7);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_hazard_spares_non_protagonist_by_default() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock);
        let lava = CollisionDescriptor::passable(10, 10, 50, 50).with_damage(3);
        let mut log = MessageLog::new();

        let outcome = agent.check_collision(&lava, &mut env(&mut log, Some(EntityId::from_raw(0))));
        assert_eq!(outcome.damage, None);
        assert_eq!(agent.health(), 10);

        let lava = lava.damaging_agents();
        let outcome = agent.check_collision(&lava, &mut env(&mut log, None));
        assert_eq!(outcome.damage, Some(DamageOutcome::Applied(3)));
        assert_eq!(agent.health(), 7);
    }

    #[test]
    fn test_solid_hazard_pushes_and_damages() {
        let clock = ManualClock::shared(0);
        let mut agent = clocked(&clock).with_hitbox(Hitbox::new(0, 0, 32, 32));
        let spikes = CollisionDescriptor::solid(-10, 30, 60, 10).with_damage(2);
        let mut log = MessageLog::new();
        let id = agent.id();

        let outcome = agent.check_collision(&spikes, &mut env(&mut log, Some(id)));

        assert!(outcome.landed);
        assert_eq!(outcome.damage, Some(DamageOutcome::Applied(2)));
        assert_eq!(agent.position(), Position::new(0, -2));

        let outcome = agent.check_collision(
            &CollisionDescriptor::solid(-10, 28, 60, 10).with_damage(2),
            &mut env(&mut log, Some(id)),
        );
        assert_eq!(outcome.damage, Some(DamageOutcome::Absorbed(2)));
        assert_eq!(agent.health(), 8);
    }

    #[test]
    fn test_contact_destroy_rules() {
        let mut agent = agent_at(0, 0);
        let coin = CollisionDescriptor::passable(5, 5, 8, 8).destroyed_on_contact();
        let mut log = MessageLog::new();
        let id = agent.id();

        let outcome = agent.check_collision(&coin, &mut env(&mut log, None));
        assert!(!outcome.destroy);

        let outcome = agent.check_collision(&coin, &mut env(&mut log, Some(id)));
        assert!(outcome.destroy);

        let shared = coin.clone().destroyed_by_agents();
        let outcome = agent.check_collision(&shared, &mut env(&mut log, None));
        assert!(outcome.destroy);

        let mut descriptor = coin;
        descriptor.apply_outcome(&outcome);
        assert!(descriptor.is_destroyed());
    }

    #[test]
    fn test_only_upward_resolution_grounds() {
        let mut agent = agent_at(0, 0);
        let mut log = MessageLog::new();

        // Wall on the right, ceiling above, passable region: none may ground.
        agent.check_collision(&CollisionDescriptor::solid(30, -100, 10, 300), &mut env(&mut log, None));
        agent.check_collision(&CollisionDescriptor::solid(-100, -20, 300, 22), &mut env(&mut log, None));
        agent.check_collision(&CollisionDescriptor::passable(0, 0, 64, 64), &mut env(&mut log, None));
        agent.gravity_effect();
        agent.chase(100, 100);
        agent.move_by(MovementSet::single(Movement::Down));
        assert!(!agent.is_grounded());
    }

    proptest! {
        #[test]
        fn prop_push_out_separates_on_chosen_axis(
            ax in -100i32..100, ay in -100i32..100,
            aw in 1i32..64, ah in 1i32..64,
            bw in 1i32..64, bh in 1i32..64,
            kx in 0i32..1000, ky in 0i32..1000,
        ) {
            // Place the obstacle anywhere it still overlaps the agent.
            let bx = ax - bw + 1 + kx % (aw + bw - 1);
            let by = ay - bh + 1 + ky % (ah + bh - 1);
            let mut agent = Agent::new(Position::new(ax, ay), Size::new(aw, ah), 1, 1, "a.png");
            let obstacle = CollisionDescriptor::solid(bx, by, bw, bh);
            prop_assert!(agent.bounds().overlaps(&obstacle.bounds()));

            let mut log = MessageLog::new();
            let outcome = agent.check_collision(&obstacle, &mut EnvironmentView::new(None, &mut log));

            let push = outcome.push_out.expect("solid overlap pushes out");
            let after = agent.bounds();
            match push.axis {
                Axis::X => prop_assert!(!after.overlaps_x(&obstacle.bounds())),
                Axis::Y => prop_assert!(!after.overlaps_y(&obstacle.bounds())),
            }
            prop_assert_eq!(agent.is_grounded(), push.axis == Axis::Y && push.dy < 0);
        }
    }
}
