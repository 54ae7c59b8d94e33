//! Kinematic state shared by every in-level entity.
//!
//! [`Body`] holds what all entities have in common: identity, position, size,
//! speed, health, facing and an optional hitbox. Behavior is layered on with
//! the [`Movable`] and [`Damageable`] capability traits.

use platformer_common::{EntityId, Position, Rect, Size};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::collision::DamageOutcome;
use crate::hitbox::Hitbox;
use crate::messages::{GameMessage, MessageSink};
use crate::movement::MovementSet;

/// Horizontal facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing right (sprite drawn as authored)
    #[default]
    Right,
    /// Facing left (sprite drawn mirrored)
    Left,
}

/// Sprite reference and its mirroring state.
///
/// Loading and drawing happen elsewhere; the simulation only tracks which
/// image to use and whether it is currently mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sprite {
    /// Path of the image asset
    path: String,
    /// Whether the image is mirrored horizontally
    mirrored: bool,
    /// Number of times the image has been flipped
    #[serde(skip)]
    flips: u32,
}

impl Sprite {
    /// Creates an unmirrored sprite reference.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mirrored: false,
            flips: 0,
        }
    }

    /// Image path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the image is mirrored.
    #[must_use]
    pub const fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// How many times the image has been flipped.
    #[must_use]
    pub const fn flips(&self) -> u32 {
        self.flips
    }

    /// Mirrors the image horizontally.
    pub fn flip_image(&mut self) {
        self.mirrored = !self.mirrored;
        self.flips += 1;
    }
}

/// Shared kinematic state of an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// Unique entity ID
    id: EntityId,
    /// Top-left position
    position: Position,
    /// Sprite bounds
    size: Size,
    /// Pixels moved per step
    speed: i32,
    /// Current health
    health: i32,
    /// Facing left
    flipped: bool,
    /// Optional collision box; the sprite bounds are used without one
    hitbox: Option<Hitbox>,
    /// Sprite reference
    sprite: Sprite,
}

impl Body {
    /// Creates a right-facing body.
    #[must_use]
    pub fn new(position: Position, size: Size, speed: i32, health: i32, sprite: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            position,
            size,
            speed,
            health,
            flipped: false,
            hitbox: None,
            sprite: Sprite::new(sprite),
        }
    }

    /// Sets the initial facing. The sprite starts mirrored when facing left.
    #[must_use]
    pub fn with_flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self.sprite.mirrored = flipped;
        self
    }

    /// Attaches a hitbox.
    #[must_use]
    pub fn with_hitbox(mut self, hitbox: Hitbox) -> Self {
        self.set_hitbox(Some(hitbox));
        self
    }

    /// Entity ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Top-left position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Sprite size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Pixels moved per step.
    #[must_use]
    pub const fn speed(&self) -> i32 {
        self.speed
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Facing left.
    #[must_use]
    pub const fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Current facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        if self.flipped {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    /// Hitbox, if any.
    #[must_use]
    pub const fn hitbox(&self) -> Option<&Hitbox> {
        self.hitbox.as_ref()
    }

    /// Replaces the hitbox and places it at the current position.
    pub fn set_hitbox(&mut self, hitbox: Option<Hitbox>) {
        self.hitbox = hitbox;
        self.update_hitbox_position();
    }

    /// Sprite reference.
    #[must_use]
    pub const fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    /// Shifts the position without touching the hitbox.
    ///
    /// Callers batching several shifts refresh once with
    /// [`Body::update_hitbox_position`].
    pub(crate) fn shift(&mut self, dx: i32, dy: i32) {
        self.position = self.position.offset(dx, dy);
    }

    /// Shifts the position and refreshes the hitbox.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.shift(dx, dy);
        self.update_hitbox_position();
    }

    /// Re-anchors the hitbox to the current position.
    pub fn update_hitbox_position(&mut self) {
        if let Some(hitbox) = self.hitbox.as_mut() {
            hitbox.update_position(self.position);
        }
    }

    /// Collision bounds: the hitbox when present, the sprite bounds otherwise.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match &self.hitbox {
            Some(hitbox) => hitbox.bounds_at(self.position),
            None => Rect::from_parts(self.position, self.size),
        }
    }

    /// Turns to face a direction, flipping the sprite when facing changes.
    ///
    /// Returns `true` if the facing changed.
    pub fn turn(&mut self, facing: Facing) -> bool {
        let flipped = facing == Facing::Left;
        if self.flipped == flipped {
            return false;
        }
        self.sprite.flip_image();
        self.flipped = flipped;
        trace!(entity = %self.id, ?facing, "turned");
        true
    }

    /// Base damage behavior: subtract from health and report the hit.
    ///
    /// Health is not clamped; anything at or below zero counts as dead.
    pub fn apply_damage(&mut self, amount: i32, sink: &mut dyn MessageSink) {
        self.health -= amount;
        sink.push(GameMessage::Damage {
            entity_id: self.id,
            amount,
            remaining_health: self.health,
        });
    }

    /// Whether health has run out.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Entities that respond to movement commands.
pub trait Movable {
    /// Walks one step in the first commanded direction (RIGHT, LEFT, UP, DOWN
    /// priority). Unknown or absent directions are a no-op.
    fn move_by(&mut self, commands: MovementSet);

    /// Takes one greedy step toward a target point.
    fn chase(&mut self, target_x: i32, target_y: i32);
}

/// Entities that can be hurt.
pub trait Damageable {
    /// Current health.
    fn health(&self) -> i32;

    /// Attempts to apply damage, reporting accepted hits to `sink`.
    fn take_damage(&mut self, amount: i32, sink: &mut dyn MessageSink) -> DamageOutcome;

    /// Whether health has run out.
    fn is_dead(&self) -> bool {
        self.health() <= 0
    }
}
