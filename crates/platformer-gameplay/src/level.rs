//! Levels: agents, collision descriptors and the per-tick update order.
//!
//! A [`Level`] is the reference [`Environment`]. It owns every agent and
//! descriptor, and [`Level::tick`] runs one frame in the order the physics
//! depends on:
//!
//! 1. Protagonist input (`gravity_move`), other agents chase the protagonist
//! 2. Gravity for every agent
//! 3. Every agent against every descriptor
//! 4. Descriptors flagged for destruction are removed
//! 5. Dead agents other than the protagonist are removed

use std::collections::HashSet;

use platformer_common::{EntityId, PlatformerError, Position, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::agent::{Agent, AgentPhysics};
use crate::clock::SharedClock;
use crate::collision::{CollisionDescriptor, DamageOutcome};
use crate::entity::{Damageable, Movable};
use crate::environment::{Environment, EnvironmentView};
use crate::hitbox::Hitbox;
use crate::messages::{GameMessage, MessageLog, MessageSink};
use crate::movement::MovementSet;
use crate::weapon::Weapon;

/// Errors that can occur while building or querying a level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    /// No agent with this ID lives in the level
    #[error("agent not found: {0}")]
    AgentNotFound(EntityId),
    /// An agent with this ID was already added
    #[error("agent already in level: {0}")]
    DuplicateAgent(EntityId),
    /// More than one spawn claims to be the protagonist
    #[error("level config declares {0} protagonists")]
    MultipleProtagonists(usize),
}

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;

impl From<LevelError> for PlatformerError {
    fn from(err: LevelError) -> Self {
        PlatformerError::Level(err.to_string())
    }
}

/// What a non-protagonist agent does each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Only gravity and collisions move it
    Idle,
    /// Walks toward the protagonist
    #[default]
    Chase,
}

/// Spawn description of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpawn {
    /// Initial X
    pub x: i32,
    /// Initial Y
    pub y: i32,
    /// Sprite width
    pub width: i32,
    /// Sprite height
    pub height: i32,
    /// Pixels per step
    pub speed: i32,
    /// Starting health
    pub health: i32,
    /// Sprite path
    pub sprite: String,
    /// Start facing left
    #[serde(default)]
    pub flipped: bool,
    /// Start on the ground
    #[serde(default)]
    pub grounded: bool,
    /// Collision box
    #[serde(default)]
    pub hitbox: Option<Hitbox>,
    /// Starting weapon
    #[serde(default)]
    pub weapon: Option<Weapon>,
    /// Physics overrides
    #[serde(default)]
    pub physics: AgentPhysics,
    /// Player-controlled
    #[serde(default)]
    pub protagonist: bool,
    /// AI behavior (ignored for the protagonist)
    #[serde(default)]
    pub behavior: Behavior,
}

impl AgentSpawn {
    /// Builds the agent this spawn describes.
    #[must_use]
    pub fn build(&self, clock: SharedClock) -> Agent {
        let mut agent = Agent::new_facing(
            Position::new(self.x, self.y),
            Size::new(self.width, self.height),
            self.speed,
            self.health,
            self.sprite.clone(),
            self.flipped,
        )
        .with_physics(self.physics)
        .with_grounded(self.grounded)
        .with_clock(clock);
        if let Some(hitbox) = self.hitbox {
            agent = agent.with_hitbox(hitbox);
        }
        if let Some(weapon) = &self.weapon {
            agent = agent.with_weapon(weapon.clone());
        }
        agent
    }
}

/// Serializable level layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Agents to spawn
    pub agents: Vec<AgentSpawn>,
    /// Obstacles and hazards
    pub obstacles: Vec<CollisionDescriptor>,
}

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Hits that landed
    pub hits_applied: u32,
    /// Hits absorbed by invulnerability
    pub hits_absorbed: u32,
    /// Descriptors removed after contact
    pub destroyed: usize,
    /// Dead agents removed from the level
    pub removed_agents: Vec<EntityId>,
    /// The protagonist has run out of health; the game is over
    pub protagonist_dead: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    agent: Agent,
    behavior: Behavior,
}

/// A running level.
#[derive(Debug, Default)]
pub struct Level {
    slots: Vec<Slot>,
    obstacles: Vec<CollisionDescriptor>,
    protagonist: Option<EntityId>,
    messages: MessageLog,
    ticks: u64,
}

impl Level {
    /// Creates an empty level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a level from a layout, with every agent reading `clock`.
    pub fn from_config(config: &LevelConfig, clock: &SharedClock) -> LevelResult<Self> {
        let protagonists = config.agents.iter().filter(|a| a.protagonist).count();
        if protagonists > 1 {
            return Err(LevelError::MultipleProtagonists(protagonists));
        }

        let mut level = Self::new();
        for spawn in &config.agents {
            let id = level.add_agent(spawn.build(clock.clone()), spawn.behavior)?;
            if spawn.protagonist {
                level.set_protagonist(id)?;
            }
        }
        for obstacle in &config.obstacles {
            level.add_obstacle(obstacle.clone());
        }

        info!(
            agents = level.slots.len(),
            obstacles = level.obstacles.len(),
            "level loaded"
        );
        Ok(level)
    }

    /// Adds an agent.
    pub fn add_agent(&mut self, agent: Agent, behavior: Behavior) -> LevelResult<EntityId> {
        let id = agent.id();
        if self.contains(id) {
            return Err(LevelError::DuplicateAgent(id));
        }
        self.slots.push(Slot { agent, behavior });
        Ok(id)
    }

    /// Registers the player-controlled agent.
    pub fn set_protagonist(&mut self, id: EntityId) -> LevelResult<()> {
        if !self.contains(id) {
            return Err(LevelError::AgentNotFound(id));
        }
        self.protagonist = Some(id);
        Ok(())
    }

    /// Adds an obstacle or hazard.
    pub fn add_obstacle(&mut self, descriptor: CollisionDescriptor) {
        self.obstacles.push(descriptor);
    }

    /// Whether an agent lives in the level.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.iter().any(|slot| slot.agent.id() == id)
    }

    /// Looks up an agent.
    pub fn agent(&self, id: EntityId) -> LevelResult<&Agent> {
        self.slots
            .iter()
            .map(|slot| &slot.agent)
            .find(|agent| agent.id() == id)
            .ok_or(LevelError::AgentNotFound(id))
    }

    /// Looks up an agent mutably.
    pub fn agent_mut(&mut self, id: EntityId) -> LevelResult<&mut Agent> {
        self.slots
            .iter_mut()
            .map(|slot| &mut slot.agent)
            .find(|agent| agent.id() == id)
            .ok_or(LevelError::AgentNotFound(id))
    }

    /// The protagonist, if registered and still in the level.
    #[must_use]
    pub fn protagonist_agent(&self) -> Option<&Agent> {
        self.protagonist.and_then(|id| self.agent(id).ok())
    }

    /// All agents.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().map(|slot| &slot.agent)
    }

    /// All remaining obstacles.
    #[must_use]
    pub fn obstacles(&self) -> &[CollisionDescriptor] {
        &self.obstacles
    }

    /// Messages produced so far.
    #[must_use]
    pub fn message_log(&self) -> &MessageLog {
        &self.messages
    }

    /// Removes and returns all pending messages.
    pub fn drain_messages(&mut self) -> Vec<GameMessage> {
        self.messages.drain()
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one frame with the protagonist's commands.
    pub fn tick(&mut self, input: MovementSet) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        let protagonist = self.protagonist;
        let target = self.protagonist_agent().map(Agent::position);

        for slot in &mut self.slots {
            if Some(slot.agent.id()) == protagonist {
                slot.agent.gravity_move(input);
            } else if let (Behavior::Chase, Some(target)) = (slot.behavior, target) {
                slot.agent.chase(target.x, target.y);
            }
        }

        for slot in &mut self.slots {
            slot.agent.gravity_effect();
        }

        let mut view = EnvironmentView::new(protagonist, &mut self.messages);
        for slot in &mut self.slots {
            for obstacle in &mut self.obstacles {
                let outcome = slot.agent.check_collision(obstacle, &mut view);
                obstacle.apply_outcome(&outcome);
                match outcome.damage {
                    Some(DamageOutcome::Applied(_)) => report.hits_applied += 1,
                    Some(DamageOutcome::Absorbed(_)) => report.hits_absorbed += 1,
                    None => {},
                }
            }
        }

        let before = self.obstacles.len();
        self.obstacles.retain(|obstacle| !obstacle.is_destroyed());
        report.destroyed = before - self.obstacles.len();
        if report.destroyed > 0 {
            debug!(count = report.destroyed, "obstacles destroyed");
        }

        let dead: HashSet<EntityId> = self
            .slots
            .iter()
            .filter(|slot| slot.agent.is_dead() && Some(slot.agent.id()) != protagonist)
            .map(|slot| slot.agent.id())
            .collect();
        if !dead.is_empty() {
            self.slots.retain(|slot| !dead.contains(&slot.agent.id()));
            for id in &dead {
                info!(agent = %id, "agent died");
            }
            report.removed_agents = dead.into_iter().collect();
            report.removed_agents.sort();
        }

        report.protagonist_dead = self.protagonist_agent().is_some_and(Agent::is_dead);
        if report.protagonist_dead {
            info!(tick = self.ticks, "protagonist died");
        }

        report
    }
}

impl Environment for Level {
    fn protagonist(&self) -> Option<EntityId> {
        self.protagonist
    }

    fn messages(&mut self) -> &mut dyn MessageSink {
        &mut self.messages
    }
}
