//! Headless simulation loop.
//!
//! Steps a level at a fixed tick rate on a simulated clock, feeding the
//! scripted input to the protagonist, until the tick budget runs out or the
//! protagonist dies.

use anyhow::Result;
use platformer_common::PlatformerError;
use platformer_gameplay::{
    Agent, Clock, Damageable, GameMessage, Level, ManualClock, MovementSet, SharedClock,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{EngineConfig, InputStep};

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks actually simulated
    pub ticks_run: u64,
    /// Simulated time at the end of the run
    pub elapsed_millis: u64,
    /// Hits that landed
    pub hits_applied: u32,
    /// Hits absorbed by invulnerability
    pub hits_absorbed: u32,
    /// Obstacles removed after contact
    pub obstacles_destroyed: usize,
    /// Non-protagonist agents that died
    pub agents_killed: usize,
    /// Damage reports emitted
    pub messages: usize,
    /// Protagonist health at the end (`None` without a protagonist)
    pub protagonist_health: Option<i32>,
    /// The run ended because the protagonist died
    pub protagonist_dead: bool,
}

/// Resolves the scripted input for a tick (0-based).
fn input_at(script: &[InputStep], tick: u64) -> MovementSet {
    let mut start = 0;
    for step in script {
        let end = start + u64::from(step.ticks);
        if tick < end {
            return MovementSet::from_tokens(&step.keys);
        }
        start = end;
    }
    MovementSet::new()
}

fn log_message(message: &GameMessage) {
    match message {
        GameMessage::Damage {
            entity_id,
            amount,
            remaining_health,
        } => debug!(entity = %entity_id, amount, remaining_health, "damage"),
    }
}

fn log_status(tick: u64, level: &Level) {
    match level.protagonist_agent() {
        Some(hero) => info!(
            tick,
            x = hero.position().x,
            y = hero.position().y,
            health = hero.health(),
            grounded = hero.is_grounded(),
            agents = level.agents().count(),
            obstacles = level.obstacles().len(),
            "status"
        ),
        None => info!(
            tick,
            agents = level.agents().count(),
            obstacles = level.obstacles().len(),
            "status"
        ),
    }
}

/// Runs the configured level to completion.
pub fn run(config: &EngineConfig) -> Result<RunSummary> {
    let clock = ManualClock::shared(0);
    let shared: SharedClock = clock.clone();
    let mut level = Level::from_config(&config.level, &shared).map_err(PlatformerError::from)?;

    info!(
        ticks = config.ticks,
        tick_millis = config.tick_millis,
        scripted = config.script_len(),
        "simulation starting"
    );

    let summary = simulate(config, &clock, &mut level);

    info!(
        ticks = summary.ticks_run,
        elapsed_ms = summary.elapsed_millis,
        hits = summary.hits_applied,
        absorbed = summary.hits_absorbed,
        destroyed = summary.obstacles_destroyed,
        killed = summary.agents_killed,
        messages = summary.messages,
        health = ?summary.protagonist_health,
        protagonist_dead = summary.protagonist_dead,
        "simulation finished"
    );
    Ok(summary)
}

fn simulate(config: &EngineConfig, clock: &Arc<ManualClock>, level: &mut Level) -> RunSummary {
    let mut summary = RunSummary {
        ticks_run: 0,
        elapsed_millis: 0,
        hits_applied: 0,
        hits_absorbed: 0,
        obstacles_destroyed: 0,
        agents_killed: 0,
        messages: 0,
        protagonist_health: None,
        protagonist_dead: false,
    };

    for tick in 0..config.ticks {
        let report = level.tick(input_at(&config.script, tick));

        for message in level.drain_messages() {
            log_message(&message);
            summary.messages += 1;
        }

        summary.ticks_run += 1;
        summary.hits_applied += report.hits_applied;
        summary.hits_absorbed += report.hits_absorbed;
        summary.obstacles_destroyed += report.destroyed;
        summary.agents_killed += report.removed_agents.len();

        if config.log_every > 0 && report.tick % config.log_every == 0 {
            log_status(report.tick, level);
        }

        if report.protagonist_dead {
            summary.protagonist_dead = true;
            break;
        }

        clock.advance(config.tick_millis);
    }

    summary.elapsed_millis = clock.now_millis();
    summary.protagonist_health = level.protagonist_agent().map(Agent::health);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use platformer_gameplay::{
        AgentPhysics, AgentSpawn, Behavior, CollisionDescriptor, LevelConfig, Movement,
    };

    fn spawn(x: i32, y: i32, health: i32, protagonist: bool) -> AgentSpawn {
        AgentSpawn {
            x,
            y,
            width: 16,
            height: 16,
            speed: 2,
            health,
            sprite: "dot.png".to_string(),
            flipped: false,
            grounded: true,
            hitbox: None,
            weapon: None,
            physics: AgentPhysics::default(),
            protagonist,
            behavior: Behavior::Idle,
        }
    }

    fn config(level: LevelConfig, ticks: u64) -> EngineConfig {
        EngineConfig {
            ticks,
            tick_millis: 100,
            log_every: 0,
            script: Vec::new(),
            level,
        }
    }

    #[test]
    fn test_input_at_walks_script() {
        let script = vec![InputStep::new(2, &["RIGHT"]), InputStep::new(1, &["LEFT", "UP"])];

        assert_eq!(input_at(&script, 0), MovementSet::single(Movement::Right));
        assert_eq!(input_at(&script, 1), MovementSet::single(Movement::Right));
        let third = input_at(&script, 2);
        assert!(third.contains(Movement::Left) && third.contains(Movement::Up));
        assert!(input_at(&script, 3).is_empty());
        assert!(input_at(&[], 0).is_empty());
    }

    #[test]
    fn test_default_config_runs() {
        let summary = run(&EngineConfig::default()).expect("run");
        assert!(summary.ticks_run > 0);
        assert_eq!(summary.obstacles_destroyed, 1);
        assert!(summary.protagonist_health.is_some());
    }

    #[test]
    fn test_run_stops_on_protagonist_death() {
        let level = LevelConfig {
            agents: vec![spawn(0, 0, 5, true)],
            obstacles: vec![CollisionDescriptor::passable(0, 0, 64, 64).with_damage(2)],
        };

        // Hits land at 0 ms, 3000 ms and 6000 ms; the third one kills.
        let summary = run(&config(level, 1000)).expect("run");

        assert!(summary.protagonist_dead);
        assert_eq!(summary.ticks_run, 61);
        assert_eq!(summary.hits_applied, 3);
        assert_eq!(summary.hits_absorbed, 58);
        assert_eq!(summary.messages, 3);
        assert_eq!(summary.elapsed_millis, 6000);
        assert_eq!(summary.protagonist_health, Some(-1));
    }

    #[test]
    fn test_run_without_protagonist() {
        let level = LevelConfig {
            agents: vec![spawn(0, 0, 1, false)],
            obstacles: vec![CollisionDescriptor::passable(0, 0, 64, 64)
                .with_damage(1)
                .damaging_agents()],
        };

        let summary = run(&config(level, 10)).expect("run");

        assert_eq!(summary.ticks_run, 10);
        assert_eq!(summary.agents_killed, 1);
        assert_eq!(summary.protagonist_health, None);
        assert!(!summary.protagonist_dead);
    }

    #[test]
    fn test_run_rejects_two_protagonists() {
        let level = LevelConfig {
            agents: vec![spawn(0, 0, 1, true), spawn(50, 0, 1, true)],
            obstacles: Vec::new(),
        };
        assert!(run(&config(level, 1)).is_err());
    }
}
