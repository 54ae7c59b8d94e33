//! Runner configuration.
//!
//! Describes how long to simulate, the scripted protagonist input and the
//! level to load. Configuration can be loaded from and saved to a TOML file.

use platformer_gameplay::{
    AgentPhysics, AgentSpawn, Behavior, CollisionDescriptor, Hitbox, LevelConfig, Weapon,
};
use platformer_common::{PlatformerError, PlatformerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "platformer.toml";

/// One step of scripted input: hold `keys` for `ticks` ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputStep {
    /// How many ticks the keys are held
    pub ticks: u32,
    /// Movement tokens (`RIGHT`, `LEFT`, `UP`, `DOWN`)
    #[serde(default)]
    pub keys: Vec<String>,
}

impl InputStep {
    /// Creates a step.
    #[must_use]
    pub fn new(ticks: u32, keys: &[&str]) -> Self {
        Self {
            ticks,
            keys: keys.iter().map(|key| (*key).to_string()).collect(),
        }
    }
}

/// Runner configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Simulation ===
    /// Maximum number of ticks to run
    pub ticks: u64,
    /// Simulated milliseconds per tick
    pub tick_millis: u64,
    /// Log a status line every N ticks (0 = never)
    pub log_every: u64,

    // === Input ===
    /// Protagonist input, played once in order; no keys afterwards
    pub script: Vec<InputStep>,

    // === Level ===
    /// Level layout
    pub level: LevelConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            tick_millis: 16,
            log_every: 60,
            script: vec![
                InputStep::new(60, &["RIGHT"]),
                InputStep::new(1, &["RIGHT", "UP"]),
                InputStep::new(120, &["RIGHT"]),
                InputStep::new(1, &["UP"]),
            ],
            level: demo_level(),
        }
    }
}

impl EngineConfig {
    /// Reads a config file, falling back to defaults when it is missing,
    /// unreadable or malformed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(PlatformerError::from)
            .and_then(|text| {
                toml::from_str::<Self>(&text).map_err(|e| PlatformerError::Config(e.to_string()))
            });
        match parsed {
            Ok(config) => {
                info!(path = %path.display(), "config loaded");
                config
            },
            Err(e) => {
                warn!(path = %path.display(), "ignoring config file: {e}");
                Self::default()
            },
        }
    }

    /// Writes the config as TOML, creating parent directories as needed.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> PlatformerResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let text =
            toml::to_string_pretty(self).map_err(|e| PlatformerError::Config(e.to_string()))?;
        fs::write(path, text)?;

        info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Config path from the command line, falling back to the default file.
    pub fn path_from_args<I: IntoIterator<Item = String>>(args: I) -> PathBuf {
        args.into_iter()
            .nth(1)
            .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.ticks = self.ticks.clamp(1, 1_000_000);
        self.tick_millis = self.tick_millis.clamp(1, 1000);
        self.script.retain(|step| step.ticks > 0);
    }

    /// Total ticks covered by the input script.
    #[must_use]
    pub fn script_len(&self) -> u64 {
        self.script.iter().map(|step| u64::from(step.ticks)).sum()
    }
}

/// A short level: a floor, a wall, a coin, a spike strip and one chaser.
#[must_use]
pub fn demo_level() -> LevelConfig {
    LevelConfig {
        agents: vec![
            AgentSpawn {
                x: 100,
                y: 368,
                width: 32,
                height: 32,
                speed: 4,
                health: 10,
                sprite: "sprites/hero.png".to_string(),
                flipped: false,
                grounded: true,
                hitbox: Some(Hitbox::new(4, 0, 24, 32)),
                weapon: Some(Weapon::new("blaster")),
                physics: AgentPhysics::default(),
                protagonist: true,
                behavior: Behavior::Idle,
            },
            AgentSpawn {
                x: 700,
                y: 376,
                width: 24,
                height: 24,
                speed: 2,
                health: 3,
                sprite: "sprites/slime.png".to_string(),
                flipped: true,
                grounded: true,
                hitbox: None,
                weapon: None,
                physics: AgentPhysics::default(),
                protagonist: false,
                behavior: Behavior::Chase,
            },
        ],
        obstacles: vec![
            CollisionDescriptor::solid(0, 400, 2000, 40),
            CollisionDescriptor::solid(1200, 300, 40, 100),
            CollisionDescriptor::passable(300, 360, 16, 16).destroyed_on_contact(),
            CollisionDescriptor::passable(500, 392, 64, 8).with_damage(2).damaging_agents(),
        ],
    }
}
