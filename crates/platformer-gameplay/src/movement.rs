//! Movement command tokens.
//!
//! The input layer hands the simulation an unordered set of direction tokens
//! once per tick. Tokens outside the four known directions are dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// Errors that can occur while parsing movement tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovementError {
    /// Token is not one of RIGHT, LEFT, UP, DOWN
    #[error("unknown movement token: {0}")]
    UnknownToken(String),
}

/// A single movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Movement {
    /// Move right (+X)
    Right,
    /// Move left (-X)
    Left,
    /// Move up (-Y), or jump for gravity-bound agents
    Up,
    /// Move down (+Y)
    Down,
}

impl Movement {
    /// All directions in the priority order used by four-way walking.
    pub const PRIORITY: [Movement; 4] = [
        Movement::Right,
        Movement::Left,
        Movement::Up,
        Movement::Down,
    ];

    /// Token spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Movement::Right => "RIGHT",
            Movement::Left => "LEFT",
            Movement::Up => "UP",
            Movement::Down => "DOWN",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Movement::Right => 1,
            Movement::Left => 1 << 1,
            Movement::Up => 1 << 2,
            Movement::Down => 1 << 3,
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Movement {
    type Err = MovementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RIGHT" => Ok(Movement::Right),
            "LEFT" => Ok(Movement::Left),
            "UP" => Ok(Movement::Up),
            "DOWN" => Ok(Movement::Down),
            other => Err(MovementError::UnknownToken(other.to_string())),
        }
    }
}

/// Unordered set of movement directions for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MovementSet {
    bits: u8,
}

impl MovementSet {
    /// Empty set.
    pub const EMPTY: Self = Self { bits: 0 };

    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a set holding a single direction.
    #[must_use]
    pub const fn single(movement: Movement) -> Self {
        Self {
            bits: movement.bit(),
        }
    }

    /// Builds a set from raw tokens, ignoring anything unrecognised.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for token in tokens {
            match token.as_ref().parse::<Movement>() {
                Ok(movement) => set.insert(movement),
                Err(err) => trace!("ignoring movement token: {err}"),
            }
        }
        set
    }

    /// Adds a direction.
    pub fn insert(&mut self, movement: Movement) {
        self.bits |= movement.bit();
    }

    /// Checks whether a direction is present.
    #[must_use]
    pub const fn contains(&self, movement: Movement) -> bool {
        self.bits & movement.bit() != 0
    }

    /// Checks whether the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// First present direction in RIGHT, LEFT, UP, DOWN order.
    #[must_use]
    pub fn first_by_priority(&self) -> Option<Movement> {
        Movement::PRIORITY.into_iter().find(|m| self.contains(*m))
    }

    /// Iterates present directions in priority order.
    pub fn iter(&self) -> impl Iterator<Item = Movement> + '_ {
        Movement::PRIORITY.into_iter().filter(|m| self.contains(*m))
    }
}

impl FromIterator<Movement> for MovementSet {
    fn from_iter<T: IntoIterator<Item = Movement>>(iter: T) -> Self {
        let mut set = Self::new();
        for movement in iter {
            set.insert(movement);
        }
        set
    }
}

impl From<Movement> for MovementSet {
    fn from(movement: Movement) -> Self {
        Self::single(movement)
    }
}

impl<const N: usize> From<[Movement; N]> for MovementSet {
    fn from(movements: [Movement; N]) -> Self {
        movements.into_iter().collect()
    }
}
