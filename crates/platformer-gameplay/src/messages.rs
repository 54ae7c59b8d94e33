//! Outgoing game messages.
//!
//! The simulation only appends to a [`MessageSink`]; presenting or storing
//! the messages is somebody else's job.

use crossbeam_channel::Sender;
use platformer_common::EntityId;
use serde::{Deserialize, Serialize};

/// A message produced by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMessage {
    /// An entity lost health
    Damage {
        /// Entity that was hit
        entity_id: EntityId,
        /// Damage applied
        amount: i32,
        /// Health after the hit (may be negative)
        remaining_health: i32,
    },
}

/// Append-only destination for game messages.
pub trait MessageSink {
    /// Appends a message.
    fn push(&mut self, message: GameMessage);
}

impl MessageSink for Vec<GameMessage> {
    fn push(&mut self, message: GameMessage) {
        Vec::push(self, message);
    }
}

impl MessageSink for Sender<GameMessage> {
    fn push(&mut self, message: GameMessage) {
        // Non-blocking send - if full or disconnected, message is dropped
        let _ = self.try_send(message);
    }
}

/// In-memory message log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<GameMessage>,
}

impl MessageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All messages in arrival order.
    #[must_use]
    pub fn messages(&self) -> &[GameMessage] {
        &self.messages
    }

    /// Removes and returns every message.
    pub fn drain(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.messages)
    }
}

impl MessageSink for MessageLog {
    fn push(&mut self, message: GameMessage) {
        self.messages.push(message);
    }
}
