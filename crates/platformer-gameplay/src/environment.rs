//! What an agent needs to know about the level it is colliding in.

use platformer_common::EntityId;

use crate::messages::MessageSink;

/// Narrow view of a level used during collision handling.
pub trait Environment {
    /// The player-controlled agent, if one is registered.
    fn protagonist(&self) -> Option<EntityId>;

    /// Where damage reports go.
    fn messages(&mut self) -> &mut dyn MessageSink;

    /// Whether `id` is the registered protagonist.
    fn is_protagonist(&self, id: EntityId) -> bool {
        self.protagonist() == Some(id)
    }
}

/// Borrowed environment built from a protagonist ID and a message sink.
///
/// Lets a level lend out its message log while its agents and obstacles are
/// mutably borrowed elsewhere.
pub struct EnvironmentView<'a> {
    protagonist: Option<EntityId>,
    messages: &'a mut dyn MessageSink,
}

impl<'a> EnvironmentView<'a> {
    /// Creates a view.
    pub fn new(protagonist: Option<EntityId>, messages: &'a mut dyn MessageSink) -> Self {
        Self {
            protagonist,
            messages,
        }
    }
}

impl Environment for EnvironmentView<'_> {
    fn protagonist(&self) -> Option<EntityId> {
        self.protagonist
    }

    fn messages(&mut self) -> &mut dyn MessageSink {
        &mut *self.messages
    }
}
