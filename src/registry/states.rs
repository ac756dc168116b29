//! # State registry: one-time conditions with pending listeners.
//!
//! A slot is absent ("never referenced"), holding pending listeners, or
//! `Reached`. The transition to `Reached` happens *before* the pending list
//! is handed back for invocation, so a listener observing the state from
//! inside its own callback already sees it reached. Once reached, a state
//! only leaves that condition through [`StateRegistry::clear`], which
//! deletes the slot entirely.

use std::collections::HashMap;

use crate::handler::Handler;

#[derive(Debug)]
enum StateSlot {
    Reached,
    Pending(Vec<Handler>),
}

/// Keyed store of state slots.
#[derive(Default, Debug)]
pub(crate) struct StateRegistry {
    slots: HashMap<String, StateSlot>,
}

impl StateRegistry {
    /// True iff the state has been reached.
    pub fn is_reached(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(StateSlot::Reached))
    }

    /// Enqueues a listener to fire on the state's first transition.
    ///
    /// Caller is responsible for the already-reached case (fire immediately
    /// instead of enqueueing).
    pub fn push_pending(&mut self, name: &str, handler: Handler) {
        match self
            .slots
            .entry(name.to_owned())
            .or_insert_with(|| StateSlot::Pending(Vec::new()))
        {
            StateSlot::Pending(pending) => pending.push(handler),
            StateSlot::Reached => {}
        }
    }

    /// Marks the state reached and hands back the pending listeners.
    ///
    /// Returns `None` when the state was already reached (idempotent: the
    /// pending list fires at most once, ever, until the slot is cleared).
    pub fn reach(&mut self, name: &str) -> Option<Vec<Handler>> {
        match self.slots.insert(name.to_owned(), StateSlot::Reached) {
            Some(StateSlot::Reached) => None,
            Some(StateSlot::Pending(pending)) => Some(pending),
            None => Some(Vec::new()),
        }
    }

    /// Deletes the slot, returning the state to "not yet reached".
    ///
    /// Pending listeners, if any, are discarded silently.
    pub fn clear(&mut self, name: &str) {
        self.slots.remove(name);
    }

    /// Number of live slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every slot.
    pub fn reset(&mut self) {
        self.slots.clear();
    }
}
