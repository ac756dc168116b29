//! # Catch registry: per-event buffers of unheard emissions.
//!
//! A catch bucket holds the argument tuples of emissions that arrived while
//! no listener was attached, in emission order. The bucket exists only
//! between an explicit declaration and the first registration for that
//! event, at which point the hub takes the whole buffer for replay and the
//! bucket is gone.

use std::collections::HashMap;

use serde_json::Value;

/// Keyed store of catch buffers.
#[derive(Default, Debug)]
pub(crate) struct CatchRegistry {
    buffers: HashMap<String, Vec<Vec<Value>>>,
}

impl CatchRegistry {
    /// Declares an event catchable, creating an empty buffer if absent.
    pub fn declare(&mut self, event: &str) {
        self.buffers.entry(event.to_owned()).or_default();
    }

    /// True if the event has a catch buffer (possibly still empty).
    pub fn contains(&self, event: &str) -> bool {
        self.buffers.contains_key(event)
    }

    /// Appends one emission's argument tuple to the event's buffer.
    ///
    /// No-op when the event was never declared catchable.
    pub fn push(&mut self, event: &str, args: Vec<Value>) {
        if let Some(buffer) = self.buffers.get_mut(event) {
            buffer.push(args);
        }
    }

    /// Takes the whole buffer for replay, deleting the bucket.
    pub fn take(&mut self, event: &str) -> Option<Vec<Vec<Value>>> {
        self.buffers.remove(event)
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Drops every buffer.
    pub fn reset(&mut self) {
        self.buffers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declare_is_idempotent() {
        let mut reg = CatchRegistry::default();
        reg.declare("packets");
        reg.push("packets", vec![json!("A")]);
        reg.declare("packets");

        let buffered = reg.take("packets").expect("buffer exists");
        assert_eq!(buffered, vec![vec![json!("A")]], "redeclare must not wipe");
    }

    #[test]
    fn test_take_returns_emission_order_and_deletes() {
        let mut reg = CatchRegistry::default();
        reg.declare("packets");
        reg.push("packets", vec![json!("A")]);
        reg.push("packets", vec![json!("B"), json!(2)]);

        let buffered = reg.take("packets").expect("buffer exists");
        assert_eq!(buffered, vec![vec![json!("A")], vec![json!("B"), json!(2)]]);
        assert!(!reg.contains("packets"));
        assert!(reg.take("packets").is_none());
    }

    #[test]
    fn test_push_without_declaration_is_dropped() {
        let mut reg = CatchRegistry::default();
        reg.push("packets", vec![json!("A")]);
        assert!(!reg.contains("packets"));
    }
}
