//! # Listener registry: event name → ordered listener entries.
//!
//! Insertion order is delivery order. Buckets are created lazily on first
//! registration and removed the moment the last entry leaves, so a present
//! bucket is always non-empty.
//!
//! ## Rules
//! - Removal by handler identity takes the **first** matching entry only.
//! - [`ListenerRegistry::clean`] removes at most one matching entry per
//!   bucket but scans every bucket, so a colliding id can be cleaned out of
//!   several events in one call.
//! - Snapshots are fresh containers; reading never mutates the registry.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handler::Handler;

/// Identity of one registration.
///
/// Either hub-assigned ([`ListenerId::Seq`], monotonically increasing per
/// hub) or caller-supplied ([`ListenerId::Name`]). Uniqueness is not
/// enforced; colliding ids are legal and addressed bucket-by-bucket by
/// `clean`. Serializes untagged, so ids round-trip as plain JSON numbers or
/// strings.
///
/// # Example
/// ```
/// use eventhub::ListenerId;
///
/// let id: ListenerId = "shutdown-hook".into();
/// assert_eq!(serde_json::to_string(&id).unwrap(), "\"shutdown-hook\"");
/// assert_eq!(serde_json::to_string(&ListenerId::Seq(7)).unwrap(), "7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListenerId {
    /// Hub-assigned sequence number.
    Seq(u64),
    /// Caller-supplied tag.
    Name(String),
}

impl From<u64> for ListenerId {
    fn from(seq: u64) -> Self {
        ListenerId::Seq(seq)
    }
}

impl From<&str> for ListenerId {
    fn from(name: &str) -> Self {
        ListenerId::Name(name.to_owned())
    }
}

impl From<String> for ListenerId {
    fn from(name: String) -> Self {
        ListenerId::Name(name)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerId::Seq(seq) => write!(f, "{seq}"),
            ListenerId::Name(name) => f.write_str(name),
        }
    }
}

/// One registration: the id it can be addressed by, and the handler to call.
#[derive(Clone, Debug)]
pub struct ListenerEntry {
    /// Identity used by `clean`.
    pub id: ListenerId,
    /// The registered callable.
    pub handler: Handler,
}

/// Keyed store of event buckets.
#[derive(Default, Debug)]
pub(crate) struct ListenerRegistry {
    buckets: HashMap<String, Vec<ListenerEntry>>,
}

impl ListenerRegistry {
    /// Appends an entry to the event's bucket, creating the bucket if absent.
    pub fn append(&mut self, event: &str, id: ListenerId, handler: Handler) {
        self.buckets
            .entry(event.to_owned())
            .or_default()
            .push(ListenerEntry { id, handler });
    }

    /// True if the event has a (necessarily non-empty) bucket.
    pub fn contains(&self, event: &str) -> bool {
        self.buckets.contains_key(event)
    }

    /// Ordered handler snapshot for one event; fresh empty vec when absent.
    pub fn snapshot(&self, event: &str) -> Vec<Handler> {
        self.buckets
            .get(event)
            .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }

    /// Full snapshot of every bucket, entries included.
    pub fn snapshot_all(&self) -> HashMap<String, Vec<ListenerEntry>> {
        self.buckets.clone()
    }

    /// Number of entries registered for one event.
    pub fn count(&self, event: &str) -> usize {
        self.buckets.get(event).map_or(0, Vec::len)
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Removes the first entry whose handler is identical to `handler`.
    ///
    /// Deletes the bucket if it becomes empty. No-op when the event or the
    /// handler is unknown.
    pub fn remove_handler(&mut self, event: &str, handler: &Handler) -> bool {
        let Some(entries) = self.buckets.get_mut(event) else {
            return false;
        };
        let Some(pos) = entries.iter().position(|e| e.handler.same(handler)) else {
            return false;
        };
        entries.remove(pos);
        if entries.is_empty() {
            self.buckets.remove(event);
        }
        true
    }

    /// Deletes one event's bucket outright.
    pub fn remove_event(&mut self, event: &str) {
        self.buckets.remove(event);
    }

    /// Removes entries matching `id`: at most one per bucket, every bucket
    /// scanned. Returns whether anything was removed.
    pub fn clean(&mut self, id: &ListenerId) -> bool {
        let mut cleaned = false;
        self.buckets.retain(|_, entries| {
            if let Some(pos) = entries.iter().position(|e| e.id == *id) {
                entries.remove(pos);
                cleaned = true;
            }
            !entries.is_empty()
        });
        cleaned
    }

    /// Drops every bucket.
    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> Handler {
        Handler::new(|_| {})
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let mut reg = ListenerRegistry::default();
        let first = handler();
        let second = handler();
        reg.append("tick", ListenerId::Seq(1), first.clone());
        reg.append("tick", ListenerId::Seq(2), second.clone());

        let snap = reg.snapshot("tick");
        assert_eq!(snap.len(), 2);
        assert!(snap[0].same(&first));
        assert!(snap[1].same(&second));
    }

    #[test]
    fn test_snapshot_of_unknown_event_is_fresh_and_non_mutating() {
        let reg = ListenerRegistry::default();
        assert!(reg.snapshot("nothing").is_empty());
        assert_eq!(reg.bucket_count(), 0);
    }

    #[test]
    fn test_remove_handler_takes_first_match_and_drops_empty_bucket() {
        let mut reg = ListenerRegistry::default();
        let h = handler();
        reg.append("tick", ListenerId::Seq(1), h.clone());
        reg.append("tick", ListenerId::Seq(2), h.clone());

        assert!(reg.remove_handler("tick", &h));
        assert_eq!(reg.count("tick"), 1);
        assert!(reg.remove_handler("tick", &h));
        assert!(!reg.contains("tick"), "emptied bucket must be deleted");
        assert!(!reg.remove_handler("tick", &h));
    }

    #[test]
    fn test_clean_spans_buckets_but_takes_one_match_each() {
        let mut reg = ListenerRegistry::default();
        let id = ListenerId::from("dup");
        reg.append("a", id.clone(), handler());
        reg.append("a", id.clone(), handler());
        reg.append("b", id.clone(), handler());

        assert!(reg.clean(&id));
        assert_eq!(reg.count("a"), 1, "second collision in 'a' survives");
        assert!(!reg.contains("b"));

        assert!(reg.clean(&id));
        assert!(!reg.clean(&id));
        assert_eq!(reg.bucket_count(), 0);
    }
}
