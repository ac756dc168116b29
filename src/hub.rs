//! # Event hub: registration, dispatch, and the delivery-or-buffer decision.
//!
//! [`EventHub`] coordinates the three registries plus the optional catch-all
//! fallback. It is the only component with cross-registry logic; the
//! registries themselves never invoke anything.
//!
//! ## Dispatch priority
//! ```text
//! emit(event, args)
//!   ├─ 1. catch-all set, no listener bucket, no catch bucket?
//!   │      └─► catch_all(event, args...)
//!   ├─ 2. invoke listener snapshot in registration order
//!   ├─ 3. catch bucket present, listener bucket absent?   (live check)
//!   │      └─► buffer args for later replay
//!   └─ 4. nothing above applied?                          (live check)
//!          └─► uncaught += 1
//! ```
//!
//! ## Rules
//! - Every handler invocation completes before the triggering call returns;
//!   nothing is deferred.
//! - No internal borrow is held across a handler invocation, so handlers may
//!   re-enter the hub they were invoked from (`emit`, `on`,
//!   `remove_listener`, ... are all fair game mid-dispatch).
//! - Dispatch iterates a snapshot taken at emit time: entries removed during
//!   the pass still finish it; entries added during the pass fire on the
//!   next one. Removal only ever prevents *future* invocations.
//! - Steps 3 and 4 consult live registry state, after the callbacks of
//!   step 2 have run.
//!
//! ## Example
//! ```rust
//! use eventhub::{EventHub, Handler};
//! use serde_json::json;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let hub = EventHub::new();
//! let seen = Rc::new(Cell::new(0));
//! let on_packet = Handler::new({
//!     let seen = Rc::clone(&seen);
//!     move |args| {
//!         assert_eq!(args[0], json!("ping"));
//!         seen.set(seen.get() + 1);
//!     }
//! });
//!
//! hub.on("net.packet", &on_packet);
//! hub.emit("net.packet", &[json!("ping")]);
//! assert_eq!(seen.get(), 1);
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::HubError;
use crate::handler::Handler;
use crate::registry::{
    CatchRegistry, ListenerEntry, ListenerId, ListenerRegistry, StateRegistry,
};

struct Inner {
    listeners: ListenerRegistry,
    states: StateRegistry,
    catches: CatchRegistry,
    catch_all: Option<Handler>,
    id_seq: u64,
    uncaught: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            listeners: ListenerRegistry::default(),
            states: StateRegistry::default(),
            catches: CatchRegistry::default(),
            catch_all: None,
            id_seq: 0,
            uncaught: 0,
        }
    }
}

/// Synchronous in-process publish/subscribe hub.
///
/// Cheap to clone: clones share one underlying hub, which is what lets a
/// handler capture the hub and re-enter it, and what backs the capability
/// composition in [`EventHost`](crate::EventHost). Independently constructed
/// hubs share nothing.
///
/// Single-threaded by design (`!Send`); every operation and every handler
/// runs on the calling thread, to completion.
#[derive(Clone)]
pub struct EventHub {
    inner: Rc<RefCell<Inner>>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new())),
        }
    }

    // ---------------------------
    // Listener registration
    // ---------------------------

    /// Registers a listener, assigning the next sequence id.
    ///
    /// If a catch buffer exists for `event`, every buffered argument tuple
    /// is delivered to the *newly added* handler, in emission order, before
    /// this call returns, and the buffer is deleted.
    pub fn on(&self, event: &str, handler: &Handler) -> ListenerId {
        self.register(event, handler, None)
    }

    /// Registers a listener under a caller-supplied id.
    ///
    /// Custom ids never consume a sequence number, and their uniqueness is
    /// not enforced; collisions are addressed per bucket by [`EventHub::clean`].
    pub fn on_with_id(&self, event: &str, handler: &Handler, id: impl Into<ListenerId>) -> ListenerId {
        self.register(event, handler, Some(id.into()))
    }

    /// Registers a type-erased listener.
    ///
    /// The dynamic entry point for handler tables built at runtime; see
    /// [`Handler::from_any`] for accepted shapes. Fails with
    /// [`HubError::InvalidCallback`] before any registry write.
    pub fn on_any(&self, event: &str, listener: Box<dyn Any>) -> Result<ListenerId, HubError> {
        let handler = Handler::from_any(listener)?;
        Ok(self.register(event, &handler, None))
    }

    /// Registers a listener that removes itself after its first invocation.
    ///
    /// The returned id addresses the self-removing adapter, same contract as
    /// [`EventHub::on`] (including catch-buffer replay into the adapter).
    pub fn once(&self, event: &str, handler: &Handler) -> ListenerId {
        self.register_once(event, handler, None)
    }

    /// [`EventHub::once`] under a caller-supplied id.
    pub fn once_with_id(&self, event: &str, handler: &Handler, id: impl Into<ListenerId>) -> ListenerId {
        self.register_once(event, handler, Some(id.into()))
    }

    /// Registers a state listener.
    ///
    /// Fires immediately, synchronously, and with no arguments if the state
    /// was already reached; otherwise waits for the first transition.
    pub fn on_state(&self, state: &str, handler: &Handler) {
        let fire_now = {
            let mut inner = self.inner.borrow_mut();
            if inner.states.is_reached(state) {
                true
            } else {
                inner.states.push_pending(state, handler.clone());
                false
            }
        };
        if fire_now {
            handler.invoke(&[]);
        }
    }

    // ---------------------------
    // Listener removal
    // ---------------------------

    /// Removes the first listener identical to `handler` for `event`.
    ///
    /// Silent no-op when the event or the handler is unknown.
    pub fn remove_listener(&self, event: &str, handler: &Handler) {
        let removed = self.inner.borrow_mut().listeners.remove_handler(event, handler);
        if removed {
            trace!(event, "listener removed");
        }
    }

    /// Removes one event's listeners, or every listener when `event` is `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut inner = self.inner.borrow_mut();
        match event {
            Some(event) => inner.listeners.remove_event(event),
            None => inner.listeners.reset(),
        }
    }

    /// Removes entries matching `id` from every bucket (at most one per
    /// bucket). Returns whether at least one removal occurred.
    pub fn clean(&self, id: &ListenerId) -> bool {
        let cleaned = self.inner.borrow_mut().listeners.clean(id);
        if cleaned {
            trace!(id = %id, "listeners cleaned by id");
        }
        cleaned
    }

    // ---------------------------
    // Emission
    // ---------------------------

    /// Emits `event` with the given argument tuple.
    ///
    /// See the module docs for the full priority order. Pass `&[]` for an
    /// argument-less emission.
    pub fn emit(&self, event: &str, args: &[Value]) {
        let fallback = {
            let inner = self.inner.borrow();
            if inner.catch_all.is_some()
                && !inner.listeners.contains(event)
                && !inner.catches.contains(event)
            {
                inner.catch_all.clone()
            } else {
                None
            }
        };
        if let Some(catch_all) = fallback {
            let mut prefixed = Vec::with_capacity(args.len() + 1);
            prefixed.push(Value::String(event.to_owned()));
            prefixed.extend_from_slice(args);
            catch_all.invoke(&prefixed);
        }

        let snapshot = self.inner.borrow().listeners.snapshot(event);
        for handler in &snapshot {
            handler.invoke(args);
        }

        let mut inner = self.inner.borrow_mut();
        if inner.catches.contains(event) && !inner.listeners.contains(event) {
            inner.catches.push(event, args.to_vec());
            debug!(event, "emission buffered for later replay");
        }
        if inner.catch_all.is_none()
            && !inner.catches.contains(event)
            && !inner.listeners.contains(event)
        {
            inner.uncaught += 1;
            debug!(event, total = inner.uncaught, "emission had no receiver");
        }
    }

    /// Marks a state reached, firing its pending listeners in registration
    /// order with no arguments. Idempotent until [`EventHub::clear_state`].
    pub fn emit_state(&self, state: &str) {
        let pending = self.inner.borrow_mut().states.reach(state);
        if let Some(handlers) = pending {
            trace!(state, pending = handlers.len(), "state reached");
            for handler in &handlers {
                handler.invoke(&[]);
            }
        }
    }

    // ---------------------------
    // States & catches
    // ---------------------------

    /// True iff the state has been reached.
    #[must_use]
    pub fn check_state(&self, state: &str) -> bool {
        self.inner.borrow().states.is_reached(state)
    }

    /// Returns the state to "not yet reached", discarding pending listeners.
    pub fn clear_state(&self, state: &str) {
        self.inner.borrow_mut().states.clear(state);
    }

    /// Declares `event` catchable: emissions arriving before the first
    /// listener are buffered instead of dropped.
    ///
    /// No-op when the event already has listeners or a catch buffer.
    pub fn set_catch(&self, event: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.listeners.contains(event) {
            inner.catches.declare(event);
        }
    }

    /// Installs, replaces, or unsets the catch-all fallback.
    ///
    /// The catch-all fires only for events with neither listeners nor a
    /// catch buffer, and receives the event name prepended to the arguments.
    pub fn set_catch_all(&self, handler: Option<Handler>) {
        self.inner.borrow_mut().catch_all = handler;
    }

    // ---------------------------
    // Introspection & reset
    // ---------------------------

    /// Ordered handler snapshot for one event; empty when none registered.
    #[must_use]
    pub fn listeners_of(&self, event: &str) -> Vec<Handler> {
        self.inner.borrow().listeners.snapshot(event)
    }

    /// Snapshot of every bucket, ids included.
    #[must_use]
    pub fn all_listeners(&self) -> HashMap<String, Vec<ListenerEntry>> {
        self.inner.borrow().listeners.snapshot_all()
    }

    /// Number of listeners registered for one event.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.borrow().listeners.count(event)
    }

    /// Count of emissions that matched no listener, no catch buffer, and no
    /// catch-all. Diagnostic only.
    #[must_use]
    pub fn uncaught_count(&self) -> u64 {
        self.inner.borrow().uncaught
    }

    /// Resets the hub to its freshly constructed condition: all registries,
    /// the catch-all, the id sequence, and the uncaught counter.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.listeners.reset();
        inner.states.reset();
        inner.catches.reset();
        inner.catch_all = None;
        inner.id_seq = 0;
        inner.uncaught = 0;
        debug!("hub reset");
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn register(&self, event: &str, handler: &Handler, custom: Option<ListenerId>) -> ListenerId {
        let (id, buffered) = {
            let mut inner = self.inner.borrow_mut();
            let id = custom.unwrap_or_else(|| {
                inner.id_seq += 1;
                ListenerId::Seq(inner.id_seq)
            });
            inner.listeners.append(event, id.clone(), handler.clone());
            (id, inner.catches.take(event))
        };
        trace!(event, id = %id, "listener registered");

        if let Some(buffered) = buffered {
            debug!(event, replayed = buffered.len(), "catch buffer drained into new listener");
            for args in buffered {
                handler.invoke(&args);
            }
        }
        id
    }

    fn register_once(&self, event: &str, handler: &Handler, custom: Option<ListenerId>) -> ListenerId {
        // The adapter needs its own identity to remove itself; the weak
        // slot breaks the closure → handle → closure cycle so a removed
        // adapter is actually dropped.
        let self_slot = Rc::new(RefCell::new(None));
        let wrapper = Handler::new({
            let hub = self.clone();
            let event = event.to_owned();
            let target = handler.clone();
            let self_slot = Rc::clone(&self_slot);
            move |args| {
                let me: Option<Handler> = self_slot
                    .borrow()
                    .as_ref()
                    .and_then(crate::handler::WeakHandler::upgrade);
                if let Some(me) = me {
                    hub.remove_listener(&event, &me);
                }
                target.invoke(args);
            }
        });
        *self_slot.borrow_mut() = Some(wrapper.downgrade());
        self.register(event, &wrapper, custom)
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventHub")
            .field("events", &inner.listeners.bucket_count())
            .field("states", &inner.states.slot_count())
            .field("catches", &inner.catches.buffer_count())
            .field("catch_all", &inner.catch_all.is_some())
            .field("id_seq", &inner.id_seq)
            .field("uncaught", &inner.uncaught)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn counting() -> (Handler, Rc<Cell<usize>>) {
        let hits = Rc::new(Cell::new(0));
        let handler = Handler::new({
            let hits = Rc::clone(&hits);
            move |_| hits.set(hits.get() + 1)
        });
        (handler, hits)
    }

    #[test]
    fn test_auto_ids_are_sequential_and_custom_ids_do_not_consume_them() {
        let hub = EventHub::new();
        let (h, _) = counting();
        assert_eq!(hub.on("a", &h), ListenerId::Seq(1));
        assert_eq!(hub.on_with_id("b", &h, "tag"), ListenerId::from("tag"));
        assert_eq!(hub.on("c", &h), ListenerId::Seq(2));
    }

    #[test]
    fn test_replay_happens_before_on_returns() {
        let hub = EventHub::new();
        hub.set_catch("packets");
        hub.emit("packets", &[json!("A")]);

        let (h, hits) = counting();
        hub.on("packets", &h);
        assert_eq!(hits.get(), 1, "buffered emission must replay synchronously");
    }

    #[test]
    fn test_catch_all_skipped_when_catch_bucket_exists() {
        let hub = EventHub::new();
        let (catch_all, catch_all_hits) = counting();
        hub.set_catch_all(Some(catch_all));
        hub.set_catch("packets");

        hub.emit("packets", &[json!(1)]);
        assert_eq!(catch_all_hits.get(), 0, "catch bucket takes precedence");

        let (h, hits) = counting();
        hub.on("packets", &h);
        assert_eq!(hits.get(), 1, "buffered emission replays instead");
    }

    #[test]
    fn test_uncaught_counts_only_fully_unreceivable_emissions() {
        let hub = EventHub::new();
        hub.emit("void", &[]);
        assert_eq!(hub.uncaught_count(), 1);

        hub.set_catch("buffered");
        hub.emit("buffered", &[]);
        assert_eq!(hub.uncaught_count(), 1, "buffered emission is not uncaught");

        let (catch_all, _) = counting();
        hub.set_catch_all(Some(catch_all));
        hub.emit("void", &[]);
        assert_eq!(hub.uncaught_count(), 1, "caught-all emission is not uncaught");
    }

    #[test]
    fn test_listener_added_during_dispatch_fires_next_emit_only() {
        let hub = EventHub::new();
        let (late, late_hits) = counting();
        let adder = Handler::new({
            let hub = hub.clone();
            let late = late.clone();
            move |_| {
                if hub.listener_count("tick") == 1 {
                    hub.on("tick", &late);
                }
            }
        });
        hub.on("tick", &adder);

        hub.emit("tick", &[]);
        assert_eq!(late_hits.get(), 0, "snapshot excludes mid-dispatch additions");
        hub.emit("tick", &[]);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_listener_may_remove_itself_mid_dispatch() {
        let hub = EventHub::new();
        let slot: Rc<RefCell<Option<Handler>>> = Rc::new(RefCell::new(None));
        let (hits_handler, hits) = counting();
        let suicidal = Handler::new({
            let hub = hub.clone();
            let slot = Rc::clone(&slot);
            let hits_handler = hits_handler.clone();
            move |args| {
                let me = slot.borrow().clone();
                if let Some(me) = me {
                    hub.remove_listener("tick", &me);
                }
                hits_handler.invoke(args);
            }
        });
        *slot.borrow_mut() = Some(suicidal.clone());
        hub.on("tick", &suicidal);

        hub.emit("tick", &[]);
        hub.emit("tick", &[]);
        assert_eq!(hits.get(), 1);
        assert!(!hub.all_listeners().contains_key("tick"));
    }

    #[test]
    fn test_once_target_reemitting_same_event_fires_once() {
        let hub = EventHub::new();
        let hits = Rc::new(Cell::new(0));
        let reemitting = Handler::new({
            let hub = hub.clone();
            let hits = Rc::clone(&hits);
            move |_| {
                hits.set(hits.get() + 1);
                // Adapter already removed itself before forwarding here.
                hub.emit("boot", &[]);
            }
        });
        hub.once("boot", &reemitting);

        hub.emit("boot", &[]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_catch_all_may_register_the_missing_listener() {
        let hub = EventHub::new();
        let (direct, direct_hits) = counting();
        let catch_all = Handler::new({
            let hub = hub.clone();
            let direct = direct.clone();
            move |args| {
                assert_eq!(args[0], json!("lazy"));
                hub.on("lazy", &direct);
            }
        });
        hub.set_catch_all(Some(catch_all));

        // Step 1 installs the listener, step 2's snapshot already sees it.
        hub.emit("lazy", &[]);
        assert_eq!(direct_hits.get(), 1);
        assert_eq!(hub.uncaught_count(), 0);
    }

    #[test]
    fn test_clear_restarts_id_sequence() {
        let hub = EventHub::new();
        let (h, _) = counting();
        hub.on("a", &h);
        hub.clear();
        assert_eq!(hub.on("a", &h), ListenerId::Seq(1));
    }
}
