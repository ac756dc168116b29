//! # Capability trait for hub-equipped types.
//!
//! [`EventHost`] is how an arbitrary type acquires hub behavior: it embeds an
//! [`EventHub`] (composition, not inheritance and not method copying),
//! exposes it through the one required accessor, and gets the full operation
//! set as provided delegating methods.
//!
//! Sharing follows ownership: two hosts embedding clones of one hub share
//! listeners and states; hosts constructing their own hubs are fully
//! independent, even when they are the same type.

use std::any::Any;
use std::collections::HashMap;

use serde_json::Value;

use crate::error::HubError;
use crate::handler::Handler;
use crate::hub::EventHub;
use crate::registry::{ListenerEntry, ListenerId};

/// Contract for types carrying an embedded event hub.
///
/// Only [`EventHost::events`] is required; every other method delegates to
/// the embedded hub and keeps its exact semantics.
///
/// # Example
/// ```
/// use eventhub::{EventHost, EventHub, Handler};
///
/// struct Service {
///     events: EventHub,
/// }
///
/// impl EventHost for Service {
///     fn events(&self) -> &EventHub {
///         &self.events
///     }
/// }
///
/// let svc = Service { events: EventHub::new() };
/// let id = svc.on("ready", &Handler::new(|_| {}));
/// svc.emit("ready", &[]);
/// assert!(svc.clean(&id));
/// ```
pub trait EventHost {
    /// The embedded hub backing this host.
    fn events(&self) -> &EventHub;

    /// See [`EventHub::on`].
    fn on(&self, event: &str, handler: &Handler) -> ListenerId {
        self.events().on(event, handler)
    }

    /// See [`EventHub::on_with_id`].
    fn on_with_id(&self, event: &str, handler: &Handler, id: impl Into<ListenerId>) -> ListenerId {
        self.events().on_with_id(event, handler, id)
    }

    /// See [`EventHub::on_any`].
    fn on_any(&self, event: &str, listener: Box<dyn Any>) -> Result<ListenerId, HubError> {
        self.events().on_any(event, listener)
    }

    /// See [`EventHub::once`].
    fn once(&self, event: &str, handler: &Handler) -> ListenerId {
        self.events().once(event, handler)
    }

    /// See [`EventHub::once_with_id`].
    fn once_with_id(&self, event: &str, handler: &Handler, id: impl Into<ListenerId>) -> ListenerId {
        self.events().once_with_id(event, handler, id)
    }

    /// See [`EventHub::on_state`].
    fn on_state(&self, state: &str, handler: &Handler) {
        self.events().on_state(state, handler)
    }

    /// See [`EventHub::remove_listener`].
    fn remove_listener(&self, event: &str, handler: &Handler) {
        self.events().remove_listener(event, handler)
    }

    /// See [`EventHub::remove_all_listeners`].
    fn remove_all_listeners(&self, event: Option<&str>) {
        self.events().remove_all_listeners(event)
    }

    /// See [`EventHub::listeners_of`].
    fn listeners_of(&self, event: &str) -> Vec<Handler> {
        self.events().listeners_of(event)
    }

    /// See [`EventHub::all_listeners`].
    fn all_listeners(&self) -> HashMap<String, Vec<ListenerEntry>> {
        self.events().all_listeners()
    }

    /// See [`EventHub::emit`].
    fn emit(&self, event: &str, args: &[Value]) {
        self.events().emit(event, args)
    }

    /// See [`EventHub::emit_state`].
    fn emit_state(&self, state: &str) {
        self.events().emit_state(state)
    }

    /// See [`EventHub::check_state`].
    fn check_state(&self, state: &str) -> bool {
        self.events().check_state(state)
    }

    /// See [`EventHub::clear_state`].
    fn clear_state(&self, state: &str) {
        self.events().clear_state(state)
    }

    /// See [`EventHub::set_catch`].
    fn set_catch(&self, event: &str) {
        self.events().set_catch(event)
    }

    /// See [`EventHub::set_catch_all`].
    fn set_catch_all(&self, handler: Option<Handler>) {
        self.events().set_catch_all(handler)
    }

    /// See [`EventHub::clean`].
    fn clean(&self, id: &ListenerId) -> bool {
        self.events().clean(id)
    }

    /// See [`EventHub::uncaught_count`].
    fn uncaught_count(&self) -> u64 {
        self.events().uncaught_count()
    }

    /// See [`EventHub::clear`].
    fn clear(&self) {
        self.events().clear()
    }
}
