//! # eventhub
//!
//! **Eventhub** is a synchronous, single-threaded, in-process
//! publish/subscribe hub.
//!
//! Beyond plain listener registration it provides four coupled mechanisms:
//! - **identity-addressed removal** — registrations carry a [`ListenerId`]
//!   (hub-assigned or caller-supplied) for targeted cleanup, and handlers
//!   themselves compare by identity for `remove_listener`;
//! - **sticky states** — one-shot conditions that fire late subscribers
//!   immediately once reached ([`EventHub::emit_state`]);
//! - **fallback delivery** — a single catch-all callback for events nobody
//!   listens to, and per-event catch buffers that hold early emissions until
//!   the first listener attaches, then replay them in order;
//! - **capability composition** — any type embedding a hub gets the full
//!   operation set through the [`EventHost`] trait.
//!
//! ## Architecture
//! ```text
//!            on/once/on_state/set_catch            emit/emit_state
//!                      │                                 │
//!                      ▼                                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventHub (dispatch & delivery-or-buffer decisions)               │
//! │  - catch_all: Option<Handler>                                     │
//! │  - id_seq / uncaught counters                                     │
//! └──────┬──────────────────────┬──────────────────────┬──────────────┘
//!        ▼                      ▼                      ▼
//! ┌──────────────┐      ┌──────────────┐      ┌──────────────┐
//! │ Listener     │      │ State        │      │ Catch        │
//! │ Registry     │      │ Registry     │      │ Registry     │
//! │ name → [(id, │      │ name →       │      │ name →       │
//! │  handler)]   │      │ reached |    │      │ [arg tuples] │
//! │              │      │ pending[]    │      │              │
//! └──────────────┘      └──────────────┘      └──────────────┘
//! ```
//!
//! Everything runs on the calling thread and completes before the
//! triggering call returns; handlers may re-enter the hub they were invoked
//! from. See [`EventHub`] for the dispatch priority order.
//!
//! ## Example
//! ```rust
//! use eventhub::{EventHub, Handler};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let hub = EventHub::new();
//! let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
//!
//! // Buffer packets until someone is ready for them.
//! hub.set_catch("net.packet");
//! hub.emit("net.packet", &[json!("early")]);
//!
//! let sink = Handler::new({
//!     let log = Rc::clone(&log);
//!     move |args| log.borrow_mut().push(args[0].as_str().unwrap().to_owned())
//! });
//! hub.on("net.packet", &sink); // replays "early" before returning
//! hub.emit("net.packet", &[json!("live")]);
//!
//! assert_eq!(*log.borrow(), ["early", "live"]);
//!
//! // Sticky state: late subscribers fire immediately.
//! hub.emit_state("ready");
//! let saw_ready = Rc::new(std::cell::Cell::new(false));
//! hub.on_state("ready", &Handler::nullary({
//!     let saw_ready = Rc::clone(&saw_ready);
//!     move || saw_ready.set(true)
//! }));
//! assert!(saw_ready.get());
//! ```

mod capability;
mod error;
mod handler;
mod hub;
mod registry;

pub use capability::EventHost;
pub use error::HubError;
pub use handler::{Handler, WeakHandler};
pub use hub::EventHub;
pub use registry::{ListenerEntry, ListenerId};

pub use serde_json::Value;
