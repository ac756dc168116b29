//! # Basic hub walkthrough
//!
//! Shows the four delivery paths in order:
//! - direct dispatch to registered listeners
//! - sticky states firing late subscribers
//! - catch buffers replaying early emissions
//! - the catch-all fallback for everything else
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use eventhub::{EventHub, Handler};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let hub = EventHub::new();

    // Direct dispatch.
    hub.on(
        "job.done",
        &Handler::new(|args| println!("[job.done] result={}", args[0])),
    );
    hub.emit("job.done", &[json!({"rows": 42})]);

    // Sticky state: the second subscriber arrives late and still fires.
    hub.on_state("config.loaded", &Handler::nullary(|| println!("[state] first subscriber")));
    hub.emit_state("config.loaded");
    hub.on_state("config.loaded", &Handler::nullary(|| println!("[state] late subscriber")));

    // Catch buffer: packets sent before anyone listens are replayed in order.
    hub.set_catch("net.packet");
    hub.emit("net.packet", &[json!("early-1")]);
    hub.emit("net.packet", &[json!("early-2")]);
    hub.on(
        "net.packet",
        &Handler::new(|args| println!("[net.packet] {}", args[0])),
    );

    // Catch-all: fires only for events with no listener and no buffer.
    hub.set_catch_all(Some(Handler::new(|args| {
        println!("[catch-all] event={} args={:?}", args[0], &args[1..]);
    })));
    hub.emit("totally.unknown", &[json!(1), json!(2)]);

    println!("{hub:?}");
}
