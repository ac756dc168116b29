//! # Capability composition
//!
//! A plain struct acquires the full hub surface by embedding an [`EventHub`]
//! and implementing [`EventHost`]. Two workers sharing one hub see each
//! other's events; a worker with its own hub is isolated.
//!
//! ## Run
//! ```bash
//! cargo run --example capability
//! ```

use eventhub::{EventHost, EventHub, Handler};
use serde_json::json;

struct Worker {
    name: &'static str,
    events: EventHub,
}

impl EventHost for Worker {
    fn events(&self) -> &EventHub {
        &self.events
    }
}

fn main() {
    let shared = EventHub::new();
    let producer = Worker { name: "producer", events: shared.clone() };
    let consumer = Worker { name: "consumer", events: shared };
    let lone = Worker { name: "lone", events: EventHub::new() };

    consumer.on(
        "work.ready",
        &Handler::new(|args| println!("[consumer] picked up {}", args[0])),
    );
    lone.on(
        "work.ready",
        &Handler::new(|args| println!("[lone] this never prints: {}", args[0])),
    );

    // The consumer shares the producer's hub; the lone worker does not.
    producer.emit("work.ready", &[json!("batch-7")]);

    for worker in [&producer, &consumer, &lone] {
        println!(
            "{}: {} listener(s) for work.ready",
            worker.name,
            worker.listeners_of("work.ready").len()
        );
    }
}
