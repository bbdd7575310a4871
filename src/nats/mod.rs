// NATS client integration: event stream setup and feed subscriptions

mod client;
mod subscriber;

pub use client::{NatsClient, NatsConfig};
pub use subscriber::run_feed_subscriber;
