// Geometry primitives
pub mod geo;

// Geofence definitions, validation and registry
pub mod geofence;

// Containment memory and latest vehicle positions
pub mod state;

// Rule evaluation
pub mod rules;

// Alert cooldown gate
pub mod cooldown;

// Detected geofence events
pub mod event;

// Detection engine and tick loop
pub mod engine;

// Event sinks
pub mod sink;

// Input feeds
pub mod feed;

// NATS client integration
pub mod nats;

// Engine metrics
pub mod metrics;

// Configuration
pub mod config;
