// Per-vehicle state: containment memory and latest positions

mod containment;
mod vehicles;

pub use containment::{ContainmentState, Transition};
pub use vehicles::{SampleOutcome, VehiclePositionSample, VehicleTracker};
