// Routing Simulator Module

pub mod config;
pub mod runner;
pub mod stats;

// Re-export commonly used types
pub use config::{DistributionSpec, RoutingSimConfig};
pub use runner::RoutingSimRunner;
pub use stats::{QueryRecord, SimulationResult};
