//! Basic routing comparison with the default configuration
//!
//! Run with: cargo run --example basic_simulation

use log::info;
use simple_logger::SimpleLogger;

mod routing;
use routing::{RoutingSimConfig, RoutingSimRunner};

fn main() {
    SimpleLogger::new().init().unwrap();

    info!("Setting up simulation...");

    let config = RoutingSimConfig {
        num_nodes: 1000,
        num_queries: 5,
        transfer_value: 2,
        seed: None, // Will be auto-generated
        ..Default::default()
    };

    info!("Starting simulation...");

    let runner = RoutingSimRunner::new(config);
    let result = runner.run().expect("default distributions are valid");

    info!("Simulation complete!");
    info!("Seed used: {:?}", result.seed_used);

    result.print_summary();
}
