//! # pcnRust - Payment-Channel Network Routing Simulation
//!
//! A Rust implementation of a decentralized payment-channel network
//! simulation, built to study how well local, partial-knowledge routing
//! performs against a global routing oracle.
//!
//! ## Core Components
//!
//! - **ChannelNetwork**: Topology owner generating nodes and running the
//!   Kademlia-inspired connection protocol over a circular id space
//! - **Channel accounting**: Bilateral collateral with one shared signed
//!   balance and derived per-side capacities
//! - **Pathfinding**: A capacity-gated shortest-path oracle and a
//!   distributed recursive search using only local channel knowledge
//! - **WeightedDistribution**: Skewed sampling for deposits and degrees
//!
//! ## Usage
//!
//! ```no_run
//! use pcn_rust::{ChannelNetwork, NetworkConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::from_seed([0u8; 32]);
//! let config = NetworkConfig::default();
//!
//! // topology formation mutates the network and must finish first
//! let mut net = ChannelNetwork::new(config.max_id);
//! net.generate_nodes(&config, &mut rng);
//! net.connect_nodes();
//!
//! // path queries are read-only and can run side by side
//! let ids = net.node_ids();
//! let (source, target) = (ids[0], ids[ids.len() - 1]);
//! let oracle_path = net.find_path_global(source, target, 2);
//! let outcome = net.find_path_recursive(source, target, 2);
//! println!("oracle: {:?}, contacted {} nodes", oracle_path, outcome.contacted);
//! ```
//!
//! ## Testing and Simulation
//!
//! For running full comparison scenarios, see the separate `simulator`
//! directory: it drives network construction and batched path queries from
//! YAML scenario files and aggregates success/message-cost statistics.

// Core modules
pub mod pcn_channel;
pub mod pcn_distribution;
pub mod pcn_interface;
pub mod pcn_layout;
pub mod pcn_network;
pub mod pcn_pathfinding;

// Re-export commonly used types
pub use pcn_channel::{Channel, ChannelView, Side};
pub use pcn_distribution::{DistributionError, WeightedDistribution};
pub use pcn_interface::{ring_distance, ChannelIndex, NodeId, NodeKind, DEFAULT_MAX_ID};
pub use pcn_layout::{channel_edges, path_edges, placements, NodePlacement};
pub use pcn_network::{ChannelNetwork, ClosestIds, NetworkConfig, Node};
pub use pcn_pathfinding::{RecursiveOutcome, DEFAULT_HOP_SCHEDULE, MAX_CONTACTED_PER_ATTEMPT};
