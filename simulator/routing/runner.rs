// Routing Simulator Runner

use super::config::RoutingSimConfig;
use super::stats::{QueryRecord, SimulationResult};
use log::info;
use pcn_rust::{ChannelNetwork, DistributionError, NodeId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Drives one full simulation: topology formation, then a batch of path
/// queries answered by both strategies.
pub struct RoutingSimRunner {
    config: RoutingSimConfig,
    rng: StdRng,
    seed_used: [u8; 32],
}

impl RoutingSimRunner {
    /// Create a runner, generating a fresh seed when none is configured.
    pub fn new(config: RoutingSimConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill(&mut seed);
            seed
        });
        Self {
            rng: StdRng::from_seed(seed),
            seed_used: seed,
            config,
        }
    }

    /// Run the simulation to completion.
    pub fn run(mut self) -> Result<SimulationResult, DistributionError> {
        let net_config = self.config.network_config()?;

        // 1. Topology formation (the only mutating phase)
        let mut net = ChannelNetwork::new(net_config.max_id);
        net.generate_nodes(&net_config, &mut self.rng);
        let nodes_generated = net.num_nodes();
        net.connect_nodes();

        let weakly_connected = net
            .node_ids()
            .iter()
            .filter(|&&id| net.node(id).map_or(false, |n| n.is_weakly_connected()))
            .count();

        // 2. Read-only path queries
        let mut queries = Vec::with_capacity(self.config.num_queries);
        if net.num_nodes() >= 2 {
            for i in 0..self.config.num_queries {
                queries.push(self.run_query(&net, i));
            }
        }

        Ok(SimulationResult {
            config_summary: self.config.summary(),
            seed_used: self.seed_used,
            nodes_generated,
            nodes_retained: net.num_nodes(),
            weakly_connected,
            num_channels: net.num_channels(),
            queries,
        })
    }

    fn run_query(&mut self, net: &ChannelNetwork, index: usize) -> QueryRecord {
        let pair: Vec<NodeId> = net
            .node_ids()
            .choose_multiple(&mut self.rng, 2)
            .copied()
            .collect();
        let (source, target) = (pair[0], pair[1]);
        let value = self.config.transfer_value;

        let global_path = net.find_path_global(source, target, value);
        let outcome =
            net.find_path_recursive_with(source, target, value, &self.config.hop_schedule);

        info!(
            "query {}: {} -> {} | global {} | recursive {} | contacted {}",
            index,
            source,
            target,
            global_path
                .as_ref()
                .map_or("-".to_string(), |p| format!("{} hops", p.len() - 1)),
            outcome
                .path
                .as_ref()
                .map_or("-".to_string(), |p| format!("{} hops", p.len() - 1)),
            outcome.contacted
        );

        QueryRecord {
            source,
            target,
            global_path,
            recursive_path: outcome.path,
            contacted: outcome.contacted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: [u8; 32]) -> RoutingSimConfig {
        RoutingSimConfig {
            num_nodes: 40,
            num_queries: 5,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_produces_queries() {
        let result = RoutingSimRunner::new(small_config([1u8; 32])).run().unwrap();
        assert_eq!(result.seed_used, [1u8; 32]);
        assert!(result.nodes_retained <= result.nodes_generated);
        assert_eq!(result.queries.len(), 5);
        for query in &result.queries {
            assert_ne!(query.source, query.target);
        }
    }

    #[test]
    fn test_same_seed_reproduces() {
        let a = RoutingSimRunner::new(small_config([2u8; 32])).run().unwrap();
        let b = RoutingSimRunner::new(small_config([2u8; 32])).run().unwrap();
        assert_eq!(a.nodes_retained, b.nodes_retained);
        assert_eq!(a.num_channels, b.num_channels);
        for (qa, qb) in a.queries.iter().zip(&b.queries) {
            assert_eq!(qa.source, qb.source);
            assert_eq!(qa.target, qb.target);
            assert_eq!(qa.global_path, qb.global_path);
            assert_eq!(qa.recursive_path, qb.recursive_path);
            assert_eq!(qa.contacted, qb.contacted);
        }
    }
}
