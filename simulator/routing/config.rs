// Routing Simulator Configuration

use pcn_rust::{DistributionError, NetworkConfig, WeightedDistribution, DEFAULT_MAX_ID};

// ============================================================================
// Distribution Specs
// ============================================================================

/// A weighted distribution described as plain data, buildable from YAML.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DistributionSpec {
    /// Lowest sampled value
    pub min: f64,

    /// `(upper_bound, weight)` pairs with strictly increasing bounds
    pub weighted_values: Vec<(f64, f64)>,

    /// Smoothing passes applied after construction
    #[serde(default)]
    pub smoothen_passes: usize,
}

impl DistributionSpec {
    pub fn build(&self) -> Result<WeightedDistribution, DistributionError> {
        let mut dist = WeightedDistribution::new(self.min, &self.weighted_values)?;
        dist.smoothen(self.smoothen_passes);
        Ok(dist)
    }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Main configuration for a routing comparison simulation
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct RoutingSimConfig {
    /// Number of nodes to generate
    pub num_nodes: usize,

    /// Number of source/target pairs to query
    pub num_queries: usize,

    /// Value each query tries to route
    pub transfer_value: u64,

    /// Size of the circular id space
    pub max_id: u64,

    /// Random seed for reproducibility
    pub seed: Option<[u8; 32]>,

    /// Per-channel deposit distribution
    pub deposit_dist: DistributionSpec,

    /// Target out-degree distribution (truncated to integers)
    pub degree_dist: DistributionSpec,

    /// Escalating hop budgets for the recursive strategy
    pub hop_schedule: Vec<usize>,
}

impl Default for RoutingSimConfig {
    fn default() -> Self {
        Self {
            num_nodes: 100,
            num_queries: 10,
            transfer_value: 2,
            max_id: DEFAULT_MAX_ID,
            seed: None,
            deposit_dist: DistributionSpec {
                min: 10.0,
                weighted_values: vec![(100.0, 30.0), (1000.0, 20.0), (10000.0, 10.0)],
                smoothen_passes: 10,
            },
            degree_dist: DistributionSpec {
                min: 5.0,
                weighted_values: vec![(10.0, 100.0)],
                smoothen_passes: 0,
            },
            hop_schedule: pcn_rust::DEFAULT_HOP_SCHEDULE.to_vec(),
        }
    }
}

impl RoutingSimConfig {
    /// Validate the distribution specs and build the library-level network
    /// configuration.
    pub fn network_config(&self) -> Result<NetworkConfig, DistributionError> {
        Ok(NetworkConfig {
            num_nodes: self.num_nodes,
            max_id: self.max_id,
            degree_dist: self.degree_dist.build()?,
            deposit_dist: self.deposit_dist.build()?,
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "{} nodes, {} queries, value {}, hop schedule {:?}",
            self.num_nodes, self.num_queries, self.transfer_value, self.hop_schedule
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds() {
        let config = RoutingSimConfig::default();
        let net_config = config.network_config().unwrap();
        assert_eq!(net_config.num_nodes, 100);
        // smoothing kept the configured probability mass
        assert!((net_config.deposit_dist.total_weight() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_spec_is_rejected() {
        let spec = DistributionSpec {
            min: 10.0,
            weighted_values: vec![(5.0, 1.0)],
            smoothen_passes: 0,
        };
        assert!(matches!(
            spec.build(),
            Err(DistributionError::NonIncreasingBounds { .. })
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let yaml = r#"
num_nodes: 50
transfer_value: 5
deposit_dist:
  min: 1.0
  weighted_values: [[10.0, 90.0], [100.0, 10.0]]
  smoothen_passes: 2
"#;
        let config: RoutingSimConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.num_nodes, 50);
        assert_eq!(config.transfer_value, 5);
        assert_eq!(config.deposit_dist.smoothen_passes, 2);
        // missing fields fall back to defaults
        assert_eq!(config.num_queries, 10);
        assert_eq!(config.hop_schedule, vec![5, 10, 15, 50]);
    }
}
