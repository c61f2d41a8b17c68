// Routing Simulator Statistics

use pcn_rust::NodeId;

// ============================================================================
// Simulation Result
// ============================================================================

/// One path query, answered by both strategies.
#[derive(Debug, Clone)]
pub struct QueryRecord {
    pub source: NodeId,
    pub target: NodeId,

    /// Oracle path, if feasible
    pub global_path: Option<Vec<NodeId>>,

    /// Recursive path, if found within the hop schedule
    pub recursive_path: Option<Vec<NodeId>>,

    /// Nodes contacted by the recursive search across all attempts
    /// (message-cost proxy)
    pub contacted: usize,
}

/// Complete simulation result
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Configuration summary
    pub config_summary: String,

    /// Random seed used
    pub seed_used: [u8; 32],

    /// Nodes sampled before connection
    pub nodes_generated: usize,

    /// Nodes retained after pruning unconnected ones
    pub nodes_retained: usize,

    /// Retained nodes with exactly one channel
    pub weakly_connected: usize,

    /// Channels established
    pub num_channels: usize,

    /// All issued path queries
    pub queries: Vec<QueryRecord>,
}

impl SimulationResult {
    pub fn global_successes(&self) -> usize {
        self.queries
            .iter()
            .filter(|q| q.global_path.is_some())
            .count()
    }

    pub fn recursive_successes(&self) -> usize {
        self.queries
            .iter()
            .filter(|q| q.recursive_path.is_some())
            .count()
    }

    /// Queries where both strategies agreed on feasibility.
    pub fn feasibility_agreements(&self) -> usize {
        self.queries
            .iter()
            .filter(|q| q.global_path.is_some() == q.recursive_path.is_some())
            .count()
    }

    /// Average hop count of successful oracle paths.
    pub fn avg_global_length(&self) -> Option<f64> {
        Self::avg_length(self.queries.iter().filter_map(|q| q.global_path.as_ref()))
    }

    /// Average hop count of successful recursive paths.
    pub fn avg_recursive_length(&self) -> Option<f64> {
        Self::avg_length(self.queries.iter().filter_map(|q| q.recursive_path.as_ref()))
    }

    /// Average number of nodes contacted per query.
    pub fn avg_contacted(&self) -> f64 {
        if self.queries.is_empty() {
            return 0.0;
        }
        self.queries.iter().map(|q| q.contacted).sum::<usize>() as f64
            / self.queries.len() as f64
    }

    fn avg_length<'a>(paths: impl Iterator<Item = &'a Vec<NodeId>>) -> Option<f64> {
        let lengths: Vec<usize> = paths.map(|p| p.len() - 1).collect();
        if lengths.is_empty() {
            return None;
        }
        Some(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64)
    }

    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║    ROUTING SIMULATION RESULTS                          ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration: {}", self.config_summary);
        println!();

        println!("═══ Topology ═══");
        println!(
            "  Nodes: {} generated, {} retained ({} weakly connected)",
            self.nodes_generated, self.nodes_retained, self.weakly_connected
        );
        println!("  Channels: {}", self.num_channels);
        println!();

        println!("═══ Pathfinding ═══");
        println!("  Queries: {}", self.queries.len());
        println!(
            "  Global oracle: {}/{} found a path",
            self.global_successes(),
            self.queries.len()
        );
        println!(
            "  Recursive: {}/{} found a path",
            self.recursive_successes(),
            self.queries.len()
        );
        println!(
            "  Feasibility agreement: {}/{}",
            self.feasibility_agreements(),
            self.queries.len()
        );
        if let Some(avg) = self.avg_global_length() {
            println!("  Avg global path length: {:.1} hops", avg);
        }
        if let Some(avg) = self.avg_recursive_length() {
            println!("  Avg recursive path length: {:.1} hops", avg);
        }
        println!("  Avg nodes contacted: {:.1}", self.avg_contacted());
    }
}
