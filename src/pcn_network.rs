// Channel Network Topology
//
// Owns all nodes and the central channel store, generates nodes from
// configured distributions, runs the connection protocol and answers
// nearest-id queries over the sorted id space.

use indexmap::IndexMap;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use crate::pcn_channel::{Channel, ChannelView, Side};
use crate::pcn_distribution::WeightedDistribution;
use crate::pcn_interface::{ring_distance, ChannelIndex, NodeId, NodeKind, DEFAULT_MAX_ID};

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for network generation
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of nodes to generate
    pub num_nodes: usize,

    /// Size of the circular id space
    pub max_id: u64,

    /// Distribution of target out-degrees (truncated to integers)
    pub degree_dist: WeightedDistribution,

    /// Distribution of per-channel deposits (truncated to integers)
    pub deposit_dist: WeightedDistribution,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        // a few rich nodes, many small ones
        let mut deposit_dist =
            WeightedDistribution::new(10.0, &[(100.0, 30.0), (1000.0, 20.0), (10000.0, 10.0)])
                .expect("static distribution is valid");
        deposit_dist.smoothen(10);
        let degree_dist = WeightedDistribution::new(5.0, &[(10.0, 100.0)])
            .expect("static distribution is valid");
        Self {
            num_nodes: 100,
            max_id: DEFAULT_MAX_ID,
            degree_dist,
            deposit_dist,
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// A peer in the channel network.
///
/// Holds sampled attributes and the indices of its channels in the network's
/// central store; channel state itself is never duplicated per endpoint.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    num_channels: usize,
    deposit_per_channel: u64,
    channels: Vec<ChannelIndex>,
    initiated: usize,
    weakly_connected: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, num_channels: usize, deposit_per_channel: u64) -> Self {
        Self {
            id,
            kind,
            num_channels,
            deposit_per_channel,
            channels: Vec::new(),
            initiated: 0,
            weakly_connected: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Target out-degree used when initiating connections.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn deposit_per_channel(&self) -> u64 {
        self.deposit_per_channel
    }

    /// Indices into the network's channel store, in creation order.
    pub fn channels(&self) -> &[ChannelIndex] {
        &self.channels
    }

    /// How many of this node's channels it initiated itself.
    pub fn initiated(&self) -> usize {
        self.initiated
    }

    pub fn is_weakly_connected(&self) -> bool {
        self.weakly_connected
    }

    /// Whether this node accepts a partner bringing `other_deposit` of
    /// collateral: at least half of its own per-channel deposit. Saturating,
    /// so deposits near `u64::MAX` always clear the threshold.
    pub fn accepts_deposit(&self, other_deposit: u64) -> bool {
        other_deposit.saturating_mul(2) >= self.deposit_per_channel
    }

    /// Connection targets at geometrically decaying offsets,
    /// `(id + 2 * max_id / 2^k / 3) mod max_id` for `k = 1..=num_channels`.
    /// Spreads channels across distance scales, with a third of the id space
    /// as the largest offset.
    pub fn connection_targets(&self, max_id: u64) -> Vec<NodeId> {
        (1..=self.num_channels as u32)
            .map(|k| {
                let offset = (max_id << 1).checked_shr(k).unwrap_or(0) / 3;
                (self.id + offset) % max_id
            })
            .collect()
    }
}

// ============================================================================
// Network
// ============================================================================

/// The whole simulated network: node index, sorted id sequence and the
/// central channel store.
///
/// Topology mutation (generation, connection) takes `&mut self` and must
/// finish before path queries start; queries only ever take `&self`.
#[derive(Debug)]
pub struct ChannelNetwork {
    max_id: u64,
    node_by_id: IndexMap<NodeId, Node>,
    /// Node ids in ascending order, the search space for nearest-id queries.
    node_ids: Vec<NodeId>,
    channels: Vec<Channel>,
}

impl ChannelNetwork {
    pub fn new(max_id: u64) -> Self {
        Self {
            max_id,
            node_by_id: IndexMap::new(),
            node_ids: Vec::new(),
            channels: Vec::new(),
        }
    }

    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    pub fn num_nodes(&self) -> usize {
        self.node_by_id.len()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_by_id.get(&id)
    }

    /// All live node ids, ascending.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    /// Position of `id` in the sorted id sequence.
    pub fn node_position(&self, id: NodeId) -> Option<usize> {
        self.node_ids.binary_search(&id).ok()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: ChannelIndex) -> &Channel {
        &self.channels[index]
    }

    pub fn channel_mut(&mut self, index: ChannelIndex) -> &mut Channel {
        &mut self.channels[index]
    }

    /// `node`'s channels as per-side views, in creation order.
    pub fn channel_views(&self, node: NodeId) -> impl Iterator<Item = ChannelView<'_>> {
        let indices = self
            .node_by_id
            .get(&node)
            .map(|n| n.channels.as_slice())
            .unwrap_or(&[]);
        indices
            .iter()
            .map(move |&i| ChannelView::new(&self.channels[i], node))
    }

    pub fn is_partner(&self, a: NodeId, b: NodeId) -> bool {
        self.channel_views(a).any(|cv| cv.partner() == b)
    }

    /// Insert a pre-built node. Ids must be unique among live nodes.
    pub fn insert_node(&mut self, node: Node) {
        let id = node.id();
        assert!(id < self.max_id, "node id {} outside id space", id);
        let prev = self.node_by_id.insert(id, node);
        assert!(prev.is_none(), "node id {} already live", id);
        let pos = self.node_ids.binary_search(&id).unwrap_err();
        self.node_ids.insert(pos, id);
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Generate `config.num_nodes` full nodes with sampled degree and deposit
    /// and fresh unique ids. Id collisions are recoverable: resample.
    pub fn generate_nodes(&mut self, config: &NetworkConfig, rng: &mut StdRng) {
        for _ in 0..config.num_nodes {
            let uid = loop {
                let uid = rng.gen_range(0..self.max_id);
                if !self.node_by_id.contains_key(&uid) {
                    break uid;
                }
                debug!("node id collision on {}, resampling", uid);
            };
            let num_channels = config.degree_dist.sample_with(rng) as usize;
            let deposit_per_channel = config.deposit_dist.sample_with(rng) as u64;
            self.insert_node(Node::new(uid, NodeKind::FullNode, num_channels, deposit_per_channel));
        }
        info!("generated {} nodes", self.num_nodes());
    }

    // ========================================================================
    // Connection protocol
    // ========================================================================

    /// Let every node initiate its channels, then prune nodes that ended up
    /// with none and flag nodes with a single channel as weakly connected.
    pub fn connect_nodes(&mut self) {
        let ids: Vec<NodeId> = self.node_ids.clone();
        for id in &ids {
            self.initiate_channels(*id);
        }

        let unconnected: Vec<NodeId> = self
            .node_by_id
            .values()
            .filter(|n| n.channels.is_empty())
            .map(|n| n.id)
            .collect();
        for id in unconnected {
            info!("not connected, pruning node {}", id);
            self.node_by_id.shift_remove(&id);
            let pos = self.node_ids.binary_search(&id).expect("id is live");
            self.node_ids.remove(pos);
        }

        for node in self.node_by_id.values_mut() {
            if node.channels.len() == 1 {
                debug!("weakly connected node {}", node.id);
                node.weakly_connected = true;
            }
        }
        info!(
            "connected network: {} nodes, {} channels",
            self.num_nodes(),
            self.num_channels()
        );
    }

    /// Walk the candidate sequence for each connection target until a
    /// candidate also accepts us, then open one channel and move on to the
    /// next target. Refusal is a normal negotiation outcome, not an error.
    fn initiate_channels(&mut self, id: NodeId) {
        let node = &self.node_by_id[&id];
        let targets = node.connection_targets(self.max_id);
        let own_deposit = node.deposit_per_channel;

        for target in targets {
            // only consider candidates whose deposit clears our own threshold
            let candidates = self
                .closest_ids(target, |n| n.deposit_per_channel.saturating_mul(2) >= own_deposit);
            for candidate in candidates {
                if self.connect_requested(candidate, id) && self.connect_requested(id, candidate) {
                    self.add_channel(id, candidate);
                    self.node_by_id[&id].initiated += 1;
                    break;
                }
            }
        }
    }

    /// Whether `this` accepts a channel request from `other`: mutual deposit
    /// threshold, no second channel to the same partner, no self-channels.
    fn connect_requested(&self, this: NodeId, other: NodeId) -> bool {
        if this == other {
            return false;
        }
        let this_node = &self.node_by_id[&this];
        let other_node = &self.node_by_id[&other];
        if !this_node.accepts_deposit(other_node.deposit_per_channel) {
            return false;
        }
        !self.is_partner(this, other)
    }

    /// Create the single channel between `a` and `b`, each side depositing
    /// its own configured per-channel amount, balance zero.
    pub fn add_channel(&mut self, a: NodeId, b: NodeId) -> ChannelIndex {
        debug_assert!(
            !self.is_partner(a, b),
            "duplicate channel between {} and {}",
            a,
            b
        );
        let mut channel = Channel::new(a, b);
        let deposit_a = self.node_by_id[&channel.node_a()].deposit_per_channel;
        let deposit_b = self.node_by_id[&channel.node_b()].deposit_per_channel;
        channel.set_deposit(Side::A, deposit_a);
        channel.set_deposit(Side::B, deposit_b);

        let index = self.channels.len();
        self.channels.push(channel);
        self.node_by_id[&a].channels.push(index);
        self.node_by_id[&b].channels.push(index);
        index
    }

    // ========================================================================
    // Nearest-id search
    // ========================================================================

    /// The id closest to `target` among nodes satisfying `predicate`.
    ///
    /// Binary search over the sorted id sequence with linear (non-circular)
    /// distance, a deliberate simplification: candidates at the very ends of
    /// the id line don't compete across the wrap-around. Ties go to the lower
    /// id.
    pub fn closest_node_id<F>(&self, target: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        let ids = self.eligible_ids(&predicate);
        Self::closest_position(&ids, target).map(|pos| ids[pos])
    }

    /// Lazily walk eligible ids outward from the circularly nearest match,
    /// always emitting whichever open direction is currently circularly
    /// closer to `target`. Exhausts after every eligible id was emitted once.
    pub fn closest_ids<F>(&self, target: NodeId, predicate: F) -> ClosestIds
    where
        F: Fn(&Node) -> bool,
    {
        let ids = self.eligible_ids(&predicate);
        // the linear search result only ever loses circularly to one of the
        // two seam ids, so those three candidates decide the starting point
        let start = Self::closest_position(&ids, target).map(|pos| {
            [pos, 0, ids.len() - 1]
                .into_iter()
                .min_by_key(|&i| (ring_distance(ids[i], target, self.max_id), ids[i]))
                .expect("candidate list is non-empty")
        });
        ClosestIds {
            remaining: ids.len(),
            left: start.unwrap_or(0),
            right: start.unwrap_or(0),
            ids,
            target,
            max_id: self.max_id,
        }
    }

    fn eligible_ids<F>(&self, predicate: &F) -> Vec<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.node_ids
            .iter()
            .copied()
            .filter(|id| predicate(&self.node_by_id[id]))
            .collect()
    }

    /// Binary search splitting the sorted id line in half until two
    /// candidates remain, then pick the nearer one.
    fn closest_position(ids: &[NodeId], target: NodeId) -> Option<usize> {
        if ids.is_empty() {
            return None;
        }
        let mut start = 0;
        let mut end = ids.len() - 1;
        while end - start > 1 {
            let mid = start + (end - start) / 2;
            if ids[mid] > target {
                end = mid;
            } else {
                start = mid;
            }
        }
        if ids[start].abs_diff(target) <= ids[end].abs_diff(target) {
            Some(start)
        } else {
            Some(end)
        }
    }
}

/// Iterator over eligible ids in ascending circular distance from a target.
///
/// Owns its snapshot of the eligible id set, so the network stays borrowable
/// while walking candidates. Each step compares the two frontier candidates'
/// circular distances and advances whichever side is closer.
pub struct ClosestIds {
    ids: Vec<NodeId>,
    target: NodeId,
    max_id: u64,
    left: usize,
    right: usize,
    remaining: usize,
}

impl Iterator for ClosestIds {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let len = self.ids.len();
        let step_left = |i: usize| (i + len - 1) % len;
        let step_right = |i: usize| (i + 1) % len;

        let id = if self.left == self.right {
            // first emission, or a single candidate left
            let id = self.ids[self.left];
            self.left = step_left(self.left);
            self.right = step_right(self.right);
            id
        } else {
            let dl = ring_distance(self.ids[self.left], self.target, self.max_id);
            let dr = ring_distance(self.ids[self.right], self.target, self.max_id);
            if dl <= dr {
                let id = self.ids[self.left];
                self.left = step_left(self.left);
                id
            } else {
                let id = self.ids[self.right];
                self.right = step_right(self.right);
                id
            }
        };
        self.remaining -= 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn fixed_degree_config(num_nodes: usize, degree: usize) -> NetworkConfig {
        // a degenerate band [degree, degree + 0.9) truncates to a constant
        let degree_dist =
            WeightedDistribution::new(degree as f64, &[(degree as f64 + 0.9, 1.0)]).unwrap();
        let mut deposit_dist =
            WeightedDistribution::new(10.0, &[(100.0, 30.0), (1000.0, 20.0), (10000.0, 10.0)])
                .unwrap();
        deposit_dist.smoothen(10);
        NetworkConfig {
            num_nodes,
            max_id: DEFAULT_MAX_ID,
            degree_dist,
            deposit_dist,
        }
    }

    fn ring_net(ids: &[NodeId], max_id: u64) -> ChannelNetwork {
        let mut net = ChannelNetwork::new(max_id);
        for &id in ids {
            net.insert_node(Node::new(id, NodeKind::FullNode, 2, 100));
        }
        net
    }

    #[test]
    fn test_generate_unique_sorted_ids() {
        let mut net = ChannelNetwork::new(DEFAULT_MAX_ID);
        let mut rng = StdRng::from_seed([7u8; 32]);
        net.generate_nodes(&fixed_degree_config(200, 5), &mut rng);

        assert_eq!(net.num_nodes(), 200);
        let ids: HashSet<NodeId> = net.node_ids().iter().copied().collect();
        assert_eq!(ids.len(), 200);
        assert!(net.node_ids().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_collision_resampled() {
        let mut net = ChannelNetwork::new(4);
        let mut rng = StdRng::from_seed([1u8; 32]);
        let config = fixed_degree_config(4, 1);
        // with max_id = 4 every slot fills, forcing collisions along the way
        net.generate_nodes(&config, &mut rng);
        assert_eq!(net.node_ids(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_closest_node_id_matches_linear_scan() {
        let mut rng = StdRng::from_seed([0u8; 32]);
        for _ in 0..50 {
            let mut ids: Vec<NodeId> = (0..100).map(|_| rng.gen_range(0..10_000)).collect();
            ids.sort_unstable();
            ids.dedup();
            let net = ring_net(&ids, 10_000);

            let target = rng.gen_range(0..10_000);
            let got = net.closest_node_id(target, |_| true).unwrap();
            // linear distance, lower id on ties, matching the search contract
            let want = ids
                .iter()
                .copied()
                .min_by_key(|id| (id.abs_diff(target), *id))
                .unwrap();
            assert_eq!(got, want, "target {}", target);
        }
    }

    #[test]
    fn test_closest_node_id_respects_predicate() {
        let net = ring_net(&[10, 20, 30, 40], 100);
        let got = net.closest_node_id(21, |n| n.id() >= 30);
        assert_eq!(got, Some(30));
        assert_eq!(net.closest_node_id(21, |_| false), None);
    }

    #[test]
    fn test_closest_ids_orders_by_distance() {
        let mut rng = StdRng::from_seed([3u8; 32]);
        for _ in 0..20 {
            let mut ids: Vec<NodeId> = (0..40).map(|_| rng.gen_range(0..1_000)).collect();
            ids.sort_unstable();
            ids.dedup();
            let net = ring_net(&ids, 1_000);
            let target = rng.gen_range(0..1_000);

            let emitted: Vec<NodeId> = net.closest_ids(target, |_| true).collect();
            assert_eq!(emitted.len(), ids.len());

            // every eligible id exactly once
            let set: HashSet<NodeId> = emitted.iter().copied().collect();
            assert_eq!(set.len(), ids.len());

            // circular distances never decrease along the walk
            let distances: Vec<u64> = emitted
                .iter()
                .map(|&id| ring_distance(id, target, 1_000))
                .collect();
            assert!(
                distances.windows(2).all(|w| w[0] <= w[1]),
                "walk not distance ordered: {:?}",
                distances
            );
        }
    }

    #[test]
    fn test_closest_ids_starts_across_seam() {
        // the linearly nearest id to the target sits mid-line, but the
        // circularly nearest one is just across the wrap-around
        let net = ring_net(&[450, 980], 1_000);
        let emitted: Vec<NodeId> = net.closest_ids(3, |_| true).collect();
        assert_eq!(emitted, vec![980, 450]);
    }

    #[test]
    fn test_closest_ids_empty_and_single() {
        let net = ring_net(&[42], 100);
        let all: Vec<NodeId> = net.closest_ids(0, |_| true).collect();
        assert_eq!(all, vec![42]);
        let none: Vec<NodeId> = net.closest_ids(0, |_| false).collect();
        assert!(none.is_empty());
    }

    #[test]
    fn test_connection_targets_decay() {
        let node = Node::new(0, NodeKind::FullNode, 3, 100);
        let targets = node.connection_targets(DEFAULT_MAX_ID);
        // 2 * max_id / 2^k / 3 for k = 1, 2, 3
        assert_eq!(
            targets,
            vec![
                DEFAULT_MAX_ID / 3,
                DEFAULT_MAX_ID / 2 / 3,
                DEFAULT_MAX_ID / 4 / 3
            ]
        );
    }

    #[test]
    fn test_deposit_threshold() {
        let node = Node::new(0, NodeKind::FullNode, 1, 100);
        assert!(node.accepts_deposit(50));
        assert!(node.accepts_deposit(100));
        assert!(!node.accepts_deposit(49));
    }

    #[test]
    fn test_deposit_threshold_near_u64_max() {
        // doubling must not overflow for extreme deposits
        let whale = Node::new(0, NodeKind::FullNode, 1, u64::MAX);
        assert!(whale.accepts_deposit(u64::MAX / 2 + 1));
        assert!(!whale.accepts_deposit(u64::MAX / 4));
        let modest = Node::new(1, NodeKind::FullNode, 1, 10);
        assert!(modest.accepts_deposit(u64::MAX));
    }

    #[test]
    fn test_add_channel_sets_deposits() {
        let mut net = ring_net(&[1, 2], 100);
        let index = net.add_channel(2, 1);
        let channel = net.channel(index);
        assert_eq!(channel.node_a(), 1);
        assert_eq!(channel.deposit(Side::A), 100);
        assert_eq!(channel.deposit(Side::B), 100);
        assert_eq!(channel.balance(Side::A), 0);
        assert!(net.is_partner(1, 2));
        assert!(net.is_partner(2, 1));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_add_channel_rejects_duplicate() {
        let mut net = ring_net(&[1, 2], 100);
        net.add_channel(1, 2);
        net.add_channel(2, 1);
    }

    #[test]
    fn test_connect_scenario() {
        let mut net = ChannelNetwork::new(DEFAULT_MAX_ID);
        let mut rng = StdRng::from_seed([9u8; 32]);
        net.generate_nodes(&fixed_degree_config(100, 10), &mut rng);
        net.connect_nodes();

        assert!(net.num_nodes() > 0);
        for &id in net.node_ids() {
            let node = net.node(id).unwrap();
            // pruning removed every unconnected node
            assert!(!node.channels().is_empty());
            // a node never initiates more channels than its target degree
            assert!(node.initiated() <= node.num_channels());
            assert_eq!(node.is_weakly_connected(), node.channels().len() == 1);

            // no duplicate edges, no self edges
            let partners: Vec<NodeId> = net.channel_views(id).map(|cv| cv.partner()).collect();
            let unique: HashSet<NodeId> = partners.iter().copied().collect();
            assert_eq!(partners.len(), unique.len());
            assert!(!unique.contains(&id));
        }

        // every channel is referenced by exactly its two endpoints
        for (index, channel) in net.channels().iter().enumerate() {
            for id in [channel.node_a(), channel.node_b()] {
                let node = net.node(id).unwrap();
                assert_eq!(
                    node.channels().iter().filter(|&&i| i == index).count(),
                    1
                );
            }
        }
    }

    #[test]
    fn test_connect_refuses_poor_partners() {
        // a rich node surrounded only by nodes below half its deposit stays
        // unconnected and gets pruned
        let mut net = ChannelNetwork::new(1_000);
        net.insert_node(Node::new(500, NodeKind::FullNode, 3, 10_000));
        for id in [100, 300, 700, 900] {
            net.insert_node(Node::new(id, NodeKind::FullNode, 0, 10));
        }
        net.connect_nodes();
        assert_eq!(net.num_channels(), 0);
        assert!(net.node(500).is_none());
    }
}
