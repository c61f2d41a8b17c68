// Pathfinding Strategies
//
// Two independent strategies over a finished topology, both read-only:
// a complete-knowledge shortest-path oracle and a distributed recursive
// search that only ever looks at one node's local channels. Queries never
// move balances, so they can run concurrently with each other.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;

use crate::pcn_interface::{ring_distance, NodeId};
use crate::pcn_network::ChannelNetwork;

/// Hop budgets tried by the recursive driver, smallest first. Early small
/// budgets approximate breadth-first discovery and keep short paths cheap;
/// the final entry is the overall recursion ceiling.
pub const DEFAULT_HOP_SCHEDULE: [usize; 4] = [5, 10, 15, 50];

/// Ceiling on nodes contacted within one bounded attempt. The hop budget
/// alone admits a combinatorial number of simple paths on dense topologies,
/// so an initiator also stops paying for messages past this many contacts.
pub const MAX_CONTACTED_PER_ATTEMPT: usize = 10_000;

/// Result of a distributed recursive search: the path (if any) and how many
/// nodes were contacted across all attempts, a proxy for message cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveOutcome {
    pub path: Option<Vec<NodeId>>,
    pub contacted: usize,
}

impl ChannelNetwork {
    /// Shortest capacity-feasible path using full topology knowledge.
    ///
    /// An edge is usable from `u` iff `u`'s outward capacity on it is at
    /// least `value`; every usable edge costs one unit, so path length is
    /// minimized subject to the capacity gate. Returns the node sequence from
    /// `source` to `target`, or `None` when no feasible path exists (a normal
    /// outcome, not an error). Deterministic for a given network and value.
    pub fn find_path_global(
        &self,
        source: NodeId,
        target: NodeId,
        value: u64,
    ) -> Option<Vec<NodeId>> {
        let src = self.node_position(source)?;
        let dst = self.node_position(target)?;
        if src == dst {
            return Some(vec![source]);
        }

        let n = self.node_ids().len();
        let mut dist = vec![u32::MAX; n];
        let mut prev = vec![usize::MAX; n];
        let mut heap = BinaryHeap::new();
        dist[src] = 0;
        heap.push(Reverse((0u32, src)));

        while let Some(Reverse((d, u))) = heap.pop() {
            if d > dist[u] {
                continue;
            }
            if u == dst {
                break;
            }
            let uid = self.node_ids()[u];
            for cv in self.channel_views(uid) {
                if cv.capacity() < value {
                    continue;
                }
                let v = self
                    .node_position(cv.partner())
                    .expect("channel partner is live");
                if d + 1 < dist[v] {
                    dist[v] = d + 1;
                    prev[v] = u;
                    heap.push(Reverse((d + 1, v)));
                }
            }
        }

        if dist[dst] == u32::MAX {
            return None;
        }
        let mut path = Vec::with_capacity(dist[dst] as usize + 1);
        let mut u = dst;
        while u != src {
            path.push(self.node_ids()[u]);
            u = prev[u];
        }
        path.push(source);
        path.reverse();
        Some(path)
    }

    /// Distributed recursive search with the default hop-budget schedule.
    pub fn find_path_recursive(
        &self,
        source: NodeId,
        target: NodeId,
        value: u64,
    ) -> RecursiveOutcome {
        self.find_path_recursive_with(source, target, value, &DEFAULT_HOP_SCHEDULE)
    }

    /// Issue one bounded attempt per schedule entry, escalating until a path
    /// is found or every budget exhausts. Contacted counts accumulate across
    /// attempts. Each attempt is bounded both by its hop budget and by
    /// [`MAX_CONTACTED_PER_ATTEMPT`]; exhausting either is an expected
    /// bounded failure, never a fault, so a miss does not prove that no
    /// feasible path exists.
    pub fn find_path_recursive_with(
        &self,
        source: NodeId,
        target: NodeId,
        value: u64,
        schedule: &[usize],
    ) -> RecursiveOutcome {
        if source == target {
            return RecursiveOutcome {
                path: Some(vec![source]),
                contacted: 0,
            };
        }
        let mut contacted = 0;
        for &budget in schedule {
            let (c, path) =
                self.recursive_step(source, target, value, budget, &[], MAX_CONTACTED_PER_ATTEMPT);
            contacted += c;
            if let Some(path) = path {
                debug_assert!(
                    {
                        let mut sorted = path.clone();
                        sorted.sort_unstable();
                        sorted.dedup();
                        sorted.len() == path.len()
                    },
                    "path revisits a node: {:?}",
                    path
                );
                return RecursiveOutcome {
                    path: Some(path),
                    contacted,
                };
            }
            debug!(
                "no path {} -> {} within {} hops, escalating",
                source, target, budget
            );
        }
        RecursiveOutcome {
            path: None,
            contacted,
        }
    }

    /// One search step at `node`, using only its local channel set.
    ///
    /// `visited` holds the nodes already on this path; each recursion gets
    /// its own copy so sibling branches never see each other's state. The
    /// explicit budget bounds recursion depth instead of leaning on the call
    /// stack limit, and `allowance` bounds the contacts this subtree may
    /// still spend; the returned count never exceeds it.
    fn recursive_step(
        &self,
        node: NodeId,
        target: NodeId,
        value: u64,
        budget: usize,
        visited: &[NodeId],
        allowance: usize,
    ) -> (usize, Option<Vec<NodeId>>) {
        if visited.contains(&node) {
            return (0, None);
        }
        let partners = self.partners_by_distance(node, target, value);
        if partners.iter().any(|&p| p == target) {
            return (0, Some(vec![node, target]));
        }
        if budget == 0 {
            return (0, None);
        }

        let mut next_visited = visited.to_vec();
        next_visited.push(node);
        let mut contacted = 0;
        for partner in partners {
            if contacted >= allowance {
                break;
            }
            let (c, path) = self.recursive_step(
                partner,
                target,
                value,
                budget - 1,
                &next_visited,
                allowance - contacted - 1,
            );
            contacted += 1 + c;
            if let Some(mut path) = path {
                path.insert(0, node);
                return (contacted, Some(path));
            }
        }
        (contacted, None)
    }

    /// `node`'s channel partners with enough outward capacity, closest to
    /// `target` first (circular distance, ties by id).
    fn partners_by_distance(&self, node: NodeId, target: NodeId, value: u64) -> Vec<NodeId> {
        let mut partners: Vec<(u64, NodeId)> = self
            .channel_views(node)
            .filter(|cv| cv.capacity() >= value)
            .map(|cv| (ring_distance(cv.partner(), target, self.max_id()), cv.partner()))
            .collect();
        partners.sort_unstable();
        partners.into_iter().map(|(_, partner)| partner).collect()
    }
}
