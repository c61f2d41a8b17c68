// Placement and edge exports for visualization collaborators.
//
// The core hands out node identities with a deposit-derived layout scalar
// and channel index pairs; turning those into actual 2D/3D coordinates is
// the collaborator's job.

use crate::pcn_interface::NodeId;
use crate::pcn_network::ChannelNetwork;

/// Layout record for one node: its ring position (the id) and a radial
/// scalar derived from its deposit. High deposits pull toward 1.0 (center),
/// small deposits toward 2.0 (rim).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    pub node_id: NodeId,
    pub scale: f64,
}

/// Placement records for every live node, in sorted id order.
pub fn placements(net: &ChannelNetwork) -> Vec<NodePlacement> {
    let deposits: Vec<u64> = net
        .node_ids()
        .iter()
        .map(|&id| net.node(id).expect("id is live").deposit_per_channel())
        .collect();
    let min = deposits.iter().copied().min().unwrap_or(0);
    let max = deposits.iter().copied().max().unwrap_or(0);
    let range = (max - min) as f64;

    net.node_ids()
        .iter()
        .zip(&deposits)
        .map(|(&node_id, &deposit)| {
            // all-equal deposits would divide by zero, pin to the center ring
            let factor = if range == 0.0 {
                1.0
            } else {
                (deposit - min) as f64 / range
            };
            NodePlacement {
                node_id,
                scale: 2.0 / (factor + 1.0),
            }
        })
        .collect()
}

/// Every channel once, as index pairs into the sorted node order.
pub fn channel_edges(net: &ChannelNetwork) -> Vec<(usize, usize)> {
    net.channels()
        .iter()
        .map(|channel| {
            let a = net.node_position(channel.node_a()).expect("id is live");
            let b = net.node_position(channel.node_b()).expect("id is live");
            (a, b)
        })
        .collect()
}

/// A found path as canonicalized index pairs, for highlighting on top of
/// the full edge list.
pub fn path_edges(net: &ChannelNetwork, path: &[NodeId]) -> Vec<(usize, usize)> {
    path.windows(2)
        .map(|hop| {
            let a = net.node_position(hop[0]).expect("id is live");
            let b = net.node_position(hop[1]).expect("id is live");
            if a < b {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect()
}
