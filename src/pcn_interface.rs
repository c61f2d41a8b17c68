// Shared types for the channel network.

// all the same numeric type to allow casting/interop with channel indices
pub type NodeId = u64;
pub type ChannelIndex = usize;

/// Size of the circular node id space, `[0, DEFAULT_MAX_ID)`.
pub const DEFAULT_MAX_ID: u64 = 1 << 32;

/// Role of a node in the network.
///
/// Behaviorally identical in the core simulation; light clients are reserved
/// for topology variants where they attach to full nodes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    FullNode,
    LightClient,
}

/// Calculate the minimum distance between two ids on a circular id space of
/// size `max_id`, considering wrap-around in both directions.
///
/// # Example
/// ```
/// use pcn_rust::pcn_interface::ring_distance;
///
/// // Normal case
/// assert_eq!(ring_distance(100, 150, 1 << 32), 50);
///
/// // Wrapping case (going backwards is shorter)
/// assert_eq!(ring_distance(10, (1 << 32) - 5, 1 << 32), 15);
/// ```
pub fn ring_distance(a: NodeId, b: NodeId, max_id: u64) -> u64 {
    let d = a.abs_diff(b);
    d.min(max_id - d)
}
