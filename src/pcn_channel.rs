// Bilateral Channel Accounting
//
// A channel is the single collateralized relationship between two nodes.
// Exactly one record exists per unordered node pair, held in the network's
// central channel store; nodes reference it by index. The side with the
// lower node id is canonically side A.

use crate::pcn_interface::NodeId;

/// Which end of a channel a node sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// The shared bilateral channel record.
///
/// `balance` is stored once, from side A's perspective: positive means the
/// partner owes side A. Both per-side balances are projections of this single
/// field, so updating one side's view atomically mirrors the other's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    node_a: NodeId,
    node_b: NodeId,
    deposit_a: u64,
    deposit_b: u64,
    balance: i64,
}

impl Channel {
    /// Create a channel between two distinct nodes with zero deposits and
    /// zero balance. Node order is canonicalized internally.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        assert_ne!(a, b, "channel endpoints must differ");
        let (node_a, node_b) = if a < b { (a, b) } else { (b, a) };
        Self {
            node_a,
            node_b,
            deposit_a: 0,
            deposit_b: 0,
            balance: 0,
        }
    }

    pub fn node_a(&self) -> NodeId {
        self.node_a
    }

    pub fn node_b(&self) -> NodeId {
        self.node_b
    }

    /// Which side `node` occupies.
    ///
    /// # Panics
    /// Panics if `node` is not an endpoint of this channel.
    pub fn side_of(&self, node: NodeId) -> Side {
        if node == self.node_a {
            Side::A
        } else if node == self.node_b {
            Side::B
        } else {
            panic!("node {} is not part of channel {:?}", node, self);
        }
    }

    /// The endpoint opposite to `node`.
    pub fn partner_of(&self, node: NodeId) -> NodeId {
        match self.side_of(node) {
            Side::A => self.node_b,
            Side::B => self.node_a,
        }
    }

    pub fn endpoint(&self, side: Side) -> NodeId {
        match side {
            Side::A => self.node_a,
            Side::B => self.node_b,
        }
    }

    pub fn deposit(&self, side: Side) -> u64 {
        match side {
            Side::A => self.deposit_a,
            Side::B => self.deposit_b,
        }
    }

    /// Set one side's collateral. Deposits are unsigned; negative collateral
    /// is unrepresentable.
    pub fn set_deposit(&mut self, side: Side, value: u64) {
        match side {
            Side::A => self.deposit_a = value,
            Side::B => self.deposit_b = value,
        }
        self.check_capacities();
    }

    /// What the partner owes `side` if positive.
    pub fn balance(&self, side: Side) -> i64 {
        match side {
            Side::A => self.balance,
            Side::B => -self.balance,
        }
    }

    /// Set the balance as seen from `side`; the opposite view mirrors to
    /// `-value` automatically since there is only one underlying record.
    pub fn set_balance(&mut self, side: Side, value: i64) {
        self.balance = match side {
            Side::A => value,
            Side::B => -value,
        };
        self.check_capacities();
    }

    /// How much `side` can route outward right now. Always derived, never
    /// stored: `deposit + signed balance`.
    pub fn capacity(&self, side: Side) -> u64 {
        let capacity = self.deposit(side) as i64 + self.balance(side);
        debug_assert!(capacity >= 0, "negative capacity on {:?}: {:?}", side, self);
        capacity.max(0) as u64
    }

    fn check_capacities(&self) {
        debug_assert!(
            self.deposit_a as i64 + self.balance >= 0
                && self.deposit_b as i64 - self.balance >= 0,
            "balance exceeds a side's deposit: {:?}",
            self
        );
    }
}

/// A channel from the perspective of one node.
///
/// Cheap read-only projection used by pathfinding and exports; mutation goes
/// through the network, which owns the channel store.
#[derive(Debug, Clone, Copy)]
pub struct ChannelView<'a> {
    channel: &'a Channel,
    side: Side,
}

impl<'a> ChannelView<'a> {
    /// View `channel` from `node`'s side.
    pub fn new(channel: &'a Channel, node: NodeId) -> Self {
        let side = channel.side_of(node);
        Self { channel, side }
    }

    pub fn this(&self) -> NodeId {
        self.channel.endpoint(self.side)
    }

    pub fn partner(&self) -> NodeId {
        self.channel.endpoint(self.side.other())
    }

    pub fn deposit(&self) -> u64 {
        self.channel.deposit(self.side)
    }

    pub fn partner_deposit(&self) -> u64 {
        self.channel.deposit(self.side.other())
    }

    /// What the partner owes this side if positive.
    pub fn balance(&self) -> i64 {
        self.channel.balance(self.side)
    }

    pub fn capacity(&self) -> u64 {
        self.channel.capacity(self.side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_channel() {
        let mut channel = Channel::new(1, 2);
        channel.set_deposit(Side::A, 10);
        channel.set_deposit(Side::B, 20);
        channel.set_balance(Side::A, 2);

        assert_eq!(channel.balance(Side::B), -2);
        assert_eq!(channel.capacity(Side::A), 10 + 2);
        assert_eq!(channel.capacity(Side::B), 20 - 2);
    }

    #[test]
    fn test_canonical_side_order() {
        let channel = Channel::new(7, 3);
        assert_eq!(channel.node_a(), 3);
        assert_eq!(channel.node_b(), 7);
        assert_eq!(channel.side_of(3), Side::A);
        assert_eq!(channel.side_of(7), Side::B);
        assert_eq!(channel.partner_of(3), 7);
    }

    #[test]
    fn test_balance_mirrors_from_either_side() {
        let mut channel = Channel::new(1, 2);
        channel.set_deposit(Side::A, 10);
        channel.set_deposit(Side::B, 10);

        channel.set_balance(Side::B, 5);
        assert_eq!(channel.balance(Side::A), -5);
        assert_eq!(channel.balance(Side::B), 5);
        assert_eq!(channel.capacity(Side::A), 5);
        assert_eq!(channel.capacity(Side::B), 15);
    }

    #[test]
    fn test_capacity_is_derived() {
        let mut channel = Channel::new(1, 2);
        channel.set_deposit(Side::A, 100);
        channel.set_deposit(Side::B, 100);
        for shift in [-100i64, -50, 0, 50, 100] {
            channel.set_balance(Side::A, shift);
            assert_eq!(
                channel.capacity(Side::A) as i64,
                channel.deposit(Side::A) as i64 + channel.balance(Side::A)
            );
            assert_eq!(
                channel.capacity(Side::B) as i64,
                channel.deposit(Side::B) as i64 + channel.balance(Side::B)
            );
            assert_eq!(channel.balance(Side::A), -channel.balance(Side::B));
        }
    }

    #[test]
    fn test_view_projection() {
        let mut channel = Channel::new(1, 2);
        channel.set_deposit(Side::A, 10);
        channel.set_deposit(Side::B, 20);
        channel.set_balance(Side::A, 2);

        let view_a = ChannelView::new(&channel, 1);
        let view_b = ChannelView::new(&channel, 2);
        assert_eq!(view_a.partner(), 2);
        assert_eq!(view_b.partner(), 1);
        assert_eq!(view_a.deposit(), 10);
        assert_eq!(view_a.partner_deposit(), 20);
        assert_eq!(view_a.capacity(), 12);
        assert_eq!(view_b.capacity(), 18);
    }

    #[test]
    #[should_panic]
    fn test_rejects_self_channel() {
        Channel::new(5, 5);
    }
}
