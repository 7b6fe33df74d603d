//! Peer node records and the ordered peer collection.
//!
//! Nodes live in an arena addressed by [`NodeId`]. An ordered index keyed by
//! MAC address gives the iteration order used when enumerating peers.

use std::collections::BTreeMap;

use super::types::{MacAddr, NWID_LEN, NodeState, RATE_MAXSIZE};

/// Handle of a node in a [`NodeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A rate set: up to [`RATE_MAXSIZE`] rates in 500 kb/s units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateSet {
    pub nrates: u8,
    pub rates: [u8; RATE_MAXSIZE],
}

impl RateSet {
    /// Build a rate set from a slice, truncating to the buffer size.
    pub fn from_rates(rates: &[u8]) -> Self {
        let n = rates.len().min(RATE_MAXSIZE);
        let mut set = Self::default();
        set.rates[..n].copy_from_slice(&rates[..n]);
        set.nrates = n as u8;
        set
    }

    /// The populated part of the set.
    pub fn as_slice(&self) -> &[u8] {
        &self.rates[..(self.nrates as usize).min(RATE_MAXSIZE)]
    }
}

/// A known peer station or access point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerNode {
    pub macaddr: MacAddr,
    pub bssid: MacAddr,
    pub essid: [u8; NWID_LEN],
    pub esslen: u8,
    /// Channel number the peer was seen on, `None` when unknown.
    pub chan: Option<u16>,
    pub rates: RateSet,
    /// Index of the current tx rate in `rates`.
    pub txrate: u8,
    pub tstamp: [u8; 8],
    pub intval: u16,
    pub capinfo: u16,
    pub erp: u8,
    pub pwrsave: u8,
    pub associd: u16,
    pub txseq: u16,
    pub rxseq: u16,
    pub fails: u32,
    pub inact: u32,
    pub state: NodeState,
}

impl PeerNode {
    /// Create an empty node for an address.
    pub fn new(macaddr: MacAddr) -> Self {
        Self {
            macaddr,
            ..Default::default()
        }
    }

    /// The populated part of the SSID.
    pub fn essid(&self) -> &[u8] {
        &self.essid[..(self.esslen as usize).min(NWID_LEN)]
    }

    /// Set the SSID, truncating to the buffer size.
    pub fn set_essid(&mut self, ssid: &[u8]) {
        let n = ssid.len().min(NWID_LEN);
        self.essid = [0; NWID_LEN];
        self.essid[..n].copy_from_slice(&ssid[..n]);
        self.esslen = n as u8;
    }

    /// Check if the node is an access point (its address is its BSSID).
    pub fn is_ap(&self) -> bool {
        self.macaddr == self.bssid
    }
}

/// Arena of peer nodes with an ordered address index.
#[derive(Debug, Clone)]
pub struct NodeTable {
    slots: Vec<Option<PeerNode>>,
    free: Vec<usize>,
    index: BTreeMap<MacAddr, NodeId>,
    capacity: usize,
}

impl NodeTable {
    /// Create a table holding at most `capacity` indexed nodes.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: BTreeMap::new(),
            capacity,
        }
    }

    /// Maximum number of indexed nodes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if no node is indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up a node by address.
    pub fn find(&self, addr: &MacAddr) -> Option<NodeId> {
        self.index.get(addr).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&PeerNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut PeerNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Allocate and index a node for `addr`.
    ///
    /// Returns `None` when the table is at capacity.
    pub fn alloc(&mut self, addr: MacAddr) -> Option<NodeId> {
        if self.index.len() >= self.capacity {
            return None;
        }
        let id = self.insert_slot(PeerNode::new(addr));
        self.index.insert(addr, id);
        Some(id)
    }

    /// Allocate a node that is not reachable through the address index.
    ///
    /// Used for the interface's own BSS node before it joins a network.
    pub fn alloc_detached(&mut self, node: PeerNode) -> NodeId {
        self.insert_slot(node)
    }

    /// Check if a node is reachable through the address index.
    pub fn is_indexed(&self, id: NodeId) -> bool {
        self.index.values().any(|v| *v == id)
    }

    /// Remove a node from the index and free its slot.
    pub fn remove(&mut self, id: NodeId) -> Option<PeerNode> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.index.retain(|_, v| *v != id);
        self.free.push(id.0);
        Some(node)
    }

    /// Iterate indexed nodes in address order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PeerNode)> + '_ {
        self.index
            .values()
            .filter_map(|id| self.get(*id).map(|node| (*id, node)))
    }

    fn insert_slot(&mut self, node: PeerNode) -> NodeId {
        match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(node);
                NodeId(i)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x02, 0, 0, 0, 0, last])
    }

    #[test]
    fn test_alloc_and_find() {
        let mut table = NodeTable::new(4);
        let id = table.alloc(mac(1)).unwrap();
        assert_eq!(table.find(&mac(1)), Some(id));
        assert_eq!(table.get(id).unwrap().macaddr, mac(1));
        assert_eq!(table.len(), 1);
        assert!(table.find(&mac(2)).is_none());
    }

    #[test]
    fn test_capacity_limit() {
        let mut table = NodeTable::new(2);
        assert!(table.alloc(mac(1)).is_some());
        assert!(table.alloc(mac(2)).is_some());
        assert!(table.alloc(mac(3)).is_none());
    }

    #[test]
    fn test_iteration_is_address_ordered() {
        let mut table = NodeTable::new(8);
        for last in [9, 3, 5, 1] {
            table.alloc(mac(last)).unwrap();
        }
        let order: Vec<u8> = table.iter().map(|(_, n)| n.macaddr.0[5]).collect();
        assert_eq!(order, vec![1, 3, 5, 9]);
    }

    #[test]
    fn test_remove_reuses_slot() {
        let mut table = NodeTable::new(4);
        let a = table.alloc(mac(1)).unwrap();
        table.remove(a).unwrap();
        assert!(table.find(&mac(1)).is_none());
        assert!(table.get(a).is_none());

        let b = table.alloc(mac(2)).unwrap();
        assert_eq!(a, b);
        assert_eq!(table.get(b).unwrap().macaddr, mac(2));
    }

    #[test]
    fn test_detached_node_is_not_indexed() {
        let mut table = NodeTable::new(4);
        let id = table.alloc_detached(PeerNode::new(mac(7)));
        assert!(table.find(&mac(7)).is_none());
        assert_eq!(table.iter().count(), 0);
        assert!(!table.is_indexed(id));
        assert!(table.get(id).is_some());
    }

    #[test]
    fn test_essid_and_rates_truncate() {
        let mut node = PeerNode::new(mac(1));
        node.set_essid(&[b'a'; 40]);
        assert_eq!(node.esslen as usize, NWID_LEN);
        assert_eq!(node.essid().len(), NWID_LEN);

        let rates = RateSet::from_rates(&[2; 20]);
        assert_eq!(rates.nrates as usize, RATE_MAXSIZE);
        assert_eq!(rates.as_slice().len(), RATE_MAXSIZE);
    }
}
