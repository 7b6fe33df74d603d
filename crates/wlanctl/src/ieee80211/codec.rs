//! Conversion between peer nodes and their externally visible record.

use super::driver::Driver;
use super::node::{NodeId, PeerNode, RateSet};
use super::records::{NodeReq, nodereq};
use super::state::InterfaceState;
use super::types::{CHAN_ANY, MacAddr, NWID_LEN, NodeState, RATE_MAXSIZE};

/// Encode a node into its record.
///
/// Signal strength comes from the driver. The AP flag is set when the node's
/// address equals its BSSID, the AP_BSS flag when it is the interface's
/// current BSS node.
pub fn node_to_req(ic: &InterfaceState, driver: &dyn Driver, id: NodeId, node: &PeerNode) -> NodeReq {
    let (channel, chan_flags) = match node.chan {
        Some(n) => (n, ic.channel(n).map_or(0, |c| c.flags)),
        None => (CHAN_ANY, 0),
    };

    let mut flags = 0;
    if node.is_ap() {
        flags |= nodereq::AP;
    }
    if id == ic.bss_id() {
        flags |= nodereq::AP_BSS;
    }

    NodeReq {
        macaddr: node.macaddr.octets(),
        bssid: node.bssid.octets(),
        nwid_len: node.esslen.min(NWID_LEN as u8),
        nwid: node.essid,
        channel,
        chan_flags,
        nrates: node.rates.nrates.min(RATE_MAXSIZE as u8),
        rates: node.rates.rates,
        rssi: driver.node_rssi(node),
        max_rssi: ic.max_rssi(),
        tstamp: node.tstamp,
        intval: node.intval,
        capinfo: node.capinfo,
        erp: node.erp,
        pwrsave: node.pwrsave,
        associd: node.associd,
        txseq: node.txseq,
        rxseq: node.rxseq,
        fails: node.fails,
        inact: node.inact,
        txrate: node.txrate,
        state: node.state.0,
        flags,
        pad: [0; 2],
    }
}

/// Decode a record into a node.
///
/// Only the fields a caller may set are written; signal strength, channel,
/// timestamp and the derived flags are left alone. No validation is done.
pub fn req_to_node(req: &NodeReq, node: &mut PeerNode) {
    node.macaddr = MacAddr::new(req.macaddr);
    node.bssid = MacAddr::new(req.bssid);
    node.esslen = req.nwid_len.min(NWID_LEN as u8);
    node.essid = req.nwid;

    node.rates = RateSet {
        nrates: req.nrates.min(RATE_MAXSIZE as u8),
        rates: req.rates,
    };

    node.intval = req.intval;
    node.capinfo = req.capinfo;
    node.erp = req.erp;
    node.pwrsave = req.pwrsave;
    node.associd = req.associd;
    node.txseq = req.txseq;
    node.rxseq = req.rxseq;
    node.fails = req.fails;
    node.inact = req.inact;
    node.txrate = req.txrate;
    node.state = NodeState(req.state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::fixtures::{RecordingDriver, test_state};

    fn sample_node(addr: MacAddr) -> PeerNode {
        let mut node = PeerNode::new(addr);
        node.bssid = MacAddr::new([0x02, 0, 0, 0, 0, 0xaa]);
        node.set_essid(b"lab");
        node.chan = Some(6);
        node.rates = RateSet::from_rates(&[2, 4, 11, 22]);
        node.txrate = 3;
        node.tstamp = [1, 2, 3, 4, 5, 6, 7, 8];
        node.intval = 100;
        node.capinfo = 0x0411;
        node.erp = 0x02;
        node.pwrsave = 1;
        node.associd = 0xc001;
        node.txseq = 10;
        node.rxseq = 20;
        node.fails = 3;
        node.inact = 7;
        node.state = NodeState::ASSOC;
        node
    }

    #[test]
    fn test_encode_fields_and_flags() {
        let mut ic = test_state();
        let driver = RecordingDriver::new().with_rssi(42);
        let addr = MacAddr::new([0x02, 0, 0, 0, 0, 0x10]);
        let id = ic.nodes_mut().alloc(addr).unwrap();
        *ic.nodes_mut().get_mut(id).unwrap() = sample_node(addr);

        let node = ic.nodes().get(id).unwrap().clone();
        let req = node_to_req(&ic, &driver, id, &node);

        assert_eq!(req.macaddr, addr.octets());
        assert_eq!(req.nwid_len, 3);
        assert_eq!(&req.nwid[..3], b"lab");
        assert_eq!(req.channel, 6);
        assert_eq!(req.chan_flags, ic.channel(6).unwrap().flags);
        assert_eq!(req.nrates, 4);
        assert_eq!(req.rssi, 42);
        assert_eq!(req.max_rssi, ic.max_rssi());
        assert_eq!(req.state, NodeState::ASSOC.0);
        assert_eq!(req.flags & nodereq::AP, 0);
        assert_eq!(req.flags & nodereq::AP_BSS, 0);
    }

    #[test]
    fn test_encode_ap_and_bss_flags() {
        let mut ic = test_state();
        let driver = RecordingDriver::new();
        let addr = MacAddr::new([0x02, 0, 0, 0, 0, 0xaa]);
        let id = ic.switch_bss(addr).unwrap();
        ic.nodes_mut().get_mut(id).unwrap().bssid = addr;

        let node = ic.nodes().get(id).unwrap().clone();
        let req = node_to_req(&ic, &driver, id, &node);
        assert_ne!(req.flags & nodereq::AP, 0);
        assert_ne!(req.flags & nodereq::AP_BSS, 0);
    }

    #[test]
    fn test_encode_unknown_channel() {
        let ic = test_state();
        let driver = RecordingDriver::new();
        let node = PeerNode::new(MacAddr::new([0x02, 0, 0, 0, 0, 1]));
        let req = node_to_req(&ic, &driver, ic.bss_id(), &node);
        assert_eq!(req.channel, CHAN_ANY);
        assert_eq!(req.chan_flags, 0);
    }

    #[test]
    fn test_decode_preserves_mutable_fields() {
        let mut ic = test_state();
        let driver = RecordingDriver::new().with_rssi(9);
        let addr = MacAddr::new([0x02, 0, 0, 0, 0, 0x10]);
        let id = ic.nodes_mut().alloc(addr).unwrap();
        let original = sample_node(addr);

        let req = node_to_req(&ic, &driver, id, &original);

        let mut decoded = PeerNode::new(addr);
        decoded.chan = Some(11);
        decoded.tstamp = [9; 8];
        req_to_node(&req, &mut decoded);

        // Channel and timestamp are not decoded.
        assert_eq!(decoded.chan, Some(11));
        assert_eq!(decoded.tstamp, [9; 8]);

        decoded.chan = original.chan;
        decoded.tstamp = original.tstamp;
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_clamps_lengths() {
        let req = NodeReq {
            nwid_len: 200,
            nrates: 99,
            ..Default::default()
        };
        let mut node = PeerNode::default();
        req_to_node(&req, &mut node);
        assert_eq!(node.esslen as usize, NWID_LEN);
        assert_eq!(node.rates.nrates as usize, RATE_MAXSIZE);
    }
}
