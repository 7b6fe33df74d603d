//! In-memory driver and state machine.
//!
//! These stand in for hardware when an interface is attached from a
//! profile, e.g. by the `wlan` CLI to validate a configuration. Keys are
//! remembered per slot and state transitions take effect immediately.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::driver::{Driver, LinkStatus, StateMachine};
use super::error::{Error, Result};
use super::node::PeerNode;
use super::state::{InterfaceState, Key};
use super::types::{AkmSet, Cipher, ConnState, IcFlags, MacAddr, MgmtFrame, PMK_LEN, PhyMode};

/// Driver that keeps installed keys in memory.
#[derive(Debug)]
pub struct SimDriver {
    keys: Mutex<BTreeMap<usize, Cipher>>,
    rssi: u8,
    link: LinkStatus,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(BTreeMap::new()),
            rssi: 0,
            link: LinkStatus::Running,
        }
    }

    /// Report this signal strength for every node.
    pub fn with_rssi(mut self, rssi: u8) -> Self {
        self.rssi = rssi;
        self
    }

    pub fn with_link(mut self, link: LinkStatus) -> Self {
        self.link = link;
        self
    }

    /// Ciphers currently installed, by slot.
    pub fn installed(&self) -> BTreeMap<usize, Cipher> {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Driver for SimDriver {
    fn set_key(&self, slot: usize, key: &Key) -> Result<()> {
        debug!(slot, cipher = %key.cipher, "installing key");
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot, key.cipher);
        Ok(())
    }

    fn delete_key(&self, slot: usize, _key: &Key) {
        debug!(slot, "removing key");
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&slot);
    }

    fn node_rssi(&self, _node: &PeerNode) -> u8 {
        self.rssi
    }

    fn link_status(&self) -> LinkStatus {
        self.link
    }
}

/// State machine that applies transitions synchronously.
#[derive(Debug, Default)]
pub struct SimStateMachine {
    pmksa: Mutex<BTreeMap<MacAddr, u32>>,
}

impl SimStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime of the cached PMKSA for a peer, if any.
    pub fn pmksa_lifetime(&self, addr: &MacAddr) -> Option<u32> {
        self.pmksa
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(addr)
            .copied()
    }
}

impl StateMachine for SimStateMachine {
    fn new_state(&self, ic: &mut InterfaceState, state: ConnState) {
        debug!(iface = %ic.name, from = %ic.state.name(), to = %state.name(), "state change");
        ic.set_conn_state(state);
    }

    fn set_mode(&self, ic: &mut InterfaceState, mode: PhyMode) -> Result<()> {
        debug!(iface = %ic.name, %mode, "hardware mode set");
        Ok(())
    }

    fn reset_erp(&self, ic: &mut InterfaceState) {
        ic.flags.remove(IcFlags::USEPROT);
        let short_slot = ic.cur_mode == PhyMode::Dot11a || ic.caps.contains(super::Caps::SHSLOT);
        ic.flags.set(IcFlags::SHSLOT, short_slot);
    }

    fn pmksa_add(
        &self,
        ic: &mut InterfaceState,
        akm: AkmSet,
        addr: MacAddr,
        _key: &[u8; PMK_LEN],
        lifetime: u32,
    ) -> Result<()> {
        debug!(iface = %ic.name, akm = akm.bits(), %addr, lifetime, "PMKSA cached");
        self.pmksa
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(addr, lifetime);
        Ok(())
    }

    fn keyrun(&self, ic: &mut InterfaceState, addr: MacAddr) -> Result<()> {
        if ic.nodes.find(&addr).is_none() {
            return Err(Error::NotFound(format!("node {addr}")));
        }
        debug!(iface = %ic.name, %addr, "key handshake started");
        Ok(())
    }

    fn send_mgmt(&self, ic: &InterfaceState, node: &PeerNode, frame: MgmtFrame, reason: u16) {
        debug!(iface = %ic.name, addr = %node.macaddr, ?frame, reason, "management frame");
    }

    fn node_leave(&self, ic: &mut InterfaceState, node: &PeerNode) {
        debug!(iface = %ic.name, addr = %node.macaddr, "node left");
    }
}
