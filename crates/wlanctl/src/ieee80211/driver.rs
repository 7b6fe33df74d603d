//! Interfaces to the hardware driver and the 802.11 state machine.
//!
//! Both are synchronous callbacks invoked with the interface state locked.
//! Failures propagate to the caller without retry.

use std::sync::Arc;

use super::error::Result;
use super::node::PeerNode;
use super::state::{InterfaceState, Key};
use super::types::{AkmSet, ConnState, MacAddr, MgmtFrame, PMK_LEN, PhyMode};

/// Link status as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// No device behind the interface.
    Absent,
    /// Device present but not up and running.
    Down,
    /// Device up and running.
    Running,
}

/// Hardware driver callbacks.
pub trait Driver: Send + Sync {
    /// Install a key into a hardware key slot.
    fn set_key(&self, slot: usize, key: &Key) -> Result<()>;

    /// Remove a key from a hardware key slot.
    fn delete_key(&self, slot: usize, key: &Key);

    /// Current signal strength of a node.
    fn node_rssi(&self, node: &PeerNode) -> u8;

    /// Current link status.
    fn link_status(&self) -> LinkStatus;
}

/// 802.11 state machine hooks used by the control plane.
pub trait StateMachine: Send + Sync {
    /// Move the interface to a new connection state.
    fn new_state(&self, ic: &mut InterfaceState, state: ConnState);

    /// Reconfigure the hardware for a PHY mode.
    ///
    /// The caller stores the mode once this succeeds.
    fn set_mode(&self, ic: &mut InterfaceState, mode: PhyMode) -> Result<()>;

    /// Recompute ERP (protection and slot time) state.
    fn reset_erp(&self, ic: &mut InterfaceState);

    /// Add a PMKSA cache entry.
    fn pmksa_add(
        &self,
        ic: &mut InterfaceState,
        akm: AkmSet,
        addr: MacAddr,
        key: &[u8; PMK_LEN],
        lifetime: u32,
    ) -> Result<()>;

    /// Start the key handshake with a peer.
    fn keyrun(&self, ic: &mut InterfaceState, addr: MacAddr) -> Result<()>;

    /// Send a management frame to a node.
    fn send_mgmt(&self, ic: &InterfaceState, node: &PeerNode, frame: MgmtFrame, reason: u16);

    /// Notify that a node left. Called after the node is removed.
    fn node_leave(&self, ic: &mut InterfaceState, node: &PeerNode);
}

impl<T: Driver + ?Sized> Driver for Arc<T> {
    fn set_key(&self, slot: usize, key: &Key) -> Result<()> {
        (**self).set_key(slot, key)
    }

    fn delete_key(&self, slot: usize, key: &Key) {
        (**self).delete_key(slot, key)
    }

    fn node_rssi(&self, node: &PeerNode) -> u8 {
        (**self).node_rssi(node)
    }

    fn link_status(&self) -> LinkStatus {
        (**self).link_status()
    }
}

impl<T: StateMachine + ?Sized> StateMachine for Arc<T> {
    fn new_state(&self, ic: &mut InterfaceState, state: ConnState) {
        (**self).new_state(ic, state)
    }

    fn set_mode(&self, ic: &mut InterfaceState, mode: PhyMode) -> Result<()> {
        (**self).set_mode(ic, mode)
    }

    fn reset_erp(&self, ic: &mut InterfaceState) {
        (**self).reset_erp(ic)
    }

    fn pmksa_add(
        &self,
        ic: &mut InterfaceState,
        akm: AkmSet,
        addr: MacAddr,
        key: &[u8; PMK_LEN],
        lifetime: u32,
    ) -> Result<()> {
        (**self).pmksa_add(ic, akm, addr, key, lifetime)
    }

    fn keyrun(&self, ic: &mut InterfaceState, addr: MacAddr) -> Result<()> {
        (**self).keyrun(ic, addr)
    }

    fn send_mgmt(&self, ic: &InterfaceState, node: &PeerNode, frame: MgmtFrame, reason: u16) {
        (**self).send_mgmt(ic, node, frame, reason)
    }

    fn node_leave(&self, ic: &mut InterfaceState, node: &PeerNode) {
        (**self).node_leave(ic, node)
    }
}
