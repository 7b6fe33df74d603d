//! Test doubles for the driver and the state machine.
//!
//! Both record every callback and can be told to fail, so policy tests can
//! observe side effects and partial-failure behaviour.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::driver::{Driver, LinkStatus, StateMachine};
use super::error::{Error, Result};
use super::node::PeerNode;
use super::state::{InterfaceState, Key};
use super::types::{AkmSet, ConnState, MacAddr, MgmtFrame, PMK_LEN, PhyMode};

/// Own address of [`test_state`].
pub const TEST_ADDR: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 0x01]);

/// Interface with every capability and channels 1-11, 36 and 40.
pub fn test_state() -> InterfaceState {
    InterfaceState::builder("wlan0", TEST_ADDR)
        .all_caps()
        .channels(1..=11)
        .channel(36)
        .channel(40)
        .max_rssi(100)
        .max_nodes(8)
        .build()
}

#[derive(Debug)]
pub struct RecordingDriver {
    installed: Mutex<Vec<usize>>,
    deleted: Mutex<Vec<usize>>,
    rssi: u8,
    fail_set_key_at: Option<usize>,
    link: LinkStatus,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            installed: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            rssi: 0,
            fail_set_key_at: None,
            link: LinkStatus::Running,
        }
    }

    pub fn with_rssi(mut self, rssi: u8) -> Self {
        self.rssi = rssi;
        self
    }

    /// Fail key installation into `slot` with EIO.
    pub fn fail_set_key_at(mut self, slot: usize) -> Self {
        self.fail_set_key_at = Some(slot);
        self
    }

    pub fn with_link(mut self, link: LinkStatus) -> Self {
        self.link = link;
        self
    }

    /// Slots successfully installed, in call order.
    pub fn installed(&self) -> Vec<usize> {
        self.installed.lock().unwrap().clone()
    }

    /// Slots removed, in call order.
    pub fn deleted(&self) -> Vec<usize> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Driver for RecordingDriver {
    fn set_key(&self, slot: usize, _key: &Key) -> Result<()> {
        if self.fail_set_key_at == Some(slot) {
            return Err(Error::driver(format!("set_key slot {slot}"), libc::EIO));
        }
        self.installed.lock().unwrap().push(slot);
        Ok(())
    }

    fn delete_key(&self, slot: usize, _key: &Key) {
        self.deleted.lock().unwrap().push(slot);
    }

    fn node_rssi(&self, _node: &PeerNode) -> u8 {
        self.rssi
    }

    fn link_status(&self) -> LinkStatus {
        self.link
    }
}

#[derive(Debug)]
pub struct RecordingStateMachine {
    transitions: Mutex<Vec<ConnState>>,
    erp_resets: AtomicUsize,
    pmksa: Mutex<Vec<(AkmSet, MacAddr, u32)>>,
    keyruns: Mutex<Vec<MacAddr>>,
    mgmt: Mutex<Vec<(MacAddr, MgmtFrame, u16)>>,
    left: Mutex<Vec<MacAddr>>,
    fail_set_mode: bool,
    fail_pmksa: bool,
    fail_keyrun: bool,
}

impl RecordingStateMachine {
    pub fn new() -> Self {
        Self {
            transitions: Mutex::new(Vec::new()),
            erp_resets: AtomicUsize::new(0),
            pmksa: Mutex::new(Vec::new()),
            keyruns: Mutex::new(Vec::new()),
            mgmt: Mutex::new(Vec::new()),
            left: Mutex::new(Vec::new()),
            fail_set_mode: false,
            fail_pmksa: false,
            fail_keyrun: false,
        }
    }

    /// Fail the mode hook with EIO.
    pub fn fail_set_mode(mut self) -> Self {
        self.fail_set_mode = true;
        self
    }

    /// Fail PMKSA insertion with ENOMEM.
    pub fn fail_pmksa(mut self) -> Self {
        self.fail_pmksa = true;
        self
    }

    /// Fail key handshakes with EBUSY.
    pub fn fail_keyrun(mut self) -> Self {
        self.fail_keyrun = true;
        self
    }

    pub fn transitions(&self) -> Vec<ConnState> {
        self.transitions.lock().unwrap().clone()
    }

    pub fn erp_resets(&self) -> usize {
        self.erp_resets.load(Ordering::SeqCst)
    }

    pub fn pmksa(&self) -> Vec<(AkmSet, MacAddr, u32)> {
        self.pmksa.lock().unwrap().clone()
    }

    pub fn keyruns(&self) -> Vec<MacAddr> {
        self.keyruns.lock().unwrap().clone()
    }

    pub fn mgmt(&self) -> Vec<(MacAddr, MgmtFrame, u16)> {
        self.mgmt.lock().unwrap().clone()
    }

    pub fn left(&self) -> Vec<MacAddr> {
        self.left.lock().unwrap().clone()
    }
}

impl StateMachine for RecordingStateMachine {
    fn new_state(&self, ic: &mut InterfaceState, state: ConnState) {
        self.transitions.lock().unwrap().push(state);
        ic.set_conn_state(state);
    }

    fn set_mode(&self, _ic: &mut InterfaceState, _mode: PhyMode) -> Result<()> {
        if self.fail_set_mode {
            return Err(Error::driver("set_mode", libc::EIO));
        }
        Ok(())
    }

    fn reset_erp(&self, _ic: &mut InterfaceState) {
        self.erp_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn pmksa_add(
        &self,
        _ic: &mut InterfaceState,
        akm: AkmSet,
        addr: MacAddr,
        _key: &[u8; PMK_LEN],
        lifetime: u32,
    ) -> Result<()> {
        if self.fail_pmksa {
            return Err(Error::driver("pmksa_add", libc::ENOMEM));
        }
        self.pmksa.lock().unwrap().push((akm, addr, lifetime));
        Ok(())
    }

    fn keyrun(&self, _ic: &mut InterfaceState, addr: MacAddr) -> Result<()> {
        if self.fail_keyrun {
            return Err(Error::driver("keyrun", libc::EBUSY));
        }
        self.keyruns.lock().unwrap().push(addr);
        Ok(())
    }

    fn send_mgmt(&self, _ic: &InterfaceState, node: &PeerNode, frame: MgmtFrame, reason: u16) {
        self.mgmt.lock().unwrap().push((node.macaddr, frame, reason));
    }

    fn node_leave(&self, _ic: &mut InterfaceState, node: &PeerNode) {
        self.left.lock().unwrap().push(node.macaddr);
    }
}
