//! Per-interface 802.11 state.
//!
//! Configuration fields are mutated only by the command dispatcher.
//! Connection-state fields belong to the state machine, which reaches them
//! through [`WlanInterface::state`](super::WlanInterface::state).

use std::time::Duration;

use super::error::{Error, Result};
use super::node::{NodeId, NodeTable, PeerNode};
use super::types::{
    AkmSet, CHAN_BITMAP_LEN, CHAN_MAX, Caps, Cipher, CipherSet, ConnState, DEFAULT_SCAN_TIMEOUT,
    IcFlags, KEY_MAXLEN, KeyFlags, MacAddr, ModeSet, NWID_LEN, OpMode, PMK_LEN, PhyMode,
    ProtoSet, ScanLockFlags, TXPOWER_MAX, WEP_NKID,
};

/// Channel flag bits carried in the channel table.
pub mod chan_flags {
    pub const TURBO: u16 = 0x0010;
    pub const CCK: u16 = 0x0020;
    pub const OFDM: u16 = 0x0040;
    pub const BAND_2GHZ: u16 = 0x0080;
    pub const BAND_5GHZ: u16 = 0x0100;
    pub const PASSIVE: u16 = 0x0200;
}

/// One entry of the channel table. An unused entry has zero frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Channel {
    /// Center frequency in MHz.
    pub freq: u16,
    pub flags: u16,
}

impl Channel {
    /// Derive frequency and band flags from a channel number.
    pub fn for_number(n: u16) -> Self {
        if n == 14 {
            Self {
                freq: 2484,
                flags: chan_flags::BAND_2GHZ | chan_flags::CCK,
            }
        } else if n < 14 {
            Self {
                freq: 2407 + 5 * n,
                flags: chan_flags::BAND_2GHZ | chan_flags::CCK | chan_flags::OFDM,
            }
        } else {
            Self {
                freq: 5000 + 5 * n,
                flags: chan_flags::BAND_5GHZ | chan_flags::OFDM,
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.freq != 0
    }
}

/// A legacy key slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Key {
    pub cipher: Cipher,
    pub len: usize,
    pub flags: KeyFlags,
    pub key: [u8; KEY_MAXLEN],
}

impl Key {
    /// Check if the slot holds an installed key.
    pub fn is_active(&self) -> bool {
        self.cipher != Cipher::None
    }

    /// The populated key bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.key[..self.len.min(KEY_MAXLEN)]
    }
}

/// State of one 802.11 interface.
#[derive(Debug, Clone)]
pub struct InterfaceState {
    pub(crate) name: String,
    pub(crate) caps: Caps,
    pub(crate) mode_caps: ModeSet,
    pub(crate) cur_mode: PhyMode,
    pub(crate) opmode: OpMode,
    pub(crate) state: ConnState,
    pub(crate) flags: IcFlags,
    pub(crate) myaddr: MacAddr,
    pub(crate) des_essid: [u8; NWID_LEN],
    pub(crate) des_esslen: usize,
    pub(crate) des_bssid: MacAddr,
    pub(crate) des_chan: Option<u16>,
    pub(crate) ibss_chan: u16,
    pub(crate) channels: Vec<Channel>,
    pub(crate) chan_active: [u8; CHAN_BITMAP_LEN],
    pub(crate) fixed_rate: Option<usize>,
    pub(crate) txpower: u16,
    pub(crate) lintval: u16,
    pub(crate) psk: [u8; PMK_LEN],
    pub(crate) rsn_protos: ProtoSet,
    pub(crate) rsn_akms: AkmSet,
    pub(crate) rsn_group_cipher: Cipher,
    pub(crate) rsn_ciphers: CipherSet,
    pub(crate) nw_keys: [Key; WEP_NKID],
    pub(crate) def_txkey: usize,
    pub(crate) scan_lock: ScanLockFlags,
    pub(crate) scan_timeout: Duration,
    pub(crate) max_rssi: u8,
    pub(crate) nodes: NodeTable,
    pub(crate) bss: NodeId,
}

impl InterfaceState {
    /// Start building the state of a newly attached interface.
    pub fn builder(name: impl Into<String>, myaddr: MacAddr) -> InterfaceStateBuilder {
        InterfaceStateBuilder::new(name, myaddr)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn caps(&self) -> Caps {
        self.caps
    }

    pub fn mode_caps(&self) -> ModeSet {
        self.mode_caps
    }

    pub fn cur_mode(&self) -> PhyMode {
        self.cur_mode
    }

    pub fn opmode(&self) -> OpMode {
        self.opmode
    }

    pub fn conn_state(&self) -> ConnState {
        self.state
    }

    pub fn flags(&self) -> IcFlags {
        self.flags
    }

    /// Mutable access to the negotiated flags for the state machine.
    pub fn flags_mut(&mut self) -> &mut IcFlags {
        &mut self.flags
    }

    pub fn myaddr(&self) -> MacAddr {
        self.myaddr
    }

    /// The desired SSID.
    pub fn des_essid(&self) -> &[u8] {
        &self.des_essid[..self.des_esslen.min(NWID_LEN)]
    }

    pub fn des_bssid(&self) -> MacAddr {
        self.des_bssid
    }

    /// The desired channel, `None` for any channel.
    pub fn des_chan(&self) -> Option<u16> {
        self.des_chan
    }

    pub fn ibss_chan(&self) -> u16 {
        self.ibss_chan
    }

    /// The full channel table, indexed by channel number.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Look up a channel by number.
    pub fn channel(&self, n: u16) -> Option<&Channel> {
        self.channels.get(n as usize)
    }

    /// Check the activity bit of a channel.
    pub fn is_chan_active(&self, n: u16) -> bool {
        n <= CHAN_MAX && self.chan_active[n as usize / 8] & (1 << (n % 8)) != 0
    }

    /// Numbers of the active channels.
    pub fn active_channels(&self) -> Vec<u16> {
        (0..=CHAN_MAX).filter(|n| self.is_chan_active(*n)).collect()
    }

    /// Index of the fixed rate in the rate table, if any.
    pub fn fixed_rate(&self) -> Option<usize> {
        self.fixed_rate
    }

    pub fn txpower(&self) -> u16 {
        self.txpower
    }

    pub fn lintval(&self) -> u16 {
        self.lintval
    }

    pub fn psk(&self) -> &[u8; PMK_LEN] {
        &self.psk
    }

    pub fn rsn_protos(&self) -> ProtoSet {
        self.rsn_protos
    }

    pub fn rsn_akms(&self) -> AkmSet {
        self.rsn_akms
    }

    pub fn rsn_group_cipher(&self) -> Cipher {
        self.rsn_group_cipher
    }

    pub fn rsn_ciphers(&self) -> CipherSet {
        self.rsn_ciphers
    }

    /// Legacy key slots.
    pub fn keys(&self) -> &[Key; WEP_NKID] {
        &self.nw_keys
    }

    /// Default transmit key slot (0-based).
    pub fn def_txkey(&self) -> usize {
        self.def_txkey
    }

    pub fn scan_lock(&self) -> ScanLockFlags {
        self.scan_lock
    }

    pub fn scan_timeout(&self) -> Duration {
        self.scan_timeout
    }

    pub fn max_rssi(&self) -> u8 {
        self.max_rssi
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeTable {
        &mut self.nodes
    }

    /// Id of the current BSS node.
    pub fn bss_id(&self) -> NodeId {
        self.bss
    }

    /// The current BSS node.
    pub fn bss(&self) -> Result<&PeerNode> {
        self.nodes.get(self.bss).ok_or(Error::NoDevice)
    }

    pub fn bss_mut(&mut self) -> Result<&mut PeerNode> {
        self.nodes.get_mut(self.bss).ok_or(Error::NoDevice)
    }

    /// Set the 802.11 connection state.
    pub fn set_conn_state(&mut self, state: ConnState) {
        self.state = state;
    }

    /// Make the node with `addr` the current BSS, allocating it if needed.
    ///
    /// The node created at attach is not indexed; it is released the first
    /// time the interface switches away from it.
    pub fn switch_bss(&mut self, addr: MacAddr) -> Result<NodeId> {
        let id = match self.nodes.find(&addr) {
            Some(id) => id,
            None => self
                .nodes
                .alloc(addr)
                .ok_or_else(|| Error::NotFound(format!("no room for node {addr}")))?,
        };

        let prev = self.bss;
        if prev != id && !self.nodes.is_indexed(prev) {
            self.nodes.remove(prev);
        }
        self.bss = id;
        Ok(id)
    }
}

/// Builder for [`InterfaceState`].
#[derive(Debug, Clone)]
#[must_use = "builders do nothing unless built"]
pub struct InterfaceStateBuilder {
    name: String,
    myaddr: MacAddr,
    caps: Caps,
    mode_caps: ModeSet,
    opmode: OpMode,
    phymode: PhyMode,
    channels: Vec<u16>,
    max_nodes: usize,
    max_rssi: u8,
    scan_timeout: Duration,
}

impl InterfaceStateBuilder {
    /// Default node table capacity.
    pub const DEFAULT_MAX_NODES: usize = 64;

    fn new(name: impl Into<String>, myaddr: MacAddr) -> Self {
        Self {
            name: name.into(),
            myaddr,
            caps: Caps::EMPTY,
            mode_caps: PhyMode::ALL.into_iter().collect(),
            opmode: OpMode::Sta,
            phymode: PhyMode::Auto,
            channels: Vec::new(),
            max_nodes: Self::DEFAULT_MAX_NODES,
            max_rssi: 0,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }

    /// Set the hardware capabilities.
    pub fn caps(mut self, caps: Caps) -> Self {
        self.caps = caps;
        self
    }

    /// Enable every hardware capability.
    pub fn all_caps(mut self) -> Self {
        self.caps = Caps::all();
        self
    }

    /// Set the supported PHY modes.
    pub fn mode_caps(mut self, modes: ModeSet) -> Self {
        self.mode_caps = modes;
        self
    }

    /// Add active channels.
    pub fn channels(mut self, channels: impl IntoIterator<Item = u16>) -> Self {
        self.channels.extend(channels);
        self
    }

    /// Add one active channel.
    pub fn channel(mut self, n: u16) -> Self {
        self.channels.push(n);
        self
    }

    pub fn opmode(mut self, mode: OpMode) -> Self {
        self.opmode = mode;
        self
    }

    pub fn phymode(mut self, mode: PhyMode) -> Self {
        self.phymode = mode;
        self
    }

    /// Set the node table capacity.
    pub fn max_nodes(mut self, n: usize) -> Self {
        self.max_nodes = n;
        self
    }

    pub fn max_rssi(mut self, rssi: u8) -> Self {
        self.max_rssi = rssi;
        self
    }

    /// Set how long a scan request waits for completion.
    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Build the state. Channel numbers above the maximum are ignored.
    pub fn build(self) -> InterfaceState {
        let mut channels = vec![Channel::default(); CHAN_MAX as usize + 1];
        let mut chan_active = [0u8; CHAN_BITMAP_LEN];
        let mut first = None;

        for n in self.channels.into_iter().filter(|n| *n <= CHAN_MAX) {
            channels[n as usize] = Channel::for_number(n);
            chan_active[n as usize / 8] |= 1 << (n % 8);
            first = Some(first.map_or(n, |f: u16| f.min(n)));
        }

        let mut flags = IcFlags::EMPTY;
        if self.opmode == OpMode::Ibss {
            flags.insert(IcFlags::IBSSON);
        }

        let mut nodes = NodeTable::new(self.max_nodes);
        let mut bss_node = PeerNode::new(self.myaddr);
        bss_node.bssid = self.myaddr;
        let bss = nodes.alloc_detached(bss_node);

        InterfaceState {
            name: self.name,
            caps: self.caps,
            mode_caps: self.mode_caps,
            cur_mode: self.phymode,
            opmode: self.opmode,
            state: ConnState::Init,
            flags,
            myaddr: self.myaddr,
            des_essid: [0; NWID_LEN],
            des_esslen: 0,
            des_bssid: MacAddr::ZERO,
            des_chan: None,
            ibss_chan: first.unwrap_or(0),
            channels,
            chan_active,
            fixed_rate: None,
            txpower: TXPOWER_MAX as u16,
            lintval: 100,
            psk: [0; PMK_LEN],
            rsn_protos: ProtoSet::RSN,
            rsn_akms: AkmSet::PSK,
            rsn_group_cipher: Cipher::Ccmp,
            rsn_ciphers: CipherSet::CCMP,
            nw_keys: [Key::default(); WEP_NKID],
            def_txkey: 0,
            scan_lock: ScanLockFlags::EMPTY,
            scan_timeout: self.scan_timeout,
            max_rssi: self.max_rssi,
            nodes,
            bss,
        }
    }
}
