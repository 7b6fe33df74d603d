//! Fixed-layout request and reply records.
//!
//! Every command carries exactly one of these records. Requests are copied
//! out of the caller's buffer before validation and replies are copied back
//! in place; no record outlives the command that used it.

use zerocopy::{FromZeros, Immutable, KnownLayout};

pub use zerocopy::{FromBytes, IntoBytes};

use super::error::{Error, Result};
use super::types::{ADDR_LEN, CHAN_MAX, KEYBUF_SIZE, NWID_LEN, PMK_LEN, RATE_MAXSIZE, WEP_NKID};

/// WPA protocol bits in [`WpaParams::protos`].
pub mod wpa_proto {
    pub const WPA1: u32 = 0x01;
    pub const WPA2: u32 = 0x02;
}

/// WPA cipher values in [`WpaParams::ciphers`] and [`WpaParams::groupcipher`].
pub mod wpa_cipher {
    pub const NONE: u32 = 0x00;
    pub const USEGROUP: u32 = 0x01;
    pub const WEP40: u32 = 0x02;
    pub const TKIP: u32 = 0x04;
    pub const CCMP: u32 = 0x08;
    pub const WEP104: u32 = 0x10;
}

/// WPA AKM bits in [`WpaParams::akms`].
pub mod wpa_akm {
    pub const PSK: u32 = 0x01;
    pub const IEEE8021X: u32 = 0x02;
    pub const SHA256_PSK: u32 = 0x04;
    pub const SHA256_8021X: u32 = 0x08;
}

/// Values of [`NwKey::wepon`].
pub mod nwkey {
    pub const OPEN: u32 = 0;
    pub const WEP: u32 = 1;
}

/// Bits of [`NodeReq::flags`].
pub mod nodereq {
    /// The node is an access point.
    pub const AP: u8 = 0x01;
    /// The node is the interface's current BSS.
    pub const AP_BSS: u8 = 0x02;
    /// Copy the record into the node on set.
    pub const COPY: u8 = 0x04;
}

/// A fixed-size record exchanged through a command buffer.
pub trait Record: FromBytes + IntoBytes + Immutable + KnownLayout + Sized {
    /// Size of the record in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Copy the record out of the start of a request buffer.
    fn copy_in(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: Self::SIZE,
                actual: data.len(),
            })
    }

    /// Copy the record into the start of a reply buffer.
    fn copy_out(&self, data: &mut [u8]) -> Result<()> {
        let actual = data.len();
        self.write_to_prefix(data).map_err(|_| Error::Truncated {
            expected: Self::SIZE,
            actual,
        })
    }
}

macro_rules! records {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {})*
    };
}

/// SSID request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Nwid {
    pub len: u8,
    pub nwid: [u8; NWID_LEN],
}

impl Nwid {
    /// Build a request for an SSID, truncating to the buffer size.
    pub fn from_ssid(ssid: &[u8]) -> Self {
        let n = ssid.len().min(NWID_LEN);
        let mut req = Self::default();
        req.nwid[..n].copy_from_slice(&ssid[..n]);
        req.len = n as u8;
        req
    }

    /// The SSID bytes, clamped to the buffer size.
    pub fn ssid(&self) -> &[u8] {
        &self.nwid[..(self.len as usize).min(NWID_LEN)]
    }
}

/// One WEP key entry.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NwKeyEntry {
    pub keylen: u32,
    /// Non-zero when the entry carries key material (set) or wants it (get).
    pub present: u32,
    pub keydat: [u8; KEYBUF_SIZE],
}

impl NwKeyEntry {
    /// Build an entry holding `key`, truncating to the buffer size.
    pub fn with_key(key: &[u8]) -> Self {
        let n = key.len().min(KEYBUF_SIZE);
        let mut entry = Self {
            keylen: key.len() as u32,
            present: 1,
            ..Default::default()
        };
        entry.keydat[..n].copy_from_slice(&key[..n]);
        entry
    }

    /// Check if the entry is set.
    pub fn is_set(&self) -> bool {
        self.present != 0 && self.keylen != 0
    }
}

/// WEP key request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NwKey {
    /// [`nwkey::OPEN`] or [`nwkey::WEP`].
    pub wepon: u32,
    /// Default transmit key, 1-based.
    pub defkid: i32,
    pub keys: [NwKeyEntry; WEP_NKID],
}

impl NwKey {
    /// A request that turns WEP off.
    pub fn open() -> Self {
        Self::default()
    }

    /// A request that turns WEP on with the given default key.
    pub fn wep(defkid: i32) -> Self {
        Self {
            wepon: nwkey::WEP,
            defkid,
            ..Default::default()
        }
    }

    /// Set the key of a slot (0-based).
    pub fn with_key(mut self, slot: usize, key: &[u8]) -> Self {
        if let Some(entry) = self.keys.get_mut(slot) {
            *entry = NwKeyEntry::with_key(key);
        }
        self
    }

    /// A reply template asking for every slot.
    pub fn query() -> Self {
        let mut req = Self::default();
        for entry in &mut req.keys {
            entry.present = 1;
        }
        req
    }
}

/// WPA parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct WpaParams {
    pub enabled: u32,
    /// [`wpa_proto`] bits.
    pub protos: u32,
    /// [`wpa_akm`] bits.
    pub akms: u32,
    /// [`wpa_cipher`] bits.
    pub ciphers: u32,
    /// One [`wpa_cipher`] value.
    pub groupcipher: u32,
}

/// Pre-shared key request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct WpaPsk {
    pub enabled: u32,
    pub psk: [u8; PMK_LEN],
}

/// WMM request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct WmmParams {
    pub enabled: u32,
}

/// Power management request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Power {
    pub enabled: u32,
    /// Listen interval.
    pub maxsleep: i32,
}

/// BSSID request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Bssid {
    pub bssid: [u8; ADDR_LEN],
}

/// Channel request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct ChanReq {
    pub channel: u16,
}

/// One channel table entry.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct ChannelRec {
    pub freq: u16,
    pub flags: u16,
}

/// The whole channel table.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct ChanReqAll {
    pub chans: [ChannelRec; CHAN_MAX as usize + 1],
}

impl Default for ChanReqAll {
    fn default() -> Self {
        Self::new_zeroed()
    }
}

/// Transmit power request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct TxPower {
    pub val: i32,
}

/// Key-available notification for the PMKSA cache.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct KeyAvail {
    pub lifetime: u32,
    pub key: [u8; PMK_LEN],
    pub macaddr: [u8; ADDR_LEN],
    pub pad: [u8; 2],
}

/// Key handshake request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct KeyRun {
    pub macaddr: [u8; ADDR_LEN],
}

/// User flag window request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfFlags {
    pub flags: i32,
}

/// PHY mode request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct PhyModeReq {
    pub mode: u32,
}

/// Operating mode request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct OpModeReq {
    pub mode: u32,
}

/// Fixed rate request. The rate is in 500 kb/s units, -1 for none.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct FixedRate {
    pub rate: i32,
}

/// MTU request.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Mtu {
    pub mtu: u32,
}

/// Externally visible form of a peer node.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NodeReq {
    pub fails: u32,
    pub inact: u32,
    pub channel: u16,
    pub chan_flags: u16,
    pub capinfo: u16,
    pub intval: u16,
    pub associd: u16,
    pub txseq: u16,
    pub rxseq: u16,
    pub rssi: u8,
    pub max_rssi: u8,
    pub pwrsave: u8,
    pub txrate: u8,
    pub state: u8,
    /// [`nodereq`] bits.
    pub flags: u8,
    pub nwid_len: u8,
    pub nrates: u8,
    pub erp: u8,
    pub macaddr: [u8; ADDR_LEN],
    pub bssid: [u8; ADDR_LEN],
    pub nwid: [u8; NWID_LEN],
    pub rates: [u8; RATE_MAXSIZE],
    pub tstamp: [u8; 8],
    pub pad: [u8; 2],
}

impl NodeReq {
    /// A lookup request for an address.
    pub fn for_addr(macaddr: [u8; ADDR_LEN]) -> Self {
        Self {
            macaddr,
            ..Default::default()
        }
    }
}

/// Header of a node enumeration request; node records follow it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NodeReqAll {
    /// Bytes of record space the caller provides after the header.
    pub size: u32,
    /// Number of records filled in.
    pub nodes: u32,
}

impl NodeReqAll {
    /// Allocate a request buffer with room for `count` node records.
    pub fn buffer(count: usize) -> Vec<u8> {
        let mut buf = vec![0u8; Self::SIZE + count * NodeReq::SIZE];
        let header = Self {
            size: (count * NodeReq::SIZE) as u32,
            nodes: 0,
        };
        // The buffer is sized for the header.
        let _ = header.copy_out(&mut buf);
        buf
    }

    /// Decode the node records of a filled reply buffer.
    pub fn parse_reply(data: &[u8]) -> Result<Vec<NodeReq>> {
        let header = Self::copy_in(data)?;
        let body = &data[Self::SIZE..];
        (0..header.nodes as usize)
            .map(|i| NodeReq::copy_in(body.get(i * NodeReq::SIZE..).unwrap_or_default()))
            .collect()
    }
}

records!(
    Nwid, NwKey, WpaParams, WpaPsk, WmmParams, Power, Bssid, ChanReq, ChanReqAll, TxPower,
    KeyAvail, KeyRun, IfFlags, PhyModeReq, OpModeReq, FixedRate, Mtu, NodeReq, NodeReqAll,
);
