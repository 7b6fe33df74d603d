//! IEEE 802.11 constants, enumerations and typed flag sets.
//!
//! The interface keeps its capabilities, negotiated flags and security
//! selections as bit sets. Each set gets its own newtype so a capability bit
//! can never be tested against the negotiated flag word by accident.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::util::addr::{format_mac, parse_mac};

/// Length of an 802.11 MAC address.
pub const ADDR_LEN: usize = 6;
/// Maximum SSID length.
pub const NWID_LEN: usize = 32;
/// Maximum number of rates in a rate set.
pub const RATE_MAXSIZE: usize = 15;
/// Number of legacy WEP key slots.
pub const WEP_NKID: usize = 4;
/// Longest WEP key accepted from a request (a 104-bit key).
pub const WEP_KEY_MAXLEN: usize = 13;
/// Size of the key buffer in a WEP key request entry.
pub const KEYBUF_SIZE: usize = 16;
/// Size of the key buffer kept per key slot.
pub const KEY_MAXLEN: usize = 32;
/// Length of a pairwise master key / pre-shared key.
pub const PMK_LEN: usize = 32;
/// Highest channel number.
pub const CHAN_MAX: u16 = 255;
/// "Any channel" sentinel.
pub const CHAN_ANY: u16 = 0xffff;
/// Number of bytes in the channel activity bitmap.
pub const CHAN_BITMAP_LEN: usize = (CHAN_MAX as usize + 1) / 8;
/// Lowest accepted transmit power.
pub const TXPOWER_MIN: i32 = 0;
/// Highest accepted transmit power.
pub const TXPOWER_MAX: i32 = 100;
/// Fixed-rate value reported when no rate is pinned.
pub const FIXED_RATE_NONE: i32 = -1;
/// Default time a scan request waits for the scan cycle to finish.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Reason code: disassociated because the station is leaving.
pub const REASON_ASSOC_LEAVE: u16 = 8;
/// Reason code: deauthenticated because the station is leaving.
pub const REASON_AUTH_LEAVE: u16 = 3;

// ============================================================================
// Addresses
// ============================================================================

/// An 802.11 MAC address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(pub [u8; ADDR_LEN]);

impl MacAddr {
    /// The all-zero address.
    pub const ZERO: MacAddr = MacAddr([0; ADDR_LEN]);

    /// Create an address from raw bytes.
    pub const fn new(bytes: [u8; ADDR_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn octets(&self) -> [u8; ADDR_LEN] {
        self.0
    }

    /// Check if this is the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDR_LEN]
    }
}

impl From<[u8; ADDR_LEN]> for MacAddr {
    fn from(bytes: [u8; ADDR_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_mac(&self.0))
    }
}

impl FromStr for MacAddr {
    type Err = crate::util::AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_mac(s).map(Self)
    }
}

// ============================================================================
// Modes and states
// ============================================================================

/// PHY mode of the interface.
#[repr(u32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhyMode {
    /// Autoselect.
    #[default]
    Auto = 0,
    /// 5 GHz OFDM.
    Dot11a = 1,
    /// 2.4 GHz DSSS/CCK.
    Dot11b = 2,
    /// 2.4 GHz OFDM with CCK fallback.
    Dot11g = 3,
    /// 5 GHz turbo.
    Turbo = 4,
}

impl PhyMode {
    /// Number of PHY modes; raw values at or above this are invalid.
    pub const COUNT: u32 = 5;

    /// All PHY modes in numeric order.
    pub const ALL: [PhyMode; 5] = [
        PhyMode::Auto,
        PhyMode::Dot11a,
        PhyMode::Dot11b,
        PhyMode::Dot11g,
        PhyMode::Turbo,
    ];

    /// Convert from the raw request value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Get the mode name.
    pub fn name(&self) -> &'static str {
        match self {
            PhyMode::Auto => "auto",
            PhyMode::Dot11a => "11a",
            PhyMode::Dot11b => "11b",
            PhyMode::Dot11g => "11g",
            PhyMode::Turbo => "turbo",
        }
    }
}

impl fmt::Display for PhyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown PHY mode: {s}"))
    }
}

/// Operating mode of the interface.
#[repr(u32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OpMode {
    /// Independent BSS (ad-hoc).
    Ibss = 0,
    /// Infrastructure station.
    #[default]
    Sta = 1,
    /// Old lucent compatible ad-hoc demo mode.
    AhDemo = 3,
    /// Software access point.
    HostAp = 6,
    /// Monitor mode.
    Monitor = 8,
}

impl OpMode {
    /// Convert from the raw request value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(OpMode::Ibss),
            1 => Some(OpMode::Sta),
            3 => Some(OpMode::AhDemo),
            6 => Some(OpMode::HostAp),
            8 => Some(OpMode::Monitor),
            _ => None,
        }
    }

    /// Get the mode name.
    pub fn name(&self) -> &'static str {
        match self {
            OpMode::Ibss => "ibss",
            OpMode::Sta => "sta",
            OpMode::AhDemo => "ahdemo",
            OpMode::HostAp => "hostap",
            OpMode::Monitor => "monitor",
        }
    }
}

impl fmt::Display for OpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OpMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ibss" | "adhoc" => Ok(OpMode::Ibss),
            "sta" | "station" => Ok(OpMode::Sta),
            "ahdemo" => Ok(OpMode::AhDemo),
            "hostap" | "ap" => Ok(OpMode::HostAp),
            "monitor" => Ok(OpMode::Monitor),
            _ => Err(format!("unknown operating mode: {s}")),
        }
    }
}

/// 802.11 connection state, owned by the state machine.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConnState {
    #[default]
    Init = 0,
    Scan = 1,
    Auth = 2,
    Assoc = 3,
    Run = 4,
}

impl ConnState {
    /// True while no BSS has been selected yet (init or scanning).
    ///
    /// Queries answer from the desired configuration in these states and
    /// from the current BSS node otherwise.
    pub fn is_unassociated(&self) -> bool {
        matches!(self, ConnState::Init | ConnState::Scan)
    }

    /// Get the state name.
    pub fn name(&self) -> &'static str {
        match self {
            ConnState::Init => "init",
            ConnState::Scan => "scan",
            ConnState::Auth => "auth",
            ConnState::Assoc => "assoc",
            ConnState::Run => "run",
        }
    }
}

/// Per-node state.
///
/// Kept as the raw byte the node record carries; the named constants
/// are ordered so `>= NodeState::AUTH` means "authenticated or later".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeState(pub u8);

impl NodeState {
    pub const CACHE: NodeState = NodeState(0);
    pub const BSS: NodeState = NodeState(1);
    pub const AUTH: NodeState = NodeState(2);
    pub const ASSOC: NodeState = NodeState(3);
    pub const COLLECT: NodeState = NodeState(4);
}

/// Cipher kind of a key or RSN selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cipher {
    #[default]
    None,
    UseGroup,
    Wep40,
    Tkip,
    Ccmp,
    Wep104,
    Bip,
}

impl Cipher {
    /// Key length in bytes for this cipher.
    pub fn key_len(&self) -> usize {
        match self {
            Cipher::Wep40 => 5,
            Cipher::Wep104 => 13,
            Cipher::Tkip => 32,
            Cipher::Ccmp | Cipher::Bip => 16,
            Cipher::None | Cipher::UseGroup => 0,
        }
    }

    /// Check if this is one of the legacy WEP ciphers.
    pub fn is_wep(&self) -> bool {
        matches!(self, Cipher::Wep40 | Cipher::Wep104)
    }

    /// Classify a WEP key by its length.
    ///
    /// Keys of up to five bytes are 40-bit keys, anything longer is a
    /// 104-bit key.
    pub fn wep_for_len(len: usize) -> Self {
        if len <= Cipher::Wep40.key_len() {
            Cipher::Wep40
        } else {
            Cipher::Wep104
        }
    }

    /// Get the cipher name.
    pub fn name(&self) -> &'static str {
        match self {
            Cipher::None => "none",
            Cipher::UseGroup => "usegroup",
            Cipher::Wep40 => "wep40",
            Cipher::Tkip => "tkip",
            Cipher::Ccmp => "ccmp",
            Cipher::Wep104 => "wep104",
            Cipher::Bip => "bip",
        }
    }
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cipher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Cipher::None),
            "usegroup" => Ok(Cipher::UseGroup),
            "wep40" => Ok(Cipher::Wep40),
            "tkip" => Ok(Cipher::Tkip),
            "ccmp" => Ok(Cipher::Ccmp),
            "wep104" => Ok(Cipher::Wep104),
            "bip" => Ok(Cipher::Bip),
            _ => Err(format!("unknown cipher: {s}")),
        }
    }
}

/// Management frame subtypes the control plane asks the state machine to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MgmtFrame {
    Disassoc,
    Deauth,
}

// ============================================================================
// Flag sets
// ============================================================================

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            /// The empty set.
            pub const EMPTY: $name = $name(0);

            /// Create a set from raw bits.
            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            /// Raw bits.
            pub const fn bits(&self) -> u32 {
                self.0
            }

            /// Check if every bit of `other` is set.
            pub const fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            /// Check if any bit of `other` is set.
            pub const fn intersects(&self, other: $name) -> bool {
                self.0 & other.0 != 0
            }

            /// Check if no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }

            /// Set the bits of `other`.
            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }

            /// Clear the bits of `other`.
            pub fn remove(&mut self, other: $name) {
                self.0 &= !other.0;
            }

            /// Set or clear the bits of `other`.
            pub fn set(&mut self, other: $name, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }

            /// Union of two sets.
            pub const fn union(self, other: $name) -> Self {
                Self(self.0 | other.0)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                self.union(rhs)
            }
        }
    };
}

flag_set!(
    /// Hardware capabilities, fixed at attach.
    Caps
);

impl Caps {
    pub const WEP: Caps = Caps(0x0000_0001);
    pub const IBSS: Caps = Caps(0x0000_0002);
    pub const PMGT: Caps = Caps(0x0000_0004);
    pub const HOSTAP: Caps = Caps(0x0000_0008);
    pub const AHDEMO: Caps = Caps(0x0000_0010);
    pub const SWRETRY: Caps = Caps(0x0000_0020);
    pub const TXPMGT: Caps = Caps(0x0000_0040);
    pub const SHSLOT: Caps = Caps(0x0000_0080);
    pub const SHPREAMBLE: Caps = Caps(0x0000_0100);
    pub const MONITOR: Caps = Caps(0x0000_0200);
    pub const SCANALL: Caps = Caps(0x0000_0400);
    pub const QOS: Caps = Caps(0x0000_0800);
    pub const RSN: Caps = Caps(0x0000_1000);
    pub const MFP: Caps = Caps(0x0000_2000);

    const NAMES: [(&'static str, Caps); 14] = [
        ("wep", Caps::WEP),
        ("ibss", Caps::IBSS),
        ("pmgt", Caps::PMGT),
        ("hostap", Caps::HOSTAP),
        ("ahdemo", Caps::AHDEMO),
        ("swretry", Caps::SWRETRY),
        ("txpmgt", Caps::TXPMGT),
        ("shslot", Caps::SHSLOT),
        ("shpreamble", Caps::SHPREAMBLE),
        ("monitor", Caps::MONITOR),
        ("scanall", Caps::SCANALL),
        ("qos", Caps::QOS),
        ("rsn", Caps::RSN),
        ("mfp", Caps::MFP),
    ];

    /// Every capability bit.
    pub fn all() -> Self {
        Self::NAMES
            .iter()
            .fold(Caps::EMPTY, |acc, (_, cap)| acc | *cap)
    }

    /// Look up a capability by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, cap)| *cap)
    }

    /// Names of the capabilities in this set.
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, cap)| self.contains(*cap))
            .map(|(n, _)| *n)
            .collect()
    }

    pub fn has_wep(&self) -> bool {
        self.contains(Caps::WEP)
    }

    pub fn has_rsn(&self) -> bool {
        self.contains(Caps::RSN)
    }

    pub fn has_qos(&self) -> bool {
        self.contains(Caps::QOS)
    }

    pub fn has_pmgt(&self) -> bool {
        self.contains(Caps::PMGT)
    }

    pub fn has_txpmgt(&self) -> bool {
        self.contains(Caps::TXPMGT)
    }
}

flag_set!(
    /// Negotiated interface flags.
    ///
    /// Bits 28..31 form the user flag window exposed through the raw
    /// flags request.
    IcFlags
);

impl IcFlags {
    pub const ASCAN: IcFlags = IcFlags(0x0000_0001);
    pub const SIBSS: IcFlags = IcFlags(0x0000_0002);
    pub const WEPON: IcFlags = IcFlags(0x0000_0100);
    pub const IBSSON: IcFlags = IcFlags(0x0000_0200);
    pub const PMGTON: IcFlags = IcFlags(0x0000_0400);
    pub const DESBSSID: IcFlags = IcFlags(0x0000_0800);
    pub const ROAMING: IcFlags = IcFlags(0x0000_2000);
    pub const TXPOW_FIXED: IcFlags = IcFlags(0x0000_8000);
    pub const TXPOW_AUTO: IcFlags = IcFlags(0x0001_0000);
    pub const SHSLOT: IcFlags = IcFlags(0x0002_0000);
    pub const SHPREAMBLE: IcFlags = IcFlags(0x0004_0000);
    pub const QOS: IcFlags = IcFlags(0x0008_0000);
    pub const USEPROT: IcFlags = IcFlags(0x0010_0000);
    pub const RSNON: IcFlags = IcFlags(0x0020_0000);
    pub const PSK: IcFlags = IcFlags(0x0040_0000);
    pub const COUNTERM: IcFlags = IcFlags(0x0080_0000);
    pub const MFPR: IcFlags = IcFlags(0x0100_0000);
    pub const BGSCAN: IcFlags = IcFlags(0x0200_0000);

    /// Don't advertise the SSID (host-AP only).
    pub const HIDENWID: IcFlags = IcFlags(0x1000_0000);
    /// Don't bridge frames between stations (host-AP only).
    pub const NOBRIDGE: IcFlags = IcFlags(0x2000_0000);
    /// Ignore deauthentication frames.
    pub const STAYAUTH: IcFlags = IcFlags(0x4000_0000);

    /// Shift of the user flag window.
    pub const USERSHIFT: u32 = 28;
    /// The user flag window.
    pub const USERMASK: IcFlags = IcFlags(0xf000_0000);
    /// User flags only meaningful in host-AP mode.
    pub const HOSTAPMASK: IcFlags = IcFlags(0x3000_0000);

    pub fn wep_on(&self) -> bool {
        self.contains(IcFlags::WEPON)
    }

    pub fn rsn_on(&self) -> bool {
        self.contains(IcFlags::RSNON)
    }

    pub fn psk_on(&self) -> bool {
        self.contains(IcFlags::PSK)
    }

    pub fn pmgt_on(&self) -> bool {
        self.contains(IcFlags::PMGTON)
    }

    pub fn qos_on(&self) -> bool {
        self.contains(IcFlags::QOS)
    }

    pub fn ibss_on(&self) -> bool {
        self.contains(IcFlags::IBSSON)
    }

    pub fn des_bssid(&self) -> bool {
        self.contains(IcFlags::DESBSSID)
    }
}

flag_set!(
    /// Selected RSN protocol versions.
    ProtoSet
);

impl ProtoSet {
    /// RSN (WPA2).
    pub const RSN: ProtoSet = ProtoSet(1 << 0);
    /// Original WPA.
    pub const WPA: ProtoSet = ProtoSet(1 << 1);
}

flag_set!(
    /// Selected authentication and key management suites.
    AkmSet
);

impl AkmSet {
    pub const IEEE8021X: AkmSet = AkmSet(1 << 0);
    pub const PSK: AkmSet = AkmSet(1 << 1);
    pub const SHA256_8021X: AkmSet = AkmSet(1 << 2);
    pub const SHA256_PSK: AkmSet = AkmSet(1 << 3);
}

flag_set!(
    /// A set of ciphers (pairwise cipher selection).
    CipherSet
);

impl CipherSet {
    pub const USEGROUP: CipherSet = CipherSet(1 << 0);
    pub const WEP40: CipherSet = CipherSet(1 << 1);
    pub const TKIP: CipherSet = CipherSet(1 << 2);
    pub const CCMP: CipherSet = CipherSet(1 << 3);
    pub const WEP104: CipherSet = CipherSet(1 << 4);
    pub const BIP: CipherSet = CipherSet(1 << 5);
}

impl From<Cipher> for CipherSet {
    fn from(cipher: Cipher) -> Self {
        match cipher {
            Cipher::None => CipherSet::EMPTY,
            Cipher::UseGroup => CipherSet::USEGROUP,
            Cipher::Wep40 => CipherSet::WEP40,
            Cipher::Tkip => CipherSet::TKIP,
            Cipher::Ccmp => CipherSet::CCMP,
            Cipher::Wep104 => CipherSet::WEP104,
            Cipher::Bip => CipherSet::BIP,
        }
    }
}

flag_set!(
    /// Scan coordination flags shared with the state machine.
    ScanLockFlags
);

impl ScanLockFlags {
    /// A scan has been requested and not yet completed.
    pub const REQUEST: ScanLockFlags = ScanLockFlags(0x01);
    /// A scan cycle is running.
    pub const LOCKED: ScanLockFlags = ScanLockFlags(0x02);
    /// The running cycle must restart when it finishes.
    pub const RESUME: ScanLockFlags = ScanLockFlags(0x04);
}

flag_set!(
    /// Flags of an installed key.
    KeyFlags
);

impl KeyFlags {
    pub const GROUP: KeyFlags = KeyFlags(0x01);
    pub const TX: KeyFlags = KeyFlags(0x02);
}

flag_set!(
    /// A set of PHY modes (supported-mode capability).
    ModeSet
);

impl ModeSet {
    /// Set containing a single mode.
    pub const fn of(mode: PhyMode) -> Self {
        Self(1 << mode as u32)
    }

    /// Check if a mode is in the set.
    pub const fn has(&self, mode: PhyMode) -> bool {
        self.contains(Self::of(mode))
    }

    /// Modes in the set, in numeric order.
    pub fn modes(&self) -> Vec<PhyMode> {
        PhyMode::ALL.into_iter().filter(|m| self.has(*m)).collect()
    }
}

impl FromIterator<PhyMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = PhyMode>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ModeSet::EMPTY, |acc, m| acc | ModeSet::of(m))
    }
}
