//! Core types for declarative interface configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ieee80211::command::Command;
use crate::ieee80211::error::{Error, Result};
use crate::ieee80211::mode::get_fixed_rate;
use crate::ieee80211::records::{
    Bssid, ChanReq, FixedRate, IntoBytes, NwKey, Nwid, OpModeReq, PhyModeReq, Power, TxPower,
    WmmParams, WpaParams, WpaPsk, wpa_akm, wpa_cipher, wpa_proto,
};
use crate::ieee80211::state::{InterfaceState, InterfaceStateBuilder};
use crate::ieee80211::types::{
    CHAN_ANY, Caps, MacAddr, ModeSet, NWID_LEN, OpMode, PMK_LEN, PhyMode, WEP_NKID,
};
use crate::util::{format_mac, parse_channel_list, parse_hex, parse_mac};

/// A profile: how to attach an interface and what to configure on it.
///
/// # Example
///
/// ```ignore
/// let profile = Profile::load("office.json")?;
/// let state = profile.attach.build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub attach: AttachConfig,
    #[serde(default)]
    pub desired: DesiredConfig,
}

impl Profile {
    /// Parse a profile from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a profile from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}

/// Hardware description of an interface at attach time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachConfig {
    pub name: String,
    /// Own MAC address, colon separated.
    pub address: String,
    /// Capability names, e.g. `["wep", "rsn", "txpmgt"]`.
    #[serde(default)]
    pub caps: Vec<String>,
    /// Supported PHY modes. Empty means every mode.
    #[serde(default)]
    pub modes: Vec<String>,
    /// Active channels, e.g. `"1-11,36,40"`.
    #[serde(default)]
    pub channels: String,
    #[serde(default)]
    pub opmode: Option<String>,
    #[serde(default)]
    pub phymode: Option<String>,
    #[serde(default)]
    pub max_nodes: Option<usize>,
    #[serde(default)]
    pub max_rssi: Option<u8>,
    #[serde(default)]
    pub scan_timeout_ms: Option<u64>,
}

impl AttachConfig {
    /// Translate into a state builder.
    pub fn builder(&self) -> Result<InterfaceStateBuilder> {
        let addr = parse_mac(&self.address).map_err(|e| Error::Config(e.to_string()))?;
        let mut builder = InterfaceState::builder(self.name.clone(), MacAddr::new(addr));

        let mut caps = Caps::EMPTY;
        for name in &self.caps {
            let cap = Caps::from_name(name)
                .ok_or_else(|| Error::Config(format!("unknown capability '{name}'")))?;
            caps.insert(cap);
        }
        builder = builder.caps(caps);

        if !self.modes.is_empty() {
            let modes = self
                .modes
                .iter()
                .map(|m| m.parse::<PhyMode>().map_err(Error::Config))
                .collect::<Result<ModeSet>>()?;
            builder = builder.mode_caps(modes);
        }

        if !self.channels.trim().is_empty() {
            let channels =
                parse_channel_list(&self.channels).map_err(|e| Error::Config(e.to_string()))?;
            builder = builder.channels(channels);
        }

        if let Some(mode) = &self.opmode {
            builder = builder.opmode(mode.parse().map_err(Error::Config)?);
        }
        if let Some(mode) = &self.phymode {
            builder = builder.phymode(mode.parse().map_err(Error::Config)?);
        }
        if let Some(n) = self.max_nodes {
            builder = builder.max_nodes(n);
        }
        if let Some(rssi) = self.max_rssi {
            builder = builder.max_rssi(rssi);
        }
        if let Some(ms) = self.scan_timeout_ms {
            builder = builder.scan_timeout(Duration::from_millis(ms));
        }

        Ok(builder)
    }

    /// Build the interface state.
    pub fn build(&self) -> Result<InterfaceState> {
        Ok(self.builder()?.build())
    }
}

/// Desired interface settings.
///
/// Every field is optional; only the present ones are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredConfig {
    #[serde(default)]
    pub opmode: Option<String>,
    #[serde(default)]
    pub phymode: Option<String>,
    /// Channel number or `"any"`.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ssid: Option<String>,
    /// Desired BSSID; the all-zero address clears it.
    #[serde(default)]
    pub bssid: Option<String>,
    /// Fixed rate in 500 kb/s units.
    #[serde(default)]
    pub fixed_rate: Option<i32>,
    #[serde(default)]
    pub txpower: Option<i32>,
    #[serde(default)]
    pub power: Option<PowerConfig>,
    #[serde(default)]
    pub wmm: Option<bool>,
    #[serde(default)]
    pub wep: Option<WepConfig>,
    #[serde(default)]
    pub wpa: Option<WpaConfig>,
    /// Pre-shared key as 64 hex digits.
    #[serde(default)]
    pub psk: Option<String>,
}

/// Power management settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerConfig {
    pub enabled: bool,
    pub listen_interval: i32,
}

/// WEP settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WepConfig {
    pub enabled: bool,
    /// Default transmit key, 1-based.
    #[serde(default = "default_wep_key")]
    pub default_key: i32,
    /// Hex key material per slot; an empty string leaves the slot alone.
    #[serde(default)]
    pub keys: Vec<String>,
}

fn default_wep_key() -> i32 {
    1
}

/// WPA settings. Empty lists select the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WpaConfig {
    pub enabled: bool,
    #[serde(default)]
    pub protos: Vec<String>,
    #[serde(default)]
    pub akms: Vec<String>,
    #[serde(default)]
    pub ciphers: Vec<String>,
    #[serde(default)]
    pub group_cipher: Option<String>,
}

fn lookup(kind: &str, table: &[(&str, u32)], name: &str) -> Result<u32> {
    table
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| *v)
        .ok_or_else(|| Error::Config(format!("unknown {kind} '{name}'")))
}

fn lookup_all(kind: &str, table: &[(&str, u32)], names: &[String]) -> Result<u32> {
    names
        .iter()
        .try_fold(0, |acc, n| Ok(acc | lookup(kind, table, n)?))
}

const PROTO_NAMES: [(&str, u32); 4] = [
    ("wpa", wpa_proto::WPA1),
    ("wpa1", wpa_proto::WPA1),
    ("rsn", wpa_proto::WPA2),
    ("wpa2", wpa_proto::WPA2),
];

const AKM_NAMES: [(&str, u32); 4] = [
    ("psk", wpa_akm::PSK),
    ("802.1x", wpa_akm::IEEE8021X),
    ("sha256-psk", wpa_akm::SHA256_PSK),
    ("sha256-802.1x", wpa_akm::SHA256_8021X),
];

const CIPHER_NAMES: [(&str, u32); 5] = [
    ("usegroup", wpa_cipher::USEGROUP),
    ("wep40", wpa_cipher::WEP40),
    ("tkip", wpa_cipher::TKIP),
    ("ccmp", wpa_cipher::CCMP),
    ("wep104", wpa_cipher::WEP104),
];

impl WpaConfig {
    /// Encode as a WPA parameters request.
    pub fn to_params(&self) -> Result<WpaParams> {
        let groupcipher = match &self.group_cipher {
            Some(name) => lookup("cipher", &CIPHER_NAMES[1..], name)?,
            None => wpa_cipher::NONE,
        };
        Ok(WpaParams {
            enabled: u32::from(self.enabled),
            protos: lookup_all("protocol", &PROTO_NAMES, &self.protos)?,
            akms: lookup_all("AKM", &AKM_NAMES, &self.akms)?,
            ciphers: lookup_all("cipher", &CIPHER_NAMES, &self.ciphers)?,
            groupcipher,
        })
    }
}

impl WepConfig {
    /// Encode as a WEP key request.
    pub fn to_request(&self) -> Result<NwKey> {
        if !self.enabled {
            return Ok(NwKey::open());
        }
        if self.keys.len() > WEP_NKID {
            return Err(Error::Config(format!(
                "{} WEP keys given, at most {WEP_NKID} slots",
                self.keys.len()
            )));
        }

        let mut req = NwKey::wep(self.default_key);
        for (slot, hex) in self.keys.iter().enumerate() {
            if hex.is_empty() {
                continue;
            }
            let key = parse_hex(hex).map_err(|e| Error::Config(e.to_string()))?;
            req = req.with_key(slot, &key);
        }
        Ok(req)
    }
}

/// One command a desired configuration translates to.
#[derive(Debug, Clone)]
pub struct PlannedCommand {
    /// Human-readable description.
    pub operation: String,
    pub command: Command,
    /// Encoded request record.
    pub payload: Vec<u8>,
}

impl PlannedCommand {
    fn new(operation: impl Into<String>, command: Command, payload: &[u8]) -> Self {
        Self {
            operation: operation.into(),
            command,
            payload: payload.to_vec(),
        }
    }
}

impl DesiredConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.plan().map(|p| p.is_empty()).unwrap_or(false)
    }

    /// Translate into commands, in the order they are applied.
    ///
    /// Modes go first since channel and rate validity depend on them.
    /// Security settings go last. Every value is parsed here, so a
    /// malformed configuration fails before any command is issued.
    pub fn plan(&self) -> Result<Vec<PlannedCommand>> {
        let mut plan = Vec::new();

        if let Some(mode) = &self.opmode {
            let mode: OpMode = mode.parse().map_err(Error::Config)?;
            let req = OpModeReq { mode: mode as u32 };
            plan.push(PlannedCommand::new(
                format!("set operating mode {mode}"),
                Command::SetOpMode,
                req.as_bytes(),
            ));
        }

        if let Some(mode) = &self.phymode {
            let mode: PhyMode = mode.parse().map_err(Error::Config)?;
            let req = PhyModeReq { mode: mode as u32 };
            plan.push(PlannedCommand::new(
                format!("set PHY mode {mode}"),
                Command::SetPhyMode,
                req.as_bytes(),
            ));
        }

        if let Some(chan) = &self.channel {
            let channel = if chan.eq_ignore_ascii_case("any") {
                CHAN_ANY
            } else {
                chan.parse()
                    .map_err(|_| Error::Config(format!("invalid channel '{chan}'")))?
            };
            let req = ChanReq { channel };
            plan.push(PlannedCommand::new(
                format!("set channel {chan}"),
                Command::SetChannel,
                req.as_bytes(),
            ));
        }

        if let Some(ssid) = &self.ssid {
            if ssid.len() > NWID_LEN {
                return Err(Error::Config(format!(
                    "SSID '{ssid}' longer than {NWID_LEN} bytes"
                )));
            }
            let req = Nwid::from_ssid(ssid.as_bytes());
            plan.push(PlannedCommand::new(
                format!("set SSID '{ssid}'"),
                Command::SetNwid,
                req.as_bytes(),
            ));
        }

        if let Some(bssid) = &self.bssid {
            let bssid = parse_mac(bssid).map_err(|e| Error::Config(e.to_string()))?;
            let req = Bssid { bssid };
            plan.push(PlannedCommand::new(
                format!("set BSSID {}", format_mac(&bssid)),
                Command::SetBssid,
                req.as_bytes(),
            ));
        }

        if let Some(rate) = self.fixed_rate {
            let req = FixedRate { rate };
            plan.push(PlannedCommand::new(
                format!("set fixed rate {rate}"),
                Command::SetFixedRate,
                req.as_bytes(),
            ));
        }

        if let Some(val) = self.txpower {
            let req = TxPower { val };
            plan.push(PlannedCommand::new(
                format!("set tx power {val}"),
                Command::SetTxPower,
                req.as_bytes(),
            ));
        }

        if let Some(power) = &self.power {
            let req = Power {
                enabled: u32::from(power.enabled),
                maxsleep: power.listen_interval,
            };
            plan.push(PlannedCommand::new(
                format!(
                    "set power management {} (listen interval {})",
                    on_off(power.enabled),
                    power.listen_interval
                ),
                Command::SetPower,
                req.as_bytes(),
            ));
        }

        if let Some(enabled) = self.wmm {
            let req = WmmParams {
                enabled: u32::from(enabled),
            };
            plan.push(PlannedCommand::new(
                format!("set WMM {}", on_off(enabled)),
                Command::SetWmmParams,
                req.as_bytes(),
            ));
        }

        if let Some(wep) = &self.wep {
            let req = wep.to_request()?;
            plan.push(PlannedCommand::new(
                format!("set WEP {}", on_off(wep.enabled)),
                Command::SetNwKey,
                req.as_bytes(),
            ));
        }

        if let Some(wpa) = &self.wpa {
            let req = wpa.to_params()?;
            plan.push(PlannedCommand::new(
                format!("set WPA {}", on_off(wpa.enabled)),
                Command::SetWpaParams,
                req.as_bytes(),
            ));
        }

        if let Some(psk) = &self.psk {
            let bytes = parse_hex(psk).map_err(|e| Error::Config(e.to_string()))?;
            let psk: [u8; PMK_LEN] = bytes.as_slice().try_into().map_err(|_| {
                Error::Config(format!(
                    "PSK must be {PMK_LEN} bytes, got {}",
                    bytes.len()
                ))
            })?;
            let req = WpaPsk { enabled: 1, psk };
            plan.push(PlannedCommand::new("set PSK", Command::SetWpaPsk, req.as_bytes()));
        }

        Ok(plan)
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// Serializable view of an interface's configuration.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceSnapshot {
    pub name: String,
    pub address: String,
    pub caps: Vec<&'static str>,
    pub opmode: &'static str,
    pub phymode: &'static str,
    pub state: &'static str,
    pub ssid: String,
    pub bssid: Option<String>,
    /// `None` for any channel.
    pub channel: Option<u16>,
    pub ibss_channel: u16,
    pub channels: Vec<u16>,
    /// Fixed rate in 500 kb/s units, `None` for automatic.
    pub fixed_rate: Option<i32>,
    pub txpower: u16,
    pub listen_interval: u16,
    pub power_management: bool,
    pub wmm: bool,
    pub wep: bool,
    pub wep_default_key: usize,
    pub wep_keys: Vec<Option<&'static str>>,
    pub rsn: bool,
    pub psk: bool,
    pub rsn_group_cipher: &'static str,
    pub nodes: usize,
}

impl InterfaceSnapshot {
    /// Capture the configuration of an interface.
    pub fn capture(ic: &InterfaceState) -> Self {
        let flags = ic.flags();
        let rate = get_fixed_rate(ic);
        Self {
            name: ic.name().to_string(),
            address: ic.myaddr().to_string(),
            caps: ic.caps().names(),
            opmode: ic.opmode().name(),
            phymode: ic.cur_mode().name(),
            state: ic.conn_state().name(),
            ssid: String::from_utf8_lossy(ic.des_essid()).into_owned(),
            bssid: flags.des_bssid().then(|| ic.des_bssid().to_string()),
            channel: ic.des_chan(),
            ibss_channel: ic.ibss_chan(),
            channels: ic.active_channels(),
            fixed_rate: (rate > 0).then_some(rate),
            txpower: ic.txpower(),
            listen_interval: ic.lintval(),
            power_management: flags.pmgt_on(),
            wmm: flags.qos_on(),
            wep: flags.wep_on(),
            wep_default_key: ic.def_txkey() + 1,
            wep_keys: ic
                .keys()
                .iter()
                .map(|k| k.is_active().then(|| k.cipher.name()))
                .collect(),
            rsn: flags.rsn_on(),
            psk: flags.psk_on(),
            rsn_group_cipher: ic.rsn_group_cipher().name(),
            nodes: ic.nodes().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::records::{Record, nwkey};

    const PROFILE: &str = r#"{
        "attach": {
            "name": "wlan0",
            "address": "02:00:00:00:00:01",
            "caps": ["wep", "rsn", "txpmgt", "pmgt"],
            "modes": ["11b", "11g"],
            "channels": "1-11,36",
            "max_nodes": 16
        },
        "desired": {
            "ssid": "office",
            "channel": "6",
            "fixed_rate": 22,
            "wpa": { "enabled": true, "protos": ["rsn"], "ciphers": ["ccmp"] },
            "psk": "0x0101010101010101010101010101010101010101010101010101010101010101"
        }
    }"#;

    #[test]
    fn test_profile_parse() {
        let profile = Profile::from_json(PROFILE).unwrap();
        let state = profile.attach.build().unwrap();

        assert_eq!(state.name(), "wlan0");
        assert!(state.caps().has_rsn());
        assert!(!state.caps().has_qos());
        assert!(state.mode_caps().has(PhyMode::Dot11g));
        assert!(!state.mode_caps().has(PhyMode::Dot11a));
        assert_eq!(state.active_channels().len(), 12);
        assert_eq!(state.nodes().capacity(), 16);
    }

    #[test]
    fn test_attach_rejects_unknown_capability() {
        let attach = AttachConfig {
            name: "wlan0".into(),
            address: "02:00:00:00:00:01".into(),
            caps: vec!["teleport".into()],
            ..Default::default()
        };
        let err = attach.build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_attach_rejects_bad_address() {
        let attach = AttachConfig {
            name: "wlan0".into(),
            address: "not-a-mac".into(),
            ..Default::default()
        };
        assert!(attach.build().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Profile::from_json(r#"{"attach": {"name": "x", "address": "02:00:00:00:00:01", "bogus": 1}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_plan_order() {
        let profile = Profile::from_json(PROFILE).unwrap();
        let plan = profile.desired.plan().unwrap();
        let commands: Vec<_> = plan.iter().map(|p| p.command).collect();
        assert_eq!(
            commands,
            vec![
                Command::SetChannel,
                Command::SetNwid,
                Command::SetFixedRate,
                Command::SetWpaParams,
                Command::SetWpaPsk,
            ]
        );

        let wpa = WpaParams::copy_in(&plan[3].payload).unwrap();
        assert_eq!(wpa.protos, wpa_proto::WPA2);
        assert_eq!(wpa.ciphers, wpa_cipher::CCMP);
        assert_eq!(wpa.akms, 0);
    }

    #[test]
    fn test_plan_rejects_short_psk() {
        let desired = DesiredConfig {
            psk: Some("abcd".into()),
            ..Default::default()
        };
        assert!(matches!(desired.plan().unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_channel_any() {
        let desired = DesiredConfig {
            channel: Some("any".into()),
            ..Default::default()
        };
        let plan = desired.plan().unwrap();
        assert_eq!(ChanReq::copy_in(&plan[0].payload).unwrap().channel, CHAN_ANY);
    }

    #[test]
    fn test_wep_request() {
        let wep = WepConfig {
            enabled: true,
            default_key: 2,
            keys: vec!["".into(), "0102030405".into()],
        };
        let req = wep.to_request().unwrap();
        assert_eq!(req.wepon, nwkey::WEP);
        assert_eq!(req.defkid, 2);
        assert!(!req.keys[0].is_set());
        assert_eq!(req.keys[1].keylen, 5);

        let off = WepConfig::default().to_request().unwrap();
        assert_eq!(off.wepon, nwkey::OPEN);
    }

    #[test]
    fn test_empty_desired() {
        assert!(DesiredConfig::new().is_empty());
    }
}
