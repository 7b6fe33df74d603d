//! WPA/RSN parameter policy.
//!
//! Requests use the [`wpa_proto`], [`wpa_akm`] and [`wpa_cipher`] wire
//! values; the interface keeps its own typed sets. Empty selections resolve
//! to fixed defaults so an enabled RSN configuration never has an empty set.

use tracing::debug;

use super::error::{Error, Outcome, Result};
use super::records::{WpaParams, wpa_akm, wpa_cipher, wpa_proto};
use super::state::InterfaceState;
use super::types::{AkmSet, Cipher, CipherSet, IcFlags, ProtoSet};

const PROTO_MAP: [(u32, ProtoSet); 2] = [
    (wpa_proto::WPA1, ProtoSet::WPA),
    (wpa_proto::WPA2, ProtoSet::RSN),
];

const AKM_MAP: [(u32, AkmSet); 4] = [
    (wpa_akm::PSK, AkmSet::PSK),
    (wpa_akm::SHA256_PSK, AkmSet::SHA256_PSK),
    (wpa_akm::IEEE8021X, AkmSet::IEEE8021X),
    (wpa_akm::SHA256_8021X, AkmSet::SHA256_8021X),
];

const GROUP_CIPHER_MAP: [(u32, Cipher); 4] = [
    (wpa_cipher::WEP40, Cipher::Wep40),
    (wpa_cipher::TKIP, Cipher::Tkip),
    (wpa_cipher::CCMP, Cipher::Ccmp),
    (wpa_cipher::WEP104, Cipher::Wep104),
];

const PAIRWISE_CIPHER_MAP: [(u32, CipherSet); 2] = [
    (wpa_cipher::TKIP, CipherSet::TKIP),
    (wpa_cipher::CCMP, CipherSet::CCMP),
];

/// Protocols selected when the request names none.
pub const DEFAULT_PROTOS: ProtoSet = ProtoSet::WPA.union(ProtoSet::RSN);
/// AKMs selected when the request names none.
pub const DEFAULT_AKMS: AkmSet = AkmSet::PSK;
/// Pairwise ciphers selected when the request names none.
pub const DEFAULT_CIPHERS: CipherSet = CipherSet::TKIP.union(CipherSet::CCMP);

fn decode_bits<T: Copy>(raw: u32, map: &[(u32, T)], empty: T, union: fn(T, T) -> T) -> T {
    map.iter()
        .filter(|(bit, _)| raw & bit != 0)
        .fold(empty, |acc, (_, v)| union(acc, *v))
}

/// Resolve the protocol set of a request.
pub fn resolve_protos(raw: u32) -> ProtoSet {
    let protos = decode_bits(raw, &PROTO_MAP, ProtoSet::EMPTY, ProtoSet::union);
    if protos.is_empty() {
        DEFAULT_PROTOS
    } else {
        protos
    }
}

/// Resolve the AKM set of a request.
pub fn resolve_akms(raw: u32) -> AkmSet {
    let akms = decode_bits(raw, &AKM_MAP, AkmSet::EMPTY, AkmSet::union);
    if akms.is_empty() { DEFAULT_AKMS } else { akms }
}

/// Resolve the group cipher of a request.
///
/// Unrecognized values fall back to TKIP when WPA1 is among the protocols
/// and to CCMP otherwise.
pub fn resolve_group_cipher(raw: u32, protos: ProtoSet) -> Cipher {
    GROUP_CIPHER_MAP
        .iter()
        .find(|(value, _)| *value == raw)
        .map(|(_, cipher)| *cipher)
        .unwrap_or(if protos.contains(ProtoSet::WPA) {
            Cipher::Tkip
        } else {
            Cipher::Ccmp
        })
}

/// Resolve the pairwise cipher set of a request.
///
/// The use-group bit replaces any other selection.
pub fn resolve_ciphers(raw: u32) -> CipherSet {
    let mut ciphers = decode_bits(raw, &PAIRWISE_CIPHER_MAP, CipherSet::EMPTY, CipherSet::union);
    if raw & wpa_cipher::USEGROUP != 0 {
        ciphers = CipherSet::USEGROUP;
    }
    if ciphers.is_empty() {
        DEFAULT_CIPHERS
    } else {
        ciphers
    }
}

/// Apply a WPA parameter request.
pub fn set_wpaparams(ic: &mut InterfaceState, req: &WpaParams) -> Result<Outcome> {
    if !ic.caps.has_rsn() {
        return Err(Error::NoDevice);
    }

    if req.enabled == 0 {
        if !ic.flags.rsn_on() {
            return Ok(Outcome::Applied);
        }
        ic.flags.remove(IcFlags::RSNON);
        debug!(iface = %ic.name, "RSN disabled");
        return Ok(Outcome::ResetRequired);
    }

    ic.rsn_protos = resolve_protos(req.protos);
    ic.rsn_akms = resolve_akms(req.akms);
    ic.rsn_group_cipher = resolve_group_cipher(req.groupcipher, ic.rsn_protos);
    ic.rsn_ciphers = resolve_ciphers(req.ciphers);
    ic.flags.insert(IcFlags::RSNON);

    debug!(
        iface = %ic.name,
        protos = ic.rsn_protos.bits(),
        akms = ic.rsn_akms.bits(),
        group = %ic.rsn_group_cipher,
        ciphers = ic.rsn_ciphers.bits(),
        "RSN enabled"
    );

    Ok(Outcome::ResetRequired)
}

/// Build the WPA parameter reply.
pub fn get_wpaparams(ic: &InterfaceState) -> WpaParams {
    let protos = PROTO_MAP
        .iter()
        .filter(|(_, p)| ic.rsn_protos.contains(*p))
        .fold(0, |acc, (bit, _)| acc | bit);

    let akms = AKM_MAP
        .iter()
        .filter(|(_, a)| ic.rsn_akms.contains(*a))
        .fold(0, |acc, (bit, _)| acc | bit);

    let groupcipher = GROUP_CIPHER_MAP
        .iter()
        .find(|(_, c)| *c == ic.rsn_group_cipher)
        .map_or(wpa_cipher::NONE, |(value, _)| *value);

    let mut ciphers = PAIRWISE_CIPHER_MAP
        .iter()
        .filter(|(_, c)| ic.rsn_ciphers.contains(*c))
        .fold(0, |acc, (bit, _)| acc | bit);
    if ic.rsn_ciphers.contains(CipherSet::USEGROUP) {
        ciphers = wpa_cipher::USEGROUP;
    }

    WpaParams {
        enabled: u32::from(ic.flags.rsn_on()),
        protos,
        akms,
        ciphers,
        groupcipher,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::fixtures::test_state;
    use crate::ieee80211::types::Caps;

    fn enabled(protos: u32, akms: u32, ciphers: u32, groupcipher: u32) -> WpaParams {
        WpaParams {
            enabled: 1,
            protos,
            akms,
            ciphers,
            groupcipher,
        }
    }

    #[test]
    fn test_requires_rsn_capability() {
        let mut ic = test_state();
        ic.caps.remove(Caps::RSN);
        let err = set_wpaparams(&mut ic, &enabled(0, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, Error::NoDevice));
    }

    #[test]
    fn test_disable() {
        let mut ic = test_state();
        let off = WpaParams::default();
        assert_eq!(set_wpaparams(&mut ic, &off).unwrap(), Outcome::Applied);

        set_wpaparams(&mut ic, &enabled(0, 0, 0, 0)).unwrap();
        assert_eq!(set_wpaparams(&mut ic, &off).unwrap(), Outcome::ResetRequired);
        assert!(!ic.flags.rsn_on());
    }

    #[test]
    fn test_empty_request_uses_defaults() {
        let mut ic = test_state();
        let outcome = set_wpaparams(&mut ic, &enabled(0, 0, 0, 0)).unwrap();
        assert_eq!(outcome, Outcome::ResetRequired);
        assert!(ic.flags.rsn_on());
        assert_eq!(ic.rsn_protos, ProtoSet::WPA | ProtoSet::RSN);
        assert_eq!(ic.rsn_akms, AkmSet::PSK);
        assert_eq!(ic.rsn_ciphers, CipherSet::TKIP | CipherSet::CCMP);
        assert_eq!(ic.rsn_group_cipher, Cipher::Tkip);
    }

    #[test]
    fn test_group_cipher_default_without_wpa1() {
        assert_eq!(resolve_group_cipher(0, ProtoSet::RSN), Cipher::Ccmp);
        assert_eq!(resolve_group_cipher(0x40, ProtoSet::WPA), Cipher::Tkip);
        assert_eq!(
            resolve_group_cipher(wpa_cipher::WEP104, ProtoSet::RSN),
            Cipher::Wep104
        );
    }

    #[test]
    fn test_usegroup_replaces_pairwise() {
        let ciphers = resolve_ciphers(wpa_cipher::USEGROUP | wpa_cipher::CCMP);
        assert_eq!(ciphers, CipherSet::USEGROUP);
    }

    #[test]
    fn test_unknown_bits_are_ignored() {
        assert_eq!(resolve_protos(0x80), DEFAULT_PROTOS);
        assert_eq!(resolve_akms(0x100), DEFAULT_AKMS);
        assert_eq!(resolve_ciphers(wpa_cipher::WEP40), DEFAULT_CIPHERS);
    }

    #[test]
    fn test_get_projects_set() {
        let mut ic = test_state();
        let req = enabled(
            wpa_proto::WPA2,
            wpa_akm::IEEE8021X | wpa_akm::SHA256_PSK,
            wpa_cipher::CCMP,
            wpa_cipher::CCMP,
        );
        set_wpaparams(&mut ic, &req).unwrap();
        assert_eq!(get_wpaparams(&ic), req);
    }

    #[test]
    fn test_get_reports_usegroup_and_unknown_group() {
        let mut ic = test_state();
        set_wpaparams(&mut ic, &enabled(0, 0, wpa_cipher::USEGROUP, 0)).unwrap();
        ic.rsn_group_cipher = Cipher::Bip;

        let reply = get_wpaparams(&ic);
        assert_eq!(reply.ciphers, wpa_cipher::USEGROUP);
        assert_eq!(reply.groupcipher, wpa_cipher::NONE);
    }
}
