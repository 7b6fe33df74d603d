//! Legacy WEP key policy.

use tracing::{debug, warn};

use super::driver::Driver;
use super::error::{Error, Outcome, Result};
use super::records::{NwKey, nwkey};
use super::state::{InterfaceState, Key};
use super::types::{Cipher, IcFlags, KEYBUF_SIZE, KeyFlags, WEP_KEY_MAXLEN, WEP_NKID};

/// Apply a WEP key request.
///
/// Every entry length is checked before the first slot is touched. Slots
/// are then installed in order; the first driver failure aborts the request
/// and slots already overwritten keep their new contents.
pub fn set_nwkey(ic: &mut InterfaceState, driver: &dyn Driver, req: &NwKey) -> Result<Outcome> {
    if !ic.caps.has_wep() {
        return Err(Error::NoDevice);
    }

    if req.wepon == nwkey::OPEN {
        if !ic.flags.wep_on() {
            return Ok(Outcome::Applied);
        }
        ic.flags.remove(IcFlags::WEPON);
        debug!(iface = %ic.name, "WEP disabled");
        return Ok(Outcome::ResetRequired);
    }

    if !(1..=WEP_NKID as i32).contains(&req.defkid) {
        return Err(Error::InvalidArgument(format!(
            "default key index {} out of range 1..={}",
            req.defkid, WEP_NKID
        )));
    }

    if let Some((i, entry)) = req
        .keys
        .iter()
        .enumerate()
        .find(|(_, e)| e.is_set() && e.keylen as usize > WEP_KEY_MAXLEN)
    {
        return Err(Error::InvalidArgument(format!(
            "key {} length {} exceeds {}",
            i + 1,
            entry.keylen,
            WEP_KEY_MAXLEN
        )));
    }

    for (slot, entry) in req.keys.iter().enumerate() {
        if !entry.is_set() {
            continue;
        }

        let k = &mut ic.nw_keys[slot];
        if k.is_active() {
            driver.delete_key(slot, k);
        }
        *k = Key::default();

        k.cipher = Cipher::wep_for_len(entry.keylen as usize);
        k.len = k.cipher.key_len();
        k.flags = KeyFlags::GROUP | KeyFlags::TX;
        k.key[..k.len].copy_from_slice(&entry.keydat[..k.len]);

        if let Err(e) = driver.set_key(slot, k) {
            warn!(iface = %ic.name, slot, error = %e, "failed to install WEP key");
            return Err(e);
        }
    }

    ic.def_txkey = (req.defkid - 1) as usize;
    ic.flags.insert(IcFlags::WEPON);
    debug!(iface = %ic.name, defkid = req.defkid, "WEP enabled");

    Ok(Outcome::ResetRequired)
}

/// Fill a WEP key reply.
///
/// Key material is copied only into entries the caller marked present.
pub fn get_nwkey(ic: &InterfaceState, reply: &mut NwKey) {
    reply.wepon = if ic.flags.wep_on() {
        nwkey::WEP
    } else {
        nwkey::OPEN
    };
    reply.defkid = ic.def_txkey as i32 + 1;

    for (entry, k) in reply.keys.iter_mut().zip(ic.nw_keys.iter()) {
        if entry.present == 0 {
            continue;
        }

        let len = if k.cipher.is_wep() { k.len } else { 0 };
        entry.keylen = len as u32;
        entry.keydat = [0; KEYBUF_SIZE];
        let n = len.min(KEYBUF_SIZE);
        entry.keydat[..n].copy_from_slice(&k.key[..n]);
    }
}
