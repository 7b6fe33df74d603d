//! Command dispatcher.
//!
//! [`WlanInterface`] owns the interface state and its collaborators and
//! routes each command to the policy that handles it. Request records are
//! copied out of the caller's buffer before anything is validated; replies
//! are copied back into the same buffer.

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::codec::{node_to_req, req_to_node};
use super::command::Command;
use super::driver::{Driver, LinkStatus, StateMachine};
use super::error::{Error, Outcome, Result};
use super::mode::{get_fixed_rate, set_fixed_rate, set_opmode, set_phymode};
use super::rates::validate_channel;
use super::records::{
    Bssid, ChanReq, ChanReqAll, ChannelRec, FixedRate, IfFlags, KeyAvail, KeyRun, NodeReq,
    NodeReqAll, NwKey, Nwid, OpModeReq, PhyModeReq, Power, Record, TxPower, WmmParams, WpaParams,
    WpaPsk, nodereq,
};
use super::scan::{ScanCoordinator, ScanEnd};
use super::state::InterfaceState;
use super::types::{
    AkmSet, CHAN_ANY, IcFlags, MacAddr, MgmtFrame, NWID_LEN, NodeState, OpMode, PMK_LEN,
    REASON_ASSOC_LEAVE, REASON_AUTH_LEAVE, TXPOWER_MAX, TXPOWER_MIN,
};
use super::wep::{get_nwkey, set_nwkey};
use super::wpa::{get_wpaparams, set_wpaparams};

/// An attached 802.11 interface.
pub struct WlanInterface {
    state: Mutex<InterfaceState>,
    driver: Box<dyn Driver>,
    sm: Box<dyn StateMachine>,
    scan: ScanCoordinator,
}

impl std::fmt::Debug for WlanInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WlanInterface")
            .field("scan", &self.scan)
            .finish_non_exhaustive()
    }
}

impl WlanInterface {
    /// Attach an interface with its driver and state machine.
    pub fn attach(
        state: InterfaceState,
        driver: impl Driver + 'static,
        sm: impl StateMachine + 'static,
    ) -> Self {
        debug!(iface = %state.name(), addr = %state.myaddr(), "attached");
        Self {
            state: Mutex::new(state),
            driver: Box::new(driver),
            sm: Box::new(sm),
            scan: ScanCoordinator::new(),
        }
    }

    /// Lock the interface state.
    ///
    /// This is how the state machine reaches connection-state fields.
    pub async fn state(&self) -> MutexGuard<'_, InterfaceState> {
        self.state.lock().await
    }

    /// Handle a command with a raw code.
    pub async fn ioctl_raw(&self, code: u32, data: &mut [u8]) -> Result<Outcome> {
        let cmd = Command::try_from(code)?;
        self.ioctl(cmd, data).await
    }

    /// Handle a command.
    ///
    /// `data` holds the command's record. Queries write their reply into it.
    pub async fn ioctl(&self, cmd: Command, data: &mut [u8]) -> Result<Outcome> {
        let result = match cmd {
            Command::Scan => self.scan().await,
            _ => {
                let mut ic = self.state.lock().await;
                self.handle(&mut ic, cmd, data)
            }
        };

        match &result {
            Ok(outcome) => debug!(%cmd, ?outcome, "command handled"),
            Err(e) => debug!(%cmd, error = %e, "command failed"),
        }
        result
    }

    /// Mark the start of a scan cycle. Called by the state machine.
    pub async fn scan_begin(&self) {
        let mut ic = self.state.lock().await;
        ScanCoordinator::begin(&mut ic);
    }

    /// Mark the end of a scan cycle. Called by the state machine.
    pub async fn scan_end(&self) -> ScanEnd {
        let mut ic = self.state.lock().await;
        self.scan.end(&mut ic)
    }

    /// Number of scan requests currently blocked.
    pub fn scan_waiters(&self) -> usize {
        self.scan.waiters()
    }

    async fn scan(&self) -> Result<Outcome> {
        let (rx, timeout) = {
            let mut ic = self.state.lock().await;
            if ic.opmode == OpMode::HostAp {
                return Ok(Outcome::Applied);
            }

            match self.driver.link_status() {
                LinkStatus::Absent => return Err(Error::NoDevice),
                LinkStatus::Down => return Err(Error::NetworkDown),
                LinkStatus::Running => {}
            }

            let rx = self.scan.request(&mut ic, self.sm.as_ref());
            (rx, ic.scan_timeout)
        };

        // A timeout is not an error: the caller reads whatever results exist.
        ScanCoordinator::wait(rx, timeout).await;
        Ok(Outcome::Applied)
    }

    fn handle(&self, ic: &mut InterfaceState, cmd: Command, data: &mut [u8]) -> Result<Outcome> {
        let driver = self.driver.as_ref();
        let sm = self.sm.as_ref();

        match cmd {
            Command::SetNwid => set_nwid(ic, &Nwid::copy_in(data)?),
            Command::GetNwid => reply(get_nwid(ic)?, data),
            Command::SetNwKey => set_nwkey(ic, driver, &NwKey::copy_in(data)?),
            Command::GetNwKey => {
                let mut nwkey = NwKey::copy_in(data)?;
                get_nwkey(ic, &mut nwkey);
                reply(nwkey, data)
            }
            Command::SetWmmParams => set_wmm(ic, &WmmParams::copy_in(data)?),
            Command::GetWmmParams => reply(
                WmmParams {
                    enabled: u32::from(ic.flags.qos_on()),
                },
                data,
            ),
            Command::SetWpaParams => set_wpaparams(ic, &WpaParams::copy_in(data)?),
            Command::GetWpaParams => reply(get_wpaparams(ic), data),
            Command::SetWpaPsk => set_wpapsk(ic, &WpaPsk::copy_in(data)?),
            Command::GetWpaPsk => reply(get_wpapsk(ic), data),
            Command::KeyAvail => key_avail(ic, sm, &KeyAvail::copy_in(data)?),
            Command::KeyRun => {
                let req = KeyRun::copy_in(data)?;
                sm.keyrun(ic, MacAddr::new(req.macaddr))?;
                Ok(Outcome::Applied)
            }
            Command::SetPower => set_power(ic, &Power::copy_in(data)?),
            Command::GetPower => reply(
                Power {
                    enabled: u32::from(ic.flags.pmgt_on()),
                    maxsleep: i32::from(ic.lintval),
                },
                data,
            ),
            Command::SetBssid => set_bssid(ic, &Bssid::copy_in(data)?),
            Command::GetBssid => reply(get_bssid(ic)?, data),
            Command::SetChannel => set_channel(ic, &ChanReq::copy_in(data)?),
            Command::GetChannel => reply(get_channel(ic)?, data),
            Command::GetAllChannels => reply(get_all_channels(ic), data),
            Command::SetTxPower => set_txpower(ic, &TxPower::copy_in(data)?),
            Command::GetTxPower => {
                if !ic.caps.has_txpmgt() {
                    return Err(Error::InvalidArgument(
                        "tx power management not supported".into(),
                    ));
                }
                reply(
                    TxPower {
                        val: i32::from(ic.txpower),
                    },
                    data,
                )
            }
            Command::GetNode => {
                let req = NodeReq::copy_in(data)?;
                reply(get_node(ic, driver, &req)?, data)
            }
            Command::SetNode => set_node(ic, &NodeReq::copy_in(data)?),
            Command::DelNode => del_node(ic, sm, &NodeReq::copy_in(data)?),
            Command::GetAllNodes => get_all_nodes(ic, driver, data),
            Command::GetFlags => reply(get_flags(ic), data),
            Command::SetFlags => set_flags(ic, &IfFlags::copy_in(data)?),
            Command::SetPhyMode => set_phymode(ic, sm, PhyModeReq::copy_in(data)?.mode),
            Command::GetPhyMode => reply(
                PhyModeReq {
                    mode: ic.cur_mode as u32,
                },
                data,
            ),
            Command::SetOpMode => set_opmode(ic, sm, OpModeReq::copy_in(data)?.mode),
            Command::GetOpMode => reply(
                OpModeReq {
                    mode: ic.opmode as u32,
                },
                data,
            ),
            Command::SetFixedRate => set_fixed_rate(ic, sm, FixedRate::copy_in(data)?.rate),
            Command::GetFixedRate => reply(
                FixedRate {
                    rate: get_fixed_rate(ic),
                },
                data,
            ),
            Command::GetStats | Command::GetZeroStats | Command::SetMtu | Command::GetMtu => {
                Err(Error::NotSupported(cmd.name().to_string()))
            }
            Command::Scan => Err(Error::NotSupported("scan must not be dispatched locked".into())),
        }
    }
}

fn reply<R: Record>(record: R, data: &mut [u8]) -> Result<Outcome> {
    record.copy_out(data)?;
    Ok(Outcome::Applied)
}

fn set_nwid(ic: &mut InterfaceState, req: &Nwid) -> Result<Outcome> {
    let len = req.len as usize;
    if len > ic.des_essid.len() {
        return Err(Error::InvalidArgument(format!("SSID length {len} too long")));
    }

    ic.des_essid = [0; NWID_LEN];
    ic.des_essid[..len].copy_from_slice(&req.nwid[..len]);
    ic.des_esslen = len;
    Ok(Outcome::ResetRequired)
}

fn get_nwid(ic: &InterfaceState) -> Result<Nwid> {
    if ic.state.is_unassociated() {
        Ok(Nwid::from_ssid(ic.des_essid()))
    } else {
        Ok(Nwid::from_ssid(ic.bss()?.essid()))
    }
}

fn set_wmm(ic: &mut InterfaceState, req: &WmmParams) -> Result<Outcome> {
    if !ic.caps.has_qos() {
        return Err(Error::NoDevice);
    }
    ic.flags.set(IcFlags::QOS, req.enabled != 0);
    Ok(Outcome::ResetRequired)
}

fn set_wpapsk(ic: &mut InterfaceState, req: &WpaPsk) -> Result<Outcome> {
    if req.enabled != 0 {
        ic.flags.insert(IcFlags::PSK);
        ic.psk = req.psk;
    } else {
        ic.flags.remove(IcFlags::PSK);
        ic.psk = [0; PMK_LEN];
    }
    Ok(Outcome::ResetRequired)
}

fn get_wpapsk(ic: &InterfaceState) -> WpaPsk {
    if ic.flags.psk_on() {
        WpaPsk {
            enabled: 1,
            psk: ic.psk,
        }
    } else {
        WpaPsk::default()
    }
}

fn key_avail(ic: &mut InterfaceState, sm: &dyn StateMachine, req: &KeyAvail) -> Result<Outcome> {
    let addr = MacAddr::new(req.macaddr);
    if let Err(e) = sm.pmksa_add(ic, AkmSet::IEEE8021X, addr, &req.key, req.lifetime) {
        debug!(iface = %ic.name, %addr, error = %e, "PMKSA cache insert failed");
    }
    Ok(Outcome::Applied)
}

fn set_power(ic: &mut InterfaceState, req: &Power) -> Result<Outcome> {
    // Written before the capability check; a rejected request keeps it.
    ic.lintval = req.maxsleep.clamp(0, i32::from(u16::MAX)) as u16;

    if req.enabled != 0 {
        if !ic.caps.has_pmgt() {
            return Err(Error::InvalidArgument(
                "power management not supported".into(),
            ));
        }
        if ic.flags.pmgt_on() {
            return Ok(Outcome::Applied);
        }
        ic.flags.insert(IcFlags::PMGTON);
        Ok(Outcome::ResetRequired)
    } else {
        if !ic.flags.pmgt_on() {
            return Ok(Outcome::Applied);
        }
        ic.flags.remove(IcFlags::PMGTON);
        Ok(Outcome::ResetRequired)
    }
}

fn set_bssid(ic: &mut InterfaceState, req: &Bssid) -> Result<Outcome> {
    let bssid = MacAddr::new(req.bssid);
    if bssid.is_zero() {
        ic.flags.remove(IcFlags::DESBSSID);
    } else {
        ic.flags.insert(IcFlags::DESBSSID);
        ic.des_bssid = bssid;
    }

    if ic.opmode == OpMode::HostAp {
        return Ok(Outcome::Applied);
    }

    if ic.state.is_unassociated() {
        return Ok(Outcome::ResetRequired);
    }

    let differs = ic.flags.des_bssid() && ic.des_bssid != ic.bss()?.bssid;
    Ok(Outcome::reset_if(differs))
}

fn get_bssid(ic: &InterfaceState) -> Result<Bssid> {
    let bssid = if !ic.state.is_unassociated() {
        ic.bss()?.bssid
    } else if ic.opmode == OpMode::HostAp {
        ic.myaddr
    } else if ic.flags.des_bssid() {
        ic.des_bssid
    } else {
        MacAddr::ZERO
    };
    Ok(Bssid {
        bssid: bssid.octets(),
    })
}

fn set_channel(ic: &mut InterfaceState, req: &ChanReq) -> Result<Outcome> {
    let n = req.channel;
    if !validate_channel(ic, n) {
        return Err(Error::InvalidArgument(format!("channel {n} not available")));
    }

    if n == CHAN_ANY {
        ic.des_chan = None;
    } else {
        ic.des_chan = Some(n);
        ic.ibss_chan = n;
    }

    if ic.state.is_unassociated() {
        return Ok(Outcome::ResetRequired);
    }

    let bss_chan = ic.bss()?.chan;
    let differs = if ic.opmode == OpMode::Sta {
        ic.des_chan.is_some() && bss_chan != ic.des_chan
    } else {
        bss_chan != Some(ic.ibss_chan)
    };
    Ok(Outcome::reset_if(differs))
}

fn get_channel(ic: &InterfaceState) -> Result<ChanReq> {
    let chan = if !ic.state.is_unassociated() {
        ic.bss()?.chan
    } else if ic.opmode == OpMode::Sta {
        ic.des_chan
    } else {
        Some(ic.ibss_chan)
    };
    Ok(ChanReq {
        channel: chan.unwrap_or(CHAN_ANY),
    })
}

fn get_all_channels(ic: &InterfaceState) -> ChanReqAll {
    let mut all = ChanReqAll::default();
    for (rec, chan) in all.chans.iter_mut().zip(ic.channels.iter()) {
        *rec = ChannelRec {
            freq: chan.freq,
            flags: chan.flags,
        };
    }
    all
}

fn set_txpower(ic: &mut InterfaceState, req: &TxPower) -> Result<Outcome> {
    if !ic.caps.has_txpmgt() {
        return Err(Error::InvalidArgument(
            "tx power management not supported".into(),
        ));
    }
    if !(TXPOWER_MIN..=TXPOWER_MAX).contains(&req.val) {
        return Err(Error::InvalidArgument(format!(
            "tx power {} out of range {TXPOWER_MIN}..={TXPOWER_MAX}",
            req.val
        )));
    }
    ic.txpower = req.val as u16;
    Ok(Outcome::ResetRequired)
}

fn get_node(ic: &InterfaceState, driver: &dyn Driver, req: &NodeReq) -> Result<NodeReq> {
    let addr = MacAddr::new(req.macaddr);
    let id = ic
        .nodes
        .find(&addr)
        .ok_or_else(|| Error::NotFound(format!("node {addr}")))?;
    let node = ic
        .nodes
        .get(id)
        .ok_or_else(|| Error::NotFound(format!("node {addr}")))?;
    Ok(node_to_req(ic, driver, id, node))
}

fn set_node(ic: &mut InterfaceState, req: &NodeReq) -> Result<Outcome> {
    if ic.opmode == OpMode::HostAp {
        return Err(Error::InvalidArgument(
            "nodes cannot be set in host-AP mode".into(),
        ));
    }

    let addr = MacAddr::new(req.macaddr);
    let id = match ic.nodes.find(&addr) {
        Some(id) => id,
        None => ic
            .nodes
            .alloc(addr)
            .ok_or_else(|| Error::NotFound(format!("no room for node {addr}")))?,
    };

    if req.flags & nodereq::COPY != 0
        && let Some(node) = ic.nodes.get_mut(id)
    {
        req_to_node(req, node);
    }
    Ok(Outcome::Applied)
}

fn del_node(ic: &mut InterfaceState, sm: &dyn StateMachine, req: &NodeReq) -> Result<Outcome> {
    let addr = MacAddr::new(req.macaddr);
    let id = ic
        .nodes
        .find(&addr)
        .ok_or_else(|| Error::NotFound(format!("node {addr}")))?;
    if id == ic.bss {
        return Err(Error::PermissionDenied(format!(
            "node {addr} is the current BSS"
        )));
    }

    let Some(node) = ic.nodes.get(id).cloned() else {
        return Err(Error::NotFound(format!("node {addr}")));
    };
    if node.state == NodeState::COLLECT {
        return Ok(Outcome::Applied);
    }

    if node.state == NodeState::ASSOC {
        sm.send_mgmt(ic, &node, MgmtFrame::Disassoc, REASON_ASSOC_LEAVE);
    }
    if node.state >= NodeState::AUTH {
        sm.send_mgmt(ic, &node, MgmtFrame::Deauth, REASON_AUTH_LEAVE);
    }

    ic.nodes.remove(id);
    sm.node_leave(ic, &node);
    debug!(iface = %ic.name, %addr, "node deleted");
    Ok(Outcome::Applied)
}

fn get_all_nodes(ic: &InterfaceState, driver: &dyn Driver, data: &mut [u8]) -> Result<Outcome> {
    let header = NodeReqAll::copy_in(data)?;
    let space = data.len().saturating_sub(NodeReqAll::SIZE);
    let capacity = (header.size as usize).min(space);

    let mut count = 0usize;
    for (id, node) in ic.nodes.iter() {
        let offset = count * NodeReq::SIZE;
        if offset + NodeReq::SIZE > capacity {
            break;
        }
        let Some(dst) = data.get_mut(NodeReqAll::SIZE + offset..) else {
            break;
        };
        node_to_req(ic, driver, id, node).copy_out(dst)?;
        count += 1;
    }

    NodeReqAll {
        size: header.size,
        nodes: count as u32,
    }
    .copy_out(data)?;
    Ok(Outcome::Applied)
}

fn get_flags(ic: &InterfaceState) -> IfFlags {
    let mut flags = ic.flags;
    if ic.opmode != OpMode::HostAp {
        flags.remove(IcFlags::HOSTAPMASK);
    }
    IfFlags {
        flags: ((flags.bits() & IcFlags::USERMASK.bits()) >> IcFlags::USERSHIFT) as i32,
    }
}

fn set_flags(ic: &mut InterfaceState, req: &IfFlags) -> Result<Outcome> {
    let flags = IcFlags::from_bits(((req.flags as u32) << IcFlags::USERSHIFT) & IcFlags::USERMASK.bits());
    if ic.opmode != OpMode::HostAp && flags.intersects(IcFlags::HOSTAPMASK) {
        return Err(Error::InvalidArgument(
            "host-AP flags require host-AP mode".into(),
        ));
    }

    ic.flags.remove(IcFlags::USERMASK);
    ic.flags.insert(flags);
    Ok(Outcome::ResetRequired)
}
