//! PHY mode, operating mode and fixed-rate policy.

use tracing::debug;

use super::driver::StateMachine;
use super::error::{Error, Outcome, Result};
use super::rates::{RATE_TABLE, find_rate_index};
use super::state::InterfaceState;
use super::types::{FIXED_RATE_NONE, IcFlags, OpMode, PhyMode};

/// Change the PHY mode.
///
/// The mode must be known and supported by the hardware. A change goes
/// through the state machine's mode hook, whose error is returned as is.
pub fn set_phymode(ic: &mut InterfaceState, sm: &dyn StateMachine, raw: u32) -> Result<Outcome> {
    let mode = PhyMode::from_raw(raw)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown PHY mode {raw}")))?;

    if !ic.mode_caps.has(mode) {
        return Err(Error::InvalidArgument(format!("PHY mode {mode} not supported")));
    }

    if ic.cur_mode == mode {
        return Ok(Outcome::Applied);
    }

    sm.set_mode(ic, mode)?;
    ic.cur_mode = mode;
    sm.reset_erp(ic);
    debug!(iface = %ic.name, %mode, "PHY mode changed");

    Ok(Outcome::ResetRequired)
}

/// Change the operating mode.
pub fn set_opmode(ic: &mut InterfaceState, sm: &dyn StateMachine, raw: u32) -> Result<Outcome> {
    let mode = OpMode::from_raw(raw)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown operating mode {raw}")))?;

    if ic.opmode == mode {
        return Ok(Outcome::Applied);
    }

    ic.opmode = mode;
    ic.flags.set(IcFlags::IBSSON, mode == OpMode::Ibss);
    sm.reset_erp(ic);
    debug!(iface = %ic.name, %mode, "operating mode changed");

    Ok(Outcome::ResetRequired)
}

/// Pin the transmit rate.
///
/// The rate must be legal for the current PHY mode. It is stored as its
/// position in the rate table.
pub fn set_fixed_rate(ic: &mut InterfaceState, sm: &dyn StateMachine, rate: i32) -> Result<Outcome> {
    if rate <= 0 {
        return Err(Error::InvalidArgument(format!("invalid rate {rate}")));
    }

    let index = find_rate_index(ic.cur_mode, rate).ok_or_else(|| {
        Error::InvalidArgument(format!("rate {rate} not valid in mode {}", ic.cur_mode))
    })?;

    if ic.fixed_rate == Some(index) {
        return Ok(Outcome::Applied);
    }

    ic.fixed_rate = Some(index);
    sm.reset_erp(ic);
    debug!(iface = %ic.name, rate, index, "fixed rate changed");

    Ok(Outcome::ResetRequired)
}

/// The fixed rate in 500 kb/s units, or [`FIXED_RATE_NONE`].
pub fn get_fixed_rate(ic: &InterfaceState) -> i32 {
    ic.fixed_rate
        .and_then(|i| RATE_TABLE.get(i))
        .map_or(FIXED_RATE_NONE, |e| i32::from(e.rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::fixtures::{RecordingStateMachine, test_state};
    use crate::ieee80211::types::ModeSet;

    #[test]
    fn test_set_phymode_change_and_same() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();

        let outcome = set_phymode(&mut ic, &sm, PhyMode::Dot11g as u32).unwrap();
        assert_eq!(outcome, Outcome::ResetRequired);
        assert_eq!(ic.cur_mode, PhyMode::Dot11g);
        assert_eq!(sm.erp_resets(), 1);

        let outcome = set_phymode(&mut ic, &sm, PhyMode::Dot11g as u32).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(sm.erp_resets(), 1);
    }

    #[test]
    fn test_set_phymode_rejects_unknown_and_unsupported() {
        let mut ic = test_state();
        ic.mode_caps = [PhyMode::Auto, PhyMode::Dot11b].into_iter().collect::<ModeSet>();
        let sm = RecordingStateMachine::new();

        assert!(set_phymode(&mut ic, &sm, PhyMode::COUNT).unwrap_err().is_invalid());
        assert!(set_phymode(&mut ic, &sm, PhyMode::Dot11a as u32).unwrap_err().is_invalid());
        assert_eq!(ic.cur_mode, PhyMode::Auto);
    }

    #[test]
    fn test_set_phymode_hook_error_propagates() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new().fail_set_mode();
        let err = set_phymode(&mut ic, &sm, PhyMode::Dot11a as u32).unwrap_err();
        assert_eq!(err.errno(), libc::EIO);
        assert_eq!(ic.cur_mode, PhyMode::Auto);
        assert_eq!(sm.erp_resets(), 0);
    }

    #[test]
    fn test_set_opmode_same_and_different() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();

        let same = set_opmode(&mut ic, &sm, OpMode::Sta as u32).unwrap();
        assert_eq!(same, Outcome::Applied);

        let changed = set_opmode(&mut ic, &sm, OpMode::Ibss as u32).unwrap();
        assert_eq!(changed, Outcome::ResetRequired);
        assert!(ic.flags.ibss_on());

        let again = set_opmode(&mut ic, &sm, OpMode::Ibss as u32).unwrap();
        assert_eq!(again, Outcome::Applied);

        set_opmode(&mut ic, &sm, OpMode::HostAp as u32).unwrap();
        assert!(!ic.flags.ibss_on());
    }

    #[test]
    fn test_set_opmode_unknown() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();
        assert!(set_opmode(&mut ic, &sm, 2).unwrap_err().is_invalid());
    }

    #[test]
    fn test_fixed_rate() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();
        ic.cur_mode = PhyMode::Dot11b;

        assert_eq!(get_fixed_rate(&ic), FIXED_RATE_NONE);
        assert!(set_fixed_rate(&mut ic, &sm, 0).unwrap_err().is_invalid());
        assert!(set_fixed_rate(&mut ic, &sm, 12).unwrap_err().is_invalid());

        assert_eq!(set_fixed_rate(&mut ic, &sm, 22).unwrap(), Outcome::ResetRequired);
        assert_eq!(ic.fixed_rate, Some(3));
        assert_eq!(get_fixed_rate(&ic), 22);

        assert_eq!(set_fixed_rate(&mut ic, &sm, 22).unwrap(), Outcome::Applied);
    }
}
