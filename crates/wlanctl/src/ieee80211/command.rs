//! Control command codes.

use std::fmt;

use super::error::Error;

/// A control command. The discriminant is the raw command code.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SetNwid = 1,
    GetNwid = 2,
    SetNwKey = 3,
    GetNwKey = 4,
    SetWmmParams = 5,
    GetWmmParams = 6,
    SetWpaParams = 7,
    GetWpaParams = 8,
    SetWpaPsk = 9,
    GetWpaPsk = 10,
    KeyAvail = 11,
    KeyRun = 12,
    SetPower = 13,
    GetPower = 14,
    SetBssid = 15,
    GetBssid = 16,
    SetChannel = 17,
    GetChannel = 18,
    GetAllChannels = 19,
    SetTxPower = 20,
    GetTxPower = 21,
    Scan = 22,
    GetNode = 23,
    SetNode = 24,
    DelNode = 25,
    GetAllNodes = 26,
    GetFlags = 27,
    SetFlags = 28,
    SetPhyMode = 29,
    GetPhyMode = 30,
    SetOpMode = 31,
    GetOpMode = 32,
    SetFixedRate = 33,
    GetFixedRate = 34,
    GetStats = 35,
    GetZeroStats = 36,
    SetMtu = 37,
    GetMtu = 38,
}

impl Command {
    /// Every command, in code order.
    pub const ALL: [Command; 38] = [
        Command::SetNwid,
        Command::GetNwid,
        Command::SetNwKey,
        Command::GetNwKey,
        Command::SetWmmParams,
        Command::GetWmmParams,
        Command::SetWpaParams,
        Command::GetWpaParams,
        Command::SetWpaPsk,
        Command::GetWpaPsk,
        Command::KeyAvail,
        Command::KeyRun,
        Command::SetPower,
        Command::GetPower,
        Command::SetBssid,
        Command::GetBssid,
        Command::SetChannel,
        Command::GetChannel,
        Command::GetAllChannels,
        Command::SetTxPower,
        Command::GetTxPower,
        Command::Scan,
        Command::GetNode,
        Command::SetNode,
        Command::DelNode,
        Command::GetAllNodes,
        Command::GetFlags,
        Command::SetFlags,
        Command::SetPhyMode,
        Command::GetPhyMode,
        Command::SetOpMode,
        Command::GetOpMode,
        Command::SetFixedRate,
        Command::GetFixedRate,
        Command::GetStats,
        Command::GetZeroStats,
        Command::SetMtu,
        Command::GetMtu,
    ];

    /// Raw command code.
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get the command name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetNwid => "set-nwid",
            Command::GetNwid => "get-nwid",
            Command::SetNwKey => "set-nwkey",
            Command::GetNwKey => "get-nwkey",
            Command::SetWmmParams => "set-wmm",
            Command::GetWmmParams => "get-wmm",
            Command::SetWpaParams => "set-wpa",
            Command::GetWpaParams => "get-wpa",
            Command::SetWpaPsk => "set-wpapsk",
            Command::GetWpaPsk => "get-wpapsk",
            Command::KeyAvail => "keyavail",
            Command::KeyRun => "keyrun",
            Command::SetPower => "set-power",
            Command::GetPower => "get-power",
            Command::SetBssid => "set-bssid",
            Command::GetBssid => "get-bssid",
            Command::SetChannel => "set-channel",
            Command::GetChannel => "get-channel",
            Command::GetAllChannels => "get-allchans",
            Command::SetTxPower => "set-txpower",
            Command::GetTxPower => "get-txpower",
            Command::Scan => "scan",
            Command::GetNode => "get-node",
            Command::SetNode => "set-node",
            Command::DelNode => "del-node",
            Command::GetAllNodes => "get-allnodes",
            Command::GetFlags => "get-flags",
            Command::SetFlags => "set-flags",
            Command::SetPhyMode => "set-phymode",
            Command::GetPhyMode => "get-phymode",
            Command::SetOpMode => "set-opmode",
            Command::GetOpMode => "get-opmode",
            Command::SetFixedRate => "set-fixedrate",
            Command::GetFixedRate => "get-fixedrate",
            Command::GetStats => "get-stats",
            Command::GetZeroStats => "get-zstats",
            Command::SetMtu => "set-mtu",
            Command::GetMtu => "get-mtu",
        }
    }
}

impl TryFrom<u32> for Command {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| Error::NotSupported(format!("unknown command {code:#x}")))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for cmd in Command::ALL {
            assert_eq!(Command::try_from(cmd.code()).unwrap(), cmd);
        }
    }

    #[test]
    fn test_unknown_code() {
        let err = Command::try_from(0).unwrap_err();
        assert!(err.is_not_supported());
        assert_eq!(err.errno(), libc::ENOTTY);
        assert!(Command::try_from(1000).is_err());
    }
}
