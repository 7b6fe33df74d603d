//! Rate and channel validation.

use super::state::InterfaceState;
use super::types::{CHAN_ANY, CHAN_MAX, PhyMode};

/// A legal (PHY mode, rate) pair. Rates are in 500 kb/s units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEntry {
    pub mode: PhyMode,
    pub rate: u8,
}

const fn entry(mode: PhyMode, rate: u8) -> RateEntry {
    RateEntry { mode, rate }
}

/// Every legal (PHY mode, rate) pair.
pub const RATE_TABLE: [RateEntry; 25] = [
    entry(PhyMode::Dot11b, 2),
    entry(PhyMode::Dot11b, 4),
    entry(PhyMode::Dot11b, 11),
    entry(PhyMode::Dot11b, 22),
    entry(PhyMode::Dot11b, 44),
    entry(PhyMode::Dot11a, 12),
    entry(PhyMode::Dot11a, 18),
    entry(PhyMode::Dot11a, 24),
    entry(PhyMode::Dot11a, 36),
    entry(PhyMode::Dot11a, 48),
    entry(PhyMode::Dot11a, 72),
    entry(PhyMode::Dot11a, 96),
    entry(PhyMode::Dot11a, 108),
    entry(PhyMode::Dot11g, 2),
    entry(PhyMode::Dot11g, 4),
    entry(PhyMode::Dot11g, 11),
    entry(PhyMode::Dot11g, 22),
    entry(PhyMode::Dot11g, 12),
    entry(PhyMode::Dot11g, 18),
    entry(PhyMode::Dot11g, 24),
    entry(PhyMode::Dot11g, 36),
    entry(PhyMode::Dot11g, 48),
    entry(PhyMode::Dot11g, 72),
    entry(PhyMode::Dot11g, 96),
    entry(PhyMode::Dot11g, 108),
];

/// Position of a (mode, rate) pair in [`RATE_TABLE`].
pub fn find_rate_index(mode: PhyMode, rate: i32) -> Option<usize> {
    RATE_TABLE
        .iter()
        .position(|e| e.mode == mode && i32::from(e.rate) == rate)
}

/// Check if a rate is legal in a PHY mode.
pub fn is_valid_rate(mode: PhyMode, rate: i32) -> bool {
    find_rate_index(mode, rate).is_some()
}

/// Rates legal in a PHY mode, in table order.
pub fn rates_for_mode(mode: PhyMode) -> impl Iterator<Item = u8> {
    RATE_TABLE
        .iter()
        .filter(move |e| e.mode == mode)
        .map(|e| e.rate)
}

/// Check if a channel may be selected.
///
/// The "any" sentinel is always accepted. Other numbers must be in range and
/// active on the interface.
pub fn validate_channel(ic: &InterfaceState, n: u16) -> bool {
    n == CHAN_ANY || (n <= CHAN_MAX && ic.is_chan_active(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::fixtures::test_state;

    #[test]
    fn test_every_table_pair_is_valid() {
        for e in RATE_TABLE {
            assert!(is_valid_rate(e.mode, e.rate.into()), "{:?}", e);
        }
    }

    #[test]
    fn test_pairs_outside_table_are_invalid() {
        for mode in PhyMode::ALL {
            for rate in 0..=255 {
                let listed = RATE_TABLE
                    .iter()
                    .any(|e| e.mode == mode && i32::from(e.rate) == rate);
                assert_eq!(is_valid_rate(mode, rate), listed, "{mode} {rate}");
            }
        }
        assert!(!is_valid_rate(PhyMode::Dot11g, 44));
        assert!(!is_valid_rate(PhyMode::Auto, 2));
        assert!(!is_valid_rate(PhyMode::Dot11b, -1));
    }

    #[test]
    fn test_find_rate_index() {
        assert_eq!(find_rate_index(PhyMode::Dot11b, 2), Some(0));
        assert_eq!(find_rate_index(PhyMode::Dot11a, 108), Some(12));
        assert_eq!(find_rate_index(PhyMode::Dot11g, 2), Some(13));
        assert_eq!(find_rate_index(PhyMode::Turbo, 12), None);
    }

    #[test]
    fn test_rates_for_mode() {
        assert_eq!(rates_for_mode(PhyMode::Dot11b).count(), 5);
        assert_eq!(rates_for_mode(PhyMode::Dot11a).count(), 8);
        assert_eq!(rates_for_mode(PhyMode::Dot11g).count(), 12);
    }

    #[test]
    fn test_validate_channel() {
        let ic = test_state();
        assert!(validate_channel(&ic, CHAN_ANY));
        assert!(validate_channel(&ic, 6));
        assert!(!validate_channel(&ic, 13));
        assert!(!validate_channel(&ic, 256));
        assert!(!validate_channel(&ic, 0));
    }
}
