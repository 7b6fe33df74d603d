//! Configuration control plane for IEEE 802.11 network interfaces.
//!
//! This crate turns untrusted, fixed-layout configuration requests into
//! validated mutations of per-interface wireless state. It covers the
//! request dispatcher, WEP and WPA/RSN key policy, rate and channel
//! validation, peer node records, and blocking scan requests.
//!
//! The 802.11 state machine and the hardware driver are not part of this
//! crate. They are plugged in through the [`Driver`](ieee80211::Driver) and
//! [`StateMachine`](ieee80211::StateMachine) traits.
//!
//! # Features
//!
//! - `config` - Declarative attach/desired configuration loaded from JSON
//!   (enabled by default)
//!
//! # Example
//!
//! ```ignore
//! use wlanctl::ieee80211::{Command, InterfaceState, MacAddr, WlanInterface};
//! use wlanctl::ieee80211::records::{IntoBytes, Nwid};
//! use wlanctl::ieee80211::sim::{SimDriver, SimStateMachine};
//!
//! let state = InterfaceState::builder("wlan0", MacAddr::new([0x02, 0, 0, 0, 0, 1]))
//!     .all_caps()
//!     .channels(1..=11)
//!     .build();
//! let iface = WlanInterface::attach(state, SimDriver::new(), SimStateMachine::new());
//!
//! let mut req = Nwid::from_ssid(b"office");
//! let outcome = iface.ioctl(Command::SetNwid, req.as_mut_bytes()).await?;
//! assert!(outcome.is_reset());
//! ```

pub mod ieee80211;
pub mod util;

// Re-export common types at crate root for convenience
pub use ieee80211::{Command, Error, Outcome, Result, WlanInterface};
