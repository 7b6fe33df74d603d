//! IEEE 802.11 interface configuration.
//!
//! The entry point is [`WlanInterface`], created from an [`InterfaceState`]
//! together with a [`Driver`] and a [`StateMachine`]. Commands are issued
//! with [`WlanInterface::ioctl`] over the fixed-layout [`records`].

pub mod codec;
pub mod command;
#[cfg(feature = "config")]
pub mod config;
mod dispatch;
pub mod driver;
pub mod error;
pub mod mode;
pub mod node;
pub mod rates;
pub mod records;
pub mod scan;
pub mod sim;
pub mod state;
pub mod types;
pub mod wep;
pub mod wpa;

#[cfg(test)]
mod fixtures;

pub use command::Command;
pub use dispatch::WlanInterface;
pub use driver::{Driver, LinkStatus, StateMachine};
pub use error::{Error, Outcome, Result, ioctl_status};
pub use node::{NodeId, NodeTable, PeerNode};
pub use scan::ScanEnd;
pub use state::{Channel, InterfaceState, InterfaceStateBuilder, Key};
pub use types::{
    AkmSet, Caps, Cipher, CipherSet, ConnState, IcFlags, MacAddr, ModeSet, NodeState, OpMode,
    PhyMode, ProtoSet,
};
