//! Parsing and formatting helpers shared by the library and the CLI.

pub mod addr;
pub mod chanlist;

pub use addr::{AddrError, format_hex, format_mac, parse_hex, parse_mac};
pub use chanlist::parse_channel_list;
