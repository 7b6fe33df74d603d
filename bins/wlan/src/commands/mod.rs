//! wlan command implementations.

pub mod profile;
pub mod rates;
