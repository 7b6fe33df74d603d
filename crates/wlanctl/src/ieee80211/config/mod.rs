//! Declarative interface configuration.
//!
//! A [`Profile`] describes how to attach an interface ([`AttachConfig`]) and
//! what settings it should end up with ([`DesiredConfig`]). Desired settings
//! are applied by issuing the matching commands through the dispatcher:
//!
//! ```ignore
//! use wlanctl::ieee80211::WlanInterface;
//! use wlanctl::ieee80211::config::{ApplyOptions, Profile};
//! use wlanctl::ieee80211::sim::{SimDriver, SimStateMachine};
//!
//! let profile = Profile::load("office.json")?;
//! let iface = WlanInterface::attach(
//!     profile.attach.build()?,
//!     SimDriver::new(),
//!     SimStateMachine::new(),
//! );
//!
//! let result = profile.desired.apply(&iface).await?;
//! if result.reset_required {
//!     println!("reassociation needed");
//! }
//! ```
//!
//! Commands are issued in a fixed order: modes, channel, SSID and BSSID,
//! rate and power, then security settings.

mod apply;
mod types;

pub use apply::{ApplyError, ApplyOptions, ApplyResult};
pub use types::*;

use super::dispatch::WlanInterface;
use super::error::Result;

impl DesiredConfig {
    /// Apply the settings to an interface, stopping at the first error.
    pub async fn apply(&self, iface: &WlanInterface) -> Result<ApplyResult> {
        self.apply_with_options(iface, ApplyOptions::default()).await
    }

    /// Apply the settings with custom options.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = desired.apply_with_options(&iface, ApplyOptions {
    ///     continue_on_error: true,
    ///     ..Default::default()
    /// }).await?;
    /// for err in &result.errors {
    ///     eprintln!("{err}");
    /// }
    /// ```
    pub async fn apply_with_options(
        &self,
        iface: &WlanInterface,
        options: ApplyOptions,
    ) -> Result<ApplyResult> {
        apply::apply_config(self, iface, options).await
    }
}

impl InterfaceSnapshot {
    /// Capture the current configuration of an attached interface.
    pub async fn of(iface: &WlanInterface) -> Self {
        Self::capture(&*iface.state().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::sim::{SimDriver, SimStateMachine};

    fn attach() -> AttachConfig {
        AttachConfig {
            name: "wlan0".into(),
            address: "02:00:00:00:00:01".into(),
            caps: vec!["wep".into(), "rsn".into(), "txpmgt".into()],
            channels: "1-11".into(),
            ..Default::default()
        }
    }

    fn iface() -> WlanInterface {
        WlanInterface::attach(
            attach().build().unwrap(),
            SimDriver::new(),
            SimStateMachine::new(),
        )
    }

    #[tokio::test]
    async fn test_apply_desired() {
        let iface = iface();
        let desired = DesiredConfig {
            ssid: Some("office".into()),
            channel: Some("6".into()),
            txpower: Some(50),
            wep: Some(WepConfig {
                enabled: true,
                default_key: 1,
                keys: vec!["0102030405".into()],
            }),
            ..Default::default()
        };

        let result = desired.apply(&iface).await.unwrap();
        assert!(result.is_success());
        assert!(result.reset_required);
        assert_eq!(result.changes_made, 4);

        let snap = InterfaceSnapshot::of(&iface).await;
        assert_eq!(snap.ssid, "office");
        assert_eq!(snap.channel, Some(6));
        assert_eq!(snap.txpower, 50);
        assert!(snap.wep);
        assert_eq!(snap.wep_keys[0], Some("wep40"));
    }

    #[tokio::test]
    async fn test_apply_stops_on_error() {
        let iface = iface();
        let desired = DesiredConfig {
            channel: Some("36".into()),
            ssid: Some("office".into()),
            ..Default::default()
        };

        let err = desired.apply(&iface).await.unwrap_err();
        assert!(err.is_invalid());
        assert!(iface.state().await.des_essid().is_empty());
    }

    #[tokio::test]
    async fn test_apply_continue_on_error() {
        let iface = iface();
        let desired = DesiredConfig {
            channel: Some("36".into()),
            ssid: Some("office".into()),
            wmm: Some(true),
            ..Default::default()
        };

        let result = desired
            .apply_with_options(
                &iface,
                ApplyOptions {
                    continue_on_error: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.changes_made, 1);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[1].error.errno() == libc::ENODEV);
        assert_eq!(iface.state().await.des_essid(), b"office");
    }

    #[tokio::test]
    async fn test_dry_run() {
        let iface = iface();
        let desired = DesiredConfig {
            ssid: Some("office".into()),
            ..Default::default()
        };
        let result = desired
            .apply_with_options(
                &iface,
                ApplyOptions {
                    dry_run: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.changes_made, 1);
        assert!(result.summary_text().starts_with("Would set SSID"));
        assert!(iface.state().await.des_essid().is_empty());
    }
}
