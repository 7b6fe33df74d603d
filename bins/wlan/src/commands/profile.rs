//! Profile commands: attach an in-memory interface and configure it.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use wlanctl::ieee80211::WlanInterface;
use wlanctl::ieee80211::config::{ApplyOptions, ApplyResult, InterfaceSnapshot, Profile};
use wlanctl::ieee80211::sim::{SimDriver, SimStateMachine};

use crate::output::{OutputFormat, Printable, print};

async fn attach_and_apply(
    path: &Path,
    options: ApplyOptions,
) -> anyhow::Result<(WlanInterface, ApplyResult)> {
    let profile = Profile::load(path)
        .map_err(|e| anyhow::anyhow!("loading {}: {}", path.display(), e))?;
    let state = profile.attach.build()?;
    let iface = WlanInterface::attach(state, SimDriver::new(), SimStateMachine::new());
    let result = profile.desired.apply_with_options(&iface, options).await?;
    Ok((iface, result))
}

#[derive(Args)]
pub struct ValidateCmd {
    /// Profile (JSON).
    profile: PathBuf,

    /// Keep going after a failed command.
    #[arg(short, long)]
    keep_going: bool,

    /// Only list the commands that would be issued.
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[derive(Serialize)]
struct FailedStep {
    operation: String,
    error: String,
    errno: i32,
}

#[derive(Serialize)]
struct ValidateReport {
    changes: usize,
    reset_required: bool,
    steps: Vec<String>,
    errors: Vec<FailedStep>,
}

impl Printable for ValidateReport {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for step in &self.steps {
            writeln!(w, "{}", step)?;
        }
        for err in &self.errors {
            writeln!(w, "Failed: {}: {} (errno {})", err.operation, err.error, err.errno)?;
        }
        writeln!(
            w,
            "{} change(s), {} error(s){}",
            self.changes,
            self.errors.len(),
            if self.reset_required {
                ", reset required"
            } else {
                ""
            }
        )
    }
}

impl ValidateCmd {
    pub async fn run(&self, format: OutputFormat) -> anyhow::Result<()> {
        let options = ApplyOptions {
            dry_run: self.dry_run,
            continue_on_error: self.keep_going,
        };
        let (_iface, result) = attach_and_apply(&self.profile, options).await?;

        let report = ValidateReport {
            changes: result.changes_made,
            reset_required: result.reset_required,
            steps: result.summary,
            errors: result
                .errors
                .into_iter()
                .map(|e| FailedStep {
                    errno: e.error.errno(),
                    error: e.error.to_string(),
                    operation: e.operation,
                })
                .collect(),
        };
        print(&report, format)?;

        if !report.errors.is_empty() {
            anyhow::bail!("{} command(s) failed", report.errors.len());
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct ShowCmd {
    /// Profile (JSON).
    profile: PathBuf,
}

impl Printable for InterfaceSnapshot {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}: {} mode {} {}", self.name, self.opmode, self.phymode, self.state)?;
        writeln!(w, "\taddress {}", self.address)?;
        writeln!(w, "\tcaps {}", self.caps.join(","))?;
        writeln!(w, "\tssid \"{}\"", self.ssid)?;
        if let Some(bssid) = &self.bssid {
            writeln!(w, "\tbssid {}", bssid)?;
        }
        match self.channel {
            Some(chan) => writeln!(w, "\tchannel {}", chan)?,
            None => writeln!(w, "\tchannel any (ibss {})", self.ibss_channel)?,
        }
        let channels: Vec<String> = self.channels.iter().map(u16::to_string).collect();
        writeln!(w, "\tchannels {}", channels.join(","))?;
        match self.fixed_rate {
            Some(rate) => writeln!(w, "\trate {} Mb/s", f64::from(rate) / 2.0)?,
            None => writeln!(w, "\trate auto")?,
        }
        writeln!(
            w,
            "\ttxpower {} powersave {} (listen interval {})",
            self.txpower,
            on_off(self.power_management),
            self.listen_interval
        )?;
        writeln!(w, "\twmm {}", on_off(self.wmm))?;
        if self.wep {
            let keys: Vec<&str> = self.wep_keys.iter().map(|k| k.unwrap_or("-")).collect();
            writeln!(
                w,
                "\twep on txkey {} keys {}",
                self.wep_default_key,
                keys.join(",")
            )?;
        } else {
            writeln!(w, "\twep off")?;
        }
        writeln!(
            w,
            "\twpa {} psk {} group {}",
            on_off(self.rsn),
            on_off(self.psk),
            self.rsn_group_cipher
        )?;
        writeln!(w, "\tnodes {}", self.nodes)
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

impl ShowCmd {
    pub async fn run(&self, format: OutputFormat) -> anyhow::Result<()> {
        let (iface, _) = attach_and_apply(&self.profile, ApplyOptions::default()).await?;
        let snapshot = InterfaceSnapshot::of(&iface).await;
        print(&snapshot, format)
    }
}
