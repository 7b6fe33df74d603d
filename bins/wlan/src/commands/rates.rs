//! Static tables: transmit rates and command codes.

use std::io::{self, Write};

use clap::Args;
use serde::Serialize;
use wlanctl::ieee80211::rates::RATE_TABLE;
use wlanctl::ieee80211::{Command, PhyMode};

use crate::output::{OutputFormat, Printable, print};

#[derive(Args)]
pub struct RatesCmd {
    /// Only list rates of this PHY mode (11a, 11b, 11g).
    #[arg(short, long)]
    mode: Option<String>,
}

#[derive(Serialize)]
struct RateRow {
    mode: &'static str,
    /// 500 kb/s units.
    rate: u8,
    mbps: f32,
}

impl Printable for RateRow {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{:<6} {:>4} {:>5} Mb/s", self.mode, self.rate, self.mbps)
    }
}

impl RatesCmd {
    pub fn run(&self, format: OutputFormat) -> anyhow::Result<()> {
        let mode = self
            .mode
            .as_deref()
            .map(str::parse::<PhyMode>)
            .transpose()
            .map_err(anyhow::Error::msg)?;

        let rows: Vec<RateRow> = RATE_TABLE
            .iter()
            .filter(|e| mode.is_none_or(|m| m == e.mode))
            .map(|e| RateRow {
                mode: e.mode.name(),
                rate: e.rate,
                mbps: f32::from(e.rate) / 2.0,
            })
            .collect();

        print(&rows, format)
    }
}

#[derive(Args)]
pub struct CommandsCmd {}

#[derive(Serialize)]
struct CommandRow {
    code: u32,
    name: &'static str,
}

impl Printable for CommandRow {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{:>3} {}", self.code, self.name)
    }
}

impl CommandsCmd {
    pub fn run(&self, format: OutputFormat) -> anyhow::Result<()> {
        let rows: Vec<CommandRow> = Command::ALL
            .iter()
            .map(|c| CommandRow {
                code: c.code(),
                name: c.name(),
            })
            .collect();
        print(&rows, format)
    }
}
