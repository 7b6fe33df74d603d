//! wlan command - validate and inspect 802.11 interface profiles.

mod commands;
mod output;

use clap::{Parser, Subcommand};

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "wlan", version, about = "802.11 interface configuration tool")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the legal transmit rates.
    Rates(commands::rates::RatesCmd),

    /// List the control command codes.
    #[command(visible_alias = "cmds")]
    Commands(commands::rates::CommandsCmd),

    /// Attach a profile and apply its desired settings.
    Validate(commands::profile::ValidateCmd),

    /// Attach a profile and print the resulting configuration.
    Show(commands::profile::ShowCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json { pretty: cli.pretty }
    } else {
        OutputFormat::Text
    };

    let result = match cli.command {
        Command::Rates(cmd) => cmd.run(format),
        Command::Commands(cmd) => cmd.run(format),
        Command::Validate(cmd) => cmd.run(format).await,
        Command::Show(cmd) => cmd.run(format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
