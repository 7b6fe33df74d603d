//! Text and JSON output.

use std::io::{self, Write};

use serde::Serialize;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json { pretty: bool },
}

/// Something that can be printed in either format.
pub trait Printable: Serialize {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

/// Print a value to stdout in the requested format.
pub fn print<T: Printable>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    match format {
        OutputFormat::Text => value.print_text(&mut w)?,
        OutputFormat::Json { pretty: true } => {
            serde_json::to_writer_pretty(&mut w, value)?;
            writeln!(w)?;
        }
        OutputFormat::Json { pretty: false } => {
            serde_json::to_writer(&mut w, value)?;
            writeln!(w)?;
        }
    }
    Ok(())
}

impl<T: Printable> Printable for Vec<T> {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for item in self {
            item.print_text(w)?;
        }
        Ok(())
    }
}
