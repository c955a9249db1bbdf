mod device;
mod layout;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::time::Duration;

use device::Converter;
use microswitch_core::TranslationMode;

/// How long `watch` waits for a report before checking again.
const WATCH_POLL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "microswitch-cli")]
#[command(about = "MicroSwitch keyboard converter tool")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the matrix position to keycode table
    Table {
        /// Leave out positions with no key wired
        #[arg(long)]
        mapped: bool,
    },
    /// Read or change the translation mode feature report
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },
    /// Print input reports as the converter sends them
    Watch {
        /// Stop after this many reports
        #[arg(long)]
        count: Option<usize>,
    },
    /// Detect if the converter is connected
    Detect,
}

#[derive(Subcommand)]
enum ModeAction {
    /// Print the current translation mode
    Get,
    /// Set the translation mode (decimal or 0x hex)
    Set {
        #[arg(value_parser = parse_u8)]
        value: u8,
    },
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| format!("{} is not a byte value", s))
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(level(cli.verbose))
        .parse_default_env()
        .init();

    match cli.command {
        Command::Table { mapped } => {
            for line in layout::format_table(mapped) {
                println!("{}", line);
            }
        }
        Command::Mode { action } => {
            let converter = Converter::open()?;
            match action {
                ModeAction::Get => {
                    let mode = converter.read_mode()?;
                    println!("Translation mode: {}", mode.0);
                }
                ModeAction::Set { value } => {
                    converter
                        .write_mode(TranslationMode(value))
                        .with_context(|| format!("setting translation mode {}", value))?;
                    let mode = converter.read_mode()?;
                    println!("Translation mode: {}", mode.0);
                }
            }
        }
        Command::Watch { count } => {
            let converter = Converter::open()?;
            println!("Watching input reports, Ctrl-C to stop.");
            let mut seen = 0;
            while count.map_or(true, |n| seen < n) {
                if let Some(report) = converter.read_report(WATCH_POLL)? {
                    println!("{}", layout::describe_report(&report));
                    seen += 1;
                }
            }
        }
        Command::Detect => match device::detect()? {
            Some((bus, address)) => {
                println!(
                    "MicroSwitch converter detected (bus {} address {}).",
                    bus, address
                );
            }
            None => {
                println!("MicroSwitch converter not detected.");
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_u8() {
        assert_eq!(parse_u8("2"), Ok(2));
        assert_eq!(parse_u8("0x1f"), Ok(0x1F));
        assert_eq!(parse_u8("0XFF"), Ok(0xFF));
        assert!(parse_u8("256").is_err());
        assert!(parse_u8("0x").is_err());
    }

    #[test]
    fn test_mode_set_args() {
        let cli = Cli::try_parse_from(["microswitch-cli", "-vv", "mode", "set", "0x02"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Mode {
                action: ModeAction::Set { value: 2 }
            }
        ));
    }

    #[test]
    fn test_watch_count() {
        let cli = Cli::try_parse_from(["microswitch-cli", "watch", "--count", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Watch { count: Some(3) }));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level(0), LevelFilter::Warn);
        assert_eq!(level(1), LevelFilter::Info);
        assert_eq!(level(5), LevelFilter::Trace);
    }
}
