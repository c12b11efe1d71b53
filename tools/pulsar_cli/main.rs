//! Command-line control of a Pulsar phase shifter.
//!
//! ```text
//! pulsar_cli --port /dev/ttyUSB0 set phase_45=on phase_90=on
//! pulsar_cli --config config/pulsar.toml set phase_180=on
//! pulsar_cli identity
//! pulsar_cli list
//! ```
//!
//! Only `set` opens the port. The device register is not read back, so
//! each `set` starts from all phases off and applies the requested
//! assignments in order.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pulsar_daq::config::{PulsarConfig, DEFAULT_CONFIG_PATH};
use pulsar_daq::driver::{PhaseShifter, PULSAR_IDENTITY};
use pulsar_daq::transport::SerialTransport;
use pulsar_daq::{logging, parameter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pulsar_cli", about = "Control a Pulsar 8-bit phase shifter")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Serial port, overrides the configuration
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overrides the configuration
    #[arg(short, long)]
    baud: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply `name=on|off` assignments and print the resulting state
    Set {
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Print the identification record
    Identity,
    /// Print the available controls
    List,
}

fn load_config(cli: &Cli) -> Result<PulsarConfig> {
    let mut config: PulsarConfig = PulsarConfig::figment(&cli.config)
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if let Some(port) = &cli.port {
        config.serial.address = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }
    config.validate()?;
    Ok(config)
}

fn connect(cli: &Cli) -> Result<PhaseShifter<SerialTransport>> {
    let config = load_config(cli)?;
    logging::init(&config.application.log_level);

    PhaseShifter::open(&config).with_context(|| {
        format!(
            "Failed to initialise Pulsar on {} at {} baud",
            config.serial.address, config.serial.baud_rate
        )
    })
}

/// Execute one command and return the text to print.
fn run(cli: &Cli) -> Result<String> {
    let output = match &cli.command {
        Command::List => {
            let infos: Vec<_> = parameter::all().collect();
            serde_json::to_string_pretty(&infos)?
        }
        // Constant record; opening the port would reset the register
        Command::Identity => serde_json::to_string_pretty(&PULSAR_IDENTITY)?,
        Command::Set { assignments } => {
            // Reject typos before touching the device
            let parsed = assignments
                .iter()
                .map(|a| parameter::parse_assignment(a))
                .collect::<Result<Vec<_>, _>>()?;

            let mut pulsar = connect(cli)?;
            for ((bit, value), assignment) in parsed.into_iter().zip(assignments) {
                pulsar
                    .set_bit(bit, value.is_on())
                    .with_context(|| format!("Failed to apply '{}'", assignment))?;
            }
            serde_json::to_string_pretty(&pulsar.snapshot())?
        }
    };
    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    println!("{}", run(&cli)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_PORT: &str = "/dev/pulsar-does-not-exist";

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pulsar_cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_identity_does_not_open_the_port() {
        let output = run(&cli(&["--port", MISSING_PORT, "identity"])).unwrap();
        let identity: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            identity,
            serde_json::json!({"serial": 1234, "hardware_version": 4321})
        );
    }

    #[test]
    fn test_list_prints_all_controls() {
        let output = run(&cli(&["list"])).unwrap();
        let infos: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(infos.len(), 8);
        assert_eq!(infos[5]["name"], "phase_45");
    }

    #[test]
    fn test_set_rejects_malformed_assignment_before_connecting() {
        let err = run(&cli(&["--port", MISSING_PORT, "set", "phase_90"])).unwrap_err();
        assert!(err.to_string().contains("expected name=value"), "{err}");
    }
}
