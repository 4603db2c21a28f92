//! smcctl - Apple System Management Controller key access
//!
//! Reads and writes SMC keys over the legacy port interface (0x300/0x304),
//! either on real hardware or against an in-memory emulator.
//!
//! # Architecture
//!
//! - `smcctl-core` implements the port protocol over the `PortIo` and
//!   `Clock` traits and has no platform dependencies
//! - `smcctl-ioport` provides those traits on Linux x86 through `ioperm`
//!   and the `in`/`out` instructions
//! - `smcctl-dummy` provides them as an emulated controller for testing

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Read { key, len } => {
            let mut smc = backends::open_backend(&cli.backend)?;
            commands::key::run_read(&mut smc, key, usize::from(len))
        }
        Commands::Write { key, bytes } => {
            let mut smc = backends::open_backend(&cli.backend)?;
            commands::key::run_write(&mut smc, key, &bytes)
        }
        Commands::ChargeLimit { percent } => {
            let mut smc = backends::open_backend(&cli.backend)?;
            commands::charge::run_charge_limit(&mut smc, percent)
        }
        Commands::ListBackends => {
            commands::list::list_backends();
            Ok(())
        }
    }
}
