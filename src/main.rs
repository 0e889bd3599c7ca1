//! Howler Controller CLI
//!
//! A command-line interface for Wolfware Howler arcade controllers.

use std::process::ExitCode;

use clap::Parser;
use howler_driver::{Config, Overrides};
use howler_transport::MonitorConfig;
use tracing::debug;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;
use commands::Session;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; usage errors fail
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    // RUST_LOG wins over --log-level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that never open a device
    match &cli.command {
        Commands::ListSupportedKeys => return commands::keys::list_supported_keys(),
        Commands::List { json } => return commands::query::list(*json),
        _ => {}
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?.with_overrides(&Overrides {
        device: cli.device,
        timeout_ms: cli.timeout_ms,
        no_prime: cli.no_prime,
    });
    debug!("Using config {:?} from {}", config, config_path.display());

    let monitor = cli
        .monitor
        .then(|| MonitorConfig::default().with_hex(cli.hex));
    let mut options = config.context_options(monitor);
    options.prime_leds &= commands::needs_led_state(&cli.command);
    let session = Session::new(config.device, options);

    match cli.command {
        // === Query Commands ===
        Commands::GetFirmware => session.with_device(commands::query::firmware),
        Commands::GetLed { control } => {
            session.with_device(|dev| commands::query::get_led(dev, control))
        }

        // === Set Commands ===
        Commands::SetLedChannel {
            control,
            channel,
            value,
        } => session.with_device(|dev| commands::set::set_led_channel(dev, control, channel, value)),
        Commands::SetLed {
            control,
            red,
            green,
            blue,
        } => session.with_device(|dev| {
            commands::set::set_led(dev, control, howler_device::Led::new(red, green, blue))
        }),
        Commands::SetBrightness { level } => {
            session.with_device(|dev| commands::set::set_brightness(dev, level))
        }
        Commands::SetKey {
            input,
            key,
            modifiers,
        } => session.with_device(|dev| {
            commands::set::set_key(dev, input, key, modifiers.unwrap_or_default())
        }),

        Commands::ListSupportedKeys | Commands::List { .. } => Ok(()),
    }
}
