//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: Read-only commands (get-firmware, get-led, list)
//! - `set`: Setting commands (set-led, set-led-channel, set-brightness, set-key)
//! - `keys`: Key table listing (list-supported-keys)

pub mod keys;
pub mod query;
pub mod set;

use anyhow::bail;
use howler_device::{ContextOptions, HowlerContext, HowlerDevice};

use crate::cli::Commands;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Which controller to open and how
pub struct Session {
    device: usize,
    options: ContextOptions,
}

impl Session {
    pub fn new(device: usize, options: ContextOptions) -> Self {
        Self { device, options }
    }

    /// Open every attached Howler and run a closure with the selected one
    pub fn with_device<F>(&self, f: F) -> CommandResult
    where
        F: FnOnce(&mut HowlerDevice) -> CommandResult,
    {
        let mut ctx = HowlerContext::init(&self.options)?;
        f(select_device(&mut ctx, self.device)?)
    }
}

/// Whether a command diffs LED writes against the bank cache
///
/// Only these commands pay for reading every LED back on open.
pub fn needs_led_state(command: &Commands) -> bool {
    matches!(
        command,
        Commands::SetLed { .. } | Commands::SetLedChannel { .. }
    )
}

/// Pick a device by index, with the messages users see on a bad index
pub fn select_device(ctx: &mut HowlerContext, index: usize) -> anyhow::Result<&mut HowlerDevice> {
    let count = ctx.count();
    if count == 0 {
        bail!("No Howler devices found");
    }
    if index >= count {
        bail!(
            "Invalid device number. Only {} device{} available.",
            count,
            if count > 1 { "s" } else { "" }
        );
    }
    Ok(ctx.device(index)?)
}
