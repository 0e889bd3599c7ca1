//! Set (write) command handlers.

use super::CommandResult;
use anyhow::Context;
use howler_device::input::key_name;
use howler_device::{HowlerDevice, Input, Led, LedChannel, Modifiers};
use howler_driver::Control;

/// Set all three channels of an LED
pub fn set_led(dev: &mut HowlerDevice, control: Control, led: Led) -> CommandResult {
    dev.set_led(control.group, control.index, led)
        .with_context(|| format!("Unable to set LED {control}"))?;
    println!("{control} set to {led}");
    Ok(())
}

/// Set one channel of an LED
pub fn set_led_channel(
    dev: &mut HowlerDevice,
    control: Control,
    channel: LedChannel,
    value: u8,
) -> CommandResult {
    dev.set_led_channel(control.group, control.index, channel, value)
        .with_context(|| format!("Unable to set LED {control}"))?;
    println!("{control} {channel} set to {value}");
    Ok(())
}

/// Set global LED brightness
pub fn set_brightness(dev: &mut HowlerDevice, level: u8) -> CommandResult {
    dev.set_global_brightness(level)
        .context("Unable to set brightness")?;
    println!("Brightness set to {level}");
    Ok(())
}

/// Map an input to a keyboard key
pub fn set_key(dev: &mut HowlerDevice, input: Input, key: u8, modifiers: Modifiers) -> CommandResult {
    dev.set_input_keyboard(input, key, modifiers)
        .with_context(|| format!("Unable to map {input}"))?;
    let name = key_name(key).unwrap_or("?");
    if modifiers.is_empty() {
        println!("{input} mapped to {name}");
    } else {
        println!("{input} mapped to {modifiers}+{name}");
    }
    Ok(())
}
