//! Query (read-only) command handlers.

use super::CommandResult;
use anyhow::Context;
use howler_device::{HowlerContext, HowlerDevice, Led};
use howler_driver::Control;

/// Print the firmware version
pub fn firmware(dev: &mut HowlerDevice) -> CommandResult {
    let version = dev
        .get_device_version()
        .context("Unable to get Howler firmware version")?;
    println!("Firmware version: {version}");
    Ok(())
}

/// Print one LED, or every LED when no control is given
pub fn get_led(dev: &mut HowlerDevice, control: Option<Control>) -> CommandResult {
    match control {
        Some(control) => print_led(dev, control),
        None => Control::all().try_for_each(|control| print_led(dev, control)),
    }
}

fn print_led(dev: &mut HowlerDevice, control: Control) -> CommandResult {
    let led = dev
        .get_led(control.group, control.index)
        .with_context(|| format!("Unable to read {} LED", control))?;
    println!("{}", status_line(control, led));
    Ok(())
}

fn status_line(control: Control, led: Led) -> String {
    format!("{} LED status: {}", control.label(), led)
}

/// List attached Howlers without opening them
pub fn list(json: bool) -> CommandResult {
    let devices = HowlerContext::list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("No Howler devices found");
        return Ok(());
    }
    println!("Howler devices:");
    for (index, device) in devices.iter().enumerate() {
        let info = &device.info;
        println!(
            "  [{index}] VID={:04X} PID={:04X} bus={:03} addr={:03} {}",
            info.vid,
            info.pid,
            info.bus,
            info.address,
            info.product_name.as_deref().unwrap_or("Howler"),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use howler_device::LedGroup;
    use howler_transport::protocol::cmd;
    use howler_transport::SimulatedHowler;
    use std::sync::Arc;

    #[test]
    fn test_status_lines() {
        let joystick: Control = "J1".parse().unwrap();
        assert_eq!(
            status_line(joystick, Led::new(1, 2, 3)),
            "Joystick 1 LED status: (1, 2, 3)"
        );
        let high_power = Control {
            group: LedGroup::HighPower,
            index: 2,
        };
        assert_eq!(
            status_line(high_power, Led::WHITE),
            "High power 2 LED status: (255, 255, 255)"
        );
    }

    #[test]
    fn test_get_all_leds_reads_flat_order() {
        let sim = SimulatedHowler::new();
        let mut dev = HowlerDevice::new(Arc::new(sim.clone()));
        get_led(&mut dev, None).unwrap();

        let reads: Vec<u8> = sim
            .sent_with_opcode(cmd::GET_RGB_LED)
            .iter()
            .map(|p| p[2])
            .collect();
        assert_eq!(reads, (0..32).collect::<Vec<u8>>());
    }

    #[test]
    fn test_get_led_stops_on_first_failure() {
        let sim = SimulatedHowler::new();
        let mut dev = HowlerDevice::new(Arc::new(sim.clone()));
        sim.fail_after(2, howler_transport::TransportError::Timeout);
        assert!(get_led(&mut dev, None).is_err());
        assert_eq!(sim.sent_with_opcode(cmd::GET_RGB_LED).len(), 2);
    }
}
