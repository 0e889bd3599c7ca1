//! Key table listing.

use super::CommandResult;
use howler_device::input::KEYS;
use howler_device::{Input, Modifiers};

/// Print every key name, modifier and input accepted by set-key
pub fn list_supported_keys() -> CommandResult {
    println!("Keys:");
    for line in key_lines() {
        println!("  {line}");
    }

    println!();
    println!("Modifiers (join with '+'):");
    println!("  {}", Modifiers::NAMES.join(" "));

    println!();
    println!("Inputs:");
    let inputs: Vec<String> = Input::all().map(|i| i.to_string()).collect();
    for row in inputs.chunks(8) {
        println!("  {}", row.join(" "));
    }
    Ok(())
}

fn key_lines() -> impl Iterator<Item = String> {
    KEYS.iter()
        .map(|(code, name)| format!("0x{code:02X}  {name}"))
}
