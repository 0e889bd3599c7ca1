//! Command-line argument parsing for controls and byte values

use std::fmt;
use std::str::FromStr;

use howler_device::LedGroup;
use thiserror::Error;

/// Argument parse failures, worded for the terminal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("Invalid control index: {0}. Expected value of the format: J#, B#, H# (e.g. 'B2')")]
    Control(String),

    #[error("Invalid value for {name}: {value}. Expected value in the range 0-255")]
    Byte { name: &'static str, value: String },

    #[error("Invalid {group} index: {index}. Expecting value in the range 1-{max}")]
    OutOfRange {
        group: &'static str,
        index: u8,
        max: u8,
    },
}

/// An LED-bearing control: joystick, button or high-power LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub group: LedGroup,
    /// 1-based, already range checked
    pub index: u8,
}

impl Control {
    /// Label used in status lines, e.g. "High power 2"
    pub fn label(&self) -> String {
        let kind = match self.group {
            LedGroup::Joystick => "Joystick",
            LedGroup::Button => "Button",
            LedGroup::HighPower => "High power",
        };
        format!("{} {}", kind, self.index)
    }

    /// Every control in status order: joysticks, buttons, high-power
    pub fn all() -> impl Iterator<Item = Control> {
        LedGroup::ALL
            .into_iter()
            .flat_map(|group| (1..=group.count()).map(move |index| Control { group, index }))
    }
}

impl FromStr for Control {
    type Err = ArgError;

    /// `J#`, `B#` or `H#`, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let group = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('J') => LedGroup::Joystick,
            Some('B') => LedGroup::Button,
            Some('H') => LedGroup::HighPower,
            _ => return Err(ArgError::Control(s.to_string())),
        };
        let index = parse_byte(chars.as_str(), "index")?;
        if index == 0 || index > group.count() {
            return Err(ArgError::OutOfRange {
                group: group.name(),
                index,
                max: group.count(),
            });
        }
        Ok(Control { group, index })
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.group {
            LedGroup::Joystick => 'J',
            LedGroup::Button => 'B',
            LedGroup::HighPower => 'H',
        };
        write!(f, "{}{}", prefix, self.index)
    }
}

/// Parse a decimal 0-255 value, naming the argument on failure
pub fn parse_byte(s: &str, name: &'static str) -> Result<u8, ArgError> {
    s.trim().parse::<u8>().map_err(|_| ArgError::Byte {
        name,
        value: s.to_string(),
    })
}

/// clap value parser for a named byte argument
pub fn byte(name: &'static str) -> impl Fn(&str) -> Result<u8, ArgError> + Clone + Send + Sync {
    move |s: &str| parse_byte(s, name)
}
