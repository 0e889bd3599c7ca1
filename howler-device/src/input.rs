//! Remappable inputs, keyboard keys and modifier masks

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use howler_transport::protocol::{input, keyboard, led};

use crate::error::DeviceError;

/// Joystick direction, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn letter(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

/// A physical input that can be mapped to a key
///
/// Joystick directions come first on the wire (J1U, J1D, J1L, J1R, J2U, ...)
/// followed by buttons 1-26.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    /// Joystick 1-4 in one direction
    Joystick { stick: u8, direction: Direction },
    /// Button 1-26
    Button(u8),
}

impl Input {
    /// Wire index of this input
    ///
    /// Values built by hand can be out of range; those are rejected here.
    pub fn index(&self) -> Result<u8, DeviceError> {
        match *self {
            Input::Joystick { stick, direction } if (1..=led::NUM_JOYSTICKS).contains(&stick) => {
                Ok((stick - 1) * input::DIRECTIONS_PER_JOYSTICK + direction as u8)
            }
            Input::Button(n) if (1..=led::NUM_BUTTONS).contains(&n) => {
                Ok(input::NUM_JOYSTICK_INPUTS + n - 1)
            }
            _ => Err(DeviceError::InvalidParameter(format!(
                "Invalid input: {} (expected J1U-J4R or B1-B{})",
                self,
                led::NUM_BUTTONS
            ))),
        }
    }

    /// Every input in wire order
    pub fn all() -> impl Iterator<Item = Input> {
        let sticks = (1..=led::NUM_JOYSTICKS).flat_map(|stick| {
            Direction::ALL
                .into_iter()
                .map(move |direction| Input::Joystick { stick, direction })
        });
        sticks.chain((1..=led::NUM_BUTTONS).map(Input::Button))
    }
}

impl FromStr for Input {
    type Err = String;

    /// Parse `J[1-4][UDLR]` or `B<1-26>` (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        let mut chars = upper.chars();
        match chars.next() {
            Some('J') => {
                let rest: Vec<char> = chars.collect();
                let stick = match rest.first().and_then(|c| c.to_digit(10)) {
                    Some(d @ 1..=4) => d as u8,
                    _ => return Err(format!("Invalid joystick in input: {}", s)),
                };
                let direction = match rest.get(1..) {
                    Some(['U']) => Direction::Up,
                    Some(['D']) => Direction::Down,
                    Some(['L']) => Direction::Left,
                    Some(['R']) => Direction::Right,
                    _ => {
                        return Err(format!(
                            "Invalid joystick direction in input: {} (expected U, D, L or R)",
                            s
                        ))
                    }
                };
                Ok(Input::Joystick { stick, direction })
            }
            Some('B') => {
                let n: u8 = chars
                    .as_str()
                    .parse()
                    .map_err(|_| format!("Invalid button in input: {}", s))?;
                if n == 0 || n > led::NUM_BUTTONS {
                    return Err(format!(
                        "Invalid button index: {} (expected 1-{})",
                        n,
                        led::NUM_BUTTONS
                    ));
                }
                Ok(Input::Button(n))
            }
            _ => Err(format!(
                "Invalid input: {} (expected J[1-4][UDLR] or B1-B26)",
                s
            )),
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Joystick { stick, direction } => write!(f, "J{}{}", stick, direction.letter()),
            Input::Button(n) => write!(f, "B{}", n),
        }
    }
}

/// Keyboard keys accepted by SET_INPUT, as (HID usage code, name)
pub const KEYS: &[(u8, &str)] = &[
    (0x04, "A"),
    (0x05, "B"),
    (0x06, "C"),
    (0x07, "D"),
    (0x08, "E"),
    (0x09, "F"),
    (0x0A, "G"),
    (0x0B, "H"),
    (0x0C, "I"),
    (0x0D, "J"),
    (0x0E, "K"),
    (0x0F, "L"),
    (0x10, "M"),
    (0x11, "N"),
    (0x12, "O"),
    (0x13, "P"),
    (0x14, "Q"),
    (0x15, "R"),
    (0x16, "S"),
    (0x17, "T"),
    (0x18, "U"),
    (0x19, "V"),
    (0x1A, "W"),
    (0x1B, "X"),
    (0x1C, "Y"),
    (0x1D, "Z"),
    (0x1E, "1"),
    (0x1F, "2"),
    (0x20, "3"),
    (0x21, "4"),
    (0x22, "5"),
    (0x23, "6"),
    (0x24, "7"),
    (0x25, "8"),
    (0x26, "9"),
    (0x27, "0"),
    (0x28, "Enter"),
    (0x29, "Escape"),
    (0x2A, "Backspace"),
    (0x2B, "Tab"),
    (0x2C, "Space"),
    (0x2D, "Minus"),
    (0x2E, "Equal"),
    (0x2F, "LeftBracket"),
    (0x30, "RightBracket"),
    (0x31, "Backslash"),
    (0x32, "NonUsHash"),
    (0x33, "Semicolon"),
    (0x34, "Apostrophe"),
    (0x35, "Grave"),
    (0x36, "Comma"),
    (0x37, "Period"),
    (0x38, "Slash"),
    (0x39, "CapsLock"),
    (0x3A, "F1"),
    (0x3B, "F2"),
    (0x3C, "F3"),
    (0x3D, "F4"),
    (0x3E, "F5"),
    (0x3F, "F6"),
    (0x40, "F7"),
    (0x41, "F8"),
    (0x42, "F9"),
    (0x43, "F10"),
    (0x44, "F11"),
    (0x45, "F12"),
    (0x46, "PrintScreen"),
    (0x47, "ScrollLock"),
    (0x48, "Pause"),
    (0x49, "Insert"),
    (0x4A, "Home"),
    (0x4B, "PageUp"),
    (0x4C, "Delete"),
    (0x4D, "End"),
    (0x4E, "PageDown"),
    (0x4F, "Right"),
    (0x50, "Left"),
    (0x51, "Down"),
    (0x52, "Up"),
    (0x53, "NumLock"),
    (0x54, "KpSlash"),
    (0x55, "KpAsterisk"),
    (0x56, "KpMinus"),
    (0x57, "KpPlus"),
    (0x58, "KpEnter"),
    (0x59, "Kp1"),
    (0x5A, "Kp2"),
    (0x5B, "Kp3"),
    (0x5C, "Kp4"),
    (0x5D, "Kp5"),
    (0x5E, "Kp6"),
    (0x5F, "Kp7"),
    (0x60, "Kp8"),
    (0x61, "Kp9"),
    (0x62, "Kp0"),
    (0x63, "KpDot"),
    (0x64, "NonUsBackslash"),
    (0x65, "Application"),
    (0xE0, "LeftCtrl"),
    (0xE1, "LeftShift"),
    (0xE2, "LeftAlt"),
    (0xE3, "LeftGui"),
    (0xE4, "RightCtrl"),
    (0xE5, "RightShift"),
    (0xE6, "RightAlt"),
    (0xE7, "RightGui"),
];

/// Look up a key by name (case-insensitive) or by numeric usage code
/// (`0x2C` or `44`)
pub fn parse_key(s: &str) -> Result<u8, String> {
    if let Some(&(code, _)) = KEYS.iter().find(|(_, name)| name.eq_ignore_ascii_case(s)) {
        return Ok(code);
    }
    let code = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None if s.chars().all(|c| c.is_ascii_digit()) => s.parse().ok(),
        None => None,
    };
    match code {
        Some(c) if keyboard::is_valid_scan_code(c) => Ok(c),
        Some(c) => Err(format!("Unsupported key code: 0x{:02X}", c)),
        None => Err(format!(
            "Unknown key: {} (see list-supported-keys)",
            s
        )),
    }
}

/// Name of a key code, if it is supported
pub fn key_name(code: u8) -> Option<&'static str> {
    KEYS.iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, name)| name)
}

bitflags! {
    /// HID keyboard modifier bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const LEFT_CTRL = 0x01;
        const LEFT_SHIFT = 0x02;
        const LEFT_ALT = 0x04;
        const LEFT_GUI = 0x08;
        const RIGHT_CTRL = 0x10;
        const RIGHT_SHIFT = 0x20;
        const RIGHT_ALT = 0x40;
        const RIGHT_GUI = 0x80;
    }
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers::empty();

    /// Names of the eight modifier bits, low bit first
    pub const NAMES: [&'static str; 8] = [
        "LCtrl", "LShift", "LAlt", "LGui", "RCtrl", "RShift", "RAlt", "RGui",
    ];
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::empty()
    }
}

impl FromStr for Modifiers {
    type Err = String;

    /// Parse `LCtrl+LShift`-style names or a numeric mask (`0x03`, `3`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Modifiers::NONE);
        }
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u8::from_str_radix(hex, 16)
                .map(Modifiers::from_bits_retain)
                .map_err(|e| format!("Invalid modifier mask {}: {}", s, e));
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            return s
                .parse()
                .map(Modifiers::from_bits_retain)
                .map_err(|e| format!("Invalid modifier mask {}: {}", s, e));
        }

        let mut mask = Modifiers::empty();
        for part in s.split('+') {
            let part = part.trim();
            let bit = Self::NAMES
                .iter()
                .position(|name| name.eq_ignore_ascii_case(part))
                .ok_or_else(|| {
                    format!(
                        "Unknown modifier: {} (expected {})",
                        part,
                        Self::NAMES.join(", ")
                    )
                })?;
            mask |= Modifiers::from_bits_retain(1 << bit);
        }
        Ok(mask)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.bits() & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_parse() {
        assert_eq!(
            "J1U".parse::<Input>().unwrap(),
            Input::Joystick {
                stick: 1,
                direction: Direction::Up
            }
        );
        assert_eq!("b26".parse::<Input>().unwrap(), Input::Button(26));
        assert!("J5U".parse::<Input>().is_err());
        assert!("J1X".parse::<Input>().is_err());
        assert!("J1UU".parse::<Input>().is_err());
        assert!("B0".parse::<Input>().is_err());
        assert!("B27".parse::<Input>().is_err());
        assert!("X1".parse::<Input>().is_err());
    }

    #[test]
    fn test_input_wire_order() {
        let all: Vec<Input> = Input::all().collect();
        assert_eq!(all.len(), usize::from(input::NUM_INPUTS));
        for (i, inp) in all.iter().enumerate() {
            assert_eq!(usize::from(inp.index().unwrap()), i);
        }
        assert_eq!(all[0].to_string(), "J1U");
        assert_eq!(all[15].to_string(), "J4R");
        assert_eq!(all[16].to_string(), "B1");
        assert_eq!("J2L".parse::<Input>().unwrap().index().unwrap(), 6);
    }

    #[test]
    fn test_hand_built_input_out_of_range() {
        assert!(matches!(
            Input::Button(250).index(),
            Err(DeviceError::InvalidParameter(_))
        ));
        assert!(Input::Button(0).index().is_err());
        assert!(Input::Joystick {
            stick: 0,
            direction: Direction::Up
        }
        .index()
        .is_err());
        assert!(Input::Joystick {
            stick: 5,
            direction: Direction::Right
        }
        .index()
        .is_err());
    }

    #[test]
    fn test_key_table_matches_valid_codes() {
        let expected = usize::from(keyboard::LAST_KEY - keyboard::FIRST_KEY + 1)
            + usize::from(keyboard::LAST_MODIFIER_KEY - keyboard::FIRST_MODIFIER_KEY + 1);
        assert_eq!(KEYS.len(), expected);
        for (code, _) in KEYS {
            assert!(keyboard::is_valid_scan_code(*code));
        }
        for pair in KEYS.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("A").unwrap(), 0x04);
        assert_eq!(parse_key("space").unwrap(), 0x2C);
        assert_eq!(parse_key("0x2C").unwrap(), 0x2C);
        assert_eq!(parse_key("44").unwrap(), 0x2C);
        assert_eq!(parse_key("1").unwrap(), 0x1E);
        assert!(parse_key("0x00").is_err());
        assert!(parse_key("NotAKey").is_err());
        assert_eq!(key_name(0xE1), Some("LeftShift"));
        assert_eq!(key_name(0x66), None);
    }

    #[test]
    fn test_modifiers() {
        let m: Modifiers = "LCtrl+LShift".parse().unwrap();
        assert_eq!(m, Modifiers::LEFT_CTRL | Modifiers::LEFT_SHIFT);
        assert_eq!(m.to_string(), "LCtrl+LShift");
        assert_eq!("0x80".parse::<Modifiers>().unwrap(), Modifiers::RIGHT_GUI);
        assert_eq!("5".parse::<Modifiers>().unwrap().bits(), 5);
        assert_eq!("".parse::<Modifiers>().unwrap(), Modifiers::NONE);
        assert!("Hyper".parse::<Modifiers>().is_err());
        assert_eq!(Modifiers::NONE.to_string(), "none");
        assert_eq!(Modifiers::default(), Modifiers::NONE);
        assert_eq!(
            "RCtrl+RGui".parse::<Modifiers>().unwrap().bits(),
            0x90
        );
    }
}
