//! LED colour types

use std::fmt;
use std::str::FromStr;

/// RGB colour of one LED
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Led {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Led {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Value of one channel
    pub fn channel(&self, channel: LedChannel) -> u8 {
        match channel {
            LedChannel::Red => self.red,
            LedChannel::Green => self.green,
            LedChannel::Blue => self.blue,
        }
    }

    /// Channels in wire order (red, green, blue)
    pub fn channels(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Off
    pub const BLACK: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
    };
    /// All channels full
    pub const WHITE: Self = Self {
        red: 255,
        green: 255,
        blue: 255,
    };
}

impl From<[u8; 3]> for Led {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

impl fmt::Display for Led {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// One colour component of an LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LedChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl LedChannel {
    /// All channels in wire order
    pub const ALL: [LedChannel; 3] = [LedChannel::Red, LedChannel::Green, LedChannel::Blue];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LedChannel::Red => "red",
            LedChannel::Green => "green",
            LedChannel::Blue => "blue",
        }
    }
}

impl FromStr for LedChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Ok(LedChannel::Red),
            "green" | "g" => Ok(LedChannel::Green),
            "blue" | "b" => Ok(LedChannel::Blue),
            _ => Err(format!("Unknown channel: {} (expected red, green or blue)", s)),
        }
    }
}

impl fmt::Display for LedChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!("red".parse::<LedChannel>().unwrap(), LedChannel::Red);
        assert_eq!("GREEN".parse::<LedChannel>().unwrap(), LedChannel::Green);
        assert_eq!("b".parse::<LedChannel>().unwrap(), LedChannel::Blue);
        assert!("purple".parse::<LedChannel>().is_err());
    }

    #[test]
    fn test_led_display() {
        assert_eq!(Led::new(1, 2, 3).to_string(), "(1, 2, 3)");
        assert_eq!(Led::from([4, 5, 6]).channel(LedChannel::Blue), 6);
    }
}
