//! LED addressing tables
//!
//! Each logical LED owns three (bank, slot) bytes, one per channel. The red
//! byte lives in bank 0 or 1, green two banks up and blue four banks up, all
//! at the same slot.

use std::fmt;

use howler_transport::protocol::led;
use crate::error::DeviceError;
use crate::led::LedChannel;

/// Location of one channel byte in the bank cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedRef {
    pub bank: u8,
    pub slot: u8,
}

/// Channel references of one LED, indexed by [`LedChannel`]
pub type LedEntry = [LedRef; 3];

const fn entry(bank: u8, slot: u8) -> LedEntry {
    [
        LedRef { bank, slot },
        LedRef {
            bank: bank + led::CHANNEL_BANK_STRIDE,
            slot,
        },
        LedRef {
            bank: bank + 2 * led::CHANNEL_BANK_STRIDE,
            slot,
        },
    ]
}

/// Entries for `N` consecutive flat LEDs starting at `offset`
const fn group_table<const N: usize>(offset: u8) -> [LedEntry; N] {
    let mut table = [entry(0, 0); N];
    let mut i = 0;
    while i < N {
        let (bank, slot) = led::RED_BYTES[offset as usize + i];
        table[i] = entry(bank, slot);
        i += 1;
    }
    table
}

/// Buttons 1-26
pub const BUTTON_TABLE: [LedEntry; led::NUM_BUTTONS as usize] =
    group_table(led::BUTTON_OFFSET);

/// Joysticks 1-4
pub const JOYSTICK_TABLE: [LedEntry; led::NUM_JOYSTICKS as usize] =
    group_table(led::JOYSTICK_OFFSET);

/// High-power LED outputs 1-2
pub const HIGH_POWER_TABLE: [LedEntry; led::NUM_HIGH_POWER_LEDS as usize] =
    group_table(led::HIGH_POWER_OFFSET);

/// Category of an addressable LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedGroup {
    Joystick,
    Button,
    HighPower,
}

impl LedGroup {
    /// Groups in flat-index order
    pub const ALL: [LedGroup; 3] = [LedGroup::Joystick, LedGroup::Button, LedGroup::HighPower];

    /// Number of LEDs in the group
    pub fn count(self) -> u8 {
        match self {
            LedGroup::Joystick => led::NUM_JOYSTICKS,
            LedGroup::Button => led::NUM_BUTTONS,
            LedGroup::HighPower => led::NUM_HIGH_POWER_LEDS,
        }
    }

    /// Flat index of the group's first LED
    pub fn offset(self) -> u8 {
        match self {
            LedGroup::Joystick => led::JOYSTICK_OFFSET,
            LedGroup::Button => led::BUTTON_OFFSET,
            LedGroup::HighPower => led::HIGH_POWER_OFFSET,
        }
    }

    pub fn table(self) -> &'static [LedEntry] {
        match self {
            LedGroup::Joystick => &JOYSTICK_TABLE,
            LedGroup::Button => &BUTTON_TABLE,
            LedGroup::HighPower => &HIGH_POWER_TABLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LedGroup::Joystick => "joystick",
            LedGroup::Button => "button",
            LedGroup::HighPower => "high power LED",
        }
    }

    /// Validate a 1-based index and return its table entry
    pub fn lookup(self, index: u8) -> Result<&'static LedEntry, DeviceError> {
        if index == 0 || index > self.count() {
            return Err(DeviceError::InvalidParameter(format!(
                "{} index {} out of range 1-{}",
                self.name(),
                index,
                self.count()
            )));
        }
        Ok(&self.table()[usize::from(index - 1)])
    }

    /// Channel reference for a 1-based index
    pub fn channel_ref(self, index: u8, channel: LedChannel) -> Result<LedRef, DeviceError> {
        Ok(self.lookup(index)?[channel.index()])
    }

    /// Flat device index for a 1-based index
    pub fn absolute_index(self, index: u8) -> Result<u8, DeviceError> {
        self.lookup(index)?;
        Ok(self.offset() + index - 1)
    }

    /// Split a flat device index into (group, 1-based index)
    pub fn from_absolute(flat: u8) -> Option<(LedGroup, u8)> {
        LedGroup::ALL.into_iter().find_map(|group| {
            let rel = flat.checked_sub(group.offset())?;
            (rel < group.count()).then_some((group, rel + 1))
        })
    }
}

impl fmt::Display for LedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
