//! Protocol constants and utilities for Howler controller communication
//!
//! Every command and response is a fixed 24-byte interrupt report:
//! byte 0 is the device identifier (`HOWLER_ID`), byte 1 the opcode, and the
//! remaining 22 bytes an opcode-specific payload, zero-padded.

/// Size of every command and response report
pub const REPORT_SIZE: usize = 24;

/// Bytes available after the identifier and opcode
pub const PAYLOAD_SIZE: usize = REPORT_SIZE - 2;

/// Fixed device identifier present in byte 0 of every report
pub const HOWLER_ID: u8 = 0xCE;

/// A complete command or response report
pub type Packet = [u8; REPORT_SIZE];

/// Opcodes understood by the Howler firmware
pub mod cmd {
    pub const SET_RGB_LED: u8 = 0x01;
    pub const SET_INDIVIDUAL_LED: u8 = 0x02;
    pub const SET_INPUT: u8 = 0x03;
    pub const GET_INPUT: u8 = 0x04;
    pub const SET_DEFAULT: u8 = 0x05;
    pub const SET_GLOBAL_BRIGHTNESS: u8 = 0x06;
    pub const SET_RGB_LED_DEFAULT: u8 = 0x07;
    pub const GET_RGB_LED: u8 = 0x08;
    pub const SET_RGB_LED_BANK: u8 = 0x09;
    pub const GET_FW_REV: u8 = 0xA0;
    pub const GET_ACCEL_DATA: u8 = 0xAC;

    /// Get human-readable name for an opcode
    pub fn name(opcode: u8) -> &'static str {
        match opcode {
            SET_RGB_LED => "SET_RGB_LED",
            SET_INDIVIDUAL_LED => "SET_INDIVIDUAL_LED",
            SET_INPUT => "SET_INPUT",
            GET_INPUT => "GET_INPUT",
            SET_DEFAULT => "SET_DEFAULT",
            SET_GLOBAL_BRIGHTNESS => "SET_GLOBAL_BRIGHTNESS",
            SET_RGB_LED_DEFAULT => "SET_RGB_LED_DEFAULT",
            GET_RGB_LED => "GET_RGB_LED",
            SET_RGB_LED_BANK => "SET_RGB_LED_BANK",
            GET_FW_REV => "GET_FW_REV",
            GET_ACCEL_DATA => "GET_ACCEL_DATA",
            _ => "UNKNOWN",
        }
    }
}

/// Input-type selector carried by SET_INPUT
pub mod input_type {
    pub const JOYSTICK: u8 = 0x00;
    pub const KEYBOARD: u8 = 0x01;
    pub const MOUSE: u8 = 0x02;
}

/// Physical inputs that can be remapped, in wire order:
/// joystick 1-4 up/down/left/right, then buttons 1-26
pub mod input {
    /// Direction inputs per joystick
    pub const DIRECTIONS_PER_JOYSTICK: u8 = 4;
    pub const NUM_JOYSTICK_INPUTS: u8 = super::led::NUM_JOYSTICKS * DIRECTIONS_PER_JOYSTICK;
    pub const NUM_INPUTS: u8 = NUM_JOYSTICK_INPUTS + super::led::NUM_BUTTONS;
}

/// USB HID keyboard usage codes accepted by SET_INPUT
pub mod keyboard {
    /// `A`
    pub const FIRST_KEY: u8 = 0x04;
    /// `Application`
    pub const LAST_KEY: u8 = 0x65;
    /// Left Control
    pub const FIRST_MODIFIER_KEY: u8 = 0xE0;
    /// Right GUI
    pub const LAST_MODIFIER_KEY: u8 = 0xE7;

    /// Check whether the firmware accepts a scan code
    #[inline]
    pub fn is_valid_scan_code(code: u8) -> bool {
        (FIRST_KEY..=LAST_KEY).contains(&code)
            || (FIRST_MODIFIER_KEY..=LAST_MODIFIER_KEY).contains(&code)
    }
}

/// LED layout of the controller
pub mod led {
    /// Number of on-device LED banks
    pub const NUM_BANKS: usize = 6;
    /// Channel-byte slots per bank
    pub const BANK_SIZE: usize = 16;

    pub const NUM_JOYSTICKS: u8 = 4;
    pub const NUM_BUTTONS: u8 = 26;
    pub const NUM_HIGH_POWER_LEDS: u8 = 2;
    /// Total RGB LEDs in flat index order: joysticks, buttons, high-power
    pub const NUM_LEDS: u8 = NUM_JOYSTICKS + NUM_BUTTONS + NUM_HIGH_POWER_LEDS;

    /// Flat index of joystick 1
    pub const JOYSTICK_OFFSET: u8 = 0;
    /// Flat index of button 1
    pub const BUTTON_OFFSET: u8 = NUM_JOYSTICKS;
    /// Flat index of high-power LED 1
    pub const HIGH_POWER_OFFSET: u8 = NUM_JOYSTICKS + NUM_BUTTONS;

    /// Channels must stay below this so `3 * index + channel` fits a byte
    pub const CHANNEL_LIMIT: u8 = 85;

    /// Banks between one channel's byte and the next channel's byte
    pub const CHANNEL_BANK_STRIDE: u8 = 2;

    /// (bank, slot) of each LED's red byte in flat index order
    ///
    /// Green is [`CHANNEL_BANK_STRIDE`] banks up at the same slot and blue
    /// twice that.
    pub const RED_BYTES: [(u8, u8); NUM_LEDS as usize] = [
        // Joysticks 1-4
        (0, 0),
        (0, 15),
        (1, 6),
        (1, 9),
        // Buttons 1-26
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (0, 5),
        (0, 6),
        (0, 7),
        (1, 0),
        (1, 1),
        (1, 2),
        (1, 3),
        (1, 4),
        (1, 5),
        (0, 14),
        (0, 13),
        (0, 12),
        (0, 11),
        (0, 10),
        (0, 9),
        (0, 8),
        (1, 15),
        (1, 14),
        (1, 13),
        (1, 12),
        (1, 11),
        (1, 10),
        // High-power 1-2
        (1, 7),
        (1, 8),
    ];

    /// (bank, slot) holding channel 0-2 of a flat LED
    pub const fn channel_byte(flat: u8, channel: u8) -> Option<(u8, u8)> {
        if flat >= NUM_LEDS || channel >= 3 {
            return None;
        }
        let (bank, slot) = RED_BYTES[flat as usize];
        Some((bank + channel * CHANNEL_BANK_STRIDE, slot))
    }
}

/// USB identification and endpoints
pub mod device {
    /// Atmel vendor ID used by Howler boards
    pub const VENDOR_ID: u16 = 0x03EB;

    /// Recognized Howler product IDs
    pub const PRODUCT_IDS: &[u16] = &[0x6800, 0x6801, 0x6802, 0x6803];

    /// Interface carrying the command endpoints
    pub const INTERFACE: u8 = 0;
    /// Interrupt OUT endpoint for commands
    pub const ENDPOINT_OUT: u8 = 0x02;
    /// Interrupt IN endpoint for responses
    pub const ENDPOINT_IN: u8 = 0x81;

    /// Check whether a VID/PID pair belongs to a Howler
    #[inline]
    pub fn is_howler(vid: u16, pid: u16) -> bool {
        vid == VENDOR_ID && PRODUCT_IDS.contains(&pid)
    }
}

/// Transfer timing
pub mod timing {
    /// Timeout used by interactive callers that poll the device
    pub const INTERACTIVE_TIMEOUT_MS: u64 = 2000;
}

/// Build a complete report: identifier, opcode, payload, zero padding.
///
/// Payload bytes beyond `PAYLOAD_SIZE` are dropped.
pub fn build_command(opcode: u8, payload: &[u8]) -> Packet {
    let mut buf = [0u8; REPORT_SIZE];
    buf[0] = HOWLER_ID;
    buf[1] = opcode;
    let len = payload.len().min(PAYLOAD_SIZE);
    buf[2..2 + len].copy_from_slice(&payload[..len]);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_framing() {
        let buf = build_command(cmd::SET_RGB_LED, &[5, 10, 20, 30]);
        assert_eq!(buf.len(), REPORT_SIZE);
        assert_eq!(buf[0], HOWLER_ID);
        assert_eq!(buf[1], cmd::SET_RGB_LED);
        assert_eq!(&buf[2..6], &[5, 10, 20, 30]);
        assert!(buf[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_build_command_truncates_oversized_payload() {
        let payload = [0xFFu8; 30];
        let buf = build_command(cmd::SET_RGB_LED_BANK, &payload);
        assert_eq!(buf[0], HOWLER_ID);
        assert!(buf[2..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_led_offsets() {
        assert_eq!(led::BUTTON_OFFSET, 4);
        assert_eq!(led::HIGH_POWER_OFFSET, 30);
        assert_eq!(led::NUM_LEDS, 32);
    }

    #[test]
    fn test_is_howler() {
        assert!(device::is_howler(0x03EB, 0x6800));
        assert!(device::is_howler(0x03EB, 0x6803));
        assert!(!device::is_howler(0x03EB, 0x6804));
        assert!(!device::is_howler(0x3151, 0x6800));
    }

    #[test]
    fn test_scan_code_ranges() {
        assert!(!keyboard::is_valid_scan_code(0x00));
        assert!(!keyboard::is_valid_scan_code(0x03));
        assert!(keyboard::is_valid_scan_code(0x04));
        assert!(keyboard::is_valid_scan_code(0x65));
        assert!(!keyboard::is_valid_scan_code(0x66));
        assert!(keyboard::is_valid_scan_code(0xE0));
        assert!(keyboard::is_valid_scan_code(0xE7));
        assert!(!keyboard::is_valid_scan_code(0xE8));
        assert_eq!(input::NUM_INPUTS, 42);
    }

    #[test]
    fn test_channel_bytes() {
        // Joystick 2 is flat 1
        assert_eq!(led::channel_byte(1, 0), Some((0, 15)));
        assert_eq!(led::channel_byte(1, 1), Some((2, 15)));
        assert_eq!(led::channel_byte(1, 2), Some((4, 15)));
        assert_eq!(led::channel_byte(31, 2), Some((5, 8)));
        assert_eq!(led::channel_byte(32, 0), None);
        assert_eq!(led::channel_byte(0, 3), None);
    }

    #[test]
    fn test_opcode_names() {
        assert_eq!(cmd::name(cmd::GET_FW_REV), "GET_FW_REV");
        assert_eq!(cmd::name(0x42), "UNKNOWN");
    }
}
