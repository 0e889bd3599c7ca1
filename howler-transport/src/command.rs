//! Type-safe command builders and response parsers
//!
//! Each Howler operation gets a command type that knows its opcode and how to
//! lay out its payload, and (for queries) a response type that validates the
//! identifier/opcode echo before decoding. Parameter bounds are enforced at
//! construction time so an out-of-range value never reaches the wire.

use std::fmt;

use crate::protocol::{self, cmd, input, input_type, keyboard, led, Packet, HOWLER_ID};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

// =============================================================================
// Core Traits
// =============================================================================

/// A command that can be serialized to a 24-byte report
pub trait HowlerCommand {
    /// Opcode byte (e.g., 0x09 for SET_RGB_LED_BANK)
    const OPCODE: u8;

    /// Whether the device answers this command with a response report
    const EXPECTS_RESPONSE: bool = false;

    /// Serialize the payload (excluding identifier and opcode)
    fn to_data(&self) -> Vec<u8>;

    /// Build the complete report
    fn build(&self) -> Packet {
        protocol::build_command(Self::OPCODE, &self.to_data())
    }
}

/// A response that can be parsed from a 24-byte report
pub trait HowlerResponse: Sized {
    /// Opcode the device must echo in byte 1
    const OPCODE_ECHO: u8;

    /// Decode the payload (bytes 2..24, echo already validated)
    fn from_payload(payload: &[u8]) -> Self;

    /// Parse with identifier and opcode validation
    fn parse(packet: &Packet) -> Result<Self, ParseError> {
        if packet[0] != HOWLER_ID {
            return Err(ParseError::IdMismatch {
                expected: HOWLER_ID,
                got: packet[0],
            });
        }
        if packet[1] != Self::OPCODE_ECHO {
            return Err(ParseError::OpcodeMismatch {
                expected: Self::OPCODE_ECHO,
                got: packet[1],
            });
        }
        Ok(Self::from_payload(&packet[2..]))
    }
}

/// Parse error for responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    IdMismatch { expected: u8, got: u8 },
    OpcodeMismatch { expected: u8, got: u8 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdMismatch { expected, got } => write!(
                f,
                "Device id mismatch: expected 0x{:02X}, got 0x{:02X}",
                expected, got
            ),
            Self::OpcodeMismatch { expected, got } => write!(
                f,
                "Opcode mismatch: expected 0x{:02X} ({}), got 0x{:02X} ({})",
                expected,
                cmd::name(*expected),
                got,
                cmd::name(*got)
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A command parameter outside the range the firmware accepts.
///
/// The firmware indexes its LED and input tables with these bytes unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub field: &'static str,
    pub value: u32,
    pub reason: &'static str,
}

impl CommandError {
    fn new(field: &'static str, value: impl Into<u32>, reason: &'static str) -> Self {
        Self {
            field,
            value: value.into(),
            reason,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} {}: {}", self.field, self.value, self.reason)
    }
}

impl std::error::Error for CommandError {}

// =============================================================================
// Firmware Version
// =============================================================================

/// Generic query command with no payload
#[derive(Debug, Clone, Default)]
pub struct QueryCommand<const OPCODE_BYTE: u8>;

impl<const OPCODE_BYTE: u8> HowlerCommand for QueryCommand<OPCODE_BYTE> {
    const OPCODE: u8 = OPCODE_BYTE;
    const EXPECTS_RESPONSE: bool = true;

    fn to_data(&self) -> Vec<u8> {
        vec![]
    }
}

pub type QueryFirmwareVersion = QueryCommand<{ cmd::GET_FW_REV }>;

/// GET_FW_REV response: bytes 2-3 are (major, minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl FirmwareVersion {
    /// Format as `MAJOR.MINOR` with the minor part as thousandths (1, 250 -> "1.250")
    pub fn format(&self) -> String {
        format!("{}.{:03}", self.major, self.minor)
    }

    /// Numeric value, `major + minor / 1000`
    pub fn as_f32(&self) -> f32 {
        f32::from(self.major) + f32::from(self.minor) * 0.001
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl HowlerResponse for FirmwareVersion {
    const OPCODE_ECHO: u8 = cmd::GET_FW_REV;

    fn from_payload(payload: &[u8]) -> Self {
        Self {
            major: payload[0],
            minor: payload[1],
        }
    }
}

// =============================================================================
// LED Commands
// =============================================================================

fn check_led_index(index: u8) -> Result<(), CommandError> {
    if index >= led::NUM_LEDS {
        return Err(CommandError::new(
            "LED index",
            index,
            "must be below the number of LEDs (32)",
        ));
    }
    Ok(())
}

/// SET_RGB_LED (0x01): sets all three channels of one LED by flat index
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SetRgbLed {
    index: u8,
    red: u8,
    green: u8,
    blue: u8,
}

impl SetRgbLed {
    pub fn new(index: u8, red: u8, green: u8, blue: u8) -> Result<Self, CommandError> {
        check_led_index(index)?;
        Ok(Self {
            index,
            red,
            green,
            blue,
        })
    }
}

impl HowlerCommand for SetRgbLed {
    const OPCODE: u8 = cmd::SET_RGB_LED;

    fn to_data(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

/// SET_INDIVIDUAL_LED (0x02): sets one channel byte
///
/// The firmware addresses channels with a single packed byte,
/// `3 * index + channel`, so both halves are checked before packing.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SetLedChannel {
    packed: u8,
    value: u8,
}

impl SetLedChannel {
    pub fn new(index: u8, channel: u8, value: u8) -> Result<Self, CommandError> {
        if channel >= led::CHANNEL_LIMIT {
            return Err(CommandError::new(
                "LED channel",
                channel,
                "must be below 85",
            ));
        }
        let packed = index
            .checked_mul(3)
            .and_then(|v| v.checked_add(channel))
            .ok_or_else(|| {
                CommandError::new("LED index", index, "packed channel address overflows a byte")
            })?;
        Ok(Self { packed, value })
    }

    /// The packed `3 * index + channel` address
    pub fn packed(&self) -> u8 {
        self.packed
    }
}

impl HowlerCommand for SetLedChannel {
    const OPCODE: u8 = cmd::SET_INDIVIDUAL_LED;

    fn to_data(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

/// GET_RGB_LED (0x08) query
#[derive(Debug, Clone, Copy)]
pub struct QueryRgbLed {
    index: u8,
}

impl QueryRgbLed {
    pub fn new(index: u8) -> Result<Self, CommandError> {
        check_led_index(index)?;
        Ok(Self { index })
    }

    pub fn index(&self) -> u8 {
        self.index
    }
}

impl HowlerCommand for QueryRgbLed {
    const OPCODE: u8 = cmd::GET_RGB_LED;
    const EXPECTS_RESPONSE: bool = true;

    fn to_data(&self) -> Vec<u8> {
        vec![self.index]
    }
}

/// GET_RGB_LED response: bytes 2-4 are (red, green, blue)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbLedResponse {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl HowlerResponse for RgbLedResponse {
    const OPCODE_ECHO: u8 = cmd::GET_RGB_LED;

    fn from_payload(payload: &[u8]) -> Self {
        Self {
            red: payload[0],
            green: payload[1],
            blue: payload[2],
        }
    }
}

/// SET_RGB_LED_BANK (0x09): rewrites all 16 slots of one bank
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SetLedBank {
    bank: u8,
    values: [u8; led::BANK_SIZE],
}

impl SetLedBank {
    pub fn new(bank: u8, values: [u8; led::BANK_SIZE]) -> Result<Self, CommandError> {
        if usize::from(bank) >= led::NUM_BANKS {
            return Err(CommandError::new("LED bank", bank, "must be in 0..6"));
        }
        Ok(Self { bank, values })
    }

    pub fn bank(&self) -> u8 {
        self.bank
    }
}

impl HowlerCommand for SetLedBank {
    const OPCODE: u8 = cmd::SET_RGB_LED_BANK;

    fn to_data(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

/// SET_GLOBAL_BRIGHTNESS (0x06)
#[derive(Debug, Clone, Copy)]
pub struct SetGlobalBrightness {
    pub level: u8,
}

impl HowlerCommand for SetGlobalBrightness {
    const OPCODE: u8 = cmd::SET_GLOBAL_BRIGHTNESS;

    fn to_data(&self) -> Vec<u8> {
        vec![self.level]
    }
}

// =============================================================================
// Input Mapping
// =============================================================================

/// SET_INPUT (0x03) mapping an input to a keyboard key
///
/// The payload's input byte always carries the keyboard input-type selector;
/// the chosen input is validated but does not appear on the wire.
#[derive(Debug, Clone, Copy)]
pub struct SetInputKeyboard {
    input: u8,
    scan_code: u8,
    modifiers: u8,
}

impl SetInputKeyboard {
    pub fn new(input: u8, scan_code: u8, modifiers: u8) -> Result<Self, CommandError> {
        if input >= input::NUM_INPUTS {
            return Err(CommandError::new(
                "input",
                input,
                "must be a joystick direction or button (0..42)",
            ));
        }
        if !keyboard::is_valid_scan_code(scan_code) {
            return Err(CommandError::new(
                "scan code",
                scan_code,
                "not a supported keyboard key",
            ));
        }
        Ok(Self {
            input,
            scan_code,
            modifiers,
        })
    }

    pub fn input(&self) -> u8 {
        self.input
    }
}

impl HowlerCommand for SetInputKeyboard {
    const OPCODE: u8 = cmd::SET_INPUT;

    fn to_data(&self) -> Vec<u8> {
        vec![input_type::KEYBOARD, self.scan_code, self.modifiers]
    }
}

// =============================================================================
// Packet Dispatchers for monitoring
// =============================================================================

/// A command report decoded for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    SetRgbLed { index: u8, rgb: [u8; 3] },
    SetLedChannel { index: u8, channel: u8, value: u8 },
    SetInput { input_type: u8, scan_code: u8, modifiers: u8 },
    SetGlobalBrightness { level: u8 },
    GetRgbLed { index: u8 },
    SetLedBank { bank: u8, values: [u8; led::BANK_SIZE] },
    GetFirmwareVersion,
    Unknown { opcode: u8, data: Vec<u8> },
}

/// Decode a command report (identifier not checked)
pub fn try_parse_command(packet: &Packet) -> ParsedCommand {
    let d = &packet[2..];
    match packet[1] {
        cmd::SET_RGB_LED => ParsedCommand::SetRgbLed {
            index: d[0],
            rgb: [d[1], d[2], d[3]],
        },
        cmd::SET_INDIVIDUAL_LED => ParsedCommand::SetLedChannel {
            index: d[0] / 3,
            channel: d[0] % 3,
            value: d[1],
        },
        cmd::SET_INPUT => ParsedCommand::SetInput {
            input_type: d[0],
            scan_code: d[1],
            modifiers: d[2],
        },
        cmd::SET_GLOBAL_BRIGHTNESS => ParsedCommand::SetGlobalBrightness { level: d[0] },
        cmd::GET_RGB_LED => ParsedCommand::GetRgbLed { index: d[0] },
        cmd::SET_RGB_LED_BANK => {
            let mut values = [0u8; led::BANK_SIZE];
            values.copy_from_slice(&d[1..1 + led::BANK_SIZE]);
            ParsedCommand::SetLedBank { bank: d[0], values }
        }
        cmd::GET_FW_REV => ParsedCommand::GetFirmwareVersion,
        opcode => ParsedCommand::Unknown {
            opcode,
            data: trim_padding(d),
        },
    }
}

/// A response report decoded for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    RgbLed(RgbLedResponse),
    FirmwareVersion(FirmwareVersion),
    Unknown { id: u8, opcode: u8, data: Vec<u8> },
}

/// Decode a response report
pub fn try_parse_response(packet: &Packet) -> ParsedResponse {
    if let Ok(r) = RgbLedResponse::parse(packet) {
        return ParsedResponse::RgbLed(r);
    }
    if let Ok(v) = FirmwareVersion::parse(packet) {
        return ParsedResponse::FirmwareVersion(v);
    }
    ParsedResponse::Unknown {
        id: packet[0],
        opcode: packet[1],
        data: trim_padding(&packet[2..]),
    }
}

fn trim_padding(data: &[u8]) -> Vec<u8> {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    data[..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::REPORT_SIZE;

    fn response(opcode: u8, payload: &[u8]) -> Packet {
        protocol::build_command(opcode, payload)
    }

    #[test]
    fn test_firmware_version_query() {
        let buf = QueryFirmwareVersion::default().build();
        assert_eq!(buf[0], HOWLER_ID);
        assert_eq!(buf[1], cmd::GET_FW_REV);
        assert!(buf[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_firmware_version_format() {
        let v = FirmwareVersion::parse(&response(cmd::GET_FW_REV, &[1, 250])).unwrap();
        assert_eq!(v.format(), "1.250");
        assert_eq!(FirmwareVersion { major: 2, minor: 5 }.to_string(), "2.005");
        assert!((v.as_f32() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_set_rgb_led_layout() {
        let buf = SetRgbLed::new(7, 10, 20, 30).unwrap().build();
        assert_eq!(&buf[..6], &[HOWLER_ID, cmd::SET_RGB_LED, 7, 10, 20, 30]);
        assert!(buf[6..].iter().all(|&b| b == 0));
        assert!(SetRgbLed::new(32, 0, 0, 0).is_err());
    }

    #[test]
    fn test_set_led_channel_packing() {
        let c = SetLedChannel::new(5, 2, 0x80).unwrap();
        assert_eq!(c.packed(), 17);
        let buf = c.build();
        assert_eq!(&buf[..4], &[HOWLER_ID, cmd::SET_INDIVIDUAL_LED, 17, 0x80]);
    }

    #[test]
    fn test_set_led_channel_limit() {
        assert!(SetLedChannel::new(0, 84, 1).is_ok());
        let err = SetLedChannel::new(0, 85, 1).unwrap_err();
        assert_eq!(err.field, "LED channel");
        // 3 * 85 + 1 does not fit a byte
        assert!(SetLedChannel::new(85, 1, 0).is_err());
    }

    #[test]
    fn test_set_led_bank_layout() {
        let mut values = [0u8; led::BANK_SIZE];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as u8 + 1;
        }
        let buf = SetLedBank::new(5, values).unwrap().build();
        assert_eq!(buf.len(), REPORT_SIZE);
        assert_eq!(&buf[..3], &[HOWLER_ID, cmd::SET_RGB_LED_BANK, 5]);
        assert_eq!(&buf[3..19], &values);
        assert!(buf[19..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_led_bank_bounds() {
        assert!(SetLedBank::new(5, [0; led::BANK_SIZE]).is_ok());
        assert!(SetLedBank::new(6, [0; led::BANK_SIZE]).is_err());
    }

    #[test]
    fn test_get_rgb_led_parse() {
        let q = QueryRgbLed::new(4).unwrap().build();
        assert_eq!(&q[..3], &[HOWLER_ID, cmd::GET_RGB_LED, 4]);

        let resp = RgbLedResponse::parse(&response(cmd::GET_RGB_LED, &[1, 2, 3])).unwrap();
        assert_eq!(
            resp,
            RgbLedResponse {
                red: 1,
                green: 2,
                blue: 3
            }
        );
    }

    #[test]
    fn test_get_rgb_led_echo_mismatch() {
        let err = RgbLedResponse::parse(&response(cmd::GET_FW_REV, &[1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            ParseError::OpcodeMismatch {
                expected: cmd::GET_RGB_LED,
                got: cmd::GET_FW_REV
            }
        );

        let mut bad_id = response(cmd::GET_RGB_LED, &[1, 2, 3]);
        bad_id[0] = 0x00;
        assert!(matches!(
            RgbLedResponse::parse(&bad_id),
            Err(ParseError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_set_input_keyboard_overrides_input_byte() {
        let c = SetInputKeyboard::new(20, 0x04, 0x02).unwrap();
        assert_eq!(c.input(), 20);
        let buf = c.build();
        assert_eq!(
            &buf[..5],
            &[HOWLER_ID, cmd::SET_INPUT, input_type::KEYBOARD, 0x04, 0x02]
        );
    }

    #[test]
    fn test_set_input_keyboard_bounds() {
        assert!(SetInputKeyboard::new(41, 0x04, 0).is_ok());
        assert!(SetInputKeyboard::new(42, 0x04, 0).is_err());
        assert!(SetInputKeyboard::new(0, 0x00, 0).is_err());
        assert!(SetInputKeyboard::new(0, 0xE1, 0).is_ok());
    }

    #[test]
    fn test_brightness_layout() {
        let buf = SetGlobalBrightness { level: 200 }.build();
        assert_eq!(&buf[..3], &[HOWLER_ID, cmd::SET_GLOBAL_BRIGHTNESS, 200]);
    }

    #[test]
    fn test_parse_command_dispatch() {
        let buf = SetLedChannel::new(4, 1, 9).unwrap().build();
        assert_eq!(
            try_parse_command(&buf),
            ParsedCommand::SetLedChannel {
                index: 4,
                channel: 1,
                value: 9
            }
        );
        let unknown = protocol::build_command(0x42, &[1, 2]);
        assert_eq!(
            try_parse_command(&unknown),
            ParsedCommand::Unknown {
                opcode: 0x42,
                data: vec![1, 2]
            }
        );
    }

    #[test]
    fn test_parse_response_dispatch() {
        let v = response(cmd::GET_FW_REV, &[1, 7]);
        assert_eq!(
            try_parse_response(&v),
            ParsedResponse::FirmwareVersion(FirmwareVersion { major: 1, minor: 7 })
        );
    }
}
