//! In-memory Howler that answers reports like the firmware does
//!
//! Colours live in one place, the six LED banks. Per-LED writes and reads go
//! through the same (bank, slot) layout the firmware uses, so a bank write
//! shows up in GET_RGB_LED and an RGB write shows up in the banks.
//!
//! Clones share state, so a test can hand one clone to the code under test
//! and inspect the traffic and LED state through another.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::FirmwareVersion;
use crate::error::TransportError;
use crate::protocol::{self, cmd, device, led, Packet, HOWLER_ID};
use crate::types::TransportDeviceInfo;
use crate::Transport;

#[derive(Debug)]
struct SimState {
    banks: [[u8; led::BANK_SIZE]; led::NUM_BANKS],
    brightness: Option<u8>,
    last_input: Option<[u8; 3]>,
    firmware: FirmwareVersion,
    sent: Vec<Packet>,
    responses_read: usize,
    echo_override: Option<u8>,
    failing_opcode: Option<u8>,
    injected: VecDeque<TransportError>,
    delayed: Option<(usize, TransportError)>,
}

/// Simulated controller implementing [`Transport`]
#[derive(Debug, Clone)]
pub struct SimulatedHowler {
    state: Arc<Mutex<SimState>>,
    info: TransportDeviceInfo,
}

impl Default for SimulatedHowler {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHowler {
    /// A controller with all LEDs off and firmware 1.250
    pub fn new() -> Self {
        Self::with_info(TransportDeviceInfo {
            vid: device::VENDOR_ID,
            pid: device::PRODUCT_IDS[0],
            bus: 1,
            address: 1,
            product_name: Some("Howler (simulated)".into()),
            serial: None,
        })
    }

    pub fn with_info(info: TransportDeviceInfo) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                banks: [[0; led::BANK_SIZE]; led::NUM_BANKS],
                brightness: None,
                last_input: None,
                firmware: FirmwareVersion {
                    major: 1,
                    minor: 250,
                },
                sent: Vec::new(),
                responses_read: 0,
                echo_override: None,
                failing_opcode: None,
                injected: VecDeque::new(),
                delayed: None,
            })),
            info,
        }
    }

    /// Preset the colour the device reports for a flat LED index
    pub fn set_led(&self, index: u8, rgb: [u8; 3]) {
        self.state.lock().write_led(index, rgb);
    }

    /// Current colour of a flat LED index
    pub fn led(&self, index: u8) -> [u8; 3] {
        self.state.lock().read_led(index).unwrap_or_default()
    }

    /// Slot values last written to a bank
    pub fn bank(&self, bank: usize) -> [u8; led::BANK_SIZE] {
        self.state.lock().banks[bank]
    }

    pub fn brightness(&self) -> Option<u8> {
        self.state.lock().brightness
    }

    /// Last SET_INPUT payload as `[input_type, scan_code, modifiers]`
    pub fn last_input(&self) -> Option<[u8; 3]> {
        self.state.lock().last_input
    }

    pub fn firmware_version(&self) -> FirmwareVersion {
        self.state.lock().firmware
    }

    pub fn set_firmware_version(&self, version: FirmwareVersion) {
        self.state.lock().firmware = version;
    }

    /// Answer every query with this opcode in byte 1
    pub fn set_echo_override(&self, opcode: Option<u8>) {
        self.state.lock().echo_override = opcode;
    }

    /// Fail every exchange whose command carries this opcode
    pub fn set_failing_opcode(&self, opcode: Option<u8>) {
        self.state.lock().failing_opcode = opcode;
    }

    /// Fail the next exchange with `err`
    pub fn inject_error(&self, err: TransportError) {
        self.state.lock().injected.push_back(err);
    }

    /// Let `exchanges` exchanges succeed, then fail the next one with `err`
    pub fn fail_after(&self, exchanges: usize, err: TransportError) {
        self.state.lock().delayed = Some((exchanges, err));
    }

    /// Every report written so far
    pub fn sent(&self) -> Vec<Packet> {
        self.state.lock().sent.clone()
    }

    /// Reports written with a given opcode
    pub fn sent_with_opcode(&self, opcode: u8) -> Vec<Packet> {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|p| p[1] == opcode)
            .copied()
            .collect()
    }

    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }

    /// Number of response reports handed back
    pub fn responses_read(&self) -> usize {
        self.state.lock().responses_read
    }
}

impl SimState {
    fn write_channel(&mut self, index: u8, channel: u8, value: u8) {
        if let Some((bank, slot)) = led::channel_byte(index, channel) {
            self.banks[usize::from(bank)][usize::from(slot)] = value;
        }
    }

    fn write_led(&mut self, index: u8, rgb: [u8; 3]) {
        for (channel, value) in (0u8..).zip(rgb) {
            self.write_channel(index, channel, value);
        }
    }

    fn read_led(&self, index: u8) -> Option<[u8; 3]> {
        let mut rgb = [0u8; 3];
        for (channel, value) in (0u8..).zip(rgb.iter_mut()) {
            let (bank, slot) = led::channel_byte(index, channel)?;
            *value = self.banks[usize::from(bank)][usize::from(slot)];
        }
        Some(rgb)
    }

    fn apply(&mut self, packet: &Packet) -> Option<Packet> {
        let d = &packet[2..];
        match packet[1] {
            cmd::SET_RGB_LED => {
                self.write_led(d[0], [d[1], d[2], d[3]]);
                None
            }
            cmd::SET_INDIVIDUAL_LED => {
                self.write_channel(d[0] / 3, d[0] % 3, d[1]);
                None
            }
            cmd::SET_RGB_LED_BANK => {
                if let Some(bank) = self.banks.get_mut(usize::from(d[0])) {
                    bank.copy_from_slice(&d[1..1 + led::BANK_SIZE]);
                }
                None
            }
            cmd::SET_GLOBAL_BRIGHTNESS => {
                self.brightness = Some(d[0]);
                None
            }
            cmd::SET_INPUT => {
                self.last_input = Some([d[0], d[1], d[2]]);
                None
            }
            cmd::GET_RGB_LED => {
                let rgb = self.read_led(d[0]).unwrap_or_default();
                Some(protocol::build_command(cmd::GET_RGB_LED, &rgb))
            }
            cmd::GET_FW_REV => Some(protocol::build_command(
                cmd::GET_FW_REV,
                &[self.firmware.major, self.firmware.minor],
            )),
            opcode => Some(protocol::build_command(opcode, &[])),
        }
    }
}

impl Transport for SimulatedHowler {
    fn exchange(
        &self,
        packet: &Packet,
        expect_response: bool,
    ) -> Result<Option<Packet>, TransportError> {
        let mut state = self.state.lock();
        if let Some(err) = state.injected.pop_front() {
            return Err(err);
        }
        if let Some((remaining, _)) = state.delayed.as_mut() {
            if *remaining == 0 {
                if let Some((_, err)) = state.delayed.take() {
                    return Err(err);
                }
            } else {
                *remaining -= 1;
            }
        }
        if state.failing_opcode == Some(packet[1]) {
            return Err(TransportError::Io(format!(
                "simulated failure for {}",
                cmd::name(packet[1])
            )));
        }
        if packet[0] != HOWLER_ID {
            // Firmware drops reports without its identifier
            return Err(TransportError::Timeout);
        }

        state.sent.push(*packet);
        let response = state.apply(packet);
        if !expect_response {
            return Ok(None);
        }

        let mut response = response.ok_or(TransportError::Timeout)?;
        if let Some(opcode) = state.echo_override {
            response[1] = opcode;
        }
        state.responses_read += 1;
        Ok(Some(response))
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{HowlerCommand, SetLedBank, SetLedChannel, SetRgbLed};

    #[test]
    fn test_led_writes_update_state() {
        let sim = SimulatedHowler::new();
        sim.exchange(&SetRgbLed::new(3, 1, 2, 3).unwrap().build(), false)
            .unwrap();
        assert_eq!(sim.led(3), [1, 2, 3]);

        sim.exchange(&SetLedChannel::new(3, 2, 9).unwrap().build(), false)
            .unwrap();
        assert_eq!(sim.led(3), [1, 2, 9]);
    }

    #[test]
    fn test_bank_write() {
        let sim = SimulatedHowler::new();
        let mut values = [0u8; led::BANK_SIZE];
        values[15] = 0x7F;
        sim.exchange(&SetLedBank::new(2, values).unwrap().build(), false)
            .unwrap();
        assert_eq!(sim.bank(2)[15], 0x7F);
        assert_eq!(sim.sent_with_opcode(cmd::SET_RGB_LED_BANK).len(), 1);

        // Bank 2 slot 15 is the green byte of joystick 2 (flat 1)
        assert_eq!(sim.led(1), [0, 0x7F, 0]);
    }

    #[test]
    fn test_rgb_write_lands_in_banks() {
        let sim = SimulatedHowler::new();
        // Button 1 is flat 4, red byte at bank 0 slot 1
        sim.exchange(&SetRgbLed::new(4, 10, 20, 30).unwrap().build(), false)
            .unwrap();
        assert_eq!(sim.bank(0)[1], 10);
        assert_eq!(sim.bank(2)[1], 20);
        assert_eq!(sim.bank(4)[1], 30);

        let resp = sim
            .exchange(&protocol::build_command(cmd::GET_RGB_LED, &[4]), true)
            .unwrap()
            .unwrap();
        assert_eq!(&resp[2..5], &[10, 20, 30]);
    }

    #[test]
    fn test_injected_error_not_recorded() {
        let sim = SimulatedHowler::new();
        sim.inject_error(TransportError::Disconnected);
        let err = sim
            .exchange(&protocol::build_command(cmd::GET_FW_REV, &[]), true)
            .unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
        assert!(sim.sent().is_empty());

        // Only the next exchange fails
        assert!(sim
            .exchange(&protocol::build_command(cmd::GET_FW_REV, &[]), true)
            .is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let sim = SimulatedHowler::new();
        let other = sim.clone();
        other.set_led(0, [9, 8, 7]);
        assert_eq!(sim.led(0), [9, 8, 7]);
    }
}
