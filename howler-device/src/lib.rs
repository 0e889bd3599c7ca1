//! High-level interface for Howler arcade controllers
//!
//! This crate provides LED and input-mapping operations on top of any
//! transport (USB, simulated, monitored). LED colours are addressed by
//! category and 1-based index; writes go through a per-device bank cache so
//! unchanged bytes never reach the wire.

pub mod bank;
pub mod context;
pub mod error;
pub mod input;
pub mod led;
pub mod tables;

pub use bank::BankCache;
pub use context::{ContextOptions, HowlerContext};
pub use error::DeviceError;
pub use input::{Direction, Input, Modifiers};
pub use led::{Led, LedChannel};
pub use tables::{LedGroup, LedRef};

pub use howler_transport::{FirmwareVersion, TransportDeviceInfo};

use std::fmt;
use std::sync::Arc;

use howler_transport::protocol::led::NUM_LEDS;
use howler_transport::{
    HowlerResponse, QueryFirmwareVersion, QueryRgbLed, RgbLedResponse, SetGlobalBrightness,
    SetInputKeyboard, SetLedChannel, SetRgbLed, Transport, TransportExt,
};
use tracing::{debug, info};

/// One opened controller
///
/// Owns the transport and the bank cache. Mutating operations take
/// `&mut self`; share a device across threads by wrapping it in a mutex.
pub struct HowlerDevice {
    transport: Arc<dyn Transport>,
    banks: BankCache,
}

impl fmt::Debug for HowlerDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HowlerDevice")
            .field("info", self.info())
            .field("banks", &self.banks)
            .finish()
    }
}

impl HowlerDevice {
    /// Wrap a transport with an all-zero bank cache
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            banks: BankCache::new(),
        }
    }

    /// Wrap a transport and load the current LED colours into the cache
    pub fn open(transport: Arc<dyn Transport>) -> Result<Self, DeviceError> {
        let mut device = Self::new(transport);
        device.prime()?;
        Ok(device)
    }

    /// Get device information
    pub fn info(&self) -> &TransportDeviceInfo {
        self.transport.device_info()
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn bank_cache(&self) -> &BankCache {
        &self.banks
    }

    /// Read every LED back from the device into the bank cache
    ///
    /// LEDs are read in flat order: joysticks, buttons, high-power.
    pub fn prime(&mut self) -> Result<(), DeviceError> {
        for flat in 0..NUM_LEDS {
            let rgb = self.read_led(flat)?;
            self.record_led(flat, rgb);
        }
        debug!("Primed bank cache for {}", self.info().location());
        Ok(())
    }

    fn read_led(&self, flat: u8) -> Result<Led, DeviceError> {
        let resp: RgbLedResponse = self
            .transport
            .query(&QueryRgbLed::new(flat)?)
            .map_err(DeviceError::from_transport)?;
        Ok(Led::new(resp.red, resp.green, resp.blue))
    }

    fn record_led(&mut self, flat: u8, value: Led) {
        if let Some((group, index)) = LedGroup::from_absolute(flat) {
            for channel in LedChannel::ALL {
                if let Ok(r) = group.channel_ref(index, channel) {
                    self.banks.record(r, value.channel(channel));
                }
            }
        }
    }

    // === Firmware ===

    /// Firmware version as `MAJOR.MINOR` (e.g. "1.250")
    ///
    /// A response that does not echo the version opcode yields an empty
    /// string rather than an error.
    pub fn get_device_version(&self) -> Result<String, DeviceError> {
        let resp = self
            .transport
            .query_raw(&QueryFirmwareVersion::default())
            .map_err(DeviceError::from_transport)?;
        match FirmwareVersion::parse(&resp) {
            Ok(version) => Ok(version.format()),
            Err(e) => {
                debug!("Ignoring firmware version response: {}", e);
                Ok(String::new())
            }
        }
    }

    // === Global ===

    pub fn set_global_brightness(&self, level: u8) -> Result<(), DeviceError> {
        self.transport
            .send(&SetGlobalBrightness { level })
            .map_err(DeviceError::from_transport)
    }

    // === Grouped LEDs ===

    /// Set all three channels of an LED, red then green then blue
    ///
    /// A failure part-way leaves the channels written so far on the device.
    pub fn set_led(&mut self, group: LedGroup, index: u8, led: Led) -> Result<(), DeviceError> {
        group.lookup(index)?;
        for channel in LedChannel::ALL {
            self.set_led_channel(group, index, channel, led.channel(channel))?;
        }
        Ok(())
    }

    /// Set one channel of an LED through the bank cache
    pub fn set_led_channel(
        &mut self,
        group: LedGroup,
        index: u8,
        channel: LedChannel,
        value: u8,
    ) -> Result<(), DeviceError> {
        let r = group.channel_ref(index, channel)?;
        self.banks.update(self.transport.as_ref(), r, value)?;
        Ok(())
    }

    /// Read an LED's colour from the device
    ///
    /// The result also refreshes the bank cache.
    pub fn get_led(&mut self, group: LedGroup, index: u8) -> Result<Led, DeviceError> {
        let flat = group.absolute_index(index)?;
        let led = self.read_led(flat)?;
        self.record_led(flat, led);
        Ok(led)
    }

    pub fn set_button_led(&mut self, button: u8, led: Led) -> Result<(), DeviceError> {
        self.set_led(LedGroup::Button, button, led)
    }

    pub fn set_button_led_channel(
        &mut self,
        button: u8,
        channel: LedChannel,
        value: u8,
    ) -> Result<(), DeviceError> {
        self.set_led_channel(LedGroup::Button, button, channel, value)
    }

    pub fn get_button_led(&mut self, button: u8) -> Result<Led, DeviceError> {
        self.get_led(LedGroup::Button, button)
    }

    pub fn set_joystick_led(&mut self, joystick: u8, led: Led) -> Result<(), DeviceError> {
        self.set_led(LedGroup::Joystick, joystick, led)
    }

    pub fn set_joystick_led_channel(
        &mut self,
        joystick: u8,
        channel: LedChannel,
        value: u8,
    ) -> Result<(), DeviceError> {
        self.set_led_channel(LedGroup::Joystick, joystick, channel, value)
    }

    pub fn get_joystick_led(&mut self, joystick: u8) -> Result<Led, DeviceError> {
        self.get_led(LedGroup::Joystick, joystick)
    }

    pub fn set_high_power_led(&mut self, index: u8, led: Led) -> Result<(), DeviceError> {
        self.set_led(LedGroup::HighPower, index, led)
    }

    pub fn set_high_power_led_channel(
        &mut self,
        index: u8,
        channel: LedChannel,
        value: u8,
    ) -> Result<(), DeviceError> {
        self.set_led_channel(LedGroup::HighPower, index, channel, value)
    }

    pub fn get_high_power_led(&mut self, index: u8) -> Result<Led, DeviceError> {
        self.get_led(LedGroup::HighPower, index)
    }

    // === Direct LED writes ===

    /// SET_RGB_LED by flat index, bypassing the bank write path
    pub fn write_led_rgb(&mut self, flat: u8, led: Led) -> Result<(), DeviceError> {
        let cmd = SetRgbLed::new(flat, led.red, led.green, led.blue)?;
        self.transport
            .send(&cmd)
            .map_err(DeviceError::from_transport)?;
        self.record_led(flat, led);
        Ok(())
    }

    /// SET_INDIVIDUAL_LED with a raw channel number
    ///
    /// The device addresses the byte `3 * flat + channel`, so channels above
    /// 2 spill into following LEDs; the cache records whichever LED that is.
    pub fn write_led_channel(&mut self, flat: u8, channel: u8, value: u8) -> Result<(), DeviceError> {
        let cmd = SetLedChannel::new(flat, channel, value)?;
        self.transport
            .send(&cmd)
            .map_err(DeviceError::from_transport)?;

        let target = cmd.packed() / 3;
        if let Some((group, index)) = LedGroup::from_absolute(target) {
            let channel = LedChannel::ALL[usize::from(cmd.packed() % 3)];
            if let Ok(r) = group.channel_ref(index, channel) {
                self.banks.record(r, value);
            }
        }
        Ok(())
    }

    // === Input mapping ===

    /// Map an input to a keyboard key with modifiers
    ///
    /// The report carries the keyboard input-type selector in the input
    /// field; `input` is validated and logged but not sent.
    pub fn set_input_keyboard(
        &self,
        input: Input,
        scan_code: u8,
        modifiers: Modifiers,
    ) -> Result<(), DeviceError> {
        let cmd = SetInputKeyboard::new(input.index()?, scan_code, modifiers.bits())?;
        info!(
            "Mapping {} to key 0x{:02X} ({}), modifiers {}",
            input,
            scan_code,
            crate::input::key_name(scan_code).unwrap_or("?"),
            modifiers
        );
        self.transport
            .send(&cmd)
            .map_err(DeviceError::from_transport)
    }
}
