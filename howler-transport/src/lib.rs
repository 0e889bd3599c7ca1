//! Transport abstraction layer for Howler arcade controller communication
//!
//! This crate owns everything below the device model:
//!
//! - the 24-byte report framing and opcode constants ([`protocol`])
//! - typed command builders and response parsers ([`command`])
//! - the USB interrupt-endpoint backend ([`UsbTransport`]) and discovery
//! - a monitoring middleware that prints traffic ([`MonitorTransport`])
//! - an in-memory device for tests ([`SimulatedHowler`])

pub mod command;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod sim;
pub mod types;

mod discovery;
mod usb;

pub use command::{
    try_parse_command, try_parse_response, CommandError, FirmwareVersion, HowlerCommand,
    HowlerResponse, ParseError, ParsedCommand, ParsedResponse, QueryCommand,
    QueryFirmwareVersion, QueryRgbLed, RgbLedResponse, SetGlobalBrightness, SetInputKeyboard,
    SetLedBank, SetLedChannel, SetRgbLed,
};
pub use discovery::UsbDiscovery;
pub use error::TransportError;
pub use monitor::{MonitorConfig, MonitorTransport};
pub use protocol::Packet;
pub use sim::SimulatedHowler;
pub use types::{DiscoveredDevice, TransportDeviceInfo};
pub use usb::UsbTransport;

use std::sync::Arc;

/// The core transport trait - all backends implement this
///
/// A transport moves whole reports. Writing a command and reading its answer
/// happen as one exchange so concurrent callers cannot interleave halves.
pub trait Transport: Send + Sync {
    /// Write one report and, if `expect_response` is set, read one back
    ///
    /// # Returns
    /// `Some(report)` when a response was requested, `None` otherwise
    fn exchange(
        &self,
        packet: &Packet,
        expect_response: bool,
    ) -> Result<Option<Packet>, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;
}

/// Type alias for a shared transport
pub type BoxedTransport = Arc<dyn Transport>;

/// Typed send/query helpers available on every transport
pub trait TransportExt {
    /// Send a command that has no response
    fn send<C: HowlerCommand>(&self, cmd: &C) -> Result<(), TransportError>;

    /// Send a command and return the raw response report
    fn query_raw<C: HowlerCommand>(&self, cmd: &C) -> Result<Packet, TransportError>;

    /// Query and parse a typed response (validates identifier and opcode echo)
    fn query<C, R>(&self, cmd: &C) -> Result<R, TransportError>
    where
        C: HowlerCommand,
        R: HowlerResponse;
}

impl<T: Transport + ?Sized> TransportExt for T {
    fn send<C: HowlerCommand>(&self, cmd: &C) -> Result<(), TransportError> {
        self.exchange(&cmd.build(), false).map(|_| ())
    }

    fn query_raw<C: HowlerCommand>(&self, cmd: &C) -> Result<Packet, TransportError> {
        self.exchange(&cmd.build(), true)?
            .ok_or(TransportError::ShortTransfer {
                expected: protocol::REPORT_SIZE,
                actual: 0,
            })
    }

    fn query<C, R>(&self, cmd: &C) -> Result<R, TransportError>
    where
        C: HowlerCommand,
        R: HowlerResponse,
    {
        let resp = self.query_raw(cmd)?;
        R::parse(&resp).map_err(|_| TransportError::InvalidResponse {
            expected: R::OPCODE_ECHO,
            id: resp[0],
            opcode: resp[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::cmd;

    #[test]
    fn test_query_parses_echo() {
        let sim = SimulatedHowler::new();
        let v: FirmwareVersion = sim.query(&QueryFirmwareVersion::default()).unwrap();
        assert_eq!(v, sim.firmware_version());
    }

    #[test]
    fn test_query_maps_echo_mismatch() {
        let sim = SimulatedHowler::new();
        sim.set_echo_override(Some(0x55));
        let err = sim
            .query::<_, RgbLedResponse>(&QueryRgbLed::new(0).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::InvalidResponse {
                expected: cmd::GET_RGB_LED,
                opcode: 0x55,
                ..
            }
        ));
    }

    #[test]
    fn test_send_does_not_read() {
        let sim = SimulatedHowler::new();
        sim.send(&SetGlobalBrightness { level: 9 }).unwrap();
        assert_eq!(sim.sent().len(), 1);
        assert_eq!(sim.responses_read(), 0);
    }

    #[test]
    fn test_boxed_transport_ext() {
        let t: BoxedTransport = Arc::new(SimulatedHowler::new());
        t.send(&SetRgbLed::new(1, 2, 3, 4).unwrap()).unwrap();
        assert_eq!(t.device_info().vid, protocol::device::VENDOR_ID);
    }
}
