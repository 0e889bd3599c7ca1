//! MonitorTransport middleware for tracing transport traffic
//!
//! Wraps any Transport implementation and prints every command and response
//! passing through it to stderr.
//!
//! # Example
//!
//! ```ignore
//! use howler_transport::{MonitorConfig, MonitorTransport, UsbDiscovery};
//!
//! let discovery = UsbDiscovery::new()?;
//! let transport = discovery.open_all()?.remove(0);
//! let monitored = MonitorTransport::wrap(transport, MonitorConfig::default().with_hex(true));
//! ```

use std::sync::Arc;

use crossterm::style::Stylize;

use crate::protocol::{cmd, Packet};
use crate::{
    try_parse_command, try_parse_response, ParsedCommand, ParsedResponse, Transport,
    TransportDeviceInfo, TransportError,
};

/// Configuration for the MonitorTransport
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Show raw hex dump alongside decoded output
    pub show_hex: bool,
}

impl MonitorConfig {
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }
}

/// Transport middleware that prints all commands and responses
pub struct MonitorTransport {
    inner: Arc<dyn Transport>,
    config: MonitorConfig,
}

impl MonitorTransport {
    /// Wrap a transport with printing middleware
    pub fn wrap(transport: Arc<dyn Transport>, config: MonitorConfig) -> Arc<dyn Transport> {
        Arc::new(Self {
            inner: transport,
            config,
        })
    }

    fn print_command(&self, packet: &Packet) {
        match try_parse_command(packet) {
            ParsedCommand::Unknown { opcode, data } => {
                eprintln!(
                    "{} {}  0x{:02x} {} {:02x?}",
                    ">>>".cyan(),
                    "CMD".cyan().bold(),
                    opcode,
                    cmd::name(opcode).yellow(),
                    data
                );
            }
            parsed => {
                eprintln!("{} {}  {:?}", ">>>".cyan(), "CMD".cyan().bold(), parsed);
            }
        }

        if self.config.show_hex {
            eprintln!("    {}  {:02x?}", "HEX".dim(), packet);
        }
    }

    fn print_response(&self, packet: &Packet) {
        match try_parse_response(packet) {
            ParsedResponse::Unknown { id, opcode, data } => {
                eprintln!(
                    "{} {}  id 0x{:02x} 0x{:02x} {} {} {:02x?}",
                    "<<<".green(),
                    "RSP".green().bold(),
                    id,
                    opcode,
                    cmd::name(opcode).yellow(),
                    "UNKNOWN".red().bold(),
                    data
                );
            }
            parsed => {
                eprintln!("{} {}  {:?}", "<<<".green(), "RSP".green().bold(), parsed);
            }
        }

        if self.config.show_hex {
            eprintln!("    {}  {:02x?}", "HEX".dim(), packet);
        }
    }
}

impl Transport for MonitorTransport {
    fn exchange(
        &self,
        packet: &Packet,
        expect_response: bool,
    ) -> Result<Option<Packet>, TransportError> {
        self.print_command(packet);
        let result = self.inner.exchange(packet, expect_response);
        match &result {
            Ok(Some(resp)) => self.print_response(resp),
            Ok(None) => {}
            Err(e) => eprintln!("{} {}  {}", "<<<".red(), "ERR".red().bold(), e),
        }
        result
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        self.inner.device_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FirmwareVersion, QueryFirmwareVersion, SimulatedHowler, TransportExt};

    #[test]
    fn test_monitor_passes_traffic_through() {
        let sim = SimulatedHowler::new();
        let monitored = MonitorTransport::wrap(
            Arc::new(sim.clone()),
            MonitorConfig::default().with_hex(true),
        );

        let v: FirmwareVersion = monitored.query(&QueryFirmwareVersion::default()).unwrap();
        assert_eq!(v, sim.firmware_version());
        assert_eq!(sim.sent().len(), 1);
        assert_eq!(monitored.device_info(), sim.device_info());
    }

    #[test]
    fn test_monitor_propagates_errors() {
        let sim = SimulatedHowler::new();
        sim.inject_error(TransportError::Timeout);
        let monitored = MonitorTransport::wrap(Arc::new(sim), MonitorConfig::default());
        let err = monitored
            .query_raw(&QueryFirmwareVersion::default())
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }
}
