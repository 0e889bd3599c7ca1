//! Common types for transport layer

use serde::Serialize;

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB bus number
    pub bus: u8,
    /// Device address on the bus
    pub address: u8,
    /// Product name if available
    pub product_name: Option<String>,
    /// Serial number if available
    pub serial: Option<String>,
}

impl TransportDeviceInfo {
    /// Short location string, e.g. `003:012`
    pub fn location(&self) -> String {
        format!("{:03}:{:03}", self.bus, self.address)
    }
}

/// Discovered device that can be opened
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}
