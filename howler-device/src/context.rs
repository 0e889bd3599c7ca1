//! Opening every attached controller

use std::sync::Arc;
use std::time::Duration;

use howler_transport::{DiscoveredDevice, MonitorConfig, Transport, UsbDiscovery};
use tracing::{info, warn};

use crate::error::DeviceError;
use crate::HowlerDevice;

/// How controllers are opened
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Per-transfer timeout; `None` blocks until the device answers
    pub timeout: Option<Duration>,
    /// Read every LED back into the bank cache on open
    pub prime_leds: bool,
    /// Print all traffic through [`howler_transport::MonitorTransport`]
    pub monitor: Option<MonitorConfig>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            prime_leds: true,
            monitor: None,
        }
    }
}

/// All controllers that could be opened, in enumeration order
pub struct HowlerContext {
    devices: Vec<HowlerDevice>,
}

impl HowlerContext {
    /// Enumerate the USB bus and open every Howler found
    ///
    /// Devices that cannot be opened, or whose LED read-back fails while
    /// priming, are skipped with a warning.
    pub fn init(options: &ContextOptions) -> Result<Self, DeviceError> {
        let mut discovery = UsbDiscovery::new()
            .map_err(DeviceError::from_transport)?
            .with_timeout(options.timeout);
        if let Some(config) = &options.monitor {
            discovery = discovery.with_monitor(config.clone());
        }

        let transports = discovery.open_all().map_err(DeviceError::from_transport)?;
        Ok(Self::from_transports(transports, options.prime_leds))
    }

    /// Build a context over already-open transports
    pub fn from_transports(transports: Vec<Arc<dyn Transport>>, prime_leds: bool) -> Self {
        let mut devices = Vec::with_capacity(transports.len());
        for transport in transports {
            let location = transport.device_info().location();
            let device = if prime_leds {
                match HowlerDevice::open(transport) {
                    Ok(d) => d,
                    Err(e) => {
                        warn!(
                            "Unable to read LED state of Howler at {}, skipping: {}",
                            location, e
                        );
                        continue;
                    }
                }
            } else {
                HowlerDevice::new(transport)
            };
            devices.push(device);
        }
        info!("{} Howler device(s) ready", devices.len());
        Self { devices }
    }

    /// List attached controllers without opening them
    pub fn list() -> Result<Vec<DiscoveredDevice>, DeviceError> {
        UsbDiscovery::new()
            .and_then(|d| d.list_devices())
            .map_err(DeviceError::from_transport)
    }

    /// Number of opened devices
    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Device at `index`, or `NoSuchDevice` past the end
    pub fn device(&mut self, index: usize) -> Result<&mut HowlerDevice, DeviceError> {
        let count = self.devices.len();
        self.devices
            .get_mut(index)
            .ok_or(DeviceError::NoSuchDevice { index, count })
    }

    pub fn devices(&self) -> &[HowlerDevice] {
        &self.devices
    }
}
