//! Device discovery for Howler controllers

use std::sync::Arc;
use std::time::Duration;

use rusb::{Context, Device, UsbContext};
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::monitor::{MonitorConfig, MonitorTransport};
use crate::protocol::device;
use crate::types::{DiscoveredDevice, TransportDeviceInfo};
use crate::usb::UsbTransport;
use crate::Transport;

/// USB discovery over one libusb context
pub struct UsbDiscovery {
    context: Context,
    /// Per-transfer timeout handed to opened transports
    timeout: Option<Duration>,
    /// When set, every opened transport is wrapped for monitoring
    monitor: Option<MonitorConfig>,
}

impl UsbDiscovery {
    /// Create the USB context
    pub fn new() -> Result<Self, TransportError> {
        let context = Context::new().map_err(|e| TransportError::ContextInit(e.to_string()))?;
        Ok(Self {
            context,
            timeout: None,
            monitor: None,
        })
    }

    /// Set the transfer timeout for transports opened afterwards
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wrap opened transports with [`MonitorTransport`]
    pub fn with_monitor(mut self, config: MonitorConfig) -> Self {
        self.monitor = Some(config);
        self
    }

    fn howlers(&self) -> Result<Vec<(Device<Context>, TransportDeviceInfo)>, TransportError> {
        let devices = self
            .context
            .devices()
            .map_err(|e| TransportError::Enumeration(e.to_string()))?;

        let mut found = Vec::new();
        for d in devices.iter() {
            let desc = match d.device_descriptor() {
                Ok(desc) => desc,
                Err(e) => {
                    debug!(
                        "Skipping {:03}:{:03}, no descriptor: {}",
                        d.bus_number(),
                        d.address(),
                        e
                    );
                    continue;
                }
            };
            if !device::is_howler(desc.vendor_id(), desc.product_id()) {
                continue;
            }
            let info = TransportDeviceInfo {
                vid: desc.vendor_id(),
                pid: desc.product_id(),
                bus: d.bus_number(),
                address: d.address(),
                product_name: None,
                serial: None,
            };
            found.push((d, info));
        }
        Ok(found)
    }

    /// List attached Howlers without opening them
    pub fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let devices: Vec<DiscoveredDevice> = self
            .howlers()?
            .into_iter()
            .map(|(_, info)| DiscoveredDevice { info })
            .collect();
        debug!("Found {} Howler device(s)", devices.len());
        Ok(devices)
    }

    /// Open a specific device
    pub fn open_device(
        &self,
        target: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        let (dev, info) = self
            .howlers()?
            .into_iter()
            .find(|(_, info)| info.bus == target.info.bus && info.address == target.info.address)
            .ok_or_else(|| TransportError::DeviceNotFound(target.info.location()))?;
        self.open(&dev, info)
    }

    /// Open every attached Howler in enumeration order
    ///
    /// Devices that cannot be opened are skipped; a permission failure is
    /// reported as a warning since it usually means a missing udev rule.
    pub fn open_all(&self) -> Result<Vec<Arc<dyn Transport>>, TransportError> {
        let mut opened = Vec::new();
        for (dev, info) in self.howlers()? {
            let location = info.location();
            match self.open(&dev, info) {
                Ok(t) => opened.push(t),
                Err(TransportError::PermissionDenied(_)) => {
                    warn!(
                        "Unable to open interface to Howler device at {}: Permission Denied",
                        location
                    );
                }
                Err(e) => {
                    warn!("Skipping Howler device at {}: {}", location, e);
                }
            }
        }
        Ok(opened)
    }

    fn open(
        &self,
        dev: &Device<Context>,
        mut info: TransportDeviceInfo,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        let handle = dev.open()?;

        if let Ok(desc) = dev.device_descriptor() {
            info.product_name = handle.read_product_string_ascii(&desc).ok();
            info.serial = handle.read_serial_number_string_ascii(&desc).ok();
        }

        let transport = UsbTransport::new(handle, info, self.timeout);
        info!(
            "Opened Howler {:04x}:{:04x} at {}",
            transport.device_info().vid,
            transport.device_info().pid,
            transport.device_info().location()
        );

        let transport: Arc<dyn Transport> = Arc::new(transport);
        Ok(match &self.monitor {
            Some(config) => MonitorTransport::wrap(transport, config.clone()),
            None => transport,
        })
    }
}
