//! USB interrupt-endpoint transport

use std::time::Duration;

use parking_lot::Mutex;
use rusb::{Context, DeviceHandle};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::protocol::{cmd, device, Packet, REPORT_SIZE};
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// An interface claimed from the kernel for the lifetime of the guard.
///
/// Detaches a bound kernel driver before claiming and gives the interface
/// back (re-attaching that driver) on drop, including on error paths.
struct ClaimedInterface<'a> {
    handle: &'a mut DeviceHandle<Context>,
    interface: u8,
    reattach: bool,
}

impl<'a> ClaimedInterface<'a> {
    fn claim(handle: &'a mut DeviceHandle<Context>, interface: u8) -> Result<Self, TransportError> {
        let reattach = match handle.kernel_driver_active(interface) {
            Ok(true) => {
                handle.detach_kernel_driver(interface)?;
                true
            }
            Ok(false) | Err(rusb::Error::NotSupported) => false,
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = handle.claim_interface(interface) {
            if reattach {
                let _ = handle.attach_kernel_driver(interface);
            }
            return Err(e.into());
        }

        Ok(Self {
            handle,
            interface,
            reattach,
        })
    }

    fn write_report(&self, packet: &Packet, timeout: Duration) -> Result<(), TransportError> {
        let written = self
            .handle
            .write_interrupt(device::ENDPOINT_OUT, packet, timeout)?;
        if written != REPORT_SIZE {
            return Err(TransportError::ShortTransfer {
                expected: REPORT_SIZE,
                actual: written,
            });
        }
        Ok(())
    }

    fn read_report(&self, timeout: Duration) -> Result<Packet, TransportError> {
        let mut buf = [0u8; REPORT_SIZE];
        let read = self
            .handle
            .read_interrupt(device::ENDPOINT_IN, &mut buf, timeout)?;
        if read != REPORT_SIZE {
            return Err(TransportError::ShortTransfer {
                expected: REPORT_SIZE,
                actual: read,
            });
        }
        Ok(buf)
    }
}

impl Drop for ClaimedInterface<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(self.interface) {
            debug!("Releasing interface {} failed: {}", self.interface, e);
        }
        if self.reattach {
            if let Err(e) = self.handle.attach_kernel_driver(self.interface) {
                warn!("Re-attaching kernel driver failed: {}", e);
            }
        }
    }
}

/// Transport for a Howler on the USB bus
///
/// Commands go out on the interrupt OUT endpoint and responses come back on
/// the interrupt IN endpoint of interface 0. The interface is claimed for
/// the duration of each exchange only, so the kernel driver keeps the
/// controller between commands.
pub struct UsbTransport {
    handle: Mutex<DeviceHandle<Context>>,
    info: TransportDeviceInfo,
    timeout: Duration,
}

impl UsbTransport {
    /// Wrap an opened device handle
    ///
    /// # Arguments
    /// * `handle` - Opened device handle
    /// * `info` - Device information
    /// * `timeout` - Per-transfer timeout; `None` waits indefinitely
    pub fn new(
        handle: DeviceHandle<Context>,
        info: TransportDeviceInfo,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            handle: Mutex::new(handle),
            info,
            // libusb treats a zero timeout as unlimited
            timeout: timeout.unwrap_or(Duration::ZERO),
        }
    }
}

impl Transport for UsbTransport {
    fn exchange(
        &self,
        packet: &Packet,
        expect_response: bool,
    ) -> Result<Option<Packet>, TransportError> {
        let mut handle = self.handle.lock();
        let claim = ClaimedInterface::claim(&mut handle, device::INTERFACE)?;
        debug!(
            "Sending {} (0x{:02X}): {:02X?}",
            cmd::name(packet[1]),
            packet[1],
            packet
        );
        claim.write_report(packet, self.timeout)?;

        if !expect_response {
            return Ok(None);
        }

        let resp = claim.read_report(self.timeout)?;
        debug!("Received: {:02X?}", resp);
        Ok(Some(resp))
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}
