//! Device interface error types

use howler_transport::{CommandError, TransportError};
use thiserror::Error;

/// Errors from device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Invalid parameter value, caught before anything reaches the device
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device answered with the wrong identifier or opcode
    #[error(
        "Protocol mismatch: expected opcode 0x{expected_opcode:02X}, got id 0x{id:02X} opcode 0x{opcode:02X}"
    )]
    ProtocolMismatch { expected_opcode: u8, id: u8, opcode: u8 },

    /// Device index beyond the number of opened devices
    #[error("No device at index {index} ({count} available)")]
    NoSuchDevice { index: usize, count: usize },

    /// USB context could not be created
    #[error("Transport initialization failed: {0}")]
    TransportInit(String),

    /// USB device list could not be read
    #[error("Device enumeration failed: {0}")]
    DeviceEnumeration(String),
}

impl From<CommandError> for DeviceError {
    fn from(e: CommandError) -> Self {
        DeviceError::InvalidParameter(e.to_string())
    }
}

impl DeviceError {
    /// Lift transport failures into the device taxonomy
    ///
    /// Echo mismatches and context/enumeration failures get their own
    /// variants; everything else stays a transport error.
    pub fn from_transport(e: TransportError) -> Self {
        match e {
            TransportError::InvalidResponse {
                expected,
                id,
                opcode,
            } => DeviceError::ProtocolMismatch {
                expected_opcode: expected,
                id,
                opcode,
            },
            TransportError::ContextInit(msg) => DeviceError::TransportInit(msg),
            TransportError::Enumeration(msg) => DeviceError::DeviceEnumeration(msg),
            other => DeviceError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_mapping() {
        let e = DeviceError::from_transport(TransportError::InvalidResponse {
            expected: 0x08,
            id: 0xCE,
            opcode: 0xA0,
        });
        assert!(matches!(
            e,
            DeviceError::ProtocolMismatch {
                expected_opcode: 0x08,
                id: 0xCE,
                opcode: 0xA0
            }
        ));
        assert!(matches!(
            DeviceError::from_transport(TransportError::Timeout),
            DeviceError::Transport(TransportError::Timeout)
        ));
        assert!(matches!(
            DeviceError::from_transport(TransportError::ContextInit("x".into())),
            DeviceError::TransportInit(_)
        ));
    }

    #[test]
    fn test_command_error_is_invalid_parameter() {
        let e: DeviceError = howler_transport::SetLedBank::new(6, [0; 16])
            .unwrap_err()
            .into();
        assert!(matches!(e, DeviceError::InvalidParameter(_)));
    }
}
