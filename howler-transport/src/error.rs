//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Communication timeout")]
    Timeout,

    #[error("Short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },

    #[error("USB I/O error: {0}")]
    Io(String),

    #[error("USB permission denied: {0}")]
    PermissionDenied(String),

    #[error("USB context initialization failed: {0}")]
    ContextInit(String),

    #[error("USB device enumeration failed: {0}")]
    Enumeration(String),

    #[error("Unexpected response: expected opcode 0x{expected:02X}, got id 0x{id:02X} opcode 0x{opcode:02X}")]
    InvalidResponse { expected: u8, id: u8, opcode: u8 },
}

impl TransportError {
    /// Whether a caller may reasonably retry the exchange
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Io(_) | Self::ShortTransfer { .. })
    }
}

impl From<rusb::Error> for TransportError {
    fn from(e: rusb::Error) -> Self {
        match e {
            rusb::Error::Timeout => TransportError::Timeout,
            rusb::Error::Access => TransportError::PermissionDenied(e.to_string()),
            rusb::Error::NoDevice => TransportError::Disconnected,
            rusb::Error::NotFound => TransportError::DeviceNotFound(e.to_string()),
            _ => TransportError::Io(e.to_string()),
        }
    }
}
