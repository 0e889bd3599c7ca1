//! Mirror of the device's LED bank bytes
//!
//! The controller only accepts whole-bank writes for per-channel updates, so
//! the driver keeps the last known value of every slot and resends the full
//! bank when one byte changes.

use howler_transport::protocol::led::{BANK_SIZE, NUM_BANKS};
use howler_transport::{SetLedBank, Transport, TransportExt};
use tracing::debug;

use crate::error::DeviceError;
use crate::tables::LedRef;

/// Known value of every (bank, slot) byte on one device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankCache {
    banks: [[u8; BANK_SIZE]; NUM_BANKS],
}

impl BankCache {
    /// All slots zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, r: LedRef) -> u8 {
        self.banks[usize::from(r.bank)][usize::from(r.slot)]
    }

    /// All 16 slot values of one bank, `None` past the last bank
    pub fn bank(&self, bank: u8) -> Option<&[u8; BANK_SIZE]> {
        self.banks.get(usize::from(bank))
    }

    /// Store a value known to be on the device without writing it
    pub fn record(&mut self, r: LedRef, value: u8) {
        self.banks[usize::from(r.bank)][usize::from(r.slot)] = value;
    }

    /// Set one slot, writing its bank to the device if the value changed
    ///
    /// Returns whether a write was issued. If the write fails the slot keeps
    /// its previous value, so retrying the same value is not mistaken for a
    /// cache hit.
    pub fn update(
        &mut self,
        transport: &dyn Transport,
        r: LedRef,
        value: u8,
    ) -> Result<bool, DeviceError> {
        if usize::from(r.bank) >= NUM_BANKS || usize::from(r.slot) >= BANK_SIZE {
            return Err(DeviceError::InvalidParameter(format!(
                "bank {} slot {} out of range",
                r.bank, r.slot
            )));
        }
        let previous = self.get(r);
        if previous == value {
            debug!("Bank {} slot {} already 0x{:02X}", r.bank, r.slot, value);
            return Ok(false);
        }

        self.record(r, value);
        let cmd = match SetLedBank::new(r.bank, self.banks[usize::from(r.bank)]) {
            Ok(cmd) => cmd,
            Err(e) => {
                self.record(r, previous);
                return Err(e.into());
            }
        };

        if let Err(e) = transport.send(&cmd) {
            self.record(r, previous);
            return Err(DeviceError::from_transport(e));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use howler_transport::protocol::cmd;
    use howler_transport::{SimulatedHowler, TransportError};

    const REF: LedRef = LedRef { bank: 2, slot: 15 };

    #[test]
    fn test_update_writes_whole_bank() {
        let sim = SimulatedHowler::new();
        let mut cache = BankCache::new();
        cache.record(LedRef { bank: 2, slot: 0 }, 7);

        assert!(cache.update(&sim, REF, 20).unwrap());
        let sent = sim.sent_with_opcode(cmd::SET_RGB_LED_BANK);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][2], 2);
        assert_eq!(sent[0][3], 7);
        assert_eq!(sent[0][3 + 15], 20);
        assert_eq!(Some(&sim.bank(2)), cache.bank(2));
    }

    #[test]
    fn test_bank_accessor_bounds() {
        let cache = BankCache::new();
        assert!(cache.bank(5).is_some());
        assert_eq!(cache.bank(6), None);
        assert_eq!(cache.bank(u8::MAX), None);

        let sim = SimulatedHowler::new();
        let mut cache = BankCache::new();
        assert!(matches!(
            cache.update(&sim, LedRef { bank: 6, slot: 0 }, 1),
            Err(DeviceError::InvalidParameter(_))
        ));
        assert!(sim.sent().is_empty());
    }

    #[test]
    fn test_repeated_update_writes_once() {
        let sim = SimulatedHowler::new();
        let mut cache = BankCache::new();
        assert!(cache.update(&sim, REF, 20).unwrap());
        assert!(!cache.update(&sim, REF, 20).unwrap());
        assert_eq!(sim.sent().len(), 1);
    }

    #[test]
    fn test_update_to_cached_zero_is_noop() {
        let sim = SimulatedHowler::new();
        let mut cache = BankCache::new();
        assert!(!cache.update(&sim, REF, 0).unwrap());
        assert!(sim.sent().is_empty());
    }

    #[test]
    fn test_failed_update_rolls_back() {
        let sim = SimulatedHowler::new();
        let mut cache = BankCache::new();
        sim.inject_error(TransportError::Timeout);

        let err = cache.update(&sim, REF, 20).unwrap_err();
        assert!(matches!(err, DeviceError::Transport(TransportError::Timeout)));
        assert_eq!(cache.get(REF), 0);

        // The retry is a real write, not a cache hit
        assert!(cache.update(&sim, REF, 20).unwrap());
        assert_eq!(cache.get(REF), 20);
    }
}
