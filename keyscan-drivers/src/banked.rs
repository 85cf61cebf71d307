//! Virtual-pin fan-out across several I/O backends
//!
//! A matrix larger than one port expander spreads its rows and columns
//! over multiple chips. [`BankedIo`] presents them as one flat pin
//! space: virtual pin `v` routes to bank `v / pins_per_bank`, physical
//! pin `v % pins_per_bank`.

use keyscan_hal::{DigitalIo, Level, PinId, PinMode};

/// Pin-range fan-out over `N` backends of the same type.
///
/// Virtual pins beyond the last bank are inert: writes and mode changes
/// are dropped and reads report [`Level::High`], the idle level of a
/// pulled-up line, so a misrouted row can never look like a pressed key.
pub struct BankedIo<IO, const N: usize> {
    banks: [IO; N],
    pins_per_bank: u8,
}

impl<IO: DigitalIo, const N: usize> BankedIo<IO, N> {
    /// Combine `banks` into one pin space, `pins_per_bank` pins each.
    ///
    /// Panics if `pins_per_bank` is zero.
    pub fn new(banks: [IO; N], pins_per_bank: u8) -> Self {
        assert!(pins_per_bank > 0, "banks cannot be empty of pins");
        Self {
            banks,
            pins_per_bank,
        }
    }

    /// Total number of virtual pins.
    pub fn pin_count(&self) -> usize {
        N * usize::from(self.pins_per_bank)
    }

    /// The backend holding `bank`, if it exists.
    pub fn bank(&self, bank: usize) -> Option<&IO> {
        self.banks.get(bank)
    }

    /// Mutable access to the backend holding `bank`.
    pub fn bank_mut(&mut self, bank: usize) -> Option<&mut IO> {
        self.banks.get_mut(bank)
    }

    fn route(&self, pin: PinId) -> Option<(usize, PinId)> {
        let bank = usize::from(pin / self.pins_per_bank);
        if bank < N {
            Some((bank, pin % self.pins_per_bank))
        } else {
            None
        }
    }
}

impl<IO: DigitalIo, const N: usize> DigitalIo for BankedIo<IO, N> {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) {
        if let Some((bank, phys)) = self.route(pin) {
            self.banks[bank].set_mode(phys, mode);
        }
    }

    fn write(&mut self, pin: PinId, level: Level) {
        if let Some((bank, phys)) = self.route(pin) {
            self.banks[bank].write(phys, level);
        }
    }

    fn read(&mut self, pin: PinId) -> Level {
        match self.route(pin) {
            Some((bank, phys)) => self.banks[bank].read(phys),
            None => Level::High,
        }
    }
}
