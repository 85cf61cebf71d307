//! MCP23017 I2C port-expander backend
//!
//! Maps the expander's sixteen pins (0..=7 on port A, 8..=15 on port B)
//! onto the [`DigitalIo`] capability. Register traffic goes through any
//! `embedded-hal` 1.0 I2C bus.
//!
//! The pin contract is infallible, so bus errors cannot surface through
//! `DigitalIo` itself: the first transport error is latched in a sticky
//! slot readable via [`Mcp23017::last_error`], writes after an error are
//! still attempted, and failed reads report the idle (high) level.

use embedded_hal::i2c::I2c;
use keyscan_hal::{DigitalIo, Level, PinId, PinMode};

// Register map with IOCON.BANK = 0 (power-on default): port B registers
// sit one address above their port A counterparts.
const IODIRA: u8 = 0x00;
const GPPUA: u8 = 0x0C;
const GPIOA: u8 = 0x12;
const OLATA: u8 = 0x14;

/// Pins provided by one expander.
pub const PIN_COUNT: u8 = 16;

/// I2C address with all three address straps grounded.
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// MCP23017 backend over an `embedded-hal` I2C bus.
///
/// Direction, pull-up and output-latch registers are shadowed so that
/// per-pin updates cost a single register write and no read-modify-write
/// round trip. The shadows start at the chip's power-on defaults (all
/// inputs, pull-ups off, latches low); if the chip was reconfigured
/// before handover, re-issue the modes you rely on.
pub struct Mcp23017<I2C: I2c> {
    i2c: I2C,
    address: u8,
    iodir: [u8; 2],
    gppu: [u8; 2],
    olat: [u8; 2],
    last_error: Option<I2C::Error>,
}

impl<I2C: I2c> Mcp23017<I2C> {
    /// Create a backend for the expander at `address`.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            iodir: [0xFF; 2],
            gppu: [0x00; 2],
            olat: [0x00; 2],
            last_error: None,
        }
    }

    /// Create a backend for an expander with grounded address straps.
    pub fn with_default_address(i2c: I2C) -> Self {
        Self::new(i2c, DEFAULT_ADDRESS)
    }

    /// The first transport error since the last [`take_error`](Self::take_error).
    pub fn last_error(&self) -> Option<&I2C::Error> {
        self.last_error.as_ref()
    }

    /// Clear and return the sticky transport error.
    pub fn take_error(&mut self) -> Option<I2C::Error> {
        self.last_error.take()
    }

    /// The underlying bus.
    pub fn bus(&self) -> &I2C {
        &self.i2c
    }

    /// Mutable access to the underlying bus.
    pub fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consume the backend and give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn port_bit(pin: PinId) -> Option<(usize, u8)> {
        if pin < PIN_COUNT {
            Some(((pin / 8) as usize, 1 << (pin % 8)))
        } else {
            None
        }
    }

    fn record_error(&mut self, err: I2C::Error) {
        if self.last_error.is_none() {
            self.last_error = Some(err);
        }
    }

    fn write_register(&mut self, reg: u8, value: u8) {
        if let Err(err) = self.i2c.write(self.address, &[reg, value]) {
            self.record_error(err);
        }
    }

    fn read_register(&mut self, reg: u8) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.i2c.write_read(self.address, &[reg], &mut buf) {
            Ok(()) => Some(buf[0]),
            Err(err) => {
                self.record_error(err);
                None
            }
        }
    }
}

impl<I2C: I2c> DigitalIo for Mcp23017<I2C> {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) {
        let Some((port, bit)) = Self::port_bit(pin) else {
            return;
        };

        let (dir_in, pull_up) = match mode {
            PinMode::Input => (true, false),
            PinMode::InputPullup => (true, true),
            PinMode::Output => (false, false),
        };

        let iodir = if dir_in {
            self.iodir[port] | bit
        } else {
            self.iodir[port] & !bit
        };
        if iodir != self.iodir[port] {
            self.iodir[port] = iodir;
            self.write_register(IODIRA + port as u8, iodir);
        }

        let gppu = if pull_up {
            self.gppu[port] | bit
        } else {
            self.gppu[port] & !bit
        };
        if gppu != self.gppu[port] {
            self.gppu[port] = gppu;
            self.write_register(GPPUA + port as u8, gppu);
        }
    }

    fn write(&mut self, pin: PinId, level: Level) {
        let Some((port, bit)) = Self::port_bit(pin) else {
            return;
        };

        let olat = if level.is_high() {
            self.olat[port] | bit
        } else {
            self.olat[port] & !bit
        };
        if olat != self.olat[port] {
            self.olat[port] = olat;
            self.write_register(OLATA + port as u8, olat);
        }
    }

    fn read(&mut self, pin: PinId) -> Level {
        let Some((port, bit)) = Self::port_bit(pin) else {
            return Level::High;
        };

        match self.read_register(GPIOA + port as u8) {
            Some(gpio) => Level::from(gpio & bit != 0),
            // bus fault: report the idle level of a pulled-up line
            None => Level::High,
        }
    }
}
