//! Digital I/O capability
//!
//! Pin-number addressed digital I/O with runtime-switchable direction.
//! The matrix scanner flips column pins between floating input and
//! driven-low output on every sweep, which is why this trait works on
//! numbered pins rather than on per-pin objects with fixed directions.

/// Pin identifier within one I/O backend.
///
/// The meaning of the number is backend-defined: a chip pin for native
/// GPIO backends, an expander pin (0..=15 on an MCP23017), or a virtual
/// pin routed across several expanders by `BankedIo`.
pub type PinId = u8;

/// Monotonic milliseconds.
///
/// Wraps after about 49.7 days; consumers must compare timestamps with
/// `wrapping_sub`, never with ordering.
pub type Millis = u32;

/// Logic level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Check if the level is low (logic 0)
    pub fn is_low(self) -> bool {
        matches!(self, Level::Low)
    }

    /// Check if the level is high (logic 1)
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Direction and input configuration of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with the internal pull-up enabled (idle reads high)
    InputPullup,
    /// Push-pull output
    Output,
}

/// Digital I/O backend
///
/// Implementations handle the actual register (or bus) traffic for the
/// specific hardware. All operations are infallible at this seam: a
/// digital read always yields a valid logic level. Backends sitting on a
/// fallible transport (I2C expanders) absorb transport errors internally
/// and expose them out-of-band.
///
/// Writing a level while a pin is configured as input presets the output
/// latch; the level takes effect when the pin is later switched to
/// output. The scanner relies on this to strobe columns glitch-free.
pub trait DigitalIo {
    /// Configure the direction/pull of a pin
    fn set_mode(&mut self, pin: PinId, mode: PinMode);

    /// Set the output latch of a pin
    fn write(&mut self, pin: PinId, level: Level);

    /// Read the current logic level of a pin
    fn read(&mut self, pin: PinId) -> Level;
}

// Forwarding impl so a backend can be lent to a scanner without giving
// up ownership.
impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) {
        (**self).set_mode(pin, mode);
    }

    fn write(&mut self, pin: PinId, level: Level) {
        (**self).write(pin, level);
    }

    fn read(&mut self, pin: PinId) -> Level {
        (**self).read(pin)
    }
}
