//! Matrix scanner and action synthesizer
//!
//! [`ButtonMatrix`] drives a rows x cols key matrix wired for active-low
//! column strobing: row pins idle high through pull-ups, and each column
//! is briefly driven low so that a closed switch pulls its row down.
//!
//! Debouncing is a coarse time filter at this level: a scan only runs
//! when at least the configured scan interval has elapsed, so button
//! states cannot visibly oscillate faster than one interval.

use keyscan_hal::{DigitalIo, Level, Millis, PinId, PinMode};

use crate::button::{Button, ButtonAction, ButtonState};

/// Default minimum time between physical scans, in ms.
pub const DEFAULT_SCAN_INTERVAL_MS: u16 = 20;

/// Default hold time after which a press counts as a long press, in ms.
pub const DEFAULT_LONG_PRESS_MS: u16 = 2000;

/// Button event callback.
///
/// Receives the affected button mid-scan; the callback may read its
/// edge flags or last action (both read-reset). Callbacks must not call
/// back into the matrix.
pub type ButtonCallback<'a> = &'a dyn Fn(&mut Button);

/// Scanner for a fixed-geometry button matrix.
///
/// The button grid is owned by the caller and borrowed row-major; pin
/// arrays are tied to the geometry at compile time, so a pin list that
/// is too short for the declared row/column count cannot be constructed.
///
/// Call [`init`](Self::init) once before the first
/// [`update`](Self::update); drive `update` from the superloop with a
/// monotonic millisecond timestamp.
pub struct ButtonMatrix<'a, IO, const ROWS: usize, const COLS: usize> {
    buttons: &'a mut [[Button; COLS]; ROWS],
    row_pins: [PinId; ROWS],
    col_pins: [PinId; COLS],
    io: IO,
    scan_interval_ms: u16,
    last_scan_ms: Millis,
    long_press_ms: u16,
    /// Single-slot callbacks; re-registration replaces
    state_callback: Option<ButtonCallback<'a>>,
    action_callback: Option<ButtonCallback<'a>>,
}

impl<'a, IO: DigitalIo, const ROWS: usize, const COLS: usize> ButtonMatrix<'a, IO, ROWS, COLS> {
    /// Create a matrix over a caller-owned button grid.
    ///
    /// `row_pins[r]` is read for row `r`; `col_pins[c]` is strobed for
    /// column `c`. The I/O backend is taken by value — lend it with
    /// `&mut io` if it is shared with other code between scans.
    pub fn new(
        buttons: &'a mut [[Button; COLS]; ROWS],
        row_pins: [PinId; ROWS],
        col_pins: [PinId; COLS],
        io: IO,
    ) -> Self {
        Self {
            buttons,
            row_pins,
            col_pins,
            io,
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            last_scan_ms: 0,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            state_callback: None,
            action_callback: None,
        }
    }

    /// Configure pin directions.
    ///
    /// Rows become pull-up inputs (idle high, pressed pulls low through
    /// the switch). Columns are preset high and left floating; the scan
    /// loop flips them to output only while strobing. Must run once
    /// before the first [`update`](Self::update).
    pub fn init(&mut self) {
        for &pin in &self.row_pins {
            self.io.set_mode(pin, PinMode::InputPullup);
        }
        for &pin in &self.col_pins {
            // preset the latch high before the pin ever becomes an
            // output, so the first strobe transition is glitch-free
            self.io.write(pin, Level::High);
            self.io.set_mode(pin, PinMode::Input);
        }
    }

    /// Scan the matrix if the scan interval has elapsed.
    ///
    /// Strobes each column low in index order, reads each row in index
    /// order, feeds the raw reading into the per-button state machine
    /// and fires the registered callbacks synchronously, interleaved
    /// with the scan. Returns true if any button changed state.
    ///
    /// `now` is monotonic milliseconds; wrapping is handled.
    pub fn update(&mut self, now: Millis) -> bool {
        if now.wrapping_sub(self.last_scan_ms) < u32::from(self.scan_interval_ms) {
            return false;
        }

        let mut any_changed = false;

        for col in 0..COLS {
            let col_pin = self.col_pins[col];
            self.io.set_mode(col_pin, PinMode::Output);
            self.io.write(col_pin, Level::Low);

            for row in 0..ROWS {
                let raw = if self.io.read(self.row_pins[row]).is_low() {
                    ButtonState::Pressed
                } else {
                    ButtonState::Released
                };

                let button = &mut self.buttons[row][col];
                let changed = button.update_state(raw, now);

                if changed {
                    if let Some(cb) = self.state_callback {
                        cb(button);
                    }
                }

                if let Some(cb) = self.action_callback {
                    if changed && raw == ButtonState::Released {
                        // released within the threshold: a click
                        button.update_action(ButtonAction::Click);
                        cb(button);
                    } else if button.is_long_pressed(now, self.long_press_ms) {
                        button.update_action(ButtonAction::LongPress);
                        cb(button);
                        // end the episode here so the physical release
                        // does not also emit a click or a rose edge
                        button.force_released(now);
                    }
                }

                any_changed |= changed;
            }

            // restore high *before* floating the pin again; two columns
            // asserted at once would short through a closed row
            self.io.write(col_pin, Level::High);
            self.io.set_mode(col_pin, PinMode::Input);
        }

        self.last_scan_ms = now;
        any_changed
    }

    /// Button by flat row-major index, or `None` if out of range.
    pub fn button(&mut self, idx: usize) -> Option<&mut Button> {
        if idx < ROWS * COLS {
            Some(&mut self.buttons[idx / COLS][idx % COLS])
        } else {
            None
        }
    }

    /// Button at (row, col), or `None` if out of range.
    pub fn button_at(&mut self, row: usize, col: usize) -> Option<&mut Button> {
        if row < ROWS && col < COLS {
            Some(&mut self.buttons[row][col])
        } else {
            None
        }
    }

    /// Number of buttons in the matrix.
    pub const fn num_buttons(&self) -> usize {
        ROWS * COLS
    }

    /// Number of rows.
    pub const fn num_rows(&self) -> usize {
        ROWS
    }

    /// Number of columns.
    pub const fn num_cols(&self) -> usize {
        COLS
    }

    /// Current scan interval in ms.
    pub fn scan_interval(&self) -> u16 {
        self.scan_interval_ms
    }

    /// Set the minimum interval between scans (default 20 ms).
    ///
    /// This is the debounce filter and also bounds CPU spent scanning.
    pub fn set_scan_interval(&mut self, ms: u16) {
        self.scan_interval_ms = ms;
    }

    /// Current long-press threshold in ms.
    pub fn long_press_duration(&self) -> u16 {
        self.long_press_ms
    }

    /// Set the hold time after which a press counts as a long press
    /// (default 2000 ms). Shared by all buttons in the matrix.
    pub fn set_long_press_duration(&mut self, ms: u16) {
        self.long_press_ms = ms;
    }

    /// Register the action callback (click / long press).
    ///
    /// Single slot: a new registration replaces the previous one, and
    /// `None` unregisters.
    pub fn set_action_callback(&mut self, cb: Option<ButtonCallback<'a>>) {
        self.action_callback = cb;
    }

    /// Register the state-changed callback.
    ///
    /// Single slot: a new registration replaces the previous one, and
    /// `None` unregisters.
    pub fn set_state_callback(&mut self, cb: Option<ButtonCallback<'a>>) {
        self.state_callback = cb;
    }

    /// The I/O backend.
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Mutable access to the I/O backend (e.g. to drive a simulator
    /// between scans).
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }
}
