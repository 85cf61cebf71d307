//! Board-agnostic core logic for keyscan
//!
//! This crate contains everything that does not depend on a specific
//! I/O backend:
//!
//! - Per-button debounced state machine (edges, long-press latch,
//!   action record)
//! - Matrix scanner (column strobing, scan-interval gating, callback
//!   fan-out, click/long-press synthesis)
//!
//! Time never comes from a hidden clock: callers pass monotonic
//! milliseconds into every timing-sensitive call, which keeps the logic
//! deterministic under test and free of platform timer dependencies.

#![no_std]
#![deny(unsafe_code)]

pub mod button;
pub mod matrix;

pub use button::{Button, ButtonAction, ButtonState};
pub use matrix::{ButtonCallback, ButtonMatrix};
