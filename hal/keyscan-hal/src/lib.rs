//! Keyscan hardware abstraction layer
//!
//! This crate defines the digital I/O capability consumed by the matrix
//! scanner in `keyscan-core`. Concrete backends (chip GPIO, I2C port
//! expanders, host-side simulators) implement [`DigitalIo`] and are
//! injected at construction time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application superloop                  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keyscan-core (ButtonMatrix)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keyscan-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────────┐
//!         ▼           ▼               ▼
//!   board GPIO    Mcp23017 /     SimulatedIo
//!   impls         BankedIo       (host tests)
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod io;

// Re-export key items at crate root for convenience
pub use io::{DigitalIo, Level, Millis, PinId, PinMode};
