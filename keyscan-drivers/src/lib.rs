//! Digital I/O backend implementations for keyscan
//!
//! This crate provides concrete implementations of the
//! [`DigitalIo`](keyscan_hal::DigitalIo) capability consumed by the
//! matrix scanner:
//!
//! - [`Mcp23017`](mcp23017::Mcp23017) - MCP23017 16-pin I2C port
//!   expander over `embedded-hal` I2C
//! - [`BankedIo`](banked::BankedIo) - virtual pin fan-out across several
//!   backends (e.g. matrices larger than one expander)
//! - [`SimulatedIo`](sim::SimulatedIo) - host-test harness modelling the
//!   electrical behavior of a strobed key matrix
//!
//! Native GPIO backends live in board crates: dynamic direction
//! switching is chip-specific, so boards implement `DigitalIo` directly
//! against their own HAL.

#![no_std]
#![deny(unsafe_code)]

pub mod banked;
pub mod mcp23017;
pub mod sim;

pub use banked::BankedIo;
pub use mcp23017::Mcp23017;
pub use sim::SimulatedIo;
