//! Bus-level driver for Beam LED matrices
//!
//! Builds on the board-agnostic logic in `beam-core` and the bus traits in
//! `beam-hal`:
//!
//! - [`transport`]: section-select register access with failure counting
//!   and bounded reads
//! - [`beam`]: the display driver (render, configure, play)
//! - [`config`]: bus and sequencing timings

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod beam;
pub mod config;
pub mod transport;

#[cfg(test)]
mod mock;

pub use beam::{Beam, PlayError};
pub use config::BeamConfig;
pub use transport::{RegisterBus, WriteError};
